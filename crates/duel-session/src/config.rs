//! Session configuration and lifecycle phases.

use std::time::Duration;

use duel_timer::TimerConfig;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// MatchConfig
// ---------------------------------------------------------------------------

/// Settings for one match session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchConfig {
    /// Time the side to move has before forfeiting.
    pub turn_duration: Duration,

    /// Countdown refresh cadence for the read model. `None` publishes
    /// only on state changes.
    pub tick_interval: Option<Duration>,

    /// Capacity of the actor's command channel.
    pub channel_size: usize,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            turn_duration: Duration::from_secs(20),
            tick_interval: Some(Duration::from_secs(1)),
            channel_size: 64,
        }
    }
}

impl MatchConfig {
    /// The timer half of this config.
    pub fn timer_config(&self) -> TimerConfig {
        TimerConfig {
            turn_duration: self.turn_duration,
            tick_interval: self.tick_interval,
        }
    }
}

// ---------------------------------------------------------------------------
// SessionPhase
// ---------------------------------------------------------------------------

/// Lifecycle of a session object.
///
/// ```text
/// Active → Concluded → TornDown
///    └──────────────────↑   (room closed / shutdown while active)
/// ```
///
/// - **Active**: match in progress, moves are accepted.
/// - **Concluded**: a result is set; waiting for acknowledgment.
/// - **TornDown**: timer cancelled, relay detached. Every input is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    Active,
    Concluded,
    TornDown,
}

impl SessionPhase {
    /// Returns `true` while moves may still be played.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }

    /// The normal successor of this phase.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Active => Some(Self::Concluded),
            Self::Concluded => Some(Self::TornDown),
            Self::TornDown => None,
        }
    }

    /// Returns `true` if moving to `target` is allowed: the normal
    /// successor, or straight to `TornDown` from `Active`.
    pub fn can_transition_to(self, target: Self) -> bool {
        self.next() == Some(target)
            || (self == Self::Active && target == Self::TornDown)
    }
}

impl std::fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "Active"),
            Self::Concluded => write!(f, "Concluded"),
            Self::TornDown => write!(f, "TornDown"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_next_follows_strict_order() {
        assert_eq!(SessionPhase::Active.next(), Some(SessionPhase::Concluded));
        assert_eq!(SessionPhase::Concluded.next(), Some(SessionPhase::TornDown));
        assert_eq!(SessionPhase::TornDown.next(), None);
    }

    #[test]
    fn test_phase_can_transition_to() {
        assert!(SessionPhase::Active.can_transition_to(SessionPhase::Concluded));
        assert!(SessionPhase::Active.can_transition_to(SessionPhase::TornDown));
        assert!(!SessionPhase::Concluded.can_transition_to(SessionPhase::Active));
        assert!(!SessionPhase::TornDown.can_transition_to(SessionPhase::Active));
    }

    #[test]
    fn test_phase_is_active() {
        assert!(SessionPhase::Active.is_active());
        assert!(!SessionPhase::Concluded.is_active());
        assert!(!SessionPhase::TornDown.is_active());
    }

    #[test]
    fn test_match_config_default() {
        let config = MatchConfig::default();
        assert_eq!(config.turn_duration, Duration::from_secs(20));
        assert_eq!(config.tick_interval, Some(Duration::from_secs(1)));
        assert_eq!(config.channel_size, 64);
        assert_eq!(config.timer_config(), TimerConfig::default());
    }
}
