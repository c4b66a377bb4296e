//! Per-turn countdown for Duel match sessions.
//!
//! A [`TurnTimer`] is a single-shot countdown of a fixed duration. Every
//! accepted move restarts it, and each restart bumps a *generation*
//! counter. Expiry is reported as [`TimerEvent::Expired`] tagged with the
//! generation it was started under, so a consumer can throw away an expiry
//! that belongs to a turn which has since ended.
//!
//! While running, the timer also emits [`TimerEvent::Tick`] at a fixed
//! cadence so a UI can show the seconds counting down.
//!
//! # Integration
//!
//! The timer sits inside the session actor's `tokio::select!` loop:
//!
//! ```ignore
//! loop {
//!     tokio::select! {
//!         biased;
//!         Some(cmd) = cmd_rx.recv() => { /* moves, disconnects, ... */ }
//!         event = timer.wait_for_event() => { /* compare generation, maybe forfeit */ }
//!     }
//! }
//! ```
//!
//! A timer that was never started, was cancelled, or already expired
//! pends forever in [`TurnTimer::wait_for_event`], so the other branches
//! keep running.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::{self, Instant};
use tracing::{debug, trace, warn};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Configuration for a [`TurnTimer`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerConfig {
    /// How long the side to move has before forfeiting.
    pub turn_duration: Duration,
    /// How often to emit countdown ticks. `None` disables ticks; only
    /// expiry is reported.
    pub tick_interval: Option<Duration>,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            turn_duration: Duration::from_secs(20),
            tick_interval: Some(Duration::from_secs(1)),
        }
    }
}

impl TimerConfig {
    /// Shortest turn the timer accepts.
    pub const MIN_TURN_DURATION: Duration = Duration::from_millis(1);

    /// Longest turn the timer accepts (30 days).
    pub const MAX_TURN_DURATION: Duration = Duration::from_secs(30 * 24 * 60 * 60);

    /// Config for a given per-turn duration with the default tick cadence.
    pub fn with_turn_duration(turn_duration: Duration) -> Self {
        Self {
            turn_duration,
            ..Default::default()
        }
    }

    /// Clamp out-of-range values so the config is safe to use.
    ///
    /// Called by [`TurnTimer::new`]. Rules:
    /// - `turn_duration` is between [`Self::MIN_TURN_DURATION`] and
    ///   [`Self::MAX_TURN_DURATION`].
    /// - A zero `tick_interval`, or one longer than the turn, means no ticks.
    pub fn validated(mut self) -> Self {
        if self.turn_duration < Self::MIN_TURN_DURATION {
            warn!(
                turn_duration = ?self.turn_duration,
                min = ?Self::MIN_TURN_DURATION,
                "turn_duration below minimum, clamping"
            );
            self.turn_duration = Self::MIN_TURN_DURATION;
        }
        if self.turn_duration > Self::MAX_TURN_DURATION {
            warn!(
                turn_duration = ?self.turn_duration,
                max = ?Self::MAX_TURN_DURATION,
                "turn_duration above maximum, clamping"
            );
            self.turn_duration = Self::MAX_TURN_DURATION;
        }
        match self.tick_interval {
            Some(Duration::ZERO) => {
                warn!("tick_interval of zero disables countdown ticks");
                self.tick_interval = None;
            }
            Some(tick) if tick > self.turn_duration => {
                warn!(
                    tick_interval = ?tick,
                    "tick_interval longer than the turn disables countdown ticks"
                );
                self.tick_interval = None;
            }
            _ => {}
        }
        self
    }
}

// ---------------------------------------------------------------------------
// Events and state
// ---------------------------------------------------------------------------

/// What [`TurnTimer::wait_for_event`] resolves with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// Countdown progress for the running turn.
    Tick { generation: u64, remaining: Duration },
    /// The countdown for `generation` reached zero.
    Expired { generation: u64 },
}

impl TimerEvent {
    /// The generation the event belongs to.
    pub fn generation(&self) -> u64 {
        match self {
            Self::Tick { generation, .. } | Self::Expired { generation } => {
                *generation
            }
        }
    }
}

/// Point-in-time view of a timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerState {
    pub remaining: Duration,
    pub generation: u64,
}

// ---------------------------------------------------------------------------
// Timer
// ---------------------------------------------------------------------------

/// Single-shot, restartable, generation-tagged countdown.
///
/// One `TurnTimer` per match session.
#[derive(Debug)]
pub struct TurnTimer {
    config: TimerConfig,
    generation: u64,
    /// When the running countdown hits zero. `None` while idle.
    deadline: Option<Instant>,
    /// When the next countdown tick is due.
    next_tick: Option<Instant>,
    /// Remaining time reported while idle.
    idle_remaining: Duration,
}

impl TurnTimer {
    /// Creates an idle timer holding the full turn duration.
    pub fn new(config: TimerConfig) -> Self {
        let config = config.validated();
        debug!(
            turn_ms = config.turn_duration.as_millis() as u64,
            tick_ms = ?config.tick_interval.map(|d| d.as_millis() as u64),
            "turn timer created"
        );
        Self {
            idle_remaining: config.turn_duration,
            config,
            generation: 0,
            deadline: None,
            next_tick: None,
        }
    }

    /// Creates an idle timer for a specific turn duration.
    pub fn with_turn_duration(turn_duration: Duration) -> Self {
        Self::new(TimerConfig::with_turn_duration(turn_duration))
    }

    /// Starts a fresh countdown of the full turn duration.
    ///
    /// Always a restart, never an extension: the previous countdown (if
    /// any) is abandoned and the generation advances. Returns the new
    /// generation.
    pub fn restart(&mut self) -> u64 {
        let now = Instant::now();
        self.generation += 1;
        self.deadline = Some(now + self.config.turn_duration);
        self.next_tick = self.config.tick_interval.map(|tick| now + tick);
        trace!(generation = self.generation, "turn timer restarted");
        self.generation
    }

    /// Stops the countdown. The timer stays inert until the next
    /// [`restart`](Self::restart). Safe to call repeatedly.
    pub fn cancel(&mut self) {
        if self.deadline.is_some() {
            self.idle_remaining = self.remaining();
            self.deadline = None;
            self.next_tick = None;
            debug!(generation = self.generation, "turn timer cancelled");
        }
    }

    /// Waits for the next tick or for expiry.
    ///
    /// Expiry is reported once; afterwards the timer is idle. When idle
    /// this future never resolves.
    pub async fn wait_for_event(&mut self) -> TimerEvent {
        let Some(deadline) = self.deadline else {
            std::future::pending::<()>().await;
            unreachable!()
        };

        let wake = match self.next_tick {
            Some(tick) if tick < deadline => tick,
            _ => deadline,
        };
        time::sleep_until(wake).await;

        let now = Instant::now();
        if now >= deadline {
            self.deadline = None;
            self.next_tick = None;
            self.idle_remaining = Duration::ZERO;
            debug!(generation = self.generation, "turn timer expired");
            return TimerEvent::Expired {
                generation: self.generation,
            };
        }

        // Schedule from the missed slot, skipping any we slept through.
        if let (Some(tick), Some(interval)) =
            (self.next_tick, self.config.tick_interval)
        {
            let mut next = tick + interval;
            while next <= now {
                next += interval;
            }
            self.next_tick = Some(next);
        }

        let remaining = deadline.saturating_duration_since(now);
        trace!(
            generation = self.generation,
            remaining_ms = remaining.as_millis() as u64,
            "turn timer tick"
        );
        TimerEvent::Tick {
            generation: self.generation,
            remaining,
        }
    }

    /// Time left in the current turn. Frozen while idle.
    pub fn remaining(&self) -> Duration {
        match self.deadline {
            Some(deadline) => deadline.saturating_duration_since(Instant::now()),
            None => self.idle_remaining,
        }
    }

    /// Generation of the most recent restart (0 before the first one).
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// `true` while a countdown is in progress.
    pub fn is_running(&self) -> bool {
        self.deadline.is_some()
    }

    /// Snapshot of remaining time and generation.
    pub fn state(&self) -> TimerState {
        TimerState {
            remaining: self.remaining(),
            generation: self.generation,
        }
    }

    /// The configured per-turn duration.
    pub fn turn_duration(&self) -> Duration {
        self.config.turn_duration
    }
}
