//! Termination arbiter: turns end-of-match signals into one result.
//!
//! Two states, `Ongoing` and `Terminal(result)`. The first qualifying
//! signal wins and the terminal state is absorbing.

use duel_protocol::{MatchResult, PlayerId, Turn};

use crate::SessionError;

/// A condition that ends the match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Termination {
    /// The engine reports mate; `winner` moved last.
    Checkmate { winner: Turn },
    /// The engine reports a draw.
    Draw,
    /// A participant resigned or closed the match.
    Resignation { who: Turn },
    /// The relay lost `who`.
    Disconnected { who: PlayerId },
    /// The current turn's countdown ran out; `winner` is the opponent.
    Timeout { winner: Turn },
}

impl Termination {
    /// Rank used when several conditions are offered together. Engine
    /// outcomes describe a move already applied, so they outrank
    /// everything; a timeout ranks last.
    pub fn priority(&self) -> u8 {
        match self {
            Self::Checkmate { .. } | Self::Draw => 3,
            Self::Resignation { .. } => 2,
            Self::Disconnected { .. } => 1,
            Self::Timeout { .. } => 0,
        }
    }

    /// The result this condition produces.
    pub fn into_result(self) -> MatchResult {
        match self {
            Self::Checkmate { winner } => MatchResult::Checkmate { winner },
            Self::Draw => MatchResult::Draw,
            Self::Resignation { who } => MatchResult::Resignation { who },
            Self::Disconnected { who } => MatchResult::Disconnected { who },
            Self::Timeout { winner } => MatchResult::Timeout { winner },
        }
    }
}

/// Holds the match result and enforces write-once semantics.
#[derive(Debug, Default)]
pub struct TerminationArbiter {
    result: MatchResult,
    acknowledged: bool,
}

impl TerminationArbiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// The current result (`Ongoing` until something qualifies).
    pub fn result(&self) -> &MatchResult {
        &self.result
    }

    pub fn is_terminal(&self) -> bool {
        self.result.is_terminal()
    }

    /// Offers the conditions observed in one evaluation.
    ///
    /// If the match is still ongoing, the highest-priority candidate
    /// becomes the result (ties go to the earliest offered) and it is
    /// returned. Otherwise the offer is ignored and `None` is returned.
    pub fn conclude(
        &mut self,
        candidates: impl IntoIterator<Item = Termination>,
    ) -> Option<&MatchResult> {
        if self.is_terminal() {
            return None;
        }

        let mut winner: Option<Termination> = None;
        for candidate in candidates {
            let outranks = winner
                .as_ref()
                .is_none_or(|best| candidate.priority() > best.priority());
            if outranks {
                winner = Some(candidate);
            }
        }

        self.result = winner?.into_result();
        Some(&self.result)
    }

    /// One-shot acknowledgment of the terminal result.
    ///
    /// Returns `Ok(true)` the first time (the caller should tear down),
    /// `Ok(false)` on repeats.
    ///
    /// # Errors
    /// [`SessionError::StillOngoing`] if there is no result yet.
    pub fn acknowledge(&mut self) -> Result<bool, SessionError> {
        if !self.is_terminal() {
            return Err(SessionError::StillOngoing);
        }
        if self.acknowledged {
            return Ok(false);
        }
        self.acknowledged = true;
        Ok(true)
    }

    pub fn is_acknowledged(&self) -> bool {
        self.acknowledged
    }
}
