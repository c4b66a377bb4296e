//! Move synchronizer: the single validation path for local and remote moves.
//!
//! Owns the current position and turn. A move either passes every check
//! and replaces both together, or fails and leaves them untouched.

use duel_protocol::{Move, Turn};

use crate::arbiter::Termination;
use crate::{DesyncCause, MoveRejection, RuleEngine};

/// Where a move came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveSource {
    /// Played on this client.
    Local,
    /// Delivered by the peer through the transport.
    Remote,
}

/// Position and turn after an accepted move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accepted<P> {
    pub position: P,
    pub turn: Turn,
}

/// Applies moves through the rule engine and keeps position and turn in
/// lockstep.
pub(crate) struct MoveSynchronizer<E: RuleEngine> {
    engine: E,
    position: E::Position,
    turn: Turn,
    /// Mover of the last accepted move; used to name the mating side.
    last_mover: Option<Turn>,
}

impl<E: RuleEngine> MoveSynchronizer<E> {
    pub(crate) fn new(engine: E) -> Self {
        let position = engine.current_position();
        let turn = engine.turn_of(&position);
        Self {
            engine,
            position,
            turn,
            last_mover: None,
        }
    }

    pub(crate) fn position(&self) -> &E::Position {
        &self.position
    }

    pub(crate) fn turn(&self) -> Turn {
        self.turn
    }

    /// Checks turn order and legality, then applies the move.
    ///
    /// Session-level preconditions (terminated, roster) are the caller's;
    /// this covers the mover and the engine. Remote failures are reported
    /// as [`MoveRejection::DesyncDetected`].
    pub(crate) fn apply(
        &mut self,
        mv: &Move,
        source: MoveSource,
        local_side: Turn,
    ) -> Result<Accepted<E::Position>, MoveRejection> {
        self.check_mover(mv, source, local_side)?;

        let next = self.engine.apply_move(&self.position, mv).map_err(
            |illegal| match source {
                MoveSource::Local => MoveRejection::IllegalMove(illegal),
                MoveSource::Remote => {
                    MoveRejection::DesyncDetected(DesyncCause::Illegal(illegal))
                }
            },
        )?;

        let turn = mv.mover.opponent();
        let engine_turn = self.engine.turn_of(&next);
        if engine_turn != turn {
            tracing::warn!(
                expected = %turn,
                engine = %engine_turn,
                "engine turn disagrees with alternation, keeping alternation"
            );
        }

        self.position = next;
        self.turn = turn;
        self.last_mover = Some(mv.mover);

        Ok(Accepted {
            position: self.position.clone(),
            turn,
        })
    }

    /// The game-over condition of the current position, if any.
    pub(crate) fn outcome(&self) -> Option<Termination> {
        if !self.engine.is_game_over(&self.position) {
            return None;
        }
        if self.engine.is_checkmate(&self.position) {
            // The side to move is mated; whoever moved last delivered it.
            let winner = self.last_mover.unwrap_or(self.turn.opponent());
            return Some(Termination::Checkmate { winner });
        }
        if !self.engine.is_draw(&self.position) {
            tracing::warn!(
                "engine reports game over without mate or draw, scoring as draw"
            );
        }
        Some(Termination::Draw)
    }

    fn check_mover(
        &self,
        mv: &Move,
        source: MoveSource,
        local_side: Turn,
    ) -> Result<(), MoveRejection> {
        match source {
            MoveSource::Local => {
                if mv.mover != self.turn || mv.mover != local_side {
                    return Err(MoveRejection::NotYourTurn);
                }
            }
            MoveSource::Remote => {
                if mv.mover == local_side {
                    return Err(MoveRejection::DesyncDetected(
                        DesyncCause::ForeignMover,
                    ));
                }
                if mv.mover != self.turn {
                    return Err(MoveRejection::DesyncDetected(
                        DesyncCause::OutOfTurn,
                    ));
                }
            }
        }
        Ok(())
    }
}
