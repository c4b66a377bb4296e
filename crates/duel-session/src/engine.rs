//! The `RuleEngine` trait, the seam to whatever board game is being played.
//!
//! The session never looks inside a position. It asks the engine to apply
//! moves and to answer a handful of questions about the result; legality,
//! checkmate, and draw detection all live behind this trait.

use std::fmt;

use duel_protocol::{Move, Turn};

/// The engine refused a move.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("illegal move: {reason}")]
pub struct IllegalMove {
    pub reason: String,
}

impl IllegalMove {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Board-game rules, as seen by the match session.
///
/// `Position` is opaque to the session: it is only ever produced by
/// [`current_position`](Self::current_position) or
/// [`apply_move`](Self::apply_move) and handed back to the engine.
///
/// Implementations must be deterministic: applying the same move to the
/// same position always gives the same answer. Both clients rely on that
/// to stay converged.
pub trait RuleEngine: Send + 'static {
    /// A board snapshot.
    type Position: Clone + fmt::Debug + Send + Sync + 'static;

    /// The position the match starts from.
    fn current_position(&self) -> Self::Position;

    /// Applies `mv` to `position`, returning the resulting position, or
    /// [`IllegalMove`] without side effects.
    fn apply_move(
        &self,
        position: &Self::Position,
        mv: &Move,
    ) -> Result<Self::Position, IllegalMove>;

    /// `true` when no further moves can be made.
    fn is_game_over(&self, position: &Self::Position) -> bool;

    /// `true` when the side to move has been mated.
    fn is_checkmate(&self, position: &Self::Position) -> bool;

    /// `true` for stalemate and every other drawing condition.
    fn is_draw(&self, position: &Self::Position) -> bool;

    /// The side to move in `position`.
    fn turn_of(&self, position: &Self::Position) -> Turn;
}
