//! Error types for the session layer.

use duel_protocol::SessionId;

use crate::IllegalMove;

/// Why a remote move could not be replayed locally.
///
/// Any of these means the two clients no longer agree on the game.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DesyncCause {
    /// The peer moved when it wasn't its turn here.
    #[error("move arrived out of turn")]
    OutOfTurn,

    /// The peer sent a move on behalf of the local side.
    #[error("peer moved the local side's pieces")]
    ForeignMover,

    /// The local engine rejects a move the peer accepted.
    #[error("{0}")]
    Illegal(IllegalMove),
}

/// A submitted move was rejected. State is never changed by a rejection.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoveRejection {
    /// The engine refused a local move.
    #[error(transparent)]
    IllegalMove(IllegalMove),

    /// The mover is not the side to move, or not the local side.
    #[error("not your turn")]
    NotYourTurn,

    /// The opponent hasn't joined yet.
    #[error("opponent has not joined")]
    OpponentAbsent,

    /// The match already has a result, or the session was torn down.
    #[error("match is already over")]
    AlreadyOver,

    /// A remote move failed validation: the peers disagree.
    #[error("peer desync detected: {0}")]
    DesyncDetected(DesyncCause),
}

impl MoveRejection {
    /// `true` when the rejection signals peer disagreement rather than
    /// bad user input.
    pub fn is_desync(&self) -> bool {
        matches!(self, Self::DesyncDetected(_))
    }
}

/// Errors returned by session operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// A move was rejected.
    #[error(transparent)]
    Rejected(#[from] MoveRejection),

    /// Termination was acknowledged while the match is still running.
    #[error("match is still ongoing")]
    StillOngoing,

    /// The session actor has stopped or its command channel is closed.
    #[error("session {0} is unavailable")]
    Unavailable(SessionId),
}
