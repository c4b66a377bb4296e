//! Core match types shared by the session core and the wire.
//!
//! Everything here is plain data: identities, sides, moves, the roster,
//! and the terminal result of a match. None of it knows about timers,
//! sockets, or a particular board game.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for a participant.
///
/// Newtype over `u64` so a `PlayerId` can't be confused with any other
/// number. Serializes as the bare number (`#[serde(transparent)]`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// Identifies one match session (one room on the relay).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl SessionId {
    /// Wraps an existing identifier, e.g. one handed out by the relay.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a fresh random identifier: 16 random bytes rendered as
    /// 32 lowercase hex characters.
    pub fn generate() -> Self {
        let bytes: [u8; 16] = rand::rng().random();
        Self(bytes.iter().map(|b| format!("{b:02x}")).collect())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Turn
// ---------------------------------------------------------------------------

/// Which side is to move.
///
/// Color-agnostic on purpose: the core only knows "first" and "second".
/// [`Turn::color`] maps a side to `"white"` / `"black"` for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Turn {
    First,
    Second,
}

impl Turn {
    /// The other side.
    pub fn opponent(self) -> Self {
        match self {
            Self::First => Self::Second,
            Self::Second => Self::First,
        }
    }

    /// Presentation name of this side.
    pub fn color(self) -> &'static str {
        match self {
            Self::First => "white",
            Self::Second => "black",
        }
    }
}

impl fmt::Display for Turn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.color())
    }
}

// ---------------------------------------------------------------------------
// Move
// ---------------------------------------------------------------------------

/// A board coordinate in whatever notation the rule engine speaks
/// (`"e2"` for chess, `"b3"` for tic-tac-toe).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Square(pub String);

impl Square {
    pub fn new(square: impl Into<String>) -> Self {
        Self(square.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single move, as proposed by the local player or delivered by the peer.
///
/// Moves are values: once built they are never changed. `auxiliary`
/// carries extra engine-specific input such as a promotion piece.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    pub origin: Square,
    pub destination: Square,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auxiliary: Option<String>,
    pub mover: Turn,
}

impl Move {
    /// Builds a move without auxiliary data.
    pub fn new(
        origin: impl Into<String>,
        destination: impl Into<String>,
        mover: Turn,
    ) -> Self {
        Self {
            origin: Square::new(origin),
            destination: Square::new(destination),
            auxiliary: None,
            mover,
        }
    }

    /// Returns a copy of this move carrying `auxiliary` data.
    pub fn with_auxiliary(mut self, auxiliary: impl Into<String>) -> Self {
        self.auxiliary = Some(auxiliary.into());
        self
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.origin, self.destination)?;
        if let Some(aux) = &self.auxiliary {
            write!(f, "={aux}")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Roster
// ---------------------------------------------------------------------------

/// One of the (at most two) people in a match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: PlayerId,
    pub name: String,
}

impl Participant {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id: PlayerId(id),
            name: name.into(),
        }
    }
}

/// The participants currently present in a match.
///
/// Owned and updated by the relay; the session only reads it. Holds at
/// most [`Roster::CAPACITY`] entries with distinct ids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Participant>", into = "Vec<Participant>")]
pub struct Roster {
    participants: Vec<Participant>,
}

impl Roster {
    /// Two-party matches only.
    pub const CAPACITY: usize = 2;

    /// An empty roster.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a roster, rejecting more than two participants or a
    /// duplicated id.
    pub fn from_participants(
        participants: Vec<Participant>,
    ) -> Result<Self, ProtocolError> {
        if participants.len() > Self::CAPACITY {
            return Err(ProtocolError::InvalidMessage(format!(
                "roster holds at most {} participants, got {}",
                Self::CAPACITY,
                participants.len()
            )));
        }
        if let [a, b] = participants.as_slice() {
            if a.id == b.id {
                return Err(ProtocolError::InvalidMessage(format!(
                    "duplicate participant {}",
                    a.id
                )));
            }
        }
        Ok(Self { participants })
    }

    /// `true` once both seats are taken. Local moves need a full roster.
    pub fn is_complete(&self) -> bool {
        self.participants.len() == Self::CAPACITY
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    pub fn contains(&self, id: PlayerId) -> bool {
        self.participants.iter().any(|p| p.id == id)
    }

    /// Looks up a participant by id.
    pub fn get(&self, id: PlayerId) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id == id)
    }

    /// Removes a participant, returning it if present.
    pub fn remove(&mut self, id: PlayerId) -> Option<Participant> {
        let idx = self.participants.iter().position(|p| p.id == id)?;
        Some(self.participants.remove(idx))
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }
}

impl TryFrom<Vec<Participant>> for Roster {
    type Error = ProtocolError;

    fn try_from(participants: Vec<Participant>) -> Result<Self, Self::Error> {
        Self::from_participants(participants)
    }
}

impl From<Roster> for Vec<Participant> {
    fn from(roster: Roster) -> Self {
        roster.participants
    }
}

// ---------------------------------------------------------------------------
// MatchResult
// ---------------------------------------------------------------------------

/// How a match ended, or `Ongoing` while it hasn't.
///
/// Write-once: after a session leaves `Ongoing` nothing changes the value
/// again.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum MatchResult {
    #[default]
    Ongoing,
    /// `winner` made the mating move.
    Checkmate { winner: Turn },
    /// Stalemate or any other drawing condition reported by the engine.
    Draw,
    /// `who` resigned or closed the match.
    Resignation { who: Turn },
    /// `who` left; whoever remains is the practical winner.
    Disconnected { who: PlayerId },
    /// The side to move ran out of time; `winner` is its opponent.
    Timeout { winner: Turn },
}

impl MatchResult {
    /// `true` for every variant except `Ongoing`.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Ongoing)
    }

    /// The winning side, when the result names one.
    pub fn winner(&self) -> Option<Turn> {
        match self {
            Self::Checkmate { winner } | Self::Timeout { winner } => {
                Some(*winner)
            }
            Self::Resignation { who } => Some(who.opponent()),
            Self::Ongoing | Self::Draw | Self::Disconnected { .. } => None,
        }
    }
}

/// Headline shown to players when the match ends.
impl fmt::Display for MatchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ongoing => f.write_str("Ongoing"),
            Self::Checkmate { winner } => {
                write!(f, "Checkmate! {winner} wins!")
            }
            Self::Draw => f.write_str("Draw"),
            Self::Resignation { who } => {
                write!(f, "{who} resigned, {} wins!", who.opponent())
            }
            Self::Disconnected { who } => write!(f, "{who} has disconnected"),
            Self::Timeout { winner } => write!(f, "Time's up! {winner} wins!"),
        }
    }
}

// ---------------------------------------------------------------------------
// PeerMessage: what travels between the two clients
// ---------------------------------------------------------------------------

/// Messages exchanged with the relay.
///
/// Internally tagged JSON: `{ "type": "Move", "session_id": "...", "mv": {...} }`.
/// `PeerDisconnected` and `Roster` originate at the relay; the others are
/// sent by one client and forwarded to the other.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PeerMessage {
    /// An accepted local move, to be replayed by the peer.
    Move { session_id: SessionId, mv: Move },

    /// `who` resigned.
    Resign { session_id: SessionId, who: Turn },

    /// The sender acknowledged the result and is leaving the room.
    CloseRoom { session_id: SessionId },

    /// The relay lost a participant's connection.
    PeerDisconnected {
        session_id: SessionId,
        participant: PlayerId,
    },

    /// The relay's current view of who is in the room.
    Roster {
        session_id: SessionId,
        participants: Roster,
    },
}
