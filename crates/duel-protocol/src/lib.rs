//! Shared vocabulary for Duel match sessions.
//!
//! - **Types** ([`Turn`], [`Move`], [`Roster`], [`MatchResult`], ...): the
//!   values the session core reasons about.
//! - **Wire** ([`PeerMessage`]): what one client sends the other through
//!   the relay.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how wire messages become
//!   bytes.
//! - **Errors** ([`ProtocolError`]).
//!
//! ```text
//! Transport (bytes) → Protocol (PeerMessage) → Session (match state)
//! ```

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    MatchResult, Move, Participant, PeerMessage, PlayerId, Roster, SessionId,
    Square, Turn,
};
