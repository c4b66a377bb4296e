//! # Duel
//!
//! Two-player, turn-based match sessions between two clients that talk
//! through a relay.
//!
//! Each client runs its own [`MatchSession`](duel_session::MatchSession):
//! local moves are validated and relayed, the peer's moves are replayed
//! through the same validation path, a per-turn countdown forfeits the
//! side that runs out of time, and exactly one result is recorded.
//!
//! The host supplies the game's rules by implementing
//! [`RuleEngine`](duel_session::RuleEngine); [`DuelClient`] does the rest.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use duel::prelude::*;
//!
//! // Implement RuleEngine for your game, then:
//! // let client = DuelClientBuilder::new()
//! //     .url("ws://127.0.0.1:8080")
//! //     .local_side(Turn::First)
//! //     .connect(MyEngine)
//! //     .await?;
//! // let mut snapshots = client.subscribe();
//! ```

mod client;
mod error;
mod link;
mod telemetry;

pub use client::{DuelClient, DuelClientBuilder};
pub use error::DuelError;
pub use link::PeerLink;
pub use telemetry::{DEFAULT_FILTER, init_tracing, init_tracing_with};

/// Everything needed to run a match.
pub mod prelude {
    pub use crate::{DuelClient, DuelClientBuilder, DuelError, PeerLink, init_tracing};

    pub use duel_protocol::{
        Codec, JsonCodec, MatchResult, Move, Participant, PeerMessage, PlayerId, Roster,
        SessionId, Square, Turn,
    };
    pub use duel_session::{
        Accepted, ChannelRelay, DesyncCause, IllegalMove, MatchConfig, MatchSession,
        MatchSnapshot, MoveRejection, MoveRelay, MoveSource, NoopRelay, RuleEngine,
        SessionError, SessionEvent, SessionHandle, SessionPhase, spawn_session,
    };
    pub use duel_timer::{TimerConfig, TimerEvent, TimerState, TurnTimer};
    pub use duel_transport::{
        ClientConnection, Connection, ConnectionId, ServerConnection, Transport,
        TransportError, WebSocketListener,
    };
}
