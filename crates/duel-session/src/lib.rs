//! Match session core for Duel.
//!
//! A session holds one two-player, turn-based match between the local
//! client and a peer. Moves from either side go through a single
//! validation path, a restartable countdown forfeits the side that runs
//! out of time, and exactly one result is ever recorded.
//!
//! # Key types
//!
//! - [`RuleEngine`]: the game's rules, supplied by the host
//! - [`MoveRelay`]: where accepted local moves are sent
//! - [`MatchSession`]: the synchronous state machine
//! - [`SessionHandle`]: talk to a session running as a Tokio task
//! - [`TerminationArbiter`]: write-once match result
//! - [`MatchConfig`]: turn duration, tick rate, channel size

mod actor;
mod arbiter;
mod config;
mod engine;
mod error;
mod relay;
mod session;
mod synchronizer;

pub use actor::{spawn_session, SessionHandle};
pub use arbiter::{Termination, TerminationArbiter};
pub use config::{MatchConfig, SessionPhase};
pub use engine::{IllegalMove, RuleEngine};
pub use error::{DesyncCause, MoveRejection, SessionError};
pub use relay::{ChannelRelay, MoveRelay, NoopRelay};
pub use session::{MatchSession, MatchSnapshot, SessionEvent};
pub use synchronizer::{Accepted, MoveSource};
