//! Outbound port to the transport.
//!
//! The session tells the peer about accepted local moves, resignations,
//! and room closure through a [`MoveRelay`]. Every call is
//! fire-and-forget: delivery and retries are the transport's business.

use duel_protocol::{Move, PeerMessage, SessionId, Turn};
use tokio::sync::mpsc;

/// Where the session sends things the peer needs to hear about.
///
/// Methods are synchronous and must not block; implementations queue the
/// message and return.
pub trait MoveRelay: Send + 'static {
    /// An accepted local move, to be replayed by the peer.
    fn broadcast_move(&self, mv: &Move, session_id: &SessionId);

    /// The local player acknowledged the result and is leaving.
    fn close_room(&self, session_id: &SessionId);

    /// The local side resigned. Default: nothing is sent.
    fn announce_resignation(&self, _who: Turn, _session_id: &SessionId) {}
}

/// A relay that drops everything. For single-client use and tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopRelay;

impl MoveRelay for NoopRelay {
    fn broadcast_move(&self, _mv: &Move, _session_id: &SessionId) {}

    fn close_room(&self, _session_id: &SessionId) {}
}

/// A relay that turns each call into a [`PeerMessage`] on an unbounded
/// channel. The receiving end is typically drained by a writer task that
/// encodes and sends over the network.
#[derive(Debug, Clone)]
pub struct ChannelRelay {
    sender: mpsc::UnboundedSender<PeerMessage>,
}

impl ChannelRelay {
    /// Creates a relay and the receiver its messages arrive on.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<PeerMessage>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }

    fn push(&self, msg: PeerMessage) {
        // Receiver gone means the link is down; nothing to retry.
        if self.sender.send(msg).is_err() {
            tracing::debug!("relay receiver dropped, outbound message discarded");
        }
    }
}

impl MoveRelay for ChannelRelay {
    fn broadcast_move(&self, mv: &Move, session_id: &SessionId) {
        self.push(PeerMessage::Move {
            session_id: session_id.clone(),
            mv: mv.clone(),
        });
    }

    fn close_room(&self, session_id: &SessionId) {
        self.push(PeerMessage::CloseRoom {
            session_id: session_id.clone(),
        });
    }

    fn announce_resignation(&self, who: Turn, session_id: &SessionId) {
        self.push(PeerMessage::Resign {
            session_id: session_id.clone(),
            who,
        });
    }
}
