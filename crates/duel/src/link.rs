//! Peer link: moves `PeerMessage`s between a session actor and a
//! connection.
//!
//! Two loops share one connection:
//!   - writer: drains the session's [`ChannelRelay`] queue, encodes, sends
//!   - reader: receives, decodes, routes each message to the session
//!
//! The link ends when either side goes away. If the peer vanishes first,
//! the opponent (once known from a roster) is reported as disconnected.
//! If the session stops first,
//! queued messages (such as the final close-room) are flushed and the
//! connection is closed.
//!
//! [`ChannelRelay`]: duel_session::ChannelRelay

use std::sync::Arc;

use duel_protocol::{Codec, PeerMessage, PlayerId, SessionId};
use duel_session::{SessionError, SessionEvent, SessionHandle};
use duel_transport::{Connection, TransportError};
use tokio::sync::mpsc;

use crate::DuelError;

/// Why the reader stopped.
enum ReadEnd {
    /// The connection closed.
    PeerGone,
    /// The session actor stopped.
    SessionGone,
}

/// Glues one session actor to one connection.
pub struct PeerLink<C, K, P> {
    conn: Arc<C>,
    codec: K,
    handle: SessionHandle<P>,
    local_player: Option<PlayerId>,
}

impl<C, K, P> PeerLink<C, K, P>
where
    C: Connection<Error = TransportError>,
    K: Codec,
    P: Clone + Send + Sync + 'static,
{
    pub fn new(conn: Arc<C>, codec: K, handle: SessionHandle<P>) -> Self {
        Self {
            conn,
            codec,
            handle,
            local_player: None,
        }
    }

    /// The local participant's id, so the link can tell the opponent
    /// apart in roster updates.
    pub fn local_player(mut self, id: PlayerId) -> Self {
        self.local_player = Some(id);
        self
    }

    /// Runs until the connection or the session goes away.
    pub async fn run(
        self,
        mut outbound: mpsc::UnboundedReceiver<PeerMessage>,
    ) -> Result<(), DuelError> {
        let session_id = self.handle.session_id().clone();
        let conn_id = self.conn.id();
        tracing::info!(%session_id, %conn_id, "peer link started");

        let mut opponent = None;
        let read_end = tokio::select! {
            res = self.read_loop(&session_id, &mut opponent) => res,
            res = self.write_loop(&mut outbound) => {
                res?;
                // Session dropped its relay: everything has been sent.
                ReadEnd::SessionGone
            }
        };

        match read_end {
            ReadEnd::PeerGone => {
                tracing::info!(%session_id, %conn_id, "peer connection closed");
                if let Some(who) = opponent {
                    if let Err(err) = self.handle.report_disconnect(who).await {
                        tracing::debug!(%session_id, %err, "disconnect not delivered");
                    }
                }
            }
            ReadEnd::SessionGone => {
                self.write_loop(&mut outbound).await?;
                if let Err(err) = self.conn.close().await {
                    tracing::debug!(%session_id, %err, "close after session end failed");
                }
            }
        }

        tracing::info!(%session_id, %conn_id, "peer link stopped");
        Ok(())
    }

    async fn write_loop(
        &self,
        outbound: &mut mpsc::UnboundedReceiver<PeerMessage>,
    ) -> Result<(), DuelError> {
        while let Some(msg) = outbound.recv().await {
            let bytes = self.codec.encode(&msg)?;
            self.conn.send(&bytes).await?;
        }
        Ok(())
    }

    async fn read_loop(
        &self,
        session_id: &SessionId,
        opponent: &mut Option<PlayerId>,
    ) -> ReadEnd {
        loop {
            let data = match self.conn.recv().await {
                Ok(Some(data)) => data,
                Ok(None) => return ReadEnd::PeerGone,
                Err(err) => {
                    tracing::debug!(%session_id, %err, "recv error");
                    return ReadEnd::PeerGone;
                }
            };

            let msg: PeerMessage = match self.codec.decode(&data) {
                Ok(msg) => msg,
                Err(err) => {
                    tracing::debug!(%session_id, %err, "failed to decode peer message");
                    continue;
                }
            };

            match self.route(session_id, msg, opponent).await {
                Ok(()) => {}
                Err(SessionError::Unavailable(_)) => return ReadEnd::SessionGone,
                Err(err) => {
                    // Rejections are already recorded in the read model.
                    tracing::debug!(%session_id, %err, "peer message rejected");
                }
            }
        }
    }

    /// Hands one decoded message to the session.
    async fn route(
        &self,
        session_id: &SessionId,
        msg: PeerMessage,
        opponent: &mut Option<PlayerId>,
    ) -> Result<(), SessionError> {
        let (target, event) = match msg {
            PeerMessage::Move { session_id: target, mv } => {
                if target != *session_id {
                    self.skip(session_id, &target);
                    return Ok(());
                }
                return self.handle.report_remote_move(mv).await.map(|_| ());
            }
            PeerMessage::Resign { session_id: target, who } => {
                (target, SessionEvent::PeerResigned(who))
            }
            PeerMessage::CloseRoom { session_id: target } => {
                (target.clone(), SessionEvent::RoomClosed(target))
            }
            PeerMessage::Roster { session_id: target, participants } => {
                if let Some(me) = self.local_player {
                    let other = participants
                        .participants()
                        .iter()
                        .map(|p| p.id)
                        .find(|id| *id != me);
                    if other.is_some() {
                        *opponent = other;
                    }
                }
                (target, SessionEvent::RosterChanged(participants))
            }
            PeerMessage::PeerDisconnected { session_id: target, participant } => {
                if Some(participant) == self.local_player {
                    return Ok(());
                }
                (target, SessionEvent::PeerDisconnected(participant))
            }
        };

        if target != *session_id {
            self.skip(session_id, &target);
            return Ok(());
        }
        self.handle.deliver(event).await
    }

    fn skip(&self, session_id: &SessionId, target: &SessionId) {
        tracing::debug!(%session_id, %target, "message for another session, dropping");
    }
}
