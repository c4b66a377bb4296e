//! `DuelClient` builder and handle.
//!
//! Ties the layers together for one match: connection → codec →
//! `PeerLink` → session actor.

use std::sync::Arc;

use duel_protocol::{JsonCodec, Move, PlayerId, Roster, SessionId, Turn};
use duel_session::{
    Accepted, ChannelRelay, MatchConfig, MatchSession, MatchSnapshot, RuleEngine, SessionHandle,
    spawn_session,
};
use duel_transport::{ClientConnection, Connection, TransportError};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::{DuelError, PeerLink};

/// Builder for a client taking part in one match.
///
/// # Example
///
/// ```rust,ignore
/// use duel::prelude::*;
///
/// let client = DuelClientBuilder::new()
///     .url("ws://relay.example:8080/room-1")
///     .session_id(SessionId::new("room-1"))
///     .local_side(Turn::Second)
///     .connect(MyChessEngine::new())
///     .await?;
/// client.submit_local_move(Move::new("e7", "e5", Turn::Second)).await?;
/// ```
#[derive(Debug, Clone)]
pub struct DuelClientBuilder {
    url: String,
    session_id: Option<SessionId>,
    local_side: Turn,
    local_player: Option<PlayerId>,
    roster: Option<Roster>,
    config: MatchConfig,
}

impl DuelClientBuilder {
    pub fn new() -> Self {
        Self {
            url: "ws://127.0.0.1:8080".to_string(),
            session_id: None,
            local_side: Turn::First,
            local_player: None,
            roster: None,
            config: MatchConfig::default(),
        }
    }

    /// Relay address.
    pub fn url(mut self, url: &str) -> Self {
        self.url = url.to_string();
        self
    }

    /// Session to join. A random id is generated if unset.
    pub fn session_id(mut self, session_id: SessionId) -> Self {
        self.session_id = Some(session_id);
        self
    }

    /// The side this client plays.
    pub fn local_side(mut self, side: Turn) -> Self {
        self.local_side = side;
        self
    }

    /// This client's participant id.
    pub fn local_player(mut self, id: PlayerId) -> Self {
        self.local_player = Some(id);
        self
    }

    /// Roster known before the relay sends one.
    pub fn roster(mut self, roster: Roster) -> Self {
        self.roster = Some(roster);
        self
    }

    pub fn match_config(mut self, config: MatchConfig) -> Self {
        self.config = config;
        self
    }

    /// Connects to the relay over WebSocket and starts the session.
    pub async fn connect<E: RuleEngine>(
        self,
        engine: E,
    ) -> Result<DuelClient<E::Position>, DuelError> {
        let conn = ClientConnection::connect(&self.url).await?;
        Ok(self.attach(conn, engine))
    }

    /// Starts the session over an already-open connection.
    pub fn attach<C, E>(self, conn: C, engine: E) -> DuelClient<E::Position>
    where
        C: Connection<Error = TransportError>,
        E: RuleEngine,
    {
        let session_id = self.session_id.unwrap_or_else(SessionId::generate);
        let (relay, outbound) = ChannelRelay::new();

        let mut session =
            MatchSession::new(session_id, self.local_side, engine, relay, &self.config);
        if let Some(roster) = self.roster {
            session.update_roster(roster);
        }
        let handle = spawn_session(session, self.config.channel_size);

        let mut link = PeerLink::new(Arc::new(conn), JsonCodec, handle.clone());
        if let Some(id) = self.local_player {
            link = link.local_player(id);
        }
        let link = tokio::spawn(link.run(outbound));

        DuelClient { handle, link }
    }
}

impl Default for DuelClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// One running match: a session actor plus its peer link.
pub struct DuelClient<P> {
    handle: SessionHandle<P>,
    link: JoinHandle<Result<(), DuelError>>,
}

impl<P: Clone + Send + Sync + 'static> DuelClient<P> {
    pub fn session_id(&self) -> &SessionId {
        self.handle.session_id()
    }

    /// The underlying session handle, for callers that need the full
    /// event surface.
    pub fn handle(&self) -> &SessionHandle<P> {
        &self.handle
    }

    /// Plays a move for the local side and relays it to the peer.
    pub async fn submit_local_move(&self, mv: Move) -> Result<Accepted<P>, DuelError> {
        Ok(self.handle.submit_local_move(mv).await?)
    }

    pub async fn request_resign(&self) -> Result<bool, DuelError> {
        Ok(self.handle.request_resign().await?)
    }

    /// Dismisses the result, closes the room, and stops the session.
    pub async fn acknowledge_termination(&self) -> Result<(), DuelError> {
        Ok(self.handle.acknowledge_termination().await?)
    }

    pub async fn snapshot(&self) -> Result<MatchSnapshot<P>, DuelError> {
        Ok(self.handle.snapshot().await?)
    }

    pub fn latest(&self) -> MatchSnapshot<P> {
        self.handle.latest()
    }

    pub fn subscribe(&self) -> watch::Receiver<MatchSnapshot<P>> {
        self.handle.subscribe()
    }

    /// Stops the session and waits for the link to flush and close.
    pub async fn shutdown(self) -> Result<(), DuelError> {
        // Already stopped is fine.
        let _ = self.handle.shutdown().await;
        self.closed().await
    }

    /// Waits for the link to end on its own.
    pub async fn closed(self) -> Result<(), DuelError> {
        match self.link.await {
            Ok(result) => result,
            Err(err) => {
                tracing::warn!(
                    session_id = %self.handle.session_id(),
                    %err,
                    "peer link task failed"
                );
                Ok(())
            }
        }
    }
}
