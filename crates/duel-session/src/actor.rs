//! Session actor: a Tokio task that owns one `MatchSession`.
//!
//! Moves from the UI, messages from the peer, and timer expiries all land
//! on the same task, so they are applied one at a time in arrival order.
//! Commands are polled before the timer: a move queued ahead of a due
//! expiry is always processed first.

use duel_protocol::{Move, PlayerId, SessionId};
use tokio::sync::{mpsc, oneshot, watch};

use crate::{
    Accepted, MatchSession, MatchSnapshot, MoveRejection, MoveRelay,
    RuleEngine, SessionError, SessionEvent, SessionPhase,
};

/// Commands sent to a session actor.
pub(crate) enum SessionCommand<P> {
    LocalMove {
        mv: Move,
        reply: oneshot::Sender<Result<Accepted<P>, MoveRejection>>,
    },

    RemoteMove {
        mv: Move,
        reply: oneshot::Sender<Result<Accepted<P>, MoveRejection>>,
    },

    /// Fire-and-forget transport or timer event.
    Event(SessionEvent),

    Resign {
        reply: oneshot::Sender<bool>,
    },

    Acknowledge {
        reply: oneshot::Sender<Result<(), SessionError>>,
    },

    Snapshot {
        reply: oneshot::Sender<MatchSnapshot<P>>,
    },

    Shutdown,
}

/// Handle to a running session actor. Cheap to clone.
#[derive(Clone)]
pub struct SessionHandle<P> {
    session_id: SessionId,
    sender: mpsc::Sender<SessionCommand<P>>,
    snapshots: watch::Receiver<MatchSnapshot<P>>,
}

impl<P: Clone + Send + 'static> SessionHandle<P> {
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    fn unavailable(&self) -> SessionError {
        SessionError::Unavailable(self.session_id.clone())
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> SessionCommand<P>,
    ) -> Result<T, SessionError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(build(reply_tx))
            .await
            .map_err(|_| self.unavailable())?;
        reply_rx.await.map_err(|_| self.unavailable())
    }

    /// Plays a move for the local side.
    pub async fn submit_local_move(
        &self,
        mv: Move,
    ) -> Result<Accepted<P>, SessionError> {
        let outcome = self
            .request(|reply| SessionCommand::LocalMove { mv, reply })
            .await?;
        Ok(outcome?)
    }

    /// Replays a move received from the peer.
    pub async fn report_remote_move(
        &self,
        mv: Move,
    ) -> Result<Accepted<P>, SessionError> {
        let outcome = self
            .request(|reply| SessionCommand::RemoteMove { mv, reply })
            .await?;
        Ok(outcome?)
    }

    /// Delivers an inbound event without waiting for it to be applied.
    pub async fn deliver(&self, event: SessionEvent) -> Result<(), SessionError> {
        self.sender
            .send(SessionCommand::Event(event))
            .await
            .map_err(|_| self.unavailable())
    }

    pub async fn report_disconnect(&self, who: PlayerId) -> Result<(), SessionError> {
        self.deliver(SessionEvent::PeerDisconnected(who)).await
    }

    /// Resigns for the local side. `Ok(false)` if the match had already
    /// ended.
    pub async fn request_resign(&self) -> Result<bool, SessionError> {
        self.request(|reply| SessionCommand::Resign { reply }).await
    }

    /// Dismisses the result. The actor stops afterwards.
    pub async fn acknowledge_termination(&self) -> Result<(), SessionError> {
        self.request(|reply| SessionCommand::Acknowledge { reply })
            .await?
    }

    /// A fresh snapshot, including the live remaining time.
    pub async fn snapshot(&self) -> Result<MatchSnapshot<P>, SessionError> {
        self.request(|reply| SessionCommand::Snapshot { reply }).await
    }

    /// The last published snapshot. Still readable after the actor stops.
    pub fn latest(&self) -> MatchSnapshot<P> {
        self.snapshots.borrow().clone()
    }

    /// A receiver that sees every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<MatchSnapshot<P>> {
        self.snapshots.clone()
    }

    /// Tears the session down and stops the actor.
    pub async fn shutdown(&self) -> Result<(), SessionError> {
        self.sender
            .send(SessionCommand::Shutdown)
            .await
            .map_err(|_| self.unavailable())
    }

    /// `true` once the actor has stopped.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

struct SessionActor<E: RuleEngine, R: MoveRelay> {
    session: MatchSession<E, R>,
    receiver: mpsc::Receiver<SessionCommand<E::Position>>,
    publisher: watch::Sender<MatchSnapshot<E::Position>>,
}

impl<E: RuleEngine, R: MoveRelay> SessionActor<E, R> {
    async fn run(mut self) {
        let session_id = self.session.session_id().clone();
        tracing::info!(%session_id, "session actor started");

        loop {
            tokio::select! {
                biased;

                cmd = self.receiver.recv() => {
                    match cmd {
                        Some(SessionCommand::Shutdown) | None => {
                            self.session.teardown();
                            self.publish();
                            break;
                        }
                        Some(cmd) => self.handle_command(cmd),
                    }
                }

                event = self.session.timer_mut().wait_for_event() => {
                    self.session.on_timer_event(event);
                }
            }

            self.publish();
            if self.session.phase() == SessionPhase::TornDown {
                break;
            }
        }

        tracing::info!(%session_id, "session actor stopped");
    }

    fn handle_command(&mut self, cmd: SessionCommand<E::Position>) {
        match cmd {
            SessionCommand::LocalMove { mv, reply } => {
                let _ = reply.send(self.session.submit_local_move(mv));
            }
            SessionCommand::RemoteMove { mv, reply } => {
                let _ = reply.send(self.session.report_remote_move(mv));
            }
            SessionCommand::Event(event) => {
                if let Err(err) = self.session.handle(event) {
                    tracing::debug!(
                        session_id = %self.session.session_id(),
                        %err,
                        "event rejected"
                    );
                }
            }
            SessionCommand::Resign { reply } => {
                let _ = reply.send(self.session.request_resign());
            }
            SessionCommand::Acknowledge { reply } => {
                let _ = reply.send(self.session.acknowledge_termination());
            }
            SessionCommand::Snapshot { reply } => {
                let _ = reply.send(self.session.snapshot());
            }
            SessionCommand::Shutdown => {
                self.session.teardown();
            }
        }
    }

    fn publish(&self) {
        self.publisher.send_replace(self.session.snapshot());
    }
}

/// Spawns a session actor and returns a handle to it.
///
/// `channel_size` bounds the command queue; senders wait when it is full.
pub fn spawn_session<E: RuleEngine, R: MoveRelay>(
    session: MatchSession<E, R>,
    channel_size: usize,
) -> SessionHandle<E::Position> {
    let (tx, rx) = mpsc::channel(channel_size.max(1));
    let (publisher, snapshots) = watch::channel(session.snapshot());
    let session_id = session.session_id().clone();

    let actor = SessionActor {
        session,
        receiver: rx,
        publisher,
    };
    tokio::spawn(actor.run());

    SessionHandle {
        session_id,
        sender: tx,
        snapshots,
    }
}
