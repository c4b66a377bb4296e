//! `MatchSession`: the state machine behind one match.
//!
//! Every mutation funnels through this type. It owns the synchronizer
//! (position + turn), the turn timer, and the arbiter (result), and talks
//! to the peer only through its [`MoveRelay`]. It is synchronous and
//! lock-free; the actor in [`crate::spawn_session`] serializes access when
//! events arrive from several sources.

use std::time::Duration;

use duel_protocol::{MatchResult, Move, PlayerId, Roster, SessionId, Turn};
use duel_timer::{TimerEvent, TurnTimer};

use crate::arbiter::{Termination, TerminationArbiter};
use crate::synchronizer::MoveSynchronizer;
use crate::{
    Accepted, DesyncCause, MatchConfig, MoveRejection, MoveRelay, MoveSource,
    RuleEngine, SessionError, SessionPhase,
};

/// Read model of a session, as shown to the presentation layer.
#[derive(Debug, Clone)]
pub struct MatchSnapshot<P> {
    pub session_id: SessionId,
    pub local_side: Turn,
    pub position: P,
    pub turn: Turn,
    /// Time left for the side to move.
    pub remaining: Duration,
    /// Generation of the running countdown.
    pub generation: u64,
    pub result: MatchResult,
    pub phase: SessionPhase,
    pub roster_complete: bool,
    /// Most recent peer disagreement, if any. Recovery is up to the host.
    pub last_desync: Option<DesyncCause>,
}

/// Inbound events from the transport and the timer.
///
/// The local player's own intents (moves, resign, acknowledge) have
/// dedicated methods because their callers want a direct answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The peer played a move.
    RemoteMove(Move),
    /// The relay lost a participant.
    PeerDisconnected(PlayerId),
    /// The peer resigned.
    PeerResigned(Turn),
    /// The peer acknowledged the result and closed the room.
    RoomClosed(SessionId),
    /// The relay's roster changed.
    RosterChanged(Roster),
    /// A countdown reached zero.
    TimerExpired { generation: u64 },
}

/// One match between the local participant and a peer.
pub struct MatchSession<E: RuleEngine, R: MoveRelay> {
    session_id: SessionId,
    local_side: Turn,
    roster: Roster,
    sync: MoveSynchronizer<E>,
    timer: TurnTimer,
    arbiter: TerminationArbiter,
    relay: R,
    phase: SessionPhase,
    last_desync: Option<DesyncCause>,
}

impl<E: RuleEngine, R: MoveRelay> MatchSession<E, R> {
    /// Creates a session at the engine's starting position with an
    /// empty roster. The countdown starts once the roster is complete.
    pub fn new(
        session_id: SessionId,
        local_side: Turn,
        engine: E,
        relay: R,
        config: &MatchConfig,
    ) -> Self {
        let sync = MoveSynchronizer::new(engine);
        tracing::info!(
            %session_id,
            %local_side,
            turn = %sync.turn(),
            "match session created"
        );
        Self {
            session_id,
            local_side,
            roster: Roster::new(),
            sync,
            timer: TurnTimer::new(config.timer_config()),
            arbiter: TerminationArbiter::new(),
            relay,
            phase: SessionPhase::Active,
            last_desync: None,
        }
    }

    /// Same as [`new`](Self::new), seeded with a roster.
    pub fn with_roster(mut self, roster: Roster) -> Self {
        self.update_roster(roster);
        self
    }

    // -----------------------------------------------------------------------
    // Moves
    // -----------------------------------------------------------------------

    /// Validates and applies a move.
    ///
    /// Checks, in order: session still running (`AlreadyOver`), local
    /// moves need a full roster (`OpponentAbsent`), mover is the side to
    /// move (`NotYourTurn`, or `DesyncDetected` for remote moves), and the
    /// engine accepts it (`IllegalMove`, or `DesyncDetected`). A rejection
    /// leaves the session untouched.
    ///
    /// On acceptance the countdown restarts, local moves are broadcast,
    /// and a game-over position concludes the match before returning.
    pub fn submit(
        &mut self,
        mv: Move,
        source: MoveSource,
    ) -> Result<Accepted<E::Position>, MoveRejection> {
        match self.try_apply(&mv, source) {
            Ok(accepted) => Ok(accepted),
            Err(rejection) => {
                if let MoveRejection::DesyncDetected(cause) = &rejection {
                    tracing::warn!(
                        session_id = %self.session_id,
                        mv = %mv,
                        %cause,
                        "remote move rejected, peers out of sync"
                    );
                    self.last_desync = Some(cause.clone());
                } else {
                    tracing::debug!(
                        session_id = %self.session_id,
                        mv = %mv,
                        ?source,
                        %rejection,
                        "move rejected"
                    );
                }
                Err(rejection)
            }
        }
    }

    fn try_apply(
        &mut self,
        mv: &Move,
        source: MoveSource,
    ) -> Result<Accepted<E::Position>, MoveRejection> {
        if !self.phase.is_active() || self.arbiter.is_terminal() {
            return Err(MoveRejection::AlreadyOver);
        }
        if source == MoveSource::Local && !self.roster.is_complete() {
            return Err(MoveRejection::OpponentAbsent);
        }

        let accepted = self.sync.apply(mv, source, self.local_side)?;
        let generation = self.timer.restart();
        tracing::debug!(
            session_id = %self.session_id,
            mv = %mv,
            ?source,
            turn = %accepted.turn,
            generation,
            "move accepted"
        );

        if source == MoveSource::Local {
            self.relay.broadcast_move(mv, &self.session_id);
        }

        if let Some(outcome) = self.sync.outcome() {
            self.conclude([outcome]);
        }
        Ok(accepted)
    }

    /// A move made on this client.
    pub fn submit_local_move(
        &mut self,
        mv: Move,
    ) -> Result<Accepted<E::Position>, MoveRejection> {
        self.submit(mv, MoveSource::Local)
    }

    /// A move delivered by the peer.
    pub fn report_remote_move(
        &mut self,
        mv: Move,
    ) -> Result<Accepted<E::Position>, MoveRejection> {
        self.submit(mv, MoveSource::Remote)
    }

    // -----------------------------------------------------------------------
    // Termination inputs
    // -----------------------------------------------------------------------

    /// The relay lost `who`. Ends the match unless it already ended.
    ///
    /// Once a roster is known, only its participants count; a departure
    /// of anyone else is ignored.
    pub fn report_disconnect(&mut self, who: PlayerId) -> bool {
        if !self.phase.is_active() {
            return false;
        }
        if !self.roster.is_empty() && self.roster.remove(who).is_none() {
            tracing::debug!(
                session_id = %self.session_id,
                %who,
                "disconnect of a non-participant, ignoring"
            );
            return false;
        }
        self.conclude([Termination::Disconnected { who }])
    }

    /// The local player resigns. The peer is told about it.
    pub fn request_resign(&mut self) -> bool {
        if !self.phase.is_active() {
            return false;
        }
        let who = self.local_side;
        let concluded = self.conclude([Termination::Resignation { who }]);
        if concluded {
            self.relay.announce_resignation(who, &self.session_id);
        }
        concluded
    }

    /// The peer says `who` resigned.
    pub fn report_peer_resignation(&mut self, who: Turn) -> bool {
        if !self.phase.is_active() {
            return false;
        }
        if who == self.local_side {
            tracing::warn!(
                session_id = %self.session_id,
                %who,
                "peer claims the local side resigned, ignoring"
            );
            return false;
        }
        self.conclude([Termination::Resignation { who }])
    }

    /// Feeds a timer event. Ticks change nothing; expiries go through
    /// [`on_timer_expired`](Self::on_timer_expired).
    pub fn on_timer_event(&mut self, event: TimerEvent) -> bool {
        match event {
            TimerEvent::Tick { .. } => false,
            TimerEvent::Expired { generation } => self.on_timer_expired(generation),
        }
    }

    /// A countdown started under `generation` reached zero.
    ///
    /// Forfeits the side to move, unless the match is over or the signal
    /// belongs to an earlier turn.
    pub fn on_timer_expired(&mut self, generation: u64) -> bool {
        if !self.phase.is_active() || self.arbiter.is_terminal() {
            return false;
        }
        let current = self.timer.generation();
        if generation != current {
            tracing::debug!(
                session_id = %self.session_id,
                generation,
                current,
                "discarding stale timer expiry"
            );
            return false;
        }
        let winner = self.sync.turn().opponent();
        self.conclude([Termination::Timeout { winner }])
    }

    fn conclude<const N: usize>(&mut self, candidates: [Termination; N]) -> bool {
        let Some(result) = self.arbiter.conclude(candidates) else {
            return false;
        };
        tracing::info!(
            session_id = %self.session_id,
            %result,
            "match concluded"
        );
        self.timer.cancel();
        self.enter(SessionPhase::Concluded);
        true
    }

    fn enter(&mut self, phase: SessionPhase) {
        debug_assert!(
            self.phase.can_transition_to(phase),
            "invalid phase transition {} -> {phase}",
            self.phase
        );
        self.phase = phase;
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Replaces the roster. Starts the first countdown when both
    /// participants are present.
    pub fn update_roster(&mut self, roster: Roster) {
        if !self.phase.is_active() {
            return;
        }
        self.roster = roster;
        if self.roster.is_complete()
            && !self.timer.is_running()
            && self.timer.generation() == 0
        {
            let generation = self.timer.restart();
            tracing::info!(
                session_id = %self.session_id,
                generation,
                "both participants present, countdown started"
            );
        }
    }

    /// The local player dismissed the result.
    ///
    /// The first call tears the session down and tells the peer the room
    /// is closed; later calls do nothing.
    ///
    /// # Errors
    /// [`SessionError::StillOngoing`] while the match has no result.
    pub fn acknowledge_termination(&mut self) -> Result<(), SessionError> {
        if self.arbiter.acknowledge()? {
            self.relay.close_room(&self.session_id);
            self.teardown();
        }
        Ok(())
    }

    /// The peer closed the room. Tears down without touching the result.
    pub fn room_closed(&mut self, session_id: &SessionId) -> bool {
        if *session_id != self.session_id {
            tracing::debug!(
                session_id = %self.session_id,
                closed = %session_id,
                "close for another room, ignoring"
            );
            return false;
        }
        self.teardown()
    }

    /// Cancels the countdown and makes every later input a no-op.
    /// Idempotent; returns `true` only on the call that tore down.
    pub fn teardown(&mut self) -> bool {
        if self.phase == SessionPhase::TornDown {
            return false;
        }
        self.timer.cancel();
        self.enter(SessionPhase::TornDown);
        tracing::info!(
            session_id = %self.session_id,
            result = %self.arbiter.result(),
            "match session torn down"
        );
        true
    }

    // -----------------------------------------------------------------------
    // Single entry point for transport/timer events
    // -----------------------------------------------------------------------

    /// Applies one inbound event.
    ///
    /// # Errors
    /// Only `RemoteMove` can fail, with the move's rejection.
    pub fn handle(&mut self, event: SessionEvent) -> Result<(), SessionError> {
        match event {
            SessionEvent::RemoteMove(mv) => {
                self.report_remote_move(mv)?;
            }
            SessionEvent::PeerDisconnected(who) => {
                self.report_disconnect(who);
            }
            SessionEvent::PeerResigned(who) => {
                self.report_peer_resignation(who);
            }
            SessionEvent::RoomClosed(session_id) => {
                self.room_closed(&session_id);
            }
            SessionEvent::RosterChanged(roster) => self.update_roster(roster),
            SessionEvent::TimerExpired { generation } => {
                self.on_timer_expired(generation);
            }
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn snapshot(&self) -> MatchSnapshot<E::Position> {
        MatchSnapshot {
            session_id: self.session_id.clone(),
            local_side: self.local_side,
            position: self.sync.position().clone(),
            turn: self.sync.turn(),
            remaining: self.timer.remaining(),
            generation: self.timer.generation(),
            result: self.arbiter.result().clone(),
            phase: self.phase,
            roster_complete: self.roster.is_complete(),
            last_desync: self.last_desync.clone(),
        }
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn local_side(&self) -> Turn {
        self.local_side
    }

    pub fn position(&self) -> &E::Position {
        self.sync.position()
    }

    pub fn turn(&self) -> Turn {
        self.sync.turn()
    }

    pub fn result(&self) -> &MatchResult {
        self.arbiter.result()
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Remaining time and generation of the countdown.
    pub fn timer_state(&self) -> duel_timer::TimerState {
        self.timer.state()
    }

    /// The countdown, for the actor's `select!` loop.
    pub(crate) fn timer_mut(&mut self) -> &mut TurnTimer {
        &mut self.timer
    }
}
