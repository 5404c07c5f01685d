/// Matchmaking server actor.
///
/// Single dispatch point for every connection: registers sessions, pairs participants,
/// routes ball moves into their match and tears matches down on disconnect.
/// Hosts the `MatchRegistry` and provides it with delivery and per-ball timers.

use actix::prelude::*;
use std::collections::HashMap;
use std::time::Duration;
use log::{debug, info};

use super::messages::{ClientEvent, MatchmakingStats};
use super::registry::{JoinOutcome, LeaveOutcome, MatchRegistry, RouteOutcome};
use crate::game::events::ServerEvent;
use crate::game::state::{MatchHost, MatchSettings, MoveOutcome};
use crate::game::types::{BallTicket, ConnectionId, MatchId};

type SessionAddr = Recipient<ServerEvent>;

/// Main matchmaking server actor.
pub struct MatchmakingServer {
    /// Live sessions, keyed by connection.
    sessions: HashMap<ConnectionId, SessionAddr>,
    registry: MatchRegistry<SpawnHandle>,
}

impl MatchmakingServer {
    pub fn new(settings: MatchSettings) -> Self {
        Self {
            sessions: HashMap::new(),
            registry: MatchRegistry::new(settings),
        }
    }

    fn ball_timeout(&mut self, match_id: MatchId, ticket: BallTicket, ctx: &mut Context<Self>) {
        let mut host = ActorHost { sessions: &self.sessions, ctx };
        if !self.registry.on_ball_timeout(match_id, ticket, &mut host) {
            debug!("[Matchmaking] Timeout {:?} for match {} had nothing to resolve", ticket, match_id);
        }
    }
}

/// `MatchHost` backed by the actor context: delivery through session recipients,
/// timers through `run_later`.
struct ActorHost<'a> {
    sessions: &'a HashMap<ConnectionId, SessionAddr>,
    ctx: &'a mut Context<MatchmakingServer>,
}

impl MatchHost for ActorHost<'_> {
    type Timer = SpawnHandle;

    fn deliver(&mut self, to: ConnectionId, event: ServerEvent) {
        match self.sessions.get(&to) {
            Some(addr) => addr.do_send(event),
            None => debug!("[Matchmaking] No live session for {}, dropping {:?}", to, event),
        }
    }

    fn arm_ball_timer(&mut self, match_id: MatchId, ticket: BallTicket, after: Duration) -> SpawnHandle {
        self.ctx.run_later(after, move |act, ctx| {
            act.ball_timeout(match_id, ticket, ctx);
        })
    }

    fn cancel_ball_timer(&mut self, timer: SpawnHandle) {
        self.ctx.cancel_future(timer);
    }
}

/// Message: a WebSocket session opened.
#[derive(Message)]
#[rtype(result = "()")]
pub struct Connect {
    pub connection: ConnectionId,
    pub addr: SessionAddr,
}

/// Message: a connection asks to be paired.
#[derive(Message)]
#[rtype(result = "()")]
pub struct Join {
    pub connection: ConnectionId,
    pub username: String,
}

/// Message: an in-match event from a connection.
#[derive(Message)]
#[rtype(result = "()")]
pub struct ClientMessage {
    pub connection: ConnectionId,
    pub event: ClientEvent,
}

/// Message: a WebSocket session closed.
#[derive(Message)]
#[rtype(result = "()")]
pub struct Disconnect {
    pub connection: ConnectionId,
}

/// Message: read the current matchmaking counters.
#[derive(Message)]
#[rtype(result = "MatchmakingStats")]
pub struct GetStats;

impl Actor for MatchmakingServer {
    type Context = Context<Self>;

    fn started(&mut self, _ctx: &mut Self::Context) {
        info!("[Matchmaking] Server started");
    }
}

impl Handler<Connect> for MatchmakingServer {
    type Result = ();

    fn handle(&mut self, msg: Connect, _ctx: &mut Self::Context) -> Self::Result {
        debug!("[Matchmaking] Session {} connected", msg.connection);
        self.sessions.insert(msg.connection, msg.addr);
    }
}

impl Handler<Join> for MatchmakingServer {
    type Result = ();

    fn handle(&mut self, msg: Join, ctx: &mut Self::Context) -> Self::Result {
        let mut host = ActorHost { sessions: &self.sessions, ctx };
        match self.registry.join(msg.connection, &msg.username, &mut host) {
            JoinOutcome::Paired(match_id) => {
                debug!("[Matchmaking] {} completed match {}", msg.connection, match_id);
            }
            JoinOutcome::Waiting | JoinOutcome::Ignored => {}
        }
    }
}

impl Handler<ClientMessage> for MatchmakingServer {
    type Result = ();

    fn handle(&mut self, msg: ClientMessage, ctx: &mut Self::Context) -> Self::Result {
        let mut host = ActorHost { sessions: &self.sessions, ctx };
        if let RouteOutcome::Routed(match_id, MoveOutcome::Ignored) =
            self.registry.route_message(msg.connection, msg.event, &mut host)
        {
            debug!("[Matchmaking] Match {} ignored {:?} from {}", match_id, msg.event, msg.connection);
        }
    }
}

impl Handler<Disconnect> for MatchmakingServer {
    type Result = ();

    fn handle(&mut self, msg: Disconnect, ctx: &mut Self::Context) -> Self::Result {
        // Forget the session first so teardown events only reach the remaining side.
        self.sessions.remove(&msg.connection);
        let mut host = ActorHost { sessions: &self.sessions, ctx };
        if let LeaveOutcome::Unknown = self.registry.leave(msg.connection, &mut host) {
            debug!("[Matchmaking] Session {} closed before joining", msg.connection);
        }
    }
}

impl Handler<GetStats> for MatchmakingServer {
    type Result = MessageResult<GetStats>;

    fn handle(&mut self, _msg: GetStats, _ctx: &mut Self::Context) -> Self::Result {
        MessageResult(MatchmakingStats {
            connected: self.registry.connected_count(),
            pending: self.registry.pending().map(|p| p.username.clone()),
            live_matches: self.registry.match_count(),
        })
    }
}
