/// WebSocket session handler for a hand cricket player.
///
/// This actor manages a single connection: it registers the session with the
/// matchmaking server, decodes and validates client frames before relaying them,
/// and serializes server events back to the client.
use actix::prelude::*;
use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use log::{debug, warn};
use std::borrow::Cow;
use uuid::Uuid;

use super::messages::{ClientWsMessage, Inbound};
use super::server::{ClientMessage, Connect, Disconnect, Join, MatchmakingServer};
use crate::game::events::ServerEvent;
use crate::game::types::ConnectionId;
use crate::server::ws_error::ws_error_message;

/// Represents one player's WebSocket connection.
pub struct MatchmakingSession {
    pub connection: ConnectionId,
    /// Username supplied on the connection URL; joins immediately when present.
    pub username: Option<String>,
    pub matchmaking_addr: Addr<MatchmakingServer>,
}

impl MatchmakingSession {
    fn join(&self, username: String) {
        self.matchmaking_addr.do_send(Join {
            connection: self.connection,
            username,
        });
    }
}

impl Actor for MatchmakingSession {
    type Context = ws::WebsocketContext<Self>;

    /// Called when the session starts. Registers the connection with the matchmaking server.
    fn started(&mut self, ctx: &mut Self::Context) {
        self.matchmaking_addr.do_send(Connect {
            connection: self.connection,
            addr: ctx.address().recipient(),
        });
        if let Some(username) = self.username.take() {
            self.join(username);
        }
    }

    /// Called when the session stops. Removes the player from the matchmaking server.
    fn stopped(&mut self, _ctx: &mut Self::Context) {
        self.matchmaking_addr.do_send(Disconnect {
            connection: self.connection,
        });
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for MatchmakingSession {
    /// Handles incoming WebSocket messages from the client.
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Text(text)) => match ClientWsMessage::parse(&text) {
                Ok(Inbound::Join { username }) => self.join(username),
                Ok(Inbound::Event(event)) => {
                    self.matchmaking_addr.do_send(ClientMessage {
                        connection: self.connection,
                        event,
                    });
                }
                Err(e) => {
                    warn!("[Session] {} sent a bad frame: {}", self.connection, e);
                    ctx.notify(e.to_event());
                }
            },
            Ok(ws::Message::Binary(_)) => {
                warn!("[Session] {} sent a binary frame, ignored", self.connection);
            }
            Ok(ws::Message::Ping(msg)) => ctx.pong(&msg),
            Ok(ws::Message::Close(reason)) => {
                debug!("[Session] {} closed: {:?}", self.connection, reason);
                ctx.close(reason);
                ctx.stop();
            }
            Err(e) => {
                warn!("[Session] {} protocol error: {}", self.connection, e);
                ctx.stop();
            }
            _ => (),
        }
    }
}

impl Handler<ServerEvent> for MatchmakingSession {
    type Result = ();

    /// Handles events sent from the server to this session.
    fn handle(&mut self, msg: ServerEvent, ctx: &mut Self::Context) {
        match serde_json::to_string(&msg) {
            Ok(text) => ctx.text(text),
            Err(e) => {
                // Serialization error: notify client and close connection.
                warn!("[Session] Failed to serialize {:?}: {}", msg, e);
                ctx.text(ws_error_message("INTERNAL", "Internal server error"));
                ctx.close(Some(ws::CloseReason {
                    code: ws::CloseCode::Error,
                    description: Some("Internal server error".into()),
                }));
                ctx.stop();
            }
        }
    }
}

/// WebSocket endpoint for players.
///
/// Accepts an optional `username` query parameter; without it the client must send
/// a `join` frame before being paired.
pub async fn ws_matchmaking(
    req: HttpRequest,
    stream: web::Payload,
    data: web::Data<crate::server::state::AppState>,
) -> Result<HttpResponse, Error> {
    let mut username = None;

    for kv in req.query_string().split('&') {
        let mut split = kv.split('=');
        if let (Some("username"), Some(name)) = (split.next(), split.next()) {
            let name = urlencoding::decode(name).unwrap_or(Cow::Borrowed(""));
            let name = name.trim();
            if !name.is_empty() {
                username = Some(name.to_string());
            }
        }
    }

    let connection = Uuid::new_v4();
    debug!("[Session] New connection {} (username: {:?})", connection, username);

    ws::start(
        MatchmakingSession {
            connection,
            username,
            matchmaking_addr: data.matchmaking_addr.clone(),
        },
        &req,
        stream,
    )
}
