use serde::{Deserialize, Serialize};

use crate::game::types::Choice;
use crate::server::ws_error::ProtocolError;

/// Client -> server frame, tagged by `event`.
#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Join {
        #[serde(default)]
        username: String,
    },
    BallMove {
        choice: i64,
    },
}

/// Event forwarded into the match a connection plays in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClientEvent {
    BallMove(Choice),
}

/// A validated client frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Inbound {
    Join { username: String },
    Event(ClientEvent),
}

impl ClientWsMessage {
    /// Decode and validate a text frame.
    pub fn parse(text: &str) -> Result<Inbound, ProtocolError> {
        match serde_json::from_str::<ClientWsMessage>(text)? {
            ClientWsMessage::Join { username } => {
                let username = username.trim();
                if username.is_empty() {
                    return Err(ProtocolError::MissingUsername);
                }
                Ok(Inbound::Join {
                    username: username.to_string(),
                })
            }
            ClientWsMessage::BallMove { choice } => Choice::new(choice)
                .map(|c| Inbound::Event(ClientEvent::BallMove(c)))
                .ok_or(ProtocolError::ChoiceOutOfRange(choice)),
        }
    }
}

/// Snapshot of the matchmaking state, served on `/stats`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct MatchmakingStats {
    pub connected: usize,
    pub pending: Option<String>,
    pub live_matches: usize,
}
