/// Protocol errors raised while decoding client frames, and the error frames sent back.
///
/// Errors are answered to the originating connection only; they never reach a match.
use thiserror::Error;

use crate::config::game::{MAX_CHOICE, MIN_CHOICE};
use crate::game::events::ServerEvent;

#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Not JSON, unknown `event` tag, or wrongly typed payload.
    #[error("Invalid client message: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("A non-empty username is required to join")]
    MissingUsername,

    #[error("Choice must be between {min} and {max}, got {0}", min = MIN_CHOICE, max = MAX_CHOICE)]
    ChoiceOutOfRange(i64),
}

impl ProtocolError {
    /// Unique error code (e.g. "INVALID_MESSAGE").
    pub fn code(&self) -> &'static str {
        match self {
            ProtocolError::Malformed(_) => "INVALID_MESSAGE",
            ProtocolError::MissingUsername => "MISSING_USERNAME",
            ProtocolError::ChoiceOutOfRange(_) => "INVALID_CHOICE",
        }
    }

    /// The error frame sent back to the client.
    pub fn to_event(&self) -> ServerEvent {
        ServerEvent::error(self.code(), &self.to_string())
    }
}

/// Formats a WebSocket error frame as a JSON string.
///
/// Used where no typed event can be produced, e.g. when serialising an event failed.
pub fn ws_error_message(code: &str, message: &str) -> String {
    serde_json::json!({ "event": "error", "code": code, "message": message }).to_string()
}
