//! Events pushed from the server to connected players.
//!
//! Every event is a JSON object tagged by its `event` name, with camelCase fields.

use actix::prelude::*;
use serde::Serialize;

use super::types::MatchId;

/// Why a match ended without (or instead of) a winner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GameOverReason {
    /// Both sides finished on the same score.
    Draw,
    /// One side left before the match concluded.
    ParticipantDisconnected,
}

/// Server -> client messages.
#[derive(Message, Serialize, Clone, Debug, PartialEq)]
#[rtype(result = "()")]
#[serde(tag = "event", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ServerEvent {
    WaitingForOpponent,
    InitGame {
        match_id: MatchId,
        opponent_name: String,
    },
    /// Dot ball, always `choice: 0`.
    BallMove {
        choice: u8,
    },
    BallResult {
        batsman_choice: u8,
        bowler_choice: u8,
        runs: u8,
        score: u32,
        balls_played: u8,
    },
    Out {
        batsman_choice: u8,
        bowler_choice: u8,
    },
    InningsOver {
        target_score: u32,
    },
    GameOver {
        #[serde(skip_serializing_if = "Option::is_none")]
        winner: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<GameOverReason>,
    },
    Error {
        code: String,
        message: String,
    },
}

impl ServerEvent {
    pub fn init_game(match_id: MatchId, opponent_name: &str) -> Self {
        Self::InitGame {
            match_id,
            opponent_name: opponent_name.to_string(),
        }
    }

    pub fn dot_ball() -> Self {
        Self::BallMove { choice: 0 }
    }

    pub fn winner(username: &str) -> Self {
        Self::GameOver {
            winner: Some(username.to_string()),
            reason: None,
        }
    }

    pub fn ended(reason: GameOverReason) -> Self {
        Self::GameOver {
            winner: None,
            reason: Some(reason),
        }
    }

    pub fn error(code: &str, message: &str) -> Self {
        Self::Error {
            code: code.to_string(),
            message: message.to_string(),
        }
    }
}
