use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::game::{MAX_CHOICE, MIN_CHOICE};

/// Opaque handle of one transport connection.
pub type ConnectionId = Uuid;

/// Stable external identifier of a match.
pub type MatchId = Uuid;

/// A number shown by a player on one ball, always within `MIN_CHOICE..=MAX_CHOICE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Choice(u8);

impl Choice {
    /// Build a choice from a raw wire integer, `None` when out of range.
    pub fn new(value: i64) -> Option<Self> {
        if (MIN_CHOICE as i64..=MAX_CHOICE as i64).contains(&value) {
            Some(Self(value as u8))
        } else {
            None
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Role a side plays during the current innings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Batsman,
    Bowler,
}

impl Role {
    pub fn swapped(self) -> Self {
        match self {
            Role::Batsman => Role::Bowler,
            Role::Bowler => Role::Batsman,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Innings {
    First,
    Second,
}

/// A connected player as the core sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub connection: ConnectionId,
    pub username: String,
}

impl Participant {
    pub fn new(connection: ConnectionId, username: impl Into<String>) -> Self {
        Self {
            connection,
            username: username.into(),
        }
    }
}

/// Identifies the ball a timer was armed for.
///
/// A timeout carrying a ticket that no longer matches the ball in flight is stale
/// and must be ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BallTicket {
    pub innings: Innings,
    /// Balls already played in `innings` when the timer was armed.
    pub ball: u8,
}

/// How a single ball was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BallOutcome {
    Runs(u8),
    Dismissed,
}
