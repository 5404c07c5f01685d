/// Game configuration constants.
/// 
/// This module defines the hand cricket rules parameters such as the per-ball
/// timeout, innings length and the valid range of choices.
pub const BALL_TIMEOUT_MS: u64 = 6000; // Time a ball stays open before it resolves as a dot ball.

/// Number of balls a side bats for unless dismissed earlier.
pub const BALLS_PER_INNINGS: u8 = 6;

/// Smallest number a player may show.
pub const MIN_CHOICE: u8 = 1;

/// Largest number a player may show.
pub const MAX_CHOICE: u8 = 6;
