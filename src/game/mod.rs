//! Hand cricket rules core.
//!
//! Pure state: value types, the per-match state machine and the events it emits.
//! Delivery and scheduling are supplied by the hosting actor through `MatchHost`.

pub mod events;
pub mod state;
pub mod types;

#[cfg(test)]
pub mod testing;
