//! Test doubles for driving matches without an actor system.

use std::time::Duration;

use super::events::ServerEvent;
use super::state::MatchHost;
use super::types::{BallTicket, ConnectionId, MatchId};

/// Records every delivered event and every timer the match asks for.
///
/// Timers are sequential integers; tests fire them by hand with [`RecordingHost::fire_next`].
#[derive(Default)]
pub struct RecordingHost {
    pub delivered: Vec<(ConnectionId, ServerEvent)>,
    pub armed: Vec<(u64, MatchId, BallTicket, Duration)>,
    pub cancelled: Vec<u64>,
    pub fired: Vec<u64>,
    next_timer: u64,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events_for(&self, connection: ConnectionId) -> Vec<ServerEvent> {
        self.delivered
            .iter()
            .filter(|(to, _)| *to == connection)
            .map(|(_, event)| event.clone())
            .collect()
    }

    /// Timers armed and neither cancelled nor fired.
    pub fn live_timers(&self) -> Vec<(u64, MatchId, BallTicket)> {
        self.armed
            .iter()
            .filter(|(id, ..)| !self.cancelled.contains(id) && !self.fired.contains(id))
            .map(|(id, match_id, ticket, _)| (*id, *match_id, *ticket))
            .collect()
    }

    /// Mark the oldest live timer as fired and hand back what the host would call
    /// `on_timeout` with.
    pub fn fire_next(&mut self) -> Option<(MatchId, BallTicket)> {
        let (id, match_id, ticket) = self.live_timers().into_iter().next()?;
        self.fired.push(id);
        Some((match_id, ticket))
    }

    pub fn clear_events(&mut self) {
        self.delivered.clear();
    }
}

impl MatchHost for RecordingHost {
    type Timer = u64;

    fn deliver(&mut self, to: ConnectionId, event: ServerEvent) {
        self.delivered.push((to, event));
    }

    fn arm_ball_timer(&mut self, match_id: MatchId, ticket: BallTicket, after: Duration) -> u64 {
        self.next_timer += 1;
        self.armed.push((self.next_timer, match_id, ticket, after));
        self.next_timer
    }

    fn cancel_ball_timer(&mut self, timer: u64) {
        self.cancelled.push(timer);
    }
}
