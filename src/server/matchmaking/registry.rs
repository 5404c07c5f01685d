//! Participant and match bookkeeping.
//!
//! Owns every connected participant, the single pending participant waiting for an
//! opponent, and the live matches. Pairing is strict FIFO with a queue of depth one.
//! The registry is pure: the hosting actor supplies delivery and timers through `MatchHost`.

use std::collections::HashMap;

use log::{debug, info, warn};
use uuid::Uuid;

use super::messages::ClientEvent;
use crate::game::events::{GameOverReason, ServerEvent};
use crate::game::state::{Match, MatchHost, MatchSettings, MoveOutcome};
use crate::game::types::{BallTicket, ConnectionId, MatchId, Participant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    /// Became the pending participant.
    Waiting,
    /// Paired with the pending participant into a new match.
    Paired(MatchId),
    /// Already pending or playing.
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteOutcome {
    Routed(MatchId, MoveOutcome),
    /// Sender is in no live match.
    Dropped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaveOutcome {
    WasPending,
    Aborted(MatchId),
    /// Connected but neither pending nor playing.
    Idle,
    Unknown,
}

pub struct MatchRegistry<T> {
    participants: HashMap<ConnectionId, Participant>,
    pending: Option<Participant>,
    matches: HashMap<MatchId, Match<T>>,
    /// Connection -> live match it plays in.
    match_of: HashMap<ConnectionId, MatchId>,
    settings: MatchSettings,
}

impl<T> MatchRegistry<T> {
    pub fn new(settings: MatchSettings) -> Self {
        Self {
            participants: HashMap::new(),
            pending: None,
            matches: HashMap::new(),
            match_of: HashMap::new(),
            settings,
        }
    }

    pub fn pending(&self) -> Option<&Participant> {
        self.pending.as_ref()
    }

    pub fn match_count(&self) -> usize {
        self.matches.len()
    }

    pub fn connected_count(&self) -> usize {
        self.participants.len()
    }

    #[cfg(test)]
    pub fn is_connected(&self, connection: ConnectionId) -> bool {
        self.participants.contains_key(&connection)
    }

    pub fn match_of(&self, connection: ConnectionId) -> Option<MatchId> {
        self.match_of.get(&connection).copied()
    }

    #[cfg(test)]
    pub fn get_match(&self, match_id: MatchId) -> Option<&Match<T>> {
        self.matches.get(&match_id)
    }

    fn is_pending(&self, connection: ConnectionId) -> bool {
        self.pending.as_ref().is_some_and(|p| p.connection == connection)
    }

    /// Register `connection` under `username` and pair it if someone is waiting.
    pub fn join<H: MatchHost<Timer = T>>(
        &mut self,
        connection: ConnectionId,
        username: &str,
        host: &mut H,
    ) -> JoinOutcome {
        if self.is_pending(connection) || self.match_of.contains_key(&connection) {
            warn!("[Matchmaking] Duplicate join from {} ignored", connection);
            return JoinOutcome::Ignored;
        }

        let participant = Participant::new(connection, username);
        self.participants.insert(connection, participant.clone());

        let Some(waiting) = self.pending.take() else {
            info!("[Matchmaking] {} ({}) waiting for an opponent", username, connection);
            self.pending = Some(participant);
            host.deliver(connection, ServerEvent::WaitingForOpponent);
            return JoinOutcome::Waiting;
        };

        let match_id = Uuid::new_v4();
        host.deliver(waiting.connection, ServerEvent::init_game(match_id, &participant.username));
        host.deliver(participant.connection, ServerEvent::init_game(match_id, &waiting.username));
        self.match_of.insert(waiting.connection, match_id);
        self.match_of.insert(participant.connection, match_id);
        info!(
            "[Matchmaking] Match {} created: {} vs {}",
            match_id, waiting.username, participant.username
        );

        let mut new_match = Match::new(match_id, waiting, participant, self.settings);
        new_match.start(host);
        self.matches.insert(match_id, new_match);
        JoinOutcome::Paired(match_id)
    }

    /// Forward an in-match event to the match `connection` plays in.
    pub fn route_message<H: MatchHost<Timer = T>>(
        &mut self,
        connection: ConnectionId,
        event: ClientEvent,
        host: &mut H,
    ) -> RouteOutcome {
        let Some(match_id) = self.match_of(connection) else {
            warn!("[Matchmaking] Dropping {:?} from {}: not in a match", event, connection);
            return RouteOutcome::Dropped;
        };
        let Some(live) = self.matches.get_mut(&match_id) else {
            warn!("[Matchmaking] Index points {} at missing match {}", connection, match_id);
            self.match_of.remove(&connection);
            return RouteOutcome::Dropped;
        };
        if !live.is_participant(connection) {
            warn!("[Matchmaking] {} indexed into match {} it does not play in", connection, match_id);
            self.match_of.remove(&connection);
            return RouteOutcome::Dropped;
        }
        debug!(
            "[Matchmaking] {:?} from {} in match {} ({:?}, {:?} innings, ball {})",
            event,
            connection,
            live.id(),
            live.phase(),
            live.innings(),
            live.balls_played()
        );

        let outcome = match event {
            ClientEvent::BallMove(choice) => live.submit_move(connection, choice, host),
        };
        self.reap_if_finished(match_id);
        RouteOutcome::Routed(match_id, outcome)
    }

    /// Fire the ball timeout of `match_id`. Returns `false` when the match is gone or the
    /// ticket is stale.
    pub fn on_ball_timeout<H: MatchHost<Timer = T>>(
        &mut self,
        match_id: MatchId,
        ticket: BallTicket,
        host: &mut H,
    ) -> bool {
        let Some(live) = self.matches.get_mut(&match_id) else {
            debug!("[Matchmaking] Timeout for unknown match {} ignored", match_id);
            return false;
        };
        let resolved = live.on_timeout(ticket, host);
        self.reap_if_finished(match_id);
        resolved
    }

    /// Remove `connection`, aborting the match it was playing in.
    pub fn leave<H: MatchHost<Timer = T>>(&mut self, connection: ConnectionId, host: &mut H) -> LeaveOutcome {
        let known = self.participants.remove(&connection).is_some();

        if self.is_pending(connection) {
            self.pending = None;
            info!("[Matchmaking] Pending participant {} left", connection);
            return LeaveOutcome::WasPending;
        }

        if let Some(match_id) = self.match_of.remove(&connection) {
            if let Some(mut live) = self.matches.remove(&match_id) {
                live.abort(GameOverReason::ParticipantDisconnected, host);
                for side in live.sides() {
                    self.match_of.remove(&side.participant.connection);
                }
            }
            info!("[Matchmaking] {} left, match {} torn down", connection, match_id);
            return LeaveOutcome::Aborted(match_id);
        }

        if known { LeaveOutcome::Idle } else { LeaveOutcome::Unknown }
    }

    fn reap_if_finished(&mut self, match_id: MatchId) {
        if !self.matches.get(&match_id).is_some_and(|m| m.is_finished()) {
            return;
        }
        if let Some(done) = self.matches.remove(&match_id) {
            for side in done.sides() {
                self.match_of.remove(&side.participant.connection);
            }
            debug!("[Matchmaking] Match {} removed, {} live", done.id(), self.matches.len());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::testing::RecordingHost;
    use crate::game::types::{Choice, Role};

    fn ball(n: i64) -> ClientEvent {
        ClientEvent::BallMove(Choice::new(n).unwrap())
    }

    fn registry() -> MatchRegistry<u64> {
        MatchRegistry::new(MatchSettings::default())
    }

    #[test]
    fn test_first_joiner_waits() {
        let mut reg = registry();
        let mut host = RecordingHost::new();
        let p1 = Uuid::new_v4();

        assert_eq!(reg.join(p1, "p1", &mut host), JoinOutcome::Waiting);

        assert_eq!(reg.pending().map(|p| p.connection), Some(p1));
        assert_eq!(reg.match_count(), 0);
        assert_eq!(host.events_for(p1), vec![ServerEvent::WaitingForOpponent]);
        assert!(host.live_timers().is_empty());
    }

    #[test]
    fn test_pairs_in_arrival_order_and_third_waits() {
        let mut reg = registry();
        let mut host = RecordingHost::new();
        let (p1, p2, p3) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());

        reg.join(p1, "p1", &mut host);
        let JoinOutcome::Paired(match_id) = reg.join(p2, "p2", &mut host) else {
            panic!("second joiner should be paired");
        };

        let live = reg.get_match(match_id).unwrap();
        assert!(live.is_participant(p1) && live.is_participant(p2));
        assert_eq!(live.role_of(p1), Some(Role::Batsman));
        assert!(reg.pending().is_none());
        assert_eq!(host.events_for(p1).last(), Some(&ServerEvent::init_game(match_id, "p2")));
        assert_eq!(host.events_for(p2), vec![ServerEvent::init_game(match_id, "p1")]);
        assert_eq!(host.live_timers().len(), 1);

        assert_eq!(reg.join(p3, "p3", &mut host), JoinOutcome::Waiting);
        assert_eq!(reg.pending().map(|p| p.connection), Some(p3));
        assert_eq!(reg.match_of(p3), None);
        assert_eq!(reg.match_count(), 1);
    }

    #[test]
    fn test_duplicate_join_is_ignored() {
        let mut reg = registry();
        let mut host = RecordingHost::new();
        let (p1, p2) = (Uuid::new_v4(), Uuid::new_v4());

        reg.join(p1, "p1", &mut host);
        assert_eq!(reg.join(p1, "again", &mut host), JoinOutcome::Ignored);
        assert_eq!(reg.pending().map(|p| p.username.as_str()), Some("p1"));

        reg.join(p2, "p2", &mut host);
        assert_eq!(reg.join(p2, "p2", &mut host), JoinOutcome::Ignored);
        assert_eq!(reg.match_count(), 1);
    }

    #[test]
    fn test_route_moves_into_owning_match() {
        let mut reg = registry();
        let mut host = RecordingHost::new();
        let (p1, p2) = (Uuid::new_v4(), Uuid::new_v4());
        reg.join(p1, "p1", &mut host);
        let JoinOutcome::Paired(match_id) = reg.join(p2, "p2", &mut host) else {
            panic!("expected pairing");
        };

        assert_eq!(
            reg.route_message(p1, ball(5), &mut host),
            RouteOutcome::Routed(match_id, MoveOutcome::Recorded)
        );
        reg.route_message(p2, ball(1), &mut host);

        assert_eq!(reg.get_match(match_id).unwrap().score_of(p1), Some(5));
    }

    #[test]
    fn test_route_from_unmatched_connection_is_dropped() {
        let mut reg = registry();
        let mut host = RecordingHost::new();
        let p1 = Uuid::new_v4();
        reg.join(p1, "p1", &mut host);
        host.clear_events();

        assert_eq!(reg.route_message(p1, ball(3), &mut host), RouteOutcome::Dropped);
        assert_eq!(reg.route_message(Uuid::new_v4(), ball(3), &mut host), RouteOutcome::Dropped);
        assert!(host.delivered.is_empty());
    }

    #[test]
    fn test_index_entry_for_a_non_participant_is_dropped() {
        let mut reg = registry();
        let mut host = RecordingHost::new();
        let (p1, p2, stranger) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        reg.join(p1, "p1", &mut host);
        let JoinOutcome::Paired(match_id) = reg.join(p2, "p2", &mut host) else {
            panic!("expected pairing");
        };
        reg.match_of.insert(stranger, match_id);
        host.clear_events();

        assert_eq!(reg.route_message(stranger, ball(4), &mut host), RouteOutcome::Dropped);

        assert_eq!(reg.match_of(stranger), None);
        assert_eq!(reg.match_of(p1), Some(match_id));
        assert!(host.delivered.is_empty());
        assert_eq!(
            reg.route_message(p1, ball(4), &mut host),
            RouteOutcome::Routed(match_id, MoveOutcome::Recorded)
        );
    }

    #[test]
    fn test_timeout_routed_by_match_id() {
        let mut reg = registry();
        let mut host = RecordingHost::new();
        let (p1, p2) = (Uuid::new_v4(), Uuid::new_v4());
        reg.join(p1, "p1", &mut host);
        reg.join(p2, "p2", &mut host);

        let (match_id, ticket) = host.fire_next().unwrap();
        assert!(reg.on_ball_timeout(match_id, ticket, &mut host));
        assert_eq!(reg.get_match(match_id).unwrap().balls_played(), 1);

        assert!(!reg.on_ball_timeout(Uuid::new_v4(), ticket, &mut host));
    }

    #[test]
    fn test_disconnect_aborts_match_and_drops_later_messages() {
        let mut reg = registry();
        let mut host = RecordingHost::new();
        let (p1, p2) = (Uuid::new_v4(), Uuid::new_v4());
        reg.join(p1, "p1", &mut host);
        let JoinOutcome::Paired(match_id) = reg.join(p2, "p2", &mut host) else {
            panic!("expected pairing");
        };

        assert_eq!(reg.leave(p2, &mut host), LeaveOutcome::Aborted(match_id));

        assert_eq!(reg.match_count(), 0);
        assert_eq!(reg.match_of(p1), None);
        assert!(host.live_timers().is_empty());
        assert_eq!(
            host.events_for(p1).last(),
            Some(&ServerEvent::ended(GameOverReason::ParticipantDisconnected))
        );
        assert_eq!(reg.route_message(p2, ball(2), &mut host), RouteOutcome::Dropped);
        assert_eq!(reg.route_message(p1, ball(2), &mut host), RouteOutcome::Dropped);
    }

    #[test]
    fn test_pending_leave_clears_slot() {
        let mut reg = registry();
        let mut host = RecordingHost::new();
        let (p1, p2) = (Uuid::new_v4(), Uuid::new_v4());
        reg.join(p1, "p1", &mut host);

        assert_eq!(reg.leave(p1, &mut host), LeaveOutcome::WasPending);
        assert!(reg.pending().is_none());
        assert!(!reg.is_connected(p1));

        assert_eq!(reg.join(p2, "p2", &mut host), JoinOutcome::Waiting);
    }

    #[test]
    fn test_leave_of_unknown_connection_is_noop() {
        let mut reg = registry();
        let mut host = RecordingHost::new();
        assert_eq!(reg.leave(Uuid::new_v4(), &mut host), LeaveOutcome::Unknown);
        assert!(host.delivered.is_empty());
    }

    #[test]
    fn test_finished_match_is_reaped_and_players_can_requeue() {
        let mut reg = registry();
        let mut host = RecordingHost::new();
        let (p1, p2) = (Uuid::new_v4(), Uuid::new_v4());
        reg.join(p1, "p1", &mut host);
        let JoinOutcome::Paired(match_id) = reg.join(p2, "p2", &mut host) else {
            panic!("expected pairing");
        };

        // Twelve timed-out balls finish the match as a 0-0 draw.
        for _ in 0..12 {
            let (id, ticket) = host.fire_next().unwrap();
            assert_eq!(id, match_id);
            reg.on_ball_timeout(id, ticket, &mut host);
        }

        assert_eq!(reg.match_count(), 0);
        assert_eq!(reg.match_of(p1), None);
        assert!(reg.is_connected(p1));
        assert_eq!(
            host.events_for(p2).last(),
            Some(&ServerEvent::ended(GameOverReason::Draw))
        );

        assert_eq!(reg.leave(p1, &mut host), LeaveOutcome::Idle);
        assert_eq!(reg.join(p2, "p2-again", &mut host), JoinOutcome::Waiting);
    }
}
