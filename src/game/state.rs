//! Match state machine.
//!
//! A `Match` referees one hand cricket contest between exactly two participants.
//! It is driven by move submissions and by per-ball timer expiry, and talks to the
//! outside world only through a [`MatchHost`]: event delivery and timer scheduling.

use std::cmp::Ordering;
use std::time::Duration;

use log::{debug, info};

use super::events::{GameOverReason, ServerEvent};
use super::types::{BallOutcome, BallTicket, Choice, ConnectionId, Innings, MatchId, Participant, Role};
use crate::config::game::{BALLS_PER_INNINGS, BALL_TIMEOUT_MS};

/// Side effects a match needs from whoever hosts it.
///
/// The host owns delivery and scheduling; the match owns the timer handle it is given
/// and is responsible for cancelling it.
pub trait MatchHost {
    /// Handle of a scheduled ball timeout.
    type Timer;

    /// Push an event to one connection. Delivery failures are not reported back.
    fn deliver(&mut self, to: ConnectionId, event: ServerEvent);

    /// Schedule `Match::on_timeout(ticket)` for `match_id` after `after`.
    fn arm_ball_timer(&mut self, match_id: MatchId, ticket: BallTicket, after: Duration) -> Self::Timer;

    /// Cancel a scheduled timeout. Cancelling an already fired timer is a no-op.
    fn cancel_ball_timer(&mut self, timer: Self::Timer);
}

/// Tunables shared by every match of a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchSettings {
    pub ball_timeout: Duration,
    pub balls_per_innings: u8,
}

impl Default for MatchSettings {
    fn default() -> Self {
        Self {
            ball_timeout: Duration::from_millis(BALL_TIMEOUT_MS),
            balls_per_innings: BALLS_PER_INNINGS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchPhase {
    /// Paired but `start` not called yet.
    Created,
    AwaitingMoves(Innings),
    /// Between the end of the first innings and the first ball of the second.
    InningsBreak,
    Finished,
}

/// What a single move submission did to the match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Stored, still waiting for the other side.
    Recorded,
    /// Completed the pair and resolved the ball.
    Resolved(BallOutcome),
    /// Not from a participant, or no ball is open.
    Ignored,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct PendingMoves {
    batsman: Option<Choice>,
    bowler: Option<Choice>,
}

/// One participant together with its role and cumulative score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Side {
    pub participant: Participant,
    pub role: Role,
    pub score: u32,
}

impl Side {
    fn new(participant: Participant, role: Role) -> Self {
        Self { participant, role, score: 0 }
    }
}

pub struct Match<T> {
    id: MatchId,
    sides: [Side; 2],
    phase: MatchPhase,
    innings: Innings,
    balls_played: u8,
    pending: PendingMoves,
    timer: Option<T>,
    settings: MatchSettings,
}

impl<T> Match<T> {
    /// Pair two participants. `first` bats the first innings.
    pub fn new(id: MatchId, first: Participant, second: Participant, settings: MatchSettings) -> Self {
        Self {
            id,
            sides: [Side::new(first, Role::Batsman), Side::new(second, Role::Bowler)],
            phase: MatchPhase::Created,
            innings: Innings::First,
            balls_played: 0,
            pending: PendingMoves::default(),
            timer: None,
            settings,
        }
    }

    pub fn id(&self) -> MatchId {
        self.id
    }

    pub fn phase(&self) -> MatchPhase {
        self.phase
    }

    pub fn innings(&self) -> Innings {
        self.innings
    }

    pub fn balls_played(&self) -> u8 {
        self.balls_played
    }

    pub fn sides(&self) -> &[Side; 2] {
        &self.sides
    }

    pub fn is_finished(&self) -> bool {
        self.phase == MatchPhase::Finished
    }

    /// True while a ball timeout is scheduled.
    #[cfg(test)]
    pub fn has_timer(&self) -> bool {
        self.timer.is_some()
    }

    pub fn is_participant(&self, connection: ConnectionId) -> bool {
        self.side_index(connection).is_some()
    }

    #[cfg(test)]
    pub fn role_of(&self, connection: ConnectionId) -> Option<Role> {
        self.side_index(connection).map(|i| self.sides[i].role)
    }

    #[cfg(test)]
    pub fn score_of(&self, connection: ConnectionId) -> Option<u32> {
        self.side_index(connection).map(|i| self.sides[i].score)
    }

    pub fn batsman(&self) -> &Participant {
        &self.sides[self.batting_index()].participant
    }

    fn side_index(&self, connection: ConnectionId) -> Option<usize> {
        self.sides.iter().position(|s| s.participant.connection == connection)
    }

    fn batting_index(&self) -> usize {
        if self.sides[0].role == Role::Batsman { 0 } else { 1 }
    }

    /// Reset scores and the ball counter, then open the first ball.
    pub fn start<H: MatchHost<Timer = T>>(&mut self, host: &mut H) {
        for side in &mut self.sides {
            side.score = 0;
        }
        self.innings = Innings::First;
        self.balls_played = 0;
        self.pending = PendingMoves::default();
        self.phase = MatchPhase::AwaitingMoves(Innings::First);
        info!(
            "[Match] {} started: {} bats first against {}",
            self.id, self.sides[0].participant.username, self.sides[1].participant.username
        );
        self.arm_timer(host);
    }

    /// Record `choice` for the role `connection` currently plays.
    ///
    /// A later submission for the same role overwrites the earlier one. Once both roles
    /// have a value the ball is resolved immediately.
    pub fn submit_move<H: MatchHost<Timer = T>>(
        &mut self,
        connection: ConnectionId,
        choice: Choice,
        host: &mut H,
    ) -> MoveOutcome {
        if !matches!(self.phase, MatchPhase::AwaitingMoves(_)) {
            debug!("[Match] {} ignoring move outside an open ball ({:?})", self.id, self.phase);
            return MoveOutcome::Ignored;
        }
        let Some(idx) = self.side_index(connection) else {
            debug!("[Match] {} ignoring move from non-participant {}", self.id, connection);
            return MoveOutcome::Ignored;
        };

        let role = self.sides[idx].role;
        match role {
            Role::Batsman => self.pending.batsman = Some(choice),
            Role::Bowler => self.pending.bowler = Some(choice),
        }
        debug!(
            "[Match] {} ball {} {:?}: {:?} chose {}",
            self.id,
            self.balls_played + 1,
            self.innings,
            role,
            choice
        );

        match (self.pending.batsman, self.pending.bowler) {
            (Some(batsman), Some(bowler)) => MoveOutcome::Resolved(self.resolve_ball(batsman, bowler, host)),
            _ => MoveOutcome::Recorded,
        }
    }

    /// Resolve the open ball as a dot ball.
    ///
    /// Returns `false` without touching state when `ticket` is not the ball in flight,
    /// i.e. the timer is stale.
    pub fn on_timeout<H: MatchHost<Timer = T>>(&mut self, ticket: BallTicket, host: &mut H) -> bool {
        let current = BallTicket {
            innings: self.innings,
            ball: self.balls_played,
        };
        if self.phase != MatchPhase::AwaitingMoves(ticket.innings) || ticket != current {
            debug!("[Match] {} stale timeout {:?} ignored", self.id, ticket);
            return false;
        }
        // The handle has fired; nothing left to cancel.
        self.timer = None;

        debug!("[Match] {} ball {} {:?} timed out", self.id, self.balls_played + 1, self.innings);
        self.broadcast(host, ServerEvent::dot_ball());
        self.balls_played += 1;
        self.pending = PendingMoves::default();
        self.next_ball_or_end_innings(host);
        true
    }

    /// Tear the match down without a result. No-op on a finished match.
    pub fn abort<H: MatchHost<Timer = T>>(&mut self, reason: GameOverReason, host: &mut H) -> bool {
        self.cancel_timer(host);
        if self.is_finished() {
            return false;
        }
        self.phase = MatchPhase::Finished;
        self.pending = PendingMoves::default();
        info!("[Match] {} aborted: {:?}", self.id, reason);
        self.broadcast(host, ServerEvent::ended(reason));
        true
    }

    fn resolve_ball<H: MatchHost<Timer = T>>(&mut self, batsman: Choice, bowler: Choice, host: &mut H) -> BallOutcome {
        self.cancel_timer(host);
        self.balls_played += 1;
        self.pending = PendingMoves::default();

        if batsman == bowler {
            info!(
                "[Match] {} {} is out after {} ball(s)",
                self.id,
                self.batsman().username,
                self.balls_played
            );
            self.broadcast(
                host,
                ServerEvent::Out {
                    batsman_choice: batsman.value(),
                    bowler_choice: bowler.value(),
                },
            );
            self.end_innings(host);
            return BallOutcome::Dismissed;
        }

        let batting = self.batting_index();
        let runs = batsman.value();
        self.sides[batting].score += u32::from(runs);
        self.broadcast(
            host,
            ServerEvent::BallResult {
                batsman_choice: batsman.value(),
                bowler_choice: bowler.value(),
                runs,
                score: self.sides[batting].score,
                balls_played: self.balls_played,
            },
        );
        self.next_ball_or_end_innings(host);
        BallOutcome::Runs(runs)
    }

    fn next_ball_or_end_innings<H: MatchHost<Timer = T>>(&mut self, host: &mut H) {
        if self.balls_played >= self.settings.balls_per_innings {
            self.end_innings(host);
        } else {
            self.arm_timer(host);
        }
    }

    fn end_innings<H: MatchHost<Timer = T>>(&mut self, host: &mut H) {
        self.cancel_timer(host);
        self.pending = PendingMoves::default();

        match self.innings {
            Innings::First => {
                self.phase = MatchPhase::InningsBreak;
                let target_score = self.sides[self.batting_index()].score;
                for side in &mut self.sides {
                    side.role = side.role.swapped();
                }
                self.innings = Innings::Second;
                self.balls_played = 0;
                info!(
                    "[Match] {} innings over, {} needs more than {}",
                    self.id,
                    self.batsman().username,
                    target_score
                );
                self.broadcast(host, ServerEvent::InningsOver { target_score });
                self.phase = MatchPhase::AwaitingMoves(Innings::Second);
                self.arm_timer(host);
            }
            Innings::Second => {
                self.phase = MatchPhase::Finished;
                let [a, b] = &self.sides;
                let result = match a.score.cmp(&b.score) {
                    Ordering::Greater => ServerEvent::winner(&a.participant.username),
                    Ordering::Less => ServerEvent::winner(&b.participant.username),
                    Ordering::Equal => ServerEvent::ended(GameOverReason::Draw),
                };
                info!(
                    "[Match] {} finished {}-{} ({} vs {})",
                    self.id, a.score, b.score, a.participant.username, b.participant.username
                );
                self.broadcast(host, result);
            }
        }
    }

    fn arm_timer<H: MatchHost<Timer = T>>(&mut self, host: &mut H) {
        self.cancel_timer(host);
        let ticket = BallTicket {
            innings: self.innings,
            ball: self.balls_played,
        };
        self.timer = Some(host.arm_ball_timer(self.id, ticket, self.settings.ball_timeout));
    }

    fn cancel_timer<H: MatchHost<Timer = T>>(&mut self, host: &mut H) {
        if let Some(timer) = self.timer.take() {
            host.cancel_ball_timer(timer);
        }
    }

    fn broadcast<H: MatchHost<Timer = T>>(&self, host: &mut H, event: ServerEvent) {
        for side in &self.sides {
            host.deliver(side.participant.connection, event.clone());
        }
    }
}
