//! Deferred match entry.

use crate::host::{MatchId, MatchQueue, PlayerMatchStatus, QueueId};
use common::{BotId, PlayerId, Position, RegionId, TeamId};

/// A bot waiting to follow a queued player into a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchEntryEvent {
    pub bot: BotId,
    /// Player whose queue group the bot joined.
    pub player: PlayerId,
    pub queue: QueueId,
    pub team: TeamId,
    /// Absolute scheduler time after which the entry is abandoned.
    pub deadline_ms: u64,
}

/// Why a match entry was abandoned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortReason {
    DeadlinePassed,
    BotMissing,
    MatchFull,
    PlayerUnreachable,
    NoStartPosition,
}

/// What the scheduler should do with a match entry this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EntryDecision {
    Admit {
        match_id: MatchId,
        region: RegionId,
        position: Position,
    },
    Retry,
    Abort(AbortReason),
}

/// Terminal or intermediate state after an event ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryOutcome {
    Completed,
    Rescheduled,
    Aborted(AbortReason),
}

impl MatchEntryEvent {
    pub fn evaluate(&self, now_ms: u64, bot_live: bool, queue: &dyn MatchQueue) -> EntryDecision {
        if now_ms >= self.deadline_ms {
            return EntryDecision::Abort(AbortReason::DeadlinePassed);
        }
        if !bot_live {
            return EntryDecision::Abort(AbortReason::BotMissing);
        }
        match queue.player_status(self.player, self.queue) {
            PlayerMatchStatus::InMatch { match_id } => {
                if !queue.has_free_slots(match_id, self.team) {
                    return EntryDecision::Abort(AbortReason::MatchFull);
                }
                match queue.start_position(match_id, self.team) {
                    Some((region, position)) => EntryDecision::Admit {
                        match_id,
                        region,
                        position,
                    },
                    None => EntryDecision::Abort(AbortReason::NoStartPosition),
                }
            }
            PlayerMatchStatus::Queued => EntryDecision::Retry,
            PlayerMatchStatus::Unreachable => EntryDecision::Abort(AbortReason::PlayerUnreachable),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matchmaking::{LocalMatchQueue, MatchSlots};

    fn event() -> MatchEntryEvent {
        MatchEntryEvent {
            bot: 80000,
            player: 1,
            queue: 2,
            team: TeamId::Alliance,
            deadline_ms: 10_000,
        }
    }

    fn queue_with_match(free: u32) -> LocalMatchQueue {
        let mut queue = LocalMatchQueue::new();
        queue.open_match(
            7,
            MatchSlots {
                region: 489,
                free_alliance: free,
                free_horde: free,
                alliance_start: Position::new(5.0, 5.0, 0.0, 0.0),
                horde_start: Position::default(),
            },
        );
        queue.set_player_status(1, PlayerMatchStatus::InMatch { match_id: 7 });
        queue
    }

    #[test]
    fn test_deadline_beats_everything() {
        let queue = queue_with_match(5);
        assert_eq!(
            event().evaluate(10_000, true, &queue),
            EntryDecision::Abort(AbortReason::DeadlinePassed)
        );
    }

    #[test]
    fn test_admit_when_player_in_match() {
        let queue = queue_with_match(5);
        match event().evaluate(0, true, &queue) {
            EntryDecision::Admit { match_id, region, .. } => {
                assert_eq!((match_id, region), (7, 489));
            }
            other => panic!("unexpected {:?}", other),
        }
        let full = queue_with_match(0);
        assert_eq!(event().evaluate(0, true, &full), EntryDecision::Abort(AbortReason::MatchFull));
    }

    #[test]
    fn test_queued_player_retries() {
        let mut queue = LocalMatchQueue::new();
        queue.set_player_status(1, PlayerMatchStatus::Queued);
        assert_eq!(event().evaluate(0, true, &queue), EntryDecision::Retry);
        assert_eq!(
            event().evaluate(0, false, &queue),
            EntryDecision::Abort(AbortReason::BotMissing)
        );
    }
}
