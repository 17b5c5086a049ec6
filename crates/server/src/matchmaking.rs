//! In-memory match queue.

use crate::host::{MatchId, MatchQueue, PlayerMatchStatus, QueueId};
use common::{BotId, PlayerId, Position, RegionId, TeamId};
use std::collections::HashMap;

/// A running match.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchSlots {
    pub region: RegionId,
    pub free_alliance: u32,
    pub free_horde: u32,
    pub alliance_start: Position,
    pub horde_start: Position,
}

/// A queue removal, kept for inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Removal {
    pub bot: BotId,
    pub queue: QueueId,
    pub decrease_invited: bool,
}

/// Match queue kept entirely in memory.
#[derive(Debug, Default)]
pub struct LocalMatchQueue {
    queued: HashMap<BotId, (QueueId, TeamId)>,
    players: HashMap<PlayerId, PlayerMatchStatus>,
    matches: HashMap<MatchId, MatchSlots>,
    removals: Vec<Removal>,
}

impl LocalMatchQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_player_status(&mut self, player: PlayerId, status: PlayerMatchStatus) {
        self.players.insert(player, status);
    }

    pub fn open_match(&mut self, match_id: MatchId, slots: MatchSlots) {
        self.matches.insert(match_id, slots);
    }

    /// Take one slot of `team` in a match.
    pub fn occupy(&mut self, match_id: MatchId, team: TeamId) -> bool {
        let Some(slots) = self.matches.get_mut(&match_id) else {
            return false;
        };
        let free = match team {
            TeamId::Alliance => &mut slots.free_alliance,
            TeamId::Horde => &mut slots.free_horde,
            TeamId::Neutral => return false,
        };
        if *free == 0 {
            return false;
        }
        *free -= 1;
        true
    }

    pub fn is_queued(&self, bot: BotId) -> bool {
        self.queued.contains_key(&bot)
    }

    pub fn queued_count(&self) -> usize {
        self.queued.len()
    }

    pub fn removals(&self) -> &[Removal] {
        &self.removals
    }
}

impl MatchQueue for LocalMatchQueue {
    fn enqueue_bot(&mut self, bot: BotId, queue: QueueId, team: TeamId) {
        self.queued.insert(bot, (queue, team));
    }

    fn remove_bot(&mut self, bot: BotId, queue: QueueId, decrease_invited: bool) {
        if self.queued.remove(&bot).is_some() {
            self.removals.push(Removal {
                bot,
                queue,
                decrease_invited,
            });
        }
    }

    fn player_status(&self, player: PlayerId, _queue: QueueId) -> PlayerMatchStatus {
        self.players
            .get(&player)
            .copied()
            .unwrap_or(PlayerMatchStatus::Unreachable)
    }

    fn has_free_slots(&self, match_id: MatchId, team: TeamId) -> bool {
        self.matches.get(&match_id).is_some_and(|m| match team {
            TeamId::Alliance => m.free_alliance > 0,
            TeamId::Horde => m.free_horde > 0,
            TeamId::Neutral => false,
        })
    }

    fn start_position(&self, match_id: MatchId, team: TeamId) -> Option<(RegionId, Position)> {
        let m = self.matches.get(&match_id)?;
        match team {
            TeamId::Alliance => Some((m.region, m.alliance_start)),
            TeamId::Horde => Some((m.region, m.horde_start)),
            TeamId::Neutral => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slots(free: u32) -> MatchSlots {
        MatchSlots {
            region: 489,
            free_alliance: free,
            free_horde: free,
            alliance_start: Position::new(1.0, 0.0, 0.0, 0.0),
            horde_start: Position::new(2.0, 0.0, 0.0, 0.0),
        }
    }

    #[test]
    fn test_unknown_player_is_unreachable() {
        let queue = LocalMatchQueue::new();
        assert_eq!(queue.player_status(1, 0), PlayerMatchStatus::Unreachable);
    }

    #[test]
    fn test_slots_run_out() {
        let mut queue = LocalMatchQueue::new();
        queue.open_match(3, slots(1));
        assert!(queue.has_free_slots(3, TeamId::Horde));
        assert!(queue.occupy(3, TeamId::Horde));
        assert!(!queue.has_free_slots(3, TeamId::Horde));
        assert!(queue.has_free_slots(3, TeamId::Alliance));
        assert_eq!(queue.start_position(3, TeamId::Horde).map(|(r, _)| r), Some(489));
    }

    #[test]
    fn test_removal_is_recorded_once() {
        let mut queue = LocalMatchQueue::new();
        queue.enqueue_bot(80000, 2, TeamId::Alliance);
        queue.remove_bot(80000, 2, false);
        queue.remove_bot(80000, 2, false);
        assert_eq!(queue.removals().len(), 1);
        assert!(!queue.is_queued(80000));
    }
}
