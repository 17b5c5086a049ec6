//! Lifecycle scheduler.
//!
//! Drives deferred spawns, despawn cleanup and timed events from the
//! simulation tick. Time is the sum of tick diffs, in milliseconds.

mod events;

pub use events::{AbortReason, EntryDecision, EntryOutcome, MatchEntryEvent};

use common::{BotId, NodeId};
use std::cmp::Ordering;
use std::collections::{BTreeSet, BinaryHeap, VecDeque};

/// Work the scheduler can defer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduledEvent {
    MatchEntry(MatchEntryEvent),
}

#[derive(Debug)]
struct Scheduled {
    at: u64,
    seq: u64,
    event: ScheduledEvent,
}

impl PartialEq for Scheduled {
    fn eq(&self, other: &Self) -> bool {
        (self.at, self.seq) == (other.at, other.seq)
    }
}

impl Eq for Scheduled {}

impl PartialOrd for Scheduled {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Scheduled {
    // Reversed: the heap pops the earliest deadline, then the earliest insertion.
    fn cmp(&self, other: &Self) -> Ordering {
        (other.at, other.seq).cmp(&(self.at, self.seq))
    }
}

/// Timed events keyed by absolute deadline.
#[derive(Debug, Default)]
pub struct EventQueue {
    now: u64,
    seq: u64,
    heap: BinaryHeap<Scheduled>,
}

impl EventQueue {
    pub fn now(&self) -> u64 {
        self.now
    }

    pub fn add_at(&mut self, at: u64, event: ScheduledEvent) {
        self.seq += 1;
        self.heap.push(Scheduled {
            at,
            seq: self.seq,
            event,
        });
    }

    pub fn add_after(&mut self, delay_ms: u64, event: ScheduledEvent) {
        self.add_at(self.now + delay_ms, event);
    }

    pub fn advance(&mut self, diff: u32) {
        self.now += u64::from(diff);
    }

    /// Next event whose deadline has been reached.
    pub fn pop_due(&mut self) -> Option<ScheduledEvent> {
        if self.heap.peek()?.at > self.now {
            return None;
        }
        self.heap.pop().map(|s| s.event)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

/// Pending spawn and despawn work plus timed events.
#[derive(Debug)]
pub struct Scheduler {
    events: EventQueue,
    spawn_queue: VecDeque<(BotId, NodeId)>,
    despawns: BTreeSet<BotId>,
    spawn_timer: u32,
    spawn_interval: u32,
}

impl Scheduler {
    pub fn new(spawn_interval_ms: u32) -> Self {
        Self {
            events: EventQueue::default(),
            spawn_queue: VecDeque::new(),
            despawns: BTreeSet::new(),
            spawn_timer: 0,
            spawn_interval: spawn_interval_ms.max(1),
        }
    }

    pub fn events(&self) -> &EventQueue {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut EventQueue {
        &mut self.events
    }

    pub fn now(&self) -> u64 {
        self.events.now()
    }

    pub fn queue_spawn(&mut self, bot: BotId, node: NodeId) {
        self.spawn_queue.push_back((bot, node));
    }

    pub fn pending_spawns(&self) -> usize {
        self.spawn_queue.len()
    }

    pub fn is_spawn_queued(&self, bot: BotId) -> bool {
        self.spawn_queue.iter().any(|(id, _)| *id == bot)
    }

    /// Mark a bot for removal. Returns false if it was already marked.
    pub fn request_despawn(&mut self, bot: BotId) -> bool {
        self.despawns.insert(bot)
    }

    pub fn pending_despawns(&self) -> usize {
        self.despawns.len()
    }

    pub fn is_despawn_pending(&self, bot: BotId) -> bool {
        self.despawns.contains(&bot)
    }

    /// Despawn requests ready to process, in id order, stopping at the first
    /// bot that has not entered the world yet.
    pub fn take_ready_despawns(&mut self, in_world: impl Fn(BotId) -> bool) -> Vec<BotId> {
        let mut ready = Vec::new();
        while let Some(&bot) = self.despawns.first() {
            if !in_world(bot) {
                break;
            }
            self.despawns.remove(&bot);
            ready.push(bot);
        }
        ready
    }

    /// Spawns whose pacing interval has elapsed.
    pub fn take_due_spawns(&mut self, diff: u32) -> Vec<(BotId, NodeId)> {
        if self.spawn_queue.is_empty() {
            self.spawn_timer = 0;
            return Vec::new();
        }
        self.spawn_timer = self.spawn_timer.saturating_add(diff);
        let mut due = Vec::new();
        while self.spawn_timer >= self.spawn_interval {
            let Some(next) = self.spawn_queue.pop_front() else {
                break;
            };
            self.spawn_timer -= self.spawn_interval;
            due.push(next);
        }
        due
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::TeamId;

    fn entry(bot: BotId) -> ScheduledEvent {
        ScheduledEvent::MatchEntry(MatchEntryEvent {
            bot,
            player: 1,
            queue: 1,
            team: TeamId::Horde,
            deadline_ms: 1_000_000,
        })
    }

    fn bot_of(event: ScheduledEvent) -> BotId {
        match event {
            ScheduledEvent::MatchEntry(e) => e.bot,
        }
    }

    #[test]
    fn test_events_pop_by_deadline_then_fifo() {
        let mut queue = EventQueue::default();
        queue.add_at(200, entry(1));
        queue.add_at(100, entry(2));
        queue.add_at(100, entry(3));
        assert!(queue.pop_due().is_none());

        queue.advance(150);
        assert_eq!(queue.pop_due().map(bot_of), Some(2));
        assert_eq!(queue.pop_due().map(bot_of), Some(3));
        assert!(queue.pop_due().is_none());

        queue.advance(50);
        assert_eq!(queue.pop_due().map(bot_of), Some(1));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_spawns_are_paced() {
        let mut scheduler = Scheduler::new(500);
        for id in 0..4 {
            scheduler.queue_spawn(id, 1);
        }
        assert!(scheduler.take_due_spawns(100).is_empty());
        assert_eq!(scheduler.take_due_spawns(400), vec![(0, 1)]);
        assert_eq!(scheduler.take_due_spawns(1100), vec![(1, 1), (2, 1)]);
        assert_eq!(scheduler.take_due_spawns(400), vec![(3, 1)]);
        assert_eq!(scheduler.pending_spawns(), 0);
    }

    #[test]
    fn test_despawns_wait_for_world_entry() {
        let mut scheduler = Scheduler::new(500);
        scheduler.request_despawn(3);
        scheduler.request_despawn(1);
        scheduler.request_despawn(2);
        assert!(!scheduler.request_despawn(2));

        let ready = scheduler.take_ready_despawns(|id| id != 2);
        assert_eq!(ready, vec![1]);
        assert!(scheduler.is_despawn_pending(2));
        assert!(scheduler.is_despawn_pending(3));

        let ready = scheduler.take_ready_despawns(|_| true);
        assert_eq!(ready, vec![2, 3]);
        assert_eq!(scheduler.pending_despawns(), 0);
    }
}
