//! Per-tick lifecycle: deferred spawns, despawns and match entry.

use super::WorldBotService;
use crate::error::GenerateError;
use crate::generator::{BatchRequest, LevelBracket, RegionFilter};
use crate::host::{MatchQueue, QueueId, WorldHost};
use crate::scheduler::{AbortReason, EntryDecision, EntryOutcome, MatchEntryEvent, ScheduledEvent};
use common::{BotId, PlayerId, RegionId, TeamId};
use tracing::{debug, error, info, warn};

/// Bots needed to fill a queued match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchRequest {
    /// Player whose queue group the bots join.
    pub leader: PlayerId,
    pub queue: QueueId,
    /// Region the match is played in; bots spawn on its spawn nodes.
    pub region: RegionId,
    pub bracket: LevelBracket,
    pub min_players_per_team: u32,
    pub max_players_per_team: u32,
    pub queued_alliance: u32,
    pub queued_horde: u32,
}

impl MatchRequest {
    /// Players each team should bring.
    pub fn target_per_team(&self) -> u32 {
        (self.min_players_per_team + 1 + self.max_players_per_team) / 2
    }

    /// Bots still needed per team, alliance first.
    pub fn needed(&self) -> [(TeamId, usize); 2] {
        let target = self.target_per_team();
        [
            (TeamId::Alliance, target.saturating_sub(self.queued_alliance) as usize),
            (TeamId::Horde, target.saturating_sub(self.queued_horde) as usize),
        ]
    }
}

impl<H: WorldHost, Q: MatchQueue> WorldBotService<H, Q> {
    /// Advance the manager by `diff` milliseconds.
    ///
    /// Timed events run first. Then either pending despawns or due spawns are
    /// processed, never both in the same tick.
    pub fn tick(&mut self, diff: u32) {
        self.host.update(diff);
        self.scheduler.events_mut().advance(diff);
        self.run_due_events();

        if self.scheduler.pending_despawns() > 0 {
            self.drain_despawns();
            return;
        }

        for (id, node) in self.scheduler.take_due_spawns(diff) {
            if let Err(e) = self.place_bot(id, node) {
                error!("Deferred spawn of bot {} failed: {}", id, e);
                self.discard_generated(id);
            }
        }
    }

    /// Ask for a generated wanderer to be removed. Cleanup happens on a later tick.
    pub fn despawn_bot(&mut self, id: BotId) -> bool {
        match self.registry.find(id) {
            Some(actor) if actor.wanderer => {
                self.registry.set_active(id, false);
                if !self.scheduler.request_despawn(id) {
                    debug!("Bot {} is already scheduled for despawn", id);
                }
                true
            }
            Some(_) => {
                error!("despawn_bot: bot {} is not a wanderer", id);
                false
            }
            None => {
                error!("despawn_bot: bot {} is not live", id);
                false
            }
        }
    }

    fn drain_despawns(&mut self) {
        let host = &self.host;
        let registry = &self.registry;
        let ready = self
            .scheduler
            .take_ready_despawns(|id| host.is_in_world(id) || !registry.contains(id));
        for id in ready {
            if let Err(e) = self.host.remove(id) {
                warn!("Despawn of bot {}: {}", id, e);
            }
            let actor = self.registry.unregister(id);
            self.discard_generated(id);
            if let Some(actor) = actor {
                debug!(
                    "Despawned bot {} '{}' (archetype {:?})",
                    id, actor.name, actor.archetype
                );
            }
        }
    }

    fn run_due_events(&mut self) {
        while let Some(event) = self.scheduler.events_mut().pop_due() {
            match event {
                ScheduledEvent::MatchEntry(entry) => {
                    self.run_match_entry(entry);
                }
            }
        }
    }

    /// Try to move a queued bot into its match.
    pub(crate) fn run_match_entry(&mut self, event: MatchEntryEvent) -> EntryOutcome {
        let now = self.scheduler.now();
        let live = self.registry.contains(event.bot);
        match event.evaluate(now, live, &self.queue) {
            EntryDecision::Admit {
                match_id,
                region,
                position,
            } => {
                self.queue.remove_bot(event.bot, event.queue, false);
                if let Err(e) = self.host.teleport(event.bot, region, position) {
                    error!("Bot {} could not enter match {}: {}", event.bot, match_id, e);
                    self.abort_match_entry(&event, AbortReason::BotMissing);
                    return EntryOutcome::Aborted(AbortReason::BotMissing);
                }
                self.registry.set_region(event.bot, region);
                self.registry.set_active(event.bot, true);
                debug!("Bot {} entered match {}", event.bot, match_id);
                EntryOutcome::Completed
            }
            EntryDecision::Retry => {
                let retry = self.config.scheduler.match_entry_retry_ms;
                self.scheduler
                    .events_mut()
                    .add_after(retry, ScheduledEvent::MatchEntry(event));
                EntryOutcome::Rescheduled
            }
            EntryDecision::Abort(reason) => {
                self.abort_match_entry(&event, reason);
                EntryOutcome::Aborted(reason)
            }
        }
    }

    fn abort_match_entry(&mut self, event: &MatchEntryEvent, reason: AbortReason) {
        debug!("Match entry of bot {} aborted: {:?}", event.bot, reason);
        self.queue.remove_bot(event.bot, event.queue, true);
        if self.registry.contains(event.bot) {
            self.despawn_bot(event.bot);
        }
    }

    /// Generate the bots a queued match is missing and put them in the queue.
    ///
    /// All or nothing: if either team cannot be filled, every bot made for
    /// the request is despawned again.
    pub fn generate_match_bots(&mut self, request: &MatchRequest) -> Result<Vec<BotId>, GenerateError> {
        let needed = request.needed();
        let total: usize = needed.iter().map(|(_, n)| n).sum();
        if total == 0 {
            return Ok(Vec::new());
        }
        let spare = self.generator.spare_count();
        if spare < total {
            warn!("Match needs {} bots but only {} are spare", total, spare);
            return Err(GenerateError::NotEnoughSpares { needed: total, spare });
        }

        let mut made: Vec<(TeamId, BotId)> = Vec::with_capacity(total);
        for (team, count) in needed {
            if count == 0 {
                continue;
            }
            let report = self.generate_batch(BatchRequest {
                count,
                region: RegionFilter::Region(request.region),
                team: Some(team),
                immediate: true,
                bracket: Some(request.bracket),
            });
            made.extend(report.spawned.iter().map(|id| (team, *id)));
            if !report.succeeded() {
                let failure = report.failure.unwrap_or(GenerateError::Partial {
                    team,
                    requested: count,
                    spawned: report.spawned.len(),
                });
                warn!("Match bot generation failed: {}", failure);
                for (_, id) in &made {
                    self.despawn_bot(*id);
                }
                return Err(failure);
            }
        }

        let sched = &self.config.scheduler;
        let deadline = self.scheduler.now() + sched.invite_accept_wait_ms + sched.match_start_delay_ms;
        let step = (sched.entry_spread_secs / total as u64).max(1);
        let mut delay_secs = sched.first_entry_delay_secs;

        for (team, id) in &made {
            self.registry.set_active(*id, false);
            self.registry.set_match_participant(*id, true);
            self.queue.enqueue_bot(*id, request.queue, *team);
            self.scheduler.events_mut().add_after(
                delay_secs * 1000,
                ScheduledEvent::MatchEntry(MatchEntryEvent {
                    bot: *id,
                    player: request.leader,
                    queue: request.queue,
                    team: *team,
                    deadline_ms: deadline,
                }),
            );
            delay_secs += step;
        }

        info!(
            "Queued {} match bots for player {} in queue {}",
            made.len(),
            request.leader,
            request.queue
        );
        Ok(made.into_iter().map(|(_, id)| id).collect())
    }
}
