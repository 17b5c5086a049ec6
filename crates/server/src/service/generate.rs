//! Batch generation and placement of synthesized bots.

use super::WorldBotService;
use crate::error::{GenerateError, HostError};
use crate::generator::{
    BatchReport, BatchRequest, LevelBracket, RegionFilter, SpawnableBotTemplate, SparePool,
};
use crate::host::{MatchQueue, WorldHost};
use crate::journal::StoreWrite;
use crate::registry::BotActor;
use crate::sampler::Sampler;
use crate::waypoint::WaypointNode;
use common::{BotId, NodeId, RegionId, TeamId};
use tracing::{debug, error, warn};

/// Spawn node candidates for each team, in `TeamId::ALL` order.
type Partitions = [Vec<NodeId>; 3];

fn team_index(team: TeamId) -> usize {
    match team {
        TeamId::Alliance => 0,
        TeamId::Horde => 1,
        TeamId::Neutral => 2,
    }
}

fn filter_region(filter: RegionFilter) -> Option<RegionId> {
    match filter {
        RegionFilter::Any => None,
        RegionFilter::Region(region) => Some(region),
    }
}

/// Level a bot spawns at: inside its bracket if it has one, otherwise inside
/// the node's range, never below what its class allows.
pub(crate) fn spawn_level(bot: &SpawnableBotTemplate, node: &WaypointNode, sampler: &mut Sampler) -> u8 {
    let class_min = bot.class.min_level();
    let (min, max) = match bot.bracket {
        Some(LevelBracket { min, max }) => (min, max),
        None => (node.min_level, node.max_level),
    };
    let max = max.max(class_min);
    let min = min.max(class_min).min(max);
    sampler.range(min..=max)
}

impl<H: WorldHost, Q: MatchQueue> WorldBotService<H, Q> {
    /// Manufacture up to `request.count` bots.
    ///
    /// Bots committed before a failure stay live or queued; the report says
    /// how many there are and why the rest could not be made.
    pub fn generate_batch(&mut self, request: BatchRequest) -> BatchReport {
        let mut report = BatchReport::new(request.count);
        if request.count == 0 {
            return report;
        }
        if self.generator.pool().is_empty() {
            report.failure = Some(GenerateError::NoSpares);
            return report;
        }

        let partitions = self.spawn_partitions(request.region);
        let team = match request.team {
            Some(team) => team,
            None => self
                .sampler
                .pick(&TeamId::ANY_TABLE)
                .copied()
                .unwrap_or(TeamId::Neutral),
        };
        let region = filter_region(request.region);
        let nodes = &partitions[team_index(team)];

        let required = team.required_spawn_level();
        let reaches_required = nodes
            .iter()
            .filter_map(|id| self.graph.node(*id))
            .any(|node| node.max_level >= required);
        if !reaches_required {
            report.failure = Some(GenerateError::NoSpawnNodes { team, region });
            return report;
        }

        let mut team_pool = self.team_pool(team, request.bracket);
        if team_pool.is_empty() {
            report.failure = Some(GenerateError::NoSparesForTeam(team));
            return report;
        }

        let max_failures = self.config.generation.max_consecutive_failures.max(1);
        let mut failures = 0;
        while report.spawned.len() < request.count {
            if team_pool.is_empty() {
                report.failure = Some(GenerateError::Partial {
                    team,
                    requested: request.count,
                    spawned: report.spawned.len(),
                });
                break;
            }
            match self.generate_one(&mut team_pool, nodes, region, &request) {
                Ok(id) => {
                    report.spawned.push(id);
                    failures = 0;
                }
                Err(e) => {
                    failures += 1;
                    debug!("Bot generation attempt failed: {}", e);
                    if failures >= max_failures {
                        error!("Bot generation gave up after {} failed attempts", failures);
                        report.failure = Some(GenerateError::TooManyFailures(failures));
                        break;
                    }
                }
            }
        }

        if !report.spawned.is_empty() {
            self.attributes.submit(StoreWrite::SetNextGeneratedId {
                id: self.generator.next_id(),
            });
        }
        debug!(
            "Generated {}/{} {} bots{}",
            report.spawned_count(),
            request.count,
            team,
            if request.immediate { "" } else { " (queued)" }
        );
        report
    }

    /// Spawn-flagged linked nodes of every region the filter allows, split by team.
    fn spawn_partitions(&self, filter: RegionFilter) -> Partitions {
        let mut partitions: Partitions = Default::default();
        let regions: Vec<RegionId> = match filter {
            RegionFilter::Any => self.graph.regions().filter(|r| self.graph.is_continent(*r)).collect(),
            RegionFilter::Region(region) => vec![region],
        };
        for region in regions {
            for node in self.graph.nodes_in_region(region) {
                if !node.flags.is_spawn() || node.links.is_empty() {
                    continue;
                }
                for team in TeamId::ALL {
                    if node.flags.allows_team(team) {
                        partitions[team_index(team)].push(node.id);
                    }
                }
            }
        }
        partitions
    }

    /// Spare archetypes belonging to `team` that can reach the bracket.
    fn team_pool(&self, team: TeamId, bracket: Option<LevelBracket>) -> SparePool {
        let attributes = &self.attributes;
        let factions = &self.factions;
        self.generator.pool().filtered(|class, id| {
            if bracket.is_some_and(|b| class.min_level() > b.max) {
                return false;
            }
            let race = attributes.profile(id).and_then(|p| p.race);
            factions.team_for_faction(factions.default_faction(class, race)) == team
        })
    }

    /// Produce one bot from `team_pool`, placing or queueing it.
    fn generate_one(
        &mut self,
        team_pool: &mut SparePool,
        nodes: &[NodeId],
        region: Option<RegionId>,
        request: &BatchRequest,
    ) -> Result<BotId, GenerateError> {
        let (class, archetype) = team_pool.pick(&mut self.sampler).ok_or(GenerateError::NoSpares)?;
        let race = self.attributes.profile(archetype).and_then(|p| p.race);
        let faction = self.factions.default_faction(class, race);
        let team = self.factions.team_for_faction(faction);

        let class_min = class.min_level();
        let candidates: Vec<NodeId> = nodes
            .iter()
            .copied()
            .filter(|id| self.graph.node(*id).is_some_and(|n| n.max_level >= class_min))
            .collect();
        let node = *self
            .sampler
            .pick(&candidates)
            .ok_or(GenerateError::NoSpawnNodes { team, region })?;

        let bot = self
            .generator
            .synthesize(archetype, class, race, faction, team, request.bracket)?;
        self.attributes
            .add_generated(bot.id, archetype, class.default_roles(), class.default_spec(), faction);
        team_pool.remove(class, archetype);

        if request.immediate {
            if let Err(e) = self.place_bot(bot.id, node) {
                self.discard_generated(bot.id);
                team_pool.insert(class, archetype);
                return Err(e.into());
            }
        } else {
            self.scheduler.queue_spawn(bot.id, node);
        }
        Ok(bot.id)
    }

    /// Put a synthesized bot into the world at `node` and make it live.
    pub(crate) fn place_bot(&mut self, id: BotId, node: NodeId) -> Result<(), HostError> {
        let bot = self.generator.template(id).ok_or(HostError::UnknownBot(id))?;
        let spawn_node = self.graph.node(node).ok_or(HostError::BadNode(node))?;
        let level = spawn_level(bot, spawn_node, &mut self.sampler);
        self.host.spawn(bot, spawn_node, level)?;
        let owner = self.attributes.get(id).and_then(|r| r.owner);

        let registered = self.registry.register(BotActor {
            id,
            name: bot.template.name.clone(),
            class: bot.class,
            race: bot.race,
            faction: bot.faction,
            team: bot.team,
            region: spawn_node.region,
            level,
            archetype: Some(bot.archetype),
            owner,
            wanderer: true,
            active: true,
            match_participant: false,
        });
        if !registered {
            warn!("Bot {} placed but already registered", id);
        }
        self.equip_generated_bot(id);
        debug!("Placed bot {} at node {} (level {})", id, node, level);
        Ok(())
    }

    /// Forget a synthesized bot that never became live.
    pub(crate) fn discard_generated(&mut self, id: BotId) {
        if self.generator.retire(id).is_some() {
            self.attributes.remove_generated(id);
        }
    }
}
