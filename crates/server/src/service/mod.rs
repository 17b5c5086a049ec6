//! The world bot service.
//!
//! Owns every store of the manager. The simulation thread holds the service
//! and is its only writer; other threads see live bots through the shared
//! [`BotRegistry`].

mod generate;
mod lifecycle;

pub use lifecycle::MatchRequest;

use crate::attributes::{AttributeStore, BotAttributes};
use crate::config::Config;
use crate::data::WorldData;
use crate::error::DataError;
use crate::gear::GearCache;
use crate::generator::{BatchRequest, BotGenerator};
use crate::host::{MatchQueue, WorldHost};
use crate::journal::WriteSink;
use crate::registry::{BotActor, BotRegistry};
use crate::sampler::Sampler;
use crate::scheduler::Scheduler;
use crate::waypoint::{RouteQuery, WaypointGraph};
use common::{BotClass, BotId, BotSlot, FactionTable, ItemId, NodeId, PlayerId, Position, RegionId};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Bot data manager for one world.
pub struct WorldBotService<H, Q> {
    config: Config,
    factions: FactionTable,
    attributes: AttributeStore,
    graph: WaypointGraph,
    gear: GearCache,
    generator: BotGenerator,
    scheduler: Scheduler,
    registry: Arc<BotRegistry>,
    sampler: Sampler,
    host: H,
    queue: Q,
}

impl<H: WorldHost, Q: MatchQueue> WorldBotService<H, Q> {
    /// Load every store, validate the waypoint graph and request the initial population.
    pub fn startup(
        config: Config,
        data: &WorldData,
        sink: Box<dyn WriteSink + Send>,
        sampler: Sampler,
        host: H,
        queue: Q,
    ) -> Result<Self, DataError> {
        info!("Starting bot data manager...");

        let factions = data.faction_table();
        let attributes = AttributeStore::load(data, sink);
        let graph = WaypointGraph::build(&data.nodes, &data.regions, &config.waypoints)?;
        let gear = GearCache::build(&data.items, config.waypoints.max_level, config.gear.pick_attempts);
        let generator = BotGenerator::seed(
            &attributes,
            &data.creatures,
            data.next_generated_id,
            &config.generation,
        );
        let scheduler = Scheduler::new(config.scheduler.spawn_interval_ms);

        let mut service = Self {
            config,
            factions,
            attributes,
            graph,
            gear,
            generator,
            scheduler,
            registry: Arc::new(BotRegistry::new()),
            sampler,
            host,
            queue,
        };

        let desired = service.config.generation.desired_wanderers;
        if desired > 0 {
            let spare = service.generator.spare_count();
            if spare < desired {
                return Err(DataError::NotEnoughSpares { spare, desired });
            }
            let report = service.generate_batch(BatchRequest::wanderers(desired));
            let spawned = report.spawned_count();
            if let Some(source) = report.failure {
                error!("Queued only {} of {} wandering bots: {}", spawned, desired, source);
                return Err(DataError::WanderersShort {
                    spawned,
                    desired,
                    source,
                });
            }
            info!(">> Queued {} wandering bots", spawned);
        }

        Ok(service)
    }

    /// Rebuild the waypoint graph from fresh rows.
    ///
    /// The old graph stays in place when the new rows fail validation.
    pub fn reload_waypoints(&mut self, data: &WorldData) -> Result<(), DataError> {
        let graph = WaypointGraph::build(&data.nodes, &data.regions, &self.config.waypoints)?;
        info!(
            ">> Reloaded {} waypoints in {} regions",
            graph.len(),
            graph.region_count()
        );
        self.graph = graph;
        Ok(())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Shared handle to the live registry.
    pub fn registry(&self) -> Arc<BotRegistry> {
        Arc::clone(&self.registry)
    }

    pub fn graph(&self) -> &WaypointGraph {
        &self.graph
    }

    pub fn gear(&self) -> &GearCache {
        &self.gear
    }

    pub fn generator(&self) -> &BotGenerator {
        &self.generator
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn factions(&self) -> &FactionTable {
        &self.factions
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn queue(&self) -> &Q {
        &self.queue
    }

    pub fn queue_mut(&mut self) -> &mut Q {
        &mut self.queue
    }

    pub fn attributes(&self) -> &AttributeStore {
        &self.attributes
    }

    pub fn attributes_mut(&mut self) -> &mut AttributeStore {
        &mut self.attributes
    }

    /// Attribute record of one bot.
    pub fn bot_attributes(&self, id: BotId) -> Option<&BotAttributes> {
        self.attributes.get(id)
    }

    pub fn spare_count(&self) -> usize {
        self.generator.spare_count()
    }

    pub fn enabled_count(&self) -> usize {
        self.generator.enabled_count()
    }

    pub fn find_bot(&self, id: BotId) -> Option<BotActor> {
        self.registry.find(id)
    }

    pub fn find_bot_by_name(&self, name: &str) -> Option<BotActor> {
        self.registry.find_by_name(name)
    }

    /// Every bot identity owned by `owner`, live or not.
    pub fn list_owned_bot_identities(&self, owner: PlayerId) -> Vec<BotId> {
        self.attributes.owned_by(owner)
    }

    /// Hand a bot to `owner`, or release it with `None`.
    ///
    /// The attribute record and the live actor change together, so the
    /// registry's owner lookups agree with [`Self::list_owned_bot_identities`].
    pub fn update_owner(&mut self, id: BotId, owner: Option<PlayerId>) {
        self.attributes.update_owner(id, owner);
        let recorded = self.attributes.get(id).and_then(|r| r.owner);
        self.registry.set_owner(id, recorded);
    }

    /// Move every bot of `from` to `to`.
    pub fn update_owner_all(&mut self, from: PlayerId, to: Option<PlayerId>) {
        self.attributes.update_owner_all(from, to);
        for id in self.registry.owned_by(from) {
            self.registry.set_owner(id, to);
        }
    }

    /// Node a wandering bot should travel to next.
    pub fn next_waypoint(&mut self, query: &RouteQuery) -> Option<NodeId> {
        self.graph.next_node(query, &mut self.sampler)
    }

    pub fn closest_waypoint(&self, region: RegionId, position: &Position) -> Option<NodeId> {
        self.graph.closest_node(region, position).map(|n| n.id)
    }

    pub fn pick_item(
        &mut self,
        slot: BotSlot,
        class: BotClass,
        level: u8,
        accept: impl Fn(ItemId) -> bool,
    ) -> Option<ItemId> {
        self.gear.pick_item(slot, class, level, &mut self.sampler, accept)
    }

    /// Fill every slot of a generated bot from the gear cache.
    ///
    /// Returns the number of slots filled. An item is never worn twice.
    pub fn equip_generated_bot(&mut self, id: BotId) -> usize {
        if !self.generator.is_generated(id) {
            warn!("equip_generated_bot: bot {} is not generated", id);
            return 0;
        }
        let Some(actor) = self.registry.find(id) else {
            warn!("equip_generated_bot: bot {} is not live", id);
            return 0;
        };
        let mut worn: Vec<ItemId> = Vec::new();
        let mut filled = 0;
        for slot in BotSlot::ALL {
            let picked = self.gear.pick_item(slot, actor.class, actor.level, &mut self.sampler, |item| {
                !worn.contains(&item)
            });
            let Some(item) = picked else {
                continue;
            };
            let Some(record) = self.attributes.get_mut(id) else {
                break;
            };
            record.equips[slot.index()] = item;
            worn.push(item);
            filled += 1;
        }
        filled
    }

    pub fn equipped_item(&self, id: BotId, slot: BotSlot) -> Option<ItemId> {
        self.attributes.get(id).and_then(|r| r.equipped(slot))
    }
}
