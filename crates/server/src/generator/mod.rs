//! Identity allocation and bot synthesis.
//!
//! The generator owns the spare identity pool, the next-identity cursor and
//! the templates of every synthesized bot. Placement into the world is left
//! to the service.

mod pool;

pub use pool::SparePool;

use crate::attributes::AttributeStore;
use crate::config::GenerationConfig;
use crate::data::{creature_flags, CreatureTemplate};
use crate::error::GenerateError;
use common::{BotClass, BotId, FactionId, RegionId, TeamId};
use serde::Serialize;
use std::collections::HashMap;
use tracing::{info, warn};

/// Run speed given to every synthesized bot.
pub const GENERATED_RUN_SPEED: f32 = 1.05;

/// Forced level range for bots generated into a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LevelBracket {
    pub min: u8,
    pub max: u8,
}

/// Where generated bots may be placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegionFilter {
    /// Every continent region.
    #[default]
    Any,
    Region(RegionId),
}

/// A request to manufacture bots.
#[derive(Debug, Clone, Copy)]
pub struct BatchRequest {
    pub count: usize,
    pub region: RegionFilter,
    /// `None` picks one team for the whole batch.
    pub team: Option<TeamId>,
    /// Place bots now instead of queueing them for the scheduler.
    pub immediate: bool,
    pub bracket: Option<LevelBracket>,
}

impl BatchRequest {
    /// Deferred wanderers anywhere, any team.
    pub fn wanderers(count: usize) -> Self {
        Self {
            count,
            region: RegionFilter::Any,
            team: None,
            immediate: false,
            bracket: None,
        }
    }
}

/// Outcome of a batch. Committed bots are kept even when the batch fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub requested: usize,
    pub spawned: Vec<BotId>,
    pub failure: Option<GenerateError>,
}

impl BatchReport {
    pub fn new(requested: usize) -> Self {
        Self {
            requested,
            spawned: Vec::new(),
            failure: None,
        }
    }

    pub fn spawned_count(&self) -> usize {
        self.spawned.len()
    }

    /// Every requested bot was produced.
    pub fn succeeded(&self) -> bool {
        self.failure.is_none() && self.spawned.len() == self.requested
    }
}

/// A synthesized bot definition.
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnableBotTemplate {
    pub id: BotId,
    pub archetype: BotId,
    pub class: BotClass,
    pub race: Option<u8>,
    pub faction: FactionId,
    pub team: TeamId,
    pub bracket: Option<LevelBracket>,
    pub template: CreatureTemplate,
    /// Standard equipment is borrowed from the archetype.
    pub equipment_id: BotId,
}

/// Identity allocator and template factory.
#[derive(Debug, Default)]
pub struct BotGenerator {
    pool: SparePool,
    enabled_count: usize,
    next_id: BotId,
    catalog: HashMap<BotId, CreatureTemplate>,
    synthesized: HashMap<BotId, SpawnableBotTemplate>,
}

impl BotGenerator {
    /// Seed the spare pool from every enabled archetype that is not a persistent bot.
    pub fn seed(
        store: &AttributeStore,
        catalog: &[CreatureTemplate],
        stored_next_id: Option<BotId>,
        config: &GenerationConfig,
    ) -> Self {
        let catalog: HashMap<BotId, CreatureTemplate> =
            catalog.iter().map(|t| (t.entry, t.clone())).collect();

        let mut pool = SparePool::new();
        let mut enabled_count = 0;
        let mut profiles: Vec<_> = store.profiles().collect();
        profiles.sort_unstable_by_key(|(id, _)| *id);
        for (id, profile) in profiles {
            if id < config.authored_id_begin
                || profile.class == BotClass::Blademaster
                || !profile.enabled
                || config.is_class_disabled(profile.class)
            {
                continue;
            }
            enabled_count += 1;
            if store.contains(id) {
                continue;
            }
            if !catalog.contains_key(&id) {
                warn!("Archetype {} has no creature template, not used for generation", id);
                continue;
            }
            pool.insert(profile.class, id);
        }

        let highest_authored = catalog
            .keys()
            .copied()
            .filter(|id| *id >= config.authored_id_begin)
            .max()
            .unwrap_or(config.authored_id_begin);
        let next_id = match stored_next_id {
            Some(id) => id,
            None => {
                let id = (highest_authored + 1).max(config.generated_id_begin);
                warn!("No stored generated bot id, starting at {}", id);
                id
            }
        };

        info!(
            ">> Seeded {} spare bots in {} classes ({} enabled), next id {}",
            pool.len(),
            pool.classes().count(),
            enabled_count,
            next_id
        );

        Self {
            pool,
            enabled_count,
            next_id,
            catalog,
            synthesized: HashMap::new(),
        }
    }

    pub fn pool(&self) -> &SparePool {
        &self.pool
    }

    pub fn spare_count(&self) -> usize {
        self.pool.len()
    }

    pub fn enabled_count(&self) -> usize {
        self.enabled_count
    }

    /// Next identity the cursor will try.
    pub fn next_id(&self) -> BotId {
        self.next_id
    }

    pub fn archetype(&self, id: BotId) -> Option<&CreatureTemplate> {
        self.catalog.get(&id)
    }

    pub fn template(&self, id: BotId) -> Option<&SpawnableBotTemplate> {
        self.synthesized.get(&id)
    }

    pub fn is_generated(&self, id: BotId) -> bool {
        self.synthesized.contains_key(&id)
    }

    pub fn generated_ids(&self) -> impl Iterator<Item = BotId> + '_ {
        self.synthesized.keys().copied()
    }

    /// Claim the next free identity, skipping authored and synthesized ones.
    fn allocate_id(&mut self) -> BotId {
        while self.catalog.contains_key(&self.next_id) || self.synthesized.contains_key(&self.next_id) {
            self.next_id += 1;
        }
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Build a new bot from `archetype` and take the archetype out of the spare pool.
    pub fn synthesize(
        &mut self,
        archetype: BotId,
        class: BotClass,
        race: Option<u8>,
        faction: FactionId,
        team: TeamId,
        bracket: Option<LevelBracket>,
    ) -> Result<SpawnableBotTemplate, GenerateError> {
        let Some(source) = self.catalog.get(&archetype) else {
            return Err(GenerateError::NoSpares);
        };
        let mut template = source.clone();
        let id = self.allocate_id();
        template.entry = id;
        template.title.clear();
        template.speed_run = GENERATED_RUN_SPEED;
        template.kill_credit = archetype;
        template.faction = faction;
        match bracket {
            Some(b) => {
                template.min_level = b.min;
                template.max_level = b.max;
                template.type_flags |= creature_flags::TREAT_AS_RAID_UNIT;
            }
            None => template.flags_extra &= !creature_flags::NO_XP,
        }

        let spawnable = SpawnableBotTemplate {
            id,
            archetype,
            class,
            race,
            faction,
            team,
            bracket,
            template,
            equipment_id: archetype,
        };
        self.pool.remove(class, archetype);
        self.synthesized.insert(id, spawnable.clone());
        Ok(spawnable)
    }

    /// Forget a synthesized bot and return its archetype to the pool.
    pub fn retire(&mut self, id: BotId) -> Option<SpawnableBotTemplate> {
        let template = self.synthesized.remove(&id)?;
        self.pool.insert(template.class, template.archetype);
        Some(template)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::data::{AttributeRow, ExtrasRow, WorldData};
    use crate::journal::MemoryJournal;

    pub(crate) fn creature(entry: BotId) -> CreatureTemplate {
        CreatureTemplate {
            entry,
            name: format!("Archetype {}", entry),
            title: "Bot".to_string(),
            min_level: 1,
            max_level: 80,
            faction: 35,
            speed_run: 1.0,
            kill_credit: 0,
            type_flags: 0,
            flags_extra: creature_flags::NO_XP,
            equipment_id: entry,
        }
    }

    fn generator() -> BotGenerator {
        let data = WorldData {
            creatures: vec![creature(70001), creature(70002), creature(70003), creature(70005)],
            extras: vec![
                ExtrasRow { entry: 70001, class: 8, race: 1, enabled: true },
                ExtrasRow { entry: 70002, class: 12, race: 0, enabled: true },
                ExtrasRow { entry: 70003, class: 4, race: 2, enabled: true },
                ExtrasRow { entry: 70004, class: 4, race: 2, enabled: true },
                ExtrasRow { entry: 70005, class: 5, race: 1, enabled: true },
            ],
            bots: vec![AttributeRow {
                entry: 70005,
                owner: 0,
                roles: 0,
                spec: 0,
                faction: 1,
                equipment: Vec::new(),
                disabled_spells: String::new(),
            }],
            ..Default::default()
        };
        let store = AttributeStore::load(&data, Box::new(MemoryJournal::new()));
        BotGenerator::seed(&store, &data.creatures, None, &GenerationConfig::default())
    }

    #[test]
    fn test_seed_skips_blademaster_and_persistent_bots() {
        let generator = generator();
        assert_eq!(generator.spare_count(), 2);
        assert!(generator.pool().contains(BotClass::Mage, 70001));
        assert!(generator.pool().contains(BotClass::Rogue, 70003));
        // 70004 has no template but is still an enabled bot
        assert_eq!(generator.enabled_count(), 4);
        assert_eq!(generator.next_id(), 80000);
    }

    #[test]
    fn test_synthesize_copies_and_overrides() {
        let mut generator = generator();
        let bot = generator
            .synthesize(70001, BotClass::Mage, Some(1), 1, TeamId::Alliance, None)
            .unwrap();
        assert_eq!(bot.id, 80000);
        assert_eq!(bot.template.kill_credit, 70001);
        assert_eq!(bot.template.speed_run, GENERATED_RUN_SPEED);
        assert!(bot.template.title.is_empty());
        assert_eq!(bot.template.flags_extra & creature_flags::NO_XP, 0);
        assert!(!generator.pool().contains(BotClass::Mage, 70001));

        let retired = generator.retire(bot.id).unwrap();
        assert_eq!(retired.archetype, 70001);
        assert!(generator.pool().contains(BotClass::Mage, 70001));
    }

    #[test]
    fn test_bracket_forces_levels() {
        let mut generator = generator();
        let bracket = LevelBracket { min: 70, max: 79 };
        let bot = generator
            .synthesize(70003, BotClass::Rogue, Some(2), 2, TeamId::Horde, Some(bracket))
            .unwrap();
        assert_eq!((bot.template.min_level, bot.template.max_level), (70, 79));
        assert_ne!(bot.template.type_flags & creature_flags::TREAT_AS_RAID_UNIT, 0);
        assert_ne!(bot.template.flags_extra & creature_flags::NO_XP, 0);
    }

    #[test]
    fn test_cursor_skips_catalog_ids() {
        let data = WorldData {
            creatures: vec![creature(70001), creature(80000), creature(80001)],
            extras: vec![ExtrasRow { entry: 70001, class: 1, race: 1, enabled: true }],
            ..Default::default()
        };
        let store = AttributeStore::load(&data, Box::new(MemoryJournal::new()));
        let mut generator = BotGenerator::seed(&store, &data.creatures, Some(80000), &GenerationConfig::default());
        let bot = generator
            .synthesize(70001, BotClass::Warrior, Some(1), 1, TeamId::Alliance, None)
            .unwrap();
        assert_eq!(bot.id, 80002);
        assert_eq!(generator.next_id(), 80003);
    }
}
