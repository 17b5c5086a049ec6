//! Attribute store.
//!
//! Holds the persistent per-bot records: attributes, appearance, class/race
//! profile and transmog overrides. Generated bots get memory-only copies of
//! their archetype's records; only authored bots emit store writes.

use crate::data::WorldData;
use crate::journal::{StoreWrite, WriteSink};
use common::{
    BotClass, BotId, BotSlot, FactionId, ItemId, PlayerId, BOT_INVENTORY_SIZE,
};
use std::collections::{BTreeSet, HashMap};
use tracing::{error, info, warn};

/// Persistent attributes of one bot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotAttributes {
    pub owner: Option<PlayerId>,
    pub roles: u32,
    pub spec: u8,
    pub faction: FactionId,
    /// Equipped item per slot, 0 for the template default.
    pub equips: [ItemId; BOT_INVENTORY_SIZE],
    pub disabled_abilities: BTreeSet<u32>,
}

impl BotAttributes {
    pub fn new(roles: u32, spec: u8, faction: FactionId) -> Self {
        Self {
            owner: None,
            roles,
            spec,
            faction,
            equips: [0; BOT_INVENTORY_SIZE],
            disabled_abilities: BTreeSet::new(),
        }
    }

    pub fn equipped(&self, slot: BotSlot) -> Option<ItemId> {
        let item = self.equips[slot.index()];
        (item != 0).then_some(item)
    }
}

/// Cosmetic overrides authored for a bot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AppearanceOverride {
    pub skin: u8,
    pub face: u8,
    pub hair: u8,
    pub hair_color: u8,
    pub features: u8,
    pub gender: u8,
}

/// Class and race resolved at load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassRaceProfile {
    pub class: BotClass,
    pub race: Option<u8>,
    pub enabled: bool,
}

/// Cosmetic substitution for one equipment slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransmogOverride {
    pub real: ItemId,
    pub displayed: ItemId,
}

type TransmogSlots = [Option<TransmogOverride>; BOT_INVENTORY_SIZE];

/// Store for all persistent bot records.
pub struct AttributeStore {
    attributes: HashMap<BotId, BotAttributes>,
    appearance: HashMap<BotId, AppearanceOverride>,
    profiles: HashMap<BotId, ClassRaceProfile>,
    transmogs: HashMap<BotId, TransmogSlots>,
    /// Standard weapon set per creature template (main hand, off hand, ranged).
    standard_equipment: HashMap<BotId, [ItemId; 3]>,
    /// Identities whose records live only in memory.
    generated: BTreeSet<BotId>,
    sink: Box<dyn WriteSink + Send>,
}

impl std::fmt::Debug for AttributeStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttributeStore")
            .field("attributes", &self.attributes.len())
            .field("profiles", &self.profiles.len())
            .field("generated", &self.generated.len())
            .finish()
    }
}

impl AttributeStore {
    /// Empty store writing to `sink`.
    pub fn new(sink: Box<dyn WriteSink + Send>) -> Self {
        Self {
            attributes: HashMap::new(),
            appearance: HashMap::new(),
            profiles: HashMap::new(),
            transmogs: HashMap::new(),
            standard_equipment: HashMap::new(),
            generated: BTreeSet::new(),
            sink,
        }
    }

    /// Load every bot table from world data.
    pub fn load(data: &WorldData, sink: Box<dyn WriteSink + Send>) -> Self {
        let mut store = Self::new(sink);

        for row in &data.bots {
            let mut equips = [0; BOT_INVENTORY_SIZE];
            if row.equipment.len() > BOT_INVENTORY_SIZE {
                warn!("Bot {} lists {} equipment slots, extra ignored", row.entry, row.equipment.len());
            }
            for (slot, item) in equips.iter_mut().zip(&row.equipment) {
                *slot = *item;
            }
            let record = BotAttributes {
                owner: (row.owner != 0).then_some(row.owner),
                roles: row.roles,
                spec: row.spec,
                faction: row.faction,
                equips,
                disabled_abilities: parse_ability_list(row.entry, &row.disabled_spells),
            };
            if store.attributes.insert(row.entry, record).is_some() {
                warn!("Duplicate attribute row for bot {}, last one kept", row.entry);
            }
        }

        for row in &data.extras {
            let class = match BotClass::try_from(row.class) {
                Ok(class) => class,
                Err(e) => {
                    warn!("Bot {}: {}, profile skipped", row.entry, e);
                    continue;
                }
            };
            store.profiles.insert(
                row.entry,
                ClassRaceProfile {
                    class,
                    race: (row.race != 0).then_some(row.race),
                    enabled: row.enabled,
                },
            );
        }

        for row in &data.appearance {
            store.appearance.insert(
                row.entry,
                AppearanceOverride {
                    skin: row.skin,
                    face: row.face,
                    hair: row.hair,
                    hair_color: row.hair_color,
                    features: row.features,
                    gender: row.gender,
                },
            );
        }

        for row in &data.transmogs {
            let slot = match BotSlot::try_from(row.slot) {
                Ok(slot) => slot,
                Err(e) => {
                    warn!("Transmog for bot {}: {}, skipped", row.entry, e);
                    continue;
                }
            };
            let slots = store.transmogs.entry(row.entry).or_insert([None; BOT_INVENTORY_SIZE]);
            slots[slot.index()] = Some(TransmogOverride {
                real: row.real,
                displayed: row.displayed,
            });
        }

        for row in &data.equipment {
            store.standard_equipment.insert(row.entry, row.items);
        }

        info!(
            ">> Loaded {} bot attribute records, {} profiles, {} appearances, {} transmog sets",
            store.attributes.len(),
            store.profiles.len(),
            store.appearance.len(),
            store.transmogs.len()
        );
        store
    }

    fn persist(&mut self, write: StoreWrite) {
        if let Err(e) = self.sink.submit(write) {
            error!("Store write failed: {}", e);
        }
    }

    fn persist_for(&mut self, entry: BotId, write: StoreWrite) {
        if !self.generated.contains(&entry) {
            self.persist(write);
        }
    }

    /// Writes not tied to a single record, such as the generation counter.
    pub fn submit(&mut self, write: StoreWrite) {
        self.persist(write);
    }

    pub fn get(&self, entry: BotId) -> Option<&BotAttributes> {
        self.attributes.get(&entry)
    }

    pub fn get_mut(&mut self, entry: BotId) -> Option<&mut BotAttributes> {
        self.attributes.get_mut(&entry)
    }

    pub fn contains(&self, entry: BotId) -> bool {
        self.attributes.contains_key(&entry)
    }

    pub fn profile(&self, entry: BotId) -> Option<&ClassRaceProfile> {
        self.profiles.get(&entry)
    }

    /// All class/race profiles, in no particular order.
    pub fn profiles(&self) -> impl Iterator<Item = (BotId, &ClassRaceProfile)> {
        self.profiles.iter().map(|(id, p)| (*id, p))
    }

    pub fn appearance(&self, entry: BotId) -> Option<&AppearanceOverride> {
        self.appearance.get(&entry)
    }

    pub fn transmog(&self, entry: BotId, slot: BotSlot) -> Option<TransmogOverride> {
        self.transmogs.get(&entry).and_then(|slots| slots[slot.index()])
    }

    /// Identities with a persistent (non-generated) attribute record.
    pub fn authored_ids(&self) -> BTreeSet<BotId> {
        self.attributes
            .keys()
            .filter(|id| !self.generated.contains(id))
            .copied()
            .collect()
    }

    pub fn is_generated(&self, entry: BotId) -> bool {
        self.generated.contains(&entry)
    }

    /// Create a persistent record for an authored bot.
    pub fn add_bot_data(&mut self, entry: BotId, roles: u32, spec: u8, faction: FactionId) {
        if self.attributes.contains_key(&entry) {
            error!("add_bot_data: bot {} already has a record", entry);
            return;
        }
        self.attributes.insert(entry, BotAttributes::new(roles, spec, faction));
        self.persist(StoreWrite::InsertBot {
            entry,
            roles,
            spec,
            faction,
        });
    }

    /// Memory-only records for a generated bot, copied from its archetype.
    pub fn add_generated(
        &mut self,
        entry: BotId,
        archetype: BotId,
        roles: u32,
        spec: u8,
        faction: FactionId,
    ) {
        self.generated.insert(entry);
        self.attributes.insert(entry, BotAttributes::new(roles, spec, faction));
        if let Some(profile) = self.profiles.get(&archetype).copied() {
            self.profiles.insert(entry, profile);
        }
        if let Some(appearance) = self.appearance.get(&archetype).copied() {
            self.appearance.insert(entry, appearance);
        }
        if let Some(equipment) = self.standard_equipment.get(&archetype).copied() {
            self.standard_equipment.insert(entry, equipment);
        }
    }

    /// Drop every record of a generated bot.
    pub fn remove_generated(&mut self, entry: BotId) {
        if !self.generated.remove(&entry) {
            error!("remove_generated: bot {} is not a generated bot", entry);
            return;
        }
        self.attributes.remove(&entry);
        self.profiles.remove(&entry);
        self.appearance.remove(&entry);
        self.transmogs.remove(&entry);
        self.standard_equipment.remove(&entry);
    }

    /// Change the owner. Transmogs do not survive an owner change.
    pub fn update_owner(&mut self, entry: BotId, owner: Option<PlayerId>) {
        let Some(record) = self.attributes.get_mut(&entry) else {
            error!("update_owner: unknown bot {}", entry);
            return;
        };
        if record.owner == owner {
            return;
        }
        record.owner = owner;
        self.persist_for(entry, StoreWrite::UpdateOwner { entry, owner });
        self.erase_transmogs(entry);
    }

    /// Move every bot owned by `from` to `to`.
    pub fn update_owner_all(&mut self, from: PlayerId, to: Option<PlayerId>) {
        for record in self.attributes.values_mut() {
            if record.owner == Some(from) {
                record.owner = to;
            }
        }
        self.persist(StoreWrite::UpdateOwnerAll { from, to });
    }

    pub fn erase_transmogs(&mut self, entry: BotId) {
        self.transmogs.remove(&entry);
        self.persist_for(entry, StoreWrite::EraseTransmogs { entry });
    }

    pub fn erase_transmogs_by_owner(&mut self, owner: PlayerId) {
        let owned: Vec<BotId> = self
            .attributes
            .iter()
            .filter(|(_, r)| r.owner == Some(owner))
            .map(|(id, _)| *id)
            .collect();
        for entry in owned {
            self.transmogs.remove(&entry);
        }
        self.persist(StoreWrite::EraseTransmogsByOwner { owner });
    }

    pub fn update_roles(&mut self, entry: BotId, roles: u32) {
        let Some(record) = self.attributes.get_mut(&entry) else {
            error!("update_roles: unknown bot {}", entry);
            return;
        };
        record.roles = roles;
        self.persist_for(entry, StoreWrite::UpdateRoles { entry, roles });
    }

    pub fn update_spec(&mut self, entry: BotId, spec: u8) {
        let Some(record) = self.attributes.get_mut(&entry) else {
            error!("update_spec: unknown bot {}", entry);
            return;
        };
        record.spec = spec;
        self.persist_for(entry, StoreWrite::UpdateSpec { entry, spec });
    }

    pub fn update_faction(&mut self, entry: BotId, faction: FactionId) {
        let Some(record) = self.attributes.get_mut(&entry) else {
            error!("update_faction: unknown bot {}", entry);
            return;
        };
        record.faction = faction;
        self.persist_for(entry, StoreWrite::UpdateFaction { entry, faction });
    }

    pub fn update_disabled_abilities(&mut self, entry: BotId, abilities: BTreeSet<u32>) {
        let Some(record) = self.attributes.get_mut(&entry) else {
            error!("update_disabled_abilities: unknown bot {}", entry);
            return;
        };
        let list = abilities
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(" ");
        record.disabled_abilities = abilities;
        self.persist_for(
            entry,
            StoreWrite::UpdateDisabledAbilities {
                entry,
                abilities: list,
            },
        );
    }

    /// Replace the equipment of a bot.
    ///
    /// Items that match the bot's standard weapon set are stored as 0, all
    /// others become item instance upserts in the same write.
    pub fn update_equipment(&mut self, entry: BotId, items: [ItemId; BOT_INVENTORY_SIZE]) {
        let standard = self.standard_equipment.get(&entry).copied().unwrap_or([0; 3]);
        let Some(record) = self.attributes.get_mut(&entry) else {
            error!("update_equipment: unknown bot {}", entry);
            return;
        };
        let mut slots = [0; BOT_INVENTORY_SIZE];
        let mut upserts = Vec::new();
        for slot in BotSlot::ALL {
            let item = items[slot.index()];
            if item == 0 {
                continue;
            }
            let is_standard = slot.index() < standard.len() && standard[slot.index()] == item;
            if !is_standard {
                slots[slot.index()] = item;
                upserts.push((slot, item));
            }
        }
        record.equips = slots;
        self.persist_for(
            entry,
            StoreWrite::UpdateEquipment {
                entry,
                items: upserts,
                slots,
            },
        );
    }

    /// Permanently retire a bot.
    pub fn erase(&mut self, entry: BotId) {
        if self.attributes.remove(&entry).is_none() {
            error!("erase: unknown bot {}", entry);
            return;
        }
        self.transmogs.remove(&entry);
        self.persist_for(entry, StoreWrite::DeleteBot { entry });
        self.generated.remove(&entry);
    }

    /// Set one transmog slot, persisting the whole set when asked.
    pub fn set_transmog(
        &mut self,
        entry: BotId,
        slot: BotSlot,
        real: ItemId,
        displayed: ItemId,
        persist: bool,
    ) {
        let slots = self.transmogs.entry(entry).or_insert([None; BOT_INVENTORY_SIZE]);
        slots[slot.index()] = Some(TransmogOverride { real, displayed });
        if persist {
            self.write_transmogs(entry);
        }
    }

    /// Clear every transmog slot of a bot.
    pub fn reset_transmogs(&mut self, entry: BotId, persist: bool) {
        self.transmogs.remove(&entry);
        if persist {
            self.write_transmogs(entry);
        }
    }

    fn write_transmogs(&mut self, entry: BotId) {
        let slots = self
            .transmogs
            .get(&entry)
            .map(|slots| {
                BotSlot::ALL
                    .iter()
                    .filter_map(|s| slots[s.index()].map(|t| (*s, t.real, t.displayed)))
                    .collect()
            })
            .unwrap_or_default();
        self.persist_for(entry, StoreWrite::ReplaceTransmogs { entry, slots });
    }

    /// Number of bots owned by `owner` whose class bit is set in `class_mask`.
    pub fn owned_count(&self, owner: PlayerId, class_mask: u32) -> usize {
        self.attributes
            .iter()
            .filter(|(_, r)| r.owner == Some(owner))
            .filter(|(id, _)| {
                self.profiles
                    .get(id)
                    .is_some_and(|p| p.class.mask() & class_mask != 0)
            })
            .count()
    }

    /// Identities owned by `owner`, ascending.
    pub fn owned_by(&self, owner: PlayerId) -> Vec<BotId> {
        let mut ids: Vec<BotId> = self
            .attributes
            .iter()
            .filter(|(_, r)| r.owner == Some(owner))
            .map(|(id, _)| *id)
            .collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

fn parse_ability_list(entry: BotId, list: &str) -> BTreeSet<u32> {
    list.split_whitespace()
        .filter_map(|token| match token.parse() {
            Ok(id) => Some(id),
            Err(_) => {
                warn!("Bot {} has invalid disabled ability '{}'", entry, token);
                None
            }
        })
        .collect()
}
