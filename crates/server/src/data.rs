//! Persistent world rows.
//!
//! Everything the manager reads at startup comes from one TOML document.
//! Row shapes follow the tables the world database keeps for bots.

use crate::error::DataError;
use common::{
    BotId, FactionId, FactionTable, InventoryType, ItemClass, ItemId, ItemQuality, ItemSubclass,
    NodeId, PlayerId, RegionId, TeamId,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Creature template flag bits used by the generator.
pub mod creature_flags {
    /// Killing the creature grants no experience.
    pub const NO_XP: u32 = 0x40;
    /// Counted as a raid member by match instances.
    pub const TREAT_AS_RAID_UNIT: u32 = 0x4000;
}

/// Kind of world region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionKind {
    #[default]
    Continent,
    Battleground,
    Instance,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionRow {
    pub id: RegionId,
    #[serde(default)]
    pub kind: RegionKind,
    #[serde(default)]
    pub name: String,
}

/// Default faction for a playable race.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaceRow {
    pub race: u8,
    pub faction: FactionId,
}

/// Team a faction template is friendly to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactionGroupRow {
    pub faction: FactionId,
    pub team: TeamId,
}

/// Authored creature template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatureTemplate {
    pub entry: BotId,
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default = "default_level")]
    pub min_level: u8,
    #[serde(default = "default_level")]
    pub max_level: u8,
    #[serde(default)]
    pub faction: FactionId,
    #[serde(default = "default_speed")]
    pub speed_run: f32,
    #[serde(default)]
    pub kill_credit: BotId,
    #[serde(default)]
    pub type_flags: u32,
    #[serde(default)]
    pub flags_extra: u32,
    /// Standard equipment template id (0 = none).
    #[serde(default)]
    pub equipment_id: u32,
}

fn default_level() -> u8 {
    1
}
fn default_speed() -> f32 {
    1.0
}

/// Standard weapon set for a creature (main hand, off hand, ranged).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EquipmentRow {
    pub entry: BotId,
    pub items: [ItemId; 3],
}

/// Item catalog entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemTemplate {
    pub entry: ItemId,
    #[serde(default)]
    pub name: String,
    pub class: ItemClass,
    pub subclass: ItemSubclass,
    pub inventory_type: InventoryType,
    pub quality: ItemQuality,
    pub item_level: u32,
    #[serde(default)]
    pub required_level: u8,
    #[serde(default)]
    pub armor: u32,
    #[serde(default)]
    pub damage_min: f32,
}

/// Persistent bot attribute row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeRow {
    pub entry: BotId,
    #[serde(default)]
    pub owner: PlayerId,
    #[serde(default)]
    pub roles: u32,
    #[serde(default)]
    pub spec: u8,
    #[serde(default)]
    pub faction: FactionId,
    /// Equipped item per slot, 0 for the template default.
    #[serde(default)]
    pub equipment: Vec<ItemId>,
    /// Space-separated ability ids.
    #[serde(default)]
    pub disabled_spells: String,
}

/// Class and race of an authored creature.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtrasRow {
    pub entry: BotId,
    pub class: u8,
    #[serde(default)]
    pub race: u8,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppearanceRow {
    pub entry: BotId,
    #[serde(default)]
    pub skin: u8,
    #[serde(default)]
    pub face: u8,
    #[serde(default)]
    pub hair: u8,
    #[serde(default)]
    pub hair_color: u8,
    #[serde(default)]
    pub features: u8,
    #[serde(default)]
    pub gender: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransmogRow {
    pub entry: BotId,
    pub slot: u8,
    pub real: ItemId,
    pub displayed: ItemId,
}

/// Waypoint node definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeRow {
    pub id: NodeId,
    pub region: RegionId,
    pub x: f32,
    pub y: f32,
    pub z: f32,
    #[serde(default)]
    pub o: f32,
    #[serde(default)]
    pub zone: u32,
    #[serde(default)]
    pub area: u32,
    #[serde(default)]
    pub min_level: u8,
    #[serde(default)]
    pub max_level: u8,
    #[serde(default)]
    pub flags: u32,
    #[serde(default)]
    pub name: String,
    /// Whitespace-separated `target:kind` tokens.
    #[serde(default)]
    pub links: String,
}

/// The complete world data document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorldData {
    #[serde(default)]
    pub regions: Vec<RegionRow>,
    #[serde(default)]
    pub races: Vec<RaceRow>,
    #[serde(default)]
    pub faction_groups: Vec<FactionGroupRow>,
    #[serde(default)]
    pub creatures: Vec<CreatureTemplate>,
    #[serde(default)]
    pub equipment: Vec<EquipmentRow>,
    #[serde(default)]
    pub items: Vec<ItemTemplate>,
    #[serde(default)]
    pub bots: Vec<AttributeRow>,
    #[serde(default)]
    pub extras: Vec<ExtrasRow>,
    #[serde(default)]
    pub appearance: Vec<AppearanceRow>,
    #[serde(default)]
    pub transmogs: Vec<TransmogRow>,
    #[serde(default)]
    pub nodes: Vec<NodeRow>,
    #[serde(default)]
    pub next_generated_id: Option<BotId>,
}

impl WorldData {
    /// Read and parse a world data file.
    pub fn load(path: &Path) -> Result<Self, DataError> {
        let contents = std::fs::read_to_string(path)?;
        let data: WorldData = toml::from_str(&contents)?;
        info!(
            ">> Read world data from {}: {} creatures, {} items, {} nodes",
            path.display(),
            data.creatures.len(),
            data.items.len(),
            data.nodes.len()
        );
        Ok(data)
    }

    /// Faction table from the race and faction group rows, falling back to built-in defaults.
    pub fn faction_table(&self) -> FactionTable {
        let mut table = FactionTable::default();
        if !self.races.is_empty() {
            table.races = self.races.iter().map(|r| (r.race, r.faction)).collect();
        }
        if !self.faction_groups.is_empty() {
            table.alliance.clear();
            table.horde.clear();
            for group in &self.faction_groups {
                match group.team {
                    TeamId::Alliance => {
                        table.alliance.insert(group.faction);
                    }
                    TeamId::Horde => {
                        table.horde.insert(group.faction);
                    }
                    TeamId::Neutral => {}
                }
            }
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_document() {
        let data: WorldData = toml::from_str(
            r#"
            next_generated_id = 80010

            [[regions]]
            id = 0
            name = "Eastern Kingdoms"

            [[regions]]
            id = 489
            kind = "battleground"

            [[creatures]]
            entry = 70001
            name = "Archetype"

            [[nodes]]
            id = 1
            region = 0
            x = 1.0
            y = 2.0
            z = 3.0
            links = "2:0 3:0"
            "#,
        )
        .unwrap();
        assert_eq!(data.regions[1].kind, RegionKind::Battleground);
        assert_eq!(data.creatures[0].speed_run, 1.0);
        assert_eq!(data.nodes[0].links, "2:0 3:0");
        assert_eq!(data.next_generated_id, Some(80010));
    }

    #[test]
    fn test_faction_groups_replace_defaults() {
        let data = WorldData {
            faction_groups: vec![FactionGroupRow {
                faction: 35,
                team: TeamId::Alliance,
            }],
            ..Default::default()
        };
        let table = data.faction_table();
        assert_eq!(table.team_for_faction(35), TeamId::Alliance);
        assert_eq!(table.team_for_faction(1), TeamId::Neutral);
    }
}
