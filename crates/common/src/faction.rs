//! Teams and faction templates.

use crate::{BotClass, CommonError, FactionId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Faction of wild, unaligned creatures.
pub const FACTION_MONSTER: FactionId = 14;

/// Faction category a bot or waypoint belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeamId {
    Alliance,
    Horde,
    Neutral,
}

impl TeamId {
    pub const ALL: [TeamId; 3] = [TeamId::Alliance, TeamId::Horde, TeamId::Neutral];

    /// Sampling table used when the caller asks for any team.
    pub const ANY_TABLE: [TeamId; 6] = [
        TeamId::Alliance,
        TeamId::Horde,
        TeamId::Neutral,
        TeamId::Alliance,
        TeamId::Horde,
        TeamId::Neutral,
    ];

    /// Lowest node max level a spawn node must reach to host every class of this team.
    pub fn required_spawn_level(self) -> u8 {
        match self {
            TeamId::Alliance | TeamId::Horde => BotClass::MAX_STANDARD_MIN_LEVEL,
            TeamId::Neutral => BotClass::MAX_EXTENDED_MIN_LEVEL,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TeamId::Alliance => "alliance",
            TeamId::Horde => "horde",
            TeamId::Neutral => "neutral",
        }
    }
}

impl TryFrom<i32> for TeamId {
    type Error = CommonError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(TeamId::Alliance),
            1 => Ok(TeamId::Horde),
            2 => Ok(TeamId::Neutral),
            other => Err(CommonError::UnknownTeam(other)),
        }
    }
}

impl std::fmt::Display for TeamId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Race and faction-group lookup used to resolve a bot's faction and team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactionTable {
    /// Default faction template per playable race id.
    pub races: BTreeMap<u8, FactionId>,
    /// Faction templates friendly to the alliance.
    pub alliance: BTreeSet<FactionId>,
    /// Faction templates friendly to the horde.
    pub horde: BTreeSet<FactionId>,
}

impl Default for FactionTable {
    fn default() -> Self {
        let races = [
            (1, 1),
            (2, 2),
            (3, 3),
            (4, 4),
            (5, 5),
            (6, 6),
            (7, 115),
            (8, 116),
            (10, 1610),
            (11, 1629),
        ];
        Self {
            races: races.into_iter().collect(),
            alliance: [1, 3, 4, 115, 1629].into_iter().collect(),
            horde: [2, 5, 6, 116, 1610].into_iter().collect(),
        }
    }
}

impl FactionTable {
    /// Faction for an extended class, which ignores race.
    pub fn extended_class_faction(class: BotClass) -> Option<FactionId> {
        match class {
            BotClass::Blademaster => Some(2),
            BotClass::Sphynx => Some(14),
            BotClass::Archmage => Some(1),
            BotClass::Dreadlord => Some(14),
            BotClass::Spellbreaker => Some(1610),
            BotClass::DarkRanger => Some(14),
            BotClass::Necromancer => Some(14),
            BotClass::SeaWitch => Some(14),
            _ => None,
        }
    }

    /// Default faction for a class/race pair.
    pub fn default_faction(&self, class: BotClass, race: Option<u8>) -> FactionId {
        if let Some(faction) = Self::extended_class_faction(class) {
            return faction;
        }
        race.and_then(|r| self.races.get(&r).copied())
            .unwrap_or(FACTION_MONSTER)
    }

    /// Team a faction template belongs to.
    pub fn team_for_faction(&self, faction: FactionId) -> TeamId {
        if self.alliance.contains(&faction) {
            TeamId::Alliance
        } else if self.horde.contains(&faction) {
            TeamId::Horde
        } else {
            TeamId::Neutral
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extended_class_ignores_race() {
        let table = FactionTable::default();
        assert_eq!(table.default_faction(BotClass::Spellbreaker, Some(1)), 1610);
        assert_eq!(table.team_for_faction(1610), TeamId::Horde);
        assert_eq!(table.default_faction(BotClass::Necromancer, None), FACTION_MONSTER);
    }

    #[test]
    fn test_race_defaults() {
        let table = FactionTable::default();
        assert_eq!(table.default_faction(BotClass::Mage, Some(7)), 115);
        assert_eq!(table.team_for_faction(115), TeamId::Alliance);
        assert_eq!(table.default_faction(BotClass::Rogue, None), FACTION_MONSTER);
        assert_eq!(table.team_for_faction(FACTION_MONSTER), TeamId::Neutral);
    }

    #[test]
    fn test_team_codes() {
        assert_eq!(TeamId::try_from(1), Ok(TeamId::Horde));
        assert!(TeamId::try_from(-1).is_err());
    }
}
