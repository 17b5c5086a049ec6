//! Bot classes.

use crate::CommonError;
use serde::{Deserialize, Serialize};

/// Role bitmask values stored in bot attribute records.
pub mod roles {
    pub const NONE: u32 = 0x00;
    pub const TANK: u32 = 0x01;
    pub const DPS: u32 = 0x02;
    pub const HEAL: u32 = 0x04;
    pub const RANGED: u32 = 0x08;
}

/// Bot class. Values 1..=11 mirror player classes, 12 and above are extended bot-only classes.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum BotClass {
    Warrior = 1,
    Paladin = 2,
    Hunter = 3,
    Rogue = 4,
    Priest = 5,
    DeathKnight = 6,
    Shaman = 7,
    Mage = 8,
    Warlock = 9,
    Druid = 11,
    Blademaster = 12,
    Sphynx = 13,
    Archmage = 14,
    Dreadlord = 15,
    Spellbreaker = 16,
    DarkRanger = 17,
    Necromancer = 18,
    SeaWitch = 19,
}

impl BotClass {
    /// Every class, in ascending code order.
    pub const ALL: [BotClass; 18] = [
        BotClass::Warrior,
        BotClass::Paladin,
        BotClass::Hunter,
        BotClass::Rogue,
        BotClass::Priest,
        BotClass::DeathKnight,
        BotClass::Shaman,
        BotClass::Mage,
        BotClass::Warlock,
        BotClass::Druid,
        BotClass::Blademaster,
        BotClass::Sphynx,
        BotClass::Archmage,
        BotClass::Dreadlord,
        BotClass::Spellbreaker,
        BotClass::DarkRanger,
        BotClass::Necromancer,
        BotClass::SeaWitch,
    ];

    /// Highest class minimum among standard classes (death knight).
    pub const MAX_STANDARD_MIN_LEVEL: u8 = 55;
    /// Highest class minimum among extended classes (dreadlord, sphynx).
    pub const MAX_EXTENDED_MIN_LEVEL: u8 = 60;

    /// Raw class code.
    #[inline]
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Whether this is a bot-only class without a playable race mapping.
    #[inline]
    pub fn is_extended(self) -> bool {
        self.code() >= BotClass::Blademaster.code()
    }

    /// Bit used by owner class filters (`1 << (code - 1)`).
    #[inline]
    pub fn mask(self) -> u32 {
        1u32 << (self.code() - 1)
    }

    /// Lowest level a bot of this class may have.
    pub fn min_level(self) -> u8 {
        match self {
            BotClass::DeathKnight => 55,
            BotClass::Archmage | BotClass::Spellbreaker | BotClass::Necromancer => 20,
            BotClass::DarkRanger => 40,
            BotClass::Sphynx | BotClass::Dreadlord => 60,
            _ => 1,
        }
    }

    /// Roles assigned to a freshly generated bot of this class.
    pub fn default_roles(self) -> u32 {
        match self {
            BotClass::Warrior | BotClass::Paladin | BotClass::DeathKnight | BotClass::Blademaster => {
                roles::TANK | roles::DPS
            }
            BotClass::Priest | BotClass::Druid | BotClass::Shaman => roles::DPS | roles::HEAL,
            BotClass::Hunter
            | BotClass::Mage
            | BotClass::Warlock
            | BotClass::Sphynx
            | BotClass::Archmage
            | BotClass::DarkRanger
            | BotClass::Necromancer
            | BotClass::SeaWitch => roles::DPS | roles::RANGED,
            BotClass::Rogue | BotClass::Dreadlord | BotClass::Spellbreaker => roles::DPS,
        }
    }

    /// Specialization index assigned to a freshly generated bot of this class.
    ///
    /// Standard classes have three specs numbered consecutively per class;
    /// extended classes have none.
    pub fn default_spec(self) -> u8 {
        if self.is_extended() {
            return 0;
        }
        let ordinal = if self == BotClass::Druid { 10 } else { self.code() };
        (ordinal - 1) * 3 + 1
    }

    pub fn name(self) -> &'static str {
        match self {
            BotClass::Warrior => "Warrior",
            BotClass::Paladin => "Paladin",
            BotClass::Hunter => "Hunter",
            BotClass::Rogue => "Rogue",
            BotClass::Priest => "Priest",
            BotClass::DeathKnight => "Death Knight",
            BotClass::Shaman => "Shaman",
            BotClass::Mage => "Mage",
            BotClass::Warlock => "Warlock",
            BotClass::Druid => "Druid",
            BotClass::Blademaster => "Blademaster",
            BotClass::Sphynx => "Sphynx",
            BotClass::Archmage => "Archmage",
            BotClass::Dreadlord => "Dreadlord",
            BotClass::Spellbreaker => "Spellbreaker",
            BotClass::DarkRanger => "Dark Ranger",
            BotClass::Necromancer => "Necromancer",
            BotClass::SeaWitch => "Sea Witch",
        }
    }
}

impl TryFrom<u8> for BotClass {
    type Error = CommonError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        BotClass::ALL
            .iter()
            .copied()
            .find(|c| c.code() == code)
            .ok_or(CommonError::UnknownClass(code))
    }
}

impl From<BotClass> for u8 {
    fn from(class: BotClass) -> Self {
        class.code()
    }
}

impl std::fmt::Display for BotClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_roundtrip_rejects_gap() {
        assert_eq!(BotClass::try_from(11), Ok(BotClass::Druid));
        assert_eq!(BotClass::try_from(10), Err(CommonError::UnknownClass(10)));
        assert_eq!(BotClass::try_from(20), Err(CommonError::UnknownClass(20)));
    }

    #[test]
    fn test_min_levels() {
        assert_eq!(BotClass::DeathKnight.min_level(), BotClass::MAX_STANDARD_MIN_LEVEL);
        assert_eq!(BotClass::Dreadlord.min_level(), BotClass::MAX_EXTENDED_MIN_LEVEL);
        assert_eq!(BotClass::DarkRanger.min_level(), 40);
        assert_eq!(BotClass::Rogue.min_level(), 1);
    }

    #[test]
    fn test_default_spec() {
        assert_eq!(BotClass::Warrior.default_spec(), 1);
        assert_eq!(BotClass::Druid.default_spec(), 28);
        assert_eq!(BotClass::Necromancer.default_spec(), 0);
    }
}
