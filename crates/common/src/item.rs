//! Equipment slots and item catalog vocabulary.

use crate::CommonError;
use serde::{Deserialize, Serialize};

/// Number of equipment slots a bot carries.
pub const BOT_INVENTORY_SIZE: usize = 18;

/// Bot equipment slot.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BotSlot {
    MainHand = 0,
    OffHand = 1,
    Ranged = 2,
    Head = 3,
    Shoulders = 4,
    Chest = 5,
    Waist = 6,
    Legs = 7,
    Feet = 8,
    Wrist = 9,
    Hands = 10,
    Back = 11,
    Body = 12,
    Finger1 = 13,
    Finger2 = 14,
    Trinket1 = 15,
    Trinket2 = 16,
    Neck = 17,
}

impl BotSlot {
    pub const ALL: [BotSlot; BOT_INVENTORY_SIZE] = [
        BotSlot::MainHand,
        BotSlot::OffHand,
        BotSlot::Ranged,
        BotSlot::Head,
        BotSlot::Shoulders,
        BotSlot::Chest,
        BotSlot::Waist,
        BotSlot::Legs,
        BotSlot::Feet,
        BotSlot::Wrist,
        BotSlot::Hands,
        BotSlot::Back,
        BotSlot::Body,
        BotSlot::Finger1,
        BotSlot::Finger2,
        BotSlot::Trinket1,
        BotSlot::Trinket2,
        BotSlot::Neck,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

impl TryFrom<u8> for BotSlot {
    type Error = CommonError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        BotSlot::ALL
            .get(value as usize)
            .copied()
            .ok_or(CommonError::UnknownSlot(value))
    }
}

/// Top-level item category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemClass {
    Weapon,
    Armor,
    Other,
}

/// Item subtype within its category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemSubclass {
    // Weapons
    Axe,
    Axe2,
    Bow,
    Gun,
    Mace,
    Mace2,
    Polearm,
    Sword,
    Sword2,
    Staff,
    Fist,
    Dagger,
    Thrown,
    Crossbow,
    Wand,
    // Armor
    Cloth,
    Leather,
    Mail,
    Plate,
    Shield,
    Misc,
    Other,
}

/// Where an item is worn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InventoryType {
    NonEquip,
    Head,
    Neck,
    Shoulders,
    Body,
    Chest,
    Robe,
    Waist,
    Legs,
    Feet,
    Wrists,
    Hands,
    Finger,
    Trinket,
    Cloak,
    /// One-handed, usable in either hand.
    Weapon,
    WeaponMainHand,
    WeaponOffHand,
    TwoHandWeapon,
    Shield,
    Holdable,
    Ranged,
    RangedRight,
    Thrown,
    Tabard,
}

impl InventoryType {
    /// Armor pieces whose material decides which classes can wear them.
    pub fn is_body_armor(self) -> bool {
        matches!(
            self,
            InventoryType::Head
                | InventoryType::Shoulders
                | InventoryType::Chest
                | InventoryType::Robe
                | InventoryType::Waist
                | InventoryType::Legs
                | InventoryType::Feet
                | InventoryType::Wrists
                | InventoryType::Hands
        )
    }

    /// Slot a body armor piece goes into.
    pub fn armor_slot(self) -> Option<BotSlot> {
        match self {
            InventoryType::Head => Some(BotSlot::Head),
            InventoryType::Shoulders => Some(BotSlot::Shoulders),
            InventoryType::Chest | InventoryType::Robe => Some(BotSlot::Chest),
            InventoryType::Waist => Some(BotSlot::Waist),
            InventoryType::Legs => Some(BotSlot::Legs),
            InventoryType::Feet => Some(BotSlot::Feet),
            InventoryType::Wrists => Some(BotSlot::Wrist),
            InventoryType::Hands => Some(BotSlot::Hands),
            InventoryType::Neck => Some(BotSlot::Neck),
            InventoryType::Body => Some(BotSlot::Body),
            _ => None,
        }
    }
}

/// Item rarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemQuality {
    Poor,
    Normal,
    Uncommon,
    Rare,
    Epic,
    Legendary,
    Artifact,
    Heirloom,
}
