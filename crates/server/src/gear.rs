//! Gear classification cache.
//!
//! Every catalog item is classified once into the (class, slot, level
//! bracket) buckets it may be drawn from when equipping a generated bot.

use crate::data::ItemTemplate;
use crate::sampler::Sampler;
use common::{BotClass, BotSlot, InventoryType, ItemClass, ItemId, ItemQuality, ItemSubclass};
use std::collections::HashMap;
use tracing::info;

/// Levels per bracket.
pub const LEVEL_STEP: u8 = 5;

type BucketKey = (BotClass, BotSlot, u8);

/// Precomputed item buckets.
#[derive(Debug, Clone, Default)]
pub struct GearCache {
    buckets: HashMap<BucketKey, Vec<ItemId>>,
    max_level: u8,
    pick_attempts: u32,
}

impl GearCache {
    pub fn build(items: &[ItemTemplate], max_level: u8, pick_attempts: u32) -> Self {
        let mut cache = Self {
            buckets: HashMap::new(),
            max_level,
            pick_attempts,
        };
        let mut classified = 0usize;
        for item in items {
            if !passes_quality(item, max_level) {
                continue;
            }
            let targets = classify(item);
            if targets.is_empty() {
                continue;
            }
            classified += 1;
            let bracket = item.required_level.div_ceil(LEVEL_STEP);
            for (class, slot) in targets {
                cache
                    .buckets
                    .entry((class, slot, bracket))
                    .or_default()
                    .push(item.entry);
            }
        }
        info!(
            ">> Classified {} of {} items into {} gear buckets",
            classified,
            items.len(),
            cache.buckets.len()
        );
        cache
    }

    fn bracket_for(&self, level: u8) -> u8 {
        let clamped = level.min(self.max_level.saturating_add(LEVEL_STEP - 1));
        clamped / LEVEL_STEP
    }

    /// Items a bot of `class` and `level` may wear in `slot`.
    pub fn bucket(&self, class: BotClass, slot: BotSlot, level: u8) -> &[ItemId] {
        self.buckets
            .get(&(class, slot, self.bracket_for(level)))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Draw a random item from the bucket, retrying against `accept`.
    pub fn pick_item(
        &self,
        slot: BotSlot,
        class: BotClass,
        level: u8,
        sampler: &mut Sampler,
        accept: impl Fn(ItemId) -> bool,
    ) -> Option<ItemId> {
        let bucket = self.bucket(class, slot, level);
        if bucket.is_empty() {
            return None;
        }
        for _ in 0..self.pick_attempts {
            if let Some(&item) = sampler.pick(bucket) {
                if accept(item) {
                    return Some(item);
                }
            }
        }
        None
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }
}

fn passes_quality(item: &ItemTemplate, max_level: u8) -> bool {
    if item.item_level == 0 {
        return false;
    }
    let req = item.required_level;
    match item.quality {
        ItemQuality::Poor => req <= 1,
        ItemQuality::Normal => req <= 14,
        ItemQuality::Uncommon | ItemQuality::Rare | ItemQuality::Epic => {
            (2..=max_level).contains(&req)
        }
        _ => false,
    }
}

use BotClass::*;

const ALL_CLASSES: &[BotClass] = &BotClass::ALL;
const HOLDABLE: &[BotClass] = &[Priest, Shaman, Mage, Warlock, Druid];
const SHIELD: &[BotClass] = &[Warrior, Paladin, Shaman, Spellbreaker];
const CLOTH: &[BotClass] = &[Priest, Mage, Warlock, Archmage, Necromancer, SeaWitch];
const PLATE: &[BotClass] = &[Warrior, Paladin, DeathKnight, Blademaster, Sphynx, Spellbreaker, Dreadlord];
const STAFF: &[BotClass] = &[Priest, Mage, Warlock, Druid, Shaman, Archmage, Necromancer, Dreadlord];

/// One-handers: (class, also usable in the off hand).
const AXE: &[(BotClass, bool)] = &[
    (Warrior, true),
    (Paladin, false),
    (DeathKnight, true),
    (Rogue, true),
    (Hunter, true),
    (Shaman, true),
    (Spellbreaker, false),
];
const MACE: &[(BotClass, bool)] = &[
    (Warrior, true),
    (Paladin, false),
    (DeathKnight, true),
    (Rogue, true),
    (Priest, false),
    (Druid, false),
    (Shaman, true),
    (Spellbreaker, false),
];
const SWORD: &[(BotClass, bool)] = &[
    (Warrior, true),
    (Paladin, false),
    (DeathKnight, true),
    (Hunter, true),
    (Rogue, true),
    (Mage, false),
    (Warlock, false),
    (Spellbreaker, false),
    (DarkRanger, true),
];
const FIST: &[(BotClass, bool)] = &[
    (Warrior, true),
    (Hunter, true),
    (Rogue, true),
    (Druid, false),
    (Shaman, true),
    (Spellbreaker, false),
];
const DAGGER: &[(BotClass, bool)] = &[
    (Warrior, true),
    (Hunter, true),
    (Rogue, true),
    (Priest, false),
    (Mage, false),
    (Warlock, false),
    (Druid, false),
    (Shaman, true),
    (Spellbreaker, false),
    (DarkRanger, true),
    (SeaWitch, true),
];

/// Every (class, slot) pair an item may be drawn for.
fn classify(item: &ItemTemplate) -> Vec<(BotClass, BotSlot)> {
    match item.class {
        ItemClass::Armor => classify_armor(item),
        ItemClass::Weapon if item.damage_min >= 1.0 => classify_weapon(item),
        _ => Vec::new(),
    }
}

fn each(classes: &[BotClass], slots: &[BotSlot]) -> Vec<(BotClass, BotSlot)> {
    classes
        .iter()
        .flat_map(|c| slots.iter().map(move |s| (*c, *s)))
        .collect()
}

fn classify_armor(item: &ItemTemplate) -> Vec<(BotClass, BotSlot)> {
    let uncommon = item.quality >= ItemQuality::Uncommon;
    let req = item.required_level;
    match item.inventory_type {
        InventoryType::Finger if uncommon => each(ALL_CLASSES, &[BotSlot::Finger1, BotSlot::Finger2]),
        InventoryType::Trinket if uncommon => {
            each(ALL_CLASSES, &[BotSlot::Trinket1, BotSlot::Trinket2])
        }
        InventoryType::Neck if uncommon => each(ALL_CLASSES, &[BotSlot::Neck]),
        InventoryType::Cloak => each(ALL_CLASSES, &[BotSlot::Back]),
        InventoryType::Holdable if uncommon => each(HOLDABLE, &[BotSlot::OffHand]),
        InventoryType::Shield if item.subclass == ItemSubclass::Shield && item.armor > 0 => {
            each(SHIELD, &[BotSlot::OffHand])
        }
        inv if inv.is_body_armor() && item.armor > 0 => {
            let Some(slot) = inv.armor_slot() else {
                return Vec::new();
            };
            let classes: Vec<BotClass> = match item.subclass {
                ItemSubclass::Cloth => CLOTH.to_vec(),
                ItemSubclass::Leather => {
                    let mut c = vec![Rogue, Druid, DarkRanger];
                    if req < 40 {
                        c.extend([Hunter, Shaman]);
                    }
                    c
                }
                ItemSubclass::Mail => {
                    let mut c = vec![Blademaster, Sphynx, Spellbreaker];
                    if req < 40 {
                        c.extend([Warrior, Paladin]);
                    } else {
                        c.extend([Hunter, Shaman]);
                    }
                    c
                }
                ItemSubclass::Plate => PLATE.to_vec(),
                _ => Vec::new(),
            };
            each(&classes, &[slot])
        }
        _ => Vec::new(),
    }
}

fn classify_weapon(item: &ItemTemplate) -> Vec<(BotClass, BotSlot)> {
    let req = item.required_level;
    match item.subclass {
        ItemSubclass::Wand => match item.inventory_type {
            InventoryType::Ranged | InventoryType::RangedRight => {
                let mut out = each(&[Sphynx], &[BotSlot::MainHand, BotSlot::OffHand]);
                out.extend(each(&[Priest, Mage, Warlock], &[BotSlot::Ranged]));
                out
            }
            _ => Vec::new(),
        },
        ItemSubclass::Gun | ItemSubclass::Crossbow => each(&[Warrior, Rogue, Hunter], &[BotSlot::Ranged]),
        ItemSubclass::Bow => each(
            &[Warrior, Rogue, Hunter, DarkRanger, SeaWitch],
            &[BotSlot::Ranged],
        ),
        ItemSubclass::Thrown if item.inventory_type == InventoryType::Thrown => {
            each(&[Warrior, Rogue], &[BotSlot::Ranged])
        }
        ItemSubclass::Staff => each(STAFF, &[BotSlot::MainHand]),
        ItemSubclass::Axe2 => two_hander(req, &[Paladin, Hunter, DeathKnight, Shaman, Blademaster, Dreadlord]),
        ItemSubclass::Sword2 => two_hander(req, &[Paladin, Hunter, DeathKnight, Blademaster, Dreadlord]),
        ItemSubclass::Polearm => {
            two_hander(req, &[Paladin, Hunter, DeathKnight, Druid, Blademaster, Dreadlord])
        }
        ItemSubclass::Mace2 => two_hander(req, &[Paladin, DeathKnight, Shaman, Druid, Dreadlord]),
        ItemSubclass::Axe => one_hander(item.inventory_type, AXE),
        ItemSubclass::Mace => one_hander(item.inventory_type, MACE),
        ItemSubclass::Sword => one_hander(item.inventory_type, SWORD),
        ItemSubclass::Fist => one_hander(item.inventory_type, FIST),
        ItemSubclass::Dagger => one_hander(item.inventory_type, DAGGER),
        _ => Vec::new(),
    }
}

/// Warriors dual-wield two-handers once they reach 55.
fn two_hander(req: u8, classes: &[BotClass]) -> Vec<(BotClass, BotSlot)> {
    let mut out = vec![(Warrior, BotSlot::MainHand)];
    if req >= 55 {
        out.push((Warrior, BotSlot::OffHand));
    }
    out.extend(each(classes, &[BotSlot::MainHand]));
    out
}

fn one_hander(inv: InventoryType, table: &[(BotClass, bool)]) -> Vec<(BotClass, BotSlot)> {
    let (main, off) = match inv {
        InventoryType::Weapon => (true, true),
        InventoryType::WeaponMainHand => (true, false),
        InventoryType::WeaponOffHand => (false, true),
        _ => return Vec::new(),
    };
    let mut out = Vec::new();
    for &(class, dual) in table {
        if main {
            out.push((class, BotSlot::MainHand));
        }
        if off && dual {
            out.push((class, BotSlot::OffHand));
        }
    }
    out
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn item(
        entry: ItemId,
        class: ItemClass,
        subclass: ItemSubclass,
        inventory_type: InventoryType,
        required_level: u8,
    ) -> ItemTemplate {
        ItemTemplate {
            entry,
            name: format!("item {}", entry),
            class,
            subclass,
            inventory_type,
            quality: ItemQuality::Uncommon,
            item_level: required_level.max(1) as u32 + 5,
            required_level,
            armor: if class == ItemClass::Armor { 10 } else { 0 },
            damage_min: if class == ItemClass::Weapon { 5.0 } else { 0.0 },
        }
    }

    #[test]
    fn test_leather_fans_out_by_level() {
        let low = item(1, ItemClass::Armor, ItemSubclass::Leather, InventoryType::Chest, 30);
        let high = item(2, ItemClass::Armor, ItemSubclass::Leather, InventoryType::Chest, 45);
        let cache = GearCache::build(&[low, high], 80, 20);

        assert_eq!(cache.bucket(Hunter, BotSlot::Chest, 30), &[1]);
        assert!(cache.bucket(Hunter, BotSlot::Chest, 45).is_empty());
        assert_eq!(cache.bucket(Rogue, BotSlot::Chest, 45), &[2]);
        assert!(cache.bucket(Mage, BotSlot::Chest, 30).is_empty());
    }

    #[test]
    fn test_bracket_uses_ceiling() {
        let ring = item(3, ItemClass::Armor, ItemSubclass::Misc, InventoryType::Finger, 41);
        let cache = GearCache::build(&[ring], 80, 20);
        assert_eq!(cache.bucket(Paladin, BotSlot::Finger2, 45), &[3]);
        assert!(cache.bucket(Paladin, BotSlot::Finger2, 44).is_empty());
    }

    #[test]
    fn test_quality_filter() {
        let mut poor = item(4, ItemClass::Armor, ItemSubclass::Misc, InventoryType::Cloak, 10);
        poor.quality = ItemQuality::Poor;
        let mut legendary = item(5, ItemClass::Armor, ItemSubclass::Misc, InventoryType::Cloak, 60);
        legendary.quality = ItemQuality::Legendary;
        let mut no_level = item(6, ItemClass::Armor, ItemSubclass::Misc, InventoryType::Cloak, 10);
        no_level.item_level = 0;
        let cache = GearCache::build(&[poor, legendary, no_level], 80, 20);
        assert_eq!(cache.bucket_count(), 0);
    }

    #[test]
    fn test_one_hand_inventory_types() {
        let either = item(7, ItemClass::Weapon, ItemSubclass::Sword, InventoryType::Weapon, 20);
        let main = item(8, ItemClass::Weapon, ItemSubclass::Sword, InventoryType::WeaponMainHand, 20);
        let cache = GearCache::build(&[either, main], 80, 20);
        assert_eq!(cache.bucket(Rogue, BotSlot::OffHand, 20), &[7]);
        assert_eq!(cache.bucket(Rogue, BotSlot::MainHand, 20), &[7, 8]);
        assert!(cache.bucket(Mage, BotSlot::OffHand, 20).is_empty());
        assert_eq!(cache.bucket(Mage, BotSlot::MainHand, 20), &[7, 8]);
    }

    #[test]
    fn test_warrior_two_hander_off_hand_from_55() {
        let early = item(9, ItemClass::Weapon, ItemSubclass::Axe2, InventoryType::TwoHandWeapon, 50);
        let late = item(10, ItemClass::Weapon, ItemSubclass::Axe2, InventoryType::TwoHandWeapon, 55);
        let cache = GearCache::build(&[early, late], 80, 20);
        assert!(cache.bucket(Warrior, BotSlot::OffHand, 50).is_empty());
        assert_eq!(cache.bucket(Warrior, BotSlot::OffHand, 55), &[10]);
        assert!(cache.bucket(Paladin, BotSlot::OffHand, 55).is_empty());
    }

    #[test]
    fn test_pick_item_honors_predicate() {
        let a = item(11, ItemClass::Armor, ItemSubclass::Misc, InventoryType::Trinket, 20);
        let b = item(12, ItemClass::Armor, ItemSubclass::Misc, InventoryType::Trinket, 20);
        let cache = GearCache::build(&[a, b], 80, 20);
        let mut sampler = Sampler::seeded(4);
        for _ in 0..10 {
            let pick = cache.pick_item(BotSlot::Trinket1, Druid, 20, &mut sampler, |id| id != 11);
            assert_eq!(pick, Some(12));
        }
        let none = cache.pick_item(BotSlot::Trinket1, Druid, 20, &mut sampler, |_| false);
        assert_eq!(none, None);
    }

    #[test]
    fn test_levels_above_cap_are_clamped() {
        let epic = item(13, ItemClass::Armor, ItemSubclass::Plate, InventoryType::Head, 80);
        let cache = GearCache::build(&[epic], 80, 20);
        assert_eq!(cache.bucket(DeathKnight, BotSlot::Head, 80), &[13]);
        assert_eq!(cache.bucket(DeathKnight, BotSlot::Head, 200), &[13]);
    }
}
