//! Shared vocabulary crate for the wanderbots data manager.
//!
//! This crate contains:
//! - Identity aliases used across the workspace
//! - Bot classes and their level/role defaults
//! - Team and faction tables
//! - Equipment slots and item catalog vocabulary

mod class;
mod error;
mod faction;
mod item;

pub use class::{roles, BotClass};
pub use error::CommonError;
pub use faction::{FactionTable, TeamId, FACTION_MONSTER};
pub use item::{BotSlot, InventoryType, ItemClass, ItemQuality, ItemSubclass, BOT_INVENTORY_SIZE};

use serde::{Deserialize, Serialize};

/// Identity of a bot (creature template entry).
pub type BotId = u32;
/// Identity of a connected player character.
pub type PlayerId = u32;
/// Identity of a waypoint node.
pub type NodeId = u32;
/// Identity of a world region (map).
pub type RegionId = u32;
/// Identity of an item template.
pub type ItemId = u32;
/// Identity of a faction template.
pub type FactionId = u32;

/// Highest level a character can reach.
pub const DEFAULT_MAX_LEVEL: u8 = 80;

/// A point in a region with a facing angle.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub coords: glam::Vec3,
    pub heading: f32,
}

impl Position {
    pub const fn new(x: f32, y: f32, z: f32, heading: f32) -> Self {
        Self {
            coords: glam::Vec3::new(x, y, z),
            heading,
        }
    }

    /// Planar distance, ignoring height.
    #[inline]
    pub fn distance_2d(&self, other: &Position) -> f32 {
        self.coords.truncate().distance(other.coords.truncate())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_ignores_height() {
        let a = Position::new(0.0, 0.0, 0.0, 0.0);
        let b = Position::new(3.0, 4.0, 100.0, 1.5);
        assert!((a.distance_2d(&b) - 5.0).abs() < 0.001);
    }
}
