//! Waypoint nodes and their flags.

use common::{NodeId, Position, RegionId, TeamId};
use serde::Serialize;

/// Waypoint flag set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct NodeFlags(u32);

impl NodeFlags {
    pub const SPAWN: u32 = 0x01;
    pub const ALLIANCE_ONLY: u32 = 0x02;
    pub const HORDE_ONLY: u32 = 0x04;
    pub const MOVEMENT_IGNORES_FACTION: u32 = 0x08;
    pub const CAN_BACKTRACK_FROM: u32 = 0x10;
    /// First bit that is not a valid flag.
    pub const END: u32 = 0x20;

    pub const fn new(bits: u32) -> Self {
        Self(bits)
    }

    #[inline]
    pub fn bits(self) -> u32 {
        self.0
    }

    #[inline]
    pub fn has(self, flag: u32) -> bool {
        self.0 & flag != 0
    }

    pub fn clear(&mut self, flag: u32) {
        self.0 &= !flag;
    }

    pub fn is_spawn(self) -> bool {
        self.has(Self::SPAWN)
    }

    /// Whether a bot of `team` may use this node, ignoring movement exemptions.
    pub fn allows_team(self, team: TeamId) -> bool {
        match team {
            TeamId::Alliance => !self.has(Self::HORDE_ONLY),
            TeamId::Horde => !self.has(Self::ALLIANCE_ONLY),
            TeamId::Neutral => !self.has(Self::ALLIANCE_ONLY | Self::HORDE_ONLY),
        }
    }
}

/// A navigation node.
#[derive(Debug, Clone, Serialize)]
pub struct WaypointNode {
    pub id: NodeId,
    pub region: RegionId,
    pub position: Position,
    pub zone: u32,
    pub area: u32,
    pub min_level: u8,
    pub max_level: u8,
    pub flags: NodeFlags,
    /// Linked nodes, in definition order.
    pub links: Vec<NodeId>,
    pub name: String,
}

impl WaypointNode {
    /// Whether a bot of `level` may travel to this node.
    #[inline]
    pub fn is_level_viable(&self, level: u8) -> bool {
        u16::from(level) + 2 >= u16::from(self.min_level) && level <= self.max_level
    }

    pub fn is_linked_to(&self, other: NodeId) -> bool {
        self.links.contains(&other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_team_restrictions() {
        let a = NodeFlags::new(NodeFlags::SPAWN | NodeFlags::ALLIANCE_ONLY);
        assert!(a.allows_team(TeamId::Alliance));
        assert!(!a.allows_team(TeamId::Horde));
        assert!(!a.allows_team(TeamId::Neutral));
        assert!(NodeFlags::new(NodeFlags::SPAWN).allows_team(TeamId::Neutral));
    }

    #[test]
    fn test_level_viability_allows_two_below() {
        let node = WaypointNode {
            id: 1,
            region: 0,
            position: Position::default(),
            zone: 0,
            area: 0,
            min_level: 20,
            max_level: 30,
            flags: NodeFlags::default(),
            links: Vec::new(),
            name: String::new(),
        };
        assert!(node.is_level_viable(18));
        assert!(!node.is_level_viable(17));
        assert!(node.is_level_viable(30));
        assert!(!node.is_level_viable(31));
    }
}
