//! In-memory world host.
//!
//! Tracks placed bots. A placed bot enters the world on the update after its
//! placement, the way a real map adds objects on its next grid update.

use crate::error::HostError;
use crate::generator::SpawnableBotTemplate;
use crate::host::WorldHost;
use crate::waypoint::WaypointNode;
use common::{BotId, NodeId, Position, RegionId};
use std::collections::HashMap;
use tracing::debug;

/// A bot placed into the world.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedBot {
    pub id: BotId,
    pub name: String,
    pub region: RegionId,
    pub position: Position,
    pub level: u8,
    pub spawn_node: NodeId,
    pub in_world: bool,
}

/// Simulated world containing placed bots.
#[derive(Debug, Default)]
pub struct SimWorld {
    bots: HashMap<BotId, PlacedBot>,
    /// Bots placed since the last update.
    pending: Vec<BotId>,
}

impl SimWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: BotId) -> Option<&PlacedBot> {
        self.bots.get(&id)
    }

    pub fn len(&self) -> usize {
        self.bots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bots.is_empty()
    }

    /// Bots still waiting to enter the world.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

impl WorldHost for SimWorld {
    fn spawn(
        &mut self,
        bot: &SpawnableBotTemplate,
        node: &WaypointNode,
        level: u8,
    ) -> Result<(), HostError> {
        if self.bots.contains_key(&bot.id) {
            return Err(HostError::AlreadyPlaced(bot.id));
        }
        self.bots.insert(
            bot.id,
            PlacedBot {
                id: bot.id,
                name: bot.template.name.clone(),
                region: node.region,
                position: node.position,
                level,
                spawn_node: node.id,
                in_world: false,
            },
        );
        self.pending.push(bot.id);
        Ok(())
    }

    fn is_in_world(&self, id: BotId) -> bool {
        self.bots.get(&id).is_some_and(|b| b.in_world)
    }

    fn remove(&mut self, id: BotId) -> Result<(), HostError> {
        self.pending.retain(|p| *p != id);
        self.bots
            .remove(&id)
            .map(|_| ())
            .ok_or(HostError::NotPlaced(id))
    }

    fn teleport(&mut self, id: BotId, region: RegionId, position: Position) -> Result<(), HostError> {
        let bot = self.bots.get_mut(&id).ok_or(HostError::NotPlaced(id))?;
        bot.region = region;
        bot.position = position;
        Ok(())
    }

    fn update(&mut self, _diff: u32) {
        if self.pending.is_empty() {
            return;
        }
        debug!("{} bots entered the world", self.pending.len());
        for id in self.pending.drain(..) {
            if let Some(bot) = self.bots.get_mut(&id) {
                bot.in_world = true;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::tests::creature;
    use crate::waypoint::NodeFlags;
    use common::{BotClass, TeamId};

    fn bot(id: BotId) -> SpawnableBotTemplate {
        SpawnableBotTemplate {
            id,
            archetype: 70001,
            class: BotClass::Rogue,
            race: Some(2),
            faction: 2,
            team: TeamId::Horde,
            bracket: None,
            template: creature(id),
            equipment_id: 70001,
        }
    }

    fn node() -> WaypointNode {
        WaypointNode {
            id: 7,
            region: 1,
            position: Position::new(10.0, 20.0, 0.0, 0.0),
            zone: 0,
            area: 0,
            min_level: 1,
            max_level: 80,
            flags: NodeFlags::new(NodeFlags::SPAWN),
            links: vec![8],
            name: String::new(),
        }
    }

    #[test]
    fn test_enters_world_on_next_update() {
        let mut world = SimWorld::new();
        world.spawn(&bot(80000), &node(), 12).unwrap();
        assert!(!world.is_in_world(80000));
        assert_eq!(world.spawn(&bot(80000), &node(), 12), Err(HostError::AlreadyPlaced(80000)));

        world.update(100);
        assert!(world.is_in_world(80000));
        assert_eq!(world.get(80000).map(|b| b.spawn_node), Some(7));
    }

    #[test]
    fn test_teleport_and_remove() {
        let mut world = SimWorld::new();
        world.spawn(&bot(80000), &node(), 12).unwrap();
        world.teleport(80000, 489, Position::new(1.0, 1.0, 1.0, 0.0)).unwrap();
        assert_eq!(world.get(80000).map(|b| b.region), Some(489));
        world.remove(80000).unwrap();
        assert_eq!(world.remove(80000), Err(HostError::NotPlaced(80000)));
        assert_eq!(world.pending_count(), 0);
    }
}
