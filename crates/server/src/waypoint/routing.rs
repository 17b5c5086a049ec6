//! Next-waypoint selection.

use super::graph::WaypointGraph;
use super::node::{NodeFlags, WaypointNode};
use crate::sampler::Sampler;
use common::{NodeId, Position, TeamId};

/// A movement request from a wandering bot.
#[derive(Debug, Clone, Copy)]
pub struct RouteQuery {
    pub current: NodeId,
    pub previous: Option<NodeId>,
    /// Where the bot stands now.
    pub position: Position,
    pub team: TeamId,
    pub level: u8,
    /// Ignore links and jump to a random nearby node.
    pub force_random: bool,
}

impl WaypointGraph {
    /// Whether `team` may use `node`. Teleport destinations are limited to continents.
    pub fn is_eligible(&self, node: &WaypointNode, team: TeamId, teleport: bool) -> bool {
        if !teleport && node.flags.has(NodeFlags::MOVEMENT_IGNORES_FACTION) {
            return true;
        }
        if teleport && !self.is_continent(node.region) {
            return false;
        }
        node.flags.allows_team(team)
    }

    /// Pick the node a bot should head to next.
    ///
    /// Returns `None` only when no node in the graph suits the bot's level.
    pub fn next_node(&self, query: &RouteQuery, sampler: &mut Sampler) -> Option<NodeId> {
        let current = self.node(query.current)?;

        // Random jumps are measured from the bot, which may have strayed from its node.
        if query.force_random {
            let nearby: Vec<NodeId> = self
                .nodes_in_region(current.region)
                .filter(|n| n.id != current.id)
                .filter(|n| n.position.distance_2d(&query.position) <= self.max_link_distance)
                .filter(|n| n.is_level_viable(query.level) && self.is_eligible(n, query.team, true))
                .map(|n| n.id)
                .collect();
            if let Some(id) = sampler.pick(&nearby) {
                return Some(*id);
            }
            return self.fallback_node(current, query, sampler);
        }
        if current.links.is_empty() {
            return self.fallback_node(current, query, sampler);
        }

        let mut linked: Vec<NodeId> = current
            .links
            .iter()
            .filter_map(|id| self.node(*id))
            .filter(|n| n.is_level_viable(query.level) && self.is_eligible(n, query.team, false))
            .map(|n| n.id)
            .collect();
        if linked.len() > 1 && !current.flags.has(NodeFlags::CAN_BACKTRACK_FROM) {
            if let Some(prev) = query.previous {
                linked.retain(|id| *id != prev);
            }
        }
        match sampler.pick(&linked) {
            Some(id) => Some(*id),
            None => self.fallback_node(current, query, sampler),
        }
    }

    /// Nearest eligible node in the region, then any eligible spawn node, then anything viable.
    fn fallback_node(
        &self,
        current: &WaypointNode,
        query: &RouteQuery,
        sampler: &mut Sampler,
    ) -> Option<NodeId> {
        let viable = |n: &&WaypointNode| n.id != current.id && n.is_level_viable(query.level);

        let nearest = self
            .nodes_in_region(current.region)
            .filter(viable)
            .filter(|n| self.is_eligible(n, query.team, true))
            .min_by(|a, b| {
                a.position
                    .distance_2d(&query.position)
                    .total_cmp(&b.position.distance_2d(&query.position))
            });
        if let Some(node) = nearest {
            return Some(node.id);
        }

        let spawns: Vec<NodeId> = self
            .nodes()
            .filter(viable)
            .filter(|n| n.flags.is_spawn() && self.is_eligible(n, query.team, true))
            .map(|n| n.id)
            .collect();
        if let Some(id) = sampler.pick(&spawns) {
            return Some(*id);
        }

        let anywhere: Vec<NodeId> = self.nodes().filter(viable).map(|n| n.id).collect();
        sampler.pick(&anywhere).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WaypointConfig;
    use crate::data::{RegionKind, RegionRow};
    use crate::waypoint::graph::tests::row;

    fn graph() -> WaypointGraph {
        let regions = vec![RegionRow {
            id: 0,
            kind: RegionKind::Continent,
            name: String::new(),
        }];
        let rows = vec![
            // 1 - 2 - 3 with a branch 2 - 4, 5 far away for outgrown levels
            row(1, 0, 0.0, (1, 20), NodeFlags::SPAWN, "2:0"),
            row(2, 0, 100.0, (1, 20), 0, "1:0 3:0 4:0"),
            row(3, 0, 200.0, (1, 20), NodeFlags::HORDE_ONLY, ""),
            row(4, 0, 300.0, (1, 20), 0, ""),
            row(5, 0, 5000.0, (50, 80), NodeFlags::SPAWN, "6:0"),
            row(6, 0, 5100.0, (60, 80), NodeFlags::SPAWN, ""),
        ];
        WaypointGraph::build(&rows, &regions, &WaypointConfig::default()).unwrap()
    }

    fn query(current: NodeId, previous: Option<NodeId>, team: TeamId, level: u8) -> RouteQuery {
        RouteQuery {
            current,
            previous,
            position: Position::default(),
            team,
            level,
            force_random: false,
        }
    }

    #[test]
    fn test_previous_and_restricted_links_excluded() {
        let graph = graph();
        let mut sampler = Sampler::seeded(11);
        for _ in 0..20 {
            let next = graph.next_node(&query(2, Some(1), TeamId::Alliance, 10), &mut sampler);
            assert_eq!(next, Some(4));
        }
    }

    #[test]
    fn test_single_link_allows_backtrack() {
        let graph = graph();
        let mut sampler = Sampler::seeded(5);
        let next = graph.next_node(&query(1, Some(2), TeamId::Alliance, 10), &mut sampler);
        assert_eq!(next, Some(2));
    }

    #[test]
    fn test_outgrown_bot_falls_back_to_viable_node() {
        let graph = graph();
        let mut sampler = Sampler::seeded(2);
        for level in [50, 55, 70, 80] {
            let next = graph.next_node(&query(2, Some(1), TeamId::Neutral, level), &mut sampler);
            let node = graph.node(next.unwrap()).unwrap();
            assert!(node.is_level_viable(level));
        }
    }

    #[test]
    fn test_random_mode_stays_in_range() {
        let graph = graph();
        let mut sampler = Sampler::seeded(9);
        let mut q = query(1, None, TeamId::Horde, 10);
        q.force_random = true;
        for _ in 0..20 {
            let next = graph.next_node(&q, &mut sampler).unwrap();
            assert!([2, 3, 4].contains(&next));
        }
    }

    #[test]
    fn test_random_mode_measures_from_bot() {
        let regions = vec![RegionRow {
            id: 0,
            kind: RegionKind::Continent,
            name: String::new(),
        }];
        let rows = vec![
            row(1, 0, 0.0, (1, 20), 0, "2:0"),
            row(2, 0, 500.0, (1, 20), 0, "3:0"),
            row(3, 0, 3000.0, (1, 20), 0, ""),
            row(5, 0, 9000.0, (60, 80), NodeFlags::SPAWN, "6:0"),
            row(6, 0, 9100.0, (60, 80), NodeFlags::SPAWN, ""),
        ];
        let graph = WaypointGraph::build(&rows, &regions, &WaypointConfig::default()).unwrap();
        let mut sampler = Sampler::seeded(4);
        // Still bound to node 1 but standing next to node 3.
        let mut q = query(1, None, TeamId::Alliance, 10);
        q.position = Position::new(2900.0, 0.0, 0.0, 0.0);
        q.force_random = true;
        for _ in 0..10 {
            assert_eq!(graph.next_node(&q, &mut sampler), Some(3));
        }
    }

    #[test]
    fn test_teleport_eligibility() {
        let graph = graph();
        let node = graph.node(3).unwrap();
        assert!(graph.is_eligible(node, TeamId::Horde, true));
        assert!(!graph.is_eligible(node, TeamId::Alliance, false));
    }
}
