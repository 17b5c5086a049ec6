//! Waypoint graph construction and validation.

use super::node::{NodeFlags, WaypointNode};
use crate::config::WaypointConfig;
use crate::data::{NodeRow, RegionKind, RegionRow};
use crate::error::{GraphError, MissingSpawn};
use common::{NodeId, Position, RegionId, TeamId};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::{debug, error, info, warn};

/// The navigation graph of every region.
#[derive(Debug, Clone, Default)]
pub struct WaypointGraph {
    pub(super) nodes: BTreeMap<NodeId, WaypointNode>,
    pub(super) by_region: BTreeMap<RegionId, Vec<NodeId>>,
    regions: HashMap<RegionId, RegionKind>,
    pub(super) max_link_distance: f32,
}

impl WaypointGraph {
    /// Build and validate the graph.
    ///
    /// Malformed rows and link tokens are logged and skipped. The build fails
    /// only when a region cannot host maximum-level spawns for some team.
    pub fn build(
        rows: &[NodeRow],
        regions: &[RegionRow],
        config: &WaypointConfig,
    ) -> Result<Self, GraphError> {
        let mut graph = WaypointGraph {
            regions: regions.iter().map(|r| (r.id, r.kind)).collect(),
            max_link_distance: config.max_link_distance,
            ..Default::default()
        };

        let mut link_lists: Vec<(NodeId, &str)> = Vec::with_capacity(rows.len());
        for row in rows {
            if !graph.regions.contains_key(&row.region) {
                error!("Waypoint {} is in unknown region {}, skipped", row.id, row.region);
                continue;
            }
            if graph.nodes.contains_key(&row.id) {
                error!("Waypoint {} is defined twice, second definition skipped", row.id);
                continue;
            }
            let node = graph.node_from_row(row, config.max_level);
            graph.nodes.insert(row.id, node);
            link_lists.push((row.id, row.links.as_str()));
        }

        for (id, links) in link_lists {
            graph.link_node(id, links, config);
        }

        for node in graph.nodes.values() {
            graph.by_region.entry(node.region).or_default().push(node.id);
        }

        graph.report_continent_distances();
        graph.check_spawn_nodes()?;

        let chains = graph.dead_end_chains();
        for chain in &chains {
            info!("Waypoints {:?} form an isolated chain", chain);
        }

        info!(
            ">> Loaded {} waypoints in {} regions",
            graph.nodes.len(),
            graph.by_region.len()
        );
        Ok(graph)
    }

    fn node_from_row(&self, row: &NodeRow, level_cap: u8) -> WaypointNode {
        let (mut min_level, mut max_level) = (row.min_level, row.max_level);
        if min_level == 0 || max_level == 0 || max_level > level_cap || min_level > max_level {
            warn!(
                "Waypoint {} has invalid levels {}-{}, reset to 1-{}",
                row.id, min_level, max_level, level_cap
            );
            min_level = 1;
            max_level = level_cap;
        } else if min_level == 1 && max_level == level_cap {
            warn!("Waypoint {} has no levels set", row.id);
        }

        let mut flags = NodeFlags::new(row.flags);
        if row.flags >= NodeFlags::END {
            warn!("Waypoint {} has invalid flags {:#x}, masked", row.id, row.flags);
            flags = NodeFlags::new(row.flags & (NodeFlags::END - 1));
        }
        if flags.has(NodeFlags::ALLIANCE_ONLY) && flags.has(NodeFlags::HORDE_ONLY) {
            warn!("Waypoint {} is both alliance and horde only, both flags cleared", row.id);
            flags.clear(NodeFlags::ALLIANCE_ONLY | NodeFlags::HORDE_ONLY);
        }

        WaypointNode {
            id: row.id,
            region: row.region,
            position: Position::new(row.x, row.y, row.z, row.o),
            zone: row.zone,
            area: row.area,
            min_level,
            max_level,
            flags,
            links: Vec::new(),
            name: row.name.clone(),
        }
    }

    fn link_node(&mut self, id: NodeId, links: &str, config: &WaypointConfig) {
        if links.trim().is_empty() {
            error!("Waypoint {} has no links", id);
            return;
        }
        for token in links.split_whitespace() {
            let target = match parse_link_token(token) {
                Some(target) => target,
                None => {
                    error!("Waypoint {} has malformed link '{}'", id, token);
                    continue;
                }
            };
            if target == id {
                error!("Waypoint {} links to itself", id);
                continue;
            }
            let (Some(from), Some(to)) = (self.nodes.get(&id), self.nodes.get(&target)) else {
                error!("Waypoint {} links to missing waypoint {}", id, target);
                continue;
            };
            if from.region != to.region {
                error!(
                    "Waypoint {} (region {}) links to waypoint {} in region {}",
                    id, from.region, target, to.region
                );
                continue;
            }
            let distance = from.position.distance_2d(&to.position);
            if distance > config.max_link_distance {
                warn!("Waypoints {} and {} are {:.1} apart", id, target, distance);
            } else if distance < config.min_link_distance && !self.is_match_region(from.region) {
                warn!("Waypoints {} and {} are only {:.1} apart", id, target, distance);
            }
            self.add_link(id, target);
            self.add_link(target, id);
        }
    }

    fn add_link(&mut self, from: NodeId, to: NodeId) {
        if let Some(node) = self.nodes.get_mut(&from) {
            if !node.links.contains(&to) {
                node.links.push(to);
            }
        }
    }

    fn report_continent_distances(&self) {
        let mut shortest = f32::MAX;
        let mut longest = 0.0f32;
        for node in self.nodes.values().filter(|n| self.is_continent(n.region)) {
            for link in &node.links {
                if let Some(other) = self.nodes.get(link) {
                    let distance = node.position.distance_2d(&other.position);
                    shortest = shortest.min(distance);
                    longest = longest.max(distance);
                }
            }
        }
        if longest > 0.0 {
            debug!("Continent link distances: min {:.1}, max {:.1}", shortest, longest);
        }
    }

    /// Every populated region needs a linked spawn node each team can reach at max level.
    fn check_spawn_nodes(&self) -> Result<(), GraphError> {
        let mut missing = Vec::new();
        for (&region, ids) in &self.by_region {
            for team in TeamId::ALL {
                let required_level = team.required_spawn_level();
                let found = ids.iter().filter_map(|id| self.nodes.get(id)).any(|n| {
                    n.flags.is_spawn()
                        && !n.links.is_empty()
                        && n.max_level >= required_level
                        && n.flags.allows_team(team)
                });
                if found {
                    continue;
                }
                if team == TeamId::Neutral && self.is_match_region(region) {
                    info!("Region {} has no {} spawn waypoint", region, team);
                    continue;
                }
                error!(
                    "Region {} has no {} spawn waypoint with max level {} or higher",
                    region, team, required_level
                );
                missing.push(MissingSpawn {
                    region,
                    team,
                    required_level,
                });
            }
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(GraphError::MissingSpawnNodes(missing))
        }
    }

    /// Chains of nodes isolated from the rest of the graph: both ends have a
    /// single link and every inner node has exactly two.
    pub fn dead_end_chains(&self) -> Vec<Vec<NodeId>> {
        let mut seen = BTreeSet::new();
        let mut chains = Vec::new();
        for node in self.nodes.values() {
            if node.links.len() != 1 || seen.contains(&node.id) {
                continue;
            }
            let mut chain = vec![node.id];
            let mut prev = node.id;
            let mut cur = node.links[0];
            loop {
                let Some(next) = self.nodes.get(&cur) else {
                    break;
                };
                chain.push(cur);
                if next.links.len() != 2 {
                    break;
                }
                let Some(&step) = next.links.iter().find(|&&l| l != prev) else {
                    break;
                };
                prev = cur;
                cur = step;
            }
            let end_is_dead = chain
                .last()
                .and_then(|id| self.nodes.get(id))
                .is_some_and(|n| n.links.len() == 1);
            seen.extend(chain.iter().copied());
            if end_is_dead {
                chains.push(chain);
            }
        }
        chains
    }

    pub fn node(&self, id: NodeId) -> Option<&WaypointNode> {
        self.nodes.get(&id)
    }

    /// Nodes of one region, ascending id.
    pub fn nodes_in_region(&self, region: RegionId) -> impl Iterator<Item = &WaypointNode> + '_ {
        self.by_region
            .get(&region)
            .into_iter()
            .flatten()
            .filter_map(|id| self.nodes.get(id))
    }

    pub fn nodes(&self) -> impl Iterator<Item = &WaypointNode> + '_ {
        self.nodes.values()
    }

    pub fn regions(&self) -> impl Iterator<Item = RegionId> + '_ {
        self.by_region.keys().copied()
    }

    pub fn region_kind(&self, region: RegionId) -> Option<RegionKind> {
        self.regions.get(&region).copied()
    }

    pub fn is_continent(&self, region: RegionId) -> bool {
        self.region_kind(region) == Some(RegionKind::Continent)
    }

    pub fn is_match_region(&self, region: RegionId) -> bool {
        self.region_kind(region) == Some(RegionKind::Battleground)
    }

    /// Node of `region` closest to `position`.
    pub fn closest_node(&self, region: RegionId, position: &Position) -> Option<&WaypointNode> {
        self.nodes_in_region(region)
            .min_by(|a, b| {
                a.position
                    .distance_2d(position)
                    .total_cmp(&b.position.distance_2d(position))
            })
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn region_count(&self) -> usize {
        self.by_region.len()
    }
}

/// Parse a `target:kind` link token, returning the target.
fn parse_link_token(token: &str) -> Option<NodeId> {
    let (target, kind) = token.split_once(':')?;
    kind.parse::<u32>().ok()?;
    target.parse().ok()
}
