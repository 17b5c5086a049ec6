//! Waypoint graph: nodes, validation and routing.

mod graph;
mod node;
mod routing;

pub use graph::WaypointGraph;
pub use node::{NodeFlags, WaypointNode};
pub use routing::RouteQuery;

#[cfg(test)]
pub(crate) use graph::tests;
