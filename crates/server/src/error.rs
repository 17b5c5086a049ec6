//! Error types for the bot data manager.

use common::{BotId, NodeId, RegionId, TeamId};
use thiserror::Error;

/// Errors raised while loading persistent world data.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("Failed to read world data: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse world data: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to encode store write: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Waypoint graph rejected: {0}")]
    Graph(#[from] GraphError),

    #[error("Not enough spare bots: {spare} available, {desired} desired")]
    NotEnoughSpares { spare: usize, desired: usize },

    #[error("Generated only {spawned} of {desired} wandering bots: {source}")]
    WanderersShort {
        spawned: usize,
        desired: usize,
        #[source]
        source: GenerateError,
    },
}

/// A region without a usable maximum-level spawn node for one team.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingSpawn {
    pub region: RegionId,
    pub team: TeamId,
    pub required_level: u8,
}

/// Fatal waypoint graph problems.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("{} region/team pair(s) have no spawn node of sufficient level", .0.len())]
    MissingSpawnNodes(Vec<MissingSpawn>),
}

/// Reasons a bot generation request could not be (fully) satisfied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerateError {
    #[error("No spare bots left")]
    NoSpares,

    #[error("No spare bots for {0}")]
    NoSparesForTeam(TeamId),

    #[error("No spawn node of sufficient level for {team} in {region:?}")]
    NoSpawnNodes {
        team: TeamId,
        region: Option<RegionId>,
    },

    #[error("Gave up after {0} consecutive failed attempts")]
    TooManyFailures(u32),

    #[error("Need {needed} bots but only {spare} are spare")]
    NotEnoughSpares { needed: usize, spare: usize },

    #[error("Generated {spawned} of {requested} bots for {team}")]
    Partial {
        team: TeamId,
        requested: usize,
        spawned: usize,
    },

    #[error("World rejected bot: {0}")]
    Host(#[from] HostError),
}

/// Errors reported by the world host when placing or moving actors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    #[error("Actor {0} is already placed")]
    AlreadyPlaced(BotId),

    #[error("Actor {0} is not placed")]
    NotPlaced(BotId),

    #[error("Node {0} cannot host actors")]
    BadNode(NodeId),

    #[error("Bot {0} has no template")]
    UnknownBot(BotId),
}
