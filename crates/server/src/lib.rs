//! NPC bot data manager.
//!
//! Loads bot attributes, the waypoint graph and the gear catalog, manufactures
//! wandering bots from spare archetypes and drives their lifecycle from the
//! simulation tick.

pub mod attributes;
pub mod config;
pub mod data;
pub mod error;
pub mod gear;
pub mod generator;
pub mod host;
pub mod journal;
pub mod matchmaking;
pub mod registry;
pub mod runtime;
pub mod sampler;
pub mod scheduler;
pub mod service;
pub mod waypoint;
pub mod world;

// Re-export commonly used types
pub use config::Config;
pub use data::WorldData;
pub use error::{DataError, GenerateError, GraphError, HostError};
pub use generator::{BatchReport, BatchRequest, LevelBracket, RegionFilter};
pub use registry::{BotActor, BotRegistry};
pub use runtime::run_tick_loop;
pub use sampler::Sampler;
pub use service::{MatchRequest, WorldBotService};
