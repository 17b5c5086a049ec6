//! Bot data manager configuration.

use common::BotClass;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub waypoints: WaypointConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub gear: GearConfig,
}

impl Config {
    /// Load configuration from `config.toml` or use defaults.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(Path::new("config.toml"))
    }

    /// Load configuration from `path`, writing a default file there if it is missing.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            Ok(toml::from_str(&contents)?)
        } else {
            info!("No {} found, creating default config", path.display());
            let default_config = Self::default();
            std::fs::write(path, toml::to_string_pretty(&default_config)?)?;
            Ok(default_config)
        }
    }
}

/// Process and admin surface settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Tick interval in milliseconds.
    #[serde(default = "default_tick_interval")]
    pub tick_interval_ms: u64,
    /// Admin HTTP bind address.
    #[serde(default = "default_admin_bind")]
    pub admin_bind: String,
    /// Admin HTTP port.
    #[serde(default = "default_admin_port")]
    pub admin_port: u16,
    /// World data file.
    #[serde(default = "default_data_path")]
    pub data_path: String,
    /// Append-only store write journal.
    #[serde(default = "default_journal_path")]
    pub journal_path: String,
    /// Fixed RNG seed (random when absent).
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval(),
            admin_bind: default_admin_bind(),
            admin_port: default_admin_port(),
            data_path: default_data_path(),
            journal_path: default_journal_path(),
            seed: None,
        }
    }
}

fn default_tick_interval() -> u64 {
    100
}
fn default_admin_bind() -> String {
    "0.0.0.0".to_string()
}
fn default_admin_port() -> u16 {
    8085
}
fn default_data_path() -> String {
    "world.toml".to_string()
}
fn default_journal_path() -> String {
    "journal.jsonl".to_string()
}

/// Bot generation settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GenerationConfig {
    /// Wandering bots requested at startup.
    #[serde(default)]
    pub desired_wanderers: usize,
    /// Class codes that are never generated.
    #[serde(default)]
    pub disabled_classes: Vec<u8>,
    /// First identity reserved for authored bots.
    #[serde(default = "default_authored_id_begin")]
    pub authored_id_begin: u32,
    /// First identity handed out to generated bots when no counter is stored.
    #[serde(default = "default_generated_id_begin")]
    pub generated_id_begin: u32,
    /// Consecutive per-unit failures after which a batch gives up.
    #[serde(default = "default_max_consecutive_failures")]
    pub max_consecutive_failures: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            desired_wanderers: 0,
            disabled_classes: Vec::new(),
            authored_id_begin: default_authored_id_begin(),
            generated_id_begin: default_generated_id_begin(),
            max_consecutive_failures: default_max_consecutive_failures(),
        }
    }
}

impl GenerationConfig {
    pub fn is_class_disabled(&self, class: BotClass) -> bool {
        self.disabled_classes.contains(&class.code())
    }
}

fn default_authored_id_begin() -> u32 {
    70001
}
fn default_generated_id_begin() -> u32 {
    80000
}
fn default_max_consecutive_failures() -> u32 {
    100
}

/// Waypoint graph validation settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WaypointConfig {
    #[serde(default = "default_max_level")]
    pub max_level: u8,
    /// Links longer than this are reported.
    #[serde(default = "default_max_link_distance")]
    pub max_link_distance: f32,
    /// Links shorter than this are reported outside match regions.
    #[serde(default = "default_min_link_distance")]
    pub min_link_distance: f32,
}

impl Default for WaypointConfig {
    fn default() -> Self {
        Self {
            max_level: default_max_level(),
            max_link_distance: default_max_link_distance(),
            min_link_distance: default_min_link_distance(),
        }
    }
}

fn default_max_level() -> u8 {
    common::DEFAULT_MAX_LEVEL
}
fn default_max_link_distance() -> f32 {
    1000.0
}
fn default_min_link_distance() -> f32 {
    10.0
}

/// Lifecycle scheduler timings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SchedulerConfig {
    /// Minimum time between two deferred spawns.
    #[serde(default = "default_spawn_interval")]
    pub spawn_interval_ms: u32,
    /// Delay before a match-entry event checks a queued player again.
    #[serde(default = "default_match_entry_retry")]
    pub match_entry_retry_ms: u64,
    #[serde(default = "default_invite_accept_wait")]
    pub invite_accept_wait_ms: u64,
    #[serde(default = "default_match_start_delay")]
    pub match_start_delay_ms: u64,
    /// Delay before the first bot of a match group tries to enter.
    #[serde(default = "default_first_entry_delay")]
    pub first_entry_delay_secs: u64,
    /// Window over which a match group's entries are spread.
    #[serde(default = "default_entry_spread")]
    pub entry_spread_secs: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            spawn_interval_ms: default_spawn_interval(),
            match_entry_retry_ms: default_match_entry_retry(),
            invite_accept_wait_ms: default_invite_accept_wait(),
            match_start_delay_ms: default_match_start_delay(),
            first_entry_delay_secs: default_first_entry_delay(),
            entry_spread_secs: default_entry_spread(),
        }
    }
}

fn default_spawn_interval() -> u32 {
    500
}
fn default_match_entry_retry() -> u64 {
    2000
}
fn default_invite_accept_wait() -> u64 {
    90_000
}
fn default_match_start_delay() -> u64 {
    120_000
}
fn default_first_entry_delay() -> u64 {
    5
}
fn default_entry_spread() -> u64 {
    30
}

/// Gear selection settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GearConfig {
    /// Random draws per slot before giving up.
    #[serde(default = "default_pick_attempts")]
    pub pick_attempts: u32,
}

impl Default for GearConfig {
    fn default() -> Self {
        Self {
            pick_attempts: default_pick_attempts(),
        }
    }
}

fn default_pick_attempts() -> u32 {
    20
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [generation]
            desired_wanderers = 12
            disabled_classes = [13]
            "#,
        )
        .unwrap();
        assert_eq!(config.generation.desired_wanderers, 12);
        assert!(config.generation.is_class_disabled(BotClass::Sphynx));
        assert_eq!(config.generation.max_consecutive_failures, 100);
        assert_eq!(config.server.tick_interval_ms, 100);
        assert_eq!(config.scheduler.spawn_interval_ms, 500);
        assert_eq!(config.gear.pick_attempts, 20);
    }
}
