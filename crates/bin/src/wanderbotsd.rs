//! Wanderbots daemon: loads the world, ticks the bot manager and serves the admin API.

mod admin;

use botdata::journal::JournalFile;
use botdata::matchmaking::LocalMatchQueue;
use botdata::world::SimWorld;
use botdata::{Config, Sampler, WorldBotService, WorldData};
use std::net::SocketAddr;
use std::path::Path;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,botdata=debug")),
        )
        .init();

    info!("Wanderbots v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::load()?;
    info!("Loaded configuration");
    info!("  World data: {}", config.server.data_path);
    info!("  Desired wanderers: {}", config.generation.desired_wanderers);
    info!("  Tick: {}ms", config.server.tick_interval_ms);

    let data = WorldData::load(Path::new(&config.server.data_path))?;
    let journal = JournalFile::open(Path::new(&config.server.journal_path))?;
    let sampler = match config.server.seed {
        Some(seed) => {
            info!("  Seed: {}", seed);
            Sampler::seeded(seed)
        }
        None => Sampler::from_entropy(),
    };

    let addr: SocketAddr = format!("{}:{}", config.server.admin_bind, config.server.admin_port).parse()?;
    let tick_interval = config.server.tick_interval_ms;

    let service = WorldBotService::startup(
        config,
        &data,
        Box::new(journal),
        sampler,
        SimWorld::new(),
        LocalMatchQueue::new(),
    )?;
    info!(
        "Bot manager ready: {} spare, {} enabled, {} waypoints",
        service.spare_count(),
        service.enabled_count(),
        service.graph().len()
    );

    let registry = service.registry();
    tokio::spawn(async move {
        botdata::run_tick_loop(service, tick_interval).await;
    });

    let app = admin::router(registry);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Admin API running on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
