//! Async driver for the simulation tick.

use crate::host::{MatchQueue, WorldHost};
use crate::service::WorldBotService;
use futures_util::FutureExt;
use std::time::Duration;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Tick the service forever at `tick_interval_ms`.
///
/// The diff handed to the service is the real time elapsed since the last
/// tick, so a late tick catches the scheduler up instead of slowing it down.
pub async fn run_tick_loop<H, Q>(mut service: WorldBotService<H, Q>, tick_interval_ms: u64)
where
    H: WorldHost,
    Q: MatchQueue,
{
    let interval = Duration::from_millis(tick_interval_ms.max(1));
    let start = Instant::now() + interval;
    let mut ticker = interval_at(start, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    info!("Bot manager ticking every {}ms", interval.as_millis());
    let mut last = Instant::now();
    let mut tick_count: u64 = 0;

    loop {
        let scheduled = ticker.tick().await;

        let mut skipped = 0u32;
        while ticker.tick().now_or_never().is_some() {
            skipped += 1;
        }
        if skipped > 0 {
            debug!(
                "Skipped {} ticks (lag: {:?})",
                skipped,
                Instant::now().saturating_duration_since(scheduled)
            );
        }

        let now = Instant::now();
        let diff = u32::try_from(now.saturating_duration_since(last).as_millis()).unwrap_or(u32::MAX);
        last = now;

        let tick_start = std::time::Instant::now();
        service.tick(diff);
        tick_count += 1;

        let tick_ms = tick_start.elapsed().as_secs_f64() * 1000.0;
        if tick_ms > interval.as_secs_f64() * 1000.0 * 0.9 {
            warn!(
                "Slow tick #{}: {:.3}ms, {} live bots, {} spawns pending",
                tick_count,
                tick_ms,
                service.registry().len(),
                service.scheduler().pending_spawns()
            );
        }
    }
}
