use crate::display::manager::DisplayManager;
use log::info;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

const STATS_INTERVAL: Duration = Duration::from_secs(3600);

/// Recalculate and redraw the countdown every `interval`
pub async fn display_loop(display: Arc<Mutex<DisplayManager>>, interval: Duration) {
    info!("Starting display update loop ({} ms interval)", interval.as_millis());

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    let mut ticks: u64 = 0;
    let mut frames: u64 = 0;
    let mut last_stats = Instant::now();

    loop {
        ticker.tick().await;

        {
            let mut display_guard = display.lock().await;
            display_guard.update_renderer();
            if display_guard.update_display() {
                frames += 1;
            }
        }

        ticks += 1;
        if last_stats.elapsed() >= STATS_INTERVAL {
            info!("Display loop: {} ticks, {} frames drawn in the last hour", ticks, frames);
            ticks = 0;
            frames = 0;
            last_stats = Instant::now();
        }
    }
}
