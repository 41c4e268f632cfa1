use std::time::Duration;

use anyhow::Result;
use emu_controller::simulator::{self, SimulationOptions};
use emu_controller::{ControllerConfig, EmuController};
use tracing::info;

pub async fn run(
    config: &ControllerConfig,
    duration_secs: Option<u64>,
    feed_interval_ms: u64,
) -> Result<()> {
    if feed_interval_ms == 0 {
        anyhow::bail!("--feed-interval-ms must be at least 1");
    }
    let controller = EmuController::new(config)?;
    let options = SimulationOptions {
        period: config.trigger.period(),
        feed_interval: Duration::from_millis(feed_interval_ms),
        duration: duration_secs.map(Duration::from_secs),
    };

    info!("Press Ctrl+C to stop.");
    let stats = simulator::run(&controller, options, async {
        let _ = tokio::signal::ctrl_c().await;
    })
    .await?;

    println!(
        "{} firings, {} states sent, {} reads completed ({} failed), {} force-feedback reports",
        stats.firings,
        stats.states_sent,
        stats.reads_completed,
        stats.reads_failed,
        stats.force_feedback
    );
    Ok(())
}
