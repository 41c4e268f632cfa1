//! Live simulation host
//!
//! Runs the periodic trigger, keeps one host Read-Report outstanding the way
//! a class driver pumps its device, feeds animated gamepad state and logs
//! any force-feedback the host sends.

use std::future::Future;
use std::time::Duration;

use emucontroller_core::PeriodicTrigger;
use emucontroller_gamepad::report::Axis;
use emucontroller_gamepad::{GamepadError, GamepadState, InputReport};
use futures::StreamExt;
use serde::Serialize;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::controller::EmuController;

#[derive(Debug, Clone)]
pub struct SimulationOptions {
    /// Trigger period
    pub period: Duration,
    /// How often new gamepad state is written
    pub feed_interval: Duration,
    /// Stop after this long; `None` runs until `shutdown` resolves
    pub duration: Option<Duration>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SimulationStats {
    pub firings: u64,
    pub states_sent: u64,
    pub reads_completed: u64,
    pub reads_failed: u64,
    pub force_feedback: u64,
    /// Reads still pending at shutdown
    pub reads_cancelled: usize,
}

/// Animated state for frame `frame`: sweeping sticks, a walking button and
/// a rotating hat
pub fn animate(frame: u64) -> GamepadState {
    let mut state = GamepadState::new();
    let sweep = (frame.wrapping_mul(1024) & 0xFFFF) as u16;
    state.set_axis(Axis::X, sweep);
    state.set_axis(Axis::Y, u16::MAX - sweep);
    state.buttons.press_wrapping(frame);
    state.rotate_hat(frame / 8);
    state
}

pub async fn run(
    controller: &EmuController,
    options: SimulationOptions,
    shutdown: impl Future<Output = ()>,
) -> Result<SimulationStats, GamepadError> {
    let dispatcher = controller.dispatcher();
    let gamepad = controller.gamepad();
    let mut stats = SimulationStats::default();

    let trigger = PeriodicTrigger::spawn(dispatcher.clone(), options.period);
    let mut ffb = Box::pin(gamepad.subscribe_force_feedback());
    let mut read = Box::pin(gamepad.read_report().wait());

    let mut feed = tokio::time::interval(options.feed_interval);
    feed.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut frame: u64 = 0;

    let deadline = async {
        match options.duration {
            Some(d) => tokio::time::sleep(d).await,
            None => std::future::pending().await,
        }
    };
    tokio::pin!(deadline);
    tokio::pin!(shutdown);

    info!(
        "Simulation running (trigger {:?}, feed {:?})",
        options.period, options.feed_interval
    );

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("Shutdown requested");
                break;
            }
            _ = &mut deadline => {
                info!("Duration elapsed");
                break;
            }
            _ = feed.tick() => {
                let mut state = animate(frame);
                frame += 1;
                gamepad.send_state(&state).await?;
                stats.states_sent += 1;
                debug!("Frame {}: touched groups {:#010b}", frame, state.buttons.take_touched());
            }
            done = &mut read => {
                if done.is_success() {
                    stats.reads_completed += 1;
                    if let Some(report) = InputReport::parse(&done.output) {
                        debug!(
                            "Host read {}: X={} Y={} hat={}",
                            done.id,
                            report.axis(Axis::X),
                            report.axis(Axis::Y),
                            report.hat
                        );
                    }
                } else {
                    stats.reads_failed += 1;
                    warn!("Host read {} failed: {:?}", done.id, done.result);
                }
                read = Box::pin(gamepad.read_report().wait());
            }
            Some(condition) = ffb.next() => {
                stats.force_feedback += 1;
                info!(
                    "Force feedback: effect {} on {:?}, coefficients {}/{}, dead band {}",
                    condition.effect_block_index,
                    condition.axis,
                    condition.negative_coefficient,
                    condition.positive_coefficient,
                    condition.dead_band
                );
            }
        }
    }

    stats.firings = trigger.stop().await;
    stats.reads_cancelled = dispatcher.shutdown();
    drop(read);

    info!(
        "Simulation stopped: {} firings, {} states, {} reads, {} force-feedback",
        stats.firings, stats.states_sent, stats.reads_completed, stats.force_feedback
    );
    Ok(stats)
}
