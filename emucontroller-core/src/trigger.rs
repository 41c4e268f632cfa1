//! Periodic trigger standing in for the hardware "data ready" interrupt
//!
//! The trigger only owns timing. Each tick calls
//! [`Dispatcher::fire_trigger`], which does all of the matching, so tests
//! can fire synchronously without real time passing.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::dispatcher::Dispatcher;
use crate::read_queue::DrainReport;

/// Default firing period (hardware-simulation interval)
pub const DEFAULT_PERIOD: Duration = Duration::from_millis(10);
/// Shortest accepted period; shorter requests are raised to this
pub const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Cancellable recurring task driving a dispatcher's read queue
pub struct PeriodicTrigger;

impl PeriodicTrigger {
    /// Start firing every `period` on the current tokio runtime.
    ///
    /// The first firing happens one full period after the call. Periods
    /// below [`MIN_PERIOD`] (including zero) are raised to it.
    pub fn spawn(dispatcher: Arc<Dispatcher>, period: Duration) -> TriggerHandle {
        Self::spawn_with(dispatcher, period, |_| {})
    }

    /// Like [`PeriodicTrigger::spawn`], reporting every firing to `on_fire`
    pub fn spawn_with<F>(dispatcher: Arc<Dispatcher>, period: Duration, mut on_fire: F) -> TriggerHandle
    where
        F: FnMut(&DrainReport) + Send + 'static,
    {
        let period = if period < MIN_PERIOD {
            warn!("Trigger period {:?} too short, using {:?}", period, MIN_PERIOD);
            MIN_PERIOD
        } else {
            period
        };
        let (stop_tx, mut stop_rx) = watch::channel(false);

        let task = tokio::spawn(async move {
            let start = tokio::time::Instant::now() + period;
            let mut ticker = tokio::time::interval_at(start, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            info!("Read trigger started ({:?} period)", period);

            let mut firings: u64 = 0;
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        firings += 1;
                        let report = dispatcher.fire_trigger();
                        on_fire(&report);
                    }
                    changed = stop_rx.changed() => {
                        if changed.is_err() || *stop_rx.borrow() {
                            break;
                        }
                    }
                }
            }

            debug!("Read trigger stopped after {} firings", firings);
            firings
        });

        TriggerHandle {
            stop_tx,
            task: Some(task),
        }
    }
}

/// Owner of a running trigger; aborts it when dropped
pub struct TriggerHandle {
    stop_tx: watch::Sender<bool>,
    task: Option<JoinHandle<u64>>,
}

impl TriggerHandle {
    /// Stop firing and wait for the task. Returns the number of firings.
    pub async fn stop(mut self) -> u64 {
        let _ = self.stop_tx.send(true);
        match self.task.take() {
            Some(task) => task.await.unwrap_or(0),
            None => 0,
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }
}

impl Drop for TriggerHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
