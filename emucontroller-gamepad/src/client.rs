//! High-level gamepad access through a dispatcher
//!
//! The client plays both sides the way a feeder application does: it pushes
//! input state into the device with Write-Report and listens for the output
//! reports the host sends back.

use std::sync::Arc;

use emucontroller_core::{DeviceEvent, Dispatcher, IoControlCode, RequestHandle};
use futures::{future, Stream, StreamExt};
use tokio_stream::wrappers::BroadcastStream;
use tracing::{debug, warn};

use crate::descriptor::INPUT_REPORT_LEN;
use crate::error::GamepadError;
use crate::ffb::SetConditionReport;
use crate::report::GamepadState;

#[derive(Debug, Clone)]
pub struct GamepadClient {
    dispatcher: Arc<Dispatcher>,
}

impl GamepadClient {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self { dispatcher }
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    /// Replace the device's current input report with `state`
    pub async fn send_state(&self, state: &GamepadState) -> Result<(), GamepadError> {
        let report = state.to_report();
        let done = self
            .dispatcher
            .submit(IoControlCode::WriteReport, report.to_vec(), 0)
            .wait()
            .await;
        done.result?;
        debug!(
            "Sent state: {} buttons, hat {:?}",
            state.buttons.pressed().count(),
            state.hat()
        );
        Ok(())
    }

    /// Post a host-side Read-Report sized for one input report
    pub fn read_report(&self) -> RequestHandle {
        self.dispatcher
            .submit(IoControlCode::ReadReport, Vec::new(), INPUT_REPORT_LEN)
    }

    /// Condition reports written by the host, parsed
    ///
    /// Malformed output reports are logged and skipped. A lagging subscriber
    /// loses the oldest reports.
    pub fn subscribe_force_feedback(&self) -> impl Stream<Item = SetConditionReport> + Send + 'static {
        BroadcastStream::new(self.dispatcher.subscribe()).filter_map(|event| {
            let parsed = match event {
                Ok(DeviceEvent::OutputReport(bytes)) => match SetConditionReport::parse(&bytes) {
                    Ok(report) => Some(report),
                    Err(e) => {
                        warn!("Ignoring output report: {}", e);
                        None
                    }
                },
                Ok(_) => None,
                Err(e) => {
                    warn!("Force-feedback subscriber lagged: {}", e);
                    None
                }
            };
            future::ready(parsed)
        })
    }
}
