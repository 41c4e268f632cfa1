//! Single entry point for inbound operations
//!
//! Readiness gate → classifier → one handler. Every request either completes
//! before `dispatch` returns or is left in the read queue; never both.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use crate::classifier::{classify, Policy};
use crate::device::{DeviceEvent, DeviceState};
use crate::error::{HidError, HidResult};
use crate::handlers;
use crate::ioctl::IoControlCode;
use crate::read_queue::{DrainReport, QueuePolicy, ReadQueue};
use crate::request::{Request, RequestHandle, RequestId};

/// What `dispatch` did with a request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Dispatched {
    /// Completed inline with this result
    Completed(HidResult),
    /// Parked in the deferred read queue
    Pending(RequestId),
}

/// Routes requests for one device
#[derive(Debug)]
pub struct Dispatcher {
    device: Arc<DeviceState>,
    queue: ReadQueue,
}

impl Dispatcher {
    pub fn new(device: Arc<DeviceState>, policy: QueuePolicy) -> Self {
        Self {
            device,
            queue: ReadQueue::new(policy),
        }
    }

    pub fn device(&self) -> &Arc<DeviceState> {
        &self.device
    }

    pub fn queue(&self) -> &ReadQueue {
        &self.queue
    }

    /// Route one request
    pub fn dispatch(&self, mut request: Request) -> Dispatched {
        let code = request.code();

        if !self.device.is_ready() {
            warn!("{} rejected: device not ready", code.name());
            return Self::finish(request, Err(HidError::NotReady));
        }

        let policy = classify(code);
        debug!("Dispatch {} {} -> {:?}", request.id(), code.name(), policy);

        let result = match policy {
            Policy::Immediate(source) => {
                handlers::handle_immediate(&self.device, &mut request, source)
            }
            Policy::Write(target) => handlers::handle_write(&self.device, &request, target),
            Policy::DeferredRead => {
                let id = request.id();
                return match self.queue.enqueue(request) {
                    Ok(()) => Dispatched::Pending(id),
                    Err(full) => {
                        let error = full.error();
                        Self::finish(full.request, Err(error))
                    }
                };
            }
            Policy::NotImplemented => Err(HidError::NotImplemented(code.to_string())),
        };

        if let Err(e) = &result {
            debug!("{} {} failed: {}", request.id(), code.name(), e);
        }
        Self::finish(request, result)
    }

    /// Build, dispatch and return the originator's handle
    pub fn submit(
        &self,
        code: IoControlCode,
        input: Vec<u8>,
        output_capacity: usize,
    ) -> RequestHandle {
        let (request, handle) = Request::new(code, input, output_capacity);
        self.dispatch(request);
        handle
    }

    /// Withdraw a pending read. False if it already left the queue.
    pub fn cancel(&self, id: RequestId) -> bool {
        self.queue.cancel(id)
    }

    /// One trigger firing: try to satisfy pending reads from the current report
    pub fn fire_trigger(&self) -> DrainReport {
        let report = self.queue.fire(&self.device);
        if report.taken() > 0 || report.discarded > 0 {
            debug!(
                "Trigger: {} completed, {} taken, {} discarded, {} remaining",
                report.completed(),
                report.taken(),
                report.discarded,
                report.remaining
            );
        }
        report
    }

    /// Subscribe to host-side writes on the device
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<DeviceEvent> {
        self.device.subscribe()
    }

    /// Cancel every pending read (device teardown)
    pub fn shutdown(&self) -> usize {
        self.queue.cancel_all()
    }

    fn finish(request: Request, result: HidResult) -> Dispatched {
        request.complete(result.clone());
        Dispatched::Completed(result)
    }
}
