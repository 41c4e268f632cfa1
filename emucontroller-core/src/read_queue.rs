//! Deferred read queue
//!
//! Read-Report requests cannot be answered when they arrive: the host pulls,
//! but the (simulated) hardware pushes. They wait here in arrival order until
//! a trigger firing finds input data for them.
//!
//! ```text
//! Dispatcher ──enqueue──▶ [ R1 | R2 | R3 ] ◀──cancel(id)── originator
//!                            │
//!                  trigger ──┘ pop head, copy current report, complete
//! ```
//!
//! Enqueue, cancel and the trigger's pop all run under the queue lock, so a
//! request is either taken by the trigger or removed by cancel, never both.
//! Lock order is queue, then device reports.

use std::collections::VecDeque;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::device::DeviceState;
use crate::error::HidError;
use crate::request::{Request, RequestId};

/// How many ready requests one firing may satisfy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrainPolicy {
    /// One request per firing, like one hardware event producing one report
    #[default]
    OnePerFiring,
    /// Keep matching the head while input data is available
    AllReady,
}

/// Capacity and drain behaviour of a read queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct QueuePolicy {
    /// Maximum pending reads; `None` is unbounded
    #[serde(default)]
    pub capacity: Option<usize>,
    #[serde(default)]
    pub drain: DrainPolicy,
}

/// Enqueue was refused; the request is handed back for completion
#[derive(Debug)]
pub struct QueueFull {
    pub request: Request,
    pub capacity: usize,
}

impl QueueFull {
    pub fn error(&self) -> HidError {
        HidError::QueueFull {
            capacity: self.capacity,
        }
    }
}

/// Result of one attempt to satisfy the head of the queue
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum DrainOutcome {
    /// Nothing pending
    Idle,
    /// Requests pending but no input report has been written yet
    NoData { pending: usize },
    /// Head matched and completed successfully
    Completed { id: RequestId, bytes: usize },
    /// Head dequeued and failed (e.g. buffer too small)
    Failed { id: RequestId, error: HidError },
    /// Head was taken but its originator withdrew before completion
    Withdrawn { id: RequestId },
}

impl DrainOutcome {
    /// True if a request left the queue
    pub fn took_request(&self) -> bool {
        matches!(
            self,
            Self::Completed { .. } | Self::Failed { .. } | Self::Withdrawn { .. }
        )
    }
}

/// Everything one trigger firing did
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DrainReport {
    pub outcomes: Vec<DrainOutcome>,
    /// Withdrawn entries purged without completion
    pub discarded: usize,
    /// Requests still pending after the firing
    pub remaining: usize,
}

impl DrainReport {
    /// Requests completed with success
    pub fn completed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, DrainOutcome::Completed { .. }))
            .count()
    }

    /// Requests dequeued (success, failure or withdrawn)
    pub fn taken(&self) -> usize {
        self.outcomes.iter().filter(|o| o.took_request()).count()
    }
}

/// FIFO of pending Read-Report requests
#[derive(Debug)]
pub struct ReadQueue {
    pending: Mutex<VecDeque<Request>>,
    policy: QueuePolicy,
}

impl ReadQueue {
    pub fn new(policy: QueuePolicy) -> Self {
        Self {
            pending: Mutex::new(VecDeque::new()),
            policy,
        }
    }

    pub fn policy(&self) -> &QueuePolicy {
        &self.policy
    }

    /// Append a request to the tail. No data is copied.
    pub fn enqueue(&self, request: Request) -> Result<(), QueueFull> {
        let mut pending = self.pending.lock();
        purge_withdrawn(&mut pending);
        if let Some(capacity) = self.policy.capacity {
            if pending.len() >= capacity {
                warn!(
                    "Read queue full ({} pending), rejecting {}",
                    pending.len(),
                    request.id()
                );
                return Err(QueueFull { request, capacity });
            }
        }
        debug!("Queued read {} (depth {})", request.id(), pending.len() + 1);
        pending.push_back(request);
        Ok(())
    }

    /// Withdraw a pending request and deliver its cancellation.
    ///
    /// Returns false if the request is not queued (already taken by a firing,
    /// already canceled, or never enqueued).
    pub fn cancel(&self, id: RequestId) -> bool {
        let request = {
            let mut pending = self.pending.lock();
            let Some(pos) = pending.iter().position(|r| r.id() == id) else {
                return false;
            };
            pending.remove(pos)
        };
        match request {
            Some(request) => {
                debug!("Canceled queued read {}", id);
                request.cancel();
                true
            }
            None => false,
        }
    }

    /// Cancel everything pending (device teardown). Returns how many.
    pub fn cancel_all(&self) -> usize {
        let drained: Vec<Request> = self.pending.lock().drain(..).collect();
        let count = drained.len();
        for request in drained {
            request.cancel();
        }
        if count > 0 {
            debug!("Canceled {} queued reads", count);
        }
        count
    }

    /// Number of queued entries (including withdrawn ones not yet purged)
    pub fn len(&self) -> usize {
        self.pending.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.lock().is_empty()
    }

    /// Ids in completion order
    pub fn pending_ids(&self) -> Vec<RequestId> {
        self.pending.lock().iter().map(Request::id).collect()
    }

    /// One trigger firing: satisfy the head, or every ready request under
    /// [`DrainPolicy::AllReady`].
    pub fn fire(&self, device: &DeviceState) -> DrainReport {
        let mut report = DrainReport::default();
        loop {
            let outcome = self.service_head(device, &mut report.discarded);
            let took = outcome.took_request();
            report.outcomes.push(outcome);
            if !took || self.policy.drain == DrainPolicy::OnePerFiring {
                break;
            }
        }
        report.remaining = self.len();
        report
    }

    fn service_head(&self, device: &DeviceState, discarded: &mut usize) -> DrainOutcome {
        let (mut request, data) = {
            let mut pending = self.pending.lock();

            *discarded += purge_withdrawn(&mut pending);

            if pending.is_empty() {
                return DrainOutcome::Idle;
            }

            let reports = device.reports();
            let expected = device.layout().input.len;
            if reports.current.is_empty() || reports.current.len() < expected {
                return DrainOutcome::NoData {
                    pending: pending.len(),
                };
            }

            let Some(request) = pending.pop_front() else {
                return DrainOutcome::Idle;
            };
            (request, reports.current.clone())
        };

        let id = request.id();
        let result = request.write_output(&data);
        if !request.complete(result.clone()) {
            return DrainOutcome::Withdrawn { id };
        }
        match result {
            Ok(bytes) => DrainOutcome::Completed { id, bytes },
            Err(error) => {
                warn!("Read {} failed: {}", id, error);
                DrainOutcome::Failed { id, error }
            }
        }
    }
}

/// Drop entries whose originator released its handle, without completing
/// them. Returns how many were removed.
fn purge_withdrawn(pending: &mut VecDeque<Request>) -> usize {
    let before = pending.len();
    pending.retain(|r| {
        let withdrawn = r.is_canceled();
        if withdrawn {
            debug!("Discarding withdrawn read {}", r.id());
        }
        !withdrawn
    });
    before - pending.len()
}

impl Drop for ReadQueue {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::DeviceAttributes;
    use crate::device::{DeviceStrings, ReportLayout, ReportSpec};
    use crate::ioctl::IoControlCode;
    use crate::request::{CompletionState, RequestHandle};

    fn device() -> DeviceState {
        DeviceState::with_report_descriptor(
            vec![0x05; 16],
            DeviceAttributes::new(1, 2, 3),
            DeviceStrings::default(),
            ReportLayout {
                input: ReportSpec::new(1, 4),
                feature: ReportSpec::new(3, 2),
                output: ReportSpec::new(2, 2),
            },
        )
        .unwrap()
    }

    fn write_current(dev: &DeviceState, data: &[u8]) {
        let mut reports = dev.reports();
        reports.current = data.to_vec();
    }

    fn read(cap: usize) -> (Request, RequestHandle) {
        Request::new(IoControlCode::ReadReport, Vec::new(), cap)
    }

    #[test]
    fn test_fire_on_empty_queue_is_idle() {
        let q = ReadQueue::new(QueuePolicy::default());
        let report = q.fire(&device());
        assert_eq!(report.outcomes, vec![DrainOutcome::Idle]);
        assert_eq!(report.remaining, 0);
    }

    #[test]
    fn test_waits_for_data() {
        let q = ReadQueue::new(QueuePolicy::default());
        let dev = device();
        let (r, h) = read(4);
        q.enqueue(r).unwrap();

        let report = q.fire(&dev);
        assert_eq!(report.outcomes, vec![DrainOutcome::NoData { pending: 1 }]);
        assert!(h.is_pending());
        assert_eq!(q.len(), 1);
    }

    #[test]
    fn test_one_per_firing_in_order() {
        let q = ReadQueue::new(QueuePolicy::default());
        let dev = device();
        let (r1, mut h1) = read(4);
        let (r2, mut h2) = read(4);
        q.enqueue(r1).unwrap();
        q.enqueue(r2).unwrap();
        write_current(&dev, &[1, 9, 8, 7]);

        let report = q.fire(&dev);
        assert_eq!(report.completed(), 1);
        assert_eq!(report.remaining, 1);
        assert_eq!(h1.try_result().unwrap().output, vec![1, 9, 8, 7]);
        assert!(h2.try_result().is_none());

        q.fire(&dev);
        assert_eq!(h2.try_result().unwrap().result, Ok(4));
    }

    #[test]
    fn test_all_ready_drains_everything() {
        let q = ReadQueue::new(QueuePolicy {
            capacity: None,
            drain: DrainPolicy::AllReady,
        });
        let dev = device();
        let handles: Vec<_> = (0..3)
            .map(|_| {
                let (r, h) = read(4);
                q.enqueue(r).unwrap();
                h
            })
            .collect();
        write_current(&dev, &[1, 2, 3, 4]);

        let report = q.fire(&dev);
        assert_eq!(report.completed(), 3);
        assert_eq!(report.outcomes.last(), Some(&DrainOutcome::Idle));
        for h in handles {
            assert_eq!(h.state(), CompletionState::Completed);
        }
    }

    #[test]
    fn test_small_buffer_fails_and_dequeues() {
        let q = ReadQueue::new(QueuePolicy::default());
        let dev = device();
        let (small, mut hs) = read(2);
        let (ok, mut hok) = read(4);
        q.enqueue(small).unwrap();
        q.enqueue(ok).unwrap();
        write_current(&dev, &[1, 2, 3, 4]);

        let report = q.fire(&dev);
        assert!(matches!(
            report.outcomes[0],
            DrainOutcome::Failed {
                error: HidError::BufferTooSmall { .. },
                ..
            }
        ));
        let done = hs.try_result().unwrap();
        assert!(done.output.is_empty());

        q.fire(&dev);
        assert!(hok.try_result().unwrap().is_success());
    }

    #[test]
    fn test_bounded_capacity() {
        let q = ReadQueue::new(QueuePolicy {
            capacity: Some(1),
            drain: DrainPolicy::OnePerFiring,
        });
        let (r1, _h1) = read(4);
        let (r2, _h2) = read(4);
        q.enqueue(r1).unwrap();
        let full = q.enqueue(r2).unwrap_err();
        assert_eq!(full.error(), HidError::QueueFull { capacity: 1 });
        assert_eq!(q.len(), 1);
    }

    #[test]
    fn test_cancel_removes_and_notifies() {
        let q = ReadQueue::new(QueuePolicy::default());
        let (r, mut h) = read(4);
        let id = r.id();
        q.enqueue(r).unwrap();

        assert!(q.cancel(id));
        assert!(!q.cancel(id));
        assert!(q.is_empty());
        assert_eq!(h.try_result().unwrap().result, Err(HidError::Cancelled));
    }

    #[test]
    fn test_dropped_handle_is_discarded_not_counted() {
        let q = ReadQueue::new(QueuePolicy::default());
        let dev = device();
        let (gone, h_gone) = read(4);
        let (live, mut h_live) = read(4);
        q.enqueue(gone).unwrap();
        q.enqueue(live).unwrap();
        drop(h_gone);
        write_current(&dev, &[1, 0, 0, 0]);

        let report = q.fire(&dev);
        assert_eq!(report.discarded, 1);
        assert_eq!(report.completed(), 1);
        assert!(h_live.try_result().unwrap().is_success());
    }

    #[test]
    fn test_withdrawn_read_frees_capacity() {
        let q = ReadQueue::new(QueuePolicy {
            capacity: Some(1),
            drain: DrainPolicy::OnePerFiring,
        });
        let (first, h_first) = read(4);
        q.enqueue(first).unwrap();
        drop(h_first);

        let (second, h_second) = read(4);
        q.enqueue(second).unwrap();
        assert_eq!(q.len(), 1);
        assert!(h_second.is_pending());
    }

    #[test]
    fn test_withdrawn_reads_behind_waiting_head_are_purged() {
        let q = ReadQueue::new(QueuePolicy::default());
        let dev = device();
        let (live, h_live) = read(4);
        q.enqueue(live).unwrap();
        for _ in 0..1000 {
            let (r, h) = read(4);
            q.enqueue(r).unwrap();
            drop(h);
        }

        let report = q.fire(&dev);
        assert_eq!(report.discarded, 1000);
        assert_eq!(report.outcomes, vec![DrainOutcome::NoData { pending: 1 }]);
        assert_eq!(q.len(), 1);
        assert!(h_live.is_pending());
    }

    #[test]
    fn test_pending_ids_fifo() {
        let q = ReadQueue::new(QueuePolicy::default());
        let (r1, _h1) = read(4);
        let (r2, _h2) = read(4);
        let ids = vec![r1.id(), r2.id()];
        q.enqueue(r1).unwrap();
        q.enqueue(r2).unwrap();
        assert_eq!(q.pending_ids(), ids);
    }

    #[test]
    fn test_drop_cancels_pending() {
        let q = ReadQueue::new(QueuePolicy::default());
        let (r, mut h) = read(4);
        q.enqueue(r).unwrap();
        drop(q);
        assert_eq!(h.try_result().unwrap().result, Err(HidError::Cancelled));
    }
}
