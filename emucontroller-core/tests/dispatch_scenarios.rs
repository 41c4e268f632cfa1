//! End-to-end dispatch scenarios.
//!
//! Drive a device through the public API only: submit requests, fire the
//! trigger by hand, and check what each originator receives.

use std::sync::Arc;
use std::thread;

use emucontroller_core::{
    CompletionState, DeviceAttributes, DeviceState, DeviceStrings, Dispatcher, DrainPolicy,
    HidDescriptor, HidError, IoControlCode, QueuePolicy, ReportLayout, ReportSpec,
};
use zerocopy::IntoBytes;

const REPORT_LEN: usize = 63;

/// Device with a 9-byte HID descriptor and a 63-byte report descriptor
fn device(report_descriptor_len: u16) -> Arc<DeviceState> {
    Arc::new(DeviceState::new(
        HidDescriptor::new(report_descriptor_len),
        vec![0x05; usize::from(report_descriptor_len)],
        DeviceAttributes::new(0xDEED, 0xFEED, 0x0101),
        DeviceStrings::default(),
        ReportLayout {
            input: ReportSpec::new(0xAA, REPORT_LEN),
            feature: ReportSpec::new(3, 8),
            output: ReportSpec::new(2, 15),
        },
    ))
}

fn dispatcher() -> Arc<Dispatcher> {
    Arc::new(Dispatcher::new(device(63), QueuePolicy::default()))
}

// ── Readiness gate ──

#[test]
fn not_ready_device_completes_every_opcode_without_copying() {
    let d = Dispatcher::new(device(0), QueuePolicy::default());
    let ops = IoControlCode::KNOWN
        .iter()
        .copied()
        .chain([IoControlCode::Unknown(0x1234)]);

    for op in ops {
        let mut h = d.submit(op, vec![0xAA; REPORT_LEN], 128);
        let done = h.try_result().expect("completed inline");
        assert_eq!(done.result, Err(HidError::NotReady), "{op}");
        assert!(done.output.is_empty(), "{op}");
    }
    assert!(d.queue().is_empty());
    assert!(d.device().current_report().is_empty());
}

// ── Immediate copies ──

#[test]
fn descriptor_fetch_copies_exact_bytes() {
    let d = dispatcher();
    let mut h = d.submit(IoControlCode::GetDeviceDescriptor, Vec::new(), 9);
    let done = h.try_result().unwrap();
    assert_eq!(done.result, Ok(9));
    assert_eq!(done.output, d.device().hid_descriptor().as_bytes());
    assert_eq!(done.output[7], 63);
}

#[test]
fn immediate_copies_succeed_with_larger_buffers() {
    let d = dispatcher();
    for (op, required) in [
        (IoControlCode::GetDeviceDescriptor, 9),
        (IoControlCode::GetDeviceAttributes, 32),
        (IoControlCode::GetReportDescriptor, 63),
    ] {
        let mut h = d.submit(op, Vec::new(), 256);
        let done = h.try_result().unwrap();
        assert_eq!(done.result, Ok(required), "{op}");
        assert_eq!(done.output.len(), required, "{op}");
    }
}

#[test]
fn immediate_copies_reject_short_buffers() {
    let d = dispatcher();
    for (op, required) in [
        (IoControlCode::GetDeviceDescriptor, 9),
        (IoControlCode::GetDeviceAttributes, 32),
        (IoControlCode::GetReportDescriptor, 63),
    ] {
        let mut h = d.submit(op, Vec::new(), required - 1);
        let done = h.try_result().unwrap();
        assert_eq!(
            done.result,
            Err(HidError::BufferTooSmall {
                required,
                available: required - 1
            }),
            "{op}"
        );
        assert!(done.output.is_empty());
    }
}

#[test]
fn get_input_report_copies_current_report_exactly() {
    let d = dispatcher();
    let mut payload = vec![0x11; REPORT_LEN];
    payload[0] = 0xAA;
    d.submit(IoControlCode::WriteReport, payload.clone(), 0);

    let mut exact = d.submit(IoControlCode::GetInputReport, vec![0xAA], REPORT_LEN);
    let done = exact.try_result().unwrap();
    assert_eq!(done.result, Ok(REPORT_LEN));
    assert_eq!(done.output, payload);

    let mut short = d.submit(IoControlCode::GetInputReport, vec![0xAA], REPORT_LEN - 1);
    let done = short.try_result().unwrap();
    assert_eq!(
        done.result,
        Err(HidError::BufferTooSmall {
            required: REPORT_LEN,
            available: REPORT_LEN - 1
        })
    );
    assert!(done.output.is_empty());
}

#[test]
fn get_feature_copies_stored_feature_exactly() {
    let d = dispatcher();
    let feature = vec![3, 1, 2, 3, 4, 5, 6, 7];
    let mut set = d.submit(IoControlCode::SetFeature, feature.clone(), 0);
    assert_eq!(set.try_result().unwrap().result, Ok(0));

    let mut exact = d.submit(IoControlCode::GetFeature, vec![3], feature.len());
    let done = exact.try_result().unwrap();
    assert_eq!(done.result, Ok(feature.len()));
    assert_eq!(done.output, feature);

    let mut short = d.submit(IoControlCode::GetFeature, vec![3], feature.len() - 1);
    let done = short.try_result().unwrap();
    assert_eq!(
        done.result,
        Err(HidError::BufferTooSmall {
            required: feature.len(),
            available: feature.len() - 1
        })
    );
    assert!(done.output.is_empty());
}

// ── Unsupported ──

#[test]
fn idle_notification_is_not_implemented() {
    let d = dispatcher();
    let mut h = d.submit(IoControlCode::SendIdleNotification, vec![1, 2, 3], 16);
    let done = h.try_result().unwrap();
    assert!(matches!(done.result, Err(HidError::NotImplemented(_))));
    assert_eq!(done.information(), 0);
    assert!(d.queue().is_empty());
}

// ── Deferred read ──

#[test]
fn read_waits_for_write_then_trigger() {
    let d = dispatcher();

    let mut read = d.submit(IoControlCode::ReadReport, Vec::new(), REPORT_LEN);
    d.fire_trigger();
    assert_eq!(read.state(), CompletionState::Pending);

    let mut payload = vec![0xAA; REPORT_LEN];
    payload[0] = 0xAA;
    let mut write = d.submit(IoControlCode::WriteReport, payload.clone(), 0);
    assert_eq!(write.try_result().unwrap().result, Ok(0));
    assert!(read.try_result().is_none());

    let report = d.fire_trigger();
    assert_eq!(report.completed(), 1);
    let done = read.try_result().unwrap();
    assert_eq!(done.result, Ok(REPORT_LEN));
    assert_eq!(done.output, payload);
}

#[test]
fn write_with_wrong_length_is_rejected() {
    let d = dispatcher();
    let mut write = d.submit(IoControlCode::WriteReport, vec![0xAA; REPORT_LEN - 1], 0);
    assert!(matches!(
        write.try_result().unwrap().result,
        Err(HidError::InvalidParameter(_))
    ));
    assert!(d.device().current_report().is_empty());
}

#[test]
fn reads_complete_in_submission_order() {
    let d = dispatcher();
    let mut handles: Vec<_> = (0..5)
        .map(|_| d.submit(IoControlCode::ReadReport, Vec::new(), REPORT_LEN))
        .collect();
    d.submit(IoControlCode::WriteReport, vec![0xAA; REPORT_LEN], 0);

    for i in 0..handles.len() {
        d.fire_trigger();
        for (j, h) in handles.iter().enumerate() {
            let expected = if j <= i {
                CompletionState::Completed
            } else {
                CompletionState::Pending
            };
            assert_eq!(h.state(), expected, "after firing {i}, read {j}");
        }
    }
    for h in &mut handles {
        assert!(h.try_result().unwrap().is_success());
    }
}

#[test]
fn bad_read_does_not_block_the_queue() {
    let d = dispatcher();
    let mut small = d.submit(IoControlCode::ReadReport, Vec::new(), 8);
    let mut ok = d.submit(IoControlCode::ReadReport, Vec::new(), REPORT_LEN);
    d.submit(IoControlCode::WriteReport, vec![0xAA; REPORT_LEN], 0);

    d.fire_trigger();
    assert!(matches!(
        small.try_result().unwrap().result,
        Err(HidError::BufferTooSmall { .. })
    ));
    d.fire_trigger();
    assert!(ok.try_result().unwrap().is_success());
}

#[test]
fn drain_all_policy_satisfies_every_ready_read() {
    let d = Dispatcher::new(
        device(63),
        QueuePolicy {
            capacity: None,
            drain: DrainPolicy::AllReady,
        },
    );
    let handles: Vec<_> = (0..4)
        .map(|_| d.submit(IoControlCode::ReadReport, Vec::new(), REPORT_LEN))
        .collect();
    d.submit(IoControlCode::WriteReport, vec![0xAA; REPORT_LEN], 0);

    let report = d.fire_trigger();
    assert_eq!(report.completed(), 4);
    assert_eq!(report.remaining, 0);
    assert!(handles
        .iter()
        .all(|h| h.state() == CompletionState::Completed));
}

// ── Cancellation ──

#[test]
fn canceled_read_is_never_completed_by_trigger() {
    let d = dispatcher();
    let mut read = d.submit(IoControlCode::ReadReport, Vec::new(), REPORT_LEN);
    assert!(d.cancel(read.id()));

    d.submit(IoControlCode::WriteReport, vec![0xAA; REPORT_LEN], 0);
    let report = d.fire_trigger();
    assert_eq!(report.completed(), 0);
    assert_eq!(read.try_result().unwrap().result, Err(HidError::Cancelled));
    assert_eq!(read.state(), CompletionState::Canceled);
}

#[test]
fn cancel_after_completion_reports_false() {
    let d = dispatcher();
    let mut read = d.submit(IoControlCode::ReadReport, Vec::new(), REPORT_LEN);
    d.submit(IoControlCode::WriteReport, vec![0xAA; REPORT_LEN], 0);
    d.fire_trigger();

    assert!(!d.cancel(read.id()));
    assert!(read.try_result().unwrap().is_success());
}

#[test]
fn cancel_racing_trigger_yields_exactly_one_outcome() {
    for _ in 0..200 {
        let d = dispatcher();
        d.submit(IoControlCode::WriteReport, vec![0xAA; REPORT_LEN], 0);
        let mut read = d.submit(IoControlCode::ReadReport, Vec::new(), REPORT_LEN);
        let id = read.id();

        let (canceled, fired) = thread::scope(|s| {
            let canceler = s.spawn(|| d.cancel(id));
            let firer = s.spawn(|| d.fire_trigger());
            (canceler.join().unwrap(), firer.join().unwrap())
        });

        let done = read.try_result().expect("terminal outcome");
        if canceled {
            assert_eq!(done.result, Err(HidError::Cancelled));
            assert_eq!(fired.completed(), 0);
        } else {
            assert!(done.is_success());
            assert_eq!(fired.completed(), 1);
        }
        assert!(d.queue().is_empty());
    }
}

#[test]
fn dropped_handle_does_not_hold_queue_capacity() {
    let d = Dispatcher::new(
        device(63),
        QueuePolicy {
            capacity: Some(1),
            drain: DrainPolicy::OnePerFiring,
        },
    );
    drop(d.submit(IoControlCode::ReadReport, Vec::new(), REPORT_LEN));

    let mut second = d.submit(IoControlCode::ReadReport, Vec::new(), REPORT_LEN);
    assert!(second.try_result().is_none());
    assert_eq!(d.queue().len(), 1);
}

#[test]
fn blocking_wait_from_plain_thread() {
    let d = dispatcher();
    let read = d.submit(IoControlCode::ReadReport, Vec::new(), REPORT_LEN);
    d.submit(IoControlCode::WriteReport, vec![0xAA; REPORT_LEN], 0);

    let done = thread::scope(|s| {
        let waiter = s.spawn(move || read.blocking_wait());
        d.fire_trigger();
        waiter.join().unwrap()
    });
    assert_eq!(done.result, Ok(REPORT_LEN));
    assert_eq!(done.output, vec![0xAA; REPORT_LEN]);
}

// ── Concurrency ──

#[test]
fn parallel_dispatch_completes_every_request_once() {
    let d = dispatcher();
    let per_thread = 50;

    let handles = thread::scope(|s| {
        let workers: Vec<_> = (0..4)
            .map(|t| {
                let d = &d;
                s.spawn(move || {
                    let mut mine = Vec::new();
                    for i in 0..per_thread {
                        let h = match (t + i) % 3 {
                            0 => d.submit(IoControlCode::ReadReport, Vec::new(), REPORT_LEN),
                            1 => d.submit(IoControlCode::WriteReport, vec![0xAA; REPORT_LEN], 0),
                            _ => d.submit(IoControlCode::GetDeviceDescriptor, Vec::new(), 9),
                        };
                        mine.push(h);
                    }
                    mine
                })
            })
            .collect();
        let firer = s.spawn(|| {
            for _ in 0..1000 {
                d.fire_trigger();
            }
        });
        firer.join().unwrap();
        workers
            .into_iter()
            .flat_map(|w| w.join().unwrap())
            .collect::<Vec<_>>()
    });

    // Flush whatever arrived after the firer finished
    while !d.queue().is_empty() {
        d.fire_trigger();
    }

    assert_eq!(handles.len(), 4 * per_thread);
    for mut h in handles {
        let done = h.try_result().expect("every request completes");
        assert!(done.is_success(), "{:?}", done.result);
        assert!(h.try_result().is_none(), "second outcome delivered");
    }
}

#[tokio::test]
async fn dropped_handle_never_receives_stale_completion() {
    let d = dispatcher();
    let abandoned = d.submit(IoControlCode::ReadReport, Vec::new(), REPORT_LEN);
    let kept = d.submit(IoControlCode::ReadReport, Vec::new(), REPORT_LEN);
    drop(abandoned);

    d.submit(IoControlCode::WriteReport, vec![0xAA; REPORT_LEN], 0);
    let report = d.fire_trigger();
    assert_eq!(report.discarded, 1);
    assert_eq!(report.completed(), 1);
    assert!(kept.wait().await.is_success());
}
