//! Host writes an output report, the feeder sees a parsed condition.

use std::sync::Arc;
use std::time::Duration;

use emucontroller_core::{
    DeviceAttributes, DeviceState, DeviceStrings, Dispatcher, HidError, IoControlCode,
    QueuePolicy,
};
use emucontroller_gamepad::{
    ConditionAxis, GamepadClient, GamepadState, InputReport, SetConditionReport, LAYOUT,
    REPORT_DESCRIPTOR,
};
use futures::StreamExt;

fn client() -> GamepadClient {
    let device = DeviceState::with_report_descriptor(
        REPORT_DESCRIPTOR.to_vec(),
        DeviceAttributes::new(0xDEED, 0xFEED, 0x0101),
        DeviceStrings::default(),
        LAYOUT,
    )
    .unwrap();
    GamepadClient::new(Arc::new(Dispatcher::new(
        Arc::new(device),
        QueuePolicy::default(),
    )))
}

fn spring(axis: ConditionAxis) -> SetConditionReport {
    SetConditionReport {
        effect_block_index: 1,
        axis,
        center_point_offset: 0,
        negative_coefficient: 5000,
        positive_coefficient: 5000,
        negative_saturation: 10000,
        positive_saturation: 10000,
        dead_band: 0,
    }
}

#[tokio::test]
async fn output_reports_reach_force_feedback_stream() {
    let c = client();
    let mut ffb = Box::pin(c.subscribe_force_feedback());
    let d = c.dispatcher();

    // Malformed (bad axis nibble) is skipped, the next one comes through
    let mut bad = spring(ConditionAxis::X).to_bytes();
    bad[2] = 0x07;
    let mut h = d.submit(IoControlCode::SetOutputReport, bad, 0);
    assert_eq!(h.try_result().unwrap().result, Ok(0));

    let good = spring(ConditionAxis::Y);
    d.submit(IoControlCode::SetOutputReport, good.to_bytes(), 0);

    let got = tokio::time::timeout(Duration::from_secs(1), ffb.next())
        .await
        .expect("condition report delivered")
        .expect("stream open");
    assert_eq!(got, good);
}

#[tokio::test]
async fn wrong_output_length_never_reaches_subscribers() {
    let c = client();
    let mut events = c.dispatcher().subscribe();
    let mut h = c
        .dispatcher()
        .submit(IoControlCode::SetOutputReport, vec![2, 0, 0], 0);
    assert!(matches!(
        h.try_result().unwrap().result,
        Err(HidError::InvalidParameter(_))
    ));
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn host_read_sees_fed_state() {
    let c = client();
    let read = c.read_report();

    let mut state = GamepadState::new();
    state.buttons.set(127, true).unwrap();
    state.set_hat(Some(4)).unwrap();
    c.send_state(&state).await.unwrap();
    c.dispatcher().fire_trigger();

    let done = read.wait().await;
    let report = InputReport::parse(&done.output).expect("input report");
    assert_eq!(report.buttons[15], 0x80);
    assert_eq!(report.hat, 4);
}
