//! Scripted walkthrough of the dispatch lifecycle
//!
//! Fetches descriptors, parks a read, shows that a firing without data
//! leaves it pending, writes a report, fires again and finally sends an
//! unsupported request. Each step records what the originator observed.

use emucontroller_core::{CompletionState, IoControlCode, RequestHandle};
use emucontroller_gamepad::descriptor::INPUT_REPORT_LEN;
use emucontroller_gamepad::GamepadState;
use serde::Serialize;

use crate::controller::EmuController;

/// Observation after one scripted step
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioStep {
    pub step: String,
    pub code: Option<IoControlCode>,
    pub state: CompletionState,
    /// NTSTATUS-style code once completed
    pub status: Option<u32>,
    pub bytes: usize,
    pub output: Vec<u8>,
    pub pending_reads: usize,
}

struct Recorder<'a> {
    controller: &'a EmuController,
    steps: Vec<ScenarioStep>,
}

impl Recorder<'_> {
    fn record(&mut self, step: &str, code: Option<IoControlCode>, handle: &mut RequestHandle) {
        let pending_reads = self.controller.dispatcher().queue().len();
        let entry = match handle.try_result() {
            Some(done) => ScenarioStep {
                step: step.to_string(),
                code,
                state: handle.state(),
                status: Some(done.ntstatus()),
                bytes: done.information(),
                output: done.output,
                pending_reads,
            },
            None => ScenarioStep {
                step: step.to_string(),
                code,
                state: handle.state(),
                status: None,
                bytes: 0,
                output: Vec::new(),
                pending_reads,
            },
        };
        self.steps.push(entry);
    }

    fn submit(&mut self, step: &str, code: IoControlCode, input: Vec<u8>, capacity: usize) {
        let mut handle = self
            .controller
            .dispatcher()
            .submit(code, input, capacity);
        self.record(step, Some(code), &mut handle);
    }
}

pub fn run_scenario(controller: &EmuController) -> Vec<ScenarioStep> {
    let dispatcher = controller.dispatcher();
    let mut rec = Recorder {
        controller,
        steps: Vec::new(),
    };

    rec.submit(
        "fetch HID descriptor",
        IoControlCode::GetDeviceDescriptor,
        Vec::new(),
        9,
    );
    rec.submit(
        "fetch device attributes",
        IoControlCode::GetDeviceAttributes,
        Vec::new(),
        32,
    );
    rec.submit(
        "fetch report descriptor",
        IoControlCode::GetReportDescriptor,
        Vec::new(),
        256,
    );
    rec.submit(
        "fetch product string",
        IoControlCode::GetString,
        u32::from(emucontroller_core::string_id::PRODUCT)
            .to_le_bytes()
            .to_vec(),
        256,
    );

    let mut read = dispatcher.submit(IoControlCode::ReadReport, Vec::new(), INPUT_REPORT_LEN);
    rec.record("post read", Some(IoControlCode::ReadReport), &mut read);

    dispatcher.fire_trigger();
    rec.record("fire trigger without data", None, &mut read);

    let mut state = GamepadState::new();
    state.buttons.press_wrapping(0);
    state.rotate_hat(2);
    rec.submit(
        "write input report",
        IoControlCode::WriteReport,
        state.to_report().to_vec(),
        0,
    );

    dispatcher.fire_trigger();
    rec.record("fire trigger with data", Some(IoControlCode::ReadReport), &mut read);

    rec.submit(
        "send idle notification",
        IoControlCode::SendIdleNotification,
        Vec::new(),
        0,
    );

    rec.steps
}
