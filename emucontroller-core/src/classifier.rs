//! Opcode → handling policy table

use serde::Serialize;

use crate::ioctl::IoControlCode;

/// Fixed data source an immediate handler copies from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Source {
    HidDescriptor,
    Attributes,
    ReportDescriptor,
    Feature,
    InputReport,
    String,
    IndexedString,
}

/// Device buffer a write-type handler stores into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Target {
    /// Current input report (Write-Report)
    InputReport,
    Feature,
    OutputReport,
}

/// How a request is handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Policy {
    /// Copy fixed data into the output buffer and complete inline
    Immediate(Source),
    /// Store the input buffer and complete inline
    Write(Target),
    /// Park in the deferred read queue until the trigger satisfies it
    DeferredRead,
    /// Complete inline with a not-implemented status
    NotImplemented,
}

impl Policy {
    /// True if the dispatcher leaves the request pending
    pub fn is_deferred(&self) -> bool {
        matches!(self, Policy::DeferredRead)
    }
}

/// Classify an opcode. Pure and total.
pub fn classify(code: IoControlCode) -> Policy {
    use IoControlCode as Op;

    match code {
        Op::GetDeviceDescriptor => Policy::Immediate(Source::HidDescriptor),
        Op::GetDeviceAttributes => Policy::Immediate(Source::Attributes),
        Op::GetReportDescriptor => Policy::Immediate(Source::ReportDescriptor),
        Op::ReadReport => Policy::DeferredRead,
        Op::WriteReport => Policy::Write(Target::InputReport),
        Op::GetFeature => Policy::Immediate(Source::Feature),
        Op::SetFeature => Policy::Write(Target::Feature),
        Op::GetInputReport => Policy::Immediate(Source::InputReport),
        Op::SetOutputReport => Policy::Write(Target::OutputReport),
        Op::GetString => Policy::Immediate(Source::String),
        Op::GetIndexedString => Policy::Immediate(Source::IndexedString),
        Op::SendIdleNotification
        | Op::ActivateDevice
        | Op::DeactivateDevice
        | Op::GetPhysicalDescriptor
        | Op::Unknown(_) => Policy::NotImplemented,
    }
}
