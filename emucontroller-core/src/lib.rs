//! Request dispatch engine for an emulated HID device
//!
//! Inbound device-control requests are gated on descriptor readiness,
//! classified by opcode and either completed inline or parked until a
//! periodic trigger (the simulated hardware interrupt) can answer them:
//!
//! ```text
//! submit ─▶ [Dispatcher] ─ready?─▶ classify ─┬─ Immediate ─▶ copy, complete
//!                                           ├─ Write ─────▶ store, complete
//!                                           ├─ NotImpl ───▶ complete(error)
//!                                           └─ Read ──────▶ [ReadQueue]
//!                                                              ▲
//!                         [PeriodicTrigger] ── fire_trigger ───┘
//! ```

pub mod classifier;
pub mod descriptor;
pub mod device;
pub mod dispatcher;
pub mod error;
pub mod handlers;
pub mod ioctl;
pub mod read_queue;
pub mod request;
pub mod trigger;

pub use classifier::{classify, Policy, Source, Target};
pub use descriptor::{DeviceAttributes, HidDescriptor};
pub use device::{
    string_id, DeviceEvent, DeviceState, DeviceStrings, ReportBuffers, ReportLayout, ReportSpec,
};
pub use dispatcher::{Dispatched, Dispatcher};
pub use error::{HidError, HidResult};
pub use ioctl::IoControlCode;
pub use read_queue::{DrainOutcome, DrainPolicy, DrainReport, QueueFull, QueuePolicy, ReadQueue};
pub use request::{Completion, CompletionState, Request, RequestHandle, RequestId};
pub use trigger::{PeriodicTrigger, TriggerHandle, DEFAULT_PERIOD, MIN_PERIOD};
