//! Gamepad personality for the emulated HID controller
//!
//! Report descriptor, typed input report, force-feedback condition parser and
//! a client that drives a [`emucontroller_core::Dispatcher`].

pub mod buttons;
pub mod client;
pub mod descriptor;
pub mod error;
pub mod ffb;
pub mod report;

pub use buttons::Buttons;
pub use client::GamepadClient;
pub use descriptor::{LAYOUT, REPORT_DESCRIPTOR};
pub use error::GamepadError;
pub use ffb::{ConditionAxis, SetConditionReport};
pub use report::{Axis, GamepadState, InputReport, AXIS_CENTER, HAT_NULL};
