//! Gamepad error types

use emucontroller_core::HidError;
use thiserror::Error;

/// Errors from gamepad operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GamepadError {
    /// Device rejected the request
    #[error("Device error: {0}")]
    Device(#[from] HidError),

    /// Button index outside 0..=127
    #[error("Button index {0} out of range (max 127)")]
    ButtonOutOfRange(usize),

    /// Hat direction outside 0..=7
    #[error("Hat direction {0} out of range (max 7)")]
    HatOutOfRange(u8),

    /// Force-feedback packet could not be parsed
    #[error("Malformed force-feedback packet: {0}")]
    MalformedPacket(String),
}
