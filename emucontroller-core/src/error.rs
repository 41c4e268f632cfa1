//! Request failure kinds

use serde::Serialize;
use thiserror::Error;

/// NTSTATUS-style codes reported alongside a completion.
pub mod status {
    pub const SUCCESS: u32 = 0x0000_0000;
    pub const NOT_IMPLEMENTED: u32 = 0xC000_0002;
    pub const INVALID_PARAMETER: u32 = 0xC000_000D;
    pub const BUFFER_TOO_SMALL: u32 = 0xC000_0023;
    pub const INSUFFICIENT_RESOURCES: u32 = 0xC000_009A;
    pub const DEVICE_NOT_READY: u32 = 0xC000_00A3;
    pub const CANCELLED: u32 = 0xC000_0120;
}

/// Terminal failure of a single request.
///
/// Every variant is delivered through the request's one completion signal;
/// none of them abort dispatch or trigger processing for other requests.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
pub enum HidError {
    /// Descriptor metadata has not been initialized
    #[error("Device not ready")]
    NotReady,

    /// Opcode has no handler
    #[error("Operation not implemented: {0}")]
    NotImplemented(String),

    /// Malformed input length, wrong report id, or empty source
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Caller's output buffer is smaller than the data to return
    #[error("Buffer too small: need {required} bytes, have {available}")]
    BufferTooSmall { required: usize, available: usize },

    /// Bounded read queue is at capacity
    #[error("Read queue full ({capacity} pending)")]
    QueueFull { capacity: usize },

    /// Originator withdrew the request before it was matched
    #[error("Request cancelled")]
    Cancelled,
}

impl HidError {
    /// Status code reported to the host for this failure
    pub fn ntstatus(&self) -> u32 {
        match self {
            HidError::NotReady => status::DEVICE_NOT_READY,
            HidError::NotImplemented(_) => status::NOT_IMPLEMENTED,
            HidError::InvalidParameter(_) => status::INVALID_PARAMETER,
            HidError::BufferTooSmall { .. } => status::BUFFER_TOO_SMALL,
            HidError::QueueFull { .. } => status::INSUFFICIENT_RESOURCES,
            HidError::Cancelled => status::CANCELLED,
        }
    }

    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        HidError::InvalidParameter(msg.into())
    }
}

/// Bytes written on success, or the failure kind.
pub type HidResult = Result<usize, HidError>;
