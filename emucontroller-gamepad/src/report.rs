//! Gamepad input report

use zerocopy::byteorder::little_endian::U16;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

use crate::buttons::Buttons;
use crate::descriptor::{AXIS_COUNT, BUTTON_COUNT, INPUT_REPORT_ID, INPUT_REPORT_LEN};
use crate::error::GamepadError;

/// Axis order within the report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X = 0,
    Y = 1,
    Z = 2,
    Rx = 3,
    Ry = 4,
    Rz = 5,
}

impl Axis {
    pub const ALL: [Axis; AXIS_COUNT] = [Axis::X, Axis::Y, Axis::Z, Axis::Rx, Axis::Ry, Axis::Rz];

    pub fn name(&self) -> &'static str {
        match self {
            Axis::X => "X",
            Axis::Y => "Y",
            Axis::Z => "Z",
            Axis::Rx => "Rx",
            Axis::Ry => "Ry",
            Axis::Rz => "Rz",
        }
    }
}

/// Axis resting position
pub const AXIS_CENTER: u16 = 0x8000;
/// Hat value meaning "not pressed" (outside the 0-7 logical range)
pub const HAT_NULL: u8 = 8;

/// Input report as sent through Write-Report
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoBytes, FromBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
pub struct InputReport {
    pub report_id: u8,
    pub buttons: [u8; BUTTON_COUNT / 8],
    pub axes: [U16; AXIS_COUNT],
    pub hat: u8,
}

impl InputReport {
    /// Parse a report received from the device (e.g. a completed read)
    pub fn parse(data: &[u8]) -> Option<Self> {
        let report = Self::read_from_bytes(data.get(..INPUT_REPORT_LEN)?).ok()?;
        (report.report_id == INPUT_REPORT_ID).then_some(report)
    }

    pub fn axis(&self, axis: Axis) -> u16 {
        self.axes[axis as usize].get()
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.as_bytes().to_vec()
    }
}

/// Logical controller state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GamepadState {
    pub buttons: Buttons,
    axes: [u16; AXIS_COUNT],
    hat: Option<u8>,
}

impl Default for GamepadState {
    fn default() -> Self {
        Self {
            buttons: Buttons::new(),
            axes: [AXIS_CENTER; AXIS_COUNT],
            hat: None,
        }
    }
}

impl GamepadState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_axis(&mut self, axis: Axis, value: u16) {
        self.axes[axis as usize] = value;
    }

    pub fn axis(&self, axis: Axis) -> u16 {
        self.axes[axis as usize]
    }

    /// Set the hat direction (0 = up, clockwise in 45° steps) or release it
    pub fn set_hat(&mut self, direction: Option<u8>) -> Result<(), GamepadError> {
        if let Some(d) = direction {
            if d > 7 {
                return Err(GamepadError::HatOutOfRange(d));
            }
        }
        self.hat = direction;
        Ok(())
    }

    /// Point the hat `step` eighths of a turn clockwise from up, wrapping
    pub fn rotate_hat(&mut self, step: u64) {
        self.hat = Some((step % 8) as u8);
    }

    pub fn hat(&self) -> Option<u8> {
        self.hat
    }

    pub fn to_report(&self) -> InputReport {
        InputReport {
            report_id: INPUT_REPORT_ID,
            buttons: self.buttons.as_bytes(),
            axes: self.axes.map(U16::new),
            hat: self.hat.unwrap_or(HAT_NULL),
        }
    }
}
