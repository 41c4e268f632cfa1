//! HID minidriver device-control codes

use serde::Serialize;
use std::fmt;

/// Raw device-control code values
pub mod code {
    pub const GET_DEVICE_DESCRIPTOR: u32 = 0x000B_0003;
    pub const GET_REPORT_DESCRIPTOR: u32 = 0x000B_0007;
    pub const READ_REPORT: u32 = 0x000B_000B;
    pub const WRITE_REPORT: u32 = 0x000B_000F;
    pub const GET_STRING: u32 = 0x000B_0013;
    pub const ACTIVATE_DEVICE: u32 = 0x000B_001F;
    pub const DEACTIVATE_DEVICE: u32 = 0x000B_0023;
    pub const GET_DEVICE_ATTRIBUTES: u32 = 0x000B_0027;
    pub const SEND_IDLE_NOTIFICATION: u32 = 0x000B_002B;
    // Report-id-in-separate-buffer variants (report buffer + id buffer)
    pub const SET_FEATURE: u32 = 0x000B_0053;
    pub const GET_FEATURE: u32 = 0x000B_0057;
    pub const SET_OUTPUT_REPORT: u32 = 0x000B_005B;
    pub const GET_INPUT_REPORT: u32 = 0x000B_005F;
    pub const GET_PHYSICAL_DESCRIPTOR: u32 = 0x000B_019A;
    pub const GET_INDEXED_STRING: u32 = 0x000B_01E2;
}

/// Operation requested of the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum IoControlCode {
    GetDeviceDescriptor,
    GetReportDescriptor,
    ReadReport,
    WriteReport,
    GetString,
    ActivateDevice,
    DeactivateDevice,
    GetDeviceAttributes,
    SendIdleNotification,
    SetFeature,
    GetFeature,
    SetOutputReport,
    GetInputReport,
    GetPhysicalDescriptor,
    GetIndexedString,
    /// Any code this device does not know
    Unknown(u32),
}

impl IoControlCode {
    /// Every known opcode, in raw-code order
    pub const KNOWN: &'static [IoControlCode] = &[
        IoControlCode::GetDeviceDescriptor,
        IoControlCode::GetReportDescriptor,
        IoControlCode::ReadReport,
        IoControlCode::WriteReport,
        IoControlCode::GetString,
        IoControlCode::ActivateDevice,
        IoControlCode::DeactivateDevice,
        IoControlCode::GetDeviceAttributes,
        IoControlCode::SendIdleNotification,
        IoControlCode::SetFeature,
        IoControlCode::GetFeature,
        IoControlCode::SetOutputReport,
        IoControlCode::GetInputReport,
        IoControlCode::GetPhysicalDescriptor,
        IoControlCode::GetIndexedString,
    ];

    /// Decode a raw device-control code
    pub fn from_raw(raw: u32) -> Self {
        match raw {
            code::GET_DEVICE_DESCRIPTOR => Self::GetDeviceDescriptor,
            code::GET_REPORT_DESCRIPTOR => Self::GetReportDescriptor,
            code::READ_REPORT => Self::ReadReport,
            code::WRITE_REPORT => Self::WriteReport,
            code::GET_STRING => Self::GetString,
            code::ACTIVATE_DEVICE => Self::ActivateDevice,
            code::DEACTIVATE_DEVICE => Self::DeactivateDevice,
            code::GET_DEVICE_ATTRIBUTES => Self::GetDeviceAttributes,
            code::SEND_IDLE_NOTIFICATION => Self::SendIdleNotification,
            code::SET_FEATURE => Self::SetFeature,
            code::GET_FEATURE => Self::GetFeature,
            code::SET_OUTPUT_REPORT => Self::SetOutputReport,
            code::GET_INPUT_REPORT => Self::GetInputReport,
            code::GET_PHYSICAL_DESCRIPTOR => Self::GetPhysicalDescriptor,
            code::GET_INDEXED_STRING => Self::GetIndexedString,
            other => Self::Unknown(other),
        }
    }

    /// Raw device-control code
    pub fn raw(&self) -> u32 {
        match self {
            Self::GetDeviceDescriptor => code::GET_DEVICE_DESCRIPTOR,
            Self::GetReportDescriptor => code::GET_REPORT_DESCRIPTOR,
            Self::ReadReport => code::READ_REPORT,
            Self::WriteReport => code::WRITE_REPORT,
            Self::GetString => code::GET_STRING,
            Self::ActivateDevice => code::ACTIVATE_DEVICE,
            Self::DeactivateDevice => code::DEACTIVATE_DEVICE,
            Self::GetDeviceAttributes => code::GET_DEVICE_ATTRIBUTES,
            Self::SendIdleNotification => code::SEND_IDLE_NOTIFICATION,
            Self::SetFeature => code::SET_FEATURE,
            Self::GetFeature => code::GET_FEATURE,
            Self::SetOutputReport => code::SET_OUTPUT_REPORT,
            Self::GetInputReport => code::GET_INPUT_REPORT,
            Self::GetPhysicalDescriptor => code::GET_PHYSICAL_DESCRIPTOR,
            Self::GetIndexedString => code::GET_INDEXED_STRING,
            Self::Unknown(raw) => *raw,
        }
    }

    /// Human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            Self::GetDeviceDescriptor => "GET_DEVICE_DESCRIPTOR",
            Self::GetReportDescriptor => "GET_REPORT_DESCRIPTOR",
            Self::ReadReport => "READ_REPORT",
            Self::WriteReport => "WRITE_REPORT",
            Self::GetString => "GET_STRING",
            Self::ActivateDevice => "ACTIVATE_DEVICE",
            Self::DeactivateDevice => "DEACTIVATE_DEVICE",
            Self::GetDeviceAttributes => "GET_DEVICE_ATTRIBUTES",
            Self::SendIdleNotification => "SEND_IDLE_NOTIFICATION_REQUEST",
            Self::SetFeature => "SET_FEATURE",
            Self::GetFeature => "GET_FEATURE",
            Self::SetOutputReport => "SET_OUTPUT_REPORT",
            Self::GetInputReport => "GET_INPUT_REPORT",
            Self::GetPhysicalDescriptor => "GET_PHYSICAL_DESCRIPTOR",
            Self::GetIndexedString => "GET_INDEXED_STRING",
            Self::Unknown(_) => "UNKNOWN",
        }
    }
}

impl fmt::Display for IoControlCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (0x{:08X})", self.name(), self.raw())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_codes_decode_to_themselves() {
        for op in IoControlCode::KNOWN {
            assert_eq!(IoControlCode::from_raw(op.raw()), *op, "{op}");
        }
    }

    #[test]
    fn test_unknown_code_preserved() {
        let op = IoControlCode::from_raw(0x0022_0000);
        assert_eq!(op, IoControlCode::Unknown(0x0022_0000));
        assert_eq!(op.raw(), 0x0022_0000);
        assert_eq!(op.name(), "UNKNOWN");
    }

    #[test]
    fn test_display() {
        assert_eq!(
            IoControlCode::ReadReport.to_string(),
            "READ_REPORT (0x000B000B)"
        );
    }
}
