//! Gamepad report descriptor and report layout

use emucontroller_core::{ReportLayout, ReportSpec};

/// Input report id (buttons, axes, hat)
pub const INPUT_REPORT_ID: u8 = 0x01;
/// Output report id (force-feedback condition block)
pub const OUTPUT_REPORT_ID: u8 = 0x02;
/// Feature report id (vendor settings)
pub const FEATURE_REPORT_ID: u8 = 0x03;

pub const BUTTON_COUNT: usize = 128;
pub const AXIS_COUNT: usize = 6;

/// Input report size including the id byte
pub const INPUT_REPORT_LEN: usize = 1 + BUTTON_COUNT / 8 + AXIS_COUNT * 2 + 1;
/// Output report size including the id byte
pub const OUTPUT_REPORT_LEN: usize = 15;
/// Feature report size including the id byte
pub const FEATURE_REPORT_LEN: usize = 8;

/// Report layout matching [`REPORT_DESCRIPTOR`]
pub const LAYOUT: ReportLayout = ReportLayout {
    input: ReportSpec::new(INPUT_REPORT_ID, INPUT_REPORT_LEN),
    feature: ReportSpec::new(FEATURE_REPORT_ID, FEATURE_REPORT_LEN),
    output: ReportSpec::new(OUTPUT_REPORT_ID, OUTPUT_REPORT_LEN),
};

#[rustfmt::skip]
pub const REPORT_DESCRIPTOR: &[u8] = &[
    0x05, 0x01,             // Usage Page (Generic Desktop)
    0x09, 0x05,             // Usage (Game Pad)
    0xA1, 0x01,             // Collection (Application)
    0x85, INPUT_REPORT_ID,  //   Report ID (1)
    0x05, 0x09,             //   Usage Page (Button)
    0x19, 0x01,             //   Usage Minimum (1)
    0x29, 0x80,             //   Usage Maximum (128)
    0x15, 0x00,             //   Logical Minimum (0)
    0x25, 0x01,             //   Logical Maximum (1)
    0x75, 0x01,             //   Report Size (1)
    0x95, 0x80,             //   Report Count (128)
    0x81, 0x02,             //   Input (Data,Var,Abs)
    0x05, 0x01,             //   Usage Page (Generic Desktop)
    0x09, 0x30,             //   Usage (X)
    0x09, 0x31,             //   Usage (Y)
    0x09, 0x32,             //   Usage (Z)
    0x09, 0x33,             //   Usage (Rx)
    0x09, 0x34,             //   Usage (Ry)
    0x09, 0x35,             //   Usage (Rz)
    0x15, 0x00,             //   Logical Minimum (0)
    0x27, 0xFF, 0xFF, 0x00, 0x00, // Logical Maximum (65535)
    0x75, 0x10,             //   Report Size (16)
    0x95, 0x06,             //   Report Count (6)
    0x81, 0x02,             //   Input (Data,Var,Abs)
    0x09, 0x39,             //   Usage (Hat switch)
    0x15, 0x00,             //   Logical Minimum (0)
    0x25, 0x07,             //   Logical Maximum (7)
    0x35, 0x00,             //   Physical Minimum (0)
    0x46, 0x3B, 0x01,       //   Physical Maximum (315)
    0x65, 0x14,             //   Unit (Degrees)
    0x75, 0x08,             //   Report Size (8)
    0x95, 0x01,             //   Report Count (1)
    0x81, 0x42,             //   Input (Data,Var,Abs,Null)
    0x65, 0x00,             //   Unit (None)
    0x06, 0x00, 0xFF,       //   Usage Page (Vendor 0xFF00)
    0x85, OUTPUT_REPORT_ID, //   Report ID (2)
    0x09, 0x01,             //   Usage (Vendor 1)
    0x15, 0x00,             //   Logical Minimum (0)
    0x26, 0xFF, 0x00,       //   Logical Maximum (255)
    0x75, 0x08,             //   Report Size (8)
    0x95, 0x0E,             //   Report Count (14)
    0x91, 0x02,             //   Output (Data,Var,Abs)
    0x85, FEATURE_REPORT_ID, //  Report ID (3)
    0x09, 0x02,             //   Usage (Vendor 2)
    0x95, 0x07,             //   Report Count (7)
    0xB1, 0x02,             //   Feature (Data,Var,Abs)
    0xC0,                   // End Collection
];
