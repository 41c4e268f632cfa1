//! Force-feedback "Set Condition" output report

use zerocopy::byteorder::little_endian::{I16, U16};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

use crate::descriptor::{OUTPUT_REPORT_ID, OUTPUT_REPORT_LEN};
use crate::error::GamepadError;

/// Axis a condition parameter block applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionAxis {
    X,
    Y,
}

impl ConditionAxis {
    fn from_offset(offset: u8) -> Result<Self, GamepadError> {
        match offset & 0x0F {
            0 => Ok(Self::X),
            1 => Ok(Self::Y),
            n => Err(GamepadError::MalformedPacket(format!(
                "parameter block offset {n} is not an axis"
            ))),
        }
    }
}

/// Raw wire layout
#[derive(IntoBytes, FromBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
struct RawCondition {
    report_id: u8,
    effect_block_index: u8,
    param_block_offset: u8,
    center_point_offset: I16,
    negative_coefficient: I16,
    positive_coefficient: I16,
    negative_saturation: U16,
    positive_saturation: U16,
    dead_band: U16,
}

/// Parsed condition effect parameters (spring, damper, friction, inertia)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetConditionReport {
    pub effect_block_index: u8,
    pub axis: ConditionAxis,
    pub center_point_offset: i16,
    pub negative_coefficient: i16,
    pub positive_coefficient: i16,
    pub negative_saturation: u16,
    pub positive_saturation: u16,
    pub dead_band: u16,
}

impl SetConditionReport {
    pub fn parse(data: &[u8]) -> Result<Self, GamepadError> {
        let Some(bytes) = data.get(..OUTPUT_REPORT_LEN) else {
            return Err(GamepadError::MalformedPacket(format!(
                "condition report needs {OUTPUT_REPORT_LEN} bytes, got {}",
                data.len()
            )));
        };
        let raw = RawCondition::read_from_bytes(bytes)
            .map_err(|_| GamepadError::MalformedPacket("unaligned condition report".into()))?;
        if raw.report_id != OUTPUT_REPORT_ID {
            return Err(GamepadError::MalformedPacket(format!(
                "unexpected report id 0x{:02X}",
                raw.report_id
            )));
        }

        Ok(Self {
            effect_block_index: raw.effect_block_index,
            axis: ConditionAxis::from_offset(raw.param_block_offset)?,
            center_point_offset: raw.center_point_offset.get(),
            negative_coefficient: raw.negative_coefficient.get(),
            positive_coefficient: raw.positive_coefficient.get(),
            negative_saturation: raw.negative_saturation.get(),
            positive_saturation: raw.positive_saturation.get(),
            dead_band: raw.dead_band.get(),
        })
    }

    /// Encode as an output report (what a host would send)
    pub fn to_bytes(&self) -> Vec<u8> {
        let raw = RawCondition {
            report_id: OUTPUT_REPORT_ID,
            effect_block_index: self.effect_block_index,
            param_block_offset: match self.axis {
                ConditionAxis::X => 0,
                ConditionAxis::Y => 1,
            },
            center_point_offset: I16::new(self.center_point_offset),
            negative_coefficient: I16::new(self.negative_coefficient),
            positive_coefficient: I16::new(self.positive_coefficient),
            negative_saturation: U16::new(self.negative_saturation),
            positive_saturation: U16::new(self.positive_saturation),
            dead_band: U16::new(self.dead_band),
        };
        raw.as_bytes().to_vec()
    }
}
