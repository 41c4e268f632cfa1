//! Assemble a gamepad device from configuration

use std::sync::Arc;

use emucontroller_core::{
    string_id, Completion, DeviceAttributes, DeviceState, Dispatcher, HidError, IoControlCode,
};
use emucontroller_gamepad::{GamepadClient, LAYOUT, REPORT_DESCRIPTOR};
use serde::Serialize;
use tracing::info;
use zerocopy::FromBytes;

use crate::config::{ConfigError, ControllerConfig};

/// Device state for the gamepad personality
pub fn build_device(config: &ControllerConfig) -> Result<DeviceState, ConfigError> {
    let dev = &config.device;
    let device = DeviceState::with_report_descriptor(
        REPORT_DESCRIPTOR.to_vec(),
        DeviceAttributes::new(dev.vendor_id, dev.product_id, dev.version),
        dev.strings()?,
        LAYOUT,
    )?;
    Ok(device)
}

/// One emulated controller: dispatcher plus the feeder-side client
#[derive(Debug, Clone)]
pub struct EmuController {
    dispatcher: Arc<Dispatcher>,
    gamepad: GamepadClient,
}

impl EmuController {
    pub fn new(config: &ControllerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let device = Arc::new(build_device(config)?);
        let dispatcher = Arc::new(Dispatcher::new(device, config.queue));
        info!(
            "Controller {:04x}:{:04x} \"{}\" ready ({} byte report descriptor)",
            config.device.vendor_id,
            config.device.product_id,
            config.device.product,
            REPORT_DESCRIPTOR.len()
        );
        Ok(Self {
            gamepad: GamepadClient::new(Arc::clone(&dispatcher)),
            dispatcher,
        })
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    pub fn gamepad(&self) -> &GamepadClient {
        &self.gamepad
    }

    /// Query the device the way a host does on enumeration
    pub fn describe(&self) -> Result<DeviceDescription, HidError> {
        let hid_descriptor = self.query(IoControlCode::GetDeviceDescriptor, Vec::new(), 64)?;
        let attributes = self.query(IoControlCode::GetDeviceAttributes, Vec::new(), 64)?;
        let attributes = DeviceAttributes::read_from_bytes(&attributes)
            .map_err(|_| HidError::InvalidParameter("short attributes".into()))?;
        let report_descriptor = self.query(IoControlCode::GetReportDescriptor, Vec::new(), 4096)?;

        Ok(DeviceDescription {
            hid_descriptor,
            vendor_id: attributes.vendor_id.get(),
            product_id: attributes.product_id.get(),
            version: attributes.version_number.get(),
            report_descriptor,
            manufacturer: self.query_string(string_id::MANUFACTURER)?,
            product: self.query_string(string_id::PRODUCT)?,
            serial_number: self.query_string(string_id::SERIAL_NUMBER)?,
        })
    }

    fn query_string(&self, id: u16) -> Result<String, HidError> {
        let raw = self.query(
            IoControlCode::GetString,
            u32::from(id).to_le_bytes().to_vec(),
            512,
        )?;
        Ok(decode_utf16z(&raw))
    }

    fn query(&self, code: IoControlCode, input: Vec<u8>, capacity: usize) -> Result<Vec<u8>, HidError> {
        let mut handle = self.dispatcher.submit(code, input, capacity);
        match handle.try_result() {
            Some(Completion { result, output, .. }) => result.map(|_| output),
            None => Err(HidError::InvalidParameter(format!(
                "{} did not complete inline",
                code.name()
            ))),
        }
    }
}

/// Descriptors and strings as returned through the dispatcher
#[derive(Debug, Clone, Serialize)]
pub struct DeviceDescription {
    pub hid_descriptor: Vec<u8>,
    pub vendor_id: u16,
    pub product_id: u16,
    pub version: u16,
    pub report_descriptor: Vec<u8>,
    pub manufacturer: String,
    pub product: String,
    pub serial_number: String,
}

fn decode_utf16z(raw: &[u8]) -> String {
    let units: Vec<u16> = raw
        .chunks_exact(2)
        .map(|c| u16::from_le_bytes([c[0], c[1]]))
        .take_while(|&u| u != 0)
        .collect();
    String::from_utf16_lossy(&units)
}
