//! Device state: descriptors, attributes, strings and report buffers
//!
//! Descriptor tables are immutable after construction. The three report
//! buffers live behind a single lock per device, so the write path and the
//! trigger's copy step never touch them concurrently.

use std::collections::BTreeMap;

use parking_lot::{Mutex, MutexGuard};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;
use zerocopy::IntoBytes;

use crate::descriptor::{DeviceAttributes, HidDescriptor};
use crate::error::HidError;

/// Broadcast channel capacity for device events
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Standard string ids accepted by Get-String
pub mod string_id {
    pub const MANUFACTURER: u16 = 14;
    pub const PRODUCT: u16 = 15;
    pub const SERIAL_NUMBER: u16 = 16;
}

/// Report id and total length (including the id byte)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSpec {
    pub id: u8,
    pub len: usize,
}

impl ReportSpec {
    pub const fn new(id: u8, len: usize) -> Self {
        Self { id, len }
    }
}

/// Report ids and sizes the device exchanges with the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportLayout {
    /// Read-Report / Write-Report / Get-Input-Report
    pub input: ReportSpec,
    /// Get-Feature / Set-Feature
    pub feature: ReportSpec,
    /// Set-Output-Report
    pub output: ReportSpec,
}

/// Static strings returned by Get-String / Get-Indexed-String
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceStrings {
    pub manufacturer: String,
    pub product: String,
    pub serial_number: String,
    #[serde(default)]
    pub indexed: BTreeMap<u32, String>,
}

impl DeviceStrings {
    /// Look up a standard string by id
    pub fn by_id(&self, id: u16) -> Option<&str> {
        match id {
            string_id::MANUFACTURER => Some(&self.manufacturer),
            string_id::PRODUCT => Some(&self.product),
            string_id::SERIAL_NUMBER => Some(&self.serial_number),
            _ => None,
        }
    }

    pub fn by_index(&self, index: u32) -> Option<&str> {
        self.indexed.get(&index).map(String::as_str)
    }
}

/// Host-side writes observed by the device
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceEvent {
    /// Write-Report replaced the current input report
    InputReportUpdated,
    /// Set-Feature stored a new feature report
    FeatureChanged(Vec<u8>),
    /// Set-Output-Report delivered an output report
    OutputReport(Vec<u8>),
}

/// Mutable report storage (the simulated hardware registers)
#[derive(Debug, Default)]
pub struct ReportBuffers {
    /// Latest input report; empty until the first Write-Report
    pub current: Vec<u8>,
    pub feature: Vec<u8>,
    pub output: Vec<u8>,
}

/// Everything the dispatcher and trigger need to know about one device
pub struct DeviceState {
    hid_descriptor: HidDescriptor,
    report_descriptor: Vec<u8>,
    attributes: DeviceAttributes,
    strings: DeviceStrings,
    layout: ReportLayout,
    reports: Mutex<ReportBuffers>,
    event_tx: broadcast::Sender<DeviceEvent>,
}

impl DeviceState {
    /// Build a device from its descriptor tables.
    ///
    /// The feature buffer starts zero-filled with its report id in byte 0;
    /// the current input report starts empty.
    pub fn new(
        hid_descriptor: HidDescriptor,
        report_descriptor: Vec<u8>,
        attributes: DeviceAttributes,
        strings: DeviceStrings,
        layout: ReportLayout,
    ) -> Self {
        let mut feature = vec![0u8; layout.feature.len];
        if let Some(first) = feature.first_mut() {
            *first = layout.feature.id;
        }
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Self {
            hid_descriptor,
            report_descriptor,
            attributes,
            strings,
            layout,
            reports: Mutex::new(ReportBuffers {
                current: Vec::new(),
                feature,
                output: Vec::new(),
            }),
            event_tx,
        }
    }

    /// Build a device whose HID descriptor announces `report_descriptor`.
    ///
    /// `wReportLength` is 16 bits wide, so descriptors longer than 65535
    /// bytes are rejected.
    pub fn with_report_descriptor(
        report_descriptor: Vec<u8>,
        attributes: DeviceAttributes,
        strings: DeviceStrings,
        layout: ReportLayout,
    ) -> Result<Self, HidError> {
        let report_len = u16::try_from(report_descriptor.len()).map_err(|_| {
            HidError::invalid(format!(
                "report descriptor is {} bytes, limit is {}",
                report_descriptor.len(),
                u16::MAX
            ))
        })?;
        Ok(Self::new(
            HidDescriptor::new(report_len),
            report_descriptor,
            attributes,
            strings,
            layout,
        ))
    }

    /// Readiness gate: descriptor metadata must be initialized
    pub fn is_ready(&self) -> bool {
        self.hid_descriptor.declared_length() != 0 && self.hid_descriptor.report_length() != 0
    }

    pub fn hid_descriptor(&self) -> &HidDescriptor {
        &self.hid_descriptor
    }

    /// Descriptor bytes as announced by `bLength`
    pub fn hid_descriptor_bytes(&self) -> &[u8] {
        let bytes = self.hid_descriptor.as_bytes();
        &bytes[..self.hid_descriptor.declared_length().min(bytes.len())]
    }

    /// Report descriptor bytes as announced by `wReportLength`
    pub fn report_descriptor_bytes(&self) -> &[u8] {
        let len = self
            .hid_descriptor
            .report_length()
            .min(self.report_descriptor.len());
        &self.report_descriptor[..len]
    }

    pub fn attributes(&self) -> &DeviceAttributes {
        &self.attributes
    }

    pub fn strings(&self) -> &DeviceStrings {
        &self.strings
    }

    pub fn layout(&self) -> &ReportLayout {
        &self.layout
    }

    /// Lock the report buffers
    pub fn reports(&self) -> MutexGuard<'_, ReportBuffers> {
        self.reports.lock()
    }

    /// Copy of the current input report (empty if never written)
    pub fn current_report(&self) -> Vec<u8> {
        self.reports.lock().current.clone()
    }

    /// Subscribe to host-side writes
    pub fn subscribe(&self) -> broadcast::Receiver<DeviceEvent> {
        self.event_tx.subscribe()
    }

    pub(crate) fn publish(&self, event: DeviceEvent) {
        // No subscribers is normal
        if self.event_tx.send(event).is_err() {
            debug!("Device event dropped (no subscribers)");
        }
    }
}

impl std::fmt::Debug for DeviceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceState")
            .field("hid_descriptor", &self.hid_descriptor)
            .field("report_descriptor_len", &self.report_descriptor.len())
            .field("attributes", &self.attributes)
            .field("layout", &self.layout)
            .finish()
    }
}
