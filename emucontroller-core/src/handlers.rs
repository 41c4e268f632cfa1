//! Inline handlers: copy-from-fixed-source and write-then-complete
//!
//! Each handler works on an in-flight [`Request`] and returns the result the
//! dispatcher completes it with. None of them complete the request
//! themselves.

use zerocopy::IntoBytes;

use crate::classifier::{Source, Target};
use crate::device::{DeviceEvent, DeviceState, ReportSpec};
use crate::error::{HidError, HidResult};
use crate::request::Request;

/// Copy exactly `src` into the request's output buffer.
///
/// An empty source is an invalid parameter; a short output buffer is
/// reported before anything is copied.
pub fn copy_to_output(request: &mut Request, src: &[u8]) -> HidResult {
    if src.is_empty() {
        return Err(HidError::invalid("source buffer is empty"));
    }
    request.write_output(src)
}

/// Serve an immediate-copy opcode from `source`
pub fn handle_immediate(device: &DeviceState, request: &mut Request, source: Source) -> HidResult {
    match source {
        Source::HidDescriptor => copy_to_output(request, device.hid_descriptor_bytes()),
        Source::Attributes => copy_to_output(request, device.attributes().as_bytes()),
        Source::ReportDescriptor => copy_to_output(request, device.report_descriptor_bytes()),
        Source::Feature => {
            check_requested_id(request.input(), device.layout().feature, true)?;
            let feature = device.reports().feature.clone();
            copy_to_output(request, &feature)
        }
        Source::InputReport => {
            check_requested_id(request.input(), device.layout().input, false)?;
            let current = device.reports().current.clone();
            copy_to_output(request, &current)
        }
        Source::String => {
            let raw = read_u32(request.input())?;
            // Low word is the string id, high word the language (ignored)
            let id = (raw & 0xFFFF) as u16;
            let text = device
                .strings()
                .by_id(id)
                .ok_or_else(|| HidError::invalid(format!("unknown string id {id}")))?;
            copy_to_output(request, &encode_utf16z(text))
        }
        Source::IndexedString => {
            let index = read_u32(request.input())?;
            let text = device
                .strings()
                .by_index(index)
                .ok_or_else(|| HidError::invalid(format!("unknown string index {index}")))?;
            copy_to_output(request, &encode_utf16z(text))
        }
    }
}

/// Store the request's input into `target` and publish the matching event
pub fn handle_write(device: &DeviceState, request: &Request, target: Target) -> HidResult {
    let layout = device.layout();
    let spec = match target {
        Target::InputReport => layout.input,
        Target::Feature => layout.feature,
        Target::OutputReport => layout.output,
    };
    let data = request.input();
    check_report(data, spec)?;

    {
        let mut reports = device.reports();
        let slot = match target {
            Target::InputReport => &mut reports.current,
            Target::Feature => &mut reports.feature,
            Target::OutputReport => &mut reports.output,
        };
        slot.clear();
        slot.extend_from_slice(data);
    }

    device.publish(match target {
        Target::InputReport => DeviceEvent::InputReportUpdated,
        Target::Feature => DeviceEvent::FeatureChanged(data.to_vec()),
        Target::OutputReport => DeviceEvent::OutputReport(data.to_vec()),
    });

    // Writes return no output bytes
    Ok(0)
}

/// A written report must be exactly the declared size and carry its id
fn check_report(data: &[u8], spec: ReportSpec) -> Result<(), HidError> {
    if data.len() != spec.len {
        return Err(HidError::invalid(format!(
            "report 0x{:02X} must be {} bytes, got {}",
            spec.id,
            spec.len,
            data.len()
        )));
    }
    match data.first() {
        Some(&id) if id == spec.id => Ok(()),
        Some(&id) => Err(HidError::invalid(format!(
            "expected report id 0x{:02X}, got 0x{id:02X}",
            spec.id
        ))),
        None => Err(HidError::invalid("empty report")),
    }
}

/// Validate the report id a get-type request asks for (input byte 0)
fn check_requested_id(input: &[u8], spec: ReportSpec, required: bool) -> Result<(), HidError> {
    match input.first() {
        None if required => Err(HidError::invalid("missing report id")),
        None => Ok(()),
        Some(&id) if id == spec.id => Ok(()),
        Some(&id) => Err(HidError::invalid(format!(
            "unsupported report id 0x{id:02X}"
        ))),
    }
}

fn read_u32(input: &[u8]) -> Result<u32, HidError> {
    input
        .get(..4)
        .and_then(|b| b.try_into().ok())
        .map(u32::from_le_bytes)
        .ok_or_else(|| HidError::invalid(format!("expected 4-byte id, got {} bytes", input.len())))
}

/// UTF-16LE with a terminating NUL
pub fn encode_utf16z(text: &str) -> Vec<u8> {
    text.encode_utf16()
        .chain(std::iter::once(0))
        .flat_map(u16::to_le_bytes)
        .collect()
}
