//! Fixed-layout HID descriptor and attribute structures
//!
//! Both structs are byte-packed little-endian so they can be handed to the
//! host as-is via `as_bytes()`.

use zerocopy::byteorder::little_endian::{U16, U32};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

/// HID class descriptor type
pub const HID_DESCRIPTOR_TYPE: u8 = 0x21;
/// Report descriptor type (DescriptorList entry)
pub const REPORT_DESCRIPTOR_TYPE: u8 = 0x22;
/// HID specification release 1.00
pub const HID_VERSION: u16 = 0x0100;

/// One entry of the descriptor list following the HID descriptor header
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoBytes, FromBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
pub struct DescriptorListEntry {
    pub report_type: u8,
    pub report_length: U16,
}

/// HID descriptor (9 bytes on the wire)
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoBytes, FromBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
pub struct HidDescriptor {
    pub length: u8,
    pub descriptor_type: u8,
    pub hid_version: U16,
    pub country: u8,
    pub num_descriptors: u8,
    pub descriptor_list: [DescriptorListEntry; 1],
}

impl HidDescriptor {
    /// Wire size of the descriptor
    pub const SIZE: usize = core::mem::size_of::<HidDescriptor>();

    /// Descriptor announcing a single report descriptor of `report_length` bytes
    pub fn new(report_length: u16) -> Self {
        Self {
            length: Self::SIZE as u8,
            descriptor_type: HID_DESCRIPTOR_TYPE,
            hid_version: U16::new(HID_VERSION),
            country: 0,
            num_descriptors: 1,
            descriptor_list: [DescriptorListEntry {
                report_type: REPORT_DESCRIPTOR_TYPE,
                report_length: U16::new(report_length),
            }],
        }
    }

    /// Declared descriptor length (`bLength`)
    pub fn declared_length(&self) -> usize {
        usize::from(self.length)
    }

    /// Length of the first report descriptor (`DescriptorList[0].wReportLength`)
    pub fn report_length(&self) -> usize {
        usize::from(self.descriptor_list[0].report_length.get())
    }
}

/// HID device attributes (32 bytes on the wire)
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoBytes, FromBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
pub struct DeviceAttributes {
    pub size: U32,
    pub vendor_id: U16,
    pub product_id: U16,
    pub version_number: U16,
    reserved: [U16; 11],
}

impl DeviceAttributes {
    /// Wire size of the attributes struct
    pub const SIZE: usize = core::mem::size_of::<DeviceAttributes>();

    pub fn new(vendor_id: u16, product_id: u16, version_number: u16) -> Self {
        Self {
            size: U32::new(Self::SIZE as u32),
            vendor_id: U16::new(vendor_id),
            product_id: U16::new(product_id),
            version_number: U16::new(version_number),
            reserved: [U16::new(0); 11],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hid_descriptor_layout() {
        assert_eq!(HidDescriptor::SIZE, 9);
        let desc = HidDescriptor::new(63);
        assert_eq!(
            desc.as_bytes(),
            &[0x09, 0x21, 0x00, 0x01, 0x00, 0x01, 0x22, 63, 0x00]
        );
        assert_eq!(desc.declared_length(), 9);
        assert_eq!(desc.report_length(), 63);
    }

    #[test]
    fn test_attributes_layout() {
        assert_eq!(DeviceAttributes::SIZE, 32);
        let attrs = DeviceAttributes::new(0xDEED, 0xFEED, 0x0101);
        let bytes = attrs.as_bytes();
        assert_eq!(&bytes[..4], &[32, 0, 0, 0]);
        assert_eq!(&bytes[4..10], &[0xED, 0xDE, 0xED, 0xFE, 0x01, 0x01]);
        assert!(bytes[10..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_descriptor_parses_back() {
        let bytes = HidDescriptor::new(300).as_bytes().to_vec();
        let parsed = HidDescriptor::read_from_bytes(&bytes).unwrap();
        assert_eq!(parsed.report_length(), 300);
    }
}
