//! Linux usbmon pseudo-header.
//!
//! Link type 189 prefixes every packet with a 48-byte header, link type 220
//! (memory-mapped usbmon) with a 64-byte one. Fields are in the capturing
//! host's byte order, which is little-endian on every platform usbmon ships on.

use bytes::Buf;

use crate::capture::error::UsbmonError;
use crate::shared_types::{FrameDirection, UsbAddress};

// -----------------------------------------------------------------------------
// ----- Constants -------------------------------------------------------------

pub const LINKTYPE_USB_LINUX: i32 = 189;
pub const LINKTYPE_USB_LINUX_MMAPPED: i32 = 220;

const HEADER_LENGTH: usize = 48;
const HEADER_LENGTH_MMAPPED: usize = 64;

const ENDPOINT_DIR_IN: u8 = 0x80;

// -----------------------------------------------------------------------------
// ----- UrbEvent --------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrbEvent {
    Submit,
    Complete,
    Error,
}

impl UrbEvent {
    fn from_byte(b: u8) -> Result<Self, UsbmonError> {
        match b {
            b'S' => Ok(UrbEvent::Submit),
            b'C' => Ok(UrbEvent::Complete),
            b'E' => Ok(UrbEvent::Error),
            other => Err(UsbmonError::UnknownEvent(other)),
        }
    }
}

// -----------------------------------------------------------------------------
// ----- TransferType ----------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferType {
    Isochronous,
    Interrupt,
    Control,
    Bulk,
    Other(u8),
}

impl From<u8> for TransferType {
    fn from(b: u8) -> Self {
        match b {
            0 => TransferType::Isochronous,
            1 => TransferType::Interrupt,
            2 => TransferType::Control,
            3 => TransferType::Bulk,
            other => TransferType::Other(other),
        }
    }
}

// -----------------------------------------------------------------------------
// ----- UsbmonHeader ----------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsbmonHeader {
    pub urb_id: u64,
    pub event: UrbEvent,
    pub transfer_type: TransferType,
    /// Endpoint address, direction bit included.
    pub endpoint: u8,
    pub device: u8,
    pub bus: u16,
    pub data_present: bool,
    pub status: i32,
    pub urb_length: u32,
    pub data_length: u32,
}

impl UsbmonHeader {
    pub fn address(&self) -> UsbAddress {
        UsbAddress {
            bus: self.bus,
            device: self.device,
        }
    }

    pub fn is_in(&self) -> bool {
        self.endpoint & ENDPOINT_DIR_IN != 0
    }

    /// A submission on an OUT endpoint is the host talking; everything else is
    /// the device's side of the exchange.
    pub fn direction(&self) -> FrameDirection {
        if self.event == UrbEvent::Submit && !self.is_in() {
            FrameDirection::Request
        } else {
            FrameDirection::Response
        }
    }
}

// -----------------------------------------------------------------------------
// ----- UsbmonPacket ----------------------------------------------------------

#[derive(Debug, Clone, Copy)]
pub struct UsbmonPacket<'a> {
    pub header: UsbmonHeader,
    pub payload: &'a [u8],
}

impl<'a> UsbmonPacket<'a> {
    pub fn parse(link_type: i32, bytes: &'a [u8]) -> Result<Self, UsbmonError> {
        let header_length = match link_type {
            LINKTYPE_USB_LINUX => HEADER_LENGTH,
            LINKTYPE_USB_LINUX_MMAPPED => HEADER_LENGTH_MMAPPED,
            other => return Err(UsbmonError::UnsupportedLinkType(other)),
        };

        if bytes.len() < header_length {
            return Err(UsbmonError::TooShort {
                needed: header_length,
                got: bytes.len(),
            });
        }

        let mut buf = &bytes[..header_length];
        let urb_id = buf.get_u64_le();
        let event = UrbEvent::from_byte(buf.get_u8())?;
        let transfer_type = TransferType::from(buf.get_u8());
        let endpoint = buf.get_u8();
        let device = buf.get_u8();
        let bus = buf.get_u16_le();
        let _flag_setup = buf.get_u8();
        let flag_data = buf.get_u8();
        let _ts_sec = buf.get_i64_le();
        let _ts_usec = buf.get_i32_le();
        let status = buf.get_i32_le();
        let urb_length = buf.get_u32_le();
        let data_length = buf.get_u32_le();

        let header = UsbmonHeader {
            urb_id,
            event,
            transfer_type,
            endpoint,
            device,
            bus,
            data_present: flag_data == 0,
            status,
            urb_length,
            data_length,
        };

        // The capture may have been cut short by the snap length.
        let rest = &bytes[header_length..];
        let payload = if header.data_present {
            let len = (data_length as usize).min(rest.len());
            &rest[..len]
        } else {
            &rest[..0]
        };

        Ok(Self { header, payload })
    }
}

// -----------------------------------------------------------------------------
// ----- Tests -----------------------------------------------------------------


// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
