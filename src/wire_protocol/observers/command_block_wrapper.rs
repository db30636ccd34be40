// src/wire_protocol/observers/command_block_wrapper.rs
use std::fmt;

use crate::shared_types::{CdbLength, FrameDirection, TaskDirection};
use crate::wire_protocol::{
    CBW_CB_LENGTH_MASK, CBW_HEADER_LENGTH, CBW_LENGTH, CBW_LUN_MASK, CBW_SIGNATURE,
};

// -----------------------------------------------------------------------------
// ----- CommandBlockWrapperObserver -------------------------------------------

/// Zero-copy view over a recognized command block wrapper.
///
/// Recognition is lenient on purpose: the same bulk pipe also carries data and
/// status phases, so anything that is not a wrapper is simply not observed.
#[derive(Clone, Copy, Debug)]
pub struct CommandBlockWrapperObserver<'a> {
    frame: &'a [u8],
}

// -----------------------------------------------------------------------------
// ----- CommandBlockWrapperObserver: Static -----------------------------------

impl<'a> CommandBlockWrapperObserver<'a> {
    /// Cheap length + signature check. Returns the wrapper length on a match.
    #[inline]
    pub fn peek(buf: &[u8]) -> Option<usize> {
        if buf.len() != CBW_LENGTH {
            return None;
        }
        if le_u32(&buf[0..]) != CBW_SIGNATURE {
            return None;
        }
        Some(CBW_LENGTH)
    }

    /// Only host-originated frames can carry a wrapper.
    pub fn recognize(direction: FrameDirection, buf: &'a [u8]) -> Option<Self> {
        if !direction.is_request() {
            return None;
        }
        Self::peek(buf)?;
        Some(Self { frame: buf })
    }
}

// -----------------------------------------------------------------------------
// ----- CommandBlockWrapperObserver: Public -----------------------------------

impl<'a> CommandBlockWrapperObserver<'a> {
    #[inline]
    pub fn signature(&self) -> u32 {
        le_u32(&self.frame[0..])
    }

    /// Echoed back by the device in the status wrapper. Not interpreted here.
    #[inline]
    pub fn tag(&self) -> u32 {
        le_u32(&self.frame[4..])
    }

    #[inline]
    pub fn data_transfer_length(&self) -> u32 {
        le_u32(&self.frame[8..])
    }

    #[inline]
    pub fn flags(&self) -> u8 {
        self.frame[12]
    }

    #[inline]
    pub fn lun(&self) -> u8 {
        self.frame[13] & CBW_LUN_MASK
    }

    /// Declared command block length, unclamped.
    #[inline]
    pub fn cb_length(&self) -> u8 {
        self.frame[14] & CBW_CB_LENGTH_MASK
    }

    pub fn cdb_length(&self) -> CdbLength {
        let available = self.frame.len().saturating_sub(CBW_HEADER_LENGTH);
        CdbLength::clamp(self.cb_length(), available)
    }

    /// The command block bytes actually present, clamped to the buffer.
    pub fn cdb(&self) -> &'a [u8] {
        let captured = usize::from(self.cdb_length().captured);
        &self.frame[CBW_HEADER_LENGTH..CBW_HEADER_LENGTH + captured]
    }

    pub fn task_direction(&self) -> TaskDirection {
        TaskDirection::derive(self.data_transfer_length(), self.flags())
    }
}

impl fmt::Display for CommandBlockWrapperObserver<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Signature: {:#010x}, Tag: {:#010x}, DataTransferLength: {}, Flags: {:#04x}, LUN: {:#x}, CDB Length: {:#04x}",
            self.signature(),
            self.tag(),
            self.data_transfer_length(),
            self.flags(),
            self.lun(),
            self.cb_length(),
        )
    }
}

// -----------------------------------------------------------------------------
// ----- Internal: Helpers -----------------------------------------------------

#[inline]
fn le_u32(x: &[u8]) -> u32 {
    u32::from_le_bytes([x[0], x[1], x[2], x[3]])
}

// -----------------------------------------------------------------------------
// ----- Tests -----------------------------------------------------------------


// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
