//! Module: wire_protocol::frames::command_block_wrapper
//!
//! Strict parsing and serialization for the Bulk-Only Transport command block
//! wrapper (CBW).
//!
//! - `CommandBlockWrapperFrame`: owned-field view of a 31-byte wrapper.
//! - `CbwError`: error types for parsing and encoding.
//!
//! The dissector itself goes through `CommandBlockWrapperObserver`, which never
//! fails. This frame is for building wrappers and for callers that want a hard
//! error on anything malformed.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use std::{error::Error as StdError, fmt};

use crate::wire_protocol::{
    CBW_CB_LENGTH_MASK, CBW_LENGTH, CBW_LUN_MASK, CBW_MAX_CDB_LENGTH, CBW_SIGNATURE,
    WireSerializable, observers::CommandBlockWrapperObserver,
};

// -----------------------------------------------------------------------------
// ----- CommandBlockWrapperFrame ----------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandBlockWrapperFrame<'a> {
    pub tag: u32,
    pub data_transfer_length: u32,
    pub flags: u8,
    pub lun: u8,
    /// Declared length. May exceed `cdb.len()` for a wrapper that lies.
    pub cb_length: u8,
    pub cdb: &'a [u8],
}

// -----------------------------------------------------------------------------
// ----- Error -----------------------------------------------------------------

#[derive(Debug)]
pub enum CbwError {
    InvalidLength(usize),
    InvalidSignature(u32),
    CdbTooLong(usize),
    InvalidLun(u8),
}

impl fmt::Display for CbwError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CbwError::InvalidLength(len) => write!(f, "invalid wrapper length: {len}"),
            CbwError::InvalidSignature(sig) => write!(f, "invalid signature: {sig:#010x}"),
            CbwError::CdbTooLong(len) => write!(f, "command block too long: {len}"),
            CbwError::InvalidLun(lun) => write!(f, "LUN out of range: {lun}"),
        }
    }
}

impl StdError for CbwError {}

// -----------------------------------------------------------------------------
// ----- CommandBlockWrapperFrame: Static --------------------------------------

impl<'a> CommandBlockWrapperFrame<'a> {
    /// Wrapper whose declared length matches the command block exactly.
    pub fn new(tag: u32, data_transfer_length: u32, flags: u8, lun: u8, cdb: &'a [u8]) -> Self {
        Self {
            tag,
            data_transfer_length,
            flags,
            lun,
            cb_length: cdb.len() as u8,
            cdb,
        }
    }
}

// -----------------------------------------------------------------------------
// ----- WireSerializable ------------------------------------------------------

impl<'a> WireSerializable<'a> for CommandBlockWrapperFrame<'a> {
    type Error = CbwError;

    fn peek(buf: &[u8]) -> Option<usize> {
        CommandBlockWrapperObserver::peek(buf)
    }

    fn from_bytes(mut bytes: &'a [u8]) -> Result<Self, Self::Error> {
        if bytes.remaining() != CBW_LENGTH {
            return Err(CbwError::InvalidLength(bytes.remaining()));
        }

        let signature = bytes.get_u32_le();
        if signature != CBW_SIGNATURE {
            return Err(CbwError::InvalidSignature(signature));
        }

        let tag = bytes.get_u32_le();
        let data_transfer_length = bytes.get_u32_le();
        let flags = bytes.get_u8();
        let lun = bytes.get_u8() & CBW_LUN_MASK;
        let cb_length = bytes.get_u8() & CBW_CB_LENGTH_MASK;

        let captured = usize::from(cb_length).min(bytes.len());
        let cdb = &bytes[..captured];

        Ok(CommandBlockWrapperFrame {
            tag,
            data_transfer_length,
            flags,
            lun,
            cb_length,
            cdb,
        })
    }

    fn to_bytes(&self) -> Result<Bytes, Self::Error> {
        if self.cdb.len() > CBW_MAX_CDB_LENGTH {
            return Err(CbwError::CdbTooLong(self.cdb.len()));
        }
        if self.lun > CBW_LUN_MASK {
            return Err(CbwError::InvalidLun(self.lun));
        }

        let mut frame = BytesMut::with_capacity(CBW_LENGTH);
        frame.put_u32_le(CBW_SIGNATURE);
        frame.put_u32_le(self.tag);
        frame.put_u32_le(self.data_transfer_length);
        frame.put_u8(self.flags);
        frame.put_u8(self.lun);
        frame.put_u8(self.cb_length & CBW_CB_LENGTH_MASK);
        frame.extend_from_slice(self.cdb);
        frame.put_bytes(0, CBW_MAX_CDB_LENGTH - self.cdb.len()); // CBWCB padding

        Ok(frame.freeze())
    }

    fn body_size(&self) -> usize {
        CBW_LENGTH
    }
}

// -----------------------------------------------------------------------------
// ----- Tests -----------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const READ_10: [u8; 10] = [0x28, 0, 0, 0, 0x10, 0, 0, 0, 0x01, 0];

    #[test]
    fn encodes_to_exactly_31_bytes() {
        let frame = CommandBlockWrapperFrame::new(7, 512, 0x80, 1, &READ_10);
        let encoded = frame.to_bytes().unwrap();
        assert_eq!(encoded.len(), CBW_LENGTH);
        assert_eq!(&encoded[0..4], b"USBC");
        assert_eq!(encoded[14], 10);
        assert_eq!(&encoded[15..25], &READ_10);
        assert!(encoded[25..].iter().all(|b| *b == 0));
    }

    #[test]
    fn decodes_with_padding_stripped() {
        let encoded = CommandBlockWrapperFrame::new(7, 512, 0x80, 1, &READ_10)
            .to_bytes()
            .unwrap();
        let decoded = CommandBlockWrapperFrame::from_bytes(&encoded).unwrap();
        assert_eq!(decoded.tag, 7);
        assert_eq!(decoded.lun, 1);
        assert_eq!(decoded.cdb, &READ_10);
    }

    #[test]
    fn rejects_short_buffer() {
        let err = CommandBlockWrapperFrame::from_bytes(&[0u8; 13]).unwrap_err();
        assert!(matches!(err, CbwError::InvalidLength(13)));
    }

    #[test]
    fn rejects_wrong_signature() {
        let mut raw = CommandBlockWrapperFrame::new(7, 0, 0, 0, &[0x00; 6])
            .to_bytes()
            .unwrap()
            .to_vec();
        raw[3] = b'S';
        let err = CommandBlockWrapperFrame::from_bytes(&raw).unwrap_err();
        assert!(matches!(err, CbwError::InvalidSignature(0x5342_5355)));
    }

    #[test]
    fn refuses_to_encode_oversized_cdb() {
        let long = [0u8; 17];
        let err = CommandBlockWrapperFrame::new(1, 0, 0, 0, &long)
            .to_bytes()
            .unwrap_err();
        assert!(matches!(err, CbwError::CdbTooLong(17)));
    }

    #[test]
    fn refuses_to_encode_wide_lun() {
        let err = CommandBlockWrapperFrame::new(1, 0, 0, 16, &[0u8; 6])
            .to_bytes()
            .unwrap_err();
        assert!(matches!(err, CbwError::InvalidLun(16)));
    }

    #[test]
    fn lying_declared_length_keeps_declared_value() {
        let mut frame = CommandBlockWrapperFrame::new(1, 0, 0, 0, &READ_10);
        frame.cb_length = 31;
        let encoded = frame.to_bytes().unwrap();
        let decoded = CommandBlockWrapperFrame::from_bytes(&encoded).unwrap();
        assert_eq!(decoded.cb_length, 31);
        assert_eq!(decoded.cdb.len(), CBW_MAX_CDB_LENGTH);
    }
}

// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
