//! SCSI operation codes seen on USB mass storage devices.
//!
//! SPC-3 for the primary commands, SBC-3 for the block commands. Only the
//! subset that shows up in practice over Bulk-Only Transport is named.

// -----------------------------------------------------------------------------
// ----- ScsiOpcode ------------------------------------------------------------

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScsiOpcode {
    TestUnitReady = 0x00,
    RequestSense = 0x03,
    Inquiry = 0x12,
    ModeSelect6 = 0x15,
    ModeSense6 = 0x1a,
    StartStopUnit = 0x1b,
    PreventAllowMediumRemoval = 0x1e,
    ReadFormatCapacities = 0x23,
    ReadCapacity10 = 0x25,
    Read10 = 0x28,
    Write10 = 0x2a,
    Verify10 = 0x2f,
    SynchronizeCache10 = 0x35,
    ModeSense10 = 0x5a,
    Read16 = 0x88,
    Write16 = 0x8a,
    ServiceActionIn16 = 0x9e,
    ReportLuns = 0xa0,
    Read12 = 0xa8,
    Write12 = 0xaa,
}

// -----------------------------------------------------------------------------
// ----- ScsiOpcode: Static ----------------------------------------------------

impl ScsiOpcode {
    pub fn from_u8(val: u8) -> Option<Self> {
        use ScsiOpcode::*;
        let opcode = match val {
            0x00 => TestUnitReady,
            0x03 => RequestSense,
            0x12 => Inquiry,
            0x15 => ModeSelect6,
            0x1a => ModeSense6,
            0x1b => StartStopUnit,
            0x1e => PreventAllowMediumRemoval,
            0x23 => ReadFormatCapacities,
            0x25 => ReadCapacity10,
            0x28 => Read10,
            0x2a => Write10,
            0x2f => Verify10,
            0x35 => SynchronizeCache10,
            0x5a => ModeSense10,
            0x88 => Read16,
            0x8a => Write16,
            0x9e => ServiceActionIn16,
            0xa0 => ReportLuns,
            0xa8 => Read12,
            0xaa => Write12,
            _ => return None,
        };
        Some(opcode)
    }
}

// -----------------------------------------------------------------------------
// ----- ScsiOpcode: Public ----------------------------------------------------

impl ScsiOpcode {
    pub fn name(self) -> &'static str {
        use ScsiOpcode::*;
        match self {
            TestUnitReady => "TEST UNIT READY",
            RequestSense => "REQUEST SENSE",
            Inquiry => "INQUIRY",
            ModeSelect6 => "MODE SELECT(6)",
            ModeSense6 => "MODE SENSE(6)",
            StartStopUnit => "START STOP UNIT",
            PreventAllowMediumRemoval => "PREVENT ALLOW MEDIUM REMOVAL",
            ReadFormatCapacities => "READ FORMAT CAPACITIES",
            ReadCapacity10 => "READ CAPACITY(10)",
            Read10 => "READ(10)",
            Write10 => "WRITE(10)",
            Verify10 => "VERIFY(10)",
            SynchronizeCache10 => "SYNCHRONIZE CACHE(10)",
            ModeSense10 => "MODE SENSE(10)",
            Read16 => "READ(16)",
            Write16 => "WRITE(16)",
            ServiceActionIn16 => "SERVICE ACTION IN(16)",
            ReportLuns => "REPORT LUNS",
            Read12 => "READ(12)",
            Write12 => "WRITE(12)",
        }
    }

    /// Commands that only make sense for a direct access block device.
    pub fn is_block_command(self) -> bool {
        use ScsiOpcode::*;
        matches!(
            self,
            ReadCapacity10
                | Read10
                | Write10
                | Verify10
                | SynchronizeCache10
                | Read16
                | Write16
                | ServiceActionIn16
                | Read12
                | Write12
        )
    }

    /// ALLOCATION LENGTH from the CDB, for commands that carry one.
    ///
    /// Returns `None` when the opcode has no such field or the CDB is too
    /// short to hold it.
    pub fn allocation_length(self, cdb: &[u8]) -> Option<u32> {
        use ScsiOpcode::*;
        match self {
            RequestSense | ModeSense6 => cdb.get(4).map(|b| u32::from(*b)),
            Inquiry => be_u16_at(cdb, 3),
            ModeSense10 | ReadFormatCapacities => be_u16_at(cdb, 7),
            ReportLuns => be_u32_at(cdb, 6),
            ServiceActionIn16 => be_u32_at(cdb, 10),
            _ => None,
        }
    }
}

/// Display name for any opcode byte, named or not.
pub fn opcode_name(opcode: u8) -> &'static str {
    ScsiOpcode::from_u8(opcode)
        .map(ScsiOpcode::name)
        .unwrap_or("UNKNOWN")
}

// -----------------------------------------------------------------------------
// ----- Internal: Helpers -----------------------------------------------------

#[inline]
fn be_u16_at(buf: &[u8], at: usize) -> Option<u32> {
    let b = buf.get(at..at + 2)?;
    Some(u32::from(u16::from_be_bytes([b[0], b[1]])))
}

#[inline]
fn be_u32_at(buf: &[u8], at: usize) -> Option<u32> {
    let b = buf.get(at..at + 4)?;
    Some(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
}

// -----------------------------------------------------------------------------
// ----- Tests -----------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_the_opcode_byte() {
        for byte in 0..=u8::MAX {
            if let Some(op) = ScsiOpcode::from_u8(byte) {
                assert_eq!(op as u8, byte);
            }
        }
    }

    #[test]
    fn names_unknown_bytes() {
        assert_eq!(opcode_name(0x28), "READ(10)");
        assert_eq!(opcode_name(0xff), "UNKNOWN");
    }

    #[test]
    fn inquiry_allocation_length_is_big_endian() {
        let cdb = [0x12, 0x00, 0x00, 0x01, 0x00, 0x00];
        assert_eq!(ScsiOpcode::Inquiry.allocation_length(&cdb), Some(0x100));
    }

    #[test]
    fn allocation_length_needs_enough_bytes() {
        assert_eq!(ScsiOpcode::ReportLuns.allocation_length(&[0xa0, 0, 0]), None);
        assert_eq!(ScsiOpcode::Read10.allocation_length(&[0x28; 10]), None);
    }

    #[test]
    fn block_commands_are_flagged() {
        assert!(ScsiOpcode::Read10.is_block_command());
        assert!(!ScsiOpcode::Inquiry.is_block_command());
    }
}

// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
