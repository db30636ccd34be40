// -----------------------------------------------------------------------------
// ----- Constants -------------------------------------------------------------

/// Wire value used when no command set has been discovered yet.
pub const UNKNOWN_COMMAND_SET: u8 = 0xff;

// -----------------------------------------------------------------------------
// ----- CommandSet ------------------------------------------------------------

/// SCSI command set spoken by a logical unit (the peripheral device type from
/// INQUIRY, as far as the CDB interpreter is concerned).
///
/// Also used as the device-class hint handed to the CDB dispatcher. The
/// transport never knows the command set, so it always passes `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CommandSet {
    /// SBC: direct access block device.
    Sbc,

    /// SSC: sequential access (tape).
    Ssc,

    /// MMC: CD/DVD.
    Mmc,

    /// SMC: medium changer.
    Smc,

    /// OSD: object storage.
    Osd,

    /// Not discovered yet. Encodes as `0xff`.
    #[default]
    Unknown,
}

// -----------------------------------------------------------------------------
// ----- CommandSet: Static ----------------------------------------------------

impl CommandSet {
    pub fn from_wire(value: u8) -> Self {
        match value {
            0x00 => CommandSet::Sbc,
            0x01 => CommandSet::Ssc,
            0x05 => CommandSet::Mmc,
            0x08 => CommandSet::Smc,
            0x11 => CommandSet::Osd,
            _ => CommandSet::Unknown,
        }
    }
}

// -----------------------------------------------------------------------------
// ----- CommandSet: Public ----------------------------------------------------

impl CommandSet {
    pub fn as_wire(self) -> u8 {
        match self {
            CommandSet::Sbc => 0x00,
            CommandSet::Ssc => 0x01,
            CommandSet::Mmc => 0x05,
            CommandSet::Smc => 0x08,
            CommandSet::Osd => 0x11,
            CommandSet::Unknown => UNKNOWN_COMMAND_SET,
        }
    }

    pub fn is_known(self) -> bool {
        self != CommandSet::Unknown
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CommandSet::Sbc => "sbc",
            CommandSet::Ssc => "ssc",
            CommandSet::Mmc => "mmc",
            CommandSet::Smc => "smc",
            CommandSet::Osd => "osd",
            CommandSet::Unknown => "unknown",
        }
    }
}

// -----------------------------------------------------------------------------
// ----- Tests -----------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_uses_wire_sentinel() {
        assert_eq!(CommandSet::Unknown.as_wire(), 0xff);
        assert_eq!(CommandSet::from_wire(0xff), CommandSet::Unknown);
        assert_eq!(CommandSet::default(), CommandSet::Unknown);
    }

    #[test]
    fn reserved_device_types_fold_into_unknown() {
        assert_eq!(CommandSet::from_wire(0x1e), CommandSet::Unknown);
        assert!(!CommandSet::from_wire(0x1e).is_known());
    }

    #[test]
    fn known_sets_map_back_to_device_type() {
        for set in [CommandSet::Sbc, CommandSet::Ssc, CommandSet::Mmc, CommandSet::Smc, CommandSet::Osd] {
            assert_eq!(CommandSet::from_wire(set.as_wire()), set);
        }
    }
}

// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
