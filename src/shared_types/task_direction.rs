// -----------------------------------------------------------------------------
// ----- Constants -------------------------------------------------------------

/// Bit 7 of `bmCBWFlags`: data flows device-to-host.
pub const CBW_FLAG_DATA_IN: u8 = 0x80;

// -----------------------------------------------------------------------------
// ----- TaskDirection ---------------------------------------------------------

/// Direction of the data phase that follows a command wrapper.
///
/// The direction bit is only meaningful when the host expects to move data, so
/// a zero transfer length always yields `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskDirection {
    /// Device-to-host (data-in).
    Read,

    /// Host-to-device (data-out).
    Write,

    /// No data phase.
    None,
}

// -----------------------------------------------------------------------------
// ----- TaskDirection: Static -------------------------------------------------

impl TaskDirection {
    pub fn derive(data_length: u32, flags: u8) -> Self {
        if data_length == 0 {
            return TaskDirection::None;
        }

        if flags & CBW_FLAG_DATA_IN != 0 {
            TaskDirection::Read
        } else {
            TaskDirection::Write
        }
    }
}

// -----------------------------------------------------------------------------
// ----- TaskDirection: Public -------------------------------------------------

impl TaskDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskDirection::Read => "read",
            TaskDirection::Write => "write",
            TaskDirection::None => "none",
        }
    }
}

// -----------------------------------------------------------------------------
// ----- Tests -----------------------------------------------------------------


// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
