// -----------------------------------------------------------------------------
// ----- CdbLength -------------------------------------------------------------

/// Both views of a command block length.
///
/// `declared` is what `bCBWCBLength` says (low 5 bits). `captured` is how many
/// of those bytes are actually present in the buffer. Display and logging use
/// `declared`; the dispatcher only ever sees `captured` bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CdbLength {
    pub declared: u8,
    pub captured: u8,
}

// -----------------------------------------------------------------------------
// ----- CdbLength: Static -----------------------------------------------------

impl CdbLength {
    pub fn clamp(declared: u8, available: usize) -> Self {
        let captured = usize::from(declared).min(available) as u8;
        Self { declared, captured }
    }
}

// -----------------------------------------------------------------------------
// ----- CdbLength: Public -----------------------------------------------------

impl CdbLength {
    pub fn is_truncated(&self) -> bool {
        self.captured < self.declared
    }

    pub fn is_empty(&self) -> bool {
        self.captured == 0
    }
}

// -----------------------------------------------------------------------------
// ----- Tests -----------------------------------------------------------------


// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
