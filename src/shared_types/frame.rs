use std::{
    fmt,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use super::FrameDirection;

// -----------------------------------------------------------------------------
// ----- FrameId ---------------------------------------------------------------

/// Capture-local frame number. Unique and ascending within one capture, so it
/// is the correlation key for everything this crate records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FrameId(pub u32);

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// -----------------------------------------------------------------------------
// ----- FrameTimestamp --------------------------------------------------------

/// Absolute capture time, stored as the offset from the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct FrameTimestamp(Duration);

impl FrameTimestamp {
    pub fn new(secs: u64, micros: u32) -> Self {
        Self(Duration::from_secs(secs) + Duration::from_micros(u64::from(micros)))
    }

    pub fn since_epoch(&self) -> Duration {
        self.0
    }

    pub fn to_system_time(&self) -> SystemTime {
        UNIX_EPOCH + self.0
    }
}

impl fmt::Display for FrameTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", humantime::format_rfc3339_micros(self.to_system_time()))
    }
}

// -----------------------------------------------------------------------------
// ----- FrameInfo -------------------------------------------------------------

/// Per-frame metadata supplied by whoever reads the capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameInfo {
    pub id: FrameId,
    pub direction: FrameDirection,
    pub timestamp: FrameTimestamp,
}

impl FrameInfo {
    pub fn new(id: u32, direction: FrameDirection, timestamp: FrameTimestamp) -> Self {
        Self {
            id: FrameId(id),
            direction,
            timestamp,
        }
    }
}

// -----------------------------------------------------------------------------
// ----- ConversationId --------------------------------------------------------

/// Opaque handle for a transport session, assigned by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConversationId(pub u64);

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conv-{}", self.0)
    }
}

// -----------------------------------------------------------------------------
// ----- Tests -----------------------------------------------------------------


// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
