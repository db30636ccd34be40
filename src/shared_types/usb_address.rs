use serde::Deserialize;
use std::fmt;

// -----------------------------------------------------------------------------
// ----- UsbAddress ------------------------------------------------------------

/// Bus and device number of a USB device, as usbmon reports them.
///
/// Every endpoint of one device maps to a single mass storage conversation, so
/// command, data and status phases land in the same tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
pub struct UsbAddress {
    pub bus: u16,
    pub device: u8,
}

impl fmt::Display for UsbAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.bus, self.device)
    }
}
