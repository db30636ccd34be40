use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("cannot open capture {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed capture: {0}")]
    Format(String),

    #[error("record {frame} needs more than {limit} bytes of buffer")]
    RecordTooLarge { frame: u32, limit: usize },

    #[error("unsupported link type {0}; expected a Linux usbmon capture (189 or 220)")]
    UnsupportedLinkType(i32),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UsbmonError {
    #[error("usbmon header truncated: need {needed} bytes, got {got}")]
    TooShort { needed: usize, got: usize },

    #[error("unknown URB event type {0:#04x}")]
    UnknownEvent(u8),

    #[error("unsupported link type {0}")]
    UnsupportedLinkType(i32),
}
