pub mod error;
pub mod pipeline;
pub mod reader;
pub mod report;
pub mod usbmon;

pub use error::{CaptureError, UsbmonError};
pub use pipeline::{CaptureDissector, dissect_capture};
pub use reader::{CaptureReader, CapturedPacket};
pub use report::{CaptureReport, ConversationReport};
pub use usbmon::{UsbmonHeader, UsbmonPacket};
