pub mod analytics;
pub mod capture;
pub mod config;
pub mod dissector;
pub mod nexus;
pub mod scsi;
pub mod shared_types;
pub mod wire_protocol;

pub use capture::{CaptureDissector, CaptureReport, dissect_capture};
pub use config::Config;
pub use dissector::{CdbDispatcher, CommandSummary, MassStorageDissector};
pub use nexus::{LunNexus, MassStorageConversation, QueueNexus, UsbConversation};
