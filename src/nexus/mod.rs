pub mod conversation;
pub mod itl;
pub mod itlq;

pub use conversation::{MassStorageConversation, UsbConversation};
pub use itl::{LunNexus, LunNexusTable};
pub use itlq::{QueueNexus, QueueNexusSeed, QueueNexusTable, UNKNOWN_OPCODE};
