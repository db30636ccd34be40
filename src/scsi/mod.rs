pub mod opcode;
pub mod recorder;

pub use opcode::{ScsiOpcode, opcode_name};
pub use recorder::{DispatchedCommand, OpcodeRecorder};
