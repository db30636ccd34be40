pub mod cdb_length;
pub mod command_set;
pub mod frame;
pub mod frame_direction;
pub mod task_direction;
pub mod usb_address;

pub use cdb_length::CdbLength;
pub use command_set::CommandSet;
pub use frame::{ConversationId, FrameId, FrameInfo, FrameTimestamp};
pub use frame_direction::FrameDirection;
pub use task_direction::TaskDirection;
pub use usb_address::UsbAddress;
