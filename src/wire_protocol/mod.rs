pub mod frames;
pub mod observers;
pub mod wire_serializable;

pub use frames::CommandBlockWrapperFrame;
pub use observers::CommandBlockWrapperObserver;
pub use wire_serializable::WireSerializable;

// -----------------------------------------------------------------------------
// ----- Constants -------------------------------------------------------------

/// `dCBWSignature`, "USBC" read little-endian.
pub const CBW_SIGNATURE: u32 = 0x4342_5355;

/// A command block wrapper is always exactly this long.
pub const CBW_LENGTH: usize = 31;

/// Signature, tag, transfer length, flags, LUN and CB length.
pub const CBW_HEADER_LENGTH: usize = 15;

/// Room for the command block inside a well-formed wrapper.
pub const CBW_MAX_CDB_LENGTH: usize = CBW_LENGTH - CBW_HEADER_LENGTH;

pub const CBW_LUN_MASK: u8 = 0x0f;
pub const CBW_CB_LENGTH_MASK: u8 = 0x1f;
