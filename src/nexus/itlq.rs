use std::{any::Any, collections::BTreeMap, fmt};

use tracing::debug;

use crate::shared_types::{CdbLength, FrameId, FrameInfo, FrameTimestamp, TaskDirection};
use crate::wire_protocol::{CBW_LUN_MASK, CommandBlockWrapperObserver};

// -----------------------------------------------------------------------------
// ----- Constants -------------------------------------------------------------

/// Wire value for an opcode the CDB interpreter has not determined yet.
pub const UNKNOWN_OPCODE: u16 = 0xffff;

// -----------------------------------------------------------------------------
// ----- QueueNexus ------------------------------------------------------------

/// Initiator-target-LUN-queue record: one in-flight command.
///
/// `lun`, `task_direction`, `data_length`, `first_frame` and `cdb_length` are
/// fixed when the command wrapper is first seen. `opcode`, `last_frame`,
/// `flags` and `extra` belong to the CDB interpreter and whatever handles the
/// data and status phases.
pub struct QueueNexus {
    pub lun: u8,
    pub opcode: Option<u8>,
    pub task_direction: TaskDirection,
    pub data_length: u32,
    pub bidirectional_data_length: u32,
    pub start_time: FrameTimestamp,
    pub first_frame: FrameId,
    pub last_frame: Option<FrameId>,
    pub flags: u32,
    pub allocation_length: u32,
    pub cdb_length: CdbLength,
    pub extra: Option<Box<dyn Any + Send>>,
}

/// Creation parameters for a queue nexus, as read from a command wrapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueNexusSeed {
    pub lun: u8,
    pub data_length: u32,
    pub flags: u8,
    pub cdb_length: CdbLength,
}

// -----------------------------------------------------------------------------
// ----- QueueNexus: Public ----------------------------------------------------

impl QueueNexus {
    /// Opcode in its wire form, `0xffff` while unknown.
    pub fn opcode_wire(&self) -> u16 {
        self.opcode.map(u16::from).unwrap_or(UNKNOWN_OPCODE)
    }

    pub fn extra_ref<T: Any>(&self) -> Option<&T> {
        self.extra.as_deref().and_then(|v| v.downcast_ref::<T>())
    }
}

impl fmt::Debug for QueueNexus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueueNexus")
            .field("lun", &self.lun)
            .field("opcode", &self.opcode)
            .field("task_direction", &self.task_direction)
            .field("data_length", &self.data_length)
            .field("bidirectional_data_length", &self.bidirectional_data_length)
            .field("start_time", &self.start_time)
            .field("first_frame", &self.first_frame)
            .field("last_frame", &self.last_frame)
            .field("flags", &self.flags)
            .field("allocation_length", &self.allocation_length)
            .field("cdb_length", &self.cdb_length)
            .field("extra", &self.extra.as_ref().map(|_| ".."))
            .finish()
    }
}

impl<'a> From<&CommandBlockWrapperObserver<'a>> for QueueNexusSeed {
    fn from(cbw: &CommandBlockWrapperObserver<'a>) -> Self {
        Self {
            lun: cbw.lun(),
            data_length: cbw.data_transfer_length(),
            flags: cbw.flags(),
            cdb_length: cbw.cdb_length(),
        }
    }
}

// -----------------------------------------------------------------------------
// ----- QueueNexusTable -------------------------------------------------------

/// Frame-indexed store of queue nexus records. Append-only.
#[derive(Debug, Default)]
pub struct QueueNexusTable {
    by_frame: BTreeMap<FrameId, QueueNexus>,
}

// -----------------------------------------------------------------------------
// ----- QueueNexusTable: Static -----------------------------------------------

impl QueueNexusTable {
    pub fn new() -> Self {
        Self {
            by_frame: BTreeMap::new(),
        }
    }
}

// -----------------------------------------------------------------------------
// ----- QueueNexusTable: Public -----------------------------------------------

impl QueueNexusTable {
    /// Return the record created by `frame`, creating it on first sight.
    ///
    /// A second observation of the same frame returns the existing record and
    /// ignores `seed` entirely.
    pub fn get_or_create(&mut self, frame: &FrameInfo, seed: QueueNexusSeed) -> &mut QueueNexus {
        use std::collections::btree_map::Entry;

        match self.by_frame.entry(frame.id) {
            Entry::Occupied(entry) => {
                debug!(frame = %frame.id, "frame already correlated; keeping existing queue nexus");
                entry.into_mut()
            }
            Entry::Vacant(entry) => {
                let task_direction = TaskDirection::derive(seed.data_length, seed.flags);

                debug!(
                    frame = %frame.id,
                    lun = seed.lun,
                    direction = task_direction.as_str(),
                    data_length = seed.data_length,
                    "new queue nexus"
                );

                entry.insert(QueueNexus {
                    lun: seed.lun & CBW_LUN_MASK,
                    opcode: None,
                    task_direction,
                    data_length: seed.data_length,
                    bidirectional_data_length: 0,
                    start_time: frame.timestamp,
                    first_frame: frame.id,
                    last_frame: None,
                    flags: 0,
                    allocation_length: 0,
                    cdb_length: seed.cdb_length,
                    extra: None,
                })
            }
        }
    }

    pub fn get(&self, frame: FrameId) -> Option<&QueueNexus> {
        self.by_frame.get(&frame)
    }

    pub fn get_mut(&mut self, frame: FrameId) -> Option<&mut QueueNexus> {
        self.by_frame.get_mut(&frame)
    }

    pub fn len(&self) -> usize {
        self.by_frame.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_frame.is_empty()
    }

    /// Records in capture order.
    pub fn iter(&self) -> impl Iterator<Item = &QueueNexus> {
        self.by_frame.values()
    }

    pub fn for_lun(&self, lun: u8) -> impl Iterator<Item = &QueueNexus> {
        let lun = lun & CBW_LUN_MASK;
        self.by_frame.values().filter(move |nexus| nexus.lun == lun)
    }
}

// -----------------------------------------------------------------------------
// ----- Tests -----------------------------------------------------------------


// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
