pub mod dispatch;

pub use dispatch::CdbDispatcher;

use tracing::{debug, trace, warn};

use crate::nexus::{QueueNexusSeed, UsbConversation};
use crate::shared_types::{CdbLength, CommandSet, FrameId, FrameInfo, TaskDirection};
use crate::wire_protocol::CommandBlockWrapperObserver;

// -----------------------------------------------------------------------------
// ----- CommandSummary --------------------------------------------------------

/// What one recognized command wrapper turned into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandSummary {
    pub frame: FrameId,
    pub tag: u32,
    pub lun: u8,
    pub data_length: u32,
    pub task_direction: TaskDirection,
    pub cdb_length: CdbLength,
    pub dispatched: bool,
}

// -----------------------------------------------------------------------------
// ----- MassStorageDissector --------------------------------------------------

/// Command-phase dissector for the Bulk-Only Transport.
///
/// Holds no capture state of its own; everything it learns is attached to the
/// `UsbConversation` passed in with each frame.
#[derive(Debug)]
pub struct MassStorageDissector<D> {
    dispatcher: D,
}

// -----------------------------------------------------------------------------
// ----- MassStorageDissector: Static ------------------------------------------

impl<D: CdbDispatcher> MassStorageDissector<D> {
    pub fn new(dispatcher: D) -> Self {
        Self { dispatcher }
    }
}

// -----------------------------------------------------------------------------
// ----- MassStorageDissector: Public ------------------------------------------

impl<D: CdbDispatcher> MassStorageDissector<D> {
    /// Feed one bulk frame. Returns `None` when the frame is not a command
    /// wrapper; nothing is recorded for it in that case.
    pub fn dissect(
        &mut self,
        conversation: &mut UsbConversation,
        frame: &FrameInfo,
        payload: &[u8],
    ) -> Option<CommandSummary> {
        let conversation_id = conversation.id();
        let state = conversation.masstorage_mut();

        let Some(cbw) = CommandBlockWrapperObserver::recognize(frame.direction, payload) else {
            trace!(frame = %frame.id, len = payload.len(), "not a command wrapper");
            return None;
        };

        debug!(frame = %frame.id, conversation = %conversation_id, "{cbw}");

        let seed = QueueNexusSeed::from(&cbw);
        let (itl, itlq) = state.correlate(frame, seed);

        let cdb_length = cbw.cdb_length();
        if cdb_length.is_truncated() {
            warn!(
                frame = %frame.id,
                declared = cdb_length.declared,
                captured = cdb_length.captured,
                "command block truncated"
            );
        }

        let cdb = cbw.cdb();
        let dispatched = !cdb.is_empty();
        if dispatched {
            self.dispatcher
                .dispatch(frame, cdb, CommandSet::Unknown, itlq, itl);
        }

        Some(CommandSummary {
            frame: frame.id,
            tag: cbw.tag(),
            lun: seed.lun,
            data_length: seed.data_length,
            task_direction: cbw.task_direction(),
            cdb_length,
            dispatched,
        })
    }

    pub fn dispatcher(&self) -> &D {
        &self.dispatcher
    }

    pub fn dispatcher_mut(&mut self) -> &mut D {
        &mut self.dispatcher
    }

    pub fn into_dispatcher(self) -> D {
        self.dispatcher
    }
}

// -----------------------------------------------------------------------------
// ----- Tests -----------------------------------------------------------------


// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
