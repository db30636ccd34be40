use crate::nexus::{LunNexus, QueueNexus};
use crate::shared_types::{CommandSet, FrameInfo};

// -----------------------------------------------------------------------------
// ----- CdbDispatcher ---------------------------------------------------------

/// Downstream interpreter for the command descriptor block.
///
/// Called once per recognized wrapper that carries at least one CDB byte. The
/// slice is already clamped to what was captured. Both records may be updated
/// and the updates stick for later frames of the same conversation.
pub trait CdbDispatcher {
    fn dispatch(
        &mut self,
        frame: &FrameInfo,
        cdb: &[u8],
        device_class: CommandSet,
        itlq: &mut QueueNexus,
        itl: &mut LunNexus,
    );
}

impl<F> CdbDispatcher for F
where
    F: FnMut(&FrameInfo, &[u8], CommandSet, &mut QueueNexus, &mut LunNexus),
{
    fn dispatch(
        &mut self,
        frame: &FrameInfo,
        cdb: &[u8],
        device_class: CommandSet,
        itlq: &mut QueueNexus,
        itl: &mut LunNexus,
    ) {
        self(frame, cdb, device_class, itlq, itl)
    }
}
