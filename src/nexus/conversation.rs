use crate::nexus::{LunNexus, LunNexusTable, QueueNexus, QueueNexusSeed, QueueNexusTable};
use crate::shared_types::{ConversationId, FrameInfo};

// -----------------------------------------------------------------------------
// ----- UsbConversation -------------------------------------------------------

/// Per-session container handed to the dissector by the host.
///
/// The mass storage slot is filled on the first frame handed to the dissector,
/// wrapper or not, and lives as long as the host keeps the conversation around.
#[derive(Debug)]
pub struct UsbConversation {
    id: ConversationId,
    masstorage: Option<MassStorageConversation>,
}

impl UsbConversation {
    pub fn new(id: ConversationId) -> Self {
        Self {
            id,
            masstorage: None,
        }
    }

    pub fn id(&self) -> ConversationId {
        self.id
    }

    pub fn masstorage(&self) -> Option<&MassStorageConversation> {
        self.masstorage.as_ref()
    }

    /// Attach the mass storage tables on first use.
    pub fn masstorage_mut(&mut self) -> &mut MassStorageConversation {
        self.masstorage.get_or_insert_with(MassStorageConversation::new)
    }
}

// -----------------------------------------------------------------------------
// ----- MassStorageConversation -----------------------------------------------

/// The two correlation tables one mass storage conversation owns.
#[derive(Debug, Default)]
pub struct MassStorageConversation {
    itl: LunNexusTable,
    itlq: QueueNexusTable,
}

// -----------------------------------------------------------------------------
// ----- MassStorageConversation: Static ---------------------------------------

impl MassStorageConversation {
    pub fn new() -> Self {
        Self {
            itl: LunNexusTable::new(),
            itlq: QueueNexusTable::new(),
        }
    }
}

// -----------------------------------------------------------------------------
// ----- MassStorageConversation: Public ---------------------------------------

impl MassStorageConversation {
    pub fn luns(&self) -> &LunNexusTable {
        &self.itl
    }

    pub fn luns_mut(&mut self) -> &mut LunNexusTable {
        &mut self.itl
    }

    pub fn queue(&self) -> &QueueNexusTable {
        &self.itlq
    }

    pub fn queue_mut(&mut self) -> &mut QueueNexusTable {
        &mut self.itlq
    }

    /// Look up or create both records for a command seen in `frame`.
    ///
    /// The queue record points at its LUN record by key only, so both can be
    /// borrowed mutably at once.
    pub fn correlate(
        &mut self,
        frame: &FrameInfo,
        seed: QueueNexusSeed,
    ) -> (&mut LunNexus, &mut QueueNexus) {
        let itl = self.itl.get_or_create(seed.lun);
        let itlq = self.itlq.get_or_create(frame, seed);
        (itl, itlq)
    }
}

// -----------------------------------------------------------------------------
// ----- Tests -----------------------------------------------------------------


// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
