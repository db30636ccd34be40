use std::collections::BTreeMap;

use tracing::debug;

use crate::shared_types::{CommandSet, ConversationId};
use crate::wire_protocol::CBW_LUN_MASK;

// -----------------------------------------------------------------------------
// ----- LunNexus --------------------------------------------------------------

/// Initiator-target-LUN correlation record.
///
/// One per logical unit per conversation. The transport creates it; the CDB
/// interpreter fills in what it learns (the command set, typically from an
/// INQUIRY response) and later commands on the same LUN see it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LunNexus {
    pub command_set: CommandSet,
    pub conversation: Option<ConversationId>,
}

// -----------------------------------------------------------------------------
// ----- LunNexusTable ---------------------------------------------------------

/// LUN-indexed store. Append-only: records are never removed.
#[derive(Debug, Default)]
pub struct LunNexusTable {
    by_lun: BTreeMap<u8, LunNexus>,
}

// -----------------------------------------------------------------------------
// ----- LunNexusTable: Static -------------------------------------------------

impl LunNexusTable {
    pub fn new() -> Self {
        Self {
            by_lun: BTreeMap::new(),
        }
    }
}

// -----------------------------------------------------------------------------
// ----- LunNexusTable: Public -------------------------------------------------

impl LunNexusTable {
    /// Return the stored record for `lun`, creating it on first sight.
    ///
    /// Only the low nibble of `lun` is significant.
    pub fn get_or_create(&mut self, lun: u8) -> &mut LunNexus {
        let lun = lun & CBW_LUN_MASK;

        self.by_lun.entry(lun).or_insert_with(|| {
            debug!(lun, "new LUN nexus");
            LunNexus::default()
        })
    }

    pub fn get(&self, lun: u8) -> Option<&LunNexus> {
        self.by_lun.get(&(lun & CBW_LUN_MASK))
    }

    pub fn len(&self) -> usize {
        self.by_lun.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_lun.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, &LunNexus)> {
        self.by_lun.iter().map(|(lun, nexus)| (*lun, nexus))
    }
}

// -----------------------------------------------------------------------------
// ----- Tests -----------------------------------------------------------------


// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
