use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::dissector::CdbDispatcher;
use crate::nexus::{LunNexus, QueueNexus};
use crate::scsi::opcode::{ScsiOpcode, opcode_name};
use crate::shared_types::{CommandSet, FrameId, FrameInfo, TaskDirection};

// -----------------------------------------------------------------------------
// ----- DispatchedCommand -----------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchedCommand {
    pub frame: FrameId,
    pub lun: u8,
    pub opcode: u8,
    pub name: &'static str,
    pub task_direction: TaskDirection,
    pub data_length: u32,
}

// -----------------------------------------------------------------------------
// ----- OpcodeRecorder --------------------------------------------------------

/// Minimal CDB interpreter: records the opcode on the queue nexus, fills in the
/// allocation length where the CDB has one, and marks a LUN as SBC once it
/// sees a block command addressed to it.
#[derive(Debug, Default)]
pub struct OpcodeRecorder {
    keep_history: bool,
    history: Vec<DispatchedCommand>,
    by_opcode: BTreeMap<u8, u64>,
}

// -----------------------------------------------------------------------------
// ----- OpcodeRecorder: Static ------------------------------------------------

impl OpcodeRecorder {
    pub fn new(keep_history: bool) -> Self {
        Self {
            keep_history,
            history: Vec::new(),
            by_opcode: BTreeMap::new(),
        }
    }
}

// -----------------------------------------------------------------------------
// ----- OpcodeRecorder: Public ------------------------------------------------

impl OpcodeRecorder {
    pub fn history(&self) -> &[DispatchedCommand] {
        &self.history
    }

    pub fn count(&self, opcode: u8) -> u64 {
        self.by_opcode.get(&opcode).copied().unwrap_or(0)
    }

    /// Per-opcode counts, lowest opcode first.
    pub fn counts(&self) -> impl Iterator<Item = (u8, u64)> + '_ {
        self.by_opcode.iter().map(|(op, n)| (*op, *n))
    }
}

// -----------------------------------------------------------------------------
// ----- CdbDispatcher ---------------------------------------------------------

impl CdbDispatcher for OpcodeRecorder {
    fn dispatch(
        &mut self,
        frame: &FrameInfo,
        cdb: &[u8],
        _device_class: CommandSet,
        itlq: &mut QueueNexus,
        itl: &mut LunNexus,
    ) {
        let Some(&opcode) = cdb.first() else {
            return;
        };

        itlq.opcode = Some(opcode);
        *self.by_opcode.entry(opcode).or_insert(0) += 1;

        if let Some(known) = ScsiOpcode::from_u8(opcode) {
            if let Some(alloc_len) = known.allocation_length(cdb) {
                itlq.allocation_length = alloc_len;
            }

            if known.is_block_command() && !itl.command_set.is_known() {
                info!(lun = itlq.lun, "{} implies a direct access device", known.name());
                itl.command_set = CommandSet::Sbc;
            }
        }

        let name = opcode_name(opcode);
        debug!(frame = %frame.id, lun = itlq.lun, opcode, "{name}");

        if self.keep_history {
            self.history.push(DispatchedCommand {
                frame: frame.id,
                lun: itlq.lun,
                opcode,
                name,
                task_direction: itlq.task_direction,
                data_length: itlq.data_length,
            });
        }
    }
}

// -----------------------------------------------------------------------------
// ----- Tests -----------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dissector::MassStorageDissector;
    use crate::nexus::UsbConversation;
    use crate::shared_types::{ConversationId, FrameDirection, FrameTimestamp};
    use crate::wire_protocol::{CommandBlockWrapperFrame, WireSerializable};

    fn feed(
        dissector: &mut MassStorageDissector<OpcodeRecorder>,
        conv: &mut UsbConversation,
        id: u32,
        data_length: u32,
        flags: u8,
        lun: u8,
        cdb: &[u8],
    ) {
        let payload = CommandBlockWrapperFrame::new(id, data_length, flags, lun, cdb)
            .to_bytes()
            .unwrap();
        let frame = FrameInfo::new(id, FrameDirection::Request, FrameTimestamp::default());
        dissector.dissect(conv, &frame, &payload).unwrap();
    }

    #[test]
    fn records_opcode_and_allocation_length() {
        let mut dissector = MassStorageDissector::new(OpcodeRecorder::new(true));
        let mut conv = UsbConversation::new(ConversationId(1));

        feed(&mut dissector, &mut conv, 1, 36, 0x80, 0, &[0x12, 0, 0, 0, 36, 0]);

        let itlq = conv.masstorage().unwrap().queue().get(FrameId(1)).unwrap();
        assert_eq!(itlq.opcode, Some(0x12));
        assert_eq!(itlq.allocation_length, 36);

        let history = dissector.dispatcher().history();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].name, "INQUIRY");
        assert_eq!(history[0].task_direction, TaskDirection::Read);
    }

    #[test]
    fn block_command_marks_lun_as_sbc() {
        let mut dissector = MassStorageDissector::new(OpcodeRecorder::new(false));
        let mut conv = UsbConversation::new(ConversationId(1));

        feed(&mut dissector, &mut conv, 1, 0, 0, 0, &[0x00; 6]);
        let luns = conv.masstorage().unwrap().luns();
        assert_eq!(luns.get(0).unwrap().command_set, CommandSet::Unknown);

        feed(&mut dissector, &mut conv, 2, 512, 0x80, 0, &[0x28, 0, 0, 0, 0, 0, 0, 0, 1, 0]);
        let luns = conv.masstorage().unwrap().luns();
        assert_eq!(luns.get(0).unwrap().command_set, CommandSet::Sbc);

        assert!(dissector.dispatcher().history().is_empty());
        assert_eq!(dissector.dispatcher().count(0x28), 1);
        assert_eq!(dissector.dispatcher().count(0x00), 1);
    }

    #[test]
    fn discovered_command_set_is_not_overwritten() {
        let mut dissector = MassStorageDissector::new(OpcodeRecorder::new(false));
        let mut conv = UsbConversation::new(ConversationId(1));
        conv.masstorage_mut().luns_mut().get_or_create(0).command_set = CommandSet::Mmc;

        feed(&mut dissector, &mut conv, 1, 2048, 0x80, 0, &[0x28; 10]);

        let luns = conv.masstorage().unwrap().luns();
        assert_eq!(luns.get(0).unwrap().command_set, CommandSet::Mmc);
    }
}

// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
