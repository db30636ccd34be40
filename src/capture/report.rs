use std::fmt;

use crate::scsi::{DispatchedCommand, opcode_name};
use crate::shared_types::{CommandSet, ConversationId, UsbAddress};

// -----------------------------------------------------------------------------
// ----- CaptureReport ---------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct CaptureReport {
    pub frames: u64,
    pub bulk_frames: u64,
    pub filtered_frames: u64,
    pub malformed_frames: u64,
    pub commands: u64,
    pub dispatches: u64,
    pub truncated_cdbs: u64,
    pub interrupted: bool,
    pub conversations: Vec<ConversationReport>,
    pub opcode_counts: Vec<(u8, u64)>,
    pub history: Vec<DispatchedCommand>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationReport {
    pub id: ConversationId,
    pub address: UsbAddress,
    pub luns: Vec<(u8, CommandSet)>,
    pub commands: usize,
    pub reads: usize,
    pub writes: usize,
    pub no_data: usize,
}

// -----------------------------------------------------------------------------
// ----- Display ---------------------------------------------------------------

impl fmt::Display for CaptureReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "frames: {} (bulk {}, filtered {}, malformed {})",
            self.frames, self.bulk_frames, self.filtered_frames, self.malformed_frames
        )?;
        writeln!(
            f,
            "commands: {} (dispatched {}, truncated CDBs {})",
            self.commands, self.dispatches, self.truncated_cdbs
        )?;
        if self.interrupted {
            writeln!(f, "interrupted before the end of the capture")?;
        }

        for conv in &self.conversations {
            writeln!(
                f,
                "{} device {}: {} commands ({} read, {} write, {} no data)",
                conv.id, conv.address, conv.commands, conv.reads, conv.writes, conv.no_data
            )?;
            for (lun, command_set) in &conv.luns {
                writeln!(f, "  LUN {lun}: {}", command_set.as_str())?;
            }
        }

        for (opcode, count) in &self.opcode_counts {
            writeln!(f, "{opcode:#04x} {:<28} {count}", opcode_name(*opcode))?;
        }

        for cmd in &self.history {
            writeln!(
                f,
                "{} LUN {} {} {} {}",
                cmd.frame,
                cmd.lun,
                cmd.name,
                cmd.task_direction.as_str(),
                cmd.data_length
            )?;
        }

        Ok(())
    }
}

// -----------------------------------------------------------------------------
// ----- Tests -----------------------------------------------------------------


// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
