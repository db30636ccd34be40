//! Capture → conversation → dissector plumbing.
//!
//! ```text
//! pcap file
//!   → CaptureReader      (records, frame numbers, timestamps)
//!   → UsbmonPacket       (bus/device/endpoint, direction, payload)
//!   → UsbConversation    (one per bus.device)
//!   → MassStorageDissector<OpcodeRecorder>
//! ```

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{info, warn};

use crate::analytics;
use crate::capture::error::CaptureError;
use crate::capture::reader::{CaptureReader, CapturedPacket};
use crate::capture::report::{CaptureReport, ConversationReport};
use crate::capture::usbmon::{
    LINKTYPE_USB_LINUX, LINKTYPE_USB_LINUX_MMAPPED, TransferType, UsbmonPacket,
};
use crate::config::FilterConfig;
use crate::dissector::{CommandSummary, MassStorageDissector};
use crate::nexus::UsbConversation;
use crate::scsi::OpcodeRecorder;
use crate::shared_types::{ConversationId, FrameInfo, TaskDirection, UsbAddress};

// -----------------------------------------------------------------------------
// ----- CaptureDissector ------------------------------------------------------

/// Demultiplexes usbmon packets into per-device conversations and runs the
/// mass storage dissector over their bulk traffic.
#[derive(Debug)]
pub struct CaptureDissector {
    filter: FilterConfig,
    conversations: BTreeMap<UsbAddress, UsbConversation>,
    next_conversation_id: u64,
    dissector: MassStorageDissector<OpcodeRecorder>,
    report: CaptureReport,
}

// -----------------------------------------------------------------------------
// ----- CaptureDissector: Static ----------------------------------------------

impl CaptureDissector {
    pub fn new(filter: FilterConfig) -> Self {
        let recorder = OpcodeRecorder::new(filter.report_commands);

        Self {
            filter,
            conversations: BTreeMap::new(),
            next_conversation_id: 1,
            dissector: MassStorageDissector::new(recorder),
            report: CaptureReport::default(),
        }
    }
}

// -----------------------------------------------------------------------------
// ----- CaptureDissector: Public ----------------------------------------------

impl CaptureDissector {
    /// Run one captured packet through the pipeline.
    ///
    /// Packets that are not usbmon bulk traffic for an allowed device are
    /// counted and dropped. Only a wrong link type is fatal.
    pub fn process(
        &mut self,
        packet: &CapturedPacket,
    ) -> Result<Option<CommandSummary>, CaptureError> {
        self.report.frames += 1;

        if packet.link_type != LINKTYPE_USB_LINUX && packet.link_type != LINKTYPE_USB_LINUX_MMAPPED
        {
            return Err(CaptureError::UnsupportedLinkType(packet.link_type));
        }

        let usb = match UsbmonPacket::parse(packet.link_type, &packet.data) {
            Ok(usb) => usb,
            Err(e) => {
                warn!(frame = packet.frame_id, "skipping malformed usbmon packet: {e}");
                self.report.malformed_frames += 1;
                return Ok(None);
            }
        };

        if usb.header.transfer_type != TransferType::Bulk {
            return Ok(None);
        }
        self.report.bulk_frames += 1;

        let address = usb.header.address();
        if !self.filter.allows(address) {
            self.report.filtered_frames += 1;
            return Ok(None);
        }

        let frame = FrameInfo::new(packet.frame_id, usb.header.direction(), packet.timestamp);
        let conversation =
            conversation_entry(&mut self.conversations, &mut self.next_conversation_id, address);

        let summary = self.dissector.dissect(conversation, &frame, usb.payload);
        if let Some(summary) = summary {
            self.report.commands += 1;
            if summary.dispatched {
                self.report.dispatches += 1;
            }
            if summary.cdb_length.is_truncated() {
                self.report.truncated_cdbs += 1;
            }
        }

        Ok(summary)
    }

    pub fn conversation_for(&self, address: UsbAddress) -> Option<&UsbConversation> {
        self.conversations.get(&address)
    }

    /// Close out the run and build the report.
    pub fn finish(mut self) -> CaptureReport {
        self.report.conversations = self
            .conversations
            .iter()
            .filter_map(|(address, conv)| summarize(*address, conv))
            .collect();

        let recorder = self.dissector.into_dispatcher();
        self.report.opcode_counts = recorder.counts().collect();
        self.report.history = recorder.history().to_vec();

        self.report
    }
}

// -----------------------------------------------------------------------------
// ----- dissect_capture -------------------------------------------------------

/// Dissect a whole capture file. Setting `stop` ends the run early with a
/// partial report.
pub fn dissect_capture(
    path: &Path,
    filter: FilterConfig,
    stop: &AtomicBool,
) -> Result<CaptureReport, CaptureError> {
    info!("dissecting capture: {}", path.display());

    let reader = CaptureReader::new(path)?;
    let mut pipeline = CaptureDissector::new(filter);
    let mut interrupted = false;

    for packet in reader.packets()? {
        if stop.load(Ordering::Relaxed) {
            interrupted = true;
            break;
        }
        pipeline.process(&packet?)?;
    }

    let mut report = pipeline.finish();
    report.interrupted = interrupted;

    analytics::inc_capture();
    analytics::add_frames(report.frames);
    analytics::add_malformed_frames(report.malformed_frames);
    analytics::add_commands(report.commands);
    analytics::add_dispatches(report.dispatches);
    analytics::add_truncated_cdbs(report.truncated_cdbs);

    info!(
        frames = report.frames,
        commands = report.commands,
        conversations = report.conversations.len(),
        "capture dissected"
    );

    Ok(report)
}

// -----------------------------------------------------------------------------
// ----- Internal: Helpers -----------------------------------------------------

fn conversation_entry<'a>(
    conversations: &'a mut BTreeMap<UsbAddress, UsbConversation>,
    next_id: &mut u64,
    address: UsbAddress,
) -> &'a mut UsbConversation {
    conversations.entry(address).or_insert_with(|| {
        let id = ConversationId(*next_id);
        *next_id += 1;
        info!(device = %address, conversation = %id, "new USB conversation");
        UsbConversation::new(id)
    })
}

fn summarize(address: UsbAddress, conv: &UsbConversation) -> Option<ConversationReport> {
    let state = conv.masstorage()?;
    if state.queue().is_empty() {
        return None;
    }

    let mut report = ConversationReport {
        id: conv.id(),
        address,
        luns: state.luns().iter().map(|(lun, itl)| (lun, itl.command_set)).collect(),
        commands: state.queue().len(),
        reads: 0,
        writes: 0,
        no_data: 0,
    };

    for itlq in state.queue().iter() {
        match itlq.task_direction {
            TaskDirection::Read => report.reads += 1,
            TaskDirection::Write => report.writes += 1,
            TaskDirection::None => report.no_data += 1,
        }
    }

    Some(report)
}

// -----------------------------------------------------------------------------
// ----- Tests -----------------------------------------------------------------


// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
