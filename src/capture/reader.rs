//! Capture file reading.
//!
//! Streams legacy pcap files with the `pcap-parser` crate. Every record gets a
//! 1-based frame number in file order, which is what the dissector keys its
//! queue records on.

use bytes::Bytes;
use pcap_parser::traits::PcapReaderIterator;
use pcap_parser::{LegacyPcapReader, PcapBlockOwned, PcapError};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::capture::error::CaptureError;
use crate::shared_types::FrameTimestamp;

// -----------------------------------------------------------------------------
// ----- Constants -------------------------------------------------------------

const READ_BUFFER_CAPACITY: usize = 256 * 1024;
const PARSER_BUFFER_CAPACITY: usize = 65536;
/// usbmon caps a single URB capture well below this.
const MAX_PARSER_BUFFER_CAPACITY: usize = 16 * 1024 * 1024;

const PCAP_MAGIC_NANOS: u32 = 0xa1b2_3c4d;
const PCAP_MAGIC_NANOS_SWAPPED: u32 = 0x4d3c_b2a1;

// -----------------------------------------------------------------------------
// ----- CapturedPacket --------------------------------------------------------

/// One record from the capture file.
#[derive(Debug, Clone)]
pub struct CapturedPacket {
    /// 1-based position in the file.
    pub frame_id: u32,
    pub timestamp: FrameTimestamp,
    /// Link type from the file header.
    pub link_type: i32,
    /// Captured bytes, starting with the link-layer header.
    pub data: Bytes,
}

// -----------------------------------------------------------------------------
// ----- CaptureReader ---------------------------------------------------------

/// Streams packets from a pcap file.
pub struct CaptureReader {
    path: PathBuf,
}

impl CaptureReader {
    pub fn new(path: impl AsRef<Path>) -> Result<Self, CaptureError> {
        let path = path.as_ref().to_path_buf();
        std::fs::metadata(&path).map_err(|source| CaptureError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(Self { path })
    }

    pub fn packets(&self) -> Result<PacketIterator, CaptureError> {
        PacketIterator::open(&self.path)
    }
}

// -----------------------------------------------------------------------------
// ----- PacketIterator --------------------------------------------------------

pub struct PacketIterator {
    reader: LegacyPcapReader<BufReader<File>>,
    buffer_capacity: usize,
    link_type: i32,
    nanosecond_timestamps: bool,
    next_frame_id: u32,
    done: bool,
}

impl PacketIterator {
    fn open(path: &Path) -> Result<Self, CaptureError> {
        let file = File::open(path).map_err(|source| CaptureError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let buf = BufReader::with_capacity(READ_BUFFER_CAPACITY, file);
        let reader = LegacyPcapReader::new(PARSER_BUFFER_CAPACITY, buf)
            .map_err(|e| CaptureError::Format(format!("{e:?}")))?;

        Ok(Self {
            reader,
            buffer_capacity: PARSER_BUFFER_CAPACITY,
            link_type: -1,
            nanosecond_timestamps: false,
            next_frame_id: 1,
            done: false,
        })
    }

    /// Link type of the file, once its header has been read.
    pub fn link_type(&self) -> Option<i32> {
        (self.link_type >= 0).then_some(self.link_type)
    }

    fn timestamp(&self, ts_sec: u32, ts_frac: u32) -> FrameTimestamp {
        let micros = if self.nanosecond_timestamps {
            ts_frac / 1_000
        } else {
            ts_frac
        };
        FrameTimestamp::new(u64::from(ts_sec), micros)
    }

    /// Double the parser buffer so the next record fits.
    fn grow_buffer(&mut self) -> Result<(), CaptureError> {
        let next = self.buffer_capacity.saturating_mul(2);
        if next > MAX_PARSER_BUFFER_CAPACITY {
            return Err(CaptureError::RecordTooLarge {
                frame: self.next_frame_id,
                limit: MAX_PARSER_BUFFER_CAPACITY,
            });
        }

        if self.reader.grow(next) {
            debug!(capacity = next, frame = self.next_frame_id, "grew capture buffer");
        }
        self.buffer_capacity = next;
        self.refill()
    }

    fn refill(&mut self) -> Result<(), CaptureError> {
        self.reader
            .refill()
            .map_err(|e| CaptureError::Format(format!("{e:?}")))
    }

    fn fail(&mut self, err: CaptureError) -> Option<Result<CapturedPacket, CaptureError>> {
        self.done = true;
        Some(Err(err))
    }
}

impl Iterator for PacketIterator {
    type Item = Result<CapturedPacket, CaptureError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        loop {
            match self.reader.next() {
                Ok((offset, block)) => match block {
                    PcapBlockOwned::LegacyHeader(hdr) => {
                        self.link_type = hdr.network.0;
                        self.nanosecond_timestamps = hdr.magic_number == PCAP_MAGIC_NANOS
                            || hdr.magic_number == PCAP_MAGIC_NANOS_SWAPPED;
                        debug!(link_type = self.link_type, snaplen = hdr.snaplen, "capture header");
                        self.reader.consume(offset);
                    }
                    PcapBlockOwned::Legacy(pkt) => {
                        let (ts_sec, ts_frac) = (pkt.ts_sec, pkt.ts_usec);
                        let data = Bytes::copy_from_slice(pkt.data);
                        self.reader.consume(offset);

                        let timestamp = self.timestamp(ts_sec, ts_frac);

                        let frame_id = self.next_frame_id;
                        self.next_frame_id += 1;

                        return Some(Ok(CapturedPacket {
                            frame_id,
                            timestamp,
                            link_type: self.link_type,
                            data,
                        }));
                    }
                    _ => {
                        self.reader.consume(offset);
                    }
                },
                Err(PcapError::Eof) => {
                    self.done = true;
                    return None;
                }
                Err(PcapError::UnexpectedEof) => {
                    warn!(frame = self.next_frame_id, "capture ends with a partial record");
                    self.done = true;
                    return None;
                }
                Err(PcapError::BufferTooSmall) => {
                    if let Err(e) = self.grow_buffer() {
                        return self.fail(e);
                    }
                }
                Err(PcapError::Incomplete(_)) => {
                    if let Err(e) = self.refill() {
                        return self.fail(e);
                    }
                }
                Err(e) => {
                    let err = CaptureError::Format(format!("{e:?}"));
                    return self.fail(err);
                }
            }
        }
    }
}

// -----------------------------------------------------------------------------
// ----- Tests -----------------------------------------------------------------


// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
