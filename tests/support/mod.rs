#![allow(dead_code)]
//! Builders for command block wrappers and small synthetic usbmon captures.
//!
//! Captures are legacy pcap files with link type 189 (or 220):
//!   Global header + N×(Packet header + usbmon header + payload).

use std::io::Write;

use tempfile::NamedTempFile;

// -----------------------------------------------------------------------------
// ----- Command Block Wrappers ------------------------------------------------

pub const CBW_SIGNATURE: u32 = 0x4342_5355;

/// A 31-byte wrapper. `cdb` is zero-padded to 16 bytes; `cb_length` is
/// written as given so tests can lie about it.
pub fn cbw(tag: u32, data_length: u32, flags: u8, lun: u8, cb_length: u8, cdb: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(31);
    buf.extend_from_slice(&CBW_SIGNATURE.to_le_bytes());
    buf.extend_from_slice(&tag.to_le_bytes());
    buf.extend_from_slice(&data_length.to_le_bytes());
    buf.push(flags);
    buf.push(lun);
    buf.push(cb_length);
    let mut block = [0u8; 16];
    block[..cdb.len()].copy_from_slice(cdb);
    buf.extend_from_slice(&block);
    buf
}

pub fn read10(tag: u32, lun: u8, blocks: u16) -> Vec<u8> {
    let [hi, lo] = blocks.to_be_bytes();
    cbw(tag, u32::from(blocks) * 512, 0x80, lun, 10, &[0x28, 0, 0, 0, 0, 0, 0, hi, lo, 0])
}

pub fn write10(tag: u32, lun: u8, blocks: u16) -> Vec<u8> {
    let [hi, lo] = blocks.to_be_bytes();
    cbw(tag, u32::from(blocks) * 512, 0x00, lun, 10, &[0x2a, 0, 0, 0, 0, 0, 0, hi, lo, 0])
}

pub fn test_unit_ready(tag: u32, lun: u8) -> Vec<u8> {
    cbw(tag, 0, 0x00, lun, 6, &[0x00; 6])
}

pub fn inquiry(tag: u32, lun: u8) -> Vec<u8> {
    cbw(tag, 36, 0x80, lun, 6, &[0x12, 0, 0, 0, 36, 0])
}

// -----------------------------------------------------------------------------
// ----- usbmon ----------------------------------------------------------------

pub const LINKTYPE_USB_LINUX: u32 = 189;
pub const LINKTYPE_USB_LINUX_MMAPPED: u32 = 220;

pub const XFER_CONTROL: u8 = 2;
pub const XFER_BULK: u8 = 3;

/// One URB event as seen by usbmon.
#[derive(Debug, Clone)]
pub struct Urb {
    pub event: u8,
    pub transfer_type: u8,
    pub endpoint: u8,
    pub bus: u16,
    pub device: u8,
    pub payload: Vec<u8>,
}

impl Urb {
    /// Host → device bulk submission, where wrappers travel.
    pub fn bulk_out(bus: u16, device: u8, payload: Vec<u8>) -> Self {
        Self {
            event: b'S',
            transfer_type: XFER_BULK,
            endpoint: 0x02,
            bus,
            device,
            payload,
        }
    }

    /// Device → host bulk completion.
    pub fn bulk_in(bus: u16, device: u8, payload: Vec<u8>) -> Self {
        Self {
            event: b'C',
            transfer_type: XFER_BULK,
            endpoint: 0x81,
            bus,
            device,
            payload,
        }
    }

    pub fn control(bus: u16, device: u8, payload: Vec<u8>) -> Self {
        Self {
            event: b'S',
            transfer_type: XFER_CONTROL,
            endpoint: 0x00,
            bus,
            device,
            payload,
        }
    }

    fn encode(&self, mmapped: bool) -> Vec<u8> {
        let mut h = Vec::new();
        h.extend_from_slice(&0xffff_8800_0000_1000u64.to_le_bytes()); // urb id
        h.push(self.event);
        h.push(self.transfer_type);
        h.push(self.endpoint);
        h.push(self.device);
        h.extend_from_slice(&self.bus.to_le_bytes());
        h.push(b'-'); // no setup packet
        h.push(0); // data present
        h.extend_from_slice(&0i64.to_le_bytes());
        h.extend_from_slice(&0i32.to_le_bytes());
        h.extend_from_slice(&(-115i32).to_le_bytes()); // -EINPROGRESS
        let len = self.payload.len() as u32;
        h.extend_from_slice(&len.to_le_bytes()); // urb length
        h.extend_from_slice(&len.to_le_bytes()); // captured length
        h.extend_from_slice(&[0u8; 8]); // setup
        if mmapped {
            h.extend_from_slice(&[0u8; 16]);
        }
        h.extend_from_slice(&self.payload);
        h
    }
}

// -----------------------------------------------------------------------------
// ----- pcap ------------------------------------------------------------------

const PCAP_MAGIC: u32 = 0xa1b2_c3d4;
const PCAP_SNAPLEN: u32 = 65535;

fn pcap_global_header(link_type: u32) -> Vec<u8> {
    let mut h = Vec::new();
    h.extend_from_slice(&PCAP_MAGIC.to_le_bytes());
    h.extend_from_slice(&2u16.to_le_bytes());
    h.extend_from_slice(&4u16.to_le_bytes());
    h.extend_from_slice(&0i32.to_le_bytes()); // thiszone
    h.extend_from_slice(&0u32.to_le_bytes()); // sigfigs
    h.extend_from_slice(&PCAP_SNAPLEN.to_le_bytes());
    h.extend_from_slice(&link_type.to_le_bytes());
    h
}

fn pcap_packet_header(ts_sec: u32, ts_usec: u32, len: u32) -> Vec<u8> {
    let mut h = Vec::new();
    h.extend_from_slice(&ts_sec.to_le_bytes());
    h.extend_from_slice(&ts_usec.to_le_bytes());
    h.extend_from_slice(&len.to_le_bytes());
    h.extend_from_slice(&len.to_le_bytes());
    h
}

/// Raw records under an arbitrary link type.
pub fn write_pcap(link_type: u32, records: &[Vec<u8>]) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".pcap")
        .tempfile()
        .expect("create temp pcap");

    let mut bytes = pcap_global_header(link_type);
    for (i, record) in records.iter().enumerate() {
        bytes.extend(pcap_packet_header(1_700_000_000, i as u32 * 125, record.len() as u32));
        bytes.extend_from_slice(record);
    }

    file.write_all(&bytes).expect("write temp pcap");
    file.flush().expect("flush temp pcap");
    file
}

pub fn write_usbmon_pcap(urbs: &[Urb]) -> NamedTempFile {
    let records: Vec<Vec<u8>> = urbs.iter().map(|u| u.encode(false)).collect();
    write_pcap(LINKTYPE_USB_LINUX, &records)
}

pub fn write_usbmon_mmapped_pcap(urbs: &[Urb]) -> NamedTempFile {
    let records: Vec<Vec<u8>> = urbs.iter().map(|u| u.encode(true)).collect();
    write_pcap(LINKTYPE_USB_LINUX_MMAPPED, &records)
}

// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
