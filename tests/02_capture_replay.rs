mod support;

use std::process::Command;
use std::sync::atomic::AtomicBool;

use support::Urb;
use usbms::capture::CaptureError;
use usbms::config::FilterConfig;
use usbms::dissect_capture;
use usbms::shared_types::{CommandSet, UsbAddress};

fn session(bus: u16, device: u8) -> Vec<Urb> {
    vec![
        Urb::control(bus, device, vec![0x80, 0x06, 0, 1, 0, 0, 18, 0]),
        Urb::bulk_out(bus, device, support::inquiry(1, 0)),
        Urb::bulk_in(bus, device, vec![0u8; 36]),
        Urb::bulk_out(bus, device, support::read10(2, 0, 8)),
        Urb::bulk_in(bus, device, vec![0u8; 4096]),
        Urb::bulk_out(bus, device, support::write10(3, 0, 1)),
        Urb::bulk_out(bus, device, vec![0u8; 512]),
    ]
}

#[test]
fn replays_a_usbmon_capture() {
    let pcap = support::write_usbmon_pcap(&session(1, 4));
    let stop = AtomicBool::new(false);

    let report = dissect_capture(pcap.path(), FilterConfig::default(), &stop).expect("dissect");

    assert_eq!(report.frames, 7);
    assert_eq!(report.bulk_frames, 6);
    assert_eq!(report.commands, 3);
    assert_eq!(report.dispatches, 3);
    assert!(!report.interrupted);

    assert_eq!(report.conversations.len(), 1);
    let conv = &report.conversations[0];
    assert_eq!(conv.address, UsbAddress { bus: 1, device: 4 });
    assert_eq!((conv.reads, conv.writes, conv.no_data), (2, 1, 0));
    assert_eq!(conv.luns, vec![(0, CommandSet::Sbc)]);

    assert_eq!(report.opcode_counts, vec![(0x12, 1), (0x28, 1), (0x2a, 1)]);
    assert!(report.history.is_empty());
}

#[test]
fn mmapped_header_variant_is_understood() {
    let pcap = support::write_usbmon_mmapped_pcap(&session(2, 9));
    let stop = AtomicBool::new(false);

    let report = dissect_capture(pcap.path(), FilterConfig::default(), &stop).expect("dissect");

    assert_eq!(report.commands, 3);
    assert_eq!(report.conversations[0].address, UsbAddress { bus: 2, device: 9 });
}

#[test]
fn filter_file_limits_devices_and_keeps_history() {
    let mut urbs = session(1, 4);
    urbs.extend(session(1, 5));
    let pcap = support::write_usbmon_pcap(&urbs);

    let filter = FilterConfig::parse(
        r#"
        report_commands = true

        [[devices]]
        bus = 1
        device = 5
        "#,
    )
    .expect("filter parses");
    let stop = AtomicBool::new(false);

    let report = dissect_capture(pcap.path(), filter, &stop).expect("dissect");

    assert_eq!(report.commands, 3);
    assert_eq!(report.filtered_frames, 6);
    assert_eq!(report.conversations.len(), 1);
    assert_eq!(report.conversations[0].address.device, 5);

    let names: Vec<_> = report.history.iter().map(|c| c.name).collect();
    assert_eq!(names, vec!["INQUIRY", "READ(10)", "WRITE(10)"]);
    assert!(report.to_string().contains("INQUIRY"));
}

#[test]
fn large_bulk_transfers_do_not_stop_the_replay() {
    let pcap = support::write_usbmon_pcap(&[
        Urb::bulk_out(1, 4, support::read10(1, 0, 240)),
        Urb::bulk_in(1, 4, vec![0u8; 240 * 512]),
        Urb::bulk_out(1, 4, support::read10(2, 0, 8)),
        Urb::bulk_out(1, 4, support::read10(3, 0, 8)),
    ]);
    let stop = AtomicBool::new(false);

    let report = dissect_capture(pcap.path(), FilterConfig::default(), &stop).expect("dissect");

    assert_eq!(report.frames, 4);
    assert_eq!(report.commands, 3);
    assert_eq!(report.conversations[0].reads, 3);
}

#[test]
fn stop_flag_yields_partial_report() {
    let pcap = support::write_usbmon_pcap(&session(1, 4));
    let stop = AtomicBool::new(true);

    let report = dissect_capture(pcap.path(), FilterConfig::default(), &stop).expect("dissect");

    assert!(report.interrupted);
    assert_eq!(report.frames, 0);
}

#[test]
fn ethernet_capture_is_rejected() {
    let pcap = support::write_pcap(1, &[vec![0u8; 60]]);
    let stop = AtomicBool::new(false);

    let err = dissect_capture(pcap.path(), FilterConfig::default(), &stop).unwrap_err();
    assert!(matches!(err, CaptureError::UnsupportedLinkType(1)));
}

#[test]
fn binary_prints_the_report() {
    let pcap = support::write_usbmon_pcap(&session(1, 4));

    let output = Command::new(env!("CARGO_BIN_EXE_usbms"))
        .arg(pcap.path())
        .args(["--log", "error"])
        .output()
        .expect("run usbms");

    assert!(output.status.success(), "usbms failed: {output:?}");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("commands: 3 (dispatched 3, truncated CDBs 0)"));
    assert!(stdout.contains("device 1.4"));
}
