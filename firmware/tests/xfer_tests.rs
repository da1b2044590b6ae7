//! Serial receive tests: framing, retransmits, and the sector write path.

mod common;

use common::{MockSd, RecordingTerminal, ScriptedSerial};
use kestrel_core::{CardKind, StreamBlockIo};
use kestrel_firmware::xfer::{self, XferError};

const SOH: u8 = 0x01;
const EOT: u8 = 0x04;
const ACK: u8 = 0x06;
const NAK: u8 = 0x15;
const CAN: u8 = 0x18;

/// Frame one XMODEM block: header, number, inverse, payload, checksum.
fn frame(number: u8, payload: &[u8; 128]) -> Vec<u8> {
    let mut out = vec![SOH, number, !number];
    out.extend_from_slice(payload);
    let sum = payload.iter().fold(0u8, |acc, &b| acc.wrapping_add(b));
    out.push(sum);
    out
}

fn adapter(sectors: usize) -> StreamBlockIo<MockSd> {
    let card = MockSd::present(CardKind::Sd, vec![0u8; sectors * 512]);
    StreamBlockIo::new(card, sectors as u64)
}

#[test]
fn test_receive_two_full_sectors() {
    let mut script = Vec::new();
    let mut expected_image = Vec::new();
    for number in 1..=8u8 {
        let payload = [number; 128];
        script.extend(frame(number, &payload));
        expected_image.extend_from_slice(&payload);
    }
    script.push(EOT);

    let mut term = RecordingTerminal::new();
    let mut serial = ScriptedSerial::new(script);
    let mut adapter = adapter(4);

    let sectors = xfer::receive_image(&mut term, &mut serial, &mut adapter).unwrap();
    assert_eq!(sectors, 2);
    assert_eq!(&adapter.device_mut().data[..1024], &expected_image[..]);

    // Handshake: opening NAK, one ACK per block, one for EOT.
    assert_eq!(serial.sent[0], NAK);
    assert_eq!(serial.sent.iter().filter(|&&b| b == ACK).count(), 9);
}

#[test]
fn test_partial_sector_padded_with_zeros() {
    let mut script = frame(1, &[0x77; 128]);
    script.push(EOT);

    let mut term = RecordingTerminal::new();
    let mut serial = ScriptedSerial::new(script);
    let mut adapter = adapter(4);

    let sectors = xfer::receive_image(&mut term, &mut serial, &mut adapter).unwrap();
    assert_eq!(sectors, 1);
    let data = &adapter.device_mut().data;
    assert!(data[..128].iter().all(|&b| b == 0x77));
    assert!(data[128..512].iter().all(|&b| b == 0));
}

#[test]
fn test_corrupt_block_is_naked_and_resent() {
    let payload = [0x42; 128];
    let mut bad = frame(1, &payload);
    let last = bad.len() - 1;
    bad[last] ^= 0xFF; // break the checksum

    let mut script = bad;
    script.extend(frame(1, &payload));
    script.push(EOT);

    let mut term = RecordingTerminal::new();
    let mut serial = ScriptedSerial::new(script);
    let mut adapter = adapter(4);

    let sectors = xfer::receive_image(&mut term, &mut serial, &mut adapter).unwrap();
    assert_eq!(sectors, 1);
    assert!(adapter.device_mut().data[..128].iter().all(|&b| b == 0x42));
    // Opening NAK, NAK for the corrupt block, ACKs for the good one + EOT.
    assert_eq!(serial.sent.iter().filter(|&&b| b == NAK).count(), 2);
}

#[test]
fn test_duplicate_block_is_acked_once_stored() {
    let payload = [0x13; 128];
    let mut script = frame(1, &payload);
    script.extend(frame(1, &payload)); // retransmit of the same block
    script.extend(frame(2, &[0x14; 128]));
    script.push(EOT);

    let mut term = RecordingTerminal::new();
    let mut serial = ScriptedSerial::new(script);
    let mut adapter = adapter(4);

    let sectors = xfer::receive_image(&mut term, &mut serial, &mut adapter).unwrap();
    assert_eq!(sectors, 1);
    let data = &adapter.device_mut().data;
    assert!(data[..128].iter().all(|&b| b == 0x13));
    assert!(data[128..256].iter().all(|&b| b == 0x14));
}

#[test]
fn test_cancel_aborts() {
    let mut term = RecordingTerminal::new();
    let mut serial = ScriptedSerial::new([CAN]);
    let mut adapter = adapter(4);

    assert_eq!(
        xfer::receive_image(&mut term, &mut serial, &mut adapter),
        Err(XferError::Cancelled)
    );
}

#[test]
fn test_out_of_sequence_block_aborts() {
    let mut script = frame(1, &[0; 128]);
    script.extend(frame(5, &[0; 128])); // jumps the sequence

    let mut term = RecordingTerminal::new();
    let mut serial = ScriptedSerial::new(script);
    let mut adapter = adapter(4);

    assert_eq!(
        xfer::receive_image(&mut term, &mut serial, &mut adapter),
        Err(XferError::OutOfSequence)
    );
    assert!(serial.sent.ends_with(&[CAN, CAN]));
}
