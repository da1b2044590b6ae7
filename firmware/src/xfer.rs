//! Serial image receive.
//!
//! XMODEM with 128-byte blocks and the arithmetic checksum, the least any
//! sender can speak. Four blocks fill one sector, written through the
//! streaming adapter from sector 0 upward: a raw card-image restore. The
//! sender paces the link, so reads block without timeouts like every other
//! I/O path in this firmware.

use core::fmt::{self, Write};

use gpt_disk_types::Lba;
use kestrel_core::{ByteStream, StreamBlockIo, StreamError, Terminal, SECTOR_SIZE};

const SOH: u8 = 0x01;
const EOT: u8 = 0x04;
const ACK: u8 = 0x06;
const NAK: u8 = 0x15;
const CAN: u8 = 0x18;
const BLOCK_LEN: usize = 128;

/// Byte-wise serial port.
pub trait SerialPort {
    /// Block until one byte arrives.
    fn read_byte(&mut self) -> u8;
    fn write_byte(&mut self, byte: u8);
}

/// Transfer failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XferError {
    /// Sender cancelled the transfer.
    Cancelled,
    /// Block numbering went out of sequence.
    OutOfSequence,
    /// A sector write failed; the card contents are now undefined.
    Write(StreamError),
}

impl fmt::Display for XferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cancelled => write!(f, "sender cancelled"),
            Self::OutOfSequence => write!(f, "block numbering out of sequence"),
            Self::Write(e) => write!(f, "sector write failed: {}", e),
        }
    }
}

/// Receive an image and write it to the card from sector 0. Returns the
/// number of sectors written.
pub fn receive_image<T, SD, P>(
    term: &mut T,
    serial: &mut P,
    adapter: &mut StreamBlockIo<SD>,
) -> Result<u64, XferError>
where
    T: Terminal,
    SD: ByteStream,
    P: SerialPort,
{
    term.clear();
    let _ = writeln!(term, "Receiving card image over serial.");
    let _ = writeln!(term, "Start an XMODEM send now; the card is rewritten from sector 0.\n");

    let mut sector_buf = [0u8; SECTOR_SIZE];
    let mut fill = 0usize;
    let mut sector = 0u64;
    let mut expected: u8 = 1;

    // Kick the sender into checksum mode.
    serial.write_byte(NAK);

    loop {
        match serial.read_byte() {
            SOH => {
                let number = serial.read_byte();
                let inverse = serial.read_byte();
                let mut block = [0u8; BLOCK_LEN];
                let mut sum = 0u8;
                for byte in &mut block {
                    *byte = serial.read_byte();
                    sum = sum.wrapping_add(*byte);
                }
                let checksum = serial.read_byte();

                if inverse != !number {
                    serial.write_byte(NAK);
                    continue;
                }
                if number == expected.wrapping_sub(1) {
                    // Retransmit of a block already stored.
                    serial.write_byte(ACK);
                    continue;
                }
                if number != expected {
                    serial.write_byte(CAN);
                    serial.write_byte(CAN);
                    return Err(XferError::OutOfSequence);
                }
                if checksum != sum {
                    serial.write_byte(NAK);
                    continue;
                }

                sector_buf[fill..fill + BLOCK_LEN].copy_from_slice(&block);
                fill += BLOCK_LEN;
                if fill == SECTOR_SIZE {
                    if let Err(e) = adapter.write_sector(Lba(sector), &sector_buf) {
                        serial.write_byte(CAN);
                        serial.write_byte(CAN);
                        return Err(XferError::Write(e));
                    }
                    sector += 1;
                    fill = 0;
                }
                expected = expected.wrapping_add(1);
                serial.write_byte(ACK);
            }
            EOT => {
                // Pad the trailing partial sector with zeros.
                if fill > 0 {
                    sector_buf[fill..].fill(0);
                    if let Err(e) = adapter.write_sector(Lba(sector), &sector_buf) {
                        serial.write_byte(CAN);
                        return Err(XferError::Write(e));
                    }
                    sector += 1;
                }
                serial.write_byte(ACK);
                return Ok(sector);
            }
            CAN => return Err(XferError::Cancelled),
            _ => {
                // Line noise between blocks; wait for the next header.
            }
        }
    }
}
