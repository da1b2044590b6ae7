//! Mock board devices for the firmware integration tests.

use std::collections::VecDeque;
use std::fmt;

use gpt_disk_types::Lba;
use kestrel_core::{
    ByteStream, CardError, CardKind, Color, StorageCard, StreamPhase, Terminal, SECTOR_SIZE,
};
use kestrel_firmware::xfer::SerialPort;

/// Terminal capturing text and color changes.
#[allow(dead_code)]
pub struct RecordingTerminal {
    pub text: String,
    pub colors: Vec<Color>,
    cursor: (usize, usize),
}

impl RecordingTerminal {
    pub fn new() -> Self {
        Self {
            text: String::new(),
            colors: Vec::new(),
            cursor: (0, 0),
        }
    }
}

impl fmt::Write for RecordingTerminal {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for c in s.chars() {
            match c {
                '\n' => {
                    self.cursor.0 = 0;
                    self.cursor.1 += 1;
                }
                _ => self.cursor.0 += 1,
            }
        }
        self.text.push_str(s);
        Ok(())
    }
}

impl Terminal for RecordingTerminal {
    fn clear(&mut self) {
        self.cursor = (0, 0);
    }

    fn set_foreground(&mut self, color: Color) {
        self.colors.push(color);
    }

    fn set_background(&mut self, _color: Color) {}

    fn cursor(&self) -> (usize, usize) {
        self.cursor
    }

    fn set_cursor(&mut self, col: usize, row: usize) {
        self.cursor = (col, row);
    }
}

/// In-memory SD card: detection result plus a byte-streamed image.
pub struct MockSd {
    pub detect_result: Result<CardKind, CardError>,
    pub data: Vec<u8>,
    cursor: usize,
    remaining: u32,
}

#[allow(dead_code)]
impl MockSd {
    pub fn present(kind: CardKind, data: Vec<u8>) -> Self {
        assert_eq!(data.len() % SECTOR_SIZE, 0);
        Self {
            detect_result: Ok(kind),
            data,
            cursor: 0,
            remaining: 0,
        }
    }

    pub fn absent() -> Self {
        Self {
            detect_result: Err(CardError::NoCard),
            data: Vec::new(),
            cursor: 0,
            remaining: 0,
        }
    }

    fn begin(&mut self, sector: Lba) -> StreamPhase {
        let offset = sector.0 as usize * SECTOR_SIZE;
        if offset + SECTOR_SIZE > self.data.len() {
            return StreamPhase::Failed;
        }
        self.cursor = offset;
        self.remaining = SECTOR_SIZE as u32;
        StreamPhase::InProgress(self.remaining)
    }

    fn step(&mut self) -> StreamPhase {
        self.remaining -= 1;
        if self.remaining == 0 {
            StreamPhase::Complete
        } else {
            StreamPhase::InProgress(self.remaining)
        }
    }
}

impl StorageCard for MockSd {
    fn detect(&mut self) -> Result<CardKind, CardError> {
        self.detect_result
    }

    fn capacity_blocks(&mut self) -> u64 {
        (self.data.len() / SECTOR_SIZE) as u64
    }
}

impl ByteStream for MockSd {
    fn begin_read(&mut self, sector: Lba) -> StreamPhase {
        self.begin(sector)
    }

    fn next_read_byte(&mut self) -> (u8, StreamPhase) {
        let byte = self.data[self.cursor];
        self.cursor += 1;
        (byte, self.step())
    }

    fn begin_write(&mut self, sector: Lba) -> StreamPhase {
        self.begin(sector)
    }

    fn next_write_byte(&mut self, byte: u8) -> StreamPhase {
        self.data[self.cursor] = byte;
        self.cursor += 1;
        self.step()
    }
}

/// A minimal FAT16 card image: valid BPB with a label, empty FAT and root
/// directory. Enough for mount, listing, and lookup misses.
#[allow(dead_code)]
pub fn fat16_image(label: &str) -> Vec<u8> {
    // 1 reserved + 17 FAT + 2 root sectors, 4180 data clusters.
    let total_sectors = 4200usize;
    let mut data = vec![0u8; total_sectors * SECTOR_SIZE];

    data[11..13].copy_from_slice(&512u16.to_le_bytes());
    data[13] = 1; // sectors per cluster
    data[14..16].copy_from_slice(&1u16.to_le_bytes()); // reserved
    data[16] = 1; // FAT copies
    data[17..19].copy_from_slice(&32u16.to_le_bytes()); // root entries
    data[19..21].copy_from_slice(&(total_sectors as u16).to_le_bytes());
    data[21] = 0xF8;
    data[22..24].copy_from_slice(&17u16.to_le_bytes()); // FAT sectors
    data[38] = 0x29;
    let mut packed = *b"           ";
    packed[..label.len()].copy_from_slice(label.as_bytes());
    data[43..54].copy_from_slice(&packed);
    data[510] = 0x55;
    data[511] = 0xAA;

    // Reserved FAT entries.
    data[512..514].copy_from_slice(&0xFFF8u16.to_le_bytes());
    data[514..516].copy_from_slice(&0xFFFFu16.to_le_bytes());

    data
}

/// Serial port replaying a byte script and recording everything sent.
#[allow(dead_code)]
pub struct ScriptedSerial {
    incoming: VecDeque<u8>,
    pub sent: Vec<u8>,
}

#[allow(dead_code)]
impl ScriptedSerial {
    pub fn new(incoming: impl IntoIterator<Item = u8>) -> Self {
        Self {
            incoming: incoming.into_iter().collect(),
            sent: Vec::new(),
        }
    }
}

impl SerialPort for ScriptedSerial {
    fn read_byte(&mut self) -> u8 {
        self.incoming.pop_front().expect("serial script exhausted")
    }

    fn write_byte(&mut self, byte: u8) {
        self.sent.push(byte);
    }
}
