//! Common test doubles: a recording terminal, a scripted keyboard, and an
//! in-memory byte-streaming storage device with failure injection.

use std::collections::VecDeque;
use std::fmt;

use gpt_disk_types::Lba;
use kestrel_core::{ByteStream, Color, InputSource, KeyEvent, StreamPhase, Terminal, SECTOR_SIZE};

/// Terminal operations in the order they happened.
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(dead_code)]
pub enum TermOp {
    Clear,
    SetCursor(usize, usize),
    SetFg(Color),
    SetBg(Color),
    Text(String),
}

/// Terminal that records everything and models the cursor the way the real
/// console moves it (newline homes the column, tab advances to the next
/// 8-column stop).
#[allow(dead_code)]
pub struct RecordingTerminal {
    pub ops: Vec<TermOp>,
    cursor: (usize, usize),
}

#[allow(dead_code)]
impl RecordingTerminal {
    pub fn new() -> Self {
        Self {
            ops: Vec::new(),
            cursor: (0, 0),
        }
    }

    /// All text written, in order.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for op in &self.ops {
            if let TermOp::Text(s) = op {
                out.push_str(s);
            }
        }
        out
    }

    /// Cursor positions passed to `set_cursor`, in order.
    pub fn cursor_sets(&self) -> Vec<(usize, usize)> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                TermOp::SetCursor(col, row) => Some((*col, *row)),
                _ => None,
            })
            .collect()
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
                '\r' => self.cursor.0 = 0,
                '\t' => self.cursor.0 = (self.cursor.0 + 8) & !7,
                _ => self.cursor.0 += 1,
            }
        }
        self.ops.push(TermOp::Text(s.to_string()));
        Ok(())
    }
}

impl Terminal for RecordingTerminal {
    fn clear(&mut self) {
        self.cursor = (0, 0);
        self.ops.push(TermOp::Clear);
    }

    fn set_foreground(&mut self, color: Color) {
        self.ops.push(TermOp::SetFg(color));
    }

    fn set_background(&mut self, color: Color) {
        self.ops.push(TermOp::SetBg(color));
    }

    fn cursor(&self) -> (usize, usize) {
        self.cursor
    }

    fn set_cursor(&mut self, col: usize, row: usize) {
        self.cursor = (col, row);
        self.ops.push(TermOp::SetCursor(col, row));
    }
}

/// Keyboard fed from a fixed script, one event per poll.
///
/// Panics if the engine polls past the end of the script, which turns a
/// runaway menu loop into a test failure instead of a hang.
#[allow(dead_code)]
pub struct ScriptedInput {
    events: VecDeque<KeyEvent>,
    pub polls: usize,
}

#[allow(dead_code)]
impl ScriptedInput {
    pub fn new(events: impl IntoIterator<Item = KeyEvent>) -> Self {
        Self {
            events: events.into_iter().collect(),
            polls: 0,
        }
    }
}

impl InputSource for ScriptedInput {
    fn poll(&mut self) {
        assert!(!self.events.is_empty(), "input script exhausted");
        self.polls += 1;
    }

    fn pop_keyboard_event(&mut self) -> KeyEvent {
        self.events.pop_front().unwrap_or(KeyEvent::NONE)
    }
}

/// In-memory card image behind the byte-stream handshake, with failure
/// injection at begin or after a chosen number of transfer calls.
#[allow(dead_code)]
pub struct MemoryStream {
    pub data: Vec<u8>,
    /// Report `Failed` straight from `begin_read`/`begin_write`.
    pub fail_begin: bool,
    /// Report `Failed` on the transfer call after this many succeeded,
    /// counted per operation.
    pub fail_after: Option<u32>,
    /// Transfer calls made during the current/most recent operation.
    pub transfer_calls: u32,
    cursor: usize,
    remaining: u32,
    failed: bool,
}

#[allow(dead_code)]
impl MemoryStream {
    pub fn new(sectors: usize) -> Self {
        Self {
            data: vec![0u8; sectors * SECTOR_SIZE],
            fail_begin: false,
            fail_after: None,
            transfer_calls: 0,
            cursor: 0,
            remaining: 0,
            failed: false,
        }
    }

    pub fn with_data(data: Vec<u8>) -> Self {
        assert_eq!(data.len() % SECTOR_SIZE, 0);
        Self {
            data,
            fail_begin: false,
            fail_after: None,
            transfer_calls: 0,
            cursor: 0,
            remaining: 0,
            failed: false,
        }
    }

    pub fn num_sectors(&self) -> u64 {
        (self.data.len() / SECTOR_SIZE) as u64
    }

    fn begin(&mut self, sector: Lba) -> StreamPhase {
        self.transfer_calls = 0;
        if self.fail_begin {
            self.failed = true;
            return StreamPhase::Failed;
        }
        let offset = sector.0 as usize * SECTOR_SIZE;
        if offset + SECTOR_SIZE > self.data.len() {
            self.failed = true;
            return StreamPhase::Failed;
        }
        self.cursor = offset;
        self.remaining = SECTOR_SIZE as u32;
        self.failed = false;
        StreamPhase::InProgress(self.remaining)
    }

    fn step(&mut self) -> StreamPhase {
        self.transfer_calls += 1;
        if let Some(limit) = self.fail_after {
            if self.transfer_calls > limit {
                self.failed = true;
                return StreamPhase::Failed;
            }
        }
        self.remaining -= 1;
        if self.remaining == 0 {
            StreamPhase::Complete
        } else {
            StreamPhase::InProgress(self.remaining)
        }
    }
}

impl ByteStream for MemoryStream {
    fn begin_read(&mut self, sector: Lba) -> StreamPhase {
        self.begin(sector)
    }

    fn next_read_byte(&mut self) -> (u8, StreamPhase) {
        assert!(!self.failed, "transfer call after Failed was observed");
        let phase = self.step();
        if phase == StreamPhase::Failed {
            return (0xFF, phase);
        }
        let byte = self.data[self.cursor];
        self.cursor += 1;
        (byte, phase)
    }

    fn begin_write(&mut self, sector: Lba) -> StreamPhase {
        self.begin(sector)
    }

    fn next_write_byte(&mut self, byte: u8) -> StreamPhase {
        assert!(!self.failed, "transfer call after Failed was observed");
        let phase = self.step();
        if phase == StreamPhase::Failed {
            return phase;
        }
        self.data[self.cursor] = byte;
        self.cursor += 1;
        phase
    }
}
