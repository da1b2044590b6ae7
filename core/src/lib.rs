//! Kestrel Core Library
//!
//! The board-independent half of the Kestrel boot firmware: the interactive
//! menu engine, the streaming sector I/O adapter, and the contracts the
//! board drivers implement (terminal, keyboard, storage card, byte-stream
//! transport). Designed to be no_std compatible; the firmware crate wires
//! real hardware behind these traits, the test suites wire mocks.

#![no_std]

pub mod card;
pub mod fmt;
pub mod input;
pub mod logger;
pub mod menu;
pub mod stream;
pub mod terminal;

pub use card::{CardError, CardKind, StorageCard};
pub use input::{InputSource, KeyCode, KeyEvent, KeyEventKind};
pub use menu::{MenuDef, MenuEntry, MenuSession};
pub use stream::{ByteStream, StreamBlockIo, StreamError, StreamPhase, SECTOR_SIZE};
pub use terminal::{Color, Terminal};
