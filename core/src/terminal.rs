//! Terminal contract and the 16-color text palette.

use core::fmt;

/// Text color indices of the standard 16-color palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Color {
    Black = 0x00,
    Blue = 0x01,
    Green = 0x02,
    Cyan = 0x03,
    Red = 0x04,
    Magenta = 0x05,
    Brown = 0x06,
    LightGray = 0x07,
    DarkGray = 0x08,
    LightBlue = 0x09,
    LightGreen = 0x0A,
    LightCyan = 0x0B,
    LightRed = 0x0C,
    LightMagenta = 0x0D,
    Yellow = 0x0E,
    White = 0x0F,
}

impl Color {
    /// Palette index (0-15).
    pub const fn index(self) -> u8 {
        self as u8
    }
}

/// Text output surface the firmware renders to.
///
/// Everything the menu engine and the boot sequencer need from a display:
/// colored text through the [`fmt::Write`] sink, cursor save/restore, and a
/// full clear. Only the background bits 0-2 of the palette are required to
/// be representable as a background.
pub trait Terminal: fmt::Write {
    /// Clear the surface and home the cursor.
    fn clear(&mut self);

    /// Set the foreground color for subsequent text.
    fn set_foreground(&mut self, color: Color);

    /// Set the background color for subsequent text.
    fn set_background(&mut self, color: Color);

    /// Current cursor position as (column, row).
    fn cursor(&self) -> (usize, usize);

    /// Move the cursor.
    fn set_cursor(&mut self, col: usize, row: usize);
}
