//! Text console with cursor tracking over a cell surface.

use core::fmt;

use kestrel_core::{Color, Terminal};

use crate::attr::make_attr;
use crate::surface::CellSurface;

/// Text console that renders characters into a cell surface.
pub struct TextConsole<S: CellSurface> {
    surface: S,
    /// Current cursor column (0-indexed).
    cursor_col: usize,
    /// Current cursor row (0-indexed).
    cursor_row: usize,
    cols: usize,
    rows: usize,
    fg: Color,
    bg: Color,
    /// Packed attribute for the current colors.
    attr: u8,
}

impl<S: CellSurface> TextConsole<S> {
    pub fn new(surface: S) -> Self {
        let (cols, rows) = surface.dims();
        Self {
            surface,
            cursor_col: 0,
            cursor_row: 0,
            cols,
            rows,
            fg: Color::LightGray,
            bg: Color::Black,
            attr: make_attr(Color::LightGray, Color::Black),
        }
    }

    /// Number of text columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Number of text rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Borrow the underlying surface.
    pub fn surface(&self) -> &S {
        &self.surface
    }

    fn render_char(&mut self, glyph: u8) {
        self.surface
            .put(self.cursor_col, self.cursor_row, glyph, self.attr);
    }

    /// Advance cursor, handling line wrap and scroll.
    fn advance_cursor(&mut self) {
        self.cursor_col += 1;
        if self.cursor_col >= self.cols {
            self.cursor_col = 0;
            self.cursor_row += 1;
            if self.cursor_row >= self.rows {
                self.cursor_row = self.rows - 1;
                self.surface.scroll_up(self.attr);
            }
        }
    }

    fn newline(&mut self) {
        self.cursor_col = 0;
        self.cursor_row += 1;
        if self.cursor_row >= self.rows {
            self.cursor_row = self.rows - 1;
            self.surface.scroll_up(self.attr);
        }
    }

    /// Write a single character.
    pub fn write_char(&mut self, c: char) {
        match c {
            '\n' => self.newline(),
            '\r' => self.cursor_col = 0,
            '\t' => {
                // Tab to next 8-column boundary
                let next_tab = ((self.cursor_col + 8) & !7).min(self.cols);
                while self.cursor_col < next_tab {
                    self.render_char(b' ');
                    self.advance_cursor();
                    if self.cursor_col == 0 {
                        // Wrapped onto the next row.
                        break;
                    }
                }
            }
            c if c >= ' ' && c <= '~' => {
                self.render_char(c as u8);
                self.advance_cursor();
            }
            _ => {
                // Non-printable: render as space
                self.render_char(b' ');
                self.advance_cursor();
            }
        }
    }
}

impl<S: CellSurface> fmt::Write for TextConsole<S> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for c in s.chars() {
            self.write_char(c);
        }
        Ok(())
    }
}

impl<S: CellSurface> Terminal for TextConsole<S> {
    fn clear(&mut self) {
        self.surface.fill(self.attr);
        self.cursor_col = 0;
        self.cursor_row = 0;
    }

    fn set_foreground(&mut self, color: Color) {
        self.fg = color;
        self.attr = make_attr(self.fg, self.bg);
    }

    fn set_background(&mut self, color: Color) {
        self.bg = color;
        self.attr = make_attr(self.fg, self.bg);
    }

    fn cursor(&self) -> (usize, usize) {
        (self.cursor_col, self.cursor_row)
    }

    fn set_cursor(&mut self, col: usize, row: usize) {
        self.cursor_col = col.min(self.cols.saturating_sub(1));
        self.cursor_row = row.min(self.rows.saturating_sub(1));
    }
}
