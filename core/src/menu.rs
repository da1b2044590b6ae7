//! Data-driven interactive menus.
//!
//! A menu is two pieces: an immutable [`MenuDef`] naming the entries and an
//! optional synthetic "Go back" slot, and a [`MenuSession`] holding the
//! selection cursor. [`execute`] runs the polling loop: render the list at a
//! saved anchor, take one keyboard event, move the cursor or dispatch the
//! selected command, until the back slot is chosen. A menu without a back
//! slot is a root menu and loops for the life of the machine.

use core::fmt::Write;

use crate::input::{InputSource, KeyCode};
use crate::terminal::{Color, Terminal};

/// Label of the synthetic back slot.
const BACK_LABEL: &str = "Go back";

/// One selectable entry: a label and the command it dispatches.
///
/// `command: None` renders and selects normally but dispatches nothing.
pub struct MenuEntry<'a, C> {
    pub label: &'a str,
    pub command: Option<C>,
}

/// Immutable menu definition.
pub struct MenuDef<'a, C> {
    /// Header text printed above the list.
    pub title: &'a str,
    pub entries: &'a [MenuEntry<'a, C>],
    /// Append the synthetic "Go back" slot after the real entries.
    pub has_back: bool,
}

impl<'a, C> MenuDef<'a, C> {
    /// Highest selectable index: the back slot when present, otherwise the
    /// last real entry.
    fn last_index(&self) -> usize {
        (self.entries.len() + self.has_back as usize).saturating_sub(1)
    }
}

/// Mutable cursor state for one menu.
///
/// Kept apart from the definition so independent sessions can run over the
/// same table. The selection persists across [`execute`] calls unless the
/// caller [`reset`](MenuSession::reset)s it.
#[derive(Debug, Clone)]
pub struct MenuSession {
    selected: usize,
    header_drawn: bool,
}

impl MenuSession {
    pub const fn new() -> Self {
        MenuSession {
            selected: 0,
            header_drawn: false,
        }
    }

    /// Put the cursor back on the first entry and forget that the header
    /// was ever drawn.
    pub fn reset(&mut self) {
        self.selected = 0;
        self.header_drawn = false;
    }

    /// Current cursor position.
    ///
    /// Always within `0..=entries + has_back - 1`; the index one past the
    /// real entries is the back slot.
    pub fn selected(&self) -> usize {
        self.selected
    }
}

impl Default for MenuSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Run one menu until the back slot is selected.
///
/// Commands dispatch synchronously through `run_command` with the terminal
/// and input lent for the duration; whatever they print, the header is
/// re-rendered and the list anchor re-captured when they return. A
/// definition without a back slot never returns.
pub fn execute<C, T, I>(
    def: &MenuDef<'_, C>,
    session: &mut MenuSession,
    term: &mut T,
    input: &mut I,
    run_command: &mut dyn FnMut(&C, &mut T, &mut I),
) where
    T: Terminal,
    I: InputSource,
{
    debug_assert!(!def.entries.is_empty() || def.has_back);

    draw_header(def, session, term);
    let mut anchor = term.cursor();

    loop {
        let (col, row) = anchor;
        term.set_cursor(col, row);
        draw_entries(def, session, term);

        input.poll();
        let event = input.pop_keyboard_event();
        if !event.is_press() {
            continue;
        }

        match event.code {
            KeyCode::Up => {
                if session.selected > 0 {
                    session.selected -= 1;
                }
            }
            KeyCode::Down => {
                if session.selected < def.last_index() {
                    session.selected += 1;
                }
            }
            KeyCode::Return => {
                if def.has_back && session.selected == def.entries.len() {
                    return;
                }
                if let Some(command) = &def.entries[session.selected].command {
                    run_command(command, term, input);
                }
                // The command may have printed over the list region; redraw
                // the header and anchor the list below whatever is on
                // screen now.
                draw_header(def, session, term);
                anchor = term.cursor();
            }
            _ => {}
        }
    }
}

/// Print the title, clearing first on every draw but the session's first.
fn draw_header<C, T: Terminal>(def: &MenuDef<'_, C>, session: &mut MenuSession, term: &mut T) {
    if session.header_drawn {
        term.clear();
    }
    session.header_drawn = true;
    let _ = term.write_str(def.title);
}

fn draw_entries<C, T: Terminal>(def: &MenuDef<'_, C>, session: &MenuSession, term: &mut T) {
    for (index, entry) in def.entries.iter().enumerate() {
        draw_row(term, entry.label, index == session.selected);
    }
    if def.has_back {
        draw_row(term, BACK_LABEL, session.selected == def.entries.len());
    }
    let _ = term.write_str("\n");
}

/// `"[label]"` with colors swapped when selected, `" label "` otherwise;
/// both forms are the same width so frames overdraw cleanly.
fn draw_row<T: Terminal>(term: &mut T, label: &str, selected: bool) {
    let _ = term.write_str("\t");
    if selected {
        term.set_background(Color::LightGray);
        term.set_foreground(Color::Black);
        let _ = writeln!(term, "[{}]", label);
        term.set_foreground(Color::LightGray);
        term.set_background(Color::Black);
    } else {
        let _ = writeln!(term, " {} ", label);
    }
}
