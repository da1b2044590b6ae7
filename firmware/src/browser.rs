//! Nested file-browser menu over the root directory.
//!
//! Collects the root entries into fixed label storage, builds a menu with
//! a back slot, and runs it through the same engine as the main menu.
//! Entries are informational; selecting one does nothing.

use core::fmt::Write;

use kestrel_core::fmt::format_size;
use kestrel_core::menu::{self, MenuDef, MenuEntry, MenuSession};
use kestrel_core::{ByteStream, InputSource, StreamBlockIo, Terminal, SECTOR_SIZE};
use kestrel_fat::{RootDir, Volume};

/// Most entries one browser screen shows.
const MAX_ENTRIES: usize = 16;
const LABEL_LEN: usize = 32;

/// Fixed-capacity label storage for one menu row.
#[derive(Clone, Copy)]
struct Label {
    buf: [u8; LABEL_LEN],
    len: usize,
}

impl Label {
    const EMPTY: Label = Label {
        buf: [0; LABEL_LEN],
        len: 0,
    };

    fn as_str(&self) -> &str {
        core::str::from_utf8(&self.buf[..self.len]).unwrap_or("?")
    }
}

impl Write for Label {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        for &b in s.as_bytes() {
            if self.len < LABEL_LEN {
                self.buf[self.len] = b;
                self.len += 1;
            }
        }
        Ok(())
    }
}

/// Build a menu of the root entries and run it until "Go back".
pub fn browse<T, I, SD>(
    term: &mut T,
    input: &mut I,
    volume: &Volume,
    adapter: &mut StreamBlockIo<SD>,
    scratch: &mut [u8; SECTOR_SIZE],
) where
    T: Terminal,
    I: InputSource,
    SD: ByteStream,
{
    let mut labels = [Label::EMPTY; MAX_ENTRIES];
    let mut count = 0;
    for entry in RootDir::new(&mut *adapter, volume, &mut *scratch) {
        let Ok(entry) = entry else { break };
        if count == MAX_ENTRIES {
            break;
        }
        let label = &mut labels[count];
        if entry.is_directory() {
            let _ = write!(label, "{:<12}  <DIR>", entry.name_str());
        } else {
            let _ = write!(label, "{:<12}  ", entry.name_str());
            let _ = format_size(label, entry.size as u64);
            let _ = label.write_str("B");
        }
        count += 1;
    }

    let mut entries: [MenuEntry<'_, ()>; MAX_ENTRIES] = core::array::from_fn(|_| MenuEntry {
        label: "",
        command: None,
    });
    for (entry, label) in entries.iter_mut().zip(labels.iter()).take(count) {
        entry.label = label.as_str();
    }

    let def = MenuDef {
        title: "Files on card\n----------------------------------------\n",
        entries: &entries[..count],
        has_back: true,
    };

    // Fresh screen for the nested menu; its own session starts unselected.
    term.clear();
    let mut session = MenuSession::new();
    menu::execute(&def, &mut session, term, input, &mut |_, _, _| {});
}
