//! Main menu command handlers.

use core::fmt::Write;

use kestrel_core::fmt::SizeFmt;
use kestrel_core::{ByteStream, Color, InputSource, StreamBlockIo, Terminal, SECTOR_SIZE};
use kestrel_fat::{RootDir, Volume};

use crate::menus::Command;
use crate::xfer::{self, SerialPort};
use crate::{browser, loader, memtest};

/// Dispatch one menu command. Runs synchronously; the menu engine redraws
/// its header when this returns.
pub fn run<T, I, SD, P>(
    command: &Command,
    term: &mut T,
    input: &mut I,
    volume: &Volume,
    adapter: &mut StreamBlockIo<SD>,
    scratch: &mut [u8; SECTOR_SIZE],
    serial: &mut P,
) where
    T: Terminal,
    I: InputSource,
    SD: ByteStream,
    P: SerialPort,
{
    match command {
        Command::BootKernel { debug } => {
            // A boot attempt only ever comes back with a reason.
            let err = loader::boot_kernel(volume, adapter, scratch, *debug);
            term.set_foreground(Color::LightRed);
            let _ = writeln!(term, "kernel boot failed: {}", err);
            term.set_foreground(Color::LightGray);
            wait_key(input);
        }
        Command::Browse => browser::browse(term, input, volume, adapter, scratch),
        Command::SerialReceive => {
            match xfer::receive_image(term, serial, adapter) {
                Ok(sectors) => {
                    let _ = writeln!(term, "received {} sectors", sectors);
                }
                Err(e) => {
                    term.set_foreground(Color::LightRed);
                    let _ = writeln!(term, "transfer failed: {}", e);
                    term.set_foreground(Color::LightGray);
                }
            }
            wait_key(input);
        }
        Command::MemTest => memtest::run(term, input),
        Command::ListRoot => list_root(term, input, volume, adapter, scratch),
        Command::Reboot => crate::board::reboot(),
    }
}

/// Print every root entry with its size, then hold until a key press.
fn list_root<T, I, SD>(
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
    term.clear();
    let _ = writeln!(term, "Root directory of {}:", volume.label());

    let mut shown = 0u32;
    for entry in RootDir::new(adapter, volume, scratch) {
        match entry {
            Ok(entry) => {
                if entry.is_directory() {
                    let _ = writeln!(term, "{:<12}  <DIR>", entry.name_str());
                } else {
                    let _ = writeln!(term, "{:<12}  {}B", entry.name_str(), SizeFmt(entry.size as u64));
                }
                shown += 1;
            }
            Err(e) => {
                term.set_foreground(Color::LightRed);
                let _ = writeln!(term, "read error: {}", e);
                term.set_foreground(Color::LightGray);
                break;
            }
        }
    }
    let _ = writeln!(term, "{} entries. Press any key.", shown);
    wait_key(input);
}

/// Block for one key event and consume it so it does not leak into the
/// menu loop.
fn wait_key<I: InputSource>(input: &mut I) {
    input.poll();
    let _ = input.pop_keyboard_event();
}
