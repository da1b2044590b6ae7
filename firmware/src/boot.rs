//! Ordered bring-up: terminal, storage card, filesystem, menu.
//!
//! Every step gates the next; any failure becomes a [`Halted`] value the
//! entry point renders and parks on. The halt is data rather than a hidden
//! loop, so the boundary is visible to the test suite.

use core::fmt::{self, Write};

use kestrel_core::fmt::SizeFmt;
use kestrel_core::menu::{self, MenuSession};
use kestrel_core::{
    logger, ByteStream, CardError, Color, InputSource, StorageCard, StreamBlockIo, Terminal,
    SECTOR_SIZE,
};
use kestrel_fat::{self as fat, FatError, Volume};

use crate::actions;
use crate::menus;
use crate::xfer::SerialPort;

/// Boot steps in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootStage {
    Terminal,
    CardDetect,
    Mount,
    Menu,
}

/// Why bring-up stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HaltReason {
    Card(CardError),
    Filesystem(FatError),
}

impl fmt::Display for HaltReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Card(e) => write!(f, "storage card: {}", e),
            Self::Filesystem(e) => write!(f, "filesystem: {}", e),
        }
    }
}

/// Terminal boot state: rendered once, never left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Halted {
    pub stage: BootStage,
    pub reason: HaltReason,
}

/// Everything a successful bring-up hands to the menu: the mounted volume,
/// the sector adapter over the card, and the single scratch sector the
/// filesystem driver borrows one call at a time.
pub struct SystemReady<SD: ByteStream> {
    pub volume: Volume,
    pub adapter: StreamBlockIo<SD>,
    pub scratch: [u8; SECTOR_SIZE],
}

/// Steps 1-4: terminal up, card detected and reported, volume mounted and
/// reported. Leaves the boot report on screen for the menu to draw under.
pub fn bring_up<T, SD>(term: &mut T, mut sd: SD) -> Result<SystemReady<SD>, Halted>
where
    T: Terminal,
    SD: StorageCard + ByteStream,
{
    term.clear();
    logger::log("terminal up");

    let _ = term.write_str("Detecting storage card: ");
    let kind = match sd.detect() {
        Ok(kind) => kind,
        Err(e) => {
            return Err(Halted {
                stage: BootStage::CardDetect,
                reason: HaltReason::Card(e),
            })
        }
    };
    let blocks = sd.capacity_blocks();
    term.set_foreground(Color::LightGreen);
    let _ = writeln!(term, "{}", kind.name());
    term.set_foreground(Color::White);
    let _ = writeln!(term, " - Card size: {}B", SizeFmt(blocks * SECTOR_SIZE as u64));
    logger::log("storage card initialized");

    let mut adapter = StreamBlockIo::new(sd, blocks);
    let mut scratch = [0u8; SECTOR_SIZE];

    let _ = term.write_str("Detecting file system: ");
    let volume = match fat::mount(&mut adapter, &mut scratch) {
        Ok(volume) => volume,
        Err(e) => {
            return Err(Halted {
                stage: BootStage::Mount,
                reason: HaltReason::Filesystem(e),
            })
        }
    };
    term.set_foreground(Color::LightGreen);
    let _ = writeln!(term, "{}", volume.kind().name());
    term.set_foreground(Color::White);
    let _ = writeln!(term, " - Volume label: {}\n", volume.label());
    logger::log("filesystem mounted");

    Ok(SystemReady {
        volume,
        adapter,
        scratch,
    })
}

/// Full boot: bring-up, then the root menu for the life of the machine.
/// Returns only with the halt state of a failed bring-up.
pub fn run<T, I, SD, P>(term: &mut T, input: &mut I, sd: SD, serial: &mut P) -> Halted
where
    T: Terminal,
    I: InputSource,
    SD: StorageCard + ByteStream,
    P: SerialPort,
{
    let mut system = match bring_up(term, sd) {
        Ok(system) => system,
        Err(halted) => return halted,
    };
    logger::log("entering main menu");

    let volume = &system.volume;
    let adapter = &mut system.adapter;
    let scratch = &mut system.scratch;
    let mut session = MenuSession::new();
    loop {
        // The root menu has no back slot, so this never comes back;
        // re-entering keeps the invariant anyway should the definition
        // ever grow one.
        menu::execute(
            &menus::MAIN_MENU,
            &mut session,
            term,
            input,
            &mut |command, term, input| {
                actions::run(
                    command,
                    term,
                    input,
                    volume,
                    &mut *adapter,
                    &mut *scratch,
                    &mut *serial,
                );
            },
        );
    }
}

/// Render the halt state in the failure color, then park.
pub fn fatal<T: Terminal>(term: &mut T, halted: Halted) -> ! {
    term.set_foreground(Color::LightRed);
    let _ = writeln!(term, "failed: {}", halted.reason);
    term.set_foreground(Color::White);
    halt_forever()
}

/// The deliberate, irrecoverable park loop.
pub fn halt_forever() -> ! {
    loop {
        core::hint::spin_loop();
    }
}
