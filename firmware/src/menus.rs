//! Main menu definition.

use kestrel_core::menu::{MenuDef, MenuEntry};

/// Typed menu commands. Each entry carries exactly the data its handler
/// needs instead of an untyped argument slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    BootKernel { debug: bool },
    Browse,
    SerialReceive,
    MemTest,
    ListRoot,
    Reboot,
}

/// The root menu. No back slot: this menu owns the machine.
pub static MAIN_MENU: MenuDef<'static, Command> = MenuDef {
    title: "Kestrel Boot ROM\nMain menu\n----------------------------------------\n",
    entries: &[
        MenuEntry {
            label: "Boot kernel.elf",
            command: Some(Command::BootKernel { debug: false }),
        },
        MenuEntry {
            label: "Debug kernel.elf",
            command: Some(Command::BootKernel { debug: true }),
        },
        MenuEntry {
            label: "Browse card filesystem",
            command: Some(Command::Browse),
        },
        MenuEntry {
            label: "Receive card image over serial",
            command: Some(Command::SerialReceive),
        },
        MenuEntry {
            label: "SDRAM memtest",
            command: Some(Command::MemTest),
        },
        MenuEntry {
            label: "List root directory",
            command: Some(Command::ListRoot),
        },
        MenuEntry {
            label: "Reboot",
            command: Some(Command::Reboot),
        },
    ],
    has_back: false,
};
