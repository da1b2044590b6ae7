//! Board support: the memory map and the MMIO drivers behind the core
//! contracts.

pub mod kbd;
pub mod map;
pub mod sd;
pub mod spi;
pub mod uart;
pub mod vram;

pub use kbd::Keyboard;
pub use sd::SdCard;
pub use spi::Spi;
pub use uart::Uart;
pub use vram::Vram;

use kestrel_display::TextConsole;

/// Poke the system controller's reset register. Does not return.
pub fn reboot() -> ! {
    unsafe {
        core::ptr::write_volatile(map::SYSCTL_RESET as *mut u32, map::SYSCTL_RESET_MAGIC);
    }
    // The register takes effect within a few cycles; park until it does.
    crate::boot::halt_forever()
}

/// Assemble the board devices and run the firmware. Never returns.
pub fn firmware_main() -> ! {
    let mut term = TextConsole::new(Vram::board());
    let mut input = Keyboard::board();
    let sd = SdCard::board();
    let mut serial = Uart::board();

    let halted = crate::boot::run(&mut term, &mut input, sd, &mut serial);
    crate::boot::fatal(&mut term, halted)
}
