//! Board memory map.

/// Character VRAM: one u16 per cell, attribute in the high byte.
pub const VRAM_BASE: usize = 0x00E0_0000;
pub const VRAM_COLS: usize = 80;
pub const VRAM_ROWS: usize = 30;

/// Keyboard controller: STATUS at +0, DATA at +4.
pub const KBD_BASE: usize = 0x00F0_0100;

/// UART: STATUS at +0, DATA at +4.
pub const UART_BASE: usize = 0x00F0_0200;

/// SPI controller wired to the SD slot: CTRL at +0, STATUS at +4, DATA at +8.
pub const SPI_BASE: usize = 0x00F0_0300;

/// System controller reset register; writing the magic pulls reset.
pub const SYSCTL_RESET: usize = 0x00F0_0010;
pub const SYSCTL_RESET_MAGIC: u32 = 0x5EB0_07ED;

/// SDRAM window exercised by the memory test, above the firmware image.
pub const SDRAM_TEST_BASE: usize = 0x0010_0000;
pub const SDRAM_TEST_LEN: usize = 0x0010_0000;

/// Staging area for kernel images read from the card.
pub const KERNEL_STAGING_BASE: usize = 0x0040_0000;
pub const KERNEL_STAGING_LEN: usize = 0x0040_0000;
