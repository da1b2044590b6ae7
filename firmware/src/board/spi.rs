//! SPI controller driver for the SD slot.

use super::map;

const CTRL_SELECT: u32 = 1 << 0;
const STATUS_BUSY: u32 = 1 << 0;

pub struct Spi {
    ctrl: *mut u32,
    status: *mut u32,
    data: *mut u32,
}

impl Spi {
    /// # Safety
    /// `base` must point at an SPI controller register block.
    pub unsafe fn new(base: usize) -> Self {
        Self {
            ctrl: base as *mut u32,
            status: (base + 4) as *mut u32,
            data: (base + 8) as *mut u32,
        }
    }

    pub fn board() -> Self {
        unsafe { Self::new(map::SPI_BASE) }
    }

    /// Drive the chip select.
    pub fn select(&mut self, active: bool) {
        let value = if active { CTRL_SELECT } else { 0 };
        unsafe { core::ptr::write_volatile(self.ctrl, value) }
    }

    /// Clock one byte out and the simultaneous byte in.
    pub fn transfer(&mut self, out: u8) -> u8 {
        unsafe {
            core::ptr::write_volatile(self.data, out as u32);
            while core::ptr::read_volatile(self.status) & STATUS_BUSY != 0 {
                core::hint::spin_loop();
            }
            core::ptr::read_volatile(self.data) as u8
        }
    }
}
