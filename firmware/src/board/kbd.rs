//! Keyboard controller driver.
//!
//! The controller queues event words in a hardware FIFO: bit 8 set on
//! press, clear on release, the low byte carrying either a cursor-key code
//! or the ASCII value. `poll` drains the FIFO into a small software ring
//! and blocks until at least one event is there.

use kestrel_core::{InputSource, KeyCode, KeyEvent};

use super::map;

const STATUS_EVENT_READY: u32 = 1 << 0;
const EVENT_PRESS: u32 = 1 << 8;

const CODE_UP: u8 = 0x01;
const CODE_DOWN: u8 = 0x02;
const CODE_RETURN: u8 = 0x03;
const CODE_ESCAPE: u8 = 0x04;

const QUEUE_LEN: usize = 16;

pub struct Keyboard {
    status: *mut u32,
    data: *mut u32,
    queue: [KeyEvent; QUEUE_LEN],
    head: usize,
    len: usize,
}

impl Keyboard {
    /// # Safety
    /// `base` must point at a keyboard controller register block.
    pub unsafe fn new(base: usize) -> Self {
        Self {
            status: base as *mut u32,
            data: (base + 4) as *mut u32,
            queue: [KeyEvent::NONE; QUEUE_LEN],
            head: 0,
            len: 0,
        }
    }

    pub fn board() -> Self {
        unsafe { Self::new(map::KBD_BASE) }
    }

    fn controller_ready(&self) -> bool {
        unsafe { core::ptr::read_volatile(self.status) & STATUS_EVENT_READY != 0 }
    }

    fn drain_controller(&mut self) {
        while self.len < QUEUE_LEN && self.controller_ready() {
            let word = unsafe { core::ptr::read_volatile(self.data) };
            let tail = (self.head + self.len) % QUEUE_LEN;
            self.queue[tail] = decode(word);
            self.len += 1;
        }
    }
}

fn decode(word: u32) -> KeyEvent {
    let code = match (word & 0xFF) as u8 {
        CODE_UP => KeyCode::Up,
        CODE_DOWN => KeyCode::Down,
        CODE_RETURN => KeyCode::Return,
        CODE_ESCAPE => KeyCode::Escape,
        c if (0x20..0x7F).contains(&c) => KeyCode::Char(c),
        _ => KeyCode::Unknown,
    };
    if word & EVENT_PRESS != 0 {
        KeyEvent::press(code)
    } else {
        KeyEvent::release(code)
    }
}

impl InputSource for Keyboard {
    fn poll(&mut self) {
        self.drain_controller();
        while self.len == 0 {
            core::hint::spin_loop();
            self.drain_controller();
        }
    }

    fn pop_keyboard_event(&mut self) -> KeyEvent {
        if self.len == 0 {
            return KeyEvent::NONE;
        }
        let event = self.queue[self.head];
        self.head = (self.head + 1) % QUEUE_LEN;
        self.len -= 1;
        event
    }
}
