//! SDRAM diagnostic.
//!
//! Two passes over the test window: addresses written as data to catch
//! decoder faults, then fixed patterns to catch stuck and coupled bits.

use core::fmt::Write;
use core::ptr;

use kestrel_core::{Color, InputSource, Terminal};

use crate::board::map;

const PATTERNS: [u32; 4] = [0x0000_0000, 0xFFFF_FFFF, 0xAA55_AA55, 0x55AA_55AA];
const WORDS: usize = map::SDRAM_TEST_LEN / 4;

/// Run both passes, report, and hold until a key press.
pub fn run<T: Terminal, I: InputSource>(term: &mut T, input: &mut I) {
    term.clear();
    let _ = writeln!(
        term,
        "Testing SDRAM at {:#010x}, {}k window",
        map::SDRAM_TEST_BASE,
        map::SDRAM_TEST_LEN / 1024
    );

    let _ = term.write_str("address pass: ");
    let mut errors = address_pass();
    report_pass(term, errors);

    for pattern in PATTERNS {
        let _ = write!(term, "pattern {:#010x}: ", pattern);
        let e = pattern_pass(pattern);
        report_pass(term, e);
        errors += e;
    }

    if errors == 0 {
        let _ = writeln!(term, "SDRAM OK");
    } else {
        term.set_foreground(Color::LightRed);
        let _ = writeln!(term, "{} total errors", errors);
        term.set_foreground(Color::LightGray);
    }
    let _ = writeln!(term, "Press any key.");
    input.poll();
    let _ = input.pop_keyboard_event();
}

fn report_pass<T: Terminal>(term: &mut T, errors: u32) {
    if errors == 0 {
        let _ = writeln!(term, "ok");
    } else {
        let _ = writeln!(term, "{} errors", errors);
    }
}

fn window() -> *mut u32 {
    map::SDRAM_TEST_BASE as *mut u32
}

fn address_pass() -> u32 {
    let base = window();
    let mut errors = 0;
    unsafe {
        for i in 0..WORDS {
            ptr::write_volatile(base.add(i), i as u32);
        }
        for i in 0..WORDS {
            if ptr::read_volatile(base.add(i)) != i as u32 {
                errors += 1;
            }
        }
    }
    errors
}

fn pattern_pass(pattern: u32) -> u32 {
    let base = window();
    let mut errors = 0;
    unsafe {
        for i in 0..WORDS {
            ptr::write_volatile(base.add(i), pattern);
        }
        for i in 0..WORDS {
            if ptr::read_volatile(base.add(i)) != pattern {
                errors += 1;
            }
        }
    }
    errors
}
