//! Bare-metal entry for the Kestrel board.

#![cfg_attr(target_os = "none", no_std)]
#![cfg_attr(target_os = "none", no_main)]

#[cfg(target_os = "none")]
mod bare {
    use core::panic::PanicInfo;

    use kestrel_firmware::{board, boot};

    #[no_mangle]
    pub extern "C" fn _start() -> ! {
        board::firmware_main()
    }

    #[panic_handler]
    fn panic(_info: &PanicInfo) -> ! {
        boot::halt_forever()
    }
}

#[cfg(not(target_os = "none"))]
fn main() {
    // The boot ROM only does real work on the board; hosted builds exist
    // for the test suite.
    eprintln!("kestrel-firmware: hosted build, flash the target image to run");
}
