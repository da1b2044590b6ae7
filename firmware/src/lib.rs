//! Kestrel boot firmware.
//!
//! Brings up the terminal, detects the storage card, mounts the FAT volume
//! through the streaming sector adapter, and hands the machine to the root
//! menu: kernel boot, file browser, serial image receive, memory test,
//! directory listing, reboot.
//!
//! Everything here is reachable from a hosted build too; only the entry
//! point, the panic handler, and the actual kernel jump are gated on the
//! bare-metal target. That is what lets the boot flow run under the test
//! suite against mock devices.

#![no_std]

pub mod actions;
pub mod board;
pub mod boot;
pub mod browser;
pub mod loader;
pub mod memtest;
pub mod menus;
pub mod xfer;
