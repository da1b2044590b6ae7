//! FAT16/FAT32 Filesystem (read-only)
//!
//! A `no_std` FAT driver sized for boot firmware: mount, identify, list the
//! root directory, and read whole files by 8.3 name. That is everything the
//! boot menu needs to find and launch a kernel image.
//!
//! # Architecture
//!
//! The implementation is layered:
//! 1. **Volume layer** - Parses the BIOS Parameter Block in sector 0 and
//!    fixes the on-disk geometry
//! 2. **Directory layer** - Iterates root directory entries
//! 3. **File layer** - Reads file data across the cluster chain
//!
//! All storage access goes through a caller-supplied
//! [`gpt_disk_io::BlockIo`] device plus one caller-owned sector scratch
//! buffer; the driver allocates nothing and holds no buffer of its own. The
//! scratch buffer is lent per call, so two operations can never be in
//! flight at once.
//!
//! # Usage
//!
//! ```ignore
//! use kestrel_fat as fat;
//!
//! let mut scratch = [0u8; fat::SECTOR_SIZE];
//! let volume = fat::mount(&mut block_io, &mut scratch)?;
//!
//! let entry = fat::find_entry(&mut block_io, &volume, &mut scratch, "KERNEL.ELF")?;
//! fat::read_file(&mut block_io, &volume, &mut scratch, &entry, &mut load_buf)?;
//! ```

#![no_std]
#![warn(missing_docs)]

pub mod directory;
pub mod error;
pub mod file;
pub mod types;
pub mod volume;

pub use error::{FatError, Result};
pub use types::{DirEntry, FatKind, Volume, SECTOR_SIZE};

// High-level API exports
pub use directory::{find_entry, RootDir};
pub use file::read_file;
pub use volume::mount;
