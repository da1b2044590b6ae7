//! ELF kernel loading.
//!
//! Reads `/KERNEL.ELF` from the card into the staging window, validates
//! the headers, copies the loadable segments to their physical addresses,
//! and jumps. The kernel ABI is one argument: the debug flag.

use core::fmt;

use kestrel_core::{ByteStream, StreamBlockIo, SECTOR_SIZE};
use kestrel_fat::{self as fat, FatError, Volume};

use crate::board::map;

/// Root directory name of the kernel image.
pub const KERNEL_NAME: &str = "KERNEL.ELF";

const ELF_MAGIC: [u8; 4] = [0x7F, b'E', b'L', b'F'];
const ELFCLASS32: u8 = 1;
const ELFDATA2LSB: u8 = 1;
const ET_EXEC: u16 = 2;
const PT_LOAD: u32 = 1;
const EHDR_LEN: usize = 52;
const PHDR_LEN: usize = 32;

/// Why a kernel failed to start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadError {
    /// Lookup or read failed.
    Filesystem(FatError),
    /// Image larger than the staging window.
    TooLarge,
    /// Not an ELF file.
    NotElf,
    /// Not a 32-bit little-endian executable.
    WrongFormat,
    /// Headers inconsistent with the file size.
    BadImage,
    /// No kernel jump on a hosted build.
    Unsupported,
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Filesystem(e) => write!(f, "{}", e),
            Self::TooLarge => write!(f, "image larger than the staging window"),
            Self::NotElf => write!(f, "not an ELF image"),
            Self::WrongFormat => write!(f, "not a 32-bit little-endian executable"),
            Self::BadImage => write!(f, "inconsistent ELF headers"),
            Self::Unsupported => write!(f, "kernel start unsupported on this build"),
        }
    }
}

fn read_u16(image: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([image[at], image[at + 1]])
}

fn read_u32(image: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([image[at], image[at + 1], image[at + 2], image[at + 3]])
}

/// One loadable segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Segment {
    offset: u32,
    paddr: u32,
    filesz: u32,
    memsz: u32,
}

/// Check the headers and return the entry point. Every later access is
/// bounds-checked here.
fn validate(image: &[u8]) -> Result<u32, LoadError> {
    if image.len() < EHDR_LEN {
        return Err(LoadError::BadImage);
    }
    if image[0..4] != ELF_MAGIC {
        return Err(LoadError::NotElf);
    }
    if image[4] != ELFCLASS32 || image[5] != ELFDATA2LSB {
        return Err(LoadError::WrongFormat);
    }
    if read_u16(image, 16) != ET_EXEC {
        return Err(LoadError::WrongFormat);
    }
    if read_u16(image, 42) as usize != PHDR_LEN {
        return Err(LoadError::BadImage);
    }
    for segment in segments(image) {
        segment?;
    }
    Ok(read_u32(image, 24))
}

/// Iterate the PT_LOAD program headers with bounds checks.
fn segments(image: &[u8]) -> impl Iterator<Item = Result<Segment, LoadError>> + '_ {
    let phoff = read_u32(image, 28) as usize;
    let phnum = read_u16(image, 44) as usize;
    (0..phnum).filter_map(move |i| {
        let at = phoff + i * PHDR_LEN;
        if at + PHDR_LEN > image.len() {
            return Some(Err(LoadError::BadImage));
        }
        if read_u32(image, at) != PT_LOAD {
            return None;
        }
        let segment = Segment {
            offset: read_u32(image, at + 4),
            paddr: read_u32(image, at + 12),
            filesz: read_u32(image, at + 16),
            memsz: read_u32(image, at + 20),
        };
        if segment.filesz > segment.memsz {
            return Some(Err(LoadError::BadImage));
        }
        match segment.offset.checked_add(segment.filesz) {
            Some(end) if end as usize <= image.len() => Some(Ok(segment)),
            _ => Some(Err(LoadError::BadImage)),
        }
    })
}

/// Load and start the kernel. Returns only with the reason it could not.
pub fn boot_kernel<SD: ByteStream>(
    volume: &Volume,
    adapter: &mut StreamBlockIo<SD>,
    scratch: &mut [u8; SECTOR_SIZE],
    debug: bool,
) -> LoadError {
    let entry = match fat::find_entry(adapter, volume, scratch, KERNEL_NAME) {
        Ok(entry) => entry,
        Err(e) => return LoadError::Filesystem(e),
    };
    if entry.size as usize > map::KERNEL_STAGING_LEN {
        return LoadError::TooLarge;
    }

    // Stage the whole image, then scatter the segments out of it.
    let staging = unsafe {
        core::slice::from_raw_parts_mut(map::KERNEL_STAGING_BASE as *mut u8, map::KERNEL_STAGING_LEN)
    };
    let size = match fat::read_file(adapter, volume, scratch, &entry, staging) {
        Ok(size) => size,
        Err(e) => return LoadError::Filesystem(e),
    };
    let image = &staging[..size];

    let entry_point = match validate(image) {
        Ok(entry_point) => entry_point,
        Err(e) => return e,
    };

    for segment in segments(image) {
        let Ok(segment) = segment else {
            return LoadError::BadImage;
        };
        unsafe {
            let dest = segment.paddr as usize as *mut u8;
            core::ptr::copy_nonoverlapping(
                image.as_ptr().add(segment.offset as usize),
                dest,
                segment.filesz as usize,
            );
            core::ptr::write_bytes(
                dest.add(segment.filesz as usize),
                0,
                (segment.memsz - segment.filesz) as usize,
            );
        }
    }

    enter(entry_point, debug)
}

#[cfg(target_os = "none")]
fn enter(entry_point: u32, debug: bool) -> LoadError {
    let kernel: extern "C" fn(u32) -> ! =
        unsafe { core::mem::transmute(entry_point as usize) };
    kernel(debug as u32)
}

#[cfg(not(target_os = "none"))]
fn enter(_entry_point: u32, _debug: bool) -> LoadError {
    // Hosted builds have no kernel to jump into.
    LoadError::Unsupported
}
