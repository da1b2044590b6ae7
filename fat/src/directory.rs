//! Root directory iteration and 8.3 name lookup
//!
//! Subdirectory traversal is deliberately absent: every file the firmware
//! cares about lives in the root. The iterator shape would extend to
//! arbitrary directories by seeding [`RootDir`] with a different start
//! cluster.

use gpt_disk_io::BlockIo;
use gpt_disk_types::Lba;

use crate::error::{FatError, Result};
use crate::types::{DirEntry, FatKind, Volume, DIR_ENTRY_SIZE, SECTOR_SIZE};
use crate::volume::next_cluster;

const ENTRIES_PER_SECTOR: usize = SECTOR_SIZE / DIR_ENTRY_SIZE;

const ENTRY_DELETED: u8 = 0xE5;
/// Lead byte escape for a real 0xE5.
const ENTRY_E5_ESCAPE: u8 = 0x05;
const ATTR_LONG_NAME: u8 = 0x0F;
const ATTR_VOLUME_ID: u8 = 0x08;

/// Where the iterator currently is on disk.
enum Location {
    /// FAT16 fixed root region.
    Fixed { sector: u64, remaining: u32 },
    /// FAT32 root cluster chain.
    Clustered { cluster: u32, sector_in_cluster: u32 },
}

/// Iterator over the root directory.
///
/// Borrows the device and the scratch sector for its whole lifetime, so
/// nothing else can touch the medium while a listing is in progress.
pub struct RootDir<'a, B: BlockIo> {
    io: &'a mut B,
    volume: &'a Volume,
    scratch: &'a mut [u8; SECTOR_SIZE],
    location: Location,
    entry: usize,
    loaded: Option<u64>,
    done: bool,
}

impl<'a, B: BlockIo> RootDir<'a, B> {
    /// Start a listing at the first root entry.
    pub fn new(io: &'a mut B, volume: &'a Volume, scratch: &'a mut [u8; SECTOR_SIZE]) -> Self {
        let location = match volume.kind() {
            FatKind::Fat16 => Location::Fixed {
                sector: volume.root_dir_start,
                remaining: volume.root_dir_sectors,
            },
            FatKind::Fat32 => Location::Clustered {
                cluster: volume.root_cluster,
                sector_in_cluster: 0,
            },
        };
        let done = matches!(location, Location::Fixed { remaining: 0, .. });
        RootDir {
            io,
            volume,
            scratch,
            location,
            entry: 0,
            loaded: None,
            done,
        }
    }

    fn current_lba(&self) -> u64 {
        match self.location {
            Location::Fixed { sector, .. } => sector,
            Location::Clustered {
                cluster,
                sector_in_cluster,
            } => self.volume.cluster_to_lba(cluster) + sector_in_cluster as u64,
        }
    }

    /// Step to the next on-disk entry slot.
    fn advance(&mut self) -> Result<()> {
        self.entry += 1;
        if self.entry < ENTRIES_PER_SECTOR {
            return Ok(());
        }
        self.entry = 0;
        match &mut self.location {
            Location::Fixed { sector, remaining } => {
                *remaining -= 1;
                if *remaining == 0 {
                    self.done = true;
                } else {
                    *sector += 1;
                }
            }
            Location::Clustered {
                cluster,
                sector_in_cluster,
            } => {
                *sector_in_cluster += 1;
                if *sector_in_cluster == self.volume.sectors_per_cluster {
                    // The FAT lookup reuses the scratch sector.
                    self.loaded = None;
                    let current = *cluster;
                    match next_cluster(self.io, self.volume, self.scratch, current)? {
                        Some(next) => {
                            *cluster = next;
                            *sector_in_cluster = 0;
                        }
                        None => self.done = true,
                    }
                }
            }
        }
        Ok(())
    }
}

impl<'a, B: BlockIo> Iterator for RootDir<'a, B> {
    type Item = Result<DirEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.done {
                return None;
            }

            let lba = self.current_lba();
            if self.loaded != Some(lba) {
                if let Err(e) = self
                    .io
                    .read_blocks(Lba(lba), self.scratch)
                    .map_err(|_| FatError::Io)
                {
                    self.done = true;
                    return Some(Err(e));
                }
                self.loaded = Some(lba);
            }

            let offset = self.entry * DIR_ENTRY_SIZE;
            let mut raw = [0u8; DIR_ENTRY_SIZE];
            raw.copy_from_slice(&self.scratch[offset..offset + DIR_ENTRY_SIZE]);

            // 0x00 lead byte marks the end of the directory.
            if raw[0] == 0x00 {
                self.done = true;
                return None;
            }

            if let Err(e) = self.advance() {
                self.done = true;
                return Some(Err(e));
            }

            if let Some(entry) = decode(&raw) {
                return Some(Ok(entry));
            }
        }
    }
}

/// Decode one raw slot; `None` for deleted entries, long-name fragments,
/// and the volume label.
fn decode(raw: &[u8; DIR_ENTRY_SIZE]) -> Option<DirEntry> {
    if raw[0] == ENTRY_DELETED {
        return None;
    }
    let attributes = raw[11];
    if attributes & ATTR_LONG_NAME == ATTR_LONG_NAME {
        return None;
    }
    if attributes & ATTR_VOLUME_ID != 0 {
        return None;
    }

    let mut base = [0u8; 8];
    base.copy_from_slice(&raw[0..8]);
    if base[0] == ENTRY_E5_ESCAPE {
        base[0] = 0xE5;
    }

    let mut name = [0u8; 12];
    let mut len = 0;
    let base_len = 8 - base.iter().rev().take_while(|&&b| b == b' ').count();
    name[..base_len].copy_from_slice(&base[..base_len]);
    len += base_len;

    let ext = &raw[8..11];
    let ext_len = 3 - ext.iter().rev().take_while(|&&b| b == b' ').count();
    if ext_len > 0 {
        name[len] = b'.';
        len += 1;
        name[len..len + ext_len].copy_from_slice(&ext[..ext_len]);
        len += ext_len;
    }

    let cluster_high = u16::from_le_bytes([raw[20], raw[21]]) as u32;
    let cluster_low = u16::from_le_bytes([raw[26], raw[27]]) as u32;

    Some(DirEntry {
        name,
        name_len: len as u8,
        attributes,
        first_cluster: (cluster_high << 16) | cluster_low,
        size: u32::from_le_bytes([raw[28], raw[29], raw[30], raw[31]]),
    })
}

/// Find a root entry by formatted name (`"KERNEL.ELF"`), ASCII
/// case-insensitive.
pub fn find_entry<B: BlockIo>(
    io: &mut B,
    volume: &Volume,
    scratch: &mut [u8; SECTOR_SIZE],
    name: &str,
) -> Result<DirEntry> {
    let mut dir = RootDir::new(io, volume, scratch);
    while let Some(entry) = dir.next() {
        let entry = entry?;
        if entry.name_str().eq_ignore_ascii_case(name) {
            return Ok(entry);
        }
    }
    Err(FatError::NotFound)
}
