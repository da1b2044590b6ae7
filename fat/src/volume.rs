//! Boot sector parsing and volume mount
//!
//! The BIOS Parameter Block in sector 0 fixes the whole on-disk geometry.
//! The FAT variant is decided by the data-cluster count, not by the
//! free-text type string, per the FAT specification.

use gpt_disk_io::BlockIo;
use gpt_disk_types::Lba;

use crate::error::{FatError, Result};
use crate::types::{FatKind, Volume, SECTOR_SIZE};

/// Offset of the FAT16 volume label in the BPB.
const LABEL_OFFSET_FAT16: usize = 43;
/// Offset of the FAT32 volume label in the BPB.
const LABEL_OFFSET_FAT32: usize = 71;

/// Mount a FAT volume from sector 0 of the block device.
///
/// `scratch` is the caller-owned sector buffer every subsequent operation
/// reuses; the driver holds no storage of its own.
pub fn mount<B: BlockIo>(io: &mut B, scratch: &mut [u8; SECTOR_SIZE]) -> Result<Volume> {
    io.read_blocks(Lba(0), scratch).map_err(|_| FatError::Io)?;

    if scratch[510] != 0x55 || scratch[511] != 0xAA {
        return Err(FatError::InvalidBootSector);
    }

    let bytes_per_sector = u16::from_le_bytes([scratch[11], scratch[12]]) as usize;
    let sectors_per_cluster = scratch[13] as u32;
    let reserved_sectors = u16::from_le_bytes([scratch[14], scratch[15]]) as u64;
    let num_fats = scratch[16] as u64;
    let root_entries = u16::from_le_bytes([scratch[17], scratch[18]]) as u32;
    let total_16 = u16::from_le_bytes([scratch[19], scratch[20]]) as u64;
    let fat_size_16 = u16::from_le_bytes([scratch[22], scratch[23]]) as u64;
    let total_32 = u32::from_le_bytes([scratch[32], scratch[33], scratch[34], scratch[35]]) as u64;
    let fat_size_32 = u32::from_le_bytes([scratch[36], scratch[37], scratch[38], scratch[39]]) as u64;

    if bytes_per_sector != SECTOR_SIZE
        || sectors_per_cluster == 0
        || reserved_sectors == 0
        || num_fats == 0
    {
        return Err(FatError::InvalidGeometry);
    }

    let fat_sectors = if fat_size_16 != 0 { fat_size_16 } else { fat_size_32 };
    let total_sectors = if total_16 != 0 { total_16 } else { total_32 };
    if fat_sectors == 0 || total_sectors == 0 {
        return Err(FatError::InvalidGeometry);
    }

    let root_dir_sectors = (root_entries * 32).div_ceil(SECTOR_SIZE as u32);
    let fat_start = reserved_sectors;
    let root_dir_start = fat_start + num_fats * fat_sectors;
    let data_start = root_dir_start + root_dir_sectors as u64;

    let data_sectors = total_sectors
        .checked_sub(data_start)
        .ok_or(FatError::InvalidGeometry)?;
    let total_clusters = (data_sectors / sectors_per_cluster as u64) as u32;

    let kind = if total_clusters < 4085 {
        // FAT12: not worth carrying for this firmware's media.
        return Err(FatError::UnsupportedVariant);
    } else if total_clusters < 65525 {
        FatKind::Fat16
    } else {
        FatKind::Fat32
    };

    let (root_cluster, label_offset) = match kind {
        FatKind::Fat16 => (0, LABEL_OFFSET_FAT16),
        FatKind::Fat32 => (
            u32::from_le_bytes([scratch[44], scratch[45], scratch[46], scratch[47]]),
            LABEL_OFFSET_FAT32,
        ),
    };

    if kind == FatKind::Fat32 && root_cluster < 2 {
        return Err(FatError::InvalidGeometry);
    }

    let mut label = [0u8; 11];
    label.copy_from_slice(&scratch[label_offset..label_offset + 11]);

    Ok(Volume {
        kind,
        fat_start,
        root_dir_start,
        root_dir_sectors,
        root_cluster,
        data_start,
        sectors_per_cluster,
        total_clusters,
        label,
    })
}

/// Follow the FAT one hop: the cluster after `cluster`, or `None` at the
/// end-of-chain marker.
pub(crate) fn next_cluster<B: BlockIo>(
    io: &mut B,
    volume: &Volume,
    scratch: &mut [u8; SECTOR_SIZE],
    cluster: u32,
) -> Result<Option<u32>> {
    match volume.kind {
        FatKind::Fat16 => {
            let offset = cluster as u64 * 2;
            let sector = volume.fat_start + offset / SECTOR_SIZE as u64;
            io.read_blocks(Lba(sector), scratch).map_err(|_| FatError::Io)?;
            let at = (offset % SECTOR_SIZE as u64) as usize;
            let value = u16::from_le_bytes([scratch[at], scratch[at + 1]]);
            match value {
                0xFFF7 => Err(FatError::BadCluster),
                v if v >= 0xFFF8 => Ok(None),
                v if v < 2 => Err(FatError::BadCluster),
                v => Ok(Some(v as u32)),
            }
        }
        FatKind::Fat32 => {
            let offset = cluster as u64 * 4;
            let sector = volume.fat_start + offset / SECTOR_SIZE as u64;
            io.read_blocks(Lba(sector), scratch).map_err(|_| FatError::Io)?;
            let at = (offset % SECTOR_SIZE as u64) as usize;
            let value = u32::from_le_bytes([
                scratch[at],
                scratch[at + 1],
                scratch[at + 2],
                scratch[at + 3],
            ]) & 0x0FFF_FFFF;
            match value {
                0x0FFF_FFF7 => Err(FatError::BadCluster),
                v if v >= 0x0FFF_FFF8 => Ok(None),
                v if v < 2 => Err(FatError::BadCluster),
                v => Ok(Some(v)),
            }
        }
    }
}
