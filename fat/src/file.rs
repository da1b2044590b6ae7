//! Whole-file reads across the cluster chain

use gpt_disk_io::BlockIo;
use gpt_disk_types::Lba;

use crate::error::{FatError, Result};
use crate::types::{DirEntry, Volume, SECTOR_SIZE};
use crate::volume::next_cluster;

/// Read an entire file into the front of `dst`, returning the byte count.
///
/// The chain is validated as it is walked: clusters outside the data
/// region, a chain shorter than the recorded size, or one longer than the
/// volume are all errors rather than partial reads.
pub fn read_file<B: BlockIo>(
    io: &mut B,
    volume: &Volume,
    scratch: &mut [u8; SECTOR_SIZE],
    entry: &DirEntry,
    dst: &mut [u8],
) -> Result<usize> {
    let size = entry.size as usize;
    if dst.len() < size {
        return Err(FatError::BufferTooSmall);
    }
    if size == 0 {
        return Ok(0);
    }

    let mut cluster = entry.first_cluster;
    let mut written = 0usize;
    let mut hops = 0u32;

    while written < size {
        volume.check_cluster(cluster)?;

        let base = volume.cluster_to_lba(cluster);
        let mut sector = 0;
        while sector < volume.sectors_per_cluster && written < size {
            io.read_blocks(Lba(base + sector as u64), scratch)
                .map_err(|_| FatError::Io)?;
            let take = (size - written).min(SECTOR_SIZE);
            dst[written..written + take].copy_from_slice(&scratch[..take]);
            written += take;
            sector += 1;
        }

        if written < size {
            cluster = next_cluster(io, volume, scratch, cluster)?
                .ok_or(FatError::TruncatedChain)?;
            hops += 1;
            if hops > volume.total_clusters {
                return Err(FatError::ChainTooLong);
            }
        }
    }

    Ok(size)
}
