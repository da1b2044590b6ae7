//! Streaming sector I/O.
//!
//! The storage transport exposes only a byte-at-a-time primitive: an
//! operation is opened for one sector, then bytes are clocked across one per
//! call while the reported phase says more remain. [`StreamBlockIo`] drives
//! that handshake for whole sectors and presents the result as a
//! [`BlockIo`] device, which is how the filesystem driver binds to it.
//!
//! The phase ordering is the load-bearing part: a device can report
//! [`StreamPhase::Failed`] from the begin call (no card in the slot) or from
//! any transfer call (card pulled mid-access), so the adapter checks before
//! entering the byte loop and again after leaving it. A sector that failed
//! anywhere is failed whole; partially filled buffers are never reported as
//! data.

use core::fmt;

use gpt_disk_io::BlockIo;
use gpt_disk_types::{BlockSize, Lba};

/// Storage sector size in bytes.
pub const SECTOR_SIZE: usize = 512;

/// Result type for streaming operations.
pub type Result<T> = core::result::Result<T, StreamError>;

/// Handshake state of one streaming operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamPhase {
    /// No transfer opened yet.
    Begin,
    /// Transfer open; `n >= 1` bytes remain. `InProgress(0)` is not a
    /// valid state, transports report [`StreamPhase::Complete`] instead.
    InProgress(u32),
    /// Transfer finished; no further bytes.
    Complete,
    /// Device failed. Terminal for this operation.
    Failed,
}

/// Errors that can occur while streaming a sector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamError {
    /// The transport reported failure, at begin or mid-transfer.
    DeviceFailed,
    /// The device tried to stream past the sector boundary.
    Overrun,
    /// Caller buffer smaller than one sector.
    BufferTooSmall,
    /// Multi-sector length is not a whole number of sectors.
    Unaligned,
}

impl fmt::Display for StreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeviceFailed => write!(f, "storage device failed"),
            Self::Overrun => write!(f, "device streamed past the sector boundary"),
            Self::BufferTooSmall => write!(f, "buffer smaller than one sector"),
            Self::Unaligned => write!(f, "length is not a whole number of sectors"),
        }
    }
}

/// Byte-streaming storage transport.
///
/// The contract binding any implementation:
/// - `begin_*` opens the operation for one sector and returns the first
///   phase; `Failed` here means the operation never started.
/// - `next_read_byte` returns one byte plus the phase after it:
///   `InProgress(n)` counts the bytes still unread, `Complete` follows the
///   final byte.
/// - `next_write_byte` accepts one byte and reports remaining capacity the
///   same way.
/// - After `Failed` is observed, no further transfer calls are made for
///   that operation.
pub trait ByteStream {
    fn begin_read(&mut self, sector: Lba) -> StreamPhase;
    fn next_read_byte(&mut self) -> (u8, StreamPhase);
    fn begin_write(&mut self, sector: Lba) -> StreamPhase;
    fn next_write_byte(&mut self, byte: u8) -> StreamPhase;
}

/// Sector adapter over a byte-streaming transport.
///
/// Owns the transport and turns the per-byte handshake into whole-sector
/// reads and writes. The filesystem driver sees it as a [`BlockIo`] device
/// and has no other path to the medium.
pub struct StreamBlockIo<D: ByteStream> {
    dev: D,
    num_blocks: u64,
}

impl<D: ByteStream> StreamBlockIo<D> {
    /// Wrap a transport reporting `num_blocks` addressable sectors.
    pub fn new(dev: D, num_blocks: u64) -> Self {
        Self { dev, num_blocks }
    }

    /// Access the wrapped transport.
    pub fn device_mut(&mut self) -> &mut D {
        &mut self.dev
    }

    /// Read one sector into the first [`SECTOR_SIZE`] bytes of `buf`.
    ///
    /// On any error the buffer contents are not trustworthy.
    pub fn read_sector(&mut self, sector: Lba, buf: &mut [u8]) -> Result<()> {
        if buf.len() < SECTOR_SIZE {
            return Err(StreamError::BufferTooSmall);
        }

        let mut phase = self.dev.begin_read(sector);
        if let StreamPhase::Failed = phase {
            // Fail-fast devices are caught before any transfer call.
            return Err(StreamError::DeviceFailed);
        }

        let mut offset = 0;
        while let StreamPhase::InProgress(_) = phase {
            if offset == SECTOR_SIZE {
                return Err(StreamError::Overrun);
            }
            let (byte, next) = self.dev.next_read_byte();
            buf[offset] = byte;
            offset += 1;
            phase = next;
        }

        // Failure can also surface mid-transfer, after bytes already landed
        // in the buffer; anything short of Complete fails the whole sector.
        match phase {
            StreamPhase::Complete => Ok(()),
            _ => Err(StreamError::DeviceFailed),
        }
    }

    /// Write one sector from the first [`SECTOR_SIZE`] bytes of `buf`.
    pub fn write_sector(&mut self, sector: Lba, buf: &[u8]) -> Result<()> {
        if buf.len() < SECTOR_SIZE {
            return Err(StreamError::BufferTooSmall);
        }

        let mut phase = self.dev.begin_write(sector);
        if let StreamPhase::Failed = phase {
            return Err(StreamError::DeviceFailed);
        }

        let mut offset = 0;
        while let StreamPhase::InProgress(_) = phase {
            if offset == SECTOR_SIZE {
                return Err(StreamError::Overrun);
            }
            phase = self.dev.next_write_byte(buf[offset]);
            offset += 1;
        }

        match phase {
            StreamPhase::Complete => Ok(()),
            _ => Err(StreamError::DeviceFailed),
        }
    }
}

impl<D: ByteStream> BlockIo for StreamBlockIo<D> {
    type Error = StreamError;

    fn block_size(&self) -> BlockSize {
        BlockSize::BS_512
    }

    fn num_blocks(&mut self) -> core::result::Result<u64, Self::Error> {
        Ok(self.num_blocks)
    }

    fn read_blocks(&mut self, start_lba: Lba, dst: &mut [u8]) -> core::result::Result<(), Self::Error> {
        if dst.len() % SECTOR_SIZE != 0 {
            return Err(StreamError::Unaligned);
        }
        for (i, chunk) in dst.chunks_exact_mut(SECTOR_SIZE).enumerate() {
            self.read_sector(Lba(start_lba.0 + i as u64), chunk)?;
        }
        Ok(())
    }

    fn write_blocks(&mut self, start_lba: Lba, src: &[u8]) -> core::result::Result<(), Self::Error> {
        if src.len() % SECTOR_SIZE != 0 {
            return Err(StreamError::Unaligned);
        }
        for (i, chunk) in src.chunks_exact(SECTOR_SIZE).enumerate() {
            self.write_sector(Lba(start_lba.0 + i as u64), chunk)?;
        }
        Ok(())
    }

    fn flush(&mut self) -> core::result::Result<(), Self::Error> {
        Ok(())
    }
}
