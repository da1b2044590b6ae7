//! Error types for FAT operations

use core::fmt;

/// Result type for FAT operations
pub type Result<T> = core::result::Result<T, FatError>;

/// Errors that can occur during FAT operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FatError {
    /// I/O error reading from block device
    Io,

    /// Boot sector signature missing
    InvalidBootSector,

    /// BPB geometry fields inconsistent or zero
    InvalidGeometry,

    /// FAT12 volumes are not supported
    UnsupportedVariant,

    /// File or directory not found
    NotFound,

    /// Cluster number outside the data region
    BadCluster,

    /// Cluster chain ended before the recorded file size
    TruncatedChain,

    /// Cluster chain longer than the volume (cycle)
    ChainTooLong,

    /// Destination buffer too small for the file
    BufferTooSmall,
}

impl fmt::Display for FatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io => write!(f, "I/O error reading block device"),
            Self::InvalidBootSector => write!(f, "boot sector signature missing"),
            Self::InvalidGeometry => write!(f, "inconsistent filesystem geometry"),
            Self::UnsupportedVariant => write!(f, "unsupported FAT variant"),
            Self::NotFound => write!(f, "file or directory not found"),
            Self::BadCluster => write!(f, "cluster outside the data region"),
            Self::TruncatedChain => write!(f, "cluster chain shorter than the file"),
            Self::ChainTooLong => write!(f, "cluster chain longer than the volume"),
            Self::BufferTooSmall => write!(f, "buffer too small for the file"),
        }
    }
}
