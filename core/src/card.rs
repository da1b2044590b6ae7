//! Storage card contract.

use core::fmt;

/// Detected card type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardKind {
    Mmc,
    Sd,
    Sdhc,
}

impl CardKind {
    /// Name used in the boot report.
    pub const fn name(self) -> &'static str {
        match self {
            CardKind::Mmc => "MMC",
            CardKind::Sd => "SD",
            CardKind::Sdhc => "SDHC",
        }
    }
}

/// Card detection failure. Any of these is the "invalid card" sentinel the
/// boot sequencer halts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardError {
    /// Nothing answered on the bus.
    NoCard,
    /// Card answered but never left the idle state.
    InitTimeout,
    /// Unrecognized command or voltage response.
    Unusable,
}

impl fmt::Display for CardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoCard => write!(f, "no card detected"),
            Self::InitTimeout => write!(f, "card initialization timed out"),
            Self::Unusable => write!(f, "card gave an unusable response"),
        }
    }
}

/// Storage card control: one-shot detection plus capacity reporting.
pub trait StorageCard {
    /// Probe and initialize the card.
    fn detect(&mut self) -> Result<CardKind, CardError>;

    /// Capacity in 512-byte blocks. Valid after a successful `detect`.
    fn capacity_blocks(&mut self) -> u64;
}
