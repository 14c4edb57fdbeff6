//! Parameter types for bzip2 compression.

use crate::error::{Error, Result};

/// Compression block size, in 100 kB units.
///
/// Larger blocks trade memory for compression ratio: each block holds up to
/// `size * 100_000` uncompressed bytes and is compressed independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockSize(u32);

impl BlockSize {
    /// Smallest allowed block size (100 kB blocks).
    pub const MIN: u32 = 1;

    /// Largest allowed block size (900 kB blocks).
    pub const MAX: u32 = 9;

    /// The stock bzip2 default: largest blocks, best ratio.
    pub const DEFAULT: BlockSize = BlockSize(9);

    /// Create a validated block size.
    pub fn new(value: u32) -> Result<BlockSize> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(BlockSize(value))
        } else {
            Err(Error::out_of_range("block size", value, Self::MIN, Self::MAX))
        }
    }

    /// Return the block size as an integer (1-9).
    pub fn get(self) -> u32 {
        self.0
    }

    /// Uncompressed bytes held per block.
    pub fn bytes(self) -> usize {
        self.0 as usize * 100_000
    }
}

impl Default for BlockSize {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Threshold controlling when the codec falls back to its slower,
/// always-terminating sorting algorithm on pathological repetitive input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WorkFactor(u32);

impl WorkFactor {
    /// Largest allowed work factor.
    pub const MAX: u32 = 250;

    /// Zero is the sentinel for the codec's internal default (30).
    pub const DEFAULT: WorkFactor = WorkFactor(0);

    /// Create a validated work factor.
    pub fn new(value: u32) -> Result<WorkFactor> {
        if value <= Self::MAX {
            Ok(WorkFactor(value))
        } else {
            Err(Error::out_of_range("work factor", value, 0, Self::MAX))
        }
    }

    /// Return the work factor as an integer (0-250).
    pub fn get(self) -> u32 {
        self.0
    }
}

impl Default for WorkFactor {
    fn default() -> Self {
        Self::DEFAULT
    }
}
