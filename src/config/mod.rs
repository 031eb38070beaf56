//! Configuration for chunking behavior.
//!
//! - [`ChunkingConfig`] - Validated, immutable min/avg/max chunk size bounds
//! - [`SizeOptions`] - Possibly-unset sizes as supplied by a caller, resolved
//!   into a [`ChunkingConfig`] with the documented defaults
//!
//! # Example
//!
//! ```
//! use cdcbench::{ChunkingConfig, SizeOptions};
//!
//! // Explicit bounds
//! let config = ChunkingConfig::new(4096, 16384, 65536)?;
//! assert_eq!(config.mask_bits(), 14);
//!
//! // Only the average is given: min = avg / 4, max = avg * 4
//! let config = SizeOptions::default().with_avg_size(8192).resolve()?;
//! assert_eq!(config.min_size(), 2048);
//! assert_eq!(config.max_size(), 32768);
//! # Ok::<(), cdcbench::ChunkError>(())
//! ```

use crate::error::{ChunkError, ChunkResult};

/// One kibibyte.
pub const KIB: usize = 1024;

/// One mebibyte.
pub const MIB: usize = 1024 * KIB;

/// Default average/target chunk size (2 MiB).
pub const DEFAULT_AVG_CHUNK_SIZE: usize = 2 * MIB;

/// Smallest accepted average chunk size.
pub const MIN_AVG_SIZE: usize = 64;

/// Largest accepted average chunk size (1 GiB).
pub const MAX_AVG_SIZE: usize = 1 << 30;

/// Largest accepted maximum chunk size (4 GiB on 64-bit targets).
pub const MAX_MAX_SIZE: usize = MAX_AVG_SIZE.saturating_mul(4);

/// Configuration for content-defined chunking.
///
/// Size constraints: `0 < min_size <= avg_size <= max_size`, and `avg_size`
/// must be a power of two so that the boundary test can be expressed as a
/// mask of [`mask_bits`](ChunkingConfig::mask_bits) bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkingConfig {
    min_size: usize,
    avg_size: usize,
    max_size: usize,
    mask_bits: u32,
}

impl ChunkingConfig {
    /// Creates a new configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ChunkError::InvalidConfig`] if:
    /// - Any size is zero
    /// - `min_size > avg_size` or `avg_size > max_size`
    /// - `avg_size` is not a power of two in `[MIN_AVG_SIZE, MAX_AVG_SIZE]`
    /// - `max_size > MAX_MAX_SIZE`
    pub fn new(min_size: usize, avg_size: usize, max_size: usize) -> ChunkResult<Self> {
        if min_size == 0 || avg_size == 0 || max_size == 0 {
            return Err(ChunkError::invalid_config("chunk sizes must be non-zero"));
        }

        if min_size > max_size {
            return Err(ChunkError::invalid_config(format!(
                "min_size ({min_size}) cannot be greater than max_size ({max_size})"
            )));
        }

        if min_size > avg_size {
            return Err(ChunkError::invalid_config(format!(
                "min_size ({min_size}) cannot be greater than avg_size ({avg_size})"
            )));
        }

        if avg_size > max_size {
            return Err(ChunkError::invalid_config(format!(
                "avg_size ({avg_size}) cannot be greater than max_size ({max_size})"
            )));
        }

        if !avg_size.is_power_of_two() || !(MIN_AVG_SIZE..=MAX_AVG_SIZE).contains(&avg_size) {
            return Err(ChunkError::invalid_config(format!(
                "avg_size ({avg_size}) must be a power of two between {MIN_AVG_SIZE} and {MAX_AVG_SIZE}"
            )));
        }

        if max_size > MAX_MAX_SIZE {
            return Err(ChunkError::invalid_config(format!(
                "max_size ({max_size}) cannot be greater than {MAX_MAX_SIZE}"
            )));
        }

        Ok(Self {
            min_size,
            avg_size,
            max_size,
            mask_bits: avg_size.trailing_zeros(),
        })
    }

    /// Creates a configuration from an average size alone, deriving
    /// `min_size = avg_size / 4` and `max_size = avg_size * 4`.
    pub fn from_avg(avg_size: usize) -> ChunkResult<Self> {
        SizeOptions::default().with_avg_size(avg_size).resolve()
    }

    /// Returns the minimum chunk size.
    pub fn min_size(&self) -> usize {
        self.min_size
    }

    /// Returns the average/target chunk size.
    pub fn avg_size(&self) -> usize {
        self.avg_size
    }

    /// Returns the maximum chunk size.
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Returns `log2(avg_size)`, the width of the boundary-test mask.
    pub fn mask_bits(&self) -> u32 {
        self.mask_bits
    }
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            min_size: DEFAULT_AVG_CHUNK_SIZE / 4,
            avg_size: DEFAULT_AVG_CHUNK_SIZE,
            max_size: DEFAULT_AVG_CHUNK_SIZE * 4,
            mask_bits: DEFAULT_AVG_CHUNK_SIZE.trailing_zeros(),
        }
    }
}

/// Chunk sizes as supplied by a caller, any of which may be unset.
///
/// Unset values are filled in by [`SizeOptions::resolve`]:
/// `avg_size` defaults to [`DEFAULT_AVG_CHUNK_SIZE`], `min_size` to
/// `avg_size / 4` and `max_size` to `avg_size * 4`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SizeOptions {
    /// Minimum chunk size in bytes.
    pub min_size: Option<usize>,
    /// Average chunk size in bytes.
    pub avg_size: Option<usize>,
    /// Maximum chunk size in bytes.
    pub max_size: Option<usize>,
}

impl SizeOptions {
    /// Sets the minimum chunk size.
    pub fn with_min_size(mut self, size: usize) -> Self {
        self.min_size = Some(size);
        self
    }

    /// Sets the average chunk size.
    pub fn with_avg_size(mut self, size: usize) -> Self {
        self.avg_size = Some(size);
        self
    }

    /// Sets the maximum chunk size.
    pub fn with_max_size(mut self, size: usize) -> Self {
        self.max_size = Some(size);
        self
    }

    /// Fills in defaults and validates the result.
    pub fn resolve(self) -> ChunkResult<ChunkingConfig> {
        let avg_size = self.avg_size.unwrap_or(DEFAULT_AVG_CHUNK_SIZE);
        let min_size = self.min_size.unwrap_or(avg_size / 4);
        let max_size = self
            .max_size
            .unwrap_or_else(|| avg_size.saturating_mul(4));

        ChunkingConfig::new(min_size, avg_size, max_size)
    }
}
