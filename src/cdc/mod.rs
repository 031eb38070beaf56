//! Content-Defined Chunking (CDC) boundary detection.
//!
//! This module contains the core algorithm for identifying chunk boundaries
//! based on content rather than fixed offsets. It is split in two:
//!
//! - [`RollingHash`] - A hash over a sliding window, updated in O(1) per byte
//! - [`Cutter`] - Drives any [`RollingHash`] over a chunk candidate, enforcing
//!   the min/avg/max size rules and counting boundary tests
//!
//! Implementations:
//!
//! - [`Rabin`] - Rabin fingerprint modulo an irreducible polynomial
//! - [`Gear`] - Gear hash (shift-add over a random table), as used by FastCDC
//!
//! # Algorithm Overview
//!
//! For each chunk the [`Cutter`]:
//!
//! 1. Skips the first `min_size - WINDOW` bytes entirely
//! 2. Rolls the hash over the last `WINDOW` bytes before `min_size`, without testing
//! 3. Tests every position from `min_size` up to `max_size`: the first position
//!    whose digest has all mask bits clear ends the chunk
//! 4. Forces a cut at exactly `max_size` if no position passed the test
//!
//! The mask has `log2(avg_size)` bits. With normalization level `n`, positions
//! before `avg_size` use `log2(avg_size) + n` bits (harder to match) and later
//! positions use `log2(avg_size) - n` bits (easier), which tightens the chunk
//! size distribution around `avg_size`.

mod gear;
mod rabin;

pub use gear::Gear;
pub use rabin::Rabin;

use crate::chunk::CutReason;
use crate::config::ChunkingConfig;
use crate::error::{ChunkError, ChunkResult};

/// A rolling hash over a sliding window of recent bytes.
pub trait RollingHash: Default {
    /// Number of trailing bytes the digest depends on.
    const WINDOW: usize;

    /// Number of significant bits in the digest.
    const DIGEST_BITS: u32;

    /// Clears the window and digest.
    fn reset(&mut self);

    /// Slides one byte into the window.
    fn roll(&mut self, byte: u8);

    /// Returns the current digest.
    fn digest(&self) -> u64;

    /// Returns a mask with `bits` set bits. A position is a boundary when
    /// `digest() & mask == 0`.
    ///
    /// Defaults to the low-order bits.
    fn mask(bits: u32) -> u64 {
        low_mask(bits)
    }
}

/// Returns a mask of the `bits` lowest bits.
pub const fn low_mask(bits: u32) -> u64 {
    if bits >= 64 {
        u64::MAX
    } else {
        (1u64 << bits) - 1
    }
}

/// Returns a mask of the `bits` highest bits.
pub const fn high_mask(bits: u32) -> u64 {
    if bits == 0 {
        0
    } else if bits >= 64 {
        u64::MAX
    } else {
        !(u64::MAX >> bits)
    }
}

/// A cut point found by [`Cutter::find`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cut {
    /// Length of the chunk, counted from the start of the candidate.
    pub length: usize,
    /// Why the chunk ends here.
    pub reason: CutReason,
}

/// Boundary finder shared by every in-crate algorithm.
///
/// `Cutter` holds the rolling hash state and the two masks derived from a
/// [`ChunkingConfig`]. It is stateless between chunks: each call to
/// [`find`](Cutter::find) starts from a fresh hash, so boundaries depend only
/// on the chunk's own bytes.
#[derive(Debug, Clone)]
pub struct Cutter<H> {
    hash: H,
    min_size: usize,
    avg_size: usize,
    max_size: usize,
    mask_s: u64,
    mask_l: u64,
    boundary_tests: u64,
}

impl<H: RollingHash> Cutter<H> {
    /// Creates a cutter for `config` with the given normalization level.
    ///
    /// # Errors
    ///
    /// Returns [`ChunkError::InvalidConfig`] if the normalized masks do not fit
    /// the hash digest, or leave no bits for the relaxed mask.
    pub fn new(config: &ChunkingConfig, normalization: u32) -> ChunkResult<Self> {
        let bits = config.mask_bits();

        if normalization >= bits {
            return Err(ChunkError::invalid_config(format!(
                "normalization level {normalization} too large for a {bits}-bit mask"
            )));
        }

        if bits + normalization > H::DIGEST_BITS {
            return Err(ChunkError::invalid_config(format!(
                "avg_size needs {} mask bits but the hash digest has {}",
                bits + normalization,
                H::DIGEST_BITS
            )));
        }

        Ok(Self {
            hash: H::default(),
            min_size: config.min_size(),
            avg_size: config.avg_size(),
            max_size: config.max_size(),
            mask_s: H::mask(bits + normalization),
            mask_l: H::mask(bits - normalization),
            boundary_tests: 0,
        })
    }

    /// Finds the end of the chunk starting at `data[0]`.
    ///
    /// `data` must hold at least `max_size` bytes unless it is the whole
    /// remainder of the stream; bytes past `max_size` are ignored.
    pub fn find(&mut self, data: &[u8]) -> Cut {
        let len = data.len().min(self.max_size);

        if len < self.min_size {
            return Cut {
                length: len,
                reason: CutReason::EndOfStream,
            };
        }

        self.hash.reset();

        let first_test = self.min_size - 1;
        let warm_start = self.min_size.saturating_sub(H::WINDOW);
        for &byte in &data[warm_start..first_test] {
            self.hash.roll(byte);
        }

        let normal = (self.avg_size - 1).min(len);

        for (i, &byte) in data.iter().enumerate().take(normal).skip(first_test) {
            self.hash.roll(byte);
            self.boundary_tests += 1;
            if self.hash.digest() & self.mask_s == 0 {
                return Cut {
                    length: i + 1,
                    reason: CutReason::Content,
                };
            }
        }

        for (i, &byte) in data.iter().enumerate().take(len).skip(normal.max(first_test)) {
            self.hash.roll(byte);
            self.boundary_tests += 1;
            if self.hash.digest() & self.mask_l == 0 {
                return Cut {
                    length: i + 1,
                    reason: CutReason::Content,
                };
            }
        }

        let reason = if len == self.max_size {
            CutReason::MaxSize
        } else {
            CutReason::EndOfStream
        };

        Cut { length: len, reason }
    }

    /// Returns how many positions have been tested for a boundary so far.
    pub fn boundary_tests(&self) -> u64 {
        self.boundary_tests
    }
}
