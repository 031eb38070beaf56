//! Gear rolling hash.
//!
//! Each byte is mapped to a random 64-bit value and the digest is updated as
//! `digest = (digest << 1) + GEAR[byte]`. After 64 shifts a byte has left the
//! digest entirely, so the window is implicit and no byte needs to be removed.
//!
//! Boundaries are tested on the high-order bits, which depend on the most
//! recent 64 bytes, while the low-order bits only see the last few.
//!
//! # References
//!
//! Based on "FastCDC: A Fast and Efficient Content-Defined Chunking Approach for Data Deduplication"
//! by Wen Xia et al., USENIX ATC 2016.

use super::{RollingHash, high_mask};

const GEAR_SEED: u64 = 0x6a09_e667_f3bc_c908;

/// splitmix64 step; good enough to spread a seed into a table of random words.
const fn splitmix64(state: u64) -> (u64, u64) {
    let state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
    let mut z = state;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    (state, z ^ (z >> 31))
}

const fn gear_table() -> [u64; 256] {
    let mut table = [0u64; 256];
    let mut state = GEAR_SEED;
    let mut i = 0;
    while i < 256 {
        let (next, value) = splitmix64(state);
        state = next;
        table[i] = value;
        i += 1;
    }
    table
}

static GEAR: [u64; 256] = gear_table();

/// Gear hash state.
#[derive(Debug, Clone, Copy, Default)]
pub struct Gear {
    digest: u64,
}

impl RollingHash for Gear {
    const WINDOW: usize = 64;
    const DIGEST_BITS: u32 = 64;

    #[inline]
    fn reset(&mut self) {
        self.digest = 0;
    }

    #[inline(always)]
    fn roll(&mut self, byte: u8) {
        self.digest = (self.digest << 1).wrapping_add(GEAR[byte as usize]);
    }

    #[inline(always)]
    fn digest(&self) -> u64 {
        self.digest
    }

    fn mask(bits: u32) -> u64 {
        high_mask(bits)
    }
}
