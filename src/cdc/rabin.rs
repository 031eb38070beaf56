//! Rabin fingerprint rolling hash.
//!
//! The digest is the remainder of the window, read as a polynomial over
//! GF(2), modulo a fixed irreducible polynomial of degree 53. Sliding one byte
//! costs two table lookups: one removes the byte leaving the window, the other
//! reduces the digest after the incoming byte is shifted in.
//!
//! Both tables are computed at compile time.

use super::RollingHash;

/// Irreducible polynomial of degree 53.
const POLYNOMIAL: u64 = 0x3DA3_358B_4DC1_73;

/// Window size in bytes.
const WINDOW: usize = 64;

const fn degree(p: u64) -> i32 {
    63 - p.leading_zeros() as i32
}

const DEGREE: u32 = degree(POLYNOMIAL) as u32;
const SHIFT: u32 = DEGREE - 8;

const fn poly_mod(mut x: u64, p: u64) -> u64 {
    let dp = degree(p);
    while degree(x) >= dp {
        x ^= p << (degree(x) - dp) as u32;
    }
    x
}

const fn append_byte(digest: u64, byte: u8, p: u64) -> u64 {
    poly_mod((digest << 8) | byte as u64, p)
}

struct Tables {
    out: [u64; 256],
    reduce: [u64; 256],
}

const fn tables(p: u64) -> Tables {
    let mut out = [0u64; 256];
    let mut reduce = [0u64; 256];

    // Contribution of a single set bit once it is the oldest byte in the window.
    let mut bit = 0;
    while bit < 8 {
        let mut h = append_byte(0, 1 << bit, p);
        let mut i = 0;
        while i < WINDOW - 1 {
            h = append_byte(h, 0, p);
            i += 1;
        }
        out[1 << bit] = h;
        bit += 1;
    }

    let mut b: usize = 1;
    while b < 256 {
        // Both tables are linear in `b`.
        let low = b & b.wrapping_neg();
        out[b] = out[b ^ low] ^ out[low];

        // Clears the overflow byte `b` above the degree and adds its remainder.
        let high = (b as u64) << DEGREE;
        reduce[b] = poly_mod(high, p) | high;

        b += 1;
    }

    Tables { out, reduce }
}

static TABLES: Tables = tables(POLYNOMIAL);

/// Rabin fingerprint state over a 64-byte window.
#[derive(Debug, Clone)]
pub struct Rabin {
    window: [u8; WINDOW],
    pos: usize,
    digest: u64,
}

impl Default for Rabin {
    fn default() -> Self {
        Self {
            window: [0; WINDOW],
            pos: 0,
            digest: 0,
        }
    }
}

impl RollingHash for Rabin {
    const WINDOW: usize = WINDOW;
    const DIGEST_BITS: u32 = DEGREE;

    fn reset(&mut self) {
        self.window = [0; WINDOW];
        self.pos = 0;
        self.digest = 0;
    }

    #[inline(always)]
    fn roll(&mut self, byte: u8) {
        let leaving = self.window[self.pos];
        self.window[self.pos] = byte;
        self.pos = (self.pos + 1) % WINDOW;

        self.digest ^= TABLES.out[leaving as usize];
        let index = (self.digest >> SHIFT) as u8;
        self.digest = (self.digest << 8) | byte as u64;
        self.digest ^= TABLES.reduce[index as usize];
    }

    #[inline(always)]
    fn digest(&self) -> u64 {
        self.digest
    }
}
