//! BLAKE3-based boundary digests.

use crate::chunk::BoundaryDigest;

/// Folds a sequence of chunk lengths into a [`BoundaryDigest`].
///
/// Each length is fed as a little-endian `u64`, so the digest depends on the
/// exact sequence of boundaries and nothing else.
#[derive(Debug, Clone)]
pub struct BoundaryHasher {
    state: blake3::Hasher,
}

impl BoundaryHasher {
    /// Creates a new hasher.
    pub fn new() -> Self {
        Self {
            state: blake3::Hasher::new(),
        }
    }

    /// Appends one chunk length.
    pub fn update(&mut self, length: usize) {
        self.state.update(&(length as u64).to_le_bytes());
    }

    /// Finalizes and returns the digest.
    pub fn finalize(&self) -> BoundaryDigest {
        BoundaryDigest::new(self.state.finalize().into())
    }

    /// Digests a complete sequence in one shot.
    pub fn digest(lengths: &[usize]) -> BoundaryDigest {
        let mut hasher = Self::new();
        for &length in lengths {
            hasher.update(length);
        }
        hasher.finalize()
    }
}

impl Default for BoundaryHasher {
    fn default() -> Self {
        Self::new()
    }
}
