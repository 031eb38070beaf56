//! Boundary digest type.

use std::fmt;

/// A fingerprint of a chunk-length sequence.
///
/// Two runs over the same input place identical boundaries exactly when their
/// digests match, which makes runs comparable at a glance in reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BoundaryDigest([u8; 32]);

impl BoundaryDigest {
    /// The size of the digest in bytes.
    pub const SIZE: usize = 32;

    /// Creates a digest from a byte array.
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Returns the digest as a byte slice.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Returns the digest as a hex string.
    pub fn to_hex(&self) -> String {
        self.to_string()
    }

    /// Returns the first `n` hex characters, for compact reports.
    pub fn short(&self, n: usize) -> String {
        let mut hex = self.to_hex();
        hex.truncate(n);
        hex
    }
}

impl AsRef<[u8]> for BoundaryDigest {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for BoundaryDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}
