//! Digests over chunk boundary sequences.
//!
//! - [`BoundaryHasher`] - BLAKE3 over chunk lengths (requires `hash-blake3` feature)

#[cfg(feature = "hash-blake3")]
mod blake3;

#[cfg(feature = "hash-blake3")]
pub use blake3::BoundaryHasher;
