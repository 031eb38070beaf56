//! Chunk types.
//!
//! - [`Chunk`] - A content-defined chunk: offset, length and why it was cut
//! - [`CutReason`] - Content boundary, forced cut at `max_size`, or end of stream
//! - [`BoundaryDigest`] - 32-byte fingerprint of a whole chunk-length sequence

mod data;
mod digest;

pub use data::{Chunk, CutReason};
pub use digest::BoundaryDigest;
