//! Streaming chunkers over [`std::io::Read`] sources.
//!
//! - [`Chunker`] - The interface every benchmarked algorithm implements
//! - [`CdcChunker`] - Drives an in-crate [`RollingHash`](crate::cdc::RollingHash)
//!   over a stream
//! - [`StreamCdc2020`] - Adapts the `fastcdc` crate's 2020 streaming engine

mod engine;
mod external;

pub use engine::{CdcChunker, READ_AHEAD};
pub use external::StreamCdc2020;

use crate::chunk::Chunk;
use crate::error::ChunkResult;

/// A content-defined chunker over a single byte stream.
///
/// A chunker is an iterator of [`Chunk`]s in stream order. The lengths of all
/// yielded chunks sum to the number of bytes in the stream. `None` signals
/// end-of-stream; after an error the iterator is fused and only yields `None`.
pub trait Chunker: Iterator<Item = ChunkResult<Chunk>> {
    /// Number of positions tested for a boundary so far, if the algorithm
    /// keeps count.
    fn boundary_tests(&self) -> Option<u64> {
        None
    }
}
