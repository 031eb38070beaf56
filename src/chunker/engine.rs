//! Streaming driver for the in-crate CDC algorithms.
//!
//! [`CdcChunker`] owns a reader, a pooled read-ahead buffer and a
//! [`Cutter`]. Each call to `next()` tops the buffer up to
//! `max_size + READ_AHEAD` bytes (or end-of-stream), asks the cutter for the
//! next boundary and drops the chunk's bytes from the front of the buffer.
//!
//! # Example
//!
//! ```
//! use cdcbench::{CdcChunker, ChunkingConfig};
//! use cdcbench::cdc::Gear;
//! use std::io::Cursor;
//!
//! let data: Vec<u8> = (0..100_000u32).map(|i| (i * 31 % 251) as u8).collect();
//! let config = ChunkingConfig::new(1024, 4096, 16384)?;
//! let chunker = CdcChunker::<_, Gear>::new(Cursor::new(&data), config, 0)?;
//!
//! let mut total = 0;
//! for chunk in chunker {
//!     total += chunk?.len();
//! }
//! assert_eq!(total, data.len());
//! # Ok::<(), cdcbench::ChunkError>(())
//! ```

use std::fmt;
use std::io::Read;

use tracing::{debug, trace};

use super::Chunker;
use crate::buffer::Buffer;
use crate::cdc::{Cutter, RollingHash};
use crate::chunk::{Chunk, CutReason};
use crate::config::ChunkingConfig;
use crate::error::{ChunkError, ChunkResult};

/// Bytes read past `max_size` so that short reads do not force one read
/// call per chunk.
pub const READ_AHEAD: usize = 64 * 1024;

/// A chunker that finds boundaries with the rolling hash `H`.
///
/// Boundaries depend only on the stream's bytes and the configuration, never
/// on how the reader splits its output across `read` calls. Every call to
/// `next()` before end-of-stream reads from the source at least once, so a
/// source that fails mid-run is noticed on the next call.
pub struct CdcChunker<R, H> {
    reader: R,
    cutter: Cutter<H>,
    buffer: Buffer,
    target: usize,
    /// Bytes emitted as chunks so far.
    offset: u64,
    eof: bool,
    finished: bool,
}

impl<R: Read, H: RollingHash> CdcChunker<R, H> {
    /// Creates a chunker over `reader`.
    ///
    /// Nothing is read until the first call to `next()`.
    ///
    /// # Errors
    ///
    /// Returns [`ChunkError::InvalidConfig`] if `normalization` does not fit
    /// the configuration (see [`Cutter::new`]).
    pub fn new(reader: R, config: ChunkingConfig, normalization: u32) -> ChunkResult<Self> {
        let cutter = Cutter::new(&config, normalization)?;
        let target = config.max_size().saturating_add(READ_AHEAD);

        debug!(
            min_size = config.min_size(),
            avg_size = config.avg_size(),
            max_size = config.max_size(),
            normalization,
            "chunker created"
        );

        Ok(Self {
            reader,
            cutter,
            buffer: Buffer::take(target.min(READ_AHEAD)),
            target,
            offset: 0,
            eof: false,
            finished: false,
        })
    }

    /// Bytes read from the source so far.
    fn bytes_read(&self) -> u64 {
        self.offset + self.buffer.len() as u64
    }

    fn fail(&mut self, err: ChunkError) -> Option<ChunkResult<Chunk>> {
        self.finished = true;
        debug!(error = %err, "chunker failed");
        Some(Err(err))
    }
}

impl<R: Read, H: RollingHash> Iterator for CdcChunker<R, H> {
    type Item = ChunkResult<Chunk>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        if !self.eof {
            match self.buffer.fill_from(&mut self.reader, self.target) {
                Ok(eof) => self.eof = eof,
                Err(source) => {
                    let offset = self.bytes_read();
                    return self.fail(ChunkError::StreamRead { offset, source });
                }
            }
        }

        if self.buffer.is_empty() {
            self.finished = true;
            debug!(total_bytes = self.offset, "end of stream");
            return None;
        }

        let cut = self.cutter.find(self.buffer.as_slice());
        if cut.reason == CutReason::MaxSize {
            trace!(offset = self.offset, length = cut.length, "forced cut");
        }

        let chunk = Chunk::new(self.offset, cut.length, cut.reason);
        self.buffer.consume(cut.length);
        self.offset += cut.length as u64;

        Some(Ok(chunk))
    }
}

impl<R: Read, H: RollingHash> Chunker for CdcChunker<R, H> {
    fn boundary_tests(&self) -> Option<u64> {
        Some(self.cutter.boundary_tests())
    }
}

impl<R, H> fmt::Debug for CdcChunker<R, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CdcChunker")
            .field("offset", &self.offset)
            .field("buffered", &self.buffer.len())
            .field("eof", &self.eof)
            .field("finished", &self.finished)
            .finish()
    }
}
