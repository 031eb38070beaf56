//! The Chunk type - a content-defined chunk without its payload.

use std::fmt;

/// Why a chunker ended a chunk where it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CutReason {
    /// The rolling hash satisfied the boundary test.
    Content,
    /// No boundary was found within `max_size` bytes.
    MaxSize,
    /// The stream ended; this is the final chunk.
    EndOfStream,
}

impl CutReason {
    /// Returns true for a cut forced at `max_size`.
    pub fn is_forced(&self) -> bool {
        matches!(self, CutReason::MaxSize)
    }
}

impl fmt::Display for CutReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CutReason::Content => "content",
            CutReason::MaxSize => "max-size",
            CutReason::EndOfStream => "end-of-stream",
        };
        f.write_str(s)
    }
}

/// A chunk reported by a chunker.
///
/// Chunks carry no data: the harness only needs their position and length.
///
/// # Example
///
/// ```
/// use cdcbench::{Chunk, CutReason};
///
/// let chunk = Chunk::new(100, 5, CutReason::Content);
///
/// assert_eq!(chunk.end(), 105);
/// assert_eq!(chunk.range(), 100..105);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Chunk {
    /// The offset in the original stream.
    pub offset: u64,

    /// The chunk length in bytes.
    pub length: usize,

    /// Why the chunk ends where it does.
    pub reason: CutReason,
}

impl Chunk {
    /// Creates a new chunk.
    pub fn new(offset: u64, length: usize, reason: CutReason) -> Self {
        Self {
            offset,
            length,
            reason,
        }
    }

    /// Returns the length of the chunk.
    pub fn len(&self) -> usize {
        self.length
    }

    /// Returns true if the chunk is empty.
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Returns the end offset (exclusive).
    pub fn end(&self) -> u64 {
        self.offset + self.length as u64
    }

    /// Returns the chunk as a range of stream offsets.
    pub fn range(&self) -> std::ops::Range<u64> {
        self.offset..self.end()
    }
}

impl fmt::Display for Chunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Chunk({} bytes @ {}, {})", self.length, self.offset, self.reason)
    }
}
