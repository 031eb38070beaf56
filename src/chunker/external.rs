//! Adapter for the `fastcdc` crate's streaming engine.
//!
//! `fastcdc::v2020::StreamCDC` panics on sizes outside its supported ranges
//! and does not report why a chunk ended, so [`StreamCdc2020`] validates the
//! configuration up front and watches the source through a counting reader.

use std::cell::Cell;
use std::fmt;
use std::io::{self, Read};
use std::rc::Rc;

use fastcdc::v2020::{
    AVERAGE_MAX, AVERAGE_MIN, Error as FastCdcError, MAXIMUM_MAX, MAXIMUM_MIN, MINIMUM_MAX,
    MINIMUM_MIN, StreamCDC,
};
use tracing::{debug, trace};

use super::Chunker;
use crate::chunk::{Chunk, CutReason};
use crate::config::ChunkingConfig;
use crate::error::{ChunkError, ChunkResult};

/// Shared view of how much the wrapped source has produced.
#[derive(Debug, Clone, Default)]
struct Progress {
    bytes_read: Rc<Cell<u64>>,
    eof: Rc<Cell<bool>>,
}

/// Reader that records bytes read and end-of-stream into a [`Progress`].
struct CountingReader<R> {
    inner: R,
    progress: Progress,
}

impl<R: Read> Read for CountingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        loop {
            match self.inner.read(buf) {
                Ok(0) if !buf.is_empty() => {
                    self.progress.eof.set(true);
                    return Ok(0);
                }
                Ok(n) => {
                    let total = self.progress.bytes_read.get() + n as u64;
                    self.progress.bytes_read.set(total);
                    return Ok(n);
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }
}

/// The `fastcdc` crate's 2020 FastCDC engine (normalization level 1).
pub struct StreamCdc2020<R: Read> {
    inner: StreamCDC<CountingReader<R>>,
    progress: Progress,
    max_size: usize,
    finished: bool,
}

impl<R: Read> StreamCdc2020<R> {
    /// Creates a chunker over `reader`.
    ///
    /// # Errors
    ///
    /// Returns [`ChunkError::InvalidConfig`] if a size falls outside the
    /// engine's supported range:
    ///
    /// | size       | range                    |
    /// |------------|--------------------------|
    /// | `min_size` | 64 B ..= 1 MiB           |
    /// | `avg_size` | 256 B ..= 4 MiB          |
    /// | `max_size` | 1 KiB ..= 16 MiB         |
    pub fn new(reader: R, config: ChunkingConfig) -> ChunkResult<Self> {
        let min_size = checked("min_size", config.min_size(), MINIMUM_MIN, MINIMUM_MAX)?;
        let avg_size = checked("avg_size", config.avg_size(), AVERAGE_MIN, AVERAGE_MAX)?;
        let max_size = checked("max_size", config.max_size(), MAXIMUM_MIN, MAXIMUM_MAX)?;

        debug!(min_size, avg_size, max_size, "fastcdc-v2020 chunker created");

        let progress = Progress::default();
        let source = CountingReader {
            inner: reader,
            progress: progress.clone(),
        };

        Ok(Self {
            inner: StreamCDC::new(source, min_size, avg_size, max_size),
            progress,
            max_size: config.max_size(),
            finished: false,
        })
    }

    fn reason(&self, end: u64, length: usize) -> CutReason {
        if length == self.max_size {
            CutReason::MaxSize
        } else if self.progress.eof.get() && end == self.progress.bytes_read.get() {
            CutReason::EndOfStream
        } else {
            CutReason::Content
        }
    }
}

fn checked(name: &str, value: usize, min: u32, max: u32) -> ChunkResult<u32> {
    u32::try_from(value)
        .ok()
        .filter(|v| (min..=max).contains(v))
        .ok_or_else(|| {
            ChunkError::invalid_config(format!(
                "{name} ({value}) must be between {min} and {max} for fastcdc-v2020"
            ))
        })
}

impl<R: Read> Iterator for StreamCdc2020<R> {
    type Item = ChunkResult<Chunk>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self.inner.next() {
            Some(Ok(data)) => {
                let reason = self.reason(data.offset + data.length as u64, data.length);
                if reason == CutReason::MaxSize {
                    trace!(offset = data.offset, length = data.length, "forced cut");
                }
                Some(Ok(Chunk::new(data.offset, data.length, reason)))
            }
            Some(Err(err)) => {
                self.finished = true;
                let offset = self.progress.bytes_read.get();
                let source = match err {
                    FastCdcError::IoError(e) => e,
                    FastCdcError::Empty => io::Error::from(io::ErrorKind::UnexpectedEof),
                    FastCdcError::Other(message) => io::Error::other(message),
                };
                debug!(offset, error = %source, "chunker failed");
                Some(Err(ChunkError::StreamRead { offset, source }))
            }
            None => {
                self.finished = true;
                debug!(total_bytes = self.progress.bytes_read.get(), "end of stream");
                None
            }
        }
    }
}

impl<R: Read> Chunker for StreamCdc2020<R> {}

impl<R: Read> fmt::Debug for StreamCdc2020<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamCdc2020")
            .field("bytes_read", &self.progress.bytes_read.get())
            .field("eof", &self.progress.eof.get())
            .field("finished", &self.finished)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn config() -> ChunkingConfig {
        ChunkingConfig::new(1024, 4096, 16384).unwrap()
    }

    #[test]
    fn test_rejects_sizes_outside_engine_range() {
        let config = ChunkingConfig::new(32, 64, 128).unwrap();
        let err = StreamCdc2020::new(Cursor::new(Vec::new()), config).unwrap_err();
        assert!(matches!(err, ChunkError::InvalidConfig { .. }));
        assert!(err.to_string().contains("min_size"));
    }

    #[test]
    fn test_covers_stream_and_marks_last_chunk() {
        let data: Vec<u8> = (0..100_000u32)
            .map(|i| (i.wrapping_mul(2_654_435_761) >> 13) as u8)
            .collect();
        let chunks: Vec<Chunk> = StreamCdc2020::new(Cursor::new(&data), config())
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();

        let total: usize = chunks.iter().map(Chunk::len).sum();
        assert_eq!(total, data.len());

        let (last, rest) = chunks.split_last().unwrap();
        assert!(last.reason != CutReason::Content);
        assert!(rest.iter().all(|c| c.reason != CutReason::EndOfStream));
    }

    #[test]
    fn test_uniform_input_is_forced() {
        let data = vec![0u8; 10240];
        let config = ChunkingConfig::new(64, 256, 1024).unwrap();
        let chunks: Vec<Chunk> = StreamCdc2020::new(Cursor::new(&data), config)
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(chunks.len(), 10);
        assert!(chunks.iter().all(|c| c.len() == 1024 && c.reason == CutReason::MaxSize));
    }

    #[test]
    fn test_empty_stream() {
        let mut chunker = StreamCdc2020::new(Cursor::new(Vec::new()), config()).unwrap();
        assert!(chunker.next().is_none());
        assert!(chunker.next().is_none());
    }
}
