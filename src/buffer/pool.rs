//! Thread-local pool of read-ahead buffers.

use std::cell::RefCell;
use std::io::{self, Read};

use bytes::{Buf, BytesMut};

/// Buffers larger than this are freed instead of pooled.
pub const MAX_POOLED_CAPACITY: usize = 64 * 1024 * 1024; // 64 MiB

/// Maximum number of buffers to keep per thread.
pub const MAX_POOL_SIZE: usize = 4;

/// Smallest read window. Windows double with the buffered length, so a
/// buffer only grows as large as the data it actually holds.
pub const MIN_READ_SIZE: usize = 64 * 1024;

/// A reusable read-ahead buffer.
///
/// Holds the bytes read from a stream but not yet emitted as chunks. The
/// allocation goes back to the thread-local pool when the buffer is dropped,
/// whichever way the owning chunker finishes.
#[derive(Debug)]
pub struct Buffer {
    data: BytesMut,
}

impl Buffer {
    /// Takes a buffer from the thread-local pool or creates a new one, with
    /// room for at least `capacity` bytes.
    pub fn take(capacity: usize) -> Self {
        let mut data = THREAD_BUFFER_POOL
            .with(|pool| pool.borrow_mut().pop())
            .unwrap_or_default();

        data.clear();
        data.reserve(capacity);
        Self { data }
    }

    /// Returns the buffered bytes.
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Returns the number of buffered bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if nothing is buffered.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Reads from `reader` until at least `target` bytes are buffered or the
    /// reader reports end-of-stream.
    ///
    /// Returns `true` on end-of-stream. Reads interrupted by a signal are
    /// retried. On error the buffer keeps every byte read before the failing
    /// call.
    pub fn fill_from<R: Read + ?Sized>(&mut self, reader: &mut R, target: usize) -> io::Result<bool> {
        while self.data.len() < target {
            let start = self.data.len();
            let end = target.min(start.saturating_add(start.max(MIN_READ_SIZE)));
            self.data.resize(end, 0);

            match reader.read(&mut self.data[start..]) {
                Ok(0) => {
                    self.data.truncate(start);
                    return Ok(true);
                }
                Ok(n) => self.data.truncate(start + n),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => self.data.truncate(start),
                Err(e) => {
                    self.data.truncate(start);
                    return Err(e);
                }
            }
        }

        Ok(false)
    }

    /// Drops the first `n` buffered bytes.
    pub fn consume(&mut self, n: usize) {
        self.data.advance(n);
    }

    /// Appends bytes to the buffer.
    #[cfg(test)]
    pub(crate) fn extend_from_slice(&mut self, data: &[u8]) {
        self.data.extend_from_slice(data);
    }
}

impl Drop for Buffer {
    fn drop(&mut self) {
        if self.data.capacity() <= MAX_POOLED_CAPACITY {
            self.data.clear();
            THREAD_BUFFER_POOL.with(|pool| {
                let mut pool = pool.borrow_mut();
                if pool.len() < MAX_POOL_SIZE {
                    pool.push(std::mem::take(&mut self.data));
                }
            });
        }
    }
}

thread_local! {
    static THREAD_BUFFER_POOL: RefCell<Vec<BytesMut>> = const { RefCell::new(Vec::new()) };
}
