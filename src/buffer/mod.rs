//! Internal read-ahead buffer management.
//!
//! This module provides a thread-local buffer pool so that repeated runs
//! over the same thread reuse their read-ahead allocations. It is an
//! implementation detail and not part of the public API.

mod pool;

pub(crate) use pool::Buffer;
