//! cdcbench
//!
//! Benchmark harness for streaming Content-Defined Chunking (CDC).
//!
//! `cdcbench` feeds one byte stream through several pluggable chunkers with
//! identical min/avg/max bounds and reports how each one splits it:
//!
//! - chunk count and size distribution
//! - forced cuts at `max_size`
//! - throughput
//!
//! The crate intentionally:
//! - does NOT keep chunk data (only offsets and lengths)
//! - does NOT deduplicate or store anything
//! - does NOT run chunkers in parallel
//!
//! Built-in algorithms: `rabin`, `gear`, `fastcdc` and `fastcdc-v2020`.
//!
//! # Example
//!
//! ```no_run
//! use std::fs::File;
//! use std::io::BufReader;
//! use cdcbench::{Registry, SizeOptions};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SizeOptions::default().with_avg_size(1 << 20).resolve()?;
//!     let registry = Registry::with_builtin();
//!
//!     for result in registry.run_all(
//!         registry.names(),
//!         || File::open("data.bin").map(BufReader::new),
//!         config,
//!     ) {
//!         println!("{}", result?);
//!     }
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod bench;
pub mod cdc;
mod chunk;
mod chunker;
mod config;
mod error;

mod buffer; // internal (thread-local reuse)
mod hash; // internal blake3 impl

//
// Public surface
//

pub use bench::{BenchmarkResult, Registry, RunState, SizeBucket, Statistics, run, run_all};
pub use chunk::{BoundaryDigest, Chunk, CutReason};
pub use chunker::{CdcChunker, Chunker, READ_AHEAD, StreamCdc2020};
pub use config::{
    ChunkingConfig, DEFAULT_AVG_CHUNK_SIZE, KIB, MAX_AVG_SIZE, MAX_MAX_SIZE, MIB, MIN_AVG_SIZE,
    SizeOptions,
};
pub use error::{BenchError, BenchResult, ChunkError, ChunkResult};

#[cfg(feature = "hash-blake3")]
pub use hash::BoundaryHasher;
