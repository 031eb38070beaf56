//! Benchmark harness.
//!
//! - [`Registry`] - Maps algorithm names to chunker constructors
//! - [`Run`] - One algorithm over one freshly opened stream
//! - [`BenchmarkResult`] - Chunk lengths, timing and derived statistics
//!
//! Every run opens its own stream through a caller-supplied factory, so runs
//! are independent of each other and of their order.
//!
//! # Example
//!
//! ```
//! use cdcbench::{ChunkingConfig, Registry};
//! use std::io::Cursor;
//!
//! let data: Vec<u8> = (0..200_000u32).map(|i| (i.wrapping_mul(2_654_435_761) >> 24) as u8).collect();
//! let config = ChunkingConfig::new(1024, 4096, 16384)?;
//! let registry = Registry::with_builtin();
//!
//! for result in registry.run_all(["rabin", "fastcdc"], || Ok(Cursor::new(&data)), config) {
//!     let result = result?;
//!     assert_eq!(result.total_bytes, data.len() as u64);
//!     println!("{result}");
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod registry;
mod report;
mod run;

pub use registry::{
    BoxedChunker, Constructor, FASTCDC, FASTCDC_NORMALIZATION, FASTCDC_V2020, GEAR, RABIN,
    Registry, Stream,
};
pub use report::{BenchmarkResult, SizeBucket, Statistics};
pub use run::{Run, RunState, run, run_all};
