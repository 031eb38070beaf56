//! Benchmark results and their summaries.

use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};
use std::fs::File;
use std::io;
use std::num::NonZeroUsize;
use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::chunk::BoundaryDigest;
use crate::config::{ChunkingConfig, MIB};

/// Outcome of one completed run of one algorithm over one stream.
#[derive(Debug, Clone)]
pub struct BenchmarkResult {
    /// When the run completed.
    pub date: DateTime<Utc>,
    /// Registry name of the algorithm.
    pub algorithm: String,
    /// Configuration the chunker was built with.
    pub config: ChunkingConfig,
    /// Number of chunks emitted.
    pub chunk_count: usize,
    /// Sum of all chunk lengths, equal to the stream length.
    pub total_bytes: u64,
    /// Time from the first `next()` to end-of-stream.
    pub elapsed: Duration,
    /// Chunk lengths in stream order.
    pub chunk_lengths: Vec<usize>,
    /// Chunks that ended at exactly `max_size`.
    pub forced_cuts: usize,
    /// Boundary tests performed, for algorithms that count them.
    pub boundary_tests: Option<u64>,
    /// BLAKE3 digest of the chunk length sequence.
    pub digest: Option<BoundaryDigest>,
}

/// Summary statistics of chunk lengths.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Statistics {
    /// Shortest chunk.
    pub min: usize,
    /// Longest chunk.
    pub max: usize,
    /// Mean chunk length.
    pub mean: f64,
    /// Population standard deviation of chunk lengths.
    pub std_dev: f64,
}

/// One bucket of a chunk size histogram: lengths in `lower..upper`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeBucket {
    /// Inclusive lower bound.
    pub lower: usize,
    /// Exclusive upper bound.
    pub upper: usize,
    /// Number of chunks in the bucket.
    pub count: usize,
}

impl BenchmarkResult {
    /// Returns length statistics, or `None` for an empty stream.
    pub fn statistics(&self) -> Option<Statistics> {
        let min = *self.chunk_lengths.iter().min()?;
        let max = *self.chunk_lengths.iter().max()?;

        let n = self.chunk_lengths.len() as f64;
        let mean = self.total_bytes as f64 / n;
        let variance = self
            .chunk_lengths
            .iter()
            .map(|&len| {
                let d = len as f64 - mean;
                d * d
            })
            .sum::<f64>()
            / n;

        Some(Statistics {
            min,
            max,
            mean,
            std_dev: variance.sqrt(),
        })
    }

    /// Chunking throughput in MiB/s.
    pub fn throughput(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.total_bytes as f64 / MIB as f64 / secs
        } else {
            0.0
        }
    }

    /// Buckets chunk lengths by `step` bytes. Empty buckets are omitted.
    pub fn size_distribution(&self, step: NonZeroUsize) -> Vec<SizeBucket> {
        let step = step.get();
        let mut counts = BTreeMap::new();
        for &len in &self.chunk_lengths {
            *counts.entry(len / step).or_insert(0usize) += 1;
        }

        counts
            .into_iter()
            .map(|(bucket, count)| SizeBucket {
                lower: bucket * step,
                upper: (bucket + 1).saturating_mul(step),
                count,
            })
            .collect()
    }

    /// Writes the result to a csv file specified by path.
    /// Elapsed time is in seconds.
    ///
    /// # Behavior
    /// * If the file does not exist, creates it and writes a header and the result.
    /// * If it exists, appends the result.
    pub fn write_to_csv<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let mut writer = match File::options().append(true).open(&path) {
            Ok(file) => csv::WriterBuilder::new()
                .has_headers(false)
                .from_writer(file),
            Err(e) if e.kind() == io::ErrorKind::NotFound => csv::Writer::from_path(&path)?,
            Err(e) => return Err(e),
        };

        writer.serialize(SerializableResult::new(self))?;
        writer.flush()?;

        Ok(())
    }
}

impl Display for BenchmarkResult {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} chunks, {} bytes in {:?} ({:.2} MiB/s)",
            self.algorithm,
            self.chunk_count,
            self.total_bytes,
            self.elapsed,
            self.throughput()
        )?;

        if let Some(stats) = self.statistics() {
            write!(
                f,
                "\n  sizes: min {} / mean {:.0} / max {} (std dev {:.0}), forced cuts: {}",
                stats.min, stats.mean, stats.max, stats.std_dev, self.forced_cuts
            )?;
        }

        if let Some(tests) = self.boundary_tests {
            write!(f, "\n  boundary tests: {tests}")?;
        }

        if let Some(digest) = &self.digest {
            write!(f, "\n  boundaries: {}", digest.short(16))?;
        }

        Ok(())
    }
}

impl Display for SizeBucket {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:>10} - {:<10} {}", self.lower, self.upper, self.count)
    }
}

#[serde_with::serde_as]
#[derive(serde::Serialize)]
struct SerializableResult {
    date: DateTime<Utc>,
    algorithm: String,
    min_size: usize,
    avg_size: usize,
    max_size: usize,
    total_bytes: u64,
    chunk_count: usize,
    forced_cuts: usize,
    mean_chunk_size: f64,
    std_dev: f64,
    #[serde_as(as = "serde_with::DurationSecondsWithFrac<f64>")]
    elapsed: Duration,
    throughput: f64,
    digest: Option<String>,
}

impl SerializableResult {
    fn new(result: &BenchmarkResult) -> Self {
        let stats = result.statistics();
        Self {
            date: result.date,
            algorithm: result.algorithm.clone(),
            min_size: result.config.min_size(),
            avg_size: result.config.avg_size(),
            max_size: result.config.max_size(),
            total_bytes: result.total_bytes,
            chunk_count: result.chunk_count,
            forced_cuts: result.forced_cuts,
            mean_chunk_size: stats.map_or(0.0, |s| s.mean),
            std_dev: stats.map_or(0.0, |s| s.std_dev),
            elapsed: result.elapsed,
            throughput: result.throughput(),
            digest: result.digest.as_ref().map(BoundaryDigest::to_hex),
        }
    }
}
