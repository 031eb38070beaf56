use std::num::NonZeroUsize;
use std::path::PathBuf;

use cdcbench::{Registry, SizeOptions};
use clap::Parser;

/// Benchmark content-defined chunking algorithms over a file.
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Cli {
    /// Input file, opened afresh for every algorithm.
    #[arg(short, long, required_unless_present = "list")]
    pub file: Option<PathBuf>,

    /// Average chunk size in bytes (power of two) [default: 2 MiB].
    #[arg(long)]
    pub avg: Option<usize>,

    /// Minimum chunk size in bytes [default: avg / 4].
    #[arg(long)]
    pub min: Option<usize>,

    /// Maximum chunk size in bytes [default: avg * 4].
    #[arg(long)]
    pub max: Option<usize>,

    /// Algorithm to run; repeat for several [default: all].
    #[arg(short, long = "algorithm", value_name = "NAME")]
    pub algorithms: Vec<String>,

    /// Print a chunk size histogram with buckets of this many bytes.
    #[arg(long, value_name = "STEP")]
    pub distribution: Option<NonZeroUsize>,

    /// Append results to this CSV file.
    #[arg(long, value_name = "PATH")]
    pub csv: Option<PathBuf>,

    /// List registered algorithms and exit.
    #[arg(long)]
    pub list: bool,
}

impl Cli {
    pub fn size_options(&self) -> SizeOptions {
        SizeOptions {
            min_size: self.min,
            avg_size: self.avg,
            max_size: self.max,
        }
    }

    /// Selected algorithm names, or every registered one if none were given.
    pub fn algorithms(&self, registry: &Registry) -> Vec<String> {
        if self.algorithms.is_empty() {
            registry.names().map(String::from).collect()
        } else {
            self.algorithms.clone()
        }
    }
}
