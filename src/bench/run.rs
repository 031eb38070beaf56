//! Driving one chunker over one stream.

use std::fmt;
use std::io::{self, Read};
use std::time::Instant;

use chrono::Utc;
use tracing::{debug, info, warn};

use super::registry::{BoxedChunker, Registry, Stream};
use super::report::BenchmarkResult;
use crate::config::ChunkingConfig;
use crate::error::{BenchError, BenchResult};

#[cfg(feature = "hash-blake3")]
use crate::hash::BoundaryHasher;

/// Lifecycle of a [`Run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Built, nothing read yet.
    NotStarted,
    /// Pulling chunks.
    Running,
    /// Reached end-of-stream.
    Completed,
    /// Stopped on a chunker error.
    Failed,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunState::NotStarted => "not started",
            RunState::Running => "running",
            RunState::Completed => "completed",
            RunState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// One algorithm bound to one freshly opened stream.
///
/// [`execute`](Run::execute) consumes the run, so a run can only be driven
/// once.
pub struct Run<'r> {
    algorithm: String,
    config: ChunkingConfig,
    chunker: BoxedChunker<'r>,
    state: RunState,
}

impl<'r> Run<'r> {
    /// Wraps an already constructed chunker.
    pub fn new(
        algorithm: impl Into<String>,
        config: ChunkingConfig,
        chunker: BoxedChunker<'r>,
    ) -> Self {
        Self {
            algorithm: algorithm.into(),
            config,
            chunker,
            state: RunState::NotStarted,
        }
    }

    /// Returns the algorithm name.
    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }

    /// Returns the current state.
    pub fn state(&self) -> RunState {
        self.state
    }

    fn transition(&mut self, to: RunState) {
        debug!(algorithm = %self.algorithm, from = %self.state, to = %to, "run state");
        self.state = to;
    }

    /// Drives the chunker to end-of-stream.
    ///
    /// Elapsed time covers only the calls to `next()`, not opening the stream
    /// or building the chunker.
    pub fn execute(mut self) -> BenchResult<BenchmarkResult> {
        let mut chunk_lengths = Vec::new();
        let mut total_bytes = 0u64;
        let mut forced_cuts = 0usize;

        #[cfg(feature = "hash-blake3")]
        let mut hasher = BoundaryHasher::new();

        self.transition(RunState::Running);
        let start = Instant::now();

        while let Some(result) = self.chunker.next() {
            match result {
                Ok(chunk) => {
                    if chunk.len() > self.config.max_size() {
                        warn!(
                            algorithm = %self.algorithm,
                            offset = chunk.offset,
                            length = chunk.len(),
                            "chunk exceeds max_size"
                        );
                    }
                    if chunk.reason.is_forced() {
                        forced_cuts += 1;
                    }
                    total_bytes += chunk.len() as u64;
                    chunk_lengths.push(chunk.len());

                    #[cfg(feature = "hash-blake3")]
                    hasher.update(chunk.len());
                }
                Err(source) => {
                    self.transition(RunState::Failed);
                    return Err(BenchError::Chunker {
                        algorithm: self.algorithm,
                        source,
                    });
                }
            }
        }

        let elapsed = start.elapsed();
        self.transition(RunState::Completed);

        #[cfg(feature = "hash-blake3")]
        let digest = Some(hasher.finalize());
        #[cfg(not(feature = "hash-blake3"))]
        let digest = None;

        Ok(BenchmarkResult {
            date: Utc::now(),
            boundary_tests: self.chunker.boundary_tests(),
            algorithm: self.algorithm,
            config: self.config,
            chunk_count: chunk_lengths.len(),
            total_bytes,
            elapsed,
            chunk_lengths,
            forced_cuts,
            digest,
        })
    }
}

impl fmt::Debug for Run<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Run")
            .field("algorithm", &self.algorithm)
            .field("config", &self.config)
            .field("state", &self.state)
            .finish()
    }
}

impl Registry {
    /// Runs the algorithm `name` over a stream opened by `open`.
    ///
    /// The registry is checked before `open` is called, so an unknown name
    /// never opens a stream.
    ///
    /// # Errors
    ///
    /// - [`BenchError::UnknownAlgorithm`] if `name` is not registered
    /// - [`BenchError::Open`] if `open` fails
    /// - [`BenchError::Chunker`] if the chunker rejects the configuration or
    ///   the stream fails while reading
    pub fn run<'r, F, S>(
        &self,
        name: &str,
        open: F,
        config: ChunkingConfig,
    ) -> BenchResult<BenchmarkResult>
    where
        F: FnOnce() -> io::Result<S>,
        S: Read + 'r,
    {
        let result = self.start(name, open, config).and_then(Run::execute);

        match &result {
            Ok(report) => info!(
                algorithm = name,
                chunks = report.chunk_count,
                bytes = report.total_bytes,
                elapsed = ?report.elapsed,
                "run completed"
            ),
            Err(err) => warn!(algorithm = name, error = %err, "run failed"),
        }

        result
    }

    /// Looks up `name`, opens the stream and builds the chunker.
    pub fn start<'r, F, S>(
        &self,
        name: &str,
        open: F,
        config: ChunkingConfig,
    ) -> BenchResult<Run<'r>>
    where
        F: FnOnce() -> io::Result<S>,
        S: Read + 'r,
    {
        let constructor = self.get(name).ok_or_else(|| BenchError::UnknownAlgorithm {
            name: name.to_string(),
        })?;

        let stream: Stream<'r> = Box::new(open().map_err(|source| BenchError::Open {
            algorithm: name.to_string(),
            source,
        })?);

        let chunker = constructor(stream, config).map_err(|source| BenchError::Chunker {
            algorithm: name.to_string(),
            source,
        })?;

        Ok(Run::new(name, config, chunker))
    }

    /// Runs each of `names` in turn, each over its own freshly opened stream.
    ///
    /// A failed run does not stop the remaining ones; results are returned in
    /// the order of `names`.
    pub fn run_all<'r, I, F, S>(
        &self,
        names: I,
        mut open: F,
        config: ChunkingConfig,
    ) -> Vec<BenchResult<BenchmarkResult>>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
        F: FnMut() -> io::Result<S>,
        S: Read + 'r,
    {
        names
            .into_iter()
            .map(|name| self.run(name.as_ref(), &mut open, config))
            .collect()
    }
}

/// Runs a built-in algorithm. See [`Registry::run`].
pub fn run<'r, F, S>(name: &str, open: F, config: ChunkingConfig) -> BenchResult<BenchmarkResult>
where
    F: FnOnce() -> io::Result<S>,
    S: Read + 'r,
{
    Registry::with_builtin().run(name, open, config)
}

/// Runs several built-in algorithms. See [`Registry::run_all`].
pub fn run_all<'r, I, F, S>(
    names: I,
    open: F,
    config: ChunkingConfig,
) -> Vec<BenchResult<BenchmarkResult>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
    F: FnMut() -> io::Result<S>,
    S: Read + 'r,
{
    Registry::with_builtin().run_all(names, open, config)
}
