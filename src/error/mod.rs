//! Error types for cdcbench.
//!
//! - [`ChunkError`] - Failures of a single chunker over a single stream
//! - [`BenchError`] - Harness failures, tagged with the algorithm name

use thiserror::Error;

/// The result of a chunker operation.
pub type ChunkResult<T> = Result<T, ChunkError>;

/// The result of a harness operation.
pub type BenchResult<T> = Result<T, BenchError>;

/// Errors that can occur while chunking a stream.
#[derive(Debug, Error)]
pub enum ChunkError {
    /// The underlying stream failed for a reason other than end-of-stream.
    #[error("stream read error at byte offset {offset}: {source}")]
    StreamRead {
        /// Number of bytes successfully read from the stream before the failure.
        offset: u64,
        /// The I/O error reported by the stream.
        #[source]
        source: std::io::Error,
    },

    /// Invalid configuration parameter.
    #[error("invalid config: {message}")]
    InvalidConfig {
        /// Description of what was invalid.
        message: String,
    },
}

impl ChunkError {
    pub(crate) fn invalid_config(message: impl Into<String>) -> Self {
        ChunkError::InvalidConfig {
            message: message.into(),
        }
    }

    /// Returns the byte offset at which the failure happened, if known.
    pub fn offset(&self) -> Option<u64> {
        match self {
            ChunkError::StreamRead { offset, .. } => Some(*offset),
            ChunkError::InvalidConfig { .. } => None,
        }
    }
}

/// Errors reported by the benchmark harness.
#[derive(Debug, Error)]
pub enum BenchError {
    /// The requested algorithm is not present in the registry.
    #[error("unknown algorithm {name:?}")]
    UnknownAlgorithm {
        /// The requested name.
        name: String,
    },

    /// The stream factory could not open a fresh input stream.
    #[error("algorithm {algorithm:?} failed: unable to open input: {source}")]
    Open {
        /// Algorithm whose run was starting.
        algorithm: String,
        /// The I/O error reported by the factory.
        #[source]
        source: std::io::Error,
    },

    /// The chunker failed during construction or while reading.
    #[error("algorithm {algorithm:?} failed: {source}")]
    Chunker {
        /// Algorithm that was running.
        algorithm: String,
        /// The underlying chunker error.
        #[source]
        source: ChunkError,
    },
}

impl BenchError {
    /// Returns the name of the algorithm this error belongs to.
    pub fn algorithm(&self) -> &str {
        match self {
            BenchError::UnknownAlgorithm { name } => name,
            BenchError::Open { algorithm, .. } | BenchError::Chunker { algorithm, .. } => {
                algorithm
            }
        }
    }
}
