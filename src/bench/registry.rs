//! Named chunker constructors.

use std::collections::BTreeMap;
use std::fmt;
use std::io::Read;

use crate::cdc::{Gear, Rabin};
use crate::chunker::{CdcChunker, Chunker, StreamCdc2020};
use crate::config::ChunkingConfig;
use crate::error::ChunkResult;

/// Name of the Rabin fingerprint chunker.
pub const RABIN: &str = "rabin";

/// Name of the plain Gear hash chunker.
pub const GEAR: &str = "gear";

/// Name of the Gear hash chunker with normalized chunking.
pub const FASTCDC: &str = "fastcdc";

/// Name of the `fastcdc` crate's 2020 streaming engine.
pub const FASTCDC_V2020: &str = "fastcdc-v2020";

/// Normalization level used by [`FASTCDC`].
pub const FASTCDC_NORMALIZATION: u32 = 2;

/// A boxed input stream.
pub type Stream<'r> = Box<dyn Read + 'r>;

/// A boxed chunker reading from a [`Stream`].
pub type BoxedChunker<'r> = Box<dyn Chunker + 'r>;

/// Builds a chunker over a stream.
///
/// Constructors must not read from the stream; reading starts with the first
/// call to `next()`.
pub type Constructor = for<'r> fn(Stream<'r>, ChunkingConfig) -> ChunkResult<BoxedChunker<'r>>;

fn rabin<'r>(stream: Stream<'r>, config: ChunkingConfig) -> ChunkResult<BoxedChunker<'r>> {
    Ok(Box::new(CdcChunker::<_, Rabin>::new(stream, config, 0)?))
}

fn gear<'r>(stream: Stream<'r>, config: ChunkingConfig) -> ChunkResult<BoxedChunker<'r>> {
    Ok(Box::new(CdcChunker::<_, Gear>::new(stream, config, 0)?))
}

fn fastcdc<'r>(stream: Stream<'r>, config: ChunkingConfig) -> ChunkResult<BoxedChunker<'r>> {
    Ok(Box::new(CdcChunker::<_, Gear>::new(
        stream,
        config,
        FASTCDC_NORMALIZATION,
    )?))
}

fn fastcdc_v2020<'r>(stream: Stream<'r>, config: ChunkingConfig) -> ChunkResult<BoxedChunker<'r>> {
    Ok(Box::new(StreamCdc2020::new(stream, config)?))
}

/// Maps algorithm names to constructors.
///
/// Names are kept sorted, so [`names`](Registry::names) and
/// [`run_all`](Registry::run_all) over all names have a stable order.
///
/// # Example
///
/// ```
/// use cdcbench::Registry;
///
/// let registry = Registry::with_builtin();
/// let names: Vec<&str> = registry.names().collect();
/// assert_eq!(names, ["fastcdc", "fastcdc-v2020", "gear", "rabin"]);
/// ```
#[derive(Clone, Default)]
pub struct Registry {
    constructors: BTreeMap<String, Constructor>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding every built-in algorithm.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register(RABIN, rabin);
        registry.register(GEAR, gear);
        registry.register(FASTCDC, fastcdc);
        registry.register(FASTCDC_V2020, fastcdc_v2020);
        registry
    }

    /// Registers `constructor` under `name`, returning the constructor it
    /// replaces, if any.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        constructor: Constructor,
    ) -> Option<Constructor> {
        self.constructors.insert(name.into(), constructor)
    }

    /// Returns `true` if `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.constructors.contains_key(name)
    }

    /// Returns the constructor registered under `name`.
    pub fn get(&self, name: &str) -> Option<Constructor> {
        self.constructors.get(name).copied()
    }

    /// Returns the registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.constructors.keys().map(String::as_str)
    }

    /// Returns the number of registered algorithms.
    pub fn len(&self) -> usize {
        self.constructors.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.constructors.is_empty()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.names()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_builtin_names() {
        let registry = Registry::with_builtin();
        assert_eq!(registry.len(), 4);
        for name in [RABIN, GEAR, FASTCDC, FASTCDC_V2020] {
            assert!(registry.contains(name), "{name} missing");
        }
        assert!(!registry.contains("fixed"));
    }

    #[test]
    fn test_register_replaces() {
        let mut registry = Registry::new();
        assert!(registry.is_empty());
        assert!(registry.register("x", rabin).is_none());
        assert!(registry.register("x", gear).is_some());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_constructors_build_working_chunkers() {
        let registry = Registry::with_builtin();
        let config = ChunkingConfig::new(1024, 4096, 16384).unwrap();
        let data: Vec<u8> = (0..50_000u32).map(|i| (i ^ (i >> 5)) as u8).collect();

        for name in registry.names() {
            let constructor = registry.get(name).unwrap();
            let chunker = constructor(Box::new(Cursor::new(&data)), config).unwrap();
            let total: usize = chunker.map(|c| c.unwrap().len()).sum();
            assert_eq!(total, data.len(), "{name}");
        }
    }

    #[test]
    fn test_debug_lists_names() {
        let debug = format!("{:?}", Registry::with_builtin());
        assert!(debug.contains("\"rabin\""));
    }
}
