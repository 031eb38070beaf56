// Integration tests for the streaming chunkers
// Tests cover: completeness, bounds, determinism, edge cases, failure behavior

use std::cell::Cell;
use std::io::{self, Cursor, Read};
use std::rc::Rc;

use cdcbench::{
    Chunk, ChunkError, ChunkingConfig, CutReason, MIB, Registry, SizeOptions, StreamCdc2020,
};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

// ============================================================================
// Helpers
// ============================================================================

const ALGORITHMS: [&str; 4] = ["rabin", "gear", "fastcdc", "fastcdc-v2020"];

fn small() -> ChunkingConfig {
    ChunkingConfig::new(1024, 4096, 16384).unwrap()
}

fn random_bytes(len: usize, seed: u64) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut data = vec![0u8; len];
    rng.fill_bytes(&mut data);
    data
}

fn chunker<'a>(
    name: &str,
    reader: impl Read + 'a,
    config: ChunkingConfig,
) -> Box<dyn cdcbench::Chunker + 'a> {
    let constructor = Registry::with_builtin()
        .get(name)
        .unwrap_or_else(|| panic!("{name} not registered"));
    constructor(Box::new(reader), config).unwrap()
}

fn chunk_all<'a>(name: &str, reader: impl Read + 'a, config: ChunkingConfig) -> Vec<Chunk> {
    chunker(name, reader, config)
        .collect::<Result<Vec<_>, _>>()
        .unwrap()
}

/// Reader that returns at most `step` bytes per call.
struct ShortReads<'a> {
    data: &'a [u8],
    step: usize,
}

impl Read for ShortReads<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.step.min(buf.len()).min(self.data.len());
        buf[..n].copy_from_slice(&self.data[..n]);
        self.data = &self.data[n..];
        Ok(n)
    }
}

/// Reader that fails every call once `closed` is set.
struct Closable<'a> {
    data: &'a [u8],
    closed: Rc<Cell<bool>>,
}

impl Read for Closable<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.closed.get() {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "stream closed"));
        }
        self.data.read(buf)
    }
}

/// Reader that counts calls and never yields data.
struct CountingReader {
    reads: Rc<Cell<usize>>,
}

impl Read for CountingReader {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        self.reads.set(self.reads.get() + 1);
        Ok(0)
    }
}

// ============================================================================
// Completeness and Bounds
// ============================================================================

#[test]
fn test_lengths_sum_to_stream_length() {
    let data = random_bytes(300_000, 1);

    for name in ALGORITHMS {
        let chunks = chunk_all(name, Cursor::new(&data), small());
        let total: usize = chunks.iter().map(Chunk::len).sum();
        assert_eq!(total, data.len(), "{name}: lengths must cover the stream");

        let mut expected_offset = 0u64;
        for chunk in &chunks {
            assert_eq!(chunk.offset, expected_offset, "{name}: offsets must be contiguous");
            expected_offset = chunk.end();
        }
    }
}

#[test]
fn test_chunk_sizes_within_bounds() {
    let data = random_bytes(500_000, 2);
    let config = small();

    for name in ALGORITHMS {
        let chunks = chunk_all(name, Cursor::new(&data), config);
        let (last, rest) = chunks.split_last().unwrap();

        for chunk in rest {
            assert!(
                chunk.len() >= config.min_size(),
                "{name}: non-final chunk below min_size: {chunk}"
            );
            assert!(chunk.len() <= config.max_size(), "{name}: chunk above max_size: {chunk}");
            assert_ne!(chunk.reason, CutReason::EndOfStream, "{name}: {chunk}");
        }

        assert!(last.len() <= config.max_size());
    }
}

#[test]
fn test_random_stream_of_ten_average_chunks() {
    let config = ChunkingConfig::default();
    let data = random_bytes(10 * config.avg_size(), 3);

    for name in ALGORITHMS {
        let chunks = chunk_all(name, Cursor::new(&data), config);

        assert!(
            (6..=16).contains(&chunks.len()),
            "{name}: {} chunks for 10 x avg_size",
            chunks.len()
        );
        assert!(chunks.iter().all(|c| c.len() <= 8 * MIB));
        assert_eq!(chunks.iter().map(Chunk::len).sum::<usize>(), data.len());
    }
}

#[test]
fn test_mean_chunk_size_near_average() {
    let config = small();
    let data = random_bytes(MIB, 4);

    for name in ALGORITHMS {
        let chunks = chunk_all(name, Cursor::new(&data), config);
        let mean = data.len() / chunks.len();

        assert!(
            (config.avg_size() / 2..=config.avg_size() * 2).contains(&mean),
            "{name}: mean chunk size {mean}"
        );
    }
}

// ============================================================================
// Determinism Tests
// ============================================================================

#[test]
fn test_deterministic_across_read_sizes() {
    let data = random_bytes(100_000, 5);

    for name in ALGORITHMS {
        let whole = chunk_all(name, Cursor::new(&data), small());

        for step in [1, 7, 4096] {
            let reader = ShortReads { data: &data, step };
            let chunks = chunk_all(name, reader, small());
            assert_eq!(chunks, whole, "{name}: boundaries changed with {step}-byte reads");
        }
    }
}

#[test]
fn test_deterministic_across_runs() {
    let data = random_bytes(200_000, 6);

    for name in ALGORITHMS {
        let first = chunk_all(name, Cursor::new(&data), small());
        let second = chunk_all(name, Cursor::new(&data), small());
        assert_eq!(first, second, "{name}");
    }
}

#[test]
fn test_shifted_content_resynchronizes() {
    let data = random_bytes(300_000, 7);
    let mut shifted = vec![0xEEu8; 100];
    shifted.extend_from_slice(&data);

    for name in ["rabin", "gear", "fastcdc"] {
        let original: Vec<u64> = chunk_all(name, Cursor::new(&data), small())
            .iter()
            .map(Chunk::end)
            .collect();
        let moved: Vec<u64> = chunk_all(name, Cursor::new(&shifted), small())
            .iter()
            .map(|c| c.end() - 100)
            .collect();

        let shared = moved.iter().filter(|end| original.contains(end)).count();
        assert!(
            shared * 2 > original.len(),
            "{name}: only {shared} of {} boundaries survived a 100-byte shift",
            original.len()
        );
    }
}

// ============================================================================
// Edge Cases
// ============================================================================

#[test]
fn test_empty_stream() {
    for name in ALGORITHMS {
        let mut chunker = chunker(name, Cursor::new(Vec::new()), small());
        assert!(chunker.next().is_none(), "{name}: empty stream yields no chunks");
        assert!(chunker.next().is_none(), "{name}: end-of-stream is sticky");
    }
}

#[test]
fn test_stream_shorter_than_min_size() {
    let config = small();
    let data = random_bytes(config.min_size() - 1, 8);

    for name in ALGORITHMS {
        let chunks = chunk_all(name, Cursor::new(&data), config);
        assert_eq!(chunks.len(), 1, "{name}");
        assert_eq!(chunks[0].len(), config.min_size() - 1);
        assert_eq!(chunks[0].reason, CutReason::EndOfStream);
    }
}

#[test]
fn test_forced_cut_at_max_size() {
    // A run of zeros never passes the gear boundary test
    let config = small();
    let data = vec![0u8; 5 * config.max_size() + 123];

    for name in ["gear", "fastcdc"] {
        let chunks = chunk_all(name, Cursor::new(&data), config);
        assert_eq!(chunks.len(), 6, "{name}");

        for chunk in &chunks[..5] {
            assert_eq!(chunk.len(), config.max_size());
            assert_eq!(chunk.reason, CutReason::MaxSize);
            assert!(chunk.reason.is_forced());
        }
        assert_eq!(chunks[5].len(), 123);
        assert_eq!(chunks[5].reason, CutReason::EndOfStream);
    }
}

#[test]
fn test_no_boundary_test_before_min_size() {
    let config = small();
    let data = vec![0u8; 3 * config.max_size()];

    // Zeros never pass the gear test: every position from min_size to max_size is tried once
    let mut gear = chunker("gear", Cursor::new(&data), config);
    assert_eq!(gear.boundary_tests(), Some(0));
    let first = gear.next().unwrap().unwrap();
    assert_eq!(first.len(), config.max_size());
    let per_chunk = (config.max_size() - config.min_size() + 1) as u64;
    assert_eq!(gear.boundary_tests(), Some(per_chunk));
    gear.next().unwrap().unwrap();
    assert_eq!(gear.boundary_tests(), Some(2 * per_chunk));

    // A zero window has a zero Rabin fingerprint: the first tested position cuts
    let mut rabin = chunker("rabin", Cursor::new(&data), config);
    let first = rabin.next().unwrap().unwrap();
    assert_eq!(first.len(), config.min_size());
    assert_eq!(rabin.boundary_tests(), Some(1));
}

#[test]
fn test_min_equals_max_gives_fixed_size_chunks() {
    let config = ChunkingConfig::new(4096, 4096, 4096).unwrap();
    let data = random_bytes(3 * 4096 + 10, 9);

    for name in ["rabin", "gear", "fastcdc"] {
        let lengths: Vec<usize> = chunk_all(name, Cursor::new(&data), config)
            .iter()
            .map(Chunk::len)
            .collect();
        assert_eq!(lengths, [4096, 4096, 4096, 10], "{name}");
    }
}

// ============================================================================
// Configuration and Failure Tests
// ============================================================================

#[test]
fn test_invalid_config_min_greater_than_max() {
    let err = SizeOptions::default()
        .with_min_size(1 << 20)
        .with_avg_size(1 << 16)
        .with_max_size(1 << 10)
        .resolve()
        .unwrap_err();

    assert!(matches!(err, ChunkError::InvalidConfig { .. }));
}

#[test]
fn test_invalid_config_rejected_before_any_read() {
    let reads = Rc::new(Cell::new(0));
    let reader = CountingReader {
        reads: Rc::clone(&reads),
    };

    // Valid in general, but below the fastcdc-v2020 engine's minimums
    let config = ChunkingConfig::new(16, 64, 256).unwrap();
    let err = StreamCdc2020::new(reader, config).unwrap_err();

    assert!(matches!(err, ChunkError::InvalidConfig { .. }));
    assert_eq!(reads.get(), 0);
}

#[test]
fn test_construction_does_not_read() {
    for name in ALGORITHMS {
        let reads = Rc::new(Cell::new(0));
        let reader = CountingReader {
            reads: Rc::clone(&reads),
        };

        let mut chunker = chunker(name, reader, small());
        assert_eq!(reads.get(), 0, "{name}: constructor must not read");

        assert!(chunker.next().is_none());
        assert!(reads.get() > 0);
    }
}

#[test]
fn test_closed_stream_surfaces_read_error() {
    let data = random_bytes(MIB, 10);

    for name in ALGORITHMS {
        let closed = Rc::new(Cell::new(false));
        let reader = Closable {
            data: &data,
            closed: Rc::clone(&closed),
        };
        let mut chunker = chunker(name, reader, small());

        let first = chunker.next().unwrap().unwrap();
        closed.set(true);

        match chunker.next() {
            Some(Err(ChunkError::StreamRead { offset, source })) => {
                assert!(offset >= first.end(), "{name}: offset {offset}");
                assert!(offset < data.len() as u64);
                assert_eq!(source.kind(), io::ErrorKind::BrokenPipe);
            }
            other => panic!("{name}: expected a stream read error, got {other:?}"),
        }

        assert!(chunker.next().is_none(), "{name}: chunker must be fused after an error");
    }
}

#[test]
fn test_interrupted_reads_are_retried() {
    struct Interrupting<'a> {
        data: &'a [u8],
        toggle: bool,
    }

    impl Read for Interrupting<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.toggle = !self.toggle;
            if self.toggle {
                return Err(io::ErrorKind::Interrupted.into());
            }
            self.data.read(buf)
        }
    }

    let data = random_bytes(100_000, 11);

    for name in ALGORITHMS {
        let expected = chunk_all(name, Cursor::new(&data), small());
        let chunks = chunk_all(
            name,
            Interrupting {
                data: &data,
                toggle: false,
            },
            small(),
        );
        assert_eq!(chunks, expected, "{name}");
    }
}
