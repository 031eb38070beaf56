#![no_main]

use std::io::Cursor;

use cdcbench::{ChunkingConfig, Registry, run_all};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: Vec<u8>| {
    let registry = Registry::with_builtin();

    // Smallest sizes every built-in engine accepts, then a mid-sized config
    let configs = [
        ChunkingConfig::new(64, 256, 1024).unwrap(),
        ChunkingConfig::new(1024, 4096, 16384).unwrap(),
    ];

    for config in configs {
        let results = run_all(registry.names(), || Ok(Cursor::new(&data)), config);

        for result in results {
            let result = result.unwrap();
            let lengths = &result.chunk_lengths;

            // Verify: lengths cover the input
            assert_eq!(lengths.iter().sum::<usize>(), data.len());
            assert_eq!(result.total_bytes, data.len() as u64);

            // Verify: all chunks are within min/max bounds
            for (i, &len) in lengths.iter().enumerate() {
                assert!(len > 0);
                assert!(len <= config.max_size());
                if i < lengths.len() - 1 {
                    assert!(len >= config.min_size());
                }
            }

            // Verify: determinism - a second run gives the same boundaries
            let again = registry
                .run(&result.algorithm, || Ok(Cursor::new(&data)), config)
                .unwrap();
            assert_eq!(&again.chunk_lengths, lengths);
            assert_eq!(again.digest, result.digest);
        }
    }
});
