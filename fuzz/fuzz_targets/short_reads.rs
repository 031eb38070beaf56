#![no_main]

use std::io::{self, Cursor, Read};

use cdcbench::{ChunkingConfig, Registry};
use libfuzzer_sys::fuzz_target;

/// Serves the input in reads whose sizes are driven by the fuzzer.
struct Jittery<'a> {
    data: &'a [u8],
    steps: &'a [u8],
    call: usize,
}

impl Read for Jittery<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let step = match self.steps.get(self.call % self.steps.len().max(1)) {
            Some(&s) => s as usize + 1,
            None => buf.len(),
        };
        self.call += 1;
        let n = step.min(buf.len()).min(self.data.len());
        buf[..n].copy_from_slice(&self.data[..n]);
        self.data = &self.data[n..];
        Ok(n)
    }
}

fuzz_target!(|input: (Vec<u8>, Vec<u8>)| {
    let (data, steps) = input;
    let registry = Registry::with_builtin();
    let config = ChunkingConfig::new(64, 256, 1024).unwrap();

    for name in registry.names() {
        let constructor = registry.get(name).unwrap();

        let whole: Vec<_> = constructor(Box::new(Cursor::new(&data)), config)
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();

        let jittery = Jittery {
            data: &data,
            steps: &steps,
            call: 0,
        };
        let split: Vec<_> = constructor(Box::new(jittery), config)
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();

        // Verify: boundaries do not depend on how the stream is read
        assert_eq!(whole, split, "{name}");
    }
});
