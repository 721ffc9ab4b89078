#![no_main]
use libfuzzer_sys::fuzz_target;

use compression_coordinator::{Config, Decompress, DirectDecompressor, Framing, PartialBuffer};

fuzz_target!(|data: &[u8]| {
    let mut decompressor = DirectDecompressor::new(Config::default().with_framing(Framing::Gzip))
        .unwrap()
        .multiple_members(true);
    let mut src = PartialBuffer::new(data);
    let mut out = [0; 128];

    while !decompressor.finished() {
        let before = (src.written().len(), decompressor.bytes_written());
        let mut dst = PartialBuffer::new(&mut out[..]);
        if decompressor.decompress_direct(&mut src, &mut dst).is_err() {
            break;
        }
        if (src.written().len(), decompressor.bytes_written()) == before {
            break;
        }
    }
});
