#![no_main]
use libfuzzer_sys::fuzz_target;

use compression_coordinator::{Compress, Compressor, Config, Decompress, Decompressor, Framing};

fuzz_target!(|data: (Vec<Vec<u8>>, u8)| {
    let (chunks, framing) = data;
    let framing = match framing % 3 {
        0 => Framing::Raw,
        1 => Framing::Gzip,
        _ => Framing::GzipNoHeader,
    };
    let config = Config::default().with_framing(framing).with_buffer_size(97);
    let expected: Vec<u8> = chunks.iter().flatten().copied().collect();

    let mut compressor = Compressor::new(config).unwrap();
    let mut compressed = Vec::new();
    let mut out = [0; 61];
    for chunk in &chunks {
        compressor.set_input(chunk, 0, chunk.len()).unwrap();
        while !compressor.needs_input() {
            let len = compressor.compress(&mut out, 0, out.len()).unwrap();
            compressed.extend_from_slice(&out[..len]);
        }
    }
    compressor.finish().unwrap();
    while !compressor.finished() {
        let len = compressor.compress(&mut out, 0, out.len()).unwrap();
        compressed.extend_from_slice(&out[..len]);
    }

    let mut decompressor = Decompressor::new(config).unwrap();
    decompressor.set_input(&compressed, 0, compressed.len()).unwrap();
    let mut decoded = Vec::new();
    while !decompressor.finished() {
        let len = decompressor.decompress(&mut out, 0, out.len()).unwrap();
        decoded.extend_from_slice(&out[..len]);
    }
    assert_eq!(expected, decoded);
});
