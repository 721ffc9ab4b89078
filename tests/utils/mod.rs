#![allow(unused)] // Different tests use a different subset of functions

use std::io::Read;

use compression_coordinator::{Compress, Decompress};
use proptest_derive::Arbitrary;
use rand::Rng;

pub mod track_closed;

#[derive(Arbitrary, Debug)]
pub struct InputStream(Vec<Vec<u8>>);

impl InputStream {
    pub fn chunks(&self) -> &[Vec<u8>] {
        &self.0
    }

    pub fn bytes(&self) -> Vec<u8> {
        self.0.iter().flatten().cloned().collect()
    }
}

impl From<Vec<Vec<u8>>> for InputStream {
    fn from(input: Vec<Vec<u8>>) -> InputStream {
        InputStream(input)
    }
}

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Random bytes in `0..16`, compressible but not trivially so.
pub fn generate(size: usize) -> Vec<u8> {
    let mut rng = rand::rng();
    (0..size).map(|_| rng.random_range(0..16)).collect()
}

/// Drive `compressor` through the whole protocol, supplying `chunks` one `set_input` each and
/// pulling at most `out_len` bytes per `compress` call.
pub fn compress_all<C: Compress>(compressor: &mut C, chunks: &[Vec<u8>], out_len: usize) -> Vec<u8> {
    let mut output = vec![0; out_len];
    let mut compressed = Vec::new();

    for chunk in chunks {
        while !compressor.needs_input() {
            let len = compressor.compress(&mut output, 0, out_len).unwrap();
            compressed.extend_from_slice(&output[..len]);
        }
        compressor.set_input(chunk, 0, chunk.len()).unwrap();
    }

    compressor.finish().unwrap();
    while !compressor.finished() {
        let len = compressor.compress(&mut output, 0, out_len).unwrap();
        assert!(len <= out_len);
        compressed.extend_from_slice(&output[..len]);
    }

    compressed
}

/// Drive `decompressor` until it is finished, supplying `compressed` in pieces of `in_len` bytes
/// whenever it needs input and pulling at most `out_len` bytes per `decompress` call.
pub fn decompress_all<D: Decompress>(
    decompressor: &mut D,
    compressed: &[u8],
    in_len: usize,
    out_len: usize,
) -> Vec<u8> {
    let mut output = vec![0; out_len];
    let mut decompressed = Vec::new();
    let mut chunks = compressed.chunks(in_len);

    while !decompressor.finished() {
        let mut exhausted = false;
        if decompressor.needs_input() {
            match chunks.next() {
                Some(chunk) => decompressor.set_input(chunk, 0, chunk.len()).unwrap(),
                None => exhausted = true,
            }
        }

        let len = decompressor.decompress(&mut output, 0, out_len).unwrap();
        assert!(len <= out_len);
        decompressed.extend_from_slice(&output[..len]);

        if exhausted && len == 0 && !decompressor.finished() {
            panic!("compressed stream is truncated");
        }
    }

    decompressed
}

fn read_to_vec(mut read: impl Read) -> Vec<u8> {
    let mut output = vec![];
    read.read_to_end(&mut output).unwrap();
    output
}

pub fn deflate_compress(bytes: &[u8]) -> Vec<u8> {
    use flate2::{bufread::DeflateEncoder, Compression};
    read_to_vec(DeflateEncoder::new(bytes, Compression::fast()))
}

pub fn deflate_decompress(bytes: &[u8]) -> Vec<u8> {
    use flate2::bufread::DeflateDecoder;
    read_to_vec(DeflateDecoder::new(bytes))
}

pub fn gzip_compress(bytes: &[u8]) -> Vec<u8> {
    use flate2::{bufread::GzEncoder, Compression};
    read_to_vec(GzEncoder::new(bytes, Compression::fast()))
}

pub fn gzip_decompress(bytes: &[u8]) -> Vec<u8> {
    use flate2::bufread::GzDecoder;
    read_to_vec(GzDecoder::new(bytes))
}

pub fn multi_gzip_decompress(bytes: &[u8]) -> Vec<u8> {
    use flate2::bufread::MultiGzDecoder;
    read_to_vec(MultiGzDecoder::new(bytes))
}
