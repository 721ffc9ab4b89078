use compression_coordinator::{Compress, Compressor, Config, Error, Flush, Framing, Level};

mod utils;

const FRAMINGS: [Framing; 3] = [Framing::Raw, Framing::Gzip, Framing::GzipNoHeader];

fn decompress_with_flate2(framing: Framing, compressed: &[u8]) -> Vec<u8> {
    match framing {
        Framing::Raw => utils::deflate_decompress(compressed),
        Framing::Gzip => utils::gzip_decompress(compressed),
        Framing::GzipNoHeader => {
            let mut framed = vec![0x1f, 0x8b, 0x08, 0, 0, 0, 0, 0, 0, 0xff];
            framed.extend_from_slice(compressed);
            utils::gzip_decompress(&framed)
        }
    }
}

fn compressor(framing: Framing, buffer_size: usize) -> Compressor {
    utils::init_logger();
    Compressor::new(
        Config::default()
            .with_framing(framing)
            .with_buffer_size(buffer_size),
    )
    .unwrap()
}

#[test]
#[ntest::timeout(1000)]
fn empty() {
    for framing in FRAMINGS {
        let mut compressor = compressor(framing, 64);
        let compressed = utils::compress_all(&mut compressor, &[], 64);

        assert!(!compressed.is_empty());
        assert_eq!(decompress_with_flate2(framing, &compressed), b"");
        assert_eq!(compressor.bytes_read(), 0);
        assert_eq!(compressor.bytes_written(), compressed.len() as u64);
    }
}

#[test]
#[ntest::timeout(1000)]
fn empty_chunk() {
    for framing in FRAMINGS {
        let mut compressor = compressor(framing, 64);
        let compressed = utils::compress_all(&mut compressor, &[vec![]], 64);
        assert_eq!(decompress_with_flate2(framing, &compressed), b"");
    }
}

#[test]
#[ntest::timeout(1000)]
fn single_byte() {
    for framing in FRAMINGS {
        let mut compressor = compressor(framing, 64);
        let compressed = utils::compress_all(&mut compressor, &[vec![42]], 64);
        assert_eq!(decompress_with_flate2(framing, &compressed), [42]);
        assert_eq!(compressor.bytes_read(), 1);
    }
}

#[test]
#[ntest::timeout(5000)]
fn larger_than_capacity() {
    let input = utils::generate(3 * 4096 + 17);
    let chunks: Vec<_> = input.chunks(1000).map(Vec::from).collect();

    for framing in FRAMINGS {
        let mut compressor = compressor(framing, 4096);
        let compressed = utils::compress_all(&mut compressor, &chunks, 512);

        assert_eq!(decompress_with_flate2(framing, &compressed), input);
        assert_eq!(compressor.bytes_read(), input.len() as u64);
        assert_eq!(compressor.bytes_written(), compressed.len() as u64);
    }
}

#[test]
#[ntest::timeout(5000)]
fn one_byte_output_requests() {
    let input = utils::generate(10_000);

    for framing in FRAMINGS {
        let mut compressor = compressor(framing, 1024);
        let compressed = utils::compress_all(&mut compressor, &[input.clone()], 1);

        assert_eq!(decompress_with_flate2(framing, &compressed), input);
        assert_eq!(compressor.bytes_written(), compressed.len() as u64);
    }
}

#[test]
#[ntest::timeout(5000)]
fn oversized_set_input_is_fully_consumed() {
    let input = utils::generate(100 * 1024);
    let mut compressor = compressor(Framing::Raw, 64 * 1024);

    compressor.set_input(&input, 0, input.len()).unwrap();
    assert_eq!(compressor.bytes_read(), input.len() as u64);
    assert!(!compressor.needs_input());

    let mut output = vec![0; 4096];
    let mut compressed = Vec::new();
    while !compressor.needs_input() {
        let len = { let n = output.len(); compressor.compress(&mut output, 0, n) }.unwrap();
        compressed.extend_from_slice(&output[..len]);
    }

    compressor.finish().unwrap();
    while !compressor.finished() {
        let len = { let n = output.len(); compressor.compress(&mut output, 0, n) }.unwrap();
        compressed.extend_from_slice(&output[..len]);
    }

    assert_eq!(utils::deflate_decompress(&compressed), input);
}

#[test]
fn compress_before_input_does_nothing() {
    let mut compressor = compressor(Framing::Gzip, 64);
    let mut output = [0; 32];

    assert!(compressor.needs_input());
    assert_eq!(compressor.compress(&mut output, 0, 32).unwrap(), 0);
    assert_eq!(compressor.bytes_written(), 0);
    assert!(!compressor.finished());
}

#[test]
fn zero_length_requests() {
    let mut compressor = compressor(Framing::Raw, 64);

    compressor.set_input(b"abc", 3, 0).unwrap();
    assert!(compressor.needs_input());

    compressor.set_input(b"abc", 0, 3).unwrap();
    assert_eq!(compressor.compress(&mut [], 0, 0).unwrap(), 0);
    assert!(!compressor.needs_input());
    assert_eq!(compressor.bytes_read(), 3);
}

#[test]
#[ntest::timeout(1000)]
fn offsets_are_respected() {
    let mut compressor = compressor(Framing::Raw, 64);
    let input = b"xxhello offsetsxx";
    compressor.set_input(input, 2, input.len() - 4).unwrap();
    compressor.finish().unwrap();

    let mut output = [0xaa; 128];
    let mut len = 0;
    while !compressor.finished() {
        len += compressor.compress(&mut output, 8 + len, 64 - len).unwrap();
    }

    assert!(output[..8].iter().all(|&b| b == 0xaa));
    assert_eq!(utils::deflate_decompress(&output[8..8 + len]), b"hello offsets");
}

#[test]
#[ntest::timeout(1000)]
fn finished_requires_finish() {
    let mut compressor = compressor(Framing::Raw, 64);
    compressor.set_input(b"data", 0, 4).unwrap();

    let mut output = [0; 64];
    while !compressor.needs_input() {
        compressor.compress(&mut output, 0, 64).unwrap();
    }
    assert_eq!(compressor.compress(&mut output, 0, 64).unwrap(), 0);
    assert!(!compressor.finished());

    compressor.finish().unwrap();
    while !compressor.finished() {
        compressor.compress(&mut output, 0, 64).unwrap();
    }
    assert_eq!(compressor.compress(&mut output, 0, 64).unwrap(), 0);
}

#[test]
#[ntest::timeout(1000)]
fn reset_is_idempotent() {
    let input = utils::generate(1000);
    let mut compressor = compressor(Framing::Gzip, 256);
    let first = utils::compress_all(&mut compressor, &[input.clone()], 64);

    compressor.set_input(&input, 0, 100).unwrap();
    compressor.reset().unwrap();
    compressor.reset().unwrap();

    assert_eq!(compressor.bytes_read(), 0);
    assert_eq!(compressor.bytes_written(), 0);
    assert!(!compressor.finished());
    assert!(compressor.needs_input());

    let second = utils::compress_all(&mut compressor, &[input.clone()], 64);
    assert_eq!(first, second);
}

#[test]
fn out_of_bounds_is_rejected_without_side_effects() {
    let mut compressor = compressor(Framing::Raw, 64);
    let mut output = [0; 8];

    assert!(matches!(
        compressor.set_input(b"abc", 2, 2),
        Err(Error::OutOfBounds {
            offset: 2,
            len: 2,
            size: 3
        })
    ));
    assert!(matches!(
        compressor.set_input(b"abc", usize::MAX, 2),
        Err(Error::OutOfBounds { .. })
    ));
    assert!(matches!(
        compressor.compress(&mut output, 4, 5),
        Err(Error::OutOfBounds { .. })
    ));

    assert_eq!(compressor.bytes_read(), 0);
    assert!(compressor.needs_input());
}

#[test]
fn set_dictionary_is_unsupported() {
    let mut compressor = compressor(Framing::Raw, 64);
    assert!(matches!(
        compressor.set_dictionary(b"dict", 0, 4),
        Err(Error::Unsupported(_))
    ));
    assert!(matches!(
        compressor.set_dictionary(b"dict", 0, 5),
        Err(Error::OutOfBounds { .. })
    ));
}

#[test]
fn end_closes_the_coordinator() {
    let mut compressor = compressor(Framing::Raw, 64);
    compressor.set_input(b"data", 0, 4).unwrap();

    compressor.end();
    compressor.end();

    let mut output = [0; 8];
    assert!(matches!(compressor.set_input(b"x", 0, 1), Err(Error::Closed)));
    assert!(matches!(compressor.compress(&mut output, 0, 8), Err(Error::Closed)));
    assert!(matches!(compressor.finish(), Err(Error::Closed)));
    assert!(matches!(compressor.reset(), Err(Error::Closed)));
    assert!(matches!(
        compressor.set_dictionary(b"x", 0, 1),
        Err(Error::Closed)
    ));
    assert!(!compressor.needs_input());
    assert!(compressor.finished());
    assert!(compressor.engine().is_none());
}

#[test]
fn gzip_header_records_level() {
    for (level, byte) in [(Level::Min, 0x04), (Level::Max, 0x02)] {
        utils::init_logger();
        let mut compressor = Compressor::new(
            Config::default()
                .with_framing(Framing::Gzip)
                .with_level(level),
        )
        .unwrap();
        let compressed = utils::compress_all(&mut compressor, &[b"level".to_vec()], 64);

        let expected: [u8; 10] = [0x1f, 0x8b, 0x08, 0, 0, 0, 0, 0, byte, 0xff];
        assert_eq!(compressed[..10], expected);
    }
}

#[test]
#[ntest::timeout(1000)]
fn reinit_switches_settings() {
    let mut compressor = compressor(Framing::Raw, 64);
    compressor.set_input(b"discarded", 0, 9).unwrap();

    compressor
        .reinit(Config::default().with_framing(Framing::Gzip).with_buffer_size(32))
        .unwrap();
    assert_eq!(compressor.bytes_read(), 0);
    assert!(compressor.needs_input());

    let compressed = utils::compress_all(&mut compressor, &[b"reinit".to_vec()], 64);
    assert_eq!(utils::gzip_decompress(&compressed), b"reinit");
}

#[test]
#[ntest::timeout(1000)]
fn sync_flush_delivers_input_before_finish() {
    for flush in [Flush::Sync, Flush::Full] {
        utils::init_logger();
        let mut compressor = Compressor::new(Config::default().with_flush(flush)).unwrap();
        compressor.set_input(b"first block", 0, 11).unwrap();

        let mut output = [0; 256];
        let mut compressed = Vec::new();
        while !compressor.needs_input() {
            let len = compressor.compress(&mut output, 0, 256).unwrap();
            compressed.extend_from_slice(&output[..len]);
        }

        let mut decompress = flate2::Decompress::new(false);
        let mut decoded = [0; 64];
        decompress
            .decompress(&compressed, &mut decoded, flate2::FlushDecompress::Sync)
            .unwrap();
        assert_eq!(&decoded[..decompress.total_out() as usize], b"first block");
    }
}

#[test]
#[ntest::timeout(1000)]
fn sync_flush_larger_than_ready_buffer() {
    let input: Vec<u8> = (0..16u8).map(|i| i.wrapping_mul(151)).collect();

    for flush in [Flush::Sync, Flush::Full] {
        utils::init_logger();
        let config = Config::default().with_flush(flush).with_buffer_size(16);
        let mut compressor = Compressor::new(config).unwrap();
        compressor.set_input(&input, 0, input.len()).unwrap();

        let mut output = [0; 5];
        let mut compressed = Vec::new();
        while !compressor.needs_input() {
            let len = compressor.compress(&mut output, 0, 5).unwrap();
            compressed.extend_from_slice(&output[..len]);
        }
        assert!(compressed.len() > 16);

        let mut decompress = flate2::Decompress::new(false);
        let mut decoded = [0; 64];
        decompress
            .decompress(&compressed, &mut decoded, flate2::FlushDecompress::Sync)
            .unwrap();
        assert_eq!(&decoded[..decompress.total_out() as usize], &input[..]);
    }
}

#[test]
#[ntest::timeout(1000)]
fn input_after_finish_is_rejected() {
    let mut compressor = compressor(Framing::Raw, 64);
    compressor.set_input(b"data", 0, 4).unwrap();
    compressor.finish().unwrap();

    assert!(matches!(
        compressor.set_input(b"x", 0, 1),
        Err(Error::InvalidArgument(_))
    ));

    let mut output = [0; 64];
    let mut compressed = Vec::new();
    while !compressor.finished() {
        let len = compressor.compress(&mut output, 0, 64).unwrap();
        compressed.extend_from_slice(&output[..len]);
    }

    assert!(matches!(
        compressor.set_input(b"more", 0, 4),
        Err(Error::InvalidArgument(_))
    ));
    assert_eq!(compressor.compress(&mut output, 0, 64).unwrap(), 0);
    assert_eq!(compressor.bytes_read(), 4);
    assert_eq!(utils::deflate_decompress(&compressed), b"data");

    compressor.reset().unwrap();
    compressor.set_input(b"again", 0, 5).unwrap();
    let compressed = utils::compress_all(&mut compressor, &[], 64);
    assert_eq!(utils::deflate_decompress(&compressed), b"again");
}

#[test]
#[ntest::timeout(5000)]
fn smaller_than_input() {
    let input = utils::generate(44 * 1024);
    let mut compressor = compressor(Framing::Raw, 64 * 1024);
    let compressed = utils::compress_all(&mut compressor, &[input.clone()], 4096);

    assert!(compressed.len() < input.len());
    assert_eq!(utils::deflate_decompress(&compressed), input);
}
