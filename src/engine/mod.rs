//! Block-oriented compression engines driven by the coordinators.
//!
//! An engine consumes from an input [`PartialBuffer`] and produces into an output
//! [`PartialBuffer`], advancing both by the amounts it processed. The coordinators never inspect
//! the compressed format, they only move bytes between their own buffers and the engine.

use std::{io, sync::OnceLock};

use crate::{
    error::{Error, Result},
    util::PartialBuffer,
};

pub mod flate;

pub use self::flate::{FlateDecoder, FlateEncoder};

/// A stateful compression engine.
pub trait Encode {
    /// Compress from `input` into `output`, advancing both by the bytes consumed and produced.
    ///
    /// `end_of_stream` signals that `input` holds the last bytes of the stream. Returns `Ok(true)`
    /// once the final output of the stream (including any trailer) has been produced.
    fn encode(
        &mut self,
        input: &mut PartialBuffer<&[u8]>,
        output: &mut PartialBuffer<&mut [u8]>,
        end_of_stream: bool,
    ) -> io::Result<bool>;

    /// True while output of an earlier step is held back, such as the rest of a flush which did
    /// not fit the last output buffer. Encoding empty input then produces more of it.
    fn has_pending_output(&self) -> bool {
        false
    }

    /// Prepare the engine for a new stream with the same settings.
    fn reset(&mut self) -> io::Result<()>;

    /// Bytes consumed since construction or the last [`reset`](Encode::reset).
    fn total_in(&self) -> u64;

    /// Bytes produced since construction or the last [`reset`](Encode::reset).
    fn total_out(&self) -> u64;
}

/// A stateful decompression engine.
pub trait Decode {
    /// Decompress from `input` into `output`, advancing both by the bytes consumed and produced.
    ///
    /// May produce output without consuming input when the engine has buffered data. Returns
    /// `Ok(true)` once the end of the compressed stream was recognised and all of its output has
    /// been produced; bytes after the end of the stream are left unconsumed.
    fn decode(
        &mut self,
        input: &mut PartialBuffer<&[u8]>,
        output: &mut PartialBuffer<&mut [u8]>,
    ) -> io::Result<bool>;

    /// Prepare the engine for a new stream.
    fn reset(&mut self) -> io::Result<()>;

    /// Bytes consumed since construction or the last [`reset`](Decode::reset).
    fn total_in(&self) -> u64;

    /// Bytes produced since construction or the last [`reset`](Decode::reset).
    fn total_out(&self) -> u64;
}

impl<E: Encode + ?Sized> Encode for Box<E> {
    fn encode(
        &mut self,
        input: &mut PartialBuffer<&[u8]>,
        output: &mut PartialBuffer<&mut [u8]>,
        end_of_stream: bool,
    ) -> io::Result<bool> {
        (**self).encode(input, output, end_of_stream)
    }

    fn has_pending_output(&self) -> bool {
        (**self).has_pending_output()
    }

    fn reset(&mut self) -> io::Result<()> {
        (**self).reset()
    }

    fn total_in(&self) -> u64 {
        (**self).total_in()
    }

    fn total_out(&self) -> u64 {
        (**self).total_out()
    }
}

impl<D: Decode + ?Sized> Decode for Box<D> {
    fn decode(
        &mut self,
        input: &mut PartialBuffer<&[u8]>,
        output: &mut PartialBuffer<&mut [u8]>,
    ) -> io::Result<bool> {
        (**self).decode(input, output)
    }

    fn reset(&mut self) -> io::Result<()> {
        (**self).reset()
    }

    fn total_in(&self) -> u64 {
        (**self).total_in()
    }

    fn total_out(&self) -> u64 {
        (**self).total_out()
    }
}

static AVAILABLE: OnceLock<bool> = OnceLock::new();

/// Name of the deflate implementation backing [`FlateEncoder`] and [`FlateDecoder`].
pub fn library_name() -> &'static str {
    if cfg!(feature = "zlib") {
        "zlib"
    } else {
        "miniz_oxide"
    }
}

/// Probe the engine once per process.
///
/// Safe to call from several threads at once, only the first call runs the probe. The outcome is
/// cached for [`is_available`] and consulted by every coordinator constructor.
pub fn init() -> Result<()> {
    if is_available() {
        Ok(())
    } else {
        Err(Error::Unavailable(library_name()))
    }
}

/// Whether the engine passed its probe, running the probe first if it has not run yet.
pub fn is_available() -> bool {
    *AVAILABLE.get_or_init(|| match probe() {
        Ok(()) => {
            log::info!("using {} deflate engine", library_name());
            true
        }
        Err(error) => {
            log::warn!("{} deflate engine failed its probe: {error}", library_name());
            false
        }
    })
}

/// Round-trip a small payload through a fresh encoder and decoder.
fn probe() -> io::Result<()> {
    const SAMPLE: &[u8] = b"probe probe probe probe";

    let mut compressed = [0; 128];
    let mut output = PartialBuffer::new(&mut compressed[..]);
    let done = FlateEncoder::default().encode(&mut PartialBuffer::new(SAMPLE), &mut output, true)?;
    if !done {
        return Err(io::Error::other("encoder did not finish the sample"));
    }
    let len = output.written().len();

    let mut decompressed = [0; SAMPLE.len()];
    let mut output = PartialBuffer::new(&mut decompressed[..]);
    FlateDecoder::default().decode(&mut PartialBuffer::new(&compressed[..len]), &mut output)?;
    if output.written() != SAMPLE {
        return Err(io::Error::other("sample did not round-trip"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probe_is_idempotent() {
        assert!(is_available());
        init().unwrap();
        init().unwrap();
        assert!(is_available());
    }

    #[test]
    fn probe_is_safe_to_race() {
        let handles: Vec<_> = (0..8).map(|_| std::thread::spawn(is_available)).collect();
        for handle in handles {
            assert!(handle.join().unwrap());
        }
    }
}
