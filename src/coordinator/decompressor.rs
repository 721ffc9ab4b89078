use super::{Decompress, Handle};
use crate::{
    config::Config,
    engine::{self, Decode, FlateDecoder},
    error::{Error, Result},
    util::{check_range, InputStage, PartialBuffer, ReadyBuffer},
};

/// Decompressing coordinator, the mirror image of [`Compressor`](super::Compressor).
///
/// The engine recognises the end of the compressed stream by itself, so there is no `finish`.
/// Bytes following the stream stay unconsumed and are reported by
/// [`remaining`](Decompress::remaining), unless [`multiple_members`](Self::multiple_members) is
/// enabled.
#[derive(Debug)]
pub struct Decompressor<E = FlateDecoder> {
    engine: Handle<E>,
    input: InputStage,
    ready: ReadyBuffer,
    stream_finished: bool,
    multiple_members: bool,
    bytes_read: u64,
    bytes_written: u64,
}

impl Decompressor {
    /// Create a deflate decompressor for the framing and buffer size of `config`.
    ///
    /// Fails with [`Error::Unavailable`] if the engine did not pass its probe.
    pub fn new(config: Config) -> Result<Self> {
        engine::init()?;
        Ok(Self::with_engine(
            FlateDecoder::new(config.framing()),
            config.buffer_size(),
        ))
    }
}

impl<E: Decode> Decompressor<E> {
    /// Wrap an already constructed engine, with buffers of `buffer_size` bytes.
    ///
    /// # Panics
    ///
    /// Panics if `buffer_size` is zero.
    pub fn with_engine(engine: E, buffer_size: usize) -> Self {
        assert!(buffer_size > 0, "buffer size must be non-zero");
        Self {
            engine: Handle::new(engine),
            input: InputStage::new(buffer_size),
            ready: ReadyBuffer::new(buffer_size),
            stream_finished: false,
            multiple_members: false,
            bytes_read: 0,
            bytes_written: 0,
        }
    }

    /// Continue with the next member when more input follows the end of a compressed stream,
    /// yielding the concatenation of all members.
    pub fn multiple_members(mut self, enabled: bool) -> Self {
        self.multiple_members = enabled;
        self
    }

    /// The engine, unless the coordinator was ended.
    pub fn engine(&self) -> Option<&E> {
        self.engine.get().ok()
    }

    fn clear(&mut self) {
        self.input.clear();
        self.ready.clear();
        self.stream_finished = false;
        self.bytes_read = 0;
        self.bytes_written = 0;
    }
}

/// Invoke the engine once, returns whether the stream ended.
///
/// With `multiple_members`, the end of a member followed by more input (in `input`, or `more`
/// still to be staged) re-primes the engine for the next member instead.
pub(super) fn step<E: Decode>(
    engine: &mut E,
    multiple_members: bool,
    input: &mut PartialBuffer<&[u8]>,
    output: &mut PartialBuffer<&mut [u8]>,
    more: bool,
) -> Result<bool> {
    if !engine.decode(input, output)? {
        return Ok(false);
    }

    if multiple_members && (more || !input.unwritten().is_empty()) {
        log::debug!(
            "member complete after {} compressed bytes, continuing with the next",
            engine.total_in()
        );
        engine.reset()?;
        return Ok(false);
    }

    Ok(true)
}

impl<E: Decode> Decompress for Decompressor<E> {
    fn set_input(&mut self, buf: &[u8], offset: usize, len: usize) -> Result<()> {
        let range = check_range(buf.len(), offset, len)?;
        let engine = self.engine.get_mut()?;

        if self.multiple_members && self.stream_finished && len > 0 {
            log::debug!("input after end of member, continuing with the next");
            engine.reset()?;
            self.stream_finished = false;
        }

        if !self.ready.is_empty() {
            log::warn!(
                "set_input discards {} undelivered decompressed bytes",
                self.ready.unread().len()
            );
        }
        self.ready.clear();
        self.input.push(&buf[range]);
        self.bytes_read += len as u64;
        Ok(())
    }

    fn needs_input(&mut self) -> bool {
        if self.engine.is_closed() || !self.ready.is_empty() || !self.input.pending().is_empty() {
            return false;
        }
        self.input.refill() == 0
    }

    fn set_dictionary(&mut self, buf: &[u8], offset: usize, len: usize) -> Result<()> {
        check_range(buf.len(), offset, len)?;
        self.engine.get()?;
        Err(Error::Unsupported("preset dictionary"))
    }

    fn finished(&self) -> bool {
        self.engine.is_closed() || (self.stream_finished && self.ready.is_empty())
    }

    fn decompress(&mut self, buf: &mut [u8], offset: usize, len: usize) -> Result<usize> {
        let range = check_range(buf.len(), offset, len)?;
        let engine = self.engine.get_mut()?;

        if len == 0 {
            return Ok(0);
        }

        if self.ready.is_empty() {
            if self.stream_finished {
                return Ok(0);
            }

            if self.input.pending().is_empty() {
                self.input.refill();
            }

            let more = self.input.has_overflow();
            let mut input = PartialBuffer::new(self.input.pending());
            let mut output = PartialBuffer::new(self.ready.space());

            let done = step(engine, self.multiple_members, &mut input, &mut output, more)?;

            let (consumed, produced) = (input.written().len(), output.written().len());
            self.input.consume(consumed);
            self.ready.produced(produced);
            self.stream_finished = done;
            if self.input.pending().is_empty() {
                self.input.refill();
            }
        }

        let written = self.ready.drain_into(&mut buf[range]);
        self.bytes_written += written as u64;
        Ok(written)
    }

    fn remaining(&self) -> usize {
        self.input.remaining()
    }

    fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    fn reset(&mut self) -> Result<()> {
        self.engine.get_mut()?.reset()?;
        self.clear();
        log::debug!("decompressor reset");
        Ok(())
    }

    fn end(&mut self) {
        if self.engine.close() {
            self.clear();
            log::debug!("decompressor engine released");
        }
    }
}
