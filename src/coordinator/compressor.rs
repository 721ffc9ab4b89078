use super::{Compress, Handle};
use crate::{
    config::Config,
    engine::{self, Encode, FlateEncoder},
    error::{Error, Result},
    util::{check_range, InputStage, PartialBuffer, ReadyBuffer},
};

/// Compressing coordinator.
///
/// Stages caller input in a pending buffer of the configured capacity and engine output in a
/// ready buffer of the same capacity. The engine is only invoked once the ready buffer has been
/// fully delivered.
///
/// ```
/// use compression_coordinator::{Compress, Compressor, Config};
///
/// let mut compressor = Compressor::new(Config::default())?;
/// compressor.set_input(b"hello world", 0, 11)?;
/// compressor.finish()?;
///
/// let mut compressed = Vec::new();
/// let mut buf = [0; 16];
/// while !compressor.finished() {
///     let n = buf.len();
///     let len = compressor.compress(&mut buf, 0, n)?;
///     compressed.extend_from_slice(&buf[..len]);
/// }
/// assert_eq!(compressor.bytes_read(), 11);
/// assert_eq!(compressor.bytes_written(), compressed.len() as u64);
/// # Ok::<(), compression_coordinator::Error>(())
/// ```
#[derive(Debug)]
pub struct Compressor<E = FlateEncoder> {
    engine: Handle<E>,
    input: InputStage,
    ready: ReadyBuffer,
    finish_requested: bool,
    stream_finished: bool,
    bytes_read: u64,
    bytes_written: u64,
}

impl Compressor {
    /// Create a deflate compressor with the settings of `config`.
    ///
    /// Fails with [`Error::Unavailable`] if the engine did not pass its probe.
    pub fn new(config: Config) -> Result<Self> {
        engine::init()?;
        Ok(Self::with_engine(
            FlateEncoder::new(&config),
            config.buffer_size(),
        ))
    }

    /// Discard the current stream and rebuild the engine and buffers with the settings of
    /// `config`.
    pub fn reinit(&mut self, config: Config) -> Result<()> {
        self.engine.get_mut()?.reinit(&config);
        self.input = InputStage::new(config.buffer_size());
        self.ready = ReadyBuffer::new(config.buffer_size());
        self.clear();
        Ok(())
    }
}

impl<E: Encode> Compressor<E> {
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
            finish_requested: false,
            stream_finished: false,
            bytes_read: 0,
            bytes_written: 0,
        }
    }

    /// The engine, unless the coordinator was ended.
    pub fn engine(&self) -> Option<&E> {
        self.engine.get().ok()
    }

    fn clear(&mut self) {
        self.input.clear();
        self.ready.clear();
        self.finish_requested = false;
        self.stream_finished = false;
        self.bytes_read = 0;
        self.bytes_written = 0;
    }
}

impl<E: Encode> Compress for Compressor<E> {
    fn set_input(&mut self, buf: &[u8], offset: usize, len: usize) -> Result<()> {
        let range = check_range(buf.len(), offset, len)?;
        self.engine.get()?;

        if self.finish_requested {
            return Err(Error::InvalidArgument("input after finish"));
        }

        if !self.ready.is_empty() {
            log::warn!(
                "set_input discards {} undelivered compressed bytes",
                self.ready.unread().len()
            );
        }
        self.ready.clear();
        self.input.push(&buf[range]);
        self.bytes_read += len as u64;
        Ok(())
    }

    fn needs_input(&mut self) -> bool {
        let holds_output = match self.engine.get() {
            Ok(engine) => engine.has_pending_output(),
            Err(_) => return false,
        };
        if holds_output || !self.ready.is_empty() || !self.input.pending().is_empty() {
            return false;
        }
        self.input.refill() == 0
    }

    fn set_dictionary(&mut self, buf: &[u8], offset: usize, len: usize) -> Result<()> {
        check_range(buf.len(), offset, len)?;
        self.engine.get()?;
        Err(Error::Unsupported("preset dictionary"))
    }

    fn finish(&mut self) -> Result<()> {
        self.engine.get()?;
        self.finish_requested = true;
        Ok(())
    }

    fn finished(&self) -> bool {
        self.engine.is_closed()
            || (self.finish_requested && self.stream_finished && self.ready.is_empty())
    }

    fn compress(&mut self, buf: &mut [u8], offset: usize, len: usize) -> Result<usize> {
        let range = check_range(buf.len(), offset, len)?;
        let engine = self.engine.get_mut()?;

        if len == 0 {
            return Ok(0);
        }

        if self.ready.is_empty() {
            if self.input.pending().is_empty() {
                self.input.refill();
            }

            let idle = self.input.pending().is_empty()
                && !self.finish_requested
                && !engine.has_pending_output();
            if self.stream_finished || idle {
                return Ok(0);
            }

            let end_of_stream = self.finish_requested && !self.input.has_overflow();
            let mut input = PartialBuffer::new(self.input.pending());
            let mut output = PartialBuffer::new(self.ready.space());

            let done = engine.encode(&mut input, &mut output, end_of_stream)?;

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

    fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    fn reset(&mut self) -> Result<()> {
        self.engine.get_mut()?.reset()?;
        self.clear();
        log::debug!("compressor reset");
        Ok(())
    }

    fn end(&mut self) {
        if self.engine.close() {
            self.clear();
            log::debug!("compressor engine released");
        }
    }
}
