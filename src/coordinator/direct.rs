use super::{decompressor::step, Decompress, Handle};
use crate::{
    config::Config,
    engine::{self, Decode, FlateDecoder},
    error::{Error, Result},
    util::PartialBuffer,
};

/// Decompressing coordinator working directly between two caller regions.
///
/// No bytes are staged in owned memory: each call lends the unread part of the source and the
/// free part of the destination to the engine for a single step. The array based methods of
/// [`Decompress`] are not available and fail with [`Error::Unsupported`].
///
/// ```
/// use compression_coordinator::{Config, Decompress, DirectDecompressor, PartialBuffer};
///
/// let compressed = [0xcb, 0x48, 0xcd, 0xc9, 0xc9, 0x07, 0x00];
/// let mut decompressor = DirectDecompressor::new(Config::default())?;
///
/// let mut src = PartialBuffer::new(&compressed[..]);
/// let mut out = [0; 16];
/// let mut dst = PartialBuffer::new(&mut out[..]);
/// while !decompressor.finished() {
///     decompressor.decompress_direct(&mut src, &mut dst)?;
/// }
/// assert_eq!(dst.written(), b"hello");
/// # Ok::<(), compression_coordinator::Error>(())
/// ```
#[derive(Debug)]
pub struct DirectDecompressor<E = FlateDecoder> {
    engine: Handle<E>,
    stream_finished: bool,
    end_of_input: bool,
    multiple_members: bool,
    bytes_read: u64,
    bytes_written: u64,
}

impl DirectDecompressor {
    /// Create a deflate decompressor for the framing of `config`, the buffer size is unused.
    ///
    /// Fails with [`Error::Unavailable`] if the engine did not pass its probe.
    pub fn new(config: Config) -> Result<Self> {
        engine::init()?;
        Ok(Self::with_engine(FlateDecoder::new(config.framing())))
    }
}

impl<E: Decode> DirectDecompressor<E> {
    /// Wrap an already constructed engine.
    pub fn with_engine(engine: E) -> Self {
        Self {
            engine: Handle::new(engine),
            stream_finished: false,
            end_of_input: true,
            multiple_members: false,
            bytes_read: 0,
            bytes_written: 0,
        }
    }

    /// See [`Decompressor::multiple_members`](super::Decompressor::multiple_members).
    pub fn multiple_members(mut self, enabled: bool) -> Self {
        self.multiple_members = enabled;
        self
    }

    /// Run one engine step from the unread part of `src` into the free part of `dst`.
    ///
    /// Both buffers are advanced by the bytes consumed and produced; bytes already written to
    /// `dst` are left untouched. Fails with [`Error::InvalidArgument`] when `dst` has no free
    /// space.
    ///
    /// Once the stream has ended, bytes left in `src` are not consumed and keep
    /// [`finished`](Decompress::finished) false, so a loop on `finished` alone never ends for
    /// input with trailing data. Enable [`multiple_members`](Self::multiple_members) when such
    /// bytes start another stream, otherwise stop once a call makes no progress.
    pub fn decompress_direct(
        &mut self,
        src: &mut PartialBuffer<&[u8]>,
        dst: &mut PartialBuffer<&mut [u8]>,
    ) -> Result<()> {
        let engine = self.engine.get_mut()?;

        if dst.unwritten().is_empty() {
            return Err(Error::InvalidArgument("destination has no free space"));
        }

        if self.stream_finished {
            if !self.multiple_members || src.unwritten().is_empty() {
                self.end_of_input = src.unwritten().is_empty();
                return Ok(());
            }
            log::debug!("input after end of member, continuing with the next");
            engine.reset()?;
            self.stream_finished = false;
        }

        let prior_in = src.written().len();
        let prior_out = dst.written().len();

        let result = step(engine, self.multiple_members, src, dst, false);

        self.bytes_read += (src.written().len() - prior_in) as u64;
        self.bytes_written += (dst.written().len() - prior_out) as u64;
        self.end_of_input = src.unwritten().is_empty();
        self.stream_finished = result?;
        Ok(())
    }
}

impl<E: Decode> Decompress for DirectDecompressor<E> {
    fn set_input(&mut self, _buf: &[u8], _offset: usize, _len: usize) -> Result<()> {
        Err(Error::Unsupported("array input on the direct path"))
    }

    /// True once the last call consumed its whole source without reaching the end of the stream.
    fn needs_input(&mut self) -> bool {
        !self.engine.is_closed() && self.end_of_input && !self.stream_finished
    }

    fn set_dictionary(&mut self, _buf: &[u8], _offset: usize, _len: usize) -> Result<()> {
        Err(Error::Unsupported("preset dictionary"))
    }

    fn finished(&self) -> bool {
        self.engine.is_closed() || (self.end_of_input && self.stream_finished)
    }

    fn decompress(&mut self, _buf: &mut [u8], _offset: usize, _len: usize) -> Result<usize> {
        Err(Error::Unsupported("array output on the direct path"))
    }

    fn remaining(&self) -> usize {
        0
    }

    fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    fn reset(&mut self) -> Result<()> {
        self.engine.get_mut()?.reset()?;
        self.stream_finished = false;
        self.end_of_input = true;
        self.bytes_read = 0;
        self.bytes_written = 0;
        log::debug!("direct decompressor reset");
        Ok(())
    }

    fn end(&mut self) {
        if self.engine.close() {
            log::debug!("direct decompressor engine released");
        }
    }
}
