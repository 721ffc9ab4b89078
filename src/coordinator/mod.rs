//! Push/pull coordinators adapting an engine to incremental callers.
//!
//! A caller hands input over with `set_input`, pulls output with `compress` or `decompress` while
//! [`needs_input`](Compress::needs_input) is false, and (on the compressing side) signals the end
//! of its data with [`finish`](Compress::finish) before draining until
//! [`finished`](Compress::finished). Every call performs at most one engine invocation and never
//! blocks.
//!
//! Buffers are described by a `(buf, offset, len)` triple; the region `buf[offset..offset + len]`
//! must lie within `buf` or the call fails with [`Error::OutOfBounds`](crate::Error::OutOfBounds)
//! before any state changes.

mod compressor;
mod decompressor;
mod direct;

pub use self::{compressor::Compressor, decompressor::Decompressor, direct::DirectDecompressor};

use crate::error::{Error, Result};

/// Caller-facing surface of a compressing coordinator.
pub trait Compress {
    /// Supply uncompressed bytes.
    ///
    /// The whole region is accepted: what does not fit the internal buffer is retained and fed to
    /// the engine by later calls. Any compressed output not yet returned by
    /// [`compress`](Compress::compress) is discarded. Fails with [`Error::InvalidArgument`] once
    /// [`finish`](Compress::finish) was called, until the next [`reset`](Compress::reset).
    fn set_input(&mut self, buf: &[u8], offset: usize, len: usize) -> Result<()>;

    /// Whether all supplied input was consumed and all output delivered.
    fn needs_input(&mut self) -> bool;

    /// Preset dictionaries are not supported, this always fails once the region is validated.
    fn set_dictionary(&mut self, buf: &[u8], offset: usize, len: usize) -> Result<()>;

    /// Signal that no further input will be supplied.
    fn finish(&mut self) -> Result<()>;

    /// Whether the end of the compressed stream has been delivered.
    fn finished(&self) -> bool;

    /// Write up to `len` compressed bytes to `buf[offset..]`, returns how many were written.
    fn compress(&mut self, buf: &mut [u8], offset: usize, len: usize) -> Result<usize>;

    /// Uncompressed bytes supplied since construction or the last reset.
    fn bytes_read(&self) -> u64;

    /// Compressed bytes delivered since construction or the last reset.
    fn bytes_written(&self) -> u64;

    /// Start a new stream, keeping the engine.
    fn reset(&mut self) -> Result<()>;

    /// Release the engine; later calls fail with [`Error::Closed`].
    fn end(&mut self);
}

/// Caller-facing surface of a decompressing coordinator.
pub trait Decompress {
    /// Supply compressed bytes, see [`Compress::set_input`].
    fn set_input(&mut self, buf: &[u8], offset: usize, len: usize) -> Result<()>;

    /// Whether all supplied input was consumed and all output delivered.
    fn needs_input(&mut self) -> bool;

    /// Preset dictionaries are not supported, this always fails once the region is validated.
    fn set_dictionary(&mut self, buf: &[u8], offset: usize, len: usize) -> Result<()>;

    /// Always `false`.
    fn needs_dictionary(&self) -> bool {
        false
    }

    /// Whether the end of the compressed stream was reached and all output delivered.
    fn finished(&self) -> bool;

    /// Write up to `len` decompressed bytes to `buf[offset..]`, returns how many were written.
    fn decompress(&mut self, buf: &mut [u8], offset: usize, len: usize) -> Result<usize>;

    /// Supplied bytes the engine has not consumed yet.
    ///
    /// Non-zero once [`finished`](Decompress::finished) means data followed the compressed stream.
    fn remaining(&self) -> usize;

    /// Compressed bytes supplied since construction or the last reset.
    fn bytes_read(&self) -> u64;

    /// Decompressed bytes delivered since construction or the last reset.
    fn bytes_written(&self) -> u64;

    /// Start a new stream, keeping the engine.
    fn reset(&mut self) -> Result<()>;

    /// Release the engine; later calls fail with [`Error::Closed`].
    fn end(&mut self);
}

/// Exclusive ownership of an engine until [`close`](Handle::close).
#[derive(Debug)]
pub(crate) struct Handle<E>(Option<E>);

impl<E> Handle<E> {
    pub(crate) fn new(engine: E) -> Self {
        Self(Some(engine))
    }

    pub(crate) fn get(&self) -> Result<&E> {
        self.0.as_ref().ok_or(Error::Closed)
    }

    pub(crate) fn get_mut(&mut self) -> Result<&mut E> {
        self.0.as_mut().ok_or(Error::Closed)
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.0.is_none()
    }

    /// Drop the engine, returns whether there was one.
    pub(crate) fn close(&mut self) -> bool {
        self.0.take().is_some()
    }
}
