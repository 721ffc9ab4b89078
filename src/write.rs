//! Blocking compression over [`std::io::Write`].

use std::io::{self, Write};

use crate::coordinator::{Compress, Compressor};

const CHUNK_SIZE: usize = 32 * 1024;

/// Compresses everything written to it into an underlying writer.
///
/// The compressed stream is only complete after [`try_finish`](Self::try_finish) or
/// [`finish`](Self::finish); dropping the writer without finishing truncates it.
#[derive(Debug)]
pub struct CompressorWriter<W, C = Compressor> {
    writer: W,
    coordinator: C,
    chunk: Box<[u8]>,
}

impl<W: Write, C: Compress> CompressorWriter<W, C> {
    /// Compress into `writer` with `coordinator`.
    pub fn new(writer: W, coordinator: C) -> Self {
        Self {
            writer,
            coordinator,
            chunk: vec![0; CHUNK_SIZE].into_boxed_slice(),
        }
    }

    /// Acquires a reference to the underlying writer.
    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    /// Acquires a mutable reference to the underlying writer.
    ///
    /// Note that writing to it directly corrupts the compressed stream.
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    /// The coordinator, for its byte counters.
    pub fn coordinator(&self) -> &C {
        &self.coordinator
    }

    /// Consumes this writer returning the underlying writer, without finishing the stream.
    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Write out compressed output until the coordinator wants more input.
    fn drain(&mut self) -> io::Result<()> {
        while !self.coordinator.needs_input() {
            let len = self.coordinator.compress(&mut self.chunk, 0, CHUNK_SIZE)?;
            self.writer.write_all(&self.chunk[..len])?;
        }
        Ok(())
    }

    /// Complete the compressed stream and flush the underlying writer.
    ///
    /// Calling it again is a no-op apart from flushing.
    pub fn try_finish(&mut self) -> io::Result<()> {
        if !self.coordinator.finished() {
            self.coordinator.finish()?;
            while !self.coordinator.finished() {
                let len = self.coordinator.compress(&mut self.chunk, 0, CHUNK_SIZE)?;
                self.writer.write_all(&self.chunk[..len])?;
            }
        }
        self.writer.flush()
    }

    /// Complete the compressed stream and return the underlying writer.
    pub fn finish(mut self) -> io::Result<W> {
        self.try_finish()?;
        Ok(self.writer)
    }
}

impl<W: Write, C: Compress> Write for CompressorWriter<W, C> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        self.drain()?;
        self.coordinator.set_input(buf, 0, buf.len())?;
        self.drain()?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.drain()?;
        self.writer.flush()
    }
}

const _: () = {
    fn _assert() {
        use crate::util::{_assert_send, _assert_sync};

        _assert_send::<CompressorWriter<Vec<u8>>>();
        _assert_sync::<CompressorWriter<Vec<u8>>>();
    }
};
