//! Blocking decompression over [`std::io::BufRead`].

use std::io::{self, BufRead, Read};

use crate::coordinator::{Decompress, Decompressor};

/// Decompresses the data read from an underlying buffered reader.
#[derive(Debug)]
pub struct DecompressorReader<R, D = Decompressor> {
    reader: R,
    coordinator: D,
    multiple_members: bool,
    eof: bool,
}

impl<R: BufRead, D: Decompress> DecompressorReader<R, D> {
    /// Decompress what is read from `reader` with `coordinator`.
    pub fn new(reader: R, coordinator: D) -> Self {
        Self {
            reader,
            coordinator,
            multiple_members: false,
            eof: false,
        }
    }

    /// Keep reading after the end of a compressed stream while `reader` has more data.
    ///
    /// The coordinator has to be set up for multiple members as well, see
    /// [`Decompressor::multiple_members`].
    pub fn multiple_members(mut self, enabled: bool) -> Self {
        self.multiple_members = enabled;
        self
    }

    /// Acquires a reference to the underlying reader.
    pub fn get_ref(&self) -> &R {
        &self.reader
    }

    /// Acquires a mutable reference to the underlying reader.
    ///
    /// Note that care must be taken to avoid tampering with the state of the reader which
    /// may otherwise confuse this decompressor.
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.reader
    }

    /// The coordinator, for its byte counters.
    pub fn coordinator(&self) -> &D {
        &self.coordinator
    }

    /// Consumes this reader returning the underlying reader.
    ///
    /// Compressed bytes already handed to the coordinator are lost.
    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: BufRead, D: Decompress> Read for DecompressorReader<R, D> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        loop {
            if self.coordinator.finished()
                && (!self.multiple_members || self.reader.fill_buf()?.is_empty())
            {
                return Ok(0);
            }

            if self.coordinator.needs_input() && !self.eof {
                let input = self.reader.fill_buf()?;
                let len = input.len();
                if len == 0 {
                    self.eof = true;
                } else {
                    self.coordinator.set_input(input, 0, len)?;
                    self.reader.consume(len);
                }
            }

            let len = self.coordinator.decompress(buf, 0, buf.len())?;
            if len > 0 {
                return Ok(len);
            }

            if self.eof && self.coordinator.needs_input() && !self.coordinator.finished() {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "compressed stream ended before its end marker",
                ));
            }
        }
    }
}

const _: () = {
    fn _assert() {
        use crate::util::{_assert_send, _assert_sync};

        _assert_send::<DecompressorReader<&[u8]>>();
        _assert_sync::<DecompressorReader<&[u8]>>();
    }
};
