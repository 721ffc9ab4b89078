//! Types which operate over [`AsyncWrite`](::tokio::io::AsyncWrite) streams.

use std::{
    io,
    pin::Pin,
    task::{Context, Poll},
};

use futures_core::ready;
use pin_project_lite::pin_project;
use ::tokio::io::AsyncWrite;

use crate::{
    coordinator::{Compress, Compressor},
    util::PartialBuffer,
};

const CHUNK_SIZE: usize = 32 * 1024;

pin_project! {
    /// Compresses everything written to it into an underlying [`AsyncWrite`].
    ///
    /// The compressed stream is completed by
    /// [`shutdown`](::tokio::io::AsyncWriteExt::shutdown).
    #[derive(Debug)]
    pub struct CompressorWriter<W, C = Compressor> {
        #[pin]
        writer: W,
        coordinator: C,
        // Compressed bytes, the written part has been handed to `writer`.
        buffer: PartialBuffer<Vec<u8>>,
    }
}

impl<W: AsyncWrite, C: Compress> CompressorWriter<W, C> {
    /// Compress into `writer` with `coordinator`.
    pub fn new(writer: W, coordinator: C) -> Self {
        Self {
            writer,
            coordinator,
            buffer: PartialBuffer::new(Vec::with_capacity(CHUNK_SIZE)),
        }
    }
}

impl<W, C> CompressorWriter<W, C> {
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

    /// Acquires a pinned mutable reference to the underlying writer.
    pub fn get_pin_mut(self: Pin<&mut Self>) -> Pin<&mut W> {
        self.project().writer
    }

    /// The coordinator, for its byte counters.
    pub fn coordinator(&self) -> &C {
        &self.coordinator
    }

    /// Consumes this writer returning the underlying writer.
    ///
    /// Note that this may discard compressed data which was not written out yet.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Hand all buffered compressed bytes to `writer`.
fn poll_write_buffer<W: AsyncWrite>(
    mut writer: Pin<&mut W>,
    cx: &mut Context<'_>,
    buffer: &mut PartialBuffer<Vec<u8>>,
) -> Poll<io::Result<()>> {
    while !buffer.unwritten().is_empty() {
        let len = ready!(writer.as_mut().poll_write(cx, buffer.unwritten()))?;
        if len == 0 {
            return Poll::Ready(Err(io::Error::new(
                io::ErrorKind::WriteZero,
                "failed to write compressed data",
            )));
        }
        buffer.advance(len);
    }
    Poll::Ready(Ok(()))
}

/// Refill the (fully written) buffer with the coordinator's next output.
fn produce<C: Compress>(coordinator: &mut C, buffer: &mut PartialBuffer<Vec<u8>>) -> io::Result<()> {
    let chunk = buffer.get_mut();
    chunk.resize(CHUNK_SIZE, 0);
    let len = coordinator.compress(chunk, 0, CHUNK_SIZE)?;
    chunk.truncate(len);
    buffer.reset();
    Ok(())
}

impl<W: AsyncWrite, C: Compress> AsyncWrite for CompressorWriter<W, C> {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        if buf.is_empty() {
            return Poll::Ready(Ok(0));
        }

        let mut this = self.project();

        loop {
            ready!(poll_write_buffer(this.writer.as_mut(), cx, &mut *this.buffer))?;
            if this.coordinator.needs_input() {
                break;
            }
            produce(&mut *this.coordinator, &mut *this.buffer)?;
        }

        this.coordinator.set_input(buf, 0, buf.len())?;
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        let mut this = self.project();

        loop {
            ready!(poll_write_buffer(this.writer.as_mut(), cx, &mut *this.buffer))?;
            if this.coordinator.needs_input() {
                break;
            }
            produce(&mut *this.coordinator, &mut *this.buffer)?;
        }

        this.writer.poll_flush(cx)
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        let mut this = self.project();

        loop {
            ready!(poll_write_buffer(this.writer.as_mut(), cx, &mut *this.buffer))?;
            if this.coordinator.finished() {
                break;
            }
            this.coordinator.finish()?;
            produce(&mut *this.coordinator, &mut *this.buffer)?;
        }

        this.writer.poll_shutdown(cx)
    }
}

const _: () = {
    fn _assert() {
        use crate::util::{_assert_send, _assert_sync};
        use std::pin::Pin;

        _assert_send::<CompressorWriter<Pin<Box<dyn AsyncWrite + Send>>>>();
        _assert_sync::<CompressorWriter<Pin<Box<dyn AsyncWrite + Sync>>>>();
    }
};
