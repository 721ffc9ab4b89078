use std::ops::Range;

use crate::error::{Error, Result};

pub const fn _assert_send<T: Send>() {}
pub const fn _assert_sync<T: Sync>() {}

/// Buffer containing partially processed data.
///
/// For an input region the written part has been consumed and the unwritten part is still to be
/// read; for an output region the written part holds produced bytes and the unwritten part is
/// free space.
#[derive(Debug, Default)]
pub struct PartialBuffer<B> {
    buffer: B,
    index: usize,
}

impl<B: AsRef<[u8]>> PartialBuffer<B> {
    /// Create a new [`PartialBuffer`] positioned at the start of `buffer`.
    pub fn new(buffer: B) -> Self {
        Self { buffer, index: 0 }
    }

    /// Processed part of the buffer.
    pub fn written(&self) -> &[u8] {
        &self.buffer.as_ref()[..self.index]
    }

    /// Unprocessed part of the buffer.
    pub fn unwritten(&self) -> &[u8] {
        &self.buffer.as_ref()[self.index..]
    }

    /// Move `amount` bytes from the unprocessed part to the processed part.
    pub fn advance(&mut self, amount: usize) {
        self.index += amount;
    }

    /// Reference to the underlying buffer.
    pub fn get_ref(&self) -> &B {
        &self.buffer
    }

    /// Mutable reference to the underlying buffer.
    pub fn get_mut(&mut self) -> &mut B {
        &mut self.buffer
    }

    /// Convert the [`PartialBuffer`] back into the underlying buffer.
    pub fn into_inner(self) -> B {
        self.buffer
    }

    /// Move the position back to the start of the buffer.
    pub fn reset(&mut self) {
        self.index = 0;
    }
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> PartialBuffer<B> {
    /// Mutable reference to the unprocessed part of the buffer.
    pub fn unwritten_mut(&mut self) -> &mut [u8] {
        &mut self.buffer.as_mut()[self.index..]
    }

    /// Copy the unprocessed part of another buffer into this buffer, advancing both buffers.
    pub fn copy_unwritten_from<C: AsRef<[u8]>>(&mut self, other: &mut PartialBuffer<C>) -> usize {
        let len = self.unwritten().len().min(other.unwritten().len());

        self.unwritten_mut()[..len].copy_from_slice(&other.unwritten()[..len]);

        self.advance(len);
        other.advance(len);
        len
    }
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> From<B> for PartialBuffer<B> {
    fn from(buffer: B) -> Self {
        Self::new(buffer)
    }
}

/// Validate that `offset..offset + len` lies within a buffer of `size` bytes.
pub(crate) fn check_range(size: usize, offset: usize, len: usize) -> Result<Range<usize>> {
    match offset.checked_add(len) {
        Some(end) if end <= size => Ok(offset..end),
        _ => Err(Error::OutOfBounds { offset, len, size }),
    }
}

/// Input side of a coordinator: the fixed-capacity pending buffer handed to the engine, plus an
/// owned overflow holding caller bytes which did not fit yet.
#[derive(Debug)]
pub(crate) struct InputStage {
    /// Vec length is the fill level, the index is how far the engine has consumed.
    pending: PartialBuffer<Vec<u8>>,
    overflow: PartialBuffer<Vec<u8>>,
    capacity: usize,
}

impl InputStage {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            pending: PartialBuffer::new(Vec::with_capacity(capacity)),
            overflow: PartialBuffer::default(),
            capacity,
        }
    }

    /// Accept caller bytes: as many as fit go straight to the pending buffer, the rest is kept in
    /// the overflow behind anything already waiting there.
    pub(crate) fn push(&mut self, bytes: &[u8]) {
        let mut input = PartialBuffer::new(bytes);

        if self.overflow.unwritten().is_empty() {
            self.overflow = PartialBuffer::default();
            fill(&mut self.pending, &mut input, self.capacity);
        }

        if !input.unwritten().is_empty() {
            let consumed = self.overflow.written().len();
            let overflow = self.overflow.get_mut();
            overflow.drain(..consumed);
            overflow.extend_from_slice(input.unwritten());
            self.overflow.reset();
        }
    }

    /// Pull overflow bytes into the free space of the pending buffer, returns how many moved.
    pub(crate) fn refill(&mut self) -> usize {
        if self.overflow.unwritten().is_empty() {
            return 0;
        }

        let moved = fill(&mut self.pending, &mut self.overflow, self.capacity);
        if self.overflow.unwritten().is_empty() {
            self.overflow = PartialBuffer::default();
        }
        moved
    }

    /// Bytes staged for the engine but not consumed by it yet.
    pub(crate) fn pending(&self) -> &[u8] {
        self.pending.unwritten()
    }

    /// Record that the engine consumed `amount` pending bytes.
    pub(crate) fn consume(&mut self, amount: usize) {
        self.pending.advance(amount);
        if self.pending.unwritten().is_empty() {
            self.pending.get_mut().clear();
            self.pending.reset();
        }
    }

    pub(crate) fn has_overflow(&self) -> bool {
        !self.overflow.unwritten().is_empty()
    }

    /// Caller bytes held by this stage which the engine has not consumed.
    pub(crate) fn remaining(&self) -> usize {
        self.pending().len() + self.overflow.unwritten().len()
    }

    pub(crate) fn clear(&mut self) {
        self.pending.get_mut().clear();
        self.pending.reset();
        self.overflow = PartialBuffer::default();
    }
}

/// Compact the consumed prefix out of `pending` and top it up from `source`.
fn fill<B: AsRef<[u8]>>(
    pending: &mut PartialBuffer<Vec<u8>>,
    source: &mut PartialBuffer<B>,
    capacity: usize,
) -> usize {
    let consumed = pending.written().len();
    if consumed > 0 {
        pending.get_mut().drain(..consumed);
        pending.reset();
    }

    let space = capacity.saturating_sub(pending.get_ref().len());
    let len = space.min(source.unwritten().len());
    pending
        .get_mut()
        .extend_from_slice(&source.unwritten()[..len]);
    source.advance(len);
    len
}

/// Output side of a coordinator: engine output waiting to be delivered to the caller.
#[derive(Debug)]
pub(crate) struct ReadyBuffer {
    buffer: Box<[u8]>,
    cursor: usize,
    len: usize,
}

impl ReadyBuffer {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            buffer: vec![0; capacity].into_boxed_slice(),
            cursor: 0,
            len: 0,
        }
    }

    /// Whole buffer, for the engine to write into. Any undelivered bytes are discarded.
    pub(crate) fn space(&mut self) -> &mut [u8] {
        self.clear();
        &mut self.buffer
    }

    /// Record that the engine wrote `len` bytes to the start of [`space`](Self::space).
    pub(crate) fn produced(&mut self, len: usize) {
        self.cursor = 0;
        self.len = len;
    }

    /// Produced bytes not yet delivered.
    pub(crate) fn unread(&self) -> &[u8] {
        &self.buffer[self.cursor..self.len]
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.cursor == self.len
    }

    /// Copy as many undelivered bytes as fit into `dst`.
    pub(crate) fn drain_into(&mut self, dst: &mut [u8]) -> usize {
        let mut output = PartialBuffer::new(dst);
        let mut unread = PartialBuffer::new(self.unread());
        let len = output.copy_unwritten_from(&mut unread);
        self.cursor += len;
        len
    }

    pub(crate) fn clear(&mut self) {
        self.cursor = 0;
        self.len = 0;
    }
}
