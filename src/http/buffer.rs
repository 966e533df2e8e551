//! Growable read buffer
//!
//! Bytes live in a single allocation tracked by two cursors: everything
//! before `consumed` has been accepted by the parser, everything between
//! `consumed` and `filled` is waiting to be parsed. Consuming only moves the
//! read cursor; bytes are moved when the write cursor hits the end.

use super::{Error, Result, DEFAULT_BUFFER_SIZE, MAX_BUFFER_SIZE};
use bytes::BytesMut;

/// Read buffer with separate read and write cursors
pub struct ReadBuffer {
    buf: BytesMut,
    consumed: usize,
    filled: usize,
    max_size: usize,
}

impl ReadBuffer {
    /// Create a buffer with the default capacity and growth limit
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_BUFFER_SIZE, MAX_BUFFER_SIZE)
    }

    /// Create a buffer starting at `capacity` bytes that never grows past
    /// `max_size`
    pub fn with_capacity(capacity: usize, max_size: usize) -> Self {
        let capacity = capacity.max(1);
        ReadBuffer {
            buf: BytesMut::zeroed(capacity),
            consumed: 0,
            filled: 0,
            max_size: max_size.max(capacity),
        }
    }

    /// Current allocation size
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Number of buffered bytes not yet consumed
    pub fn len(&self) -> usize {
        self.filled - self.consumed
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bytes waiting to be parsed
    pub fn data(&self) -> &[u8] {
        &self.buf[self.consumed..self.filled]
    }

    /// Make sure there is room to read into
    ///
    /// A consumed prefix is reclaimed first. If the buffer is full of
    /// unconsumed bytes its capacity doubles, up to the growth limit.
    pub fn reserve(&mut self) -> Result<()> {
        if self.filled < self.buf.len() {
            return Ok(());
        }

        if self.consumed > 0 {
            self.buf.copy_within(self.consumed..self.filled, 0);
            self.filled -= self.consumed;
            self.consumed = 0;
            return Ok(());
        }

        let capacity = self.buf.len();
        if capacity >= self.max_size {
            return Err(Error::LineTooLong {
                limit: self.max_size,
            });
        }

        let new_capacity = (capacity * 2).min(self.max_size);
        log::debug!("growing read buffer from {} to {} bytes", capacity, new_capacity);
        self.buf.resize(new_capacity, 0);

        Ok(())
    }

    /// Writable region after the write cursor
    pub fn spare_mut(&mut self) -> &mut [u8] {
        &mut self.buf[self.filled..]
    }

    /// Mark `n` bytes of the spare region as filled
    pub fn advance_filled(&mut self, n: usize) {
        debug_assert!(self.filled + n <= self.buf.len());
        self.filled += n;
    }

    /// Discard `n` bytes from the front of the unparsed data
    pub fn consume(&mut self, n: usize) {
        debug_assert!(n <= self.len());
        self.consumed += n;

        if self.consumed == self.filled {
            self.consumed = 0;
            self.filled = 0;
        }
    }
}

impl Default for ReadBuffer {
    fn default() -> Self {
        Self::new()
    }
}
