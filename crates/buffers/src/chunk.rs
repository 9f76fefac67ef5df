//! Bounded view of a contiguous byte range of a file.

use crate::BufferError;

/// An immutable, already-resident range of bytes from a file.
///
/// A chunk knows the absolute offset of its first byte, so cursors can
/// address it with file positions. The bytes are borrowed from whoever
/// fetched them; a chunk never copies.
///
/// # Example
///
/// ```
/// use rootio_buffers::Chunk;
///
/// let data = [10, 11, 12, 13];
/// let chunk = Chunk::at(100, &data);
///
/// assert_eq!(chunk.stop(), 104);
/// assert_eq!(chunk.get(101, 103).unwrap(), &[11, 12]);
/// assert!(chunk.get(99, 101).is_err());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Chunk<'a> {
    data: &'a [u8],
    start: usize,
}

impl<'a> Chunk<'a> {
    /// Creates a chunk whose first byte sits at file offset zero.
    pub fn new(data: &'a [u8]) -> Self {
        Self::at(0, data)
    }

    /// Creates a chunk whose first byte sits at file offset `start`.
    ///
    /// # Panics
    ///
    /// Panics if `start + data.len()` overflows `usize`. Use [`Chunk::try_at`]
    /// when the offset comes from untrusted input.
    pub fn at(start: usize, data: &'a [u8]) -> Self {
        match Self::try_at(start, data) {
            Ok(chunk) => chunk,
            Err(_) => panic!("chunk at {} with {} bytes ends past usize::MAX", start, data.len()),
        }
    }

    /// Creates a chunk at file offset `start`, failing if its end offset
    /// cannot be represented.
    pub fn try_at(start: usize, data: &'a [u8]) -> Result<Self, BufferError> {
        match start.checked_add(data.len()) {
            Some(_) => Ok(Self { data, start }),
            None => Err(BufferError::OutOfBounds {
                start,
                stop: usize::MAX,
                chunk_start: start,
                chunk_stop: usize::MAX,
            }),
        }
    }

    /// Absolute offset of the first byte.
    pub fn start(&self) -> usize {
        self.start
    }

    /// Absolute offset one past the last byte. Never overflows: construction
    /// rejects chunks whose end is not representable.
    pub fn stop(&self) -> usize {
        self.start + self.data.len()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn raw_data(&self) -> &'a [u8] {
        self.data
    }

    /// Returns the bytes in the absolute range `start..stop`.
    pub fn get(&self, start: usize, stop: usize) -> Result<&'a [u8], BufferError> {
        if start < self.start || stop < start || stop > self.stop() {
            return Err(self.out_of_bounds(start, stop));
        }
        Ok(&self.data[start - self.start..stop - self.start])
    }

    /// Returns every byte from absolute offset `start` to the end of the chunk.
    pub fn remainder(&self, start: usize) -> Result<&'a [u8], BufferError> {
        self.get(start, self.stop().max(start))
    }

    pub(crate) fn out_of_bounds(&self, start: usize, stop: usize) -> BufferError {
        BufferError::OutOfBounds {
            start,
            stop,
            chunk_start: self.start,
            chunk_stop: self.stop(),
        }
    }
}
