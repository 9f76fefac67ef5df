//! Position-tracked reader over a [`Chunk`].

use crate::{print_octets::print_octet_table, BufferError, Chunk};

/// Length byte that announces a 4-byte extended length.
pub const EXTENDED_LENGTH_MARKER: u8 = 255;

/// A read position into a file, advanced while decoding one record.
///
/// The cursor does not own any bytes: every read takes the [`Chunk`] that
/// holds the addressed range. Positions are absolute file offsets.
///
/// A failed read leaves the cursor where it was.
///
/// # Example
///
/// ```
/// use rootio_buffers::{Chunk, Cursor};
///
/// let data = [0x05, b'H', b'e', b'l', b'l', b'o', 0x01, 0x02];
/// let chunk = Chunk::new(&data);
/// let mut cursor = Cursor::new(0);
///
/// assert_eq!(cursor.string(&chunk).unwrap(), "Hello");
/// assert_eq!(cursor.index(), 6);
/// assert_eq!(cursor.u16(&chunk).unwrap(), 0x0102);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor {
    index: usize,
}

impl Cursor {
    pub fn new(index: usize) -> Self {
        Self { index }
    }

    /// Current absolute position.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns an independent cursor at the same position.
    pub fn copy(&self) -> Cursor {
        self.clone()
    }

    /// Advances the cursor by the given number of bytes without reading them.
    ///
    /// The cursor may land exactly at the end of the chunk, not past it.
    pub fn skip(&mut self, chunk: &Chunk<'_>, num_bytes: usize) -> Result<(), BufferError> {
        let stop = self
            .index
            .checked_add(num_bytes)
            .filter(|&stop| stop <= chunk.stop())
            .ok_or_else(|| chunk.out_of_bounds(self.index, self.index.saturating_add(num_bytes)))?;
        self.index = stop;
        Ok(())
    }

    /// Moves the cursor to an absolute position.
    pub fn skip_to(&mut self, index: usize) {
        self.index = index;
    }

    /// Number of bytes between `since` and this cursor.
    pub fn displacement(&self, since: &Cursor) -> usize {
        self.index.saturating_sub(since.index)
    }

    /// Returns exactly `length` bytes and advances past them.
    pub fn bytes<'a>(&mut self, chunk: &Chunk<'a>, length: usize) -> Result<&'a [u8], BufferError> {
        let out = self.peek_bytes(chunk, length)?;
        self.index += length;
        Ok(out)
    }

    /// Returns exactly `length` bytes without advancing.
    pub fn peek_bytes<'a>(&self, chunk: &Chunk<'a>, length: usize) -> Result<&'a [u8], BufferError> {
        let stop = self
            .index
            .checked_add(length)
            .ok_or_else(|| chunk.out_of_bounds(self.index, usize::MAX))?;
        chunk.get(self.index, stop)
    }

    fn array<const N: usize>(&mut self, chunk: &Chunk<'_>) -> Result<[u8; N], BufferError> {
        let out = self.peek_array::<N>(chunk)?;
        self.index += N;
        Ok(out)
    }

    fn peek_array<const N: usize>(&self, chunk: &Chunk<'_>) -> Result<[u8; N], BufferError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.peek_bytes(chunk, N)?);
        Ok(out)
    }

    #[inline]
    pub fn u8(&mut self, chunk: &Chunk<'_>) -> Result<u8, BufferError> {
        Ok(self.array::<1>(chunk)?[0])
    }

    #[inline]
    pub fn i8(&mut self, chunk: &Chunk<'_>) -> Result<i8, BufferError> {
        Ok(self.array::<1>(chunk)?[0] as i8)
    }

    /// Reads an unsigned 16-bit integer (big-endian).
    #[inline]
    pub fn u16(&mut self, chunk: &Chunk<'_>) -> Result<u16, BufferError> {
        Ok(u16::from_be_bytes(self.array(chunk)?))
    }

    /// Reads a signed 16-bit integer (big-endian).
    #[inline]
    pub fn i16(&mut self, chunk: &Chunk<'_>) -> Result<i16, BufferError> {
        Ok(i16::from_be_bytes(self.array(chunk)?))
    }

    /// Reads an unsigned 32-bit integer (big-endian).
    #[inline]
    pub fn u32(&mut self, chunk: &Chunk<'_>) -> Result<u32, BufferError> {
        Ok(u32::from_be_bytes(self.array(chunk)?))
    }

    /// Reads a signed 32-bit integer (big-endian).
    #[inline]
    pub fn i32(&mut self, chunk: &Chunk<'_>) -> Result<i32, BufferError> {
        Ok(i32::from_be_bytes(self.array(chunk)?))
    }

    /// Reads an unsigned 64-bit integer (big-endian).
    #[inline]
    pub fn u64(&mut self, chunk: &Chunk<'_>) -> Result<u64, BufferError> {
        Ok(u64::from_be_bytes(self.array(chunk)?))
    }

    /// Reads a signed 64-bit integer (big-endian).
    #[inline]
    pub fn i64(&mut self, chunk: &Chunk<'_>) -> Result<i64, BufferError> {
        Ok(i64::from_be_bytes(self.array(chunk)?))
    }

    /// Reads a 32-bit floating point number (big-endian).
    #[inline]
    pub fn f32(&mut self, chunk: &Chunk<'_>) -> Result<f32, BufferError> {
        Ok(f32::from_be_bytes(self.array(chunk)?))
    }

    /// Reads a 64-bit floating point number (big-endian).
    #[inline]
    pub fn f64(&mut self, chunk: &Chunk<'_>) -> Result<f64, BufferError> {
        Ok(f64::from_be_bytes(self.array(chunk)?))
    }

    pub fn peek_u8(&self, chunk: &Chunk<'_>) -> Result<u8, BufferError> {
        Ok(self.peek_array::<1>(chunk)?[0])
    }

    pub fn peek_u16(&self, chunk: &Chunk<'_>) -> Result<u16, BufferError> {
        Ok(u16::from_be_bytes(self.peek_array(chunk)?))
    }

    pub fn peek_u32(&self, chunk: &Chunk<'_>) -> Result<u32, BufferError> {
        Ok(u32::from_be_bytes(self.peek_array(chunk)?))
    }

    /// Reads a length-prefixed byte string.
    ///
    /// One length byte `L`; if `L < 255` the payload is the next `L` bytes,
    /// otherwise the next 4 bytes hold the big-endian length. There is no
    /// terminator.
    pub fn bytestring<'a>(&mut self, chunk: &Chunk<'a>) -> Result<&'a [u8], BufferError> {
        let mut ahead = self.clone();
        let length = match ahead.u8(chunk)? {
            EXTENDED_LENGTH_MARKER => ahead.u32(chunk)? as usize,
            short => short as usize,
        };
        let available = chunk.stop().saturating_sub(ahead.index);
        if length > available {
            return Err(BufferError::Truncated {
                declared: length,
                available,
            });
        }
        let out = ahead.bytes(chunk, length)?;
        *self = ahead;
        Ok(out)
    }

    /// Reads a length-prefixed string as text.
    ///
    /// Invalid UTF-8 sequences are replaced with U+FFFD.
    pub fn string(&mut self, chunk: &Chunk<'_>) -> Result<String, BufferError> {
        let raw = self.bytestring(chunk)?;
        Ok(String::from_utf8_lossy(raw).into_owned())
    }

    /// Reads a null-terminated string and advances past the terminator.
    pub fn class_string(&mut self, chunk: &Chunk<'_>) -> Result<String, BufferError> {
        let remainder = chunk.remainder(self.index)?;
        let Some(end) = remainder.iter().position(|&byte| byte == 0) else {
            return Err(BufferError::MissingTerminator {
                start: self.index,
                chunk_stop: chunk.stop(),
            });
        };
        let out = String::from_utf8_lossy(&remainder[..end]).into_owned();
        self.index += end + 1;
        Ok(out)
    }

    /// Renders the bytes from the cursor onward as a table of decimal values
    /// and printable characters, 20 bytes per row.
    pub fn debug(&self, chunk: &Chunk<'_>, limit_bytes: Option<usize>) -> Result<String, BufferError> {
        let mut data = chunk.remainder(self.index)?;
        if let Some(limit) = limit_bytes {
            data = &data[..data.len().min(limit)];
        }
        Ok(print_octet_table(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_width_reads() {
        let data = [0x01, 0x02, 0x03, 0x04, 0xff, 0xfe];
        let chunk = Chunk::new(&data);
        let mut cursor = Cursor::new(0);
        assert_eq!(cursor.u16(&chunk).unwrap(), 0x0102);
        assert_eq!(cursor.u8(&chunk).unwrap(), 0x03);
        assert_eq!(cursor.u8(&chunk).unwrap(), 0x04);
        assert_eq!(cursor.i16(&chunk).unwrap(), -2);
        assert_eq!(cursor.index(), 6);
    }

    #[test]
    fn test_failed_read_does_not_move() {
        let data = [0x01, 0x02, 0x03];
        let chunk = Chunk::new(&data);
        let mut cursor = Cursor::new(1);
        assert!(cursor.u32(&chunk).is_err());
        assert_eq!(cursor.index(), 1);
    }

    #[test]
    fn test_peek() {
        let data = [0x00, 0x00, 0x00, 0x2a];
        let chunk = Chunk::new(&data);
        let cursor = Cursor::new(0);
        assert_eq!(cursor.peek_u32(&chunk).unwrap(), 42);
        assert_eq!(cursor.peek_bytes(&chunk, 2).unwrap(), &[0, 0]);
        assert_eq!(cursor.index(), 0);
    }

    #[test]
    fn test_short_string() {
        let data = b"\x03abc";
        let chunk = Chunk::new(data);
        let mut cursor = Cursor::new(0);
        assert_eq!(cursor.string(&chunk).unwrap(), "abc");
        assert_eq!(cursor.index(), 4);
    }

    #[test]
    fn test_empty_string() {
        let data = [0x00];
        let chunk = Chunk::new(&data);
        let mut cursor = Cursor::new(0);
        assert_eq!(cursor.string(&chunk).unwrap(), "");
        assert_eq!(cursor.index(), 1);
    }

    #[test]
    fn test_truncated_string() {
        let data = b"\x05abc";
        let chunk = Chunk::new(data);
        let mut cursor = Cursor::new(0);
        assert_eq!(
            cursor.string(&chunk),
            Err(BufferError::Truncated {
                declared: 5,
                available: 3
            })
        );
        assert_eq!(cursor.index(), 0);
    }

    #[test]
    fn test_truncated_extended_length() {
        let data = [0xff, 0x00, 0x00];
        let chunk = Chunk::new(&data);
        let mut cursor = Cursor::new(0);
        assert!(matches!(
            cursor.string(&chunk),
            Err(BufferError::OutOfBounds { .. })
        ));
        assert_eq!(cursor.index(), 0);
    }

    #[test]
    fn test_class_string() {
        let data = b"TNamed\0rest";
        let chunk = Chunk::new(data);
        let mut cursor = Cursor::new(0);
        assert_eq!(cursor.class_string(&chunk).unwrap(), "TNamed");
        assert_eq!(cursor.index(), 7);
        assert_eq!(
            cursor.class_string(&chunk),
            Err(BufferError::MissingTerminator {
                start: 7,
                chunk_stop: 11
            })
        );
        assert_eq!(cursor.index(), 7);
    }

    #[test]
    fn test_debug_dumps_from_cursor() {
        let data = b"\x02hiXYZ";
        let chunk = Chunk::new(data);
        let mut cursor = Cursor::new(0);
        cursor.u8(&chunk).unwrap();
        let dump = cursor.debug(&chunk, Some(2)).unwrap();
        let lines: Vec<&str> = dump.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "104 105");
        assert_eq!(lines[2], "  h   i");
        assert_eq!(cursor.index(), 1);
    }

    #[test]
    fn test_displacement() {
        let data = [0u8; 20];
        let chunk = Chunk::new(&data);
        let start = Cursor::new(10);
        let mut cursor = start.copy();
        cursor.skip(&chunk, 7).unwrap();
        assert_eq!(cursor.displacement(&start), 7);
        assert_eq!(start.displacement(&cursor), 0);
    }

    #[test]
    fn test_skip_to_chunk_end() {
        let data = [0u8; 4];
        let chunk = Chunk::at(100, &data);
        let mut cursor = Cursor::new(100);
        cursor.skip(&chunk, 4).unwrap();
        assert_eq!(cursor.index(), 104);
        assert_eq!(cursor.peek_bytes(&chunk, 0).unwrap(), b"");
    }

    #[test]
    fn test_skip_past_chunk_fails_without_moving() {
        let data = [0u8; 4];
        let chunk = Chunk::new(&data);
        let mut cursor = Cursor::new(1);
        assert_eq!(
            cursor.skip(&chunk, 4),
            Err(BufferError::OutOfBounds {
                start: 1,
                stop: 5,
                chunk_start: 0,
                chunk_stop: 4,
            })
        );
        assert_eq!(cursor.index(), 1);
    }

    #[test]
    fn test_skip_with_corrupt_count_does_not_overflow() {
        let data = [0u8; 4];
        let chunk = Chunk::new(&data);
        let mut cursor = Cursor::new(1);
        assert_eq!(
            cursor.skip(&chunk, usize::MAX),
            Err(BufferError::OutOfBounds {
                start: 1,
                stop: usize::MAX,
                chunk_start: 0,
                chunk_stop: 4,
            })
        );
        assert_eq!(cursor.index(), 1);
    }
}
