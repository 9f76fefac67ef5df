//! Byte-level reading for rootio.
//!
//! Record decoders never touch files directly: an external fetch layer
//! hands them resident byte ranges, and they walk those ranges with a
//! cursor.
//!
//! # Overview
//!
//! - [`Chunk`] - An immutable byte range that knows its absolute file offset
//! - [`Cursor`] - Reads fixed-width integers and length-prefixed strings from a chunk
//! - [`BufferError`] - Bounds and truncation failures
//!
//! # Example
//!
//! ```
//! use rootio_buffers::{Chunk, Cursor};
//!
//! let mut data = vec![0xff, 0x00, 0x00, 0x01, 0x00];
//! data.extend(std::iter::repeat(b'a').take(256));
//!
//! let chunk = Chunk::new(&data);
//! let mut cursor = Cursor::new(0);
//! let text = cursor.string(&chunk).unwrap();
//!
//! assert_eq!(text.len(), 256);
//! assert_eq!(cursor.index(), 261);
//! ```

mod chunk;
mod cursor;
mod error;
mod print_octets;

pub use chunk::Chunk;
pub use cursor::{Cursor, EXTENDED_LENGTH_MARKER};
pub use error::BufferError;
pub use print_octets::print_octet_table;
