//! Error type for chunk and cursor reads.

use thiserror::Error;

/// Errors raised while reading bytes out of a [`Chunk`](crate::Chunk).
///
/// Every variant is fatal for the record being decoded. Positions are
/// absolute file offsets, not offsets into the chunk.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BufferError {
    #[error("attempting to get bytes {start}:{stop} outside expected range {chunk_start}:{chunk_stop} for this chunk")]
    OutOfBounds {
        start: usize,
        stop: usize,
        chunk_start: usize,
        chunk_stop: usize,
    },
    #[error("length-prefixed string declares {declared} bytes but only {available} remain")]
    Truncated { declared: usize, available: usize },
    #[error("C-style string starting at {start} has no terminator (null byte) before {chunk_stop}")]
    MissingTerminator { start: usize, chunk_stop: usize },
}
