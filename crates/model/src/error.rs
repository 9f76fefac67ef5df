//! Error type for record decoding.

use std::result;

use rootio_buffers::BufferError;
use thiserror::Error;

use crate::ReadOnlyFile;

pub type Result<T, E = ModelError> = result::Result<T, E>;

/// Errors surfaced by the decode entry points.
///
/// None of these are retried or swallowed inside the decoder; whether a
/// failure aborts a whole file or skips one record is the caller's call.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("{source}\nwhile reading {classname} in file {file_path}")]
    Buffer {
        classname: String,
        file_path: String,
        source: BufferError,
    },

    #[error("memberwise serialization of {classname}\nin file {file_path}")]
    NotSupported { classname: String, file_path: String },

    #[error("unknown class {classname:?}")]
    NotFound { classname: String },

    #[error("{classname} in file {file_path} declared {expected} bytes but {actual} were read")]
    WrongNumBytes {
        classname: String,
        file_path: String,
        expected: usize,
        actual: usize,
    },

    #[error("invalid decode context: {0}")]
    InvalidContext(#[from] serde_json::Error),
}

impl ModelError {
    pub fn not_supported(classname: &str, file: &ReadOnlyFile) -> Self {
        Self::NotSupported {
            classname: classname.to_owned(),
            file_path: file.file_path().to_owned(),
        }
    }

    /// The classname the error was raised for, if any.
    pub fn classname(&self) -> Option<&str> {
        match self {
            Self::Buffer { classname, .. }
            | Self::NotSupported { classname, .. }
            | Self::NotFound { classname }
            | Self::WrongNumBytes { classname, .. } => Some(classname),
            Self::InvalidContext(_) => None,
        }
    }

    pub fn file_path(&self) -> Option<&str> {
        match self {
            Self::Buffer { file_path, .. }
            | Self::NotSupported { file_path, .. }
            | Self::WrongNumBytes { file_path, .. } => Some(file_path),
            Self::NotFound { .. } | Self::InvalidContext(_) => None,
        }
    }
}

/// Attaches the record classname and file path to cursor failures.
pub trait InRecord<T> {
    fn in_record(self, classname: &str, file: &ReadOnlyFile) -> Result<T>;
}

impl<T> InRecord<T> for result::Result<T, BufferError> {
    fn in_record(self, classname: &str, file: &ReadOnlyFile) -> Result<T> {
        self.map_err(|source| ModelError::Buffer {
            classname: classname.to_owned(),
            file_path: file.file_path().to_owned(),
            source,
        })
    }
}
