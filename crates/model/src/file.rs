//! Handle for the file that records are decoded from.

use std::sync::Arc;

use crate::{ModelRegistry, ReadFn, Result};

/// The file a decode belongs to.
///
/// Decoded models keep only a `Weak` reference to it, for diagnostics and
/// for walking back to the registry during nested decodes.
#[derive(Debug)]
pub struct ReadOnlyFile {
    file_path: String,
    registry: Arc<ModelRegistry>,
}

impl ReadOnlyFile {
    /// Creates a handle that resolves classes through the process-wide registry.
    pub fn new(file_path: impl Into<String>) -> Self {
        Self::with_registry(file_path, ModelRegistry::global())
    }

    pub fn with_registry(file_path: impl Into<String>, registry: Arc<ModelRegistry>) -> Self {
        Self {
            file_path: file_path.into(),
            registry,
        }
    }

    pub fn file_path(&self) -> &str {
        &self.file_path
    }

    pub fn registry(&self) -> &Arc<ModelRegistry> {
        &self.registry
    }

    /// Looks up the read function for a class stored in this file.
    pub fn class_named(&self, classname: &str) -> Result<ReadFn> {
        self.registry.resolve(classname)
    }
}
