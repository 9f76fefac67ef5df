//! Classname to read-function registry.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use log::{debug, warn};
use rootio_buffers::{Chunk, Cursor};

use crate::model::{read_shared, ModelBuilder, Parent};
use crate::{models, Context, Model, ModelError, ReadOnlyFile, Result};

/// Decodes one record and returns it behind the [`Model`] trait.
pub type ReadFn = fn(
    &Chunk<'_>,
    &mut Cursor,
    &Context,
    &Arc<ReadOnlyFile>,
    Option<Parent>,
) -> Result<Arc<dyn Model>>;

/// Maps classnames to the functions that decode them.
///
/// Built once before decoding starts and only read afterwards, so lookups
/// from several threads need no locking. There is no removal.
///
/// # Example
///
/// ```
/// use rootio_model::{ModelError, ModelRegistry};
///
/// let registry = ModelRegistry::with_builtin_models();
/// assert!(registry.resolve("TString").is_ok());
/// assert!(matches!(
///     registry.resolve("Bogus"),
///     Err(ModelError::NotFound { classname }) if classname == "Bogus"
/// ));
/// ```
#[derive(Clone, Default)]
pub struct ModelRegistry {
    classes: HashMap<String, ReadFn>,
}

impl fmt::Debug for ModelRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelRegistry")
            .field("classes", &self.classnames())
            .finish()
    }
}

impl ModelRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding every model this crate ships.
    pub fn with_builtin_models() -> Self {
        let mut registry = Self::new();
        models::register_builtin_models(&mut registry);
        registry
    }

    /// Process-wide registry of the built-in models, built on first use.
    pub fn global() -> Arc<ModelRegistry> {
        static GLOBAL: OnceLock<Arc<ModelRegistry>> = OnceLock::new();
        GLOBAL
            .get_or_init(|| Arc::new(Self::with_builtin_models()))
            .clone()
    }

    /// Installs `read` for `classname`. A second registration under the same
    /// name replaces the first.
    pub fn register(&mut self, classname: impl Into<String>, read: ReadFn) {
        let classname = classname.into();
        debug!("Registering model {}", classname);
        if self.classes.insert(classname.clone(), read).is_some() {
            warn!("Model {} registered twice, keeping the last one", classname);
        }
    }

    /// Registers a builder under its own classname.
    pub fn register_model<B: ModelBuilder>(&mut self) {
        self.register(B::CLASSNAME, read_shared::<B>);
    }

    pub fn resolve(&self, classname: &str) -> Result<ReadFn> {
        match self.classes.get(classname) {
            Some(read) => {
                debug!("Resolved model {}", classname);
                Ok(*read)
            }
            None => Err(ModelError::NotFound {
                classname: classname.to_owned(),
            }),
        }
    }

    pub fn contains(&self, classname: &str) -> bool {
        self.classes.contains_key(classname)
    }

    /// Registered classnames, sorted.
    pub fn classnames(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.classes.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Resolves `classname` and decodes one record with it.
    pub fn read(
        &self,
        classname: &str,
        chunk: &Chunk<'_>,
        cursor: &mut Cursor,
        context: &Context,
        file: &Arc<ReadOnlyFile>,
        parent: Option<Parent>,
    ) -> Result<Arc<dyn Model>> {
        let read = self.resolve(classname)?;
        read(chunk, cursor, context, file, parent)
    }
}
