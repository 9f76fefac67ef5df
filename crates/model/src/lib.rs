//! Versioned binary record decoding for rootio.
//!
//! Records are decoded in three phases (header, members, postprocess) by a
//! [`ModelBuilder`] per record type. A [`ModelRegistry`] maps classnames to
//! the read functions of those builders, and every decoded value carries
//! its provenance through the [`Model`] trait.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use rootio_buffers::{Chunk, Cursor};
//! use rootio_model::{Context, Model, ModelRegistry, ReadOnlyFile, TString};
//!
//! let registry = Arc::new(ModelRegistry::with_builtin_models());
//! let file = Arc::new(ReadOnlyFile::with_registry("events.root", registry.clone()));
//!
//! let data = [0x05, b'H', b'e', b'l', b'l', b'o'];
//! let chunk = Chunk::new(&data);
//! let mut cursor = Cursor::new(0);
//!
//! let read = registry.resolve("TString").unwrap();
//! let model = read(&chunk, &mut cursor, &Context::new(), &file, None).unwrap();
//!
//! assert_eq!(model.num_bytes(), Some(6));
//! assert_eq!(model.downcast_ref::<TString>().unwrap(), "Hello");
//! ```

mod context;
mod error;
mod file;
pub mod form;
pub mod model;
pub mod models;
mod registry;

pub use context::Context;
pub use error::{InRecord, ModelError, Result};
pub use file::ReadOnlyFile;
pub use form::{ColumnarForm, Form, FormOptions, IndexFormat};
pub use model::{read, Header, Members, Model, ModelBuilder, ModelState, Parent};
pub use models::tobject::TObject;
pub use models::tstring::TString;
pub use registry::{ModelRegistry, ReadFn};
