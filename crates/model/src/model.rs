//! The three-phase record decoding protocol.
//!
//! Every record type is read by a [`ModelBuilder`]:
//!
//! 1. [`read_header`](ModelBuilder::read_header) consumes the optional
//!    byte count and version tag,
//! 2. [`read_members`](ModelBuilder::read_members) consumes the payload,
//! 3. [`postprocess`](ModelBuilder::postprocess) turns the builder into the
//!    immutable public value.
//!
//! [`read`] drives the phases. On failure the cursor is put back where the
//! call found it, for every record type.

use std::any::Any;
use std::fmt;
use std::sync::{Arc, Weak};

use log::trace;
use rootio_buffers::{Chunk, Cursor};
use serde_json::{Map, Value};

use crate::{Context, InRecord, ModelError, ReadOnlyFile, Result};

/// Set on the first 4 bytes of a versioned header when they hold a byte count.
pub const K_BYTE_COUNT_MASK: u32 = 0x4000_0000;

/// Raw members of a record, in stream order.
pub type Members = Map<String, Value>;

/// Non-owning reference to an enclosing record.
pub type Parent = Weak<dyn Model>;

/// Provenance carried by every decoded record.
///
/// `file` and `parent` never keep their targets alive; they exist for
/// lookup and diagnostics only, and may dangle once the target is dropped.
#[derive(Debug, Clone)]
pub struct ModelState {
    /// Cursor position where the record header starts.
    pub cursor: Cursor,
    pub file: Weak<ReadOnlyFile>,
    pub parent: Option<Parent>,
    pub members: Members,
    pub bases: Vec<Arc<dyn Model>>,
    /// Bytes consumed by the record. `None` until the members are read.
    pub num_bytes: Option<usize>,
    /// Version read from the header. `None` for versionless records.
    pub instance_version: Option<u16>,
    pub is_memberwise: bool,
}

impl ModelState {
    pub fn new(cursor: Cursor, file: &Arc<ReadOnlyFile>, parent: Option<Parent>, context: &Context) -> Self {
        Self {
            cursor,
            file: Arc::downgrade(file),
            parent,
            members: Members::new(),
            bases: Vec::new(),
            num_bytes: None,
            instance_version: None,
            is_memberwise: context.memberwise,
        }
    }

    /// Compares every provenance field. References compare by identity.
    pub fn same_provenance(&self, other: &ModelState) -> bool {
        let parents = match (&self.parent, &other.parent) {
            (None, None) => true,
            (Some(a), Some(b)) => Weak::ptr_eq(a, b),
            _ => false,
        };
        self.cursor == other.cursor
            && Weak::ptr_eq(&self.file, &other.file)
            && parents
            && self.members == other.members
            && self.bases.len() == other.bases.len()
            && self.bases.iter().zip(&other.bases).all(|(a, b)| Arc::ptr_eq(a, b))
            && self.num_bytes == other.num_bytes
            && self.instance_version == other.instance_version
            && self.is_memberwise == other.is_memberwise
    }
}

/// A decoded record.
pub trait Model: fmt::Debug + Send + Sync + Any {
    fn classname(&self) -> &str;

    /// Version of the record layout this model reads; `None` if versionless.
    fn class_version(&self) -> Option<u16>;

    fn state(&self) -> &ModelState;

    /// Plain interchange form of the decoded value, without provenance.
    fn to_json(&self) -> Value;

    fn as_any(&self) -> &dyn Any;

    fn instance_version(&self) -> Option<u16> {
        self.state().instance_version
    }

    fn is_memberwise(&self) -> bool {
        self.state().is_memberwise
    }

    fn members(&self) -> &Members {
        &self.state().members
    }

    fn member(&self, name: &str) -> Option<&Value> {
        self.state().members.get(name)
    }

    fn num_bytes(&self) -> Option<usize> {
        self.state().num_bytes
    }

    fn bases(&self) -> &[Arc<dyn Model>] {
        &self.state().bases
    }

    fn cursor(&self) -> &Cursor {
        &self.state().cursor
    }

    /// The owning file, if it is still open.
    fn file(&self) -> Option<Arc<ReadOnlyFile>> {
        self.state().file.upgrade()
    }

    fn parent(&self) -> Option<Arc<dyn Model>> {
        self.state().parent.as_ref().and_then(Weak::upgrade)
    }
}

impl dyn Model {
    pub fn is<T: Model>(&self) -> bool {
        self.as_any().is::<T>()
    }

    pub fn downcast_ref<T: Model>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}

/// Writes the opening of a record's debug form: `<Class` followed by
/// ` (version N)` for versioned record types.
pub(crate) fn write_class_tag(f: &mut fmt::Formatter<'_>, model: &dyn Model) -> fmt::Result {
    write!(f, "<{}", model.classname())?;
    match model.class_version() {
        Some(version) => write!(f, " (version {})", version),
        None => Ok(()),
    }
}

/// What a record header declared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Header {
    /// Total record length including the byte-count field, if present.
    pub num_bytes: Option<usize>,
    pub version: Option<u16>,
}

impl Header {
    pub const VERSIONLESS: Header = Header {
        num_bytes: None,
        version: None,
    };
}

/// Mutable decode state for one record type.
pub trait ModelBuilder: Sized {
    type Output: Model;

    const CLASSNAME: &'static str;

    /// `None` exactly for versionless record types.
    const CLASS_VERSION: Option<u16>;

    fn new(state: ModelState) -> Self;

    fn state_mut(&mut self) -> &mut ModelState;

    /// Phase 1. The default reads a versioned header.
    fn read_header(
        &mut self,
        chunk: &Chunk<'_>,
        cursor: &mut Cursor,
        _context: &Context,
        file: &ReadOnlyFile,
    ) -> Result<Header> {
        read_numbytes_version(chunk, cursor, Self::CLASSNAME, file)
    }

    /// Phase 2.
    fn read_members(
        &mut self,
        chunk: &Chunk<'_>,
        cursor: &mut Cursor,
        context: &Context,
        file: &ReadOnlyFile,
    ) -> Result<()>;

    /// Phase 3. Consumes the builder; every provenance field must be moved
    /// into the output.
    fn postprocess(
        self,
        chunk: &Chunk<'_>,
        cursor: &mut Cursor,
        context: &Context,
        file: &ReadOnlyFile,
    ) -> Result<Self::Output>;
}

/// Reads a versioned header: an optional 4-byte byte count flagged with
/// [`K_BYTE_COUNT_MASK`], then a 2-byte version.
///
/// When the flag is absent the four bytes are not a byte count and only the
/// version is consumed.
pub fn read_numbytes_version(
    chunk: &Chunk<'_>,
    cursor: &mut Cursor,
    classname: &str,
    file: &ReadOnlyFile,
) -> Result<Header> {
    match cursor.peek_u32(chunk) {
        Ok(count) if count & K_BYTE_COUNT_MASK != 0 => {
            let mut ahead = cursor.copy();
            ahead.skip(chunk, 4).in_record(classname, file)?;
            let version = ahead.u16(chunk).in_record(classname, file)?;
            *cursor = ahead;
            Ok(Header {
                num_bytes: Some((count & !K_BYTE_COUNT_MASK) as usize + 4),
                version: Some(version),
            })
        }
        _ => {
            let version = cursor.u16(chunk).in_record(classname, file)?;
            Ok(Header {
                num_bytes: None,
                version: Some(version),
            })
        }
    }
}

/// Decodes one record of type `B` starting at `cursor`.
///
/// On success the cursor sits just past the record. On failure it is left
/// at its entry position and nothing is returned.
pub fn read<B: ModelBuilder>(
    chunk: &Chunk<'_>,
    cursor: &mut Cursor,
    context: &Context,
    file: &Arc<ReadOnlyFile>,
    parent: Option<Parent>,
) -> Result<B::Output> {
    let entry = cursor.copy();
    let out = read_phases::<B>(chunk, cursor, context, file, parent);
    if out.is_err() {
        *cursor = entry;
    }
    out
}

fn read_phases<B: ModelBuilder>(
    chunk: &Chunk<'_>,
    cursor: &mut Cursor,
    context: &Context,
    file: &Arc<ReadOnlyFile>,
    parent: Option<Parent>,
) -> Result<B::Output> {
    let start = cursor.copy();
    let mut builder = B::new(ModelState::new(start.copy(), file, parent, context));

    trace!("{} header at {}", B::CLASSNAME, start.index());
    let header = builder.read_header(chunk, cursor, context, file)?;
    builder.state_mut().instance_version = header.version;

    trace!("{} members at {}", B::CLASSNAME, cursor.index());
    builder.read_members(chunk, cursor, context, file)?;

    let actual = cursor.displacement(&start);
    if let Some(expected) = header.num_bytes {
        if expected != actual {
            return Err(ModelError::WrongNumBytes {
                classname: B::CLASSNAME.to_owned(),
                file_path: file.file_path().to_owned(),
                expected,
                actual,
            });
        }
    }
    builder.state_mut().num_bytes = Some(actual);

    trace!("{} postprocess, {} bytes", B::CLASSNAME, actual);
    builder.postprocess(chunk, cursor, context, file)
}

/// [`read`], boxed behind the object-safe [`Model`] trait.
pub fn read_shared<B>(
    chunk: &Chunk<'_>,
    cursor: &mut Cursor,
    context: &Context,
    file: &Arc<ReadOnlyFile>,
    parent: Option<Parent>,
) -> Result<Arc<dyn Model>>
where
    B: ModelBuilder,
{
    let model = read::<B>(chunk, cursor, context, file, parent)?;
    Ok(Arc::new(model))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ModelRegistry;

    fn file() -> Arc<ReadOnlyFile> {
        Arc::new(ReadOnlyFile::with_registry(
            "header.root",
            Arc::new(ModelRegistry::new()),
        ))
    }

    #[test]
    fn test_header_with_byte_count() {
        let data = [0x40, 0x00, 0x00, 0x0a, 0x00, 0x03];
        let chunk = Chunk::new(&data);
        let mut cursor = Cursor::new(0);
        let header = read_numbytes_version(&chunk, &mut cursor, "TList", &file()).unwrap();
        assert_eq!(header.num_bytes, Some(14));
        assert_eq!(header.version, Some(3));
        assert_eq!(cursor.index(), 6);
    }

    #[test]
    fn test_header_without_byte_count() {
        let data = [0x00, 0x01, 0x00, 0x00, 0x00, 0x00];
        let chunk = Chunk::new(&data);
        let mut cursor = Cursor::new(0);
        let header = read_numbytes_version(&chunk, &mut cursor, "TObject", &file()).unwrap();
        assert_eq!(header.num_bytes, None);
        assert_eq!(header.version, Some(1));
        assert_eq!(cursor.index(), 2);
    }

    #[test]
    fn test_header_version_only_near_chunk_end() {
        let data = [0x00, 0x02];
        let chunk = Chunk::new(&data);
        let mut cursor = Cursor::new(0);
        let header = read_numbytes_version(&chunk, &mut cursor, "TObject", &file()).unwrap();
        assert_eq!(header.version, Some(2));
        assert_eq!(cursor.index(), 2);
    }

    #[test]
    fn test_truncated_header_names_class_and_file() {
        let data = [0x40, 0x00, 0x00, 0x0a, 0x00];
        let chunk = Chunk::new(&data);
        let mut cursor = Cursor::new(0);
        let err = read_numbytes_version(&chunk, &mut cursor, "TList", &file()).unwrap_err();
        assert_eq!(err.classname(), Some("TList"));
        assert_eq!(err.file_path(), Some("header.root"));
        assert_eq!(cursor.index(), 0);
    }
}
