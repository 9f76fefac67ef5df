//! Model of `TObject`, the versioned base of most stored classes.

use std::any::Any;
use std::fmt;

use rootio_buffers::{Chunk, Cursor};
use serde_json::{json, Map, Value};

use crate::form::{ColumnarForm, Form, FormOptions, Primitive};
use crate::model::{write_class_tag, ModelBuilder, ModelState};
use crate::{Context, InRecord, Model, ModelError, ModelRegistry, ReadOnlyFile, Result};

pub const CLASSNAME: &str = "TObject";

pub const K_IS_ON_HEAP: u32 = 0x0100_0000;
pub const K_IS_REFERENCED: u32 = 1 << 4;

pub const UNIQUE_ID: &str = "@fUniqueID";
pub const BITS: &str = "@fBits";
pub const PIDF: &str = "@pidf";

/// A decoded `TObject` header record.
pub struct TObject {
    state: ModelState,
}

impl fmt::Debug for TObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_class_tag(f, self)?;
        write!(f, " {} at {:#014x}>", self.to_json(), self as *const Self as usize)
    }
}

impl TObject {
    pub fn unique_id(&self) -> u32 {
        self.member_u32(UNIQUE_ID).unwrap_or(0)
    }

    pub fn bits(&self) -> u32 {
        self.member_u32(BITS).unwrap_or(0)
    }

    /// Process-ID slot, present only for referenced objects.
    pub fn pidf(&self) -> Option<u16> {
        self.member_u32(PIDF).map(|pidf| pidf as u16)
    }

    fn member_u32(&self, name: &str) -> Option<u32> {
        self.member(name).and_then(Value::as_u64).map(|v| v as u32)
    }
}

impl Model for TObject {
    fn classname(&self) -> &str {
        CLASSNAME
    }

    fn class_version(&self) -> Option<u16> {
        TObjectBuilder::CLASS_VERSION
    }

    fn state(&self) -> &ModelState {
        &self.state
    }

    fn to_json(&self) -> Value {
        Value::Object(self.state.members.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl ColumnarForm for TObject {
    fn awkward_form(options: &FormOptions) -> Form {
        let mut contents = Vec::new();
        if options.tobject_header {
            let field = |primitive| Form::Numpy {
                primitive,
                parameters: Map::new(),
            };
            contents.push((UNIQUE_ID.to_owned(), field(Primitive::UInt32)));
            contents.push((BITS.to_owned(), field(Primitive::UInt32)));
        }
        let mut parameters = Map::new();
        parameters.insert("__record__".to_owned(), json!(CLASSNAME));
        Form::Record {
            contents,
            parameters,
        }
    }
}

/// Phase 1-2 state for [`TObject`].
pub struct TObjectBuilder {
    state: ModelState,
}

impl ModelBuilder for TObjectBuilder {
    type Output = TObject;

    const CLASSNAME: &'static str = CLASSNAME;
    const CLASS_VERSION: Option<u16> = Some(1);

    fn new(state: ModelState) -> Self {
        Self { state }
    }

    fn state_mut(&mut self) -> &mut ModelState {
        &mut self.state
    }

    fn read_members(
        &mut self,
        chunk: &Chunk<'_>,
        cursor: &mut Cursor,
        _context: &Context,
        file: &ReadOnlyFile,
    ) -> Result<()> {
        if self.state.is_memberwise {
            return Err(ModelError::not_supported(CLASSNAME, file));
        }
        let unique_id = cursor.u32(chunk).in_record(CLASSNAME, file)?;
        let bits = cursor.u32(chunk).in_record(CLASSNAME, file)? | K_IS_ON_HEAP;
        let members = &mut self.state.members;
        members.insert(UNIQUE_ID.to_owned(), json!(unique_id));
        members.insert(BITS.to_owned(), json!(bits));
        if bits & K_IS_REFERENCED != 0 {
            let pidf = cursor.u16(chunk).in_record(CLASSNAME, file)?;
            members.insert(PIDF.to_owned(), json!(pidf));
        }
        Ok(())
    }

    fn postprocess(
        self,
        _chunk: &Chunk<'_>,
        _cursor: &mut Cursor,
        _context: &Context,
        _file: &ReadOnlyFile,
    ) -> Result<TObject> {
        let ModelState {
            cursor,
            file,
            parent,
            members,
            bases,
            num_bytes,
            instance_version,
            is_memberwise,
        } = self.state;
        Ok(TObject {
            state: ModelState {
                cursor,
                file,
                parent,
                members,
                bases,
                num_bytes,
                instance_version,
                is_memberwise,
            },
        })
    }
}

pub fn register(registry: &mut ModelRegistry) {
    registry.register_model::<TObjectBuilder>();
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::model::read;

    fn file() -> Arc<ReadOnlyFile> {
        Arc::new(ReadOnlyFile::with_registry(
            "objects.root",
            Arc::new(ModelRegistry::with_builtin_models()),
        ))
    }

    #[test]
    fn test_plain_object() {
        let data = [0x00, 0x01, 0x00, 0x00, 0x00, 0x07, 0x03, 0x00, 0x00, 0x00];
        let chunk = Chunk::new(&data);
        let mut cursor = Cursor::new(0);
        let object = read::<TObjectBuilder>(&chunk, &mut cursor, &Context::new(), &file(), None).unwrap();
        assert_eq!(object.instance_version(), Some(1));
        assert_eq!(object.class_version(), Some(1));
        assert_eq!(object.unique_id(), 7);
        assert_eq!(object.bits(), 0x0300_0000);
        assert_eq!(object.pidf(), None);
        assert_eq!(object.num_bytes(), Some(10));
        assert_eq!(cursor.index(), 10);
    }

    #[test]
    fn test_referenced_object_reads_pidf() {
        let data = [0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x10, 0x00, 0x05];
        let chunk = Chunk::new(&data);
        let mut cursor = Cursor::new(0);
        let object = read::<TObjectBuilder>(&chunk, &mut cursor, &Context::new(), &file(), None).unwrap();
        assert_eq!(object.pidf(), Some(5));
        assert_eq!(object.num_bytes(), Some(12));
        assert_eq!(
            object.to_json(),
            json!({"@fUniqueID": 0, "@fBits": 0x0100_0010, "@pidf": 5})
        );
    }

    #[test]
    fn test_byte_count_mismatch_is_reported() {
        // Byte count says 4 + 12, but the object only spans 4 + 10.
        let data = [
            0x40, 0x00, 0x00, 0x0c, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        ];
        let chunk = Chunk::new(&data);
        let mut cursor = Cursor::new(0);
        let err = read::<TObjectBuilder>(&chunk, &mut cursor, &Context::new(), &file(), None).unwrap_err();
        assert!(matches!(
            err,
            ModelError::WrongNumBytes {
                expected: 16,
                actual: 14,
                ..
            }
        ));
        assert_eq!(cursor.index(), 0);
    }

    #[test]
    fn test_debug_representation_names_version() {
        let data = [0x00, 0x01, 0x00, 0x00, 0x00, 0x07, 0x00, 0x00, 0x00, 0x00];
        let chunk = Chunk::new(&data);
        let mut cursor = Cursor::new(0);
        let object = read::<TObjectBuilder>(&chunk, &mut cursor, &Context::new(), &file(), None).unwrap();
        let repr = format!("{:?}", object);
        assert!(repr.starts_with("<TObject (version 1) {"), "{}", repr);
        assert!(repr.contains("\"@fUniqueID\":7"), "{}", repr);
        assert!(repr.ends_with('>'));
    }

    #[test]
    fn test_form_with_tobject_header_lists_uint32_fields() {
        let form = TObject::awkward_form(&FormOptions::default());
        let json = form.to_json();
        assert_eq!(json["contents"]["@fUniqueID"]["primitive"], json!("uint32"));
        assert_eq!(json["contents"]["@fBits"]["itemsize"], json!(4));
        assert_eq!(json["contents"]["@fBits"]["format"], json!("I"));
    }

    #[test]
    fn test_form_without_tobject_header_is_empty_record() {
        let form = TObject::awkward_form(&FormOptions {
            tobject_header: false,
            ..FormOptions::default()
        });
        assert!(matches!(&form, Form::Record { contents, .. } if contents.is_empty()));
        assert_eq!(form.parameter("__record__"), Some(&json!("TObject")));
    }
}
