//! Versionless model of `TString`, the length-prefixed text record.

use std::any::Any;
use std::fmt;
use std::ops::Deref;

use rootio_buffers::{Chunk, Cursor};
use serde_json::Value;

use crate::form::{string_form, ColumnarForm, Form, FormOptions};
use crate::model::{write_class_tag, Header, ModelBuilder, ModelState};
use crate::{Context, InRecord, Model, ModelError, ModelRegistry, ReadOnlyFile, Result};

pub const CLASSNAME: &str = "TString";

/// A decoded `TString`.
///
/// It is a string (it derefs to `str`, compares and prints as its text) and
/// a [`Model`] that remembers where in which file it was read from.
pub struct TString {
    text: String,
    state: ModelState,
}

impl TString {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_string(self) -> String {
        self.text
    }
}

impl Model for TString {
    fn classname(&self) -> &str {
        CLASSNAME
    }

    fn class_version(&self) -> Option<u16> {
        TStringBuilder::CLASS_VERSION
    }

    fn state(&self) -> &ModelState {
        &self.state
    }

    fn to_json(&self) -> Value {
        Value::String(self.text.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl ColumnarForm for TString {
    /// `TString` is never written with its own header, so `options.header`
    /// and `options.tobject_header` do not change the form.
    fn awkward_form(options: &FormOptions) -> Form {
        string_form(CLASSNAME, false, options.index_format)
    }
}

impl Deref for TString {
    type Target = str;

    fn deref(&self) -> &str {
        &self.text
    }
}

impl AsRef<str> for TString {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for TString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl fmt::Debug for TString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_class_tag(f, self)?;
        write!(f, " {:?} at {:#014x}>", self.text, self as *const Self as usize)
    }
}

impl PartialEq for TString {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
    }
}

impl Eq for TString {}

impl PartialEq<str> for TString {
    fn eq(&self, other: &str) -> bool {
        self.text == other
    }
}

impl PartialEq<&str> for TString {
    fn eq(&self, other: &&str) -> bool {
        self.text == *other
    }
}

impl PartialEq<String> for TString {
    fn eq(&self, other: &String) -> bool {
        &self.text == other
    }
}

/// Phase 1-2 state for [`TString`].
pub struct TStringBuilder {
    state: ModelState,
    data: Option<String>,
}

impl ModelBuilder for TStringBuilder {
    type Output = TString;

    const CLASSNAME: &'static str = CLASSNAME;
    const CLASS_VERSION: Option<u16> = None;

    fn new(state: ModelState) -> Self {
        Self { state, data: None }
    }

    fn state_mut(&mut self) -> &mut ModelState {
        &mut self.state
    }

    fn read_header(
        &mut self,
        _chunk: &Chunk<'_>,
        _cursor: &mut Cursor,
        _context: &Context,
        _file: &ReadOnlyFile,
    ) -> Result<Header> {
        Ok(Header::VERSIONLESS)
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
        self.data = Some(cursor.string(chunk).in_record(CLASSNAME, file)?);
        Ok(())
    }

    fn postprocess(
        self,
        _chunk: &Chunk<'_>,
        _cursor: &mut Cursor,
        _context: &Context,
        _file: &ReadOnlyFile,
    ) -> Result<TString> {
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
        Ok(TString {
            text: self.data.unwrap_or_default(),
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
    registry.register_model::<TStringBuilder>();
}
