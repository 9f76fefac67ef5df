//! Columnar schema descriptors.
//!
//! A [`Form`] describes how values of a record type would be laid out as a
//! column of a columnar array. Building one never touches a chunk or a
//! cursor.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Integer width of the offsets in a list-offset column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexFormat {
    I32,
    U32,
    #[default]
    I64,
}

impl IndexFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::I32 => "i32",
            Self::U32 => "u32",
            Self::I64 => "i64",
        }
    }

    fn list_offset_class(self) -> &'static str {
        match self {
            Self::I32 => "ListOffsetArray32",
            Self::U32 => "ListOffsetArrayU32",
            Self::I64 => "ListOffsetArray64",
        }
    }
}

/// Options for [`ColumnarForm::awkward_form`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormOptions {
    pub index_format: IndexFormat,
    /// Whether each value is preceded by a byte count and version header.
    pub header: bool,
    /// Whether the enclosing object carries its `TObject` header.
    pub tobject_header: bool,
}

impl Default for FormOptions {
    fn default() -> Self {
        Self {
            index_format: IndexFormat::I64,
            header: false,
            tobject_header: true,
        }
    }
}

/// Fixed-width element types of a numpy node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    UInt8,
    UInt32,
}

impl Primitive {
    pub fn name(self) -> &'static str {
        match self {
            Self::UInt8 => "uint8",
            Self::UInt32 => "uint32",
        }
    }

    pub fn itemsize(self) -> usize {
        match self {
            Self::UInt8 => 1,
            Self::UInt32 => 4,
        }
    }

    pub fn format(self) -> &'static str {
        match self {
            Self::UInt8 => "B",
            Self::UInt32 => "I",
        }
    }
}

/// A node in a columnar schema.
#[derive(Debug, Clone, PartialEq)]
pub enum Form {
    Numpy {
        primitive: Primitive,
        parameters: Map<String, Value>,
    },
    ListOffset {
        offsets: IndexFormat,
        content: Box<Form>,
        parameters: Map<String, Value>,
    },
    Record {
        contents: Vec<(String, Form)>,
        parameters: Map<String, Value>,
    },
}

impl Form {
    pub fn parameters(&self) -> &Map<String, Value> {
        match self {
            Self::Numpy { parameters, .. }
            | Self::ListOffset { parameters, .. }
            | Self::Record { parameters, .. } => parameters,
        }
    }

    pub fn parameter(&self, key: &str) -> Option<&Value> {
        self.parameters().get(key)
    }

    /// Renders the descriptor in the JSON layout columnar readers accept.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Numpy {
                primitive,
                parameters,
            } => json!({
                "class": "NumpyArray",
                "itemsize": primitive.itemsize(),
                "format": primitive.format(),
                "primitive": primitive.name(),
                "parameters": parameters,
            }),
            Self::ListOffset {
                offsets,
                content,
                parameters,
            } => json!({
                "class": offsets.list_offset_class(),
                "offsets": offsets.as_str(),
                "content": content.to_json(),
                "parameters": parameters,
            }),
            Self::Record {
                contents,
                parameters,
            } => {
                let contents: Map<String, Value> = contents
                    .iter()
                    .map(|(name, form)| (name.clone(), form.to_json()))
                    .collect();
                json!({
                    "class": "RecordArray",
                    "contents": contents,
                    "parameters": parameters,
                })
            }
        }
    }
}

/// Record types that know their columnar layout.
pub trait ColumnarForm {
    fn awkward_form(options: &FormOptions) -> Form;
}

/// Form of a column of length-prefixed strings.
///
/// `header` is whether the string container itself is written with a
/// byte count and version header.
pub fn string_form(typename: &str, header: bool, index_format: IndexFormat) -> Form {
    let mut char_parameters = Map::new();
    char_parameters.insert("__array__".to_owned(), json!("char"));

    let mut parameters = Map::new();
    parameters.insert("__array__".to_owned(), json!("string"));
    parameters.insert(
        "uproot".to_owned(),
        json!({
            "as": "string",
            "header": header,
            "length_bytes": "1-5",
            "typename": typename,
        }),
    );

    Form::ListOffset {
        offsets: index_format,
        content: Box::new(Form::Numpy {
            primitive: Primitive::UInt8,
            parameters: char_parameters,
        }),
        parameters,
    }
}
