//! Typed values held in the variable pool.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use super::file::File;

/// A path into the variable pool: `[node_id, variable_name, attr...]`.
pub type Selector = Vec<String>;

/// A typed workflow value.
///
/// Files are first-class variants instead of JSON blobs so consumers can
/// switch on them without probing the shape of a JSON object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "value_type", content = "value", rename_all = "snake_case")]
#[non_exhaustive]
pub enum Segment {
    None,
    String(String),
    Number(Number),
    Boolean(bool),
    Object(Map<String, Value>),
    Array(Vec<Value>),
    File(File),
    ArrayFile(Vec<File>),
}

impl Segment {
    /// Short type name used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::String(_) => "string",
            Self::Number(_) => "number",
            Self::Boolean(_) => "boolean",
            Self::Object(_) => "object",
            Self::Array(_) => "array",
            Self::File(_) => "file",
            Self::ArrayFile(_) => "array[file]",
        }
    }

    /// Text form used when the segment is interpolated into a template.
    pub fn text(&self) -> String {
        match self {
            Self::None => String::new(),
            Self::String(s) => s.clone(),
            Self::Number(n) => n.to_string(),
            Self::Boolean(b) => b.to_string(),
            Self::Object(map) => Value::Object(map.clone()).to_string(),
            Self::Array(items) => Value::Array(items.clone()).to_string(),
            Self::File(file) => file.display_text(),
            Self::ArrayFile(files) => files
                .iter()
                .map(File::display_text)
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }

    /// Plain JSON form, used for node inputs and logs.
    pub fn to_value(&self) -> Value {
        match self {
            Self::None => Value::Null,
            Self::String(s) => Value::String(s.clone()),
            Self::Number(n) => Value::Number(n.clone()),
            Self::Boolean(b) => Value::Bool(*b),
            Self::Object(map) => Value::Object(map.clone()),
            Self::Array(items) => Value::Array(items.clone()),
            Self::File(file) => serde_json::to_value(file).unwrap_or(Value::Null),
            Self::ArrayFile(files) => serde_json::to_value(files).unwrap_or(Value::Null),
        }
    }
}

impl From<Value> for Segment {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::None,
            Value::String(s) => Self::String(s),
            Value::Number(n) => Self::Number(n),
            Value::Bool(b) => Self::Boolean(b),
            Value::Object(map) => Self::Object(map),
            Value::Array(items) => Self::Array(items),
        }
    }
}

impl From<&str> for Segment {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<File> for Segment {
    fn from(file: File) -> Self {
        Self::File(file)
    }
}

impl From<Vec<File>> for Segment {
    fn from(files: Vec<File>) -> Self {
        Self::ArrayFile(files)
    }
}

/// A named binding of a segment, as written into the pool by a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Variable {
    pub name: String,
    pub value: Segment,
}

impl Variable {
    pub fn new(name: impl Into<String>, value: impl Into<Segment>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// A variable bound to a single file.
    pub fn file(name: impl Into<String>, file: File) -> Self {
        Self::new(name, Segment::File(file))
    }

    /// A variable bound to an ordered list of files.
    pub fn file_array(name: impl Into<String>, files: Vec<File>) -> Self {
        Self::new(name, Segment::ArrayFile(files))
    }
}
