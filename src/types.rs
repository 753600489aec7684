//! Declared column types
//!
//! Type names in a schema document resolve through a fixed lookup table
//! into a [`TypeName`]; the loader then expands `list` and `struct` into a
//! full [`TypeDescriptor`] tree.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::model::Column;

/// Scalar (leaf) column types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarType {
    Boolean,
    Int8,
    Int16,
    Int32,
    Int64,
    #[serde(rename = "uint8")]
    UInt8,
    #[serde(rename = "uint16")]
    UInt16,
    #[serde(rename = "uint32")]
    UInt32,
    #[serde(rename = "uint64")]
    UInt64,
    Float32,
    Float64,
    String,
    Date,
    Time,
    Datetime,
}

impl ScalarType {
    pub const ALL: [ScalarType; 15] = [
        ScalarType::Boolean,
        ScalarType::Int8,
        ScalarType::Int16,
        ScalarType::Int32,
        ScalarType::Int64,
        ScalarType::UInt8,
        ScalarType::UInt16,
        ScalarType::UInt32,
        ScalarType::UInt64,
        ScalarType::Float32,
        ScalarType::Float64,
        ScalarType::String,
        ScalarType::Date,
        ScalarType::Time,
        ScalarType::Datetime,
    ];

    /// Name used in schema documents
    pub fn name(&self) -> &'static str {
        match self {
            ScalarType::Boolean => "boolean",
            ScalarType::Int8 => "int8",
            ScalarType::Int16 => "int16",
            ScalarType::Int32 => "int32",
            ScalarType::Int64 => "int64",
            ScalarType::UInt8 => "uint8",
            ScalarType::UInt16 => "uint16",
            ScalarType::UInt32 => "uint32",
            ScalarType::UInt64 => "uint64",
            ScalarType::Float32 => "float32",
            ScalarType::Float64 => "float64",
            ScalarType::String => "string",
            ScalarType::Date => "date",
            ScalarType::Time => "time",
            ScalarType::Datetime => "datetime",
        }
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A resolved `type:` string, before nested specs are expanded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeName {
    Scalar(ScalarType),
    List,
    Struct,
}

impl TypeName {
    /// Every name accepted by [`TypeName::from_str`], in canonical form
    pub fn known_names() -> impl Iterator<Item = &'static str> {
        ScalarType::ALL
            .iter()
            .map(|s| s.name())
            .chain(["list", "struct"])
    }
}

impl FromStr for TypeName {
    type Err = ();

    /// Case-insensitive lookup
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        match lower.as_str() {
            "list" => Ok(TypeName::List),
            "struct" => Ok(TypeName::Struct),
            other => ScalarType::ALL
                .iter()
                .find(|t| t.name() == other)
                .map(|t| TypeName::Scalar(*t))
                .ok_or(()),
        }
    }
}

/// Declared type of a column or struct field
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeDescriptor {
    Scalar(ScalarType),
    /// `element: None` accepts any element type
    List {
        element: Option<Box<TypeDescriptor>>,
    },
    Struct {
        fields: Vec<Column>,
    },
}

impl TypeDescriptor {
    pub fn list_of(element: TypeDescriptor) -> Self {
        TypeDescriptor::List {
            element: Some(Box::new(element)),
        }
    }

    /// Short kind name ("int64", "list", "struct")
    pub fn kind_name(&self) -> &'static str {
        match self {
            TypeDescriptor::Scalar(s) => s.name(),
            TypeDescriptor::List { .. } => "list",
            TypeDescriptor::Struct { .. } => "struct",
        }
    }
}

impl From<ScalarType> for TypeDescriptor {
    fn from(s: ScalarType) -> Self {
        TypeDescriptor::Scalar(s)
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDescriptor::Scalar(s) => write!(f, "{}", s),
            TypeDescriptor::List { element: Some(e) } => write!(f, "list<{}>", e),
            TypeDescriptor::List { element: None } => f.write_str("list<any>"),
            TypeDescriptor::Struct { fields } => {
                f.write_str("struct<")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", field.name, field.data_type)?;
                }
                f.write_str(">")
            }
        }
    }
}
