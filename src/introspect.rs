//! Tabular data introspection
//!
//! The validator only needs two things from a DataFrame: the element type of
//! every column (recursively for nested columns) and how many nulls each
//! column holds. [`TabularData`] exposes exactly that as a tree of
//! [`ObservedField`]s.

use std::fmt;

use crate::error::Result;
use crate::types::ScalarType;

/// Runtime type of a column as reported by the data source
#[derive(Debug, Clone, PartialEq)]
pub enum ObservedType {
    Scalar(ScalarType),
    List(Box<ObservedField>),
    Struct(Vec<ObservedField>),
    /// A type outside the schema vocabulary, by its native name
    Other(String),
}

impl fmt::Display for ObservedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObservedType::Scalar(s) => write!(f, "{}", s),
            ObservedType::List(item) => write!(f, "list<{}>", item.data_type),
            ObservedType::Struct(fields) => {
                f.write_str("struct<")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", field.name, field.data_type)?;
                }
                f.write_str(">")
            }
            ObservedType::Other(name) => f.write_str(name),
        }
    }
}

/// One observed column, struct field or list element
#[derive(Debug, Clone, PartialEq)]
pub struct ObservedField {
    pub name: String,
    pub data_type: ObservedType,
    pub null_count: usize,
}

impl ObservedField {
    pub fn new(name: impl Into<String>, data_type: ObservedType) -> Self {
        Self {
            name: name.into(),
            data_type,
            null_count: 0,
        }
    }

    pub fn scalar(name: impl Into<String>, scalar: ScalarType) -> Self {
        Self::new(name, ObservedType::Scalar(scalar))
    }

    pub fn list(name: impl Into<String>, item: ObservedField) -> Self {
        Self::new(name, ObservedType::List(Box::new(item)))
    }

    pub fn structure(name: impl Into<String>, fields: Vec<ObservedField>) -> Self {
        Self::new(name, ObservedType::Struct(fields))
    }

    pub fn with_nulls(mut self, null_count: usize) -> Self {
        self.null_count = null_count;
        self
    }

    pub fn has_nulls(&self) -> bool {
        self.null_count > 0
    }

    /// Direct child of a struct field, by name
    pub fn child(&self, name: &str) -> Option<&ObservedField> {
        match &self.data_type {
            ObservedType::Struct(fields) => fields.iter().find(|f| f.name == name),
            _ => None,
        }
    }

    /// Fold another observation of the same shape into this one, summing nulls
    pub(crate) fn absorb(&mut self, other: &ObservedField) {
        self.null_count += other.null_count;
        match (&mut self.data_type, &other.data_type) {
            (ObservedType::List(mine), ObservedType::List(theirs)) => mine.absorb(theirs),
            (ObservedType::Struct(mine), ObservedType::Struct(theirs)) => {
                for (a, b) in mine.iter_mut().zip(theirs) {
                    a.absorb(b);
                }
            }
            _ => {}
        }
    }
}

/// Anything whose columns can be observed for validation
pub trait TabularData {
    /// Top-level columns in frame order
    fn observe(&self) -> Result<Vec<ObservedField>>;
}

impl TabularData for [ObservedField] {
    fn observe(&self) -> Result<Vec<ObservedField>> {
        Ok(self.to_vec())
    }
}

impl<T> TabularData for Vec<T>
where
    [T]: TabularData,
{
    fn observe(&self) -> Result<Vec<ObservedField>> {
        self.as_slice().observe()
    }
}
