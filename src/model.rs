//! Schema model: datasets, tables and columns
//!
//! All values are built once by the loader and read-only afterwards.

use serde::Serialize;

use crate::error::{Result, SchemaError};
use crate::types::TypeDescriptor;

/// A column declaration, also used for struct fields
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: TypeDescriptor,
    pub nullable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Column {
    /// Create a non-nullable column
    pub fn new(name: impl Into<String>, data_type: impl Into<TypeDescriptor>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            nullable: false,
            description: None,
        }
    }

    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Schema for a single table (one DataFrame)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub columns: Vec<Column>,
}

impl Table {
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }
}

/// A named collection of table schemas
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub tables: Vec<Table>,
}

impl Dataset {
    /// Select a table schema by name
    pub fn table(&self, name: &str) -> Result<&Table> {
        self.tables
            .iter()
            .find(|t| t.name == name)
            .ok_or_else(|| SchemaError::TableNotFound {
                name: name.to_string(),
                dataset: self.name.clone(),
                available: self.tables.iter().map(|t| t.name.clone()).collect(),
            })
    }

    pub fn table_names(&self) -> Vec<&str> {
        self.tables.iter().map(|t| t.name.as_str()).collect()
    }

    /// Total number of top-level columns across all tables
    pub fn column_count(&self) -> usize {
        self.tables.iter().map(|t| t.columns.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ScalarType;

    fn dataset() -> Dataset {
        Dataset {
            name: "shop".to_string(),
            description: None,
            tables: vec![
                Table {
                    name: "users".to_string(),
                    description: None,
                    columns: vec![
                        Column::new("id", ScalarType::Int64),
                        Column::new("email", ScalarType::String).nullable(true),
                    ],
                },
                Table {
                    name: "orders".to_string(),
                    description: Some("Customer orders".to_string()),
                    columns: vec![Column::new("order_id", ScalarType::String)],
                },
            ],
        }
    }

    #[test]
    fn test_select_table() {
        let ds = dataset();
        let users = ds.table("users").unwrap();
        assert_eq!(users.column_names(), vec!["id", "email"]);
        assert!(users.column("email").unwrap().nullable);
        assert_eq!(ds.column_count(), 3);
    }

    #[test]
    fn test_select_missing_table() {
        let ds = dataset();
        match ds.table("payments") {
            Err(SchemaError::TableNotFound { available, .. }) => {
                assert_eq!(available, vec!["users", "orders"]);
            }
            other => panic!("Expected TableNotFound, got {:?}", other),
        }
    }
}
