//! Error types for schema loading and validation

use std::path::PathBuf;

use thiserror::Error;

use crate::validate::ValidationError;

/// Result type for schema operations
pub type Result<T> = std::result::Result<T, SchemaError>;

/// Schema loading and validation errors
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Missing required field '{field}' at {path}")]
    MissingField { path: String, field: String },

    #[error("Unknown type '{type_name}' at {path}{}", suggestion_hint(.suggestion))]
    UnknownType {
        path: String,
        type_name: String,
        suggestion: Option<String>,
    },

    #[error("Invalid value at {path}: expected {expected}, found {found}")]
    InvalidValue {
        path: String,
        expected: String,
        found: String,
    },

    #[error("Duplicate name '{name}' at {path}")]
    DuplicateName { path: String, name: String },

    #[error("Table '{name}' not found in dataset '{dataset}'. Available tables: {}", .available.join(", "))]
    TableNotFound {
        name: String,
        dataset: String,
        available: Vec<String>,
    },

    #[error("Validation failed for table '{table}' with {} error(s)", .errors.len())]
    ValidationFailed {
        table: String,
        errors: Vec<ValidationError>,
    },

    #[error("Cannot introspect tabular data: {0}")]
    Introspection(String),

    #[error("Failed to read {path:?}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
}

impl SchemaError {
    /// Path of the offending schema node, for loader errors
    pub fn path(&self) -> Option<&str> {
        match self {
            SchemaError::MissingField { path, .. }
            | SchemaError::UnknownType { path, .. }
            | SchemaError::InvalidValue { path, .. }
            | SchemaError::DuplicateName { path, .. } => Some(path),
            _ => None,
        }
    }
}

fn suggestion_hint(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(s) => format!(" (did you mean '{}'?)", s),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_type_message_with_suggestion() {
        let err = SchemaError::UnknownType {
            path: "tables[0].columns[1].type".to_string(),
            type_name: "flot64".to_string(),
            suggestion: Some("float64".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "Unknown type 'flot64' at tables[0].columns[1].type (did you mean 'float64'?)"
        );
        assert_eq!(err.path(), Some("tables[0].columns[1].type"));
    }

    #[test]
    fn test_table_not_found_lists_available() {
        let err = SchemaError::TableNotFound {
            name: "customers".to_string(),
            dataset: "ecommerce".to_string(),
            available: vec!["products".to_string(), "orders".to_string()],
        };
        assert!(err.to_string().ends_with("Available tables: products, orders"));
        assert_eq!(err.path(), None);
    }
}
