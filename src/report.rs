//! Validation reports for tooling output

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::validate::{ValidationError, ValidationErrorKind};

/// Outcome of validating one frame against one table schema
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub dataset: String,
    pub table: String,
    /// Where the frame came from (file path, query, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub generated_at: DateTime<Utc>,
    pub valid: bool,
    pub errors: Vec<ValidationError>,
}

impl ValidationReport {
    pub fn new(dataset: impl Into<String>, table: impl Into<String>, errors: Vec<ValidationError>) -> Self {
        Self {
            dataset: dataset.into(),
            table: table.into(),
            source: None,
            generated_at: Utc::now(),
            valid: errors.is_empty(),
            errors,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn count(&self, kind: ValidationErrorKind) -> usize {
        self.errors.iter().filter(|e| e.kind == kind).count()
    }

    /// One-line summary
    pub fn summary(&self) -> String {
        if self.valid {
            format!("{}.{} is valid", self.dataset, self.table)
        } else {
            format!(
                "{}.{} has {} validation error(s)",
                self.dataset,
                self.table,
                self.errors.len()
            )
        }
    }
}
