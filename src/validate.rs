//! DataFrame validation against a table schema
//!
//! Data mismatches are findings, not failures: [`Validator::validate`]
//! always walks every declared column and returns every
//! [`ValidationError`] it finds. It only returns `Err` when the frame itself
//! cannot be introspected.
//!
//! Findings are produced per declared column, in declaration order:
//! a missing column, or the column's type findings followed by its
//! nullability finding. Undeclared frame columns are only reported when
//! [`ValidationOptions::report_extra_columns`] is set, after all declared
//! columns, in frame order.
//!
//! Paths are dotted for struct fields (`attributes.dimensions.length`) and
//! use `[]` for list elements (`variants[].sku`).

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Result, SchemaError};
use crate::introspect::{ObservedField, ObservedType, TabularData};
use crate::model::{Column, Table};
use crate::types::TypeDescriptor;

/// Kind of mismatch between a frame and its schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationErrorKind {
    /// A declared column is absent from the frame
    MissingColumn,
    /// A frame column is not declared (only when extra columns are reported)
    ExtraColumn,
    /// A declared struct field is absent from the observed struct
    MissingField,
    /// Declared and observed types differ
    TypeMismatch,
    /// A non-nullable column or field holds nulls
    NullValues,
}

/// One mismatch between a frame and its table schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Dotted column path
    pub path: String,
    pub kind: ValidationErrorKind,
    /// Expected type or constraint
    pub expected: String,
    /// Observed type or value summary
    pub observed: String,
    pub message: String,
}

impl ValidationError {
    fn missing_column(path: &str, column: &Column) -> Self {
        Self {
            path: path.to_string(),
            kind: ValidationErrorKind::MissingColumn,
            expected: column.data_type.to_string(),
            observed: "absent".to_string(),
            message: format!("Missing column '{}'", path),
        }
    }

    fn extra_column(field: &ObservedField) -> Self {
        Self {
            path: field.name.clone(),
            kind: ValidationErrorKind::ExtraColumn,
            expected: "absent".to_string(),
            observed: field.data_type.to_string(),
            message: format!("Extra column '{}' is not declared in the schema", field.name),
        }
    }

    fn missing_field(path: &str, field: &Column) -> Self {
        Self {
            path: path.to_string(),
            kind: ValidationErrorKind::MissingField,
            expected: field.data_type.to_string(),
            observed: "absent".to_string(),
            message: format!("Missing struct field '{}'", path),
        }
    }

    fn type_mismatch(path: &str, declared: &TypeDescriptor, observed: &ObservedType) -> Self {
        Self {
            path: path.to_string(),
            kind: ValidationErrorKind::TypeMismatch,
            expected: declared.to_string(),
            observed: observed.to_string(),
            message: format!("Column '{}' has type {}, expected {}", path, observed, declared),
        }
    }

    fn null_values(path: &str, null_count: usize) -> Self {
        Self {
            path: path.to_string(),
            kind: ValidationErrorKind::NullValues,
            expected: "no null values".to_string(),
            observed: format!("{} null value(s)", null_count),
            message: format!(
                "Column '{}' contains {} null value(s) but is not nullable",
                path, null_count
            ),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Knobs for [`Validator`]
#[derive(Debug, Clone, Default)]
pub struct ValidationOptions {
    /// Report frame columns that the schema does not declare
    pub report_extra_columns: bool,
}

/// Validates frames against table schemas
#[derive(Debug, Clone, Default)]
pub struct Validator {
    options: ValidationOptions,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ValidationOptions) -> Self {
        Self { options }
    }

    /// Report undeclared frame columns as errors
    pub fn strict(mut self) -> Self {
        self.options.report_extra_columns = true;
        self
    }

    /// Collect every mismatch between `frame` and `table`
    pub fn validate<D>(&self, frame: &D, table: &Table) -> Result<Vec<ValidationError>>
    where
        D: TabularData + ?Sized,
    {
        debug!("Validating frame against schema '{}'", table.name);
        let observed = frame.observe()?;
        let mut errors = Vec::new();

        for column in &table.columns {
            match observed.iter().find(|f| f.name == column.name) {
                Some(field) => self.check_field(&column.name, column, field, &mut errors),
                None => errors.push(ValidationError::missing_column(&column.name, column)),
            }
        }

        if self.options.report_extra_columns {
            errors.extend(
                observed
                    .iter()
                    .filter(|f| table.column(&f.name).is_none())
                    .map(ValidationError::extra_column),
            );
        }

        if errors.is_empty() {
            info!("Frame successfully validated against schema '{}'", table.name);
        } else {
            warn!(
                "Found {} validation errors for schema '{}'",
                errors.len(),
                table.name
            );
        }
        Ok(errors)
    }

    /// Like [`Validator::validate`], but any finding is an error
    pub fn ensure_valid<D>(&self, frame: &D, table: &Table) -> Result<()>
    where
        D: TabularData + ?Sized,
    {
        let errors = self.validate(frame, table)?;
        if errors.is_empty() {
            Ok(())
        } else {
            Err(SchemaError::ValidationFailed {
                table: table.name.clone(),
                errors,
            })
        }
    }

    fn check_field(
        &self,
        path: &str,
        declared: &Column,
        observed: &ObservedField,
        errors: &mut Vec<ValidationError>,
    ) {
        self.check_type(path, &declared.data_type, observed, errors);

        if !declared.nullable && observed.has_nulls() {
            errors.push(ValidationError::null_values(path, observed.null_count));
        }
    }

    fn check_type(
        &self,
        path: &str,
        declared: &TypeDescriptor,
        observed: &ObservedField,
        errors: &mut Vec<ValidationError>,
    ) {
        debug!(path = %path, expected = %declared, actual = %observed.data_type, "Checking column");

        match (declared, &observed.data_type) {
            // No widening: int32 does not satisfy int64
            (TypeDescriptor::Scalar(expected), ObservedType::Scalar(actual)) if expected == actual => {}
            (TypeDescriptor::List { element }, ObservedType::List(item)) => {
                if let Some(element) = element {
                    self.check_type(&format!("{}[]", path), element, item, errors);
                }
            }
            (TypeDescriptor::Struct { fields }, ObservedType::Struct(_)) => {
                for field in fields {
                    let field_path = format!("{}.{}", path, field.name);
                    match observed.child(&field.name) {
                        Some(child) => self.check_field(&field_path, field, child, errors),
                        None => errors.push(ValidationError::missing_field(&field_path, field)),
                    }
                }
            }
            _ => errors.push(ValidationError::type_mismatch(path, declared, &observed.data_type)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ScalarType;

    fn users() -> Table {
        Table {
            name: "users".to_string(),
            description: None,
            columns: vec![
                Column::new("id", ScalarType::Int64),
                Column::new("name", ScalarType::String),
                Column::new("email", ScalarType::String).nullable(true),
                Column::new("age", ScalarType::Int32).nullable(true),
                Column::new("active", ScalarType::Boolean),
            ],
        }
    }

    fn valid_users() -> Vec<ObservedField> {
        vec![
            ObservedField::scalar("id", ScalarType::Int64),
            ObservedField::scalar("name", ScalarType::String),
            ObservedField::scalar("email", ScalarType::String).with_nulls(1),
            ObservedField::scalar("age", ScalarType::Int32).with_nulls(1),
            ObservedField::scalar("active", ScalarType::Boolean),
        ]
    }

    #[test]
    fn test_matching_frame_is_valid() {
        let errors = Validator::new().validate(&valid_users(), &users()).unwrap();
        assert!(errors.is_empty(), "unexpected errors: {:?}", errors);
    }

    #[test]
    fn test_missing_column_reported_once() {
        let mut frame = valid_users();
        frame.retain(|f| f.name != "age");
        frame[0] = ObservedField::scalar("id", ScalarType::String);

        let errors = Validator::new().validate(&frame, &users()).unwrap();
        let missing: Vec<_> = errors
            .iter()
            .filter(|e| e.kind == ValidationErrorKind::MissingColumn)
            .collect();
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].path, "age");
        assert_eq!(missing[0].message, "Missing column 'age'");
    }

    #[test]
    fn test_no_numeric_widening() {
        let mut frame = valid_users();
        frame[0] = ObservedField::scalar("id", ScalarType::Int32);

        let errors = Validator::new().validate(&frame, &users()).unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ValidationErrorKind::TypeMismatch);
        assert_eq!(errors[0].expected, "int64");
        assert_eq!(errors[0].observed, "int32");
        assert_eq!(errors[0].to_string(), "Column 'id' has type int32, expected int64");
    }

    #[test]
    fn test_null_in_non_nullable_column() {
        let mut frame = valid_users();
        frame[1] = ObservedField::scalar("name", ScalarType::String).with_nulls(2);

        let errors = Validator::new().validate(&frame, &users()).unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ValidationErrorKind::NullValues);
        assert_eq!(errors[0].path, "name");
        assert_eq!(errors[0].observed, "2 null value(s)");
    }

    #[test]
    fn test_type_and_null_findings_both_reported() {
        let mut frame = valid_users();
        frame[4] = ObservedField::scalar("active", ScalarType::String).with_nulls(1);

        let errors = Validator::new().validate(&frame, &users()).unwrap();
        let kinds: Vec<_> = errors.iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![ValidationErrorKind::TypeMismatch, ValidationErrorKind::NullValues]
        );
    }

    #[test]
    fn test_extra_columns_permissive_by_default() {
        let mut frame = valid_users();
        frame.push(ObservedField::scalar("extra_column", ScalarType::Int64));

        assert!(Validator::new().validate(&frame, &users()).unwrap().is_empty());

        let errors = Validator::new().strict().validate(&frame, &users()).unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ValidationErrorKind::ExtraColumn);
        assert_eq!(errors[0].path, "extra_column");
    }

    #[test]
    fn test_struct_declared_scalar_observed() {
        let table = Table {
            name: "t".to_string(),
            description: None,
            columns: vec![Column::new(
                "attrs",
                TypeDescriptor::Struct {
                    fields: vec![Column::new("color", ScalarType::String)],
                },
            )],
        };
        let frame = vec![ObservedField::scalar("attrs", ScalarType::String)];

        let errors = Validator::new().validate(&frame, &table).unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ValidationErrorKind::TypeMismatch);
        assert_eq!(errors[0].expected, "struct<color: string>");
        assert_eq!(errors[0].observed, "string");
    }

    #[test]
    fn test_list_element_paths() {
        let table = Table {
            name: "t".to_string(),
            description: None,
            columns: vec![Column::new(
                "variants",
                TypeDescriptor::list_of(TypeDescriptor::Struct {
                    fields: vec![
                        Column::new("sku", ScalarType::String),
                        Column::new("stock", ScalarType::Int64),
                    ],
                }),
            )],
        };
        let frame = vec![ObservedField::list(
            "variants",
            ObservedField::structure(
                "item",
                vec![
                    ObservedField::scalar("sku", ScalarType::String).with_nulls(1),
                    ObservedField::scalar("stock", ScalarType::Float64),
                    ObservedField::scalar("ignored", ScalarType::Boolean),
                ],
            ),
        )];

        let errors = Validator::new().validate(&frame, &table).unwrap();
        let paths: Vec<_> = errors.iter().map(|e| (e.path.as_str(), e.kind)).collect();
        assert_eq!(
            paths,
            vec![
                ("variants[].sku", ValidationErrorKind::NullValues),
                ("variants[].stock", ValidationErrorKind::TypeMismatch),
            ]
        );
    }

    #[test]
    fn test_untyped_list_accepts_any_element() {
        let table = Table {
            name: "t".to_string(),
            description: None,
            columns: vec![Column::new("blob", TypeDescriptor::List { element: None })],
        };
        let frame = vec![ObservedField::list(
            "blob",
            ObservedField::new("item", ObservedType::Other("Binary".to_string())),
        )];
        assert!(Validator::new().validate(&frame, &table).unwrap().is_empty());
    }

    #[test]
    fn test_ensure_valid() {
        assert!(Validator::new().ensure_valid(&valid_users(), &users()).is_ok());

        let frame: Vec<ObservedField> = Vec::new();
        match Validator::new().ensure_valid(&frame, &users()) {
            Err(SchemaError::ValidationFailed { table, errors }) => {
                assert_eq!(table, "users");
                assert_eq!(errors.len(), 5);
            }
            other => panic!("Expected ValidationFailed, got {:?}", other),
        }
    }
}
