//! Tabular Schemas
//!
//! Declarative YAML schemas for tabular datasets, and a structural validator
//! that checks in-memory frames (Apache Arrow record batches, or anything
//! implementing [`TabularData`]) against them.
//!
//! ## Features
//!
//! - **Typed Schemas**: Datasets own tables, tables own columns, columns carry
//!   a [`TypeDescriptor`] that nests structs and lists to any depth
//! - **Fail-Fast Loading**: Malformed documents stop at the first bad node,
//!   with its path (`tables[2].columns[0].type`)
//! - **Collect-All Validation**: Missing columns, type mismatches and null
//!   violations are all reported, never raised
//! - **Arrow Interop**: Observe record batches, export Arrow schemas, read
//!   IPC files
//!
//! ## Usage
//!
//! ```text
//! let dataset = tabular_schemas::load_schema("schemas/shop.yaml")?;
//! let users = dataset.table("users")?;
//! for error in tabular_schemas::validate(&batch, users)? {
//!     println!("{}", error);
//! }
//! ```

pub mod arrow_frame;
pub mod config;
pub mod error;
pub mod introspect;
pub mod loader;
pub mod logging;
pub mod model;
pub mod report;
pub mod types;
pub mod validate;

use std::path::{Path, PathBuf};

pub use arrow_frame::{observe_array, read_ipc_file};
pub use config::ValidatorConfig;
pub use error::{Result, SchemaError};
pub use introspect::{ObservedField, ObservedType, TabularData};
pub use loader::{LoadOptions, SchemaLoader};
pub use logging::init_logging;
pub use model::{Column, Dataset, Table};
pub use report::ValidationReport;
pub use types::{ScalarType, TypeDescriptor, TypeName};
pub use validate::{ValidationError, ValidationErrorKind, ValidationOptions, Validator};

/// Build a [`Dataset`] from a parsed YAML document
pub fn parse_schema(document: &serde_yaml::Value) -> Result<Dataset> {
    SchemaLoader::new().parse(document)
}

/// Build a [`Dataset`] from YAML text
pub fn parse_schema_str(yaml: &str) -> Result<Dataset> {
    SchemaLoader::new().parse_str(yaml)
}

/// Read and parse a YAML schema file
pub fn load_schema(path: impl AsRef<Path>) -> Result<Dataset> {
    SchemaLoader::new().load_file(path)
}

/// Load every `*.yaml` / `*.yml` schema under `dir`, one result per file,
/// sorted by path
pub fn load_schema_dir(dir: impl AsRef<Path>) -> Vec<(PathBuf, Result<Dataset>)> {
    SchemaLoader::new().load_dir(dir)
}

/// Validate a frame against a table schema with default options
pub fn validate<D>(frame: &D, table: &Table) -> Result<Vec<ValidationError>>
where
    D: TabularData + ?Sized,
{
    Validator::new().validate(frame, table)
}
