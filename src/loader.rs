//! Schema Loader
//!
//! Converts a parsed YAML document into a [`Dataset`] by recursive descent.
//! Loading stops at the first malformed node; the returned error names the
//! node's path, e.g. `tables[2].columns[0].type`.
//!
//! ## Document shape
//! ```yaml
//! name: ecommerce
//! description: Online store
//! tables:
//!   - name: products
//!     columns:
//!       - name: id
//!         type: int64
//!       - name: attributes
//!         type: struct
//!         fields:
//!           - name: weight
//!             type: float32
//!       - name: tags
//!         type: list
//!         element_type: string
//! ```

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use serde_yaml::{Mapping, Value};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::error::{Result, SchemaError};
use crate::model::{Column, Dataset, Table};
use crate::types::{TypeDescriptor, TypeName};

const DOCUMENT_PATH: &str = "document";

/// Options controlling how lenient the loader is
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Accept `type: list` without `element_type` as a list of any element type
    pub allow_untyped_lists: bool,
}

/// Parses schema documents into [`Dataset`] values
#[derive(Debug, Clone, Default)]
pub struct SchemaLoader {
    options: LoadOptions,
}

impl SchemaLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: LoadOptions) -> Self {
        Self { options }
    }

    /// Parse an already-deserialized YAML document
    pub fn parse(&self, document: &Value) -> Result<Dataset> {
        let root = as_mapping(document, DOCUMENT_PATH)?;

        let name = required_str(root, "", "name")?;
        let description = optional_str(root, "", "description")?;
        let entries = required_seq(root, "", "tables")?;

        let mut tables = Vec::with_capacity(entries.len());
        let mut seen = HashSet::new();
        for (i, entry) in entries.iter().enumerate() {
            let path = format!("tables[{}]", i);
            let table = self.parse_table(&path, entry)?;
            if !seen.insert(table.name.clone()) {
                return Err(SchemaError::DuplicateName {
                    path: child(&path, "name"),
                    name: table.name,
                });
            }
            tables.push(table);
        }

        let dataset = Dataset {
            name,
            description,
            tables,
        };
        info!(
            dataset = %dataset.name,
            tables = dataset.tables.len(),
            "Parsed dataset schema"
        );
        Ok(dataset)
    }

    /// Parse YAML text
    pub fn parse_str(&self, yaml: &str) -> Result<Dataset> {
        let document: Value = serde_yaml::from_str(yaml)?;
        self.parse(&document)
    }

    /// Read and parse a YAML schema file
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<Dataset> {
        let path = path.as_ref();
        info!("Parsing schema from {:?}", path);

        let content = fs::read_to_string(path).map_err(|source| SchemaError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        self.parse_str(&content)
    }

    /// Load every `*.yaml` / `*.yml` file under a directory, sorted by path
    pub fn load_dir(&self, dir: impl AsRef<Path>) -> Vec<(PathBuf, Result<Dataset>)> {
        let mut files: Vec<PathBuf> = WalkDir::new(dir.as_ref())
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|p| is_yaml(p))
            .collect();
        files.sort();

        files
            .into_iter()
            .map(|path| {
                let result = self.load_file(&path);
                if let Err(e) = &result {
                    warn!("Schema {:?} failed to load: {}", path, e);
                }
                (path, result)
            })
            .collect()
    }

    fn parse_table(&self, path: &str, value: &Value) -> Result<Table> {
        let map = as_mapping(value, path)?;
        let name = required_str(map, path, "name")?;
        let description = optional_str(map, path, "description")?;
        let entries = required_seq(map, path, "columns")?;
        let columns = self.parse_columns(&child(path, "columns"), entries)?;

        debug!(table = %name, columns = columns.len(), "Parsed table schema");
        Ok(Table {
            name,
            description,
            columns,
        })
    }

    fn parse_columns(&self, path: &str, entries: &[Value]) -> Result<Vec<Column>> {
        let mut columns = Vec::with_capacity(entries.len());
        let mut seen = HashSet::new();

        for (i, entry) in entries.iter().enumerate() {
            let column_path = format!("{}[{}]", path, i);
            let column = self.parse_column(&column_path, entry)?;
            if !seen.insert(column.name.clone()) {
                return Err(SchemaError::DuplicateName {
                    path: child(&column_path, "name"),
                    name: column.name,
                });
            }
            columns.push(column);
        }

        Ok(columns)
    }

    fn parse_column(&self, path: &str, value: &Value) -> Result<Column> {
        let map = as_mapping(value, path)?;
        let name = required_str(map, path, "name")?;
        let type_name = required_str(map, path, "type")?;
        let nullable = optional_bool(map, path, "nullable")?.unwrap_or(false);
        let description = optional_str(map, path, "description")?;
        let data_type = self.resolve_type(path, map, &type_name)?;

        Ok(Column {
            name,
            data_type,
            nullable,
            description,
        })
    }

    /// Resolve the `type` of the node at `path`; `map` holds its `fields` /
    /// `element_type` sub-specification.
    fn resolve_type(&self, path: &str, map: &Mapping, type_name: &str) -> Result<TypeDescriptor> {
        match lookup_type(&child(path, "type"), type_name)? {
            TypeName::Scalar(scalar) => Ok(TypeDescriptor::Scalar(scalar)),
            TypeName::Struct => self.parse_struct(path, map),
            TypeName::List => self.parse_list(path, map),
        }
    }

    fn parse_struct(&self, path: &str, map: &Mapping) -> Result<TypeDescriptor> {
        let entries = required_seq(map, path, "fields")?;
        let fields = self.parse_columns(&child(path, "fields"), entries)?;
        Ok(TypeDescriptor::Struct { fields })
    }

    fn parse_list(&self, path: &str, map: &Mapping) -> Result<TypeDescriptor> {
        let element_path = child(path, "element_type");

        let element = match map.get("element_type") {
            None | Some(Value::Null) => {
                if self.options.allow_untyped_lists {
                    debug!(path = %path, "List without element_type accepts any element");
                    return Ok(TypeDescriptor::List { element: None });
                }
                return Err(SchemaError::MissingField {
                    path: element_path,
                    field: "element_type".to_string(),
                });
            }
            // Documented form: a type name; `struct` takes `fields` from this node
            Some(Value::String(name)) => match lookup_type(&element_path, name)? {
                TypeName::Scalar(scalar) => TypeDescriptor::Scalar(scalar),
                TypeName::Struct => self.parse_struct(path, map)?,
                TypeName::List if self.options.allow_untyped_lists => {
                    TypeDescriptor::List { element: None }
                }
                TypeName::List => {
                    return Err(SchemaError::InvalidValue {
                        path: element_path,
                        expected: "a mapping with its own element_type for a nested list".to_string(),
                        found: "\"list\"".to_string(),
                    });
                }
            },
            // Nested form: a full type specification
            Some(Value::Mapping(spec)) => {
                let type_name = required_str(spec, &element_path, "type")?;
                self.resolve_type(&element_path, spec, &type_name)?
            }
            Some(other) => {
                return Err(SchemaError::InvalidValue {
                    path: element_path,
                    expected: "a type name or type mapping".to_string(),
                    found: describe(other).to_string(),
                });
            }
        };

        Ok(TypeDescriptor::list_of(element))
    }
}

fn lookup_type(path: &str, name: &str) -> Result<TypeName> {
    name.parse().map_err(|_| SchemaError::UnknownType {
        path: path.to_string(),
        type_name: name.to_string(),
        suggestion: suggest_type(name),
    })
}

/// Closest known type name, if any is a plausible match
fn suggest_type(name: &str) -> Option<String> {
    let matcher = SkimMatcherV2::default();
    let query = name.trim().to_ascii_lowercase();

    TypeName::known_names()
        .filter_map(|candidate| matcher.fuzzy_match(candidate, &query).map(|score| (score, candidate)))
        .max_by_key(|(score, _)| *score)
        .map(|(_, candidate)| candidate.to_string())
}

fn child(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", path, key)
    }
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}

fn as_mapping<'a>(value: &'a Value, path: &str) -> Result<&'a Mapping> {
    value.as_mapping().ok_or_else(|| SchemaError::InvalidValue {
        path: if path.is_empty() { DOCUMENT_PATH.to_string() } else { path.to_string() },
        expected: "mapping".to_string(),
        found: describe(value).to_string(),
    })
}

/// Fetch a key; an explicit YAML null counts as absent
fn get<'a>(map: &'a Mapping, key: &str) -> Option<&'a Value> {
    map.get(key).filter(|v| !v.is_null())
}

fn required<'a>(map: &'a Mapping, path: &str, key: &str) -> Result<&'a Value> {
    get(map, key).ok_or_else(|| SchemaError::MissingField {
        path: child(path, key),
        field: key.to_string(),
    })
}

fn required_str(map: &Mapping, path: &str, key: &str) -> Result<String> {
    let value = required(map, path, key)?;
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| invalid(path, key, "string", value))
}

fn optional_str(map: &Mapping, path: &str, key: &str) -> Result<Option<String>> {
    get(map, key)
        .map(|value| {
            value
                .as_str()
                .map(str::to_string)
                .ok_or_else(|| invalid(path, key, "string", value))
        })
        .transpose()
}

fn optional_bool(map: &Mapping, path: &str, key: &str) -> Result<Option<bool>> {
    get(map, key)
        .map(|value| value.as_bool().ok_or_else(|| invalid(path, key, "boolean", value)))
        .transpose()
}

fn required_seq<'a>(map: &'a Mapping, path: &str, key: &str) -> Result<&'a [Value]> {
    let value = required(map, path, key)?;
    value
        .as_sequence()
        .map(|s| s.as_slice())
        .ok_or_else(|| invalid(path, key, "sequence", value))
}

fn invalid(path: &str, key: &str, expected: &str, found: &Value) -> SchemaError {
    SchemaError::InvalidValue {
        path: child(path, key),
        expected: expected.to_string(),
        found: describe(found).to_string(),
    }
}
