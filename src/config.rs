//! Configuration management for the schema tools
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (tabular-schemas.toml)
//! - Environment variables (TABULAR_SCHEMAS__*)
//!
//! ## Example config file (tabular-schemas.toml):
//! ```toml
//! [schemas]
//! path = "./schemas"
//!
//! [loader]
//! allow_untyped_lists = false
//!
//! [validation]
//! report_extra_columns = true
//! fail_on_errors = true
//!
//! [logging]
//! level = "debug"
//! format = "compact"
//! file = "validation.log"
//!
//! [output]
//! format = "pretty"
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::loader::LoadOptions;
use crate::validate::ValidationOptions;

/// Main configuration for the schema tools
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidatorConfig {
    /// Where schema documents live
    #[serde(default)]
    pub schemas: SchemasConfig,

    /// Schema loading settings
    #[serde(default)]
    pub loader: LoaderConfig,

    /// Validation settings
    #[serde(default)]
    pub validation: ValidationConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Report output settings
    #[serde(default)]
    pub output: OutputConfig,
}

/// Schema location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemasConfig {
    /// Directory (or single file) holding schema YAML documents
    #[serde(default = "default_schemas_path")]
    pub path: PathBuf,
}

/// Loader configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// Accept `type: list` without `element_type`
    #[serde(default)]
    pub allow_untyped_lists: bool,
}

/// Validation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Report frame columns that the schema does not declare
    #[serde(default)]
    pub report_extra_columns: bool,

    /// Exit non-zero when validation finds errors
    #[serde(default = "default_true")]
    pub fail_on_errors: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when RUST_LOG is unset (e.g. "info", "tabular_schemas=debug")
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Line format
    #[serde(default)]
    pub format: LogFormat,

    /// Also write logs to this file
    #[serde(default)]
    pub file: Option<PathBuf>,
}

/// Log line format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Compact,
}

/// Report output configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Output format for JSON
    #[serde(default)]
    pub format: OutputFormat,
}

/// Output format for JSON
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Pretty,
    Compact,
}

// Default value functions
fn default_schemas_path() -> PathBuf {
    PathBuf::from("schemas")
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for SchemasConfig {
    fn default() -> Self {
        Self {
            path: default_schemas_path(),
        }
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            report_extra_columns: false,
            fail_on_errors: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::Pretty,
            file: None,
        }
    }
}

impl From<&LoaderConfig> for LoadOptions {
    fn from(config: &LoaderConfig) -> Self {
        LoadOptions {
            allow_untyped_lists: config.allow_untyped_lists,
        }
    }
}

impl From<&ValidationConfig> for ValidationOptions {
    fn from(config: &ValidationConfig) -> Self {
        ValidationOptions {
            report_extra_columns: config.report_extra_columns,
        }
    }
}

impl ValidatorConfig {
    /// Load configuration from default locations, then `config_path` if given
    pub fn load_from(config_path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        // Load from default locations
        let config_locations = [
            "tabular-schemas.toml",
            ".tabular-schemas.toml",
            "config/tabular-schemas.toml",
        ];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        // Load from XDG config directory
        if let Some(config_dir) = directories::ProjectDirs::from("dev", "familiar", "tabular-schemas") {
            let xdg_config = config_dir.config_dir().join("tabular-schemas.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        // Load from specified path
        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // Load from environment variables (TABULAR_SCHEMAS__*)
        builder = builder.add_source(
            Environment::with_prefix("TABULAR_SCHEMAS")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Save configuration to a file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }

    /// Get the schemas path (resolves relative paths)
    pub fn schemas_path(&self) -> PathBuf {
        if self.schemas.path.is_absolute() {
            self.schemas.path.clone()
        } else {
            std::env::current_dir()
                .unwrap_or_default()
                .join(&self.schemas.path)
        }
    }

    pub fn load_options(&self) -> LoadOptions {
        LoadOptions::from(&self.loader)
    }

    pub fn validation_options(&self) -> ValidationOptions {
        ValidationOptions::from(&self.validation)
    }
}
