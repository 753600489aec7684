//! Schema Validator CLI
//!
//! Checks schema documents and validates Arrow IPC data against them.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tabular_schemas::config::OutputFormat;
use tabular_schemas::{
    init_logging, read_ipc_file, Column, Dataset, SchemaLoader, TypeDescriptor, ValidationReport,
    Validator, ValidatorConfig,
};

#[derive(Parser)]
#[command(name = "schema-validator")]
#[command(about = "Check schema documents and validate data against them")]
struct Cli {
    /// Config file to load (optional)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that schema documents load (a file or a directory)
    Check {
        /// Schema file or directory (defaults to the configured schemas path)
        path: Option<PathBuf>,
    },

    /// Show the tables and columns of a schema
    Show {
        /// Schema file
        schema: PathBuf,
        /// Only show this table
        #[arg(short, long)]
        table: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the Arrow schema a conforming table would have
    ArrowSchema {
        /// Schema file
        schema: PathBuf,
        /// Table to convert
        #[arg(short, long)]
        table: String,
    },

    /// Validate an Arrow IPC file against a table schema
    Validate {
        /// Schema file
        schema: PathBuf,
        /// Table to validate against
        #[arg(short, long)]
        table: String,
        /// Arrow IPC file holding the data
        data: PathBuf,
        /// Report columns the schema does not declare
        #[arg(long)]
        extra_columns: bool,
        /// Output the report as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let config = match ValidatorConfig::load_from(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = init_logging(&config.logging) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = run(cli.command, &config) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(command: Commands, config: &ValidatorConfig) -> Result<()> {
    let loader = SchemaLoader::with_options(config.load_options());

    match command {
        Commands::Check { path } => {
            let path = path.unwrap_or_else(|| config.schemas_path());

            let results = if path.is_dir() {
                loader.load_dir(&path)
            } else {
                vec![(path.clone(), loader.load_file(&path))]
            };

            if results.is_empty() {
                println!("⚠️  No schema files found in {:?}", path);
                return Ok(());
            }

            let mut all_valid = true;
            for (file, result) in &results {
                match result {
                    Ok(dataset) => println!(
                        "  ✅ {} - dataset '{}' ({} tables, {} columns)",
                        file.display(),
                        dataset.name,
                        dataset.tables.len(),
                        dataset.column_count()
                    ),
                    Err(e) => {
                        all_valid = false;
                        println!("  ❌ {} - {}", file.display(), e);
                    }
                }
            }

            if !all_valid {
                std::process::exit(1);
            }
            Ok(())
        }

        Commands::Show { schema, table, json } => {
            let dataset = load(&loader, &schema)?;

            if json {
                match &table {
                    Some(name) => println!("{}", to_json(dataset.table(name)?, config.output.format)?),
                    None => println!("{}", to_json(&dataset, config.output.format)?),
                }
                return Ok(());
            }

            println!("📋 Dataset: {}", dataset.name);
            if let Some(description) = &dataset.description {
                println!("   {}", description);
            }

            let tables: Vec<_> = match &table {
                Some(name) => vec![dataset.table(name)?],
                None => dataset.tables.iter().collect(),
            };

            for t in tables {
                println!();
                println!("Table: {}", t.name);
                if let Some(description) = &t.description {
                    println!("  {}", description);
                }
                for column in &t.columns {
                    print_column(column, 1);
                }
            }
            Ok(())
        }

        Commands::ArrowSchema { schema, table } => {
            let dataset = load(&loader, &schema)?;
            let arrow_schema = dataset.table(&table)?.to_arrow_schema();

            for field in arrow_schema.fields() {
                let nullable = if field.is_nullable() { "nullable" } else { "non-null" };
                println!("{}: {} ({})", field.name(), field.data_type(), nullable);
            }
            Ok(())
        }

        Commands::Validate {
            schema,
            table,
            data,
            extra_columns,
            json,
        } => {
            let dataset = load(&loader, &schema)?;
            let table_schema = dataset.table(&table)?;

            let batches = read_ipc_file(&data)
                .with_context(|| format!("reading data from {:?}", data))?;

            let mut options = config.validation_options();
            options.report_extra_columns |= extra_columns;
            let errors = Validator::with_options(options).validate(&batches, table_schema)?;

            let report = ValidationReport::new(&dataset.name, &table_schema.name, errors)
                .with_source(data.display().to_string());

            if json {
                println!("{}", to_json(&report, config.output.format)?);
            } else if report.valid {
                println!("✅ {}", report.summary());
            } else {
                println!("❌ {}", report.summary());
                for error in &report.errors {
                    println!("   └─ {}", error);
                }
            }

            if !report.valid && config.validation.fail_on_errors {
                std::process::exit(1);
            }
            Ok(())
        }
    }
}

fn load(loader: &SchemaLoader, path: &Path) -> Result<Dataset> {
    loader
        .load_file(path)
        .with_context(|| format!("loading schema {:?}", path))
}

fn to_json<T: Serialize + ?Sized>(value: &T, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Pretty => serde_json::to_string_pretty(value)?,
        OutputFormat::Compact => serde_json::to_string(value)?,
    })
}

fn print_column(column: &Column, depth: usize) {
    let indent = "  ".repeat(depth);
    let nullable = if column.nullable { " (nullable)" } else { "" };
    println!("{}- {}: {}{}", indent, column.name, column.data_type.kind_name(), nullable);

    let mut data_type = &column.data_type;
    while let TypeDescriptor::List { element: Some(element) } = data_type {
        println!("{}    of {}", indent, element.kind_name());
        data_type = element.as_ref();
    }
    if let TypeDescriptor::Struct { fields } = data_type {
        for field in fields {
            print_column(field, depth + 2);
        }
    }
}
