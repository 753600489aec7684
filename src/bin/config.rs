//! Schema Config CLI
//!
//! View and manage schema tool configuration.

use clap::{Parser, Subcommand};
use tabular_schemas::logging::env_filter;
use tabular_schemas::{SchemaLoader, ValidatorConfig};

#[derive(Parser)]
#[command(name = "schema-config")]
#[command(about = "View and manage schema tool configuration")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show current configuration
    Show {
        /// Config file to load (optional)
        #[arg(short, long)]
        config: Option<String>,

        /// Output as TOML
        #[arg(long)]
        toml: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Initialize a new config file
    Init {
        /// Output path
        #[arg(short, long, default_value = "tabular-schemas.toml")]
        output: String,
    },

    /// Validate configuration and load the configured schemas with it
    Validate {
        /// Config file to validate
        #[arg(short, long)]
        config: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Show { config, toml, json } => {
            let cfg = ValidatorConfig::load_from(config.as_deref())?;

            if json {
                println!("{}", serde_json::to_string_pretty(&cfg)?);
            } else if toml {
                println!("{}", ::toml::to_string_pretty(&cfg)?);
            } else {
                println!("📋 Schema Tool Configuration\n");
                println!("Schemas:");
                println!("  Path: {:?}", cfg.schemas.path);

                println!("\nLoader:");
                println!("  Allow untyped lists: {}", cfg.loader.allow_untyped_lists);

                println!("\nValidation:");
                println!("  Report extra columns: {}", cfg.validation.report_extra_columns);
                println!("  Fail on errors: {}", cfg.validation.fail_on_errors);

                println!("\nLogging:");
                println!("  Level: {}", cfg.logging.level);
                println!("  Format: {:?}", cfg.logging.format);
                if let Some(file) = &cfg.logging.file {
                    println!("  File: {:?}", file);
                }

                println!("\nOutput:");
                println!("  Format: {:?}", cfg.output.format);
            }
        }

        Commands::Init { output } => {
            let cfg = ValidatorConfig::default();
            cfg.save(&output)?;
            println!("✅ Created config file: {}", output);
        }

        Commands::Validate { config } => {
            let cfg = match ValidatorConfig::load_from(config.as_deref()) {
                Ok(cfg) => cfg,
                Err(e) => {
                    eprintln!("❌ Configuration error: {}", e);
                    std::process::exit(1);
                }
            };
            if let Err(e) = env_filter(&cfg.logging) {
                eprintln!("❌ Configuration error: {}", e);
                std::process::exit(1);
            }
            println!("✅ Configuration is valid");

            let options = cfg.validation_options();
            println!("   Extra columns reported: {}", options.report_extra_columns);

            let schemas = cfg.schemas_path();
            if !schemas.exists() {
                println!("⚠️  Schemas path {:?} does not exist", schemas);
                return Ok(());
            }

            let loader = SchemaLoader::with_options(cfg.load_options());
            let results = if schemas.is_dir() {
                loader.load_dir(&schemas)
            } else {
                vec![(schemas.clone(), loader.load_file(&schemas))]
            };

            let failed: Vec<_> = results.iter().filter(|(_, r)| r.is_err()).collect();
            println!(
                "   Schemas: {} of {} documents load from {:?}",
                results.len() - failed.len(),
                results.len(),
                schemas
            );
            for (file, result) in failed.iter() {
                if let Err(e) = result {
                    println!("   └─ {} - {}", file.display(), e);
                }
            }
            if !failed.is_empty() {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
