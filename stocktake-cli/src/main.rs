use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::path::PathBuf;
use stocktake_config::{ConfigLoader, LogFormat, StocktakeConfig};
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands, ConfigCommands};
use commands::console::{run_console, ConsoleOptions};

/// Load configuration from file or use defaults
fn load_config(config_path: Option<&PathBuf>) -> Result<StocktakeConfig> {
    let loader = ConfigLoader::new();

    match config_path {
        Some(path) => {
            if path.exists() {
                info!("Loading configuration from: {:?}", path);
                loader
                    .from_file(path)
                    .context(format!("Failed to load configuration from {:?}", path))
            } else {
                warn!("Configuration file not found: {:?}. Using defaults.", path);
                loader
                    .from_env()
                    .context("Failed to load configuration from environment")
            }
        }
        None => {
            debug!("No configuration file specified. Loading from environment or defaults.");
            loader
                .from_env()
                .context("Failed to load configuration from environment")
        }
    }
}

/// Initialize tracing from config with CLI and environment overrides.
///
/// Precedence: `--log-level` flag, then `RUST_LOG`, then the configured level.
fn init_tracing(config: &StocktakeConfig, log_level: Option<&String>) -> Result<()> {
    let env_filter = match log_level {
        Some(level) => EnvFilter::try_new(level).unwrap_or_else(|_| {
            eprintln!("Invalid log level '{}', falling back to 'info'", level);
            EnvFilter::new("info")
        }),
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config.logging.level.as_str())),
    };

    let builder = tracing_subscriber::fmt().with_env_filter(env_filter);
    match config.logging.format {
        LogFormat::Pretty => builder.init(),
        LogFormat::Compact => builder.compact().init(),
        LogFormat::Json => builder.json().init(),
    }

    debug!("Tracing initialized");
    Ok(())
}

/// Handle configuration validation
fn handle_config_validate(config_file: &PathBuf) -> Result<()> {
    info!("Validating configuration file: {:?}", config_file);

    if !config_file.exists() {
        return Err(anyhow::anyhow!(
            "Configuration file not found: {:?}",
            config_file
        ));
    }

    match load_config(Some(config_file)) {
        Ok(_config) => {
            println!("✅ Configuration file is valid");
            info!("Configuration validation passed");
            Ok(())
        }
        Err(e) => {
            println!("❌ Configuration validation failed: {}", e);
            error!("Configuration validation failed: {}", e);
            Err(e)
        }
    }
}

/// Handle configuration generation
fn handle_config_generate(output: &PathBuf, force: bool) -> Result<()> {
    info!("Generating sample configuration at: {:?}", output);

    if output.exists() && !force {
        return Err(anyhow::anyhow!(
            "Output file already exists: {:?}. Use --force to overwrite.",
            output
        ));
    }

    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent).context("Failed to create output directory")?;
    }

    fs::write(output, StocktakeConfig::generate_sample())
        .context("Failed to write configuration file")?;

    println!("✅ Sample configuration generated at: {:?}", output);
    println!("📝 Edit the file to point at your backend and identity provider");
    println!(
        "🔧 Validate with: stocktake config validate --config-file {:?}",
        output
    );

    Ok(())
}

/// Handle configuration display
fn handle_config_show(config_file: Option<&PathBuf>, format: &str) -> Result<()> {
    info!("Showing configuration (format: {})", format);

    let config = load_config(config_file)?;

    match format.to_lowercase().as_str() {
        "yaml" | "yml" => {
            let yaml_output =
                serde_yaml::to_string(&config).context("Failed to serialize to YAML")?;
            println!("{}", yaml_output);
        }
        "json" => {
            let json_output =
                serde_json::to_string_pretty(&config).context("Failed to serialize to JSON")?;
            println!("{}", json_output);
        }
        _ => {
            return Err(anyhow::anyhow!(
                "Unknown output format: {}. Valid formats: yaml, json",
                format
            ));
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_ref())?;
    init_tracing(&config, cli.log_level.as_ref())?;

    match &cli.command {
        Some(Commands::Console {
            script,
            history_file,
        }) => {
            info!("Starting Stocktake console");
            let mut config = config;
            if let Some(path) = history_file {
                config.console.history_file = Some(path.clone());
            }
            let options = ConsoleOptions {
                script_file: script.clone(),
            };
            run_console(config, options).await
        }
        Some(Commands::Config { config_cmd }) => match config_cmd {
            ConfigCommands::Validate { config_file } => handle_config_validate(config_file),
            ConfigCommands::Generate { output, force } => handle_config_generate(output, *force),
            ConfigCommands::Show {
                config_file,
                format,
            } => handle_config_show(config_file.as_ref(), format),
        },
        None => {
            // If no subcommand is provided, print help
            use clap::CommandFactory;
            let mut cmd = Cli::command();
            cmd.print_help().context("Failed to print help")?;
            println!();
            Ok(())
        }
    }
}
