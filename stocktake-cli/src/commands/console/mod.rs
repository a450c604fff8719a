//! Console command implementation
//!
//! Provides an interactive REPL console for Stocktake administration

use anyhow::Result;
use std::path::PathBuf;
use stocktake_config::StocktakeConfig;

pub mod command_registry;
pub mod command_trait;
pub mod commands;
pub mod formatter;
pub mod parser;
pub mod repl;

use repl::StocktakeConsole;

/// Options passed from the command line, separate from the config file
#[derive(Debug, Clone, Default)]
pub struct ConsoleOptions {
    pub script_file: Option<PathBuf>,
}

/// Main entry point for the console command
pub async fn run_console(config: StocktakeConfig, options: ConsoleOptions) -> Result<()> {
    let mut console = StocktakeConsole::new(config, options)?;
    console.run().await
}
