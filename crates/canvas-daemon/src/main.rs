//! MindCanvas command-line tool
//!
//! # Usage
//!
//! ```bash
//! canvas import items.json
//! canvas export-graph -o graph.json
//! canvas related 42 -n 5
//! canvas search "rust async runtimes"
//! ```
//!
//! # Configuration
//!
//! Configuration is loaded in order (later sources override earlier):
//! 1. Built-in defaults
//! 2. Config file (~/.config/mindcanvas/config.toml)
//! 3. Environment variables (CANVAS_*)
//! 4. CLI flags

use anyhow::Result;
use clap::Parser;

use canvas_daemon::{execute, init_logging, load_config, Cli};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    init_logging(&config.settings.log_level)?;

    let value = execute(cli.command, &config).await?;
    println!("{}", serde_json::to_string_pretty(&value)?);

    Ok(())
}
