//! Canvas CLI library exports.
//!
//! # Modules
//!
//! - `cli`: Command-line argument parsing with clap
//! - `commands`: Command implementations over the knowledge service

pub mod cli;
pub mod commands;

pub use cli::{Cli, Commands};
pub use commands::{execute, init_logging, load_config, open_storage, LoadedConfig};
