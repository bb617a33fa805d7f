//! CLI argument parsing for the canvas tool.
//!
//! CLI flags override every other config source.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// MindCanvas knowledge graph tool
///
/// Builds clustered knowledge graphs from processed browsing history.
#[derive(Parser, Debug)]
#[command(name = "canvas")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to config file (overrides default ~/.config/mindcanvas/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    /// Override database path
    #[arg(long, global = true)]
    pub db_path: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Tool commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Import items from a JSON array of records
    Import {
        /// File to read
        path: PathBuf,
    },

    /// Export the clustered knowledge graph
    ExportGraph {
        /// Write the graph here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Export the graph with pairwise topic, semantic and content-type edges
    ExportAll {
        /// Write the graph here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show density cluster summaries
    Clusters,

    /// Find items related to one item
    Related {
        /// Item id
        id: i64,

        /// Maximum results
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },

    /// Search items by meaning
    Search {
        /// Free-text query
        query: String,

        /// Maximum results
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },

    /// Most frequent topics
    Trending {
        /// Maximum results
        #[arg(short = 'n', long, default_value = "15")]
        limit: usize,
    },

    /// Totals by processing method and content type
    Analytics,

    /// High-quality items worth revisiting
    Recommendations {
        /// Maximum results
        #[arg(short = 'n', long, default_value = "10")]
        limit: usize,
    },

    /// Show collection statistics
    Stats,

    /// Regenerate embeddings for every item
    Reindex,

    /// Delete every item
    Reset {
        /// Confirm deletion
        #[arg(long)]
        yes: bool,
    },
}
