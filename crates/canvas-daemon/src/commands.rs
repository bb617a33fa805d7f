//! Command implementations.
//!
//! Every command opens storage, builds the service from layered settings,
//! and returns a JSON value for the binary to print.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use serde_json::{json, Value};
use tracing::info;

use canvas_graph::{Graph, GraphConfig};
use canvas_service::KnowledgeService;
use canvas_storage::Storage;
use canvas_types::Settings;

use crate::cli::{Cli, Commands};

/// Settings after CLI overrides, plus the graph section.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub settings: Settings,
    pub graph: GraphConfig,
}

/// Load layered settings and apply CLI overrides (highest precedence).
pub fn load_config(cli: &Cli) -> Result<LoadedConfig> {
    let mut settings =
        Settings::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(db_path) = &cli.db_path {
        settings.db_path = db_path.clone();
    }
    if let Some(log_level) = &cli.log_level {
        settings.log_level = log_level.clone();
    }

    let graph: GraphConfig = Settings::load_section(cli.config.as_deref(), "graph")
        .context("Failed to load graph configuration")?;

    Ok(LoadedConfig { settings, graph })
}

/// Install the global tracing subscriber. `RUST_LOG` wins over `log_level`.
pub fn init_logging(log_level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;
    Ok(())
}

/// Open storage, creating parent directories if needed.
pub fn open_storage(settings: &Settings) -> Result<Arc<Storage>> {
    let db_path = settings.expanded_db_path();
    if let Some(parent) = db_path.parent() {
        fs::create_dir_all(parent).context("Failed to create database directory")?;
    }
    let storage = Storage::open(&db_path)
        .with_context(|| format!("Failed to open storage at {}", db_path.display()))?;
    Ok(Arc::new(storage))
}

/// Run one command against the configured collection.
pub async fn execute(command: Commands, config: &LoadedConfig) -> Result<Value> {
    // Refuse before touching storage
    if let Commands::Reset { yes: false } = command {
        bail!("Refusing to delete every item without --yes");
    }

    let storage = open_storage(&config.settings)?;
    let service = KnowledgeService::from_settings(storage, &config.settings, &config.graph)
        .context("Failed to initialize service")?;

    let value = match command {
        Commands::Import { path } => {
            let report = service
                .import_file(&path)
                .await
                .with_context(|| format!("Failed to import {}", path.display()))?;
            serde_json::to_value(report)?
        }
        Commands::ExportGraph { output } => {
            let graph = service.export_graph().await.context("Graph export failed")?;
            emit_graph(&graph, output.as_deref())?
        }
        Commands::ExportAll { output } => {
            let graph = service.export_all().await.context("Graph export failed")?;
            emit_graph(&graph, output.as_deref())?
        }
        Commands::Clusters => {
            let clusters = service.clusters().await.context("Clustering failed")?;
            json!({ "clusters": clusters, "total": clusters.len() })
        }
        Commands::Related { id, limit } => {
            let related = service.related(id, limit).await?;
            json!({ "related_content": related, "total": related.len(), "source_id": id })
        }
        Commands::Search { query, limit } => {
            let hits = service.semantic_search(&query, limit).await?;
            json!({ "results": hits, "total": hits.len(), "query": query })
        }
        Commands::Trending { limit } => {
            let trending = service.trending(limit).await?;
            json!({ "trending_topics": trending, "total": trending.len() })
        }
        Commands::Analytics => serde_json::to_value(service.analytics().await?)?,
        Commands::Recommendations { limit } => {
            let recommendations = service.recommendations(limit).await?;
            json!({ "recommendations": recommendations, "total": recommendations.len() })
        }
        Commands::Stats => serde_json::to_value(service.stats().await?)?,
        Commands::Reindex => {
            let report = service.reindex().await.context("Reindex failed")?;
            serde_json::to_value(report)?
        }
        Commands::Reset { .. } => {
            let removed = service.reset().await.context("Reset failed")?;
            json!({ "deleted": removed })
        }
    };

    Ok(value)
}

/// Return the graph, or write it to `output` and return a short receipt.
fn emit_graph(graph: &Graph, output: Option<&Path>) -> Result<Value> {
    let Some(path) = output else {
        return Ok(serde_json::to_value(graph)?);
    };

    let text = serde_json::to_string_pretty(graph)?;
    fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))?;
    info!(path = %path.display(), "Graph written");
    Ok(json!({
        "written": path.display().to_string(),
        "total_nodes": graph.metadata.total_nodes,
        "total_edges": graph.metadata.total_edges,
    }))
}
