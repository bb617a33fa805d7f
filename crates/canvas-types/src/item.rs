//! Processed content items.
//!
//! An item is one browsing-history page after extraction and summarization.
//! Items are the nodes of the knowledge graph.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Storage-assigned item identifier.
pub type ItemId = i64;

/// Content type used when the upstream step produced none.
pub const UNKNOWN_CONTENT_TYPE: &str = "Unknown";

/// Quality score used when the upstream step produced none.
pub const DEFAULT_QUALITY_SCORE: u8 = 5;

fn default_content_type() -> String {
    UNKNOWN_CONTENT_TYPE.to_string()
}

fn default_quality_score() -> u8 {
    DEFAULT_QUALITY_SCORE
}

/// A processed content record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Unique identifier, assigned at storage time
    pub id: ItemId,
    /// Page title
    pub title: String,
    /// AI-generated summary
    #[serde(default)]
    pub summary: String,
    /// Short topic tags (0-5 typical)
    #[serde(default)]
    pub topics: Vec<String>,
    /// Content type label (e.g. "Article", "Tutorial")
    #[serde(default = "default_content_type")]
    pub content_type: String,
    /// Quality score 1-10
    #[serde(default = "default_quality_score")]
    pub quality_score: u8,
    /// Embedding vector, absent when generation failed or never ran
    #[serde(default)]
    pub embedding: Option<Vec<f32>>,
    /// Source URL
    #[serde(default)]
    pub url: String,
    /// How the summary was produced (e.g. "ai_batch", "basic")
    #[serde(default)]
    pub processing_method: Option<String>,
    /// When the page was visited
    #[serde(default)]
    pub visit_timestamp: Option<DateTime<Utc>>,
}

impl Item {
    /// Create an item with only an id and title.
    pub fn new(id: ItemId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            summary: String::new(),
            topics: Vec::new(),
            content_type: default_content_type(),
            quality_score: DEFAULT_QUALITY_SCORE,
            embedding: None,
            url: String::new(),
            processing_method: None,
            visit_timestamp: None,
        }
    }

    /// Build an item from a not-yet-stored record.
    pub fn from_new(id: ItemId, record: NewItem) -> Self {
        Self {
            id,
            title: record.title,
            summary: record.summary,
            topics: record.topics,
            content_type: record.content_type,
            quality_score: record.quality_score.clamp(1, 10),
            embedding: record.embedding,
            url: record.url,
            processing_method: record.processing_method,
            visit_timestamp: record.visit_timestamp,
        }
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    pub fn with_topics<I, S>(mut self, topics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.topics = topics.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    /// Set the quality score, clamped to 1-10.
    pub fn with_quality(mut self, quality_score: u8) -> Self {
        self.quality_score = quality_score.clamp(1, 10);
        self
    }

    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = Some(embedding);
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// The embedding if present and non-empty.
    pub fn embedding(&self) -> Option<&[f32]> {
        self.embedding.as_deref().filter(|e| !e.is_empty())
    }

    /// Check whether the item carries a usable embedding.
    pub fn has_embedding(&self) -> bool {
        self.embedding().is_some()
    }

    /// Text fed to the embedding provider.
    pub fn embedding_text(&self) -> String {
        format!("{} {}", self.title, self.summary)
    }

    /// Check whether the content type is a real label.
    pub fn has_known_content_type(&self) -> bool {
        !self.content_type.is_empty() && self.content_type != UNKNOWN_CONTENT_TYPE
    }
}

/// An item record before an id has been assigned.
///
/// This is the shape accepted by bulk import.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewItem {
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default = "default_content_type")]
    pub content_type: String,
    #[serde(default = "default_quality_score")]
    pub quality_score: u8,
    #[serde(default)]
    pub embedding: Option<Vec<f32>>,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub processing_method: Option<String>,
    #[serde(default)]
    pub visit_timestamp: Option<DateTime<Utc>>,
}

impl NewItem {
    /// Create a record with only a title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            summary: String::new(),
            topics: Vec::new(),
            content_type: default_content_type(),
            quality_score: DEFAULT_QUALITY_SCORE,
            embedding: None,
            url: String::new(),
            processing_method: None,
            visit_timestamp: None,
        }
    }
}
