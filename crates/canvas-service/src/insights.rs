//! Collection-level summaries: trending topics, analytics, recommendations
//! and stats.
//!
//! Pure functions over an item snapshot.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use canvas_types::{Item, ItemId};

/// Minimum quality score for a recommendation.
pub const RECOMMENDATION_MIN_QUALITY: u8 = 7;

/// A topic with its frequency across the collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendingTopic {
    pub topic: String,
    pub count: usize,
    /// Mean quality of items carrying the topic, one decimal
    pub average_quality: f64,
}

/// Totals by processing method and content type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Analytics {
    pub total_content: usize,
    pub by_processing_method: BTreeMap<String, usize>,
    pub by_content_type: BTreeMap<String, usize>,
    /// Two decimals; 0 for an empty collection
    pub average_quality: f64,
}

/// A high-quality item worth revisiting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub id: ItemId,
    pub url: String,
    pub title: String,
    pub summary: String,
    pub content_type: String,
    pub quality_score: u8,
}

/// Collection counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionStats {
    pub total_items: usize,
    pub embedded_items: usize,
    pub distinct_topics: usize,
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Raw topic occurrences, most frequent first. Ties keep first-seen order.
pub fn trending_topics(items: &[Item], limit: usize) -> Vec<TrendingTopic> {
    // (topic, count, quality sum)
    let mut tallies: Vec<(&str, usize, u32)> = Vec::new();
    for item in items {
        for topic in &item.topics {
            match tallies.iter_mut().find(|(t, _, _)| *t == topic.as_str()) {
                Some((_, count, quality)) => {
                    *count += 1;
                    *quality += u32::from(item.quality_score);
                }
                None => tallies.push((topic.as_str(), 1, u32::from(item.quality_score))),
            }
        }
    }

    tallies.sort_by(|a, b| b.1.cmp(&a.1));
    tallies
        .into_iter()
        .take(limit)
        .map(|(topic, count, quality)| TrendingTopic {
            topic: topic.to_string(),
            count,
            average_quality: round_to(f64::from(quality) / count as f64, 1),
        })
        .collect()
}

pub fn analytics(items: &[Item]) -> Analytics {
    if items.is_empty() {
        return Analytics::default();
    }

    let mut result = Analytics {
        total_content: items.len(),
        ..Default::default()
    };
    let mut quality_sum = 0u32;
    for item in items {
        let method = item
            .processing_method
            .clone()
            .unwrap_or_else(|| "unknown".to_string());
        *result.by_processing_method.entry(method).or_insert(0) += 1;
        *result
            .by_content_type
            .entry(item.content_type.clone())
            .or_insert(0) += 1;
        quality_sum += u32::from(item.quality_score);
    }
    result.average_quality = round_to(f64::from(quality_sum) / items.len() as f64, 2);
    result
}

/// Items at or above the recommendation quality, best first.
pub fn recommendations(items: &[Item], limit: usize) -> Vec<Recommendation> {
    let mut picks: Vec<&Item> = items
        .iter()
        .filter(|item| item.quality_score >= RECOMMENDATION_MIN_QUALITY)
        .collect();
    picks.sort_by(|a, b| b.quality_score.cmp(&a.quality_score));

    picks
        .into_iter()
        .take(limit)
        .map(|item| Recommendation {
            id: item.id,
            url: item.url.clone(),
            title: item.title.clone(),
            summary: item.summary.clone(),
            content_type: item.content_type.clone(),
            quality_score: item.quality_score,
        })
        .collect()
}

pub fn collection_stats(items: &[Item]) -> CollectionStats {
    let topics: HashSet<&str> = items
        .iter()
        .flat_map(|item| item.topics.iter().map(String::as_str))
        .collect();
    CollectionStats {
        total_items: items.len(),
        embedded_items: items.iter().filter(|item| item.has_embedding()).count(),
        distinct_topics: topics.len(),
    }
}
