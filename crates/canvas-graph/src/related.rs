//! Nearest neighbors by embedding.

use serde::{Deserialize, Serialize};

use canvas_types::{Item, ItemId};

use crate::config::{RelatedConfig, SearchConfig};
use crate::similarity::{cosine_similarity, round_to};

/// A neighbor of a source item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelatedItem {
    pub id: ItemId,
    pub title: String,
    pub content_type: String,
    pub quality_score: u8,
    pub similarity: f32,
}

/// A semantic search result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub item: Item,
    /// Rounded to three decimals
    pub similarity: f32,
}

/// Ranks items by cosine similarity to a source item or a query vector.
#[derive(Debug, Clone, Default)]
pub struct RelatedItemFinder {
    related: RelatedConfig,
    search: SearchConfig,
}

impl RelatedItemFinder {
    pub fn new(related: RelatedConfig, search: SearchConfig) -> Self {
        Self { related, search }
    }

    /// Items most similar to `source_id`, strictly above the threshold.
    ///
    /// Empty when the source is missing or has no embedding.
    pub fn find(
        &self,
        items: &[Item],
        source_id: ItemId,
        limit: Option<usize>,
    ) -> Vec<RelatedItem> {
        let Some(source) = items
            .iter()
            .find(|item| item.id == source_id)
            .and_then(Item::embedding)
        else {
            return Vec::new();
        };

        let mut related: Vec<RelatedItem> = items
            .iter()
            .filter(|item| item.id != source_id)
            .filter_map(|item| {
                let similarity = cosine_similarity(source, item.embedding()?);
                (similarity > self.related.threshold).then(|| RelatedItem {
                    id: item.id,
                    title: item.title.clone(),
                    content_type: item.content_type.clone(),
                    quality_score: item.quality_score,
                    similarity,
                })
            })
            .collect();

        related.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
        related.truncate(limit.unwrap_or(self.related.limit));
        related
    }

    /// Items similar to a query embedding, at or above the threshold.
    pub fn search(&self, items: &[Item], query: &[f32], limit: Option<usize>) -> Vec<SearchHit> {
        let mut hits: Vec<(f32, &Item)> = items
            .iter()
            .filter_map(|item| {
                let similarity = cosine_similarity(query, item.embedding()?);
                (similarity >= self.search.threshold).then_some((similarity, item))
            })
            .collect();

        hits.sort_by(|a, b| b.0.total_cmp(&a.0));
        hits.truncate(limit.unwrap_or(self.search.limit));
        hits.into_iter()
            .map(|(similarity, item)| SearchHit {
                item: item.clone(),
                similarity: round_to(f64::from(similarity), 3) as f32,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items() -> Vec<Item> {
        vec![
            Item::new(1, "Source").with_embedding(vec![1.0, 0.0]),
            Item::new(2, "Close").with_embedding(vec![0.9, 0.1]),
            Item::new(3, "Far").with_embedding(vec![0.0, 1.0]),
            Item::new(4, "Medium").with_embedding(vec![0.6, 0.8]),
            Item::new(5, "No embedding"),
        ]
    }

    #[test]
    fn test_find_ranks_and_filters() {
        let related = RelatedItemFinder::default().find(&items(), 1, None);
        let ids: Vec<ItemId> = related.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![2, 4]);
        assert!(related[0].similarity > related[1].similarity);
    }

    #[test]
    fn test_find_missing_source() {
        let finder = RelatedItemFinder::default();
        assert!(finder.find(&items(), 99, None).is_empty());
        assert!(finder.find(&items(), 5, None).is_empty());
    }

    #[test]
    fn test_find_respects_limit() {
        let finder = RelatedItemFinder::new(
            RelatedConfig {
                limit: 1,
                ..Default::default()
            },
            SearchConfig::default(),
        );
        assert_eq!(finder.find(&items(), 1, None).len(), 1);
        assert_eq!(finder.find(&items(), 1, Some(2)).len(), 2);
    }

    #[test]
    fn test_search_includes_source_and_rounds() {
        let hits = RelatedItemFinder::default().search(&items(), &[1.0, 0.0], None);
        assert_eq!(hits[0].item.id, 1);
        assert!((hits[0].similarity - 1.0).abs() < 1e-6);
        assert_eq!(hits.len(), 3);
        assert!((hits[2].similarity - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_search_dimension_mismatch_skipped() {
        let hits = RelatedItemFinder::default().search(&items(), &[1.0, 0.0, 0.0], Some(5));
        assert!(hits.is_empty());
    }
}
