//! Topic-frequency clustering.
//!
//! Groups items by their most widely shared specific topic. Used when
//! embeddings are unavailable and to place items the oracle skipped.

use std::collections::{BTreeSet, HashMap};

use tracing::debug;

use canvas_types::{Item, ItemId};

use crate::config::TopicClusterConfig;
use crate::normalizer::{title_case, TopicNormalizer};
use crate::types::{Assignments, ClusterAssignment};

/// Clusters items by canonical topic frequency.
#[derive(Debug, Clone, Default)]
pub struct TopicFrequencyClusterer {
    config: TopicClusterConfig,
}

impl TopicFrequencyClusterer {
    pub fn new(config: TopicClusterConfig) -> Self {
        Self { config }
    }

    /// Assign every item to exactly one cluster.
    ///
    /// Never fails; an empty slice yields an empty map.
    pub fn cluster(&self, items: &[Item]) -> Assignments {
        if items.is_empty() {
            return Assignments::new();
        }

        let normalizer = TopicNormalizer::new(
            items
                .iter()
                .flat_map(|item| item.topics.iter().map(String::as_str)),
        );

        let item_keys: Vec<Vec<String>> = items
            .iter()
            .map(|item| normalizer.canonical_set(&item.topics))
            .collect();

        // Distinct items per canonical key
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for keys in &item_keys {
            for key in keys {
                *counts.entry(key.as_str()).or_insert(0) += 1;
            }
        }

        let max_support = self.config.max_support_for(items.len());
        let is_group_forming = |key: &str| {
            counts
                .get(key)
                .is_some_and(|c| *c >= self.config.min_support && *c <= max_support)
        };

        // Highest count wins, ties go to the lexically greatest key
        let best_of = |candidates: &mut dyn Iterator<Item = &String>| -> Option<String> {
            candidates
                .max_by(|a, b| {
                    let ca = counts.get(a.as_str()).copied().unwrap_or(0);
                    let cb = counts.get(b.as_str()).copied().unwrap_or(0);
                    ca.cmp(&cb).then_with(|| a.cmp(b))
                })
                .cloned()
        };

        let group_keys: Vec<Vec<&String>> = item_keys
            .iter()
            .map(|keys| keys.iter().filter(|k| is_group_forming(k)).collect())
            .collect();

        // (key, from content type)
        let mut chosen: Vec<(String, bool)> = items
            .iter()
            .zip(&group_keys)
            .map(|(item, groups)| {
                if let Some(best) = best_of(&mut groups.iter().copied()) {
                    return (best, false);
                }
                match item.topics.iter().find(|t| !t.trim().is_empty()) {
                    Some(first) => (normalizer.canonical(first), false),
                    None => (content_type_key(item), true),
                }
            })
            .collect();

        // Single pass singleton repair; sizes are taken before any move
        let mut sizes: HashMap<&str, usize> = HashMap::new();
        for (key, _) in &chosen {
            *sizes.entry(key.as_str()).or_insert(0) += 1;
        }
        let singletons: BTreeSet<String> = sizes
            .into_iter()
            .filter(|(_, size)| *size == 1)
            .map(|(key, _)| key.to_string())
            .collect();

        let mut merged = 0usize;
        for (slot, groups) in chosen.iter_mut().zip(&group_keys) {
            if !singletons.contains(&slot.0) {
                continue;
            }
            let current = slot.0.clone();
            let mut alternatives = groups.iter().copied().filter(|k| **k != current);
            if let Some(alt) = best_of(&mut alternatives) {
                *slot = (alt, false);
                merged += 1;
            }
        }

        // Dense ids over sorted distinct keys
        let distinct: BTreeSet<&str> = chosen.iter().map(|(k, _)| k.as_str()).collect();
        let ids: HashMap<&str, u32> = distinct
            .iter()
            .enumerate()
            .map(|(i, key)| (*key, i as u32 + 1))
            .collect();

        debug!(
            items = items.len(),
            clusters = ids.len(),
            singletons_merged = merged,
            "Topic clustering complete"
        );

        items
            .iter()
            .zip(&chosen)
            .map(|(item, (key, from_content_type))| {
                let name = if *from_content_type {
                    title_case(key)
                } else {
                    normalizer
                        .display_name(key)
                        .map(str::to_string)
                        .unwrap_or_else(|| title_case(key))
                };
                let id = ids.get(key.as_str()).copied().unwrap_or(0);
                (item.id, ClusterAssignment::new(name, id))
            })
            .collect()
    }
}

fn content_type_key(item: &Item) -> String {
    let lowered = item.content_type.trim().to_lowercase();
    if lowered.is_empty() {
        "general".to_string()
    } else {
        lowered
    }
}

/// Members of each cluster id, for inspection and tests.
pub fn members_by_cluster(assignments: &Assignments) -> HashMap<u32, Vec<ItemId>> {
    let mut out: HashMap<u32, Vec<ItemId>> = HashMap::new();
    for (id, assignment) in assignments {
        out.entry(assignment.cluster_id).or_default().push(*id);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: ItemId, topics: &[&str]) -> Item {
        Item::new(id, format!("Item {}", id)).with_topics(topics.iter().copied())
    }

    fn clusterer() -> TopicFrequencyClusterer {
        TopicFrequencyClusterer::default()
    }

    #[test]
    fn test_empty_input() {
        assert!(clusterer().cluster(&[]).is_empty());
    }

    #[test]
    fn test_python_and_machine_learning() {
        let items = vec![
            item(1, &["Python Programming"]),
            item(2, &["Python"]),
            item(3, &["Machine Learning"]),
        ];
        let result = clusterer().cluster(&items);

        assert_eq!(result.len(), 3);
        assert_eq!(result[&1], result[&2]);
        assert_eq!(result[&1].cluster_name, "Python");
        assert_eq!(result[&3].cluster_name, "Machine Learning");
        assert_ne!(result[&1].cluster_id, result[&3].cluster_id);
    }

    #[test]
    fn test_dense_ids_follow_sorted_keys() {
        let items = vec![
            item(1, &["zeta"]),
            item(2, &["zeta"]),
            item(3, &["alpha"]),
            item(4, &["alpha"]),
        ];
        let result = clusterer().cluster(&items);
        assert_eq!(result[&3].cluster_id, 1);
        assert_eq!(result[&1].cluster_id, 2);
    }

    #[test]
    fn test_generic_topic_excluded() {
        // "programming" is in every item, so it cannot form a group
        let items = vec![
            item(1, &["programming", "rust"]),
            item(2, &["programming", "rust"]),
            item(3, &["programming", "go"]),
            item(4, &["programming", "go"]),
        ];
        let result = clusterer().cluster(&items);
        assert_eq!(result[&1].cluster_name, "Rust");
        assert_eq!(result[&3].cluster_name, "Go");
        assert_ne!(result[&1].cluster_id, result[&3].cluster_id);
    }

    #[test]
    fn test_most_frequent_group_topic_wins() {
        let items = vec![
            item(1, &["web", "css"]),
            item(2, &["web"]),
            item(3, &["web"]),
            item(4, &["css"]),
            item(5, &["databases"]),
            item(6, &["databases"]),
            item(7, &["databases"]),
        ];
        let result = clusterer().cluster(&items);
        // web appears in 3 items, css in 2
        assert_eq!(result[&1].cluster_name, "Web");
    }

    #[test]
    fn test_tie_breaks_to_greatest_key() {
        let items = vec![
            item(1, &["alpha", "beta"]),
            item(2, &["alpha"]),
            item(3, &["beta"]),
            item(4, &["gamma"]),
            item(5, &["gamma"]),
        ];
        let result = clusterer().cluster(&items);
        assert_eq!(result[&1].cluster_name, "Beta");
    }

    #[test]
    fn test_content_type_fallback() {
        let items = vec![
            item(1, &[]).with_content_type("Tutorial"),
            item(2, &[]).with_content_type("Tutorial"),
            item(3, &[]),
        ];
        let result = clusterer().cluster(&items);
        assert_eq!(result[&1].cluster_name, "Tutorial");
        assert_eq!(result[&1], result[&2]);
        assert_eq!(result[&3].cluster_name, "Unknown");
    }

    #[test]
    fn test_singleton_without_alternative_stands() {
        let items = vec![
            item(1, &["gamma"]),
            item(2, &["gamma"]),
            item(3, &["gamma", "beta"]),
            item(4, &["beta", "delta"]),
            item(5, &["delta", "beta"]),
            item(6, &["zzz"]),
        ];
        let result = clusterer().cluster(&items);
        // beta (3 items) outranks delta (2 items)
        assert_eq!(result[&4].cluster_name, "Beta");
        assert_eq!(result[&5].cluster_name, "Beta");
        // no alternative: singleton stands
        assert_eq!(result[&6].cluster_name, "Zzz");
    }

    #[test]
    fn test_singleton_with_alternative_moves() {
        // Item 3's best key "rust" is used by no other item once item 1 and 2
        // choose "python"; it moves to its other group-forming key.
        let items = vec![
            item(1, &["python", "rust"]),
            item(2, &["python"]),
            item(3, &["rust", "go"]),
            item(4, &["go"]),
            item(5, &["python"]),
            item(6, &["other"]),
            item(7, &["misc"]),
            item(8, &["misc"]),
        ];
        let result = clusterer().cluster(&items);
        // python=3, rust=2, go=2, misc=2; item 3 ties rust/go -> "rust"
        // "rust" holds only item 3, so it moves to "go" with item 4
        assert_eq!(result[&3], result[&4]);
        assert_eq!(result[&3].cluster_name, "Go");
    }

    #[test]
    fn test_every_item_assigned_once() {
        let items: Vec<Item> = (1..=20)
            .map(|i| item(i, &[["a", "b", "c", "d"][(i % 4) as usize]]))
            .collect();
        let result = clusterer().cluster(&items);
        assert_eq!(result.len(), 20);
        let members = members_by_cluster(&result);
        let total: usize = members.values().map(Vec::len).sum();
        assert_eq!(total, 20);
        assert_eq!(members.len(), 4);
    }
}
