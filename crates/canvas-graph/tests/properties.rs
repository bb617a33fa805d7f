use std::collections::{BTreeSet, HashSet};

use canvas_graph::{
    cosine_similarity, dbscan, pairwise_distances, DensityClusterer, DensityConfig,
    GraphAssembler, GraphExporter, TopicFrequencyClusterer, TopicNormalizer,
};
use canvas_types::Item;
use proptest::prelude::*;

const TOPICS: &[&str] = &[
    "Python",
    "Python Programming",
    "python basics",
    "Machine Learning",
    "Machine Learning Basics",
    "Rust",
    "rust-lang",
    "Cooking",
    "Data Science",
    "Data",
    "Web",
    "",
];

const CONTENT_TYPES: &[&str] = &["Article", "Tutorial", "Unknown", "Video"];

fn arb_item_parts() -> impl Strategy<Value = (Vec<usize>, usize, Option<Vec<f32>>)> {
    (
        prop::collection::vec(0..TOPICS.len(), 0..4),
        0..CONTENT_TYPES.len(),
        prop::option::of(prop::collection::vec(-1.0f32..1.0, 3)),
    )
}

fn arb_items(max: usize) -> impl Strategy<Value = Vec<Item>> {
    prop::collection::vec(arb_item_parts(), 0..max).prop_map(|parts| {
        parts
            .into_iter()
            .enumerate()
            .map(|(i, (topics, content_type, embedding))| {
                let mut item = Item::new(i as i64 + 1, format!("Item {}", i + 1))
                    .with_topics(topics.into_iter().map(|t| TOPICS[t]))
                    .with_content_type(CONTENT_TYPES[content_type]);
                item.embedding = embedding;
                item
            })
            .collect()
    })
}

// ── Topic clustering assigns every item to a dense id ──────────────────────

proptest! {
    #[test]
    fn topic_clustering_covers_every_item(items in arb_items(25)) {
        let assignments = TopicFrequencyClusterer::default().cluster(&items);
        prop_assert_eq!(assignments.len(), items.len());
        for item in &items {
            prop_assert!(assignments.contains_key(&item.id));
        }

        let ids: BTreeSet<u32> = assignments.values().map(|a| a.cluster_id).collect();
        let expected: BTreeSet<u32> = (1..=ids.len() as u32).collect();
        prop_assert_eq!(ids, expected);
    }

    #[test]
    fn normalizer_is_idempotent(picks in prop::collection::vec(0..TOPICS.len(), 1..10), query in "[a-z ]{0,20}") {
        let normalizer = TopicNormalizer::new(picks.iter().map(|&i| TOPICS[i]));
        for topic in picks.iter().map(|&i| TOPICS[i]).chain(std::iter::once(query.as_str())) {
            let once = normalizer.canonical(topic);
            prop_assert_eq!(normalizer.canonical(&once), once.clone());
        }
    }
}

// ── Cosine identities ──────────────────────────────────────────────────────

proptest! {
    #[test]
    fn cosine_is_symmetric_and_bounded(
        a in prop::collection::vec(-10.0f32..10.0, 1..16),
        b in prop::collection::vec(-10.0f32..10.0, 1..16),
    ) {
        let ab = cosine_similarity(&a, &b);
        let ba = cosine_similarity(&b, &a);
        prop_assert!((ab - ba).abs() < 1e-5);
        prop_assert!((-1.0..=1.0).contains(&ab));
        if a.len() != b.len() {
            prop_assert_eq!(ab, 0.0);
        }
    }

    #[test]
    fn cosine_self_is_one(a in prop::collection::vec(0.1f32..10.0, 1..16)) {
        prop_assert!((cosine_similarity(&a, &a) - 1.0).abs() < 1e-4);
    }
}

// ── Density clusters never contain noise or singletons ─────────────────────

proptest! {
    #[test]
    fn dbscan_clusters_have_core_support(
        points in prop::collection::vec(prop::collection::vec(-1.0f32..1.0, 2), 3..30),
        min_samples in 2usize..5,
    ) {
        let distances = pairwise_distances(&points);
        let labels = dbscan(&distances, 0.4, min_samples);
        prop_assert_eq!(labels.len(), points.len());

        // Labels are contiguous from 0
        let max_label = labels.iter().copied().max().unwrap_or(-1);
        for label in 0..=max_label {
            prop_assert!(labels.contains(&label));
        }

        // Noise points are never core points
        for (i, &label) in labels.iter().enumerate() {
            if label == -1 {
                let neighborhood = distances[i].iter().filter(|&&d| d <= 0.4).count();
                prop_assert!(neighborhood < min_samples);
            }
        }
    }

    #[test]
    fn density_summaries_have_members(items in arb_items(30)) {
        if let Ok(outcome) = DensityClusterer::new(DensityConfig::default()).cluster(&items) {
            let mut seen = HashSet::new();
            for cluster in &outcome.clusters {
                prop_assert!(cluster.content_count >= 2);
                prop_assert_eq!(cluster.items.len(), cluster.content_count);
                for id in &cluster.items {
                    prop_assert!(seen.insert(*id), "item {} in two clusters", id);
                    prop_assert!(!outcome.unclustered.contains(id));
                }
            }
            prop_assert_eq!(seen.len() + outcome.unclustered.len(), items.len());
        }
    }

    #[test]
    fn cluster_summaries_place_every_item_once(items in arb_items(30)) {
        prop_assume!(items.len() >= 3);
        let clusters = GraphExporter::offline().cluster_summaries(&items);
        let mut placed: Vec<i64> = clusters.iter().flat_map(|c| c.items.clone()).collect();
        placed.sort_unstable();
        let expected: Vec<i64> = items.iter().map(|i| i.id).collect();
        prop_assert_eq!(placed, expected);

        let ids: HashSet<u32> = clusters.iter().map(|c| c.id).collect();
        prop_assert_eq!(ids.len(), clusters.len());
    }
}

// ── Graph edges are simple and capped ──────────────────────────────────────

proptest! {
    #[test]
    fn general_graph_is_simple_and_capped(items in arb_items(25)) {
        let graph = GraphAssembler::default().general_graph(&items);
        prop_assert_eq!(graph.nodes.len(), items.len());
        prop_assert!(graph.edges.len() <= 3 * items.len());

        let mut pairs = HashSet::new();
        for edge in &graph.edges {
            prop_assert_ne!(edge.source, edge.target);
            prop_assert!(pairs.insert(edge.pair()));
            prop_assert!(edge.weight >= 1);
            prop_assert!((0.0..=1.0).contains(&edge.similarity));
        }
        for pair in graph.edges.windows(2) {
            prop_assert!(pair[0].similarity >= pair[1].similarity);
        }
    }

    #[test]
    fn clustered_graph_is_simple(items in arb_items(20)) {
        let assignments = TopicFrequencyClusterer::default().cluster(&items);
        let graph = GraphAssembler::default().cluster_graph(
            &items,
            &assignments,
            canvas_graph::ClusterMethod::TopicSpecificity,
            &[],
        );
        let mut pairs = HashSet::new();
        for edge in &graph.edges {
            prop_assert_ne!(edge.source, edge.target);
            prop_assert!(pairs.insert(edge.pair()));
        }
        for node in &graph.nodes {
            prop_assert!(node.cluster_id.is_some_and(|id| id >= 1));
        }
    }
}
