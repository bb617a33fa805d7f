//! Topic label normalization.
//!
//! Collapses near-duplicate topic phrases ("Python Programming", "Python")
//! into one canonical key so frequency counting is meaningful. A normalizer
//! is built from the full topic set of one clustering run and its output is
//! a pure function of that set.

use std::collections::{BTreeSet, HashMap};

/// Characters that may follow a prefix for it to count as a word boundary.
const WORD_BOUNDARIES: [char; 4] = [' ', '-', '_', '/'];

/// Canonical keys and display names for one topic set.
#[derive(Debug, Clone, Default)]
pub struct TopicNormalizer {
    /// Distinct lowercased topics, ordered by (length, lexical)
    candidates: Vec<String>,
    /// Number of distinct topics starting with each first word
    first_word_counts: HashMap<String, usize>,
    /// Lowercased topic to canonical key
    canonical: HashMap<String, String>,
    /// Canonical key to display name
    display: HashMap<String, String>,
}

impl TopicNormalizer {
    /// Build from every raw topic string of the run (duplicates allowed).
    pub fn new<'a, I>(raw_topics: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let originals: Vec<&str> = raw_topics
            .into_iter()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect();

        let distinct: BTreeSet<String> = originals.iter().map(|t| t.to_lowercase()).collect();
        let mut candidates: Vec<String> = distinct.into_iter().collect();
        candidates.sort_by(|a, b| {
            a.chars()
                .count()
                .cmp(&b.chars().count())
                .then_with(|| a.cmp(b))
        });

        let mut first_word_counts: HashMap<String, usize> = HashMap::new();
        for topic in &candidates {
            if let Some(first) = topic.split_whitespace().next() {
                *first_word_counts.entry(first.to_string()).or_insert(0) += 1;
            }
        }

        let mut normalizer = Self {
            candidates,
            first_word_counts,
            canonical: HashMap::new(),
            display: HashMap::new(),
        };

        let canonical: HashMap<String, String> = normalizer
            .candidates
            .iter()
            .map(|t| (t.clone(), normalizer.resolve(t)))
            .collect();
        normalizer.canonical = canonical;

        // Shortest original wins, ties lexical
        let mut sorted_originals = originals;
        sorted_originals.sort_by(|a, b| {
            a.chars()
                .count()
                .cmp(&b.chars().count())
                .then_with(|| a.cmp(b))
        });
        for original in sorted_originals {
            let key = normalizer.canonical(original);
            normalizer
                .display
                .entry(key)
                .or_insert_with(|| title_case(original));
        }

        normalizer
    }

    /// Canonical key for a topic string.
    pub fn canonical(&self, topic: &str) -> String {
        let lowered = topic.trim().to_lowercase();
        match self.canonical.get(&lowered) {
            Some(key) => key.clone(),
            None => self.resolve(&lowered),
        }
    }

    /// Canonical keys of one item's topics, deduplicated in first-seen order.
    pub fn canonical_set(&self, topics: &[String]) -> Vec<String> {
        let mut out: Vec<String> = Vec::with_capacity(topics.len());
        for topic in topics {
            if topic.trim().is_empty() {
                continue;
            }
            let key = self.canonical(topic);
            if !out.contains(&key) {
                out.push(key);
            }
        }
        out
    }

    /// Display name for a canonical key, if any original maps to it.
    pub fn display_name(&self, key: &str) -> Option<&str> {
        self.display.get(key).map(String::as_str)
    }

    /// Apply the collapse rules until the key stops changing.
    ///
    /// Every rule strictly shortens its input, so this terminates. Resolving
    /// chains ("machine learning basics" -> "machine learning" -> "machine")
    /// keeps canonical keys stable under renormalization.
    ///
    /// This groups more coarsely than a single collapse step would. One step
    /// maps "machine learning basics" to "machine learning" even when
    /// "machine" is also a topic; here it ends at "machine", and that single
    /// step would not be idempotent.
    fn resolve(&self, lowered: &str) -> String {
        let mut current = lowered.to_string();
        loop {
            let next = self.collapse_once(&current);
            if next == current {
                return current;
            }
            current = next;
        }
    }

    fn collapse_once(&self, topic: &str) -> String {
        // Prefix collapse against a shorter topic of the set
        for candidate in &self.candidates {
            if candidate.len() >= topic.len() {
                continue;
            }
            if let Some(rest) = topic.strip_prefix(candidate.as_str()) {
                if rest.starts_with(WORD_BOUNDARIES) {
                    return candidate.clone();
                }
            }
        }

        // First-word collapse when the first word is shared
        let mut words = topic.split_whitespace();
        if let (Some(first), Some(_)) = (words.next(), words.next()) {
            if self.first_word_counts.get(first).copied().unwrap_or(0) >= 2 {
                return first.to_string();
            }
        }

        topic.to_string()
    }
}

/// Title-case a label: uppercase letters that start a word, lowercase the rest.
///
/// A letter starts a word when the previous character is not a letter, so
/// "machine-learning" becomes "Machine-Learning" and "3d models" becomes
/// "3D Models".
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_letter = false;
    for ch in s.chars() {
        if ch.is_alphabetic() {
            if prev_letter {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            prev_letter = true;
        } else {
            out.push(ch);
            prev_letter = false;
        }
    }
    out
}
