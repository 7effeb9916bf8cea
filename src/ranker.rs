//! # Ranker
//!
//! Mood-aware vector-similarity ranking over the catalog. The catalog is
//! small by construction, so this is a full linear scan per query with no
//! index and no caching between calls.
//!
//! Scoring is cosine similarity plus an additive, mood-conditioned relevance
//! boost capped at 0.1. The boost is deliberately additive rather than a
//! multiplicative rerank: it can only reorder items whose raw similarities
//! are closer than the boost. Boosted scores may exceed 1.0; they are not
//! renormalized.
//!
//! Zero-norm vectors are not treated as exceptional: cosine similarity
//! against a zero vector is defined as `0.0`.

use std::{cmp::Ordering, sync::Arc};
use tracing::debug;

use crate::{
    catalog::{CatalogStore, ItemMetadata, ItemRecord},
    encoder::Encoder,
    error::EncodeError,
    mood::{Mood, enhance_query},
};

/// Per-term boost increment and the cap on the total per-record boost.
const BOOST_PER_TERM: f32 = 0.02;
const MAX_BOOST: f32 = 0.1;

/// One ranked catalog record with its boosted similarity score.
#[derive(Debug, Clone, Copy)]
pub struct SearchResult<'a> {
    pub record: &'a ItemRecord,
    pub score: f32,
}

/// Ranks catalog records against queries using the encoder collaborator.
pub struct Ranker<E> {
    catalog: Arc<CatalogStore>,
    encoder: E,
}

impl<E: Encoder> Ranker<E> {
    pub fn new(catalog: Arc<CatalogStore>, encoder: E) -> Self {
        Self { catalog, encoder }
    }

    pub fn catalog(&self) -> &CatalogStore {
        &self.catalog
    }

    /// Rank the whole catalog against `query` and return the best `top_k`
    /// records (all of them when `top_k` exceeds the catalog size).
    ///
    /// The query is mood-enhanced before encoding, every record gets a
    /// mood-conditioned boost, and ties preserve catalog order (stable sort),
    /// the only determinism guarantee when scores coincide.
    ///
    /// # Errors
    /// [`EncodeError`] if the encoder fails or returns a vector whose
    /// dimensionality doesn't match the catalog's.
    pub fn search(
        &self,
        query: &str,
        mood: Option<Mood>,
        top_k: usize,
    ) -> Result<Vec<SearchResult<'_>>, EncodeError> {
        let enhanced = enhance_query(query, mood);
        debug!("ranking query {enhanced:?} (mood: {mood:?})");

        let query_vector = self.encoder.encode(&enhanced)?;
        if !self.catalog.is_empty() && query_vector.len() != self.catalog.dimension() {
            return Err(EncodeError::DimensionMismatch {
                expected: self.catalog.dimension(),
                actual: query_vector.len(),
            });
        }

        let mut results: Vec<SearchResult<'_>> = self
            .catalog
            .records()
            .iter()
            .map(|record| {
                let mut score = cosine_similarity(&query_vector, &record.vector);
                if let Some(mood) = mood {
                    score += mood_boost(mood, &record.metadata);
                }
                SearchResult { record, score }
            })
            .collect();

        // Stable descending sort; NaN compares as equal so catalog order wins.
        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        results.truncate(top_k);
        Ok(results)
    }
}

/// Cosine similarity `dot(a, b) / (‖a‖ · ‖b‖)`.
///
/// Defined as `0.0` when either vector has zero norm.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Additive relevance boost: `0.02` per distinct preference term occurring as
/// a substring of the record's lowercase rendered metadata, capped at `0.1`.
pub fn mood_boost(mood: Mood, metadata: &ItemMetadata) -> f32 {
    let haystack = metadata.haystack();
    let matches = mood
        .preference_terms()
        .iter()
        .filter(|term| haystack.contains(*term))
        .count();
    (matches as f32 * BOOST_PER_TERM).min(MAX_BOOST)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{FieldText, ItemDetails};
    use std::collections::HashMap;

    /// Encoder returning canned vectors keyed by the exact input text.
    struct StubEncoder {
        vectors: HashMap<String, Vec<f32>>,
    }

    impl StubEncoder {
        fn new(entries: &[(&str, &[f32])]) -> Self {
            Self {
                vectors: entries
                    .iter()
                    .map(|(text, vector)| (text.to_string(), vector.to_vec()))
                    .collect(),
            }
        }
    }

    impl Encoder for StubEncoder {
        fn encode(&self, text: &str) -> Result<Vec<f32>, EncodeError> {
            self.vectors
                .get(text)
                .cloned()
                .ok_or_else(|| EncodeError::Inference(format!("no stub vector for {text:?}")))
        }
    }

    fn named(name: &str, category: &str) -> ItemMetadata {
        ItemMetadata {
            name: Some(name.to_string()),
            category: Some(category.to_string()),
            ..ItemMetadata::default()
        }
    }

    /// Unit vector at the angle whose cosine against [1, 0] is `cos`.
    fn unit(cos: f32) -> Vec<f32> {
        vec![cos, (1.0 - cos * cos).sqrt()]
    }

    fn menu_metadata() -> Vec<ItemMetadata> {
        let mut soup = named("Tomato Soup", "Soup");
        // "soup" and "hearty" match the sad terms: exactly two, boost 0.04.
        soup.original_data = Some(ItemDetails {
            description: Some("A hearty bowl of tomato goodness".into()),
            ingredients: Some(FieldText::List(vec!["tomato".into(), "basil".into()])),
            allergens: None,
            dietary_info: None,
        });
        vec![soup, named("Green Salad", "Salad"), named("Choco Cake", "Dessert")]
    }

    fn ranker(embeddings: Vec<Vec<f32>>, metadata: Vec<ItemMetadata>, encoder: StubEncoder) -> Ranker<StubEncoder> {
        let catalog = Arc::new(CatalogStore::from_parts(embeddings, metadata).unwrap());
        Ranker::new(catalog, encoder)
    }

    #[test]
    fn cosine_of_zero_vector_is_zero() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 0.0]), 0.0);
    }

    #[test]
    fn cosine_basics() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!((cosine_similarity(&[1.0, 0.0], &[0.0, 1.0])).abs() < 1e-6);
        assert!((cosine_similarity(&[1.0, 0.0], &[-2.0, 0.0]) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn boost_is_bounded_for_every_mood() {
        let rich = ItemMetadata {
            name: Some("Everything Bowl".into()),
            original_data: Some(ItemDetails {
                // Every preference term of every mood, so each mood counts
                // well past the cap.
                description: Some(
                    Mood::ALL
                        .iter()
                        .flat_map(|mood| mood.preference_terms().iter().copied())
                        .collect::<Vec<_>>()
                        .join(" "),
                ),
                ..ItemDetails::default()
            }),
            ..ItemMetadata::default()
        };
        let plain = named("Plain Rice", "Rice");
        for mood in Mood::ALL {
            let boost = mood_boost(mood, &rich);
            assert!((0.0..=0.1).contains(&boost), "{mood}: {boost}");
            assert_eq!(boost, 0.1, "{mood} should hit the cap");
            assert_eq!(mood_boost(mood, &plain), 0.0, "{mood} on unrelated item");
        }
    }

    #[test]
    fn boost_counts_distinct_terms() {
        let soup = &menu_metadata()[0];
        assert!((mood_boost(Mood::Sad, soup) - 0.04).abs() < 1e-6);
    }

    #[test]
    fn results_sorted_descending_with_stable_ties() {
        let encoder = StubEncoder::new(&[("anything", &[1.0, 0.0])]);
        // Records 0 and 1 are identical: tie broken by catalog order.
        let ranker = ranker(
            vec![unit(0.5), unit(0.5), unit(0.9)],
            vec![named("A", "X"), named("B", "X"), named("C", "X")],
            encoder,
        );
        let results = ranker.search("anything", None, 10).unwrap();
        let names: Vec<_> = results
            .iter()
            .map(|r| r.record.metadata.name.as_deref().unwrap())
            .collect();
        assert_eq!(names, ["C", "A", "B"]);
        for pair in results.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[test]
    fn top_k_truncates_and_saturates() {
        let encoder = StubEncoder::new(&[("q", &[1.0, 0.0])]);
        let ranker = ranker(
            vec![unit(0.1), unit(0.2), unit(0.3)],
            vec![named("A", "X"), named("B", "X"), named("C", "X")],
            encoder,
        );
        assert_eq!(ranker.search("q", None, 2).unwrap().len(), 2);
        // top_k beyond the catalog returns the whole catalog, fully ordered.
        let all = ranker.search("q", None, 50).unwrap();
        assert_eq!(all.len(), 3);
        let names: Vec<_> = all
            .iter()
            .map(|r| r.record.metadata.name.as_deref().unwrap())
            .collect();
        assert_eq!(names, ["C", "B", "A"]);
    }

    #[test]
    fn dimension_mismatch_is_reported() {
        let encoder = StubEncoder::new(&[("q", &[1.0, 0.0, 0.0])]);
        let ranker = ranker(
            vec![unit(0.5)],
            vec![named("A", "X")],
            encoder,
        );
        let err = ranker.search("q", None, 1).unwrap_err();
        assert!(matches!(
            err,
            EncodeError::DimensionMismatch {
                expected: 2,
                actual: 3
            }
        ));
    }

    // The sad-mood boost (0.04 for Tomato Soup) flips the order only when the
    // raw gap between Salad and Soup is smaller than the boost.
    #[test]
    fn sad_boost_flips_order_when_gap_is_small() {
        let enhanced = "I want something comfort food warm hearty";
        let encoder = StubEncoder::new(&[(enhanced, &[1.0, 0.0])]);
        let ranker = ranker(
            vec![unit(0.93), unit(0.95), unit(0.10)],
            menu_metadata(),
            encoder,
        );
        let results = ranker.search("I want something", Some(Mood::Sad), 3).unwrap();
        let names: Vec<_> = results
            .iter()
            .map(|r| r.record.metadata.name.as_deref().unwrap())
            .collect();
        assert_eq!(names, ["Tomato Soup", "Green Salad", "Choco Cake"]);
        assert!((results[0].score - 0.97).abs() < 1e-3);
    }

    #[test]
    fn sad_boost_keeps_order_when_gap_is_large() {
        let enhanced = "I want something comfort food warm hearty";
        let encoder = StubEncoder::new(&[(enhanced, &[1.0, 0.0])]);
        let ranker = ranker(
            vec![unit(0.93), unit(0.98), unit(0.10)],
            menu_metadata(),
            encoder,
        );
        let results = ranker.search("I want something", Some(Mood::Sad), 3).unwrap();
        let names: Vec<_> = results
            .iter()
            .map(|r| r.record.metadata.name.as_deref().unwrap())
            .collect();
        assert_eq!(names, ["Green Salad", "Tomato Soup", "Choco Cake"]);
    }

    #[test]
    fn no_mood_means_no_boost() {
        let encoder = StubEncoder::new(&[("I want something", &[1.0, 0.0])]);
        let ranker = ranker(
            vec![unit(0.93), unit(0.95), unit(0.10)],
            menu_metadata(),
            encoder,
        );
        let results = ranker.search("I want something", None, 3).unwrap();
        let names: Vec<_> = results
            .iter()
            .map(|r| r.record.metadata.name.as_deref().unwrap())
            .collect();
        assert_eq!(names, ["Green Salad", "Tomato Soup", "Choco Cake"]);
    }
}
