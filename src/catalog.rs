//! # Catalog store
//!
//! The catalog is the fixed, pre-indexed set of menu items the chatbot ranks
//! against. It is produced offline by the menu ingestion pipeline and consumed
//! here as a single JSON document with two parallel arrays:
//!
//! ```json
//! {
//!   "embeddings": [[0.12, -0.08, ...], ...],
//!   "metadata":   [{"name": "Tomato Soup", "category": "Soup", "price": 180,
//!                   "original_data": {"description": "...", "ingredients": [...]}},
//!                  ...]
//! }
//! ```
//!
//! `embeddings[i]` corresponds to `metadata[i]`; the item's id is its index.
//! The store is loaded once at startup, validated (equal counts, uniform
//! vector dimension), and never mutated. It can be shared read-only across any
//! number of sessions behind an `Arc`.
//!
//! Prices arrive from the pipeline as either JSON numbers or strings; they are
//! normalized into a single textual representation at this boundary so the
//! ranker and formatter never see the ambiguity.

use serde::{Deserialize, Deserializer, Serialize};
use std::{fs, path::Path};

use crate::error::LoadError;

/// A metadata field that the ingestion pipeline emits as either a single
/// string or a list of strings (ingredients, allergens, dietary info).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum FieldText {
    Text(String),
    List(Vec<String>),
}

impl FieldText {
    /// Render for display: a string as-is, a list joined with `", "`.
    pub fn joined(&self) -> String {
        match self {
            FieldText::Text(s) => s.clone(),
            FieldText::List(items) => items.join(", "),
        }
    }
}

/// The opaque nested block carried over from the source menu document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ItemDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingredients: Option<FieldText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allergens: Option<FieldText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dietary_info: Option<FieldText>,
}

/// Per-item metadata. Every field is optional; absent fields are simply
/// omitted downstream (the formatter emits no placeholders).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ItemMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Normalized price string, e.g. `"180"` or `"180.50"`. See [`normalize_price`].
    #[serde(default, deserialize_with = "deserialize_price", skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_data: Option<ItemDetails>,
}

impl ItemMetadata {
    /// Render the full metadata (including `original_data`) as one lowercase
    /// text blob. This is the haystack the mood boost matches preference terms
    /// against.
    pub fn haystack(&self) -> String {
        let mut parts: Vec<String> = Vec::new();
        if let Some(name) = &self.name {
            parts.push(name.clone());
        }
        if let Some(category) = &self.category {
            parts.push(category.clone());
        }
        if let Some(price) = &self.price {
            parts.push(price.clone());
        }
        if let Some(details) = &self.original_data {
            if let Some(description) = &details.description {
                parts.push(description.clone());
            }
            for field in [&details.ingredients, &details.allergens, &details.dietary_info] {
                if let Some(value) = field {
                    parts.push(value.joined());
                }
            }
        }
        parts.join(" ").to_lowercase()
    }
}

/// One indexed catalog entry: the embedding vector plus its metadata. The id
/// is implicit: the record's position in the store.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemRecord {
    pub vector: Vec<f32>,
    pub metadata: ItemMetadata,
}

#[derive(Deserialize)]
struct RawCatalog {
    embeddings: Vec<Vec<f32>>,
    metadata: Vec<ItemMetadata>,
}

/// The immutable, index-aligned set of catalog records.
#[derive(Debug)]
pub struct CatalogStore {
    records: Vec<ItemRecord>,
    dimension: usize,
}

impl CatalogStore {
    /// Load and validate a catalog from a JSON file.
    ///
    /// # Errors
    /// - [`LoadError::Io`] if the file cannot be read.
    /// - [`LoadError::Parse`] if the JSON is malformed.
    /// - [`LoadError::CountMismatch`] if `embeddings` and `metadata` differ in length.
    /// - [`LoadError::DimensionMismatch`] if the vectors are ragged.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let raw: RawCatalog =
            serde_json::from_str(&content).map_err(|source| LoadError::Parse {
                path: path.display().to_string(),
                source,
            })?;
        Self::from_parts(raw.embeddings, raw.metadata)
    }

    /// Build a store from already-parsed parallel arrays, validating the
    /// count and dimension invariants.
    pub fn from_parts(
        embeddings: Vec<Vec<f32>>,
        metadata: Vec<ItemMetadata>,
    ) -> Result<Self, LoadError> {
        if embeddings.len() != metadata.len() {
            return Err(LoadError::CountMismatch {
                vectors: embeddings.len(),
                metadata: metadata.len(),
            });
        }
        let dimension = embeddings.first().map_or(0, Vec::len);
        for (index, vector) in embeddings.iter().enumerate() {
            if vector.len() != dimension {
                return Err(LoadError::DimensionMismatch {
                    index,
                    expected: dimension,
                    actual: vector.len(),
                });
            }
        }
        let records = embeddings
            .into_iter()
            .zip(metadata)
            .map(|(vector, metadata)| ItemRecord { vector, metadata })
            .collect();
        Ok(Self { records, dimension })
    }

    pub fn get(&self, index: usize) -> Option<&ItemRecord> {
        self.records.get(index)
    }

    pub fn records(&self) -> &[ItemRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Dimensionality shared by every vector in the store (0 when empty).
    pub fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Normalize a numeric price into its canonical text form: integral values
/// without decimals, fractional values with exactly two.
pub fn normalize_price(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{value:.2}")
    }
}

fn deserialize_price<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawPrice {
        Number(f64),
        Text(String),
    }

    let raw = Option::<RawPrice>::deserialize(deserializer)?;
    Ok(raw.map(|price| match price {
        RawPrice::Number(n) => normalize_price(n),
        // String prices that are really numbers get the same canonical form.
        RawPrice::Text(s) => {
            let trimmed = s.trim();
            match trimmed.parse::<f64>() {
                Ok(n) => normalize_price(n),
                Err(_) => trimmed.to_string(),
            }
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn load_valid_catalog() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "embeddings": [[1.0, 0.0], [0.0, 1.0]],
                "metadata": [
                    {{"name": "Tomato Soup", "category": "Soup", "price": 180,
                      "original_data": {{"description": "A hearty bowl",
                                         "ingredients": ["tomato", "basil"]}}}},
                    {{"name": "Masala Chai", "price": "40.5"}}
                ]
            }}"#
        )
        .unwrap();

        let store = CatalogStore::load(file.path()).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.dimension(), 2);

        let soup = store.get(0).unwrap();
        assert_eq!(soup.metadata.name.as_deref(), Some("Tomato Soup"));
        assert_eq!(soup.metadata.price.as_deref(), Some("180"));
        assert_eq!(
            soup.metadata
                .original_data
                .as_ref()
                .unwrap()
                .ingredients
                .as_ref()
                .unwrap()
                .joined(),
            "tomato, basil"
        );

        let chai = store.get(1).unwrap();
        assert_eq!(chai.metadata.price.as_deref(), Some("40.50"));
        assert!(chai.metadata.category.is_none());
    }

    #[test]
    fn load_missing_file() {
        let err = CatalogStore::load("does/not/exist.json").unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[test]
    fn load_malformed_json() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "not json at all").unwrap();
        let err = CatalogStore::load(file.path()).unwrap_err();
        assert!(matches!(err, LoadError::Parse { .. }));
    }

    #[test]
    fn count_mismatch_is_rejected() {
        let err = CatalogStore::from_parts(
            vec![vec![1.0, 0.0]],
            vec![ItemMetadata::default(), ItemMetadata::default()],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            LoadError::CountMismatch {
                vectors: 1,
                metadata: 2
            }
        ));
    }

    #[test]
    fn ragged_vectors_are_rejected() {
        let err = CatalogStore::from_parts(
            vec![vec![1.0, 0.0], vec![1.0]],
            vec![ItemMetadata::default(), ItemMetadata::default()],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            LoadError::DimensionMismatch {
                index: 1,
                expected: 2,
                actual: 1
            }
        ));
    }

    #[test]
    fn field_text_joining() {
        assert_eq!(FieldText::Text("milk".into()).joined(), "milk");
        assert_eq!(
            FieldText::List(vec!["milk".into(), "nuts".into()]).joined(),
            "milk, nuts"
        );
    }

    #[test]
    fn haystack_is_lowercase_and_complete() {
        let metadata = ItemMetadata {
            name: Some("Choco Cake".into()),
            category: Some("Dessert".into()),
            price: Some("250".into()),
            original_data: Some(ItemDetails {
                description: Some("Rich and Indulgent".into()),
                ingredients: Some(FieldText::List(vec!["Cocoa".into(), "Cream".into()])),
                allergens: Some(FieldText::Text("Dairy".into())),
                dietary_info: None,
            }),
        };
        let haystack = metadata.haystack();
        assert_eq!(
            haystack,
            "choco cake dessert 250 rich and indulgent cocoa, cream dairy"
        );
    }

    #[test]
    fn price_normalization() {
        assert_eq!(normalize_price(180.0), "180");
        assert_eq!(normalize_price(40.5), "40.50");
    }
}
