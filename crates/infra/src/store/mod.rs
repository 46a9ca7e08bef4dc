//! Document storage abstraction.
//!
//! Every persisted entity is a JSON document living in a named collection and
//! keyed by its typed id. Backends only need to understand the small [`Filter`]
//! language below; all domain rules live above this layer.

pub mod in_memory;
pub mod postgres;

use std::fmt::Display;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// A value that can be stored in a [`DocumentStore`].
pub trait Document: Serialize + DeserializeOwned + Clone + PartialEq + Send + Sync + 'static {
    type Id: Clone + Ord + Display + Send + Sync + 'static;

    /// Collection name, unique per document type.
    const COLLECTION: &'static str;

    fn id(&self) -> &Self::Id;
}

/// Query predicate evaluated against the serialized (camelCase) document.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    All,
    /// Exact match on a string field.
    Eq { field: &'static str, value: String },
    /// Numeric field strictly below `value`.
    Lt { field: &'static str, value: f64 },
    /// Case-insensitive substring match on any of the listed string fields.
    ContainsAny {
        fields: Vec<&'static str>,
        needle: String,
    },
}

impl Filter {
    pub fn eq(field: &'static str, value: impl Into<String>) -> Self {
        Self::Eq {
            field,
            value: value.into(),
        }
    }

    pub fn lt(field: &'static str, value: f64) -> Self {
        Self::Lt { field, value }
    }

    pub fn contains_any(fields: &[&'static str], needle: impl Into<String>) -> Self {
        Self::ContainsAny {
            fields: fields.to_vec(),
            needle: needle.into(),
        }
    }

    /// Evaluate the filter against a JSON document.
    pub fn matches(&self, doc: &serde_json::Value) -> bool {
        match self {
            Filter::All => true,
            Filter::Eq { field, value } => doc.get(field).and_then(|v| v.as_str()) == Some(value.as_str()),
            Filter::Lt { field, value } => doc
                .get(field)
                .and_then(|v| v.as_f64())
                .is_some_and(|v| v < *value),
            Filter::ContainsAny { fields, needle } => {
                let needle = needle.to_lowercase();
                fields.iter().any(|field| {
                    doc.get(field)
                        .and_then(|v| v.as_str())
                        .is_some_and(|s| s.to_lowercase().contains(&needle))
                })
            }
        }
    }
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("document '{0}' already exists")]
    Duplicate(String),

    #[error("document codec error: {0}")]
    Codec(String),

    #[error("store backend error: {0}")]
    Backend(String),
}

/// Persistence port for one document type.
///
/// `compare_and_swap` and `delete_if` only act when the stored document is
/// still equal to `current`; they return `false` otherwise so callers can
/// re-read and retry.
#[async_trait]
pub trait DocumentStore<D: Document>: Send + Sync {
    async fn find(&self, id: &D::Id) -> Result<Option<D>, StoreError>;

    async fn find_all(&self, filter: &Filter) -> Result<Vec<D>, StoreError>;

    async fn find_one(&self, filter: &Filter) -> Result<Option<D>, StoreError> {
        Ok(self.find_all(filter).await?.into_iter().next())
    }

    /// Insert a new document. Fails with `Duplicate` when the id is taken.
    async fn insert(&self, doc: D) -> Result<D, StoreError>;

    /// Replace an existing document. Returns `None` when it does not exist.
    async fn update(&self, doc: D) -> Result<Option<D>, StoreError>;

    async fn compare_and_swap(&self, current: &D, next: D) -> Result<bool, StoreError>;

    async fn delete(&self, id: &D::Id) -> Result<bool, StoreError>;

    async fn delete_if(&self, current: &D) -> Result<bool, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn eq_matches_exact_string_only() {
        let doc = json!({ "username": "alice" });
        assert!(Filter::eq("username", "alice").matches(&doc));
        assert!(!Filter::eq("username", "Alice").matches(&doc));
        assert!(!Filter::eq("missing", "alice").matches(&doc));
    }

    #[test]
    fn lt_requires_numeric_field() {
        let doc = json!({ "stockCount": 3, "name": "x" });
        assert!(Filter::lt("stockCount", 10.0).matches(&doc));
        assert!(!Filter::lt("stockCount", 3.0).matches(&doc));
        assert!(!Filter::lt("name", 10.0).matches(&doc));
    }

    #[test]
    fn contains_any_is_case_insensitive() {
        let doc = json!({ "name": "Trail Runner", "description": "Light shoe" });
        let filter = Filter::contains_any(&["name", "description"], "SHOE");
        assert!(filter.matches(&doc));
        assert!(!Filter::contains_any(&["name"], "shoe").matches(&doc));
    }
}
