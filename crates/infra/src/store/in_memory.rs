use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;

use super::{Document, DocumentStore, Filter, StoreError};

/// In-memory document store for tests and single-process deployments.
///
/// Documents are kept in id order, so `find_all` returns a stable ordering.
pub struct InMemoryDocumentStore<D: Document> {
    inner: RwLock<BTreeMap<D::Id, D>>,
}

impl<D: Document> InMemoryDocumentStore<D> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(BTreeMap::new()),
        }
    }
}

impl<D: Document> Default for InMemoryDocumentStore<D> {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned() -> StoreError {
    StoreError::Backend("in-memory store lock poisoned".to_string())
}

fn ensure_same_id<D: Document>(current: &D, next: &D) -> Result<(), StoreError> {
    if current.id() != next.id() {
        return Err(StoreError::Backend(format!(
            "{}: cannot swap document {} for {}",
            D::COLLECTION,
            current.id(),
            next.id()
        )));
    }
    Ok(())
}

#[async_trait]
impl<D: Document> DocumentStore<D> for InMemoryDocumentStore<D> {
    async fn find(&self, id: &D::Id) -> Result<Option<D>, StoreError> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(map.get(id).cloned())
    }

    async fn find_all(&self, filter: &Filter) -> Result<Vec<D>, StoreError> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        if *filter == Filter::All {
            return Ok(map.values().cloned().collect());
        }

        let mut out = Vec::new();
        for doc in map.values() {
            let json = serde_json::to_value(doc).map_err(|e| StoreError::Codec(e.to_string()))?;
            if filter.matches(&json) {
                out.push(doc.clone());
            }
        }
        Ok(out)
    }

    async fn insert(&self, doc: D) -> Result<D, StoreError> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        if map.contains_key(doc.id()) {
            return Err(StoreError::Duplicate(format!("{}/{}", D::COLLECTION, doc.id())));
        }
        map.insert(doc.id().clone(), doc.clone());
        Ok(doc)
    }

    async fn update(&self, doc: D) -> Result<Option<D>, StoreError> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        match map.get_mut(doc.id()) {
            Some(slot) => {
                *slot = doc.clone();
                Ok(Some(doc))
            }
            None => Ok(None),
        }
    }

    async fn compare_and_swap(&self, current: &D, next: D) -> Result<bool, StoreError> {
        ensure_same_id(current, &next)?;
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        match map.get_mut(current.id()) {
            Some(slot) if slot == current => {
                *slot = next;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete(&self, id: &D::Id) -> Result<bool, StoreError> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        Ok(map.remove(id).is_some())
    }

    async fn delete_if(&self, current: &D) -> Result<bool, StoreError> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        if map.get(current.id()) == Some(current) {
            map.remove(current.id());
            return Ok(true);
        }
        Ok(false)
    }
}
