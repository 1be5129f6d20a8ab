use std::sync::RwLock;

use async_trait::async_trait;
use serde_json::Value;

use stockroom_core::ItemId;

use super::{Document, DocumentStore, Filter, StoreError, ID_FIELD};

/// In-memory document collection.
///
/// Intended for tests/dev. Documents are kept in insertion order, which is
/// the natural order `find_many` returns.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    docs: RwLock<Vec<Document>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn has_id(doc: &Document, id: &str) -> bool {
        doc.get(ID_FIELD).and_then(Value::as_str) == Some(id)
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn insert_one(&self, mut doc: Document) -> Result<Document, StoreError> {
        let id = ItemId::new();
        doc.insert(ID_FIELD.to_string(), Value::String(id.to_string()));

        let mut docs = self
            .docs
            .write()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))?;
        docs.push(doc.clone());
        Ok(doc)
    }

    async fn find_one(&self, id: ItemId) -> Result<Option<Document>, StoreError> {
        let id = id.to_string();
        let docs = self
            .docs
            .read()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))?;
        Ok(docs.iter().find(|d| Self::has_id(d, &id)).cloned())
    }

    async fn find_many(&self, filter: &Filter) -> Result<Vec<Document>, StoreError> {
        let docs = self
            .docs
            .read()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))?;
        Ok(docs.iter().filter(|d| filter.matches(d)).cloned().collect())
    }

    async fn update_one(&self, id: ItemId, set: Document) -> Result<Option<Document>, StoreError> {
        let id = id.to_string();
        let mut docs = self
            .docs
            .write()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))?;

        let Some(doc) = docs.iter_mut().find(|d| Self::has_id(d, &id)) else {
            return Ok(None);
        };
        for (key, value) in set {
            if key != ID_FIELD {
                doc.insert(key, value);
            }
        }
        Ok(Some(doc.clone()))
    }

    async fn delete_one(&self, id: ItemId) -> Result<bool, StoreError> {
        let id = id.to_string();
        let mut docs = self
            .docs
            .write()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))?;

        match docs.iter().position(|d| Self::has_id(d, &id)) {
            Some(idx) => {
                docs.remove(idx);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
