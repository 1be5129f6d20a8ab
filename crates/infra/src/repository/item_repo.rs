use chrono::Utc;
use serde_json::Value;
use thiserror::Error;

use stockroom_core::{DomainError, ItemId};
use stockroom_inventory::{Item, ItemUpdate, NewItem};

use crate::document_store::{Document, DocumentStore, Filter, StoreError};

/// Item repository operation error.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Validation, malformed identifier, or no matching item.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// The underlying store call failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Maps item operations onto one document-store call each.
///
/// Identifiers arrive as text and are parsed before the store is touched, so
/// a malformed id is reported as `InvalidId` rather than "not found".
#[derive(Debug, Clone)]
pub struct ItemRepository<S> {
    store: S,
}

impl<S> ItemRepository<S>
where
    S: DocumentStore,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Validate, stamp both timestamps, persist, and return the stored item.
    pub async fn insert(&self, item: NewItem) -> Result<Item, RepositoryError> {
        item.validate()?;

        let doc = item.into_document(Utc::now());
        let stored = self.store.insert_one(doc).await.inspect_err(log_store_error("insert"))?;
        let item = decode(stored)?;

        tracing::info!(item_id = %item.id, "item created");
        Ok(item)
    }

    pub async fn find_all(&self) -> Result<Vec<Item>, RepositoryError> {
        let docs = self
            .store
            .find_many(&Filter::all())
            .await
            .inspect_err(log_store_error("find_all"))?;
        decode_all(docs)
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Item, RepositoryError> {
        let id = parse_id(id)?;
        let doc = self
            .store
            .find_one(id)
            .await
            .inspect_err(log_store_error("find_by_id"))?
            .ok_or(DomainError::NotFound)?;
        Ok(decode(doc)?)
    }

    /// Apply only the supplied fields plus a fresh `updated_at`.
    ///
    /// An update that changes nothing else still succeeds.
    pub async fn update_by_id(&self, id: &str, update: &ItemUpdate) -> Result<Item, RepositoryError> {
        let id = parse_id(id)?;
        update.validate()?;

        let set = update.to_set_document(Utc::now());
        let doc = self
            .store
            .update_one(id, set)
            .await
            .inspect_err(log_store_error("update_by_id"))?
            .ok_or(DomainError::NotFound)?;
        let item = decode(doc)?;

        tracing::info!(item_id = %item.id, "item updated");
        Ok(item)
    }

    /// Returns whether an item was actually removed.
    pub async fn delete_by_id(&self, id: &str) -> Result<bool, RepositoryError> {
        let id = parse_id(id)?;
        let removed = self
            .store
            .delete_one(id)
            .await
            .inspect_err(log_store_error("delete_by_id"))?;

        if removed {
            tracing::info!(item_id = %id, "item deleted");
        }
        Ok(removed)
    }

    /// Items with `min < price < max`, in natural store order.
    pub async fn find_by_price_range(&self, min: f64, max: f64) -> Result<Vec<Item>, RepositoryError> {
        if min.is_nan() || max.is_nan() {
            return Err(DomainError::validation("price bounds must be numbers").into());
        }

        let filter = Filter::all().gt("price", min).lt("price", max);
        let docs = self
            .store
            .find_many(&filter)
            .await
            .inspect_err(log_store_error("find_by_price_range"))?;
        decode_all(docs)
    }
}

fn parse_id(id: &str) -> Result<ItemId, DomainError> {
    id.parse()
}

fn decode(doc: Document) -> Result<Item, StoreError> {
    serde_json::from_value(Value::Object(doc)).map_err(|e| StoreError::Corrupt(e.to_string()))
}

fn decode_all(docs: Vec<Document>) -> Result<Vec<Item>, RepositoryError> {
    docs.into_iter()
        .map(|d| decode(d).map_err(RepositoryError::from))
        .collect()
}

fn log_store_error(operation: &'static str) -> impl Fn(&StoreError) {
    move |e| tracing::warn!(operation, "store call failed: {e}")
}
