//! Document-store abstraction.
//!
//! A collection of JSON documents keyed by a store-assigned [`ItemId`] held
//! under [`ID_FIELD`]. Implementations:
//! - [`InMemoryDocumentStore`]: dev/tests
//! - [`PostgresDocumentStore`]: JSONB rows in a single table
//!
//! Every operation touches at most one document, except `find_many`.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

use stockroom_core::ItemId;

pub mod in_memory;
pub mod postgres;

pub use in_memory::InMemoryDocumentStore;
pub use postgres::PostgresDocumentStore;

/// Key under which the store keeps a document's identifier.
pub const ID_FIELD: &str = "_id";

/// A stored document: a JSON object.
pub type Document = Map<String, Value>;

/// Document store operation error.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend call failed (connection, query, lock).
    #[error("{0}")]
    Backend(String),

    /// A stored document could not be decoded.
    #[error("corrupt document: {0}")]
    Corrupt(String),

    /// The store was configured with an unusable collection name.
    #[error("invalid collection name: {0}")]
    InvalidCollection(String),
}

/// A single field predicate on a numeric field.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// `field > value`
    Gt { field: String, value: f64 },
    /// `field < value`
    Lt { field: String, value: f64 },
}

impl Predicate {
    pub fn field(&self) -> &str {
        match self {
            Predicate::Gt { field, .. } | Predicate::Lt { field, .. } => field,
        }
    }

    /// Documents missing the field, or holding a non-number there, never match.
    pub fn matches(&self, doc: &Document) -> bool {
        let Some(actual) = doc.get(self.field()).and_then(Value::as_f64) else {
            return false;
        };
        match self {
            Predicate::Gt { value, .. } => actual > *value,
            Predicate::Lt { value, .. } => actual < *value,
        }
    }
}

/// Conjunction of predicates. The empty filter matches every document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    predicates: Vec<Predicate>,
}

impl Filter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn gt(mut self, field: impl Into<String>, value: f64) -> Self {
        self.predicates.push(Predicate::Gt {
            field: field.into(),
            value,
        });
        self
    }

    pub fn lt(mut self, field: impl Into<String>, value: f64) -> Self {
        self.predicates.push(Predicate::Lt {
            field: field.into(),
            value,
        });
        self
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn matches(&self, doc: &Document) -> bool {
        self.predicates.iter().all(|p| p.matches(doc))
    }
}

/// Collection-level CRUD primitives.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Assign a fresh identifier under [`ID_FIELD`], persist, and return the stored document.
    async fn insert_one(&self, doc: Document) -> Result<Document, StoreError>;

    async fn find_one(&self, id: ItemId) -> Result<Option<Document>, StoreError>;

    /// Matching documents in natural (insertion) order.
    async fn find_many(&self, filter: &Filter) -> Result<Vec<Document>, StoreError>;

    /// Merge `set` into the document's top-level keys and return the result.
    ///
    /// `None` when no document has this identifier. [`ID_FIELD`] in `set` is ignored.
    async fn update_one(&self, id: ItemId, set: Document) -> Result<Option<Document>, StoreError>;

    /// Returns whether a document was removed.
    async fn delete_one(&self, id: ItemId) -> Result<bool, StoreError>;
}

#[async_trait]
impl<S> DocumentStore for Arc<S>
where
    S: DocumentStore + ?Sized,
{
    async fn insert_one(&self, doc: Document) -> Result<Document, StoreError> {
        (**self).insert_one(doc).await
    }

    async fn find_one(&self, id: ItemId) -> Result<Option<Document>, StoreError> {
        (**self).find_one(id).await
    }

    async fn find_many(&self, filter: &Filter) -> Result<Vec<Document>, StoreError> {
        (**self).find_many(filter).await
    }

    async fn update_one(&self, id: ItemId, set: Document) -> Result<Option<Document>, StoreError> {
        (**self).update_one(id, set).await
    }

    async fn delete_one(&self, id: ItemId) -> Result<bool, StoreError> {
        (**self).delete_one(id).await
    }
}
