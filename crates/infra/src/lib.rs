//! Infrastructure layer: document stores and the item repository.

pub mod document_store;
pub mod repository;

mod integration_tests;

pub use document_store::{
    Document, DocumentStore, Filter, InMemoryDocumentStore, PostgresDocumentStore, Predicate, StoreError,
};
pub use repository::{ItemRepository, RepositoryError};
