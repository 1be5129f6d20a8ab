//! Repositories over document stores.

pub mod item_repo;

pub use item_repo::{ItemRepository, RepositoryError};
