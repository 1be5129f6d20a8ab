//! Inventory item models.
//!
//! This crate holds the item shape, the create payload and the partial-update
//! payload, with their validation rules. No IO, no HTTP, no storage.

pub mod item;

pub use item::{Item, ItemUpdate, NewItem};
