//! Entity resolution cache

pub mod entity_store;

pub use entity_store::{EntityKey, EntityStore, Resolution, Resolved};
