//! The repository collaborator the core reads from and writes to

use crate::core::entity::EntityKind;
use crate::core::filter::ListFilter;
use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

/// Access to the backend's normalized resources.
///
/// Implementations wrap whatever transport the application uses (REST client,
/// local database, fixtures). Retries and authentication belong to the
/// implementation; the core treats every error as a failed call.
#[async_trait]
pub trait Repository: Send + Sync {
    /// Fetch a single record by id
    ///
    /// # Returns
    /// `Ok(None)` when the backend reports that the record does not exist
    async fn fetch_by_id(&self, kind: EntityKind, id: &str) -> Result<Option<Value>>;

    /// Fetch every record of `kind` matching `filter`
    async fn fetch_list(&self, kind: EntityKind, filter: &ListFilter) -> Result<Vec<Value>>;

    /// Replace a record with the given full payload
    ///
    /// Partial patches are not supported: `record` must carry every field.
    ///
    /// # Returns
    /// The record as stored by the backend
    async fn update(&self, kind: EntityKind, record: Value) -> Result<Value>;
}
