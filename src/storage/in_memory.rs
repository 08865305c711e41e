//! In-memory implementation of Repository for testing and development

use crate::core::{Entity, EntityKind, ListFilter, Repository};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use indexmap::IndexMap;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

type Table = IndexMap<String, Value>;

/// In-memory repository implementation
///
/// Records are kept as raw JSON per kind, in insertion order. Useful for
/// testing and development. Uses RwLock for thread-safe access.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    tables: Arc<RwLock<HashMap<EntityKind, Table>>>,
}

impl InMemoryRepository {
    /// Create a new, empty in-memory repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a raw record; its id is read from the kind's id field
    pub fn insert(&self, kind: EntityKind, record: Value) -> Result<()> {
        let id = kind
            .record_id(&record)
            .ok_or_else(|| anyhow!("{} record has no '{}' field", kind, kind.id_field()))?;

        let mut tables = self
            .tables
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        tables.entry(kind).or_default().insert(id, record);

        Ok(())
    }

    /// Insert or replace a typed record
    pub fn seed<T: Entity>(&self, entity: &T) -> Result<()> {
        self.insert(T::KIND, entity.to_record()?)
    }

    /// Remove a record, returning it if it existed
    pub fn remove(&self, kind: EntityKind, id: &str) -> Result<Option<Value>> {
        let mut tables = self
            .tables
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        Ok(tables
            .get_mut(&kind)
            .and_then(|table| table.shift_remove(id)))
    }

    /// Number of records stored for `kind`
    pub fn count(&self, kind: EntityKind) -> usize {
        self.tables
            .read()
            .map(|tables| tables.get(&kind).map_or(0, IndexMap::len))
            .unwrap_or(0)
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn fetch_by_id(&self, kind: EntityKind, id: &str) -> Result<Option<Value>> {
        let tables = self
            .tables
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(tables.get(&kind).and_then(|table| table.get(id)).cloned())
    }

    async fn fetch_list(&self, kind: EntityKind, filter: &ListFilter) -> Result<Vec<Value>> {
        let tables = self
            .tables
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(tables
            .get(&kind)
            .map(|table| {
                table
                    .values()
                    .filter(|record| filter.matches(record))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn update(&self, kind: EntityKind, record: Value) -> Result<Value> {
        let id = kind
            .record_id(&record)
            .ok_or_else(|| anyhow!("{} record has no '{}' field", kind, kind.id_field()))?;

        let mut tables = self
            .tables
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        let stored = tables
            .get_mut(&kind)
            .and_then(|table| table.get_mut(&id))
            .ok_or_else(|| anyhow!("{} '{}' not found", kind, id))?;

        *stored = record.clone();

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Shop;
    use serde_json::json;

    #[tokio::test]
    async fn test_insert_and_fetch() {
        let repository = InMemoryRepository::new();
        repository
            .insert(EntityKind::Shop, json!({"id": "SH1", "name": "Happy Paws"}))
            .unwrap();

        let record = repository
            .fetch_by_id(EntityKind::Shop, "SH1")
            .await
            .unwrap();
        assert_eq!(record, Some(json!({"id": "SH1", "name": "Happy Paws"})));

        let missing = repository
            .fetch_by_id(EntityKind::Hotel, "SH1")
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_insert_requires_id() {
        let repository = InMemoryRepository::new();
        assert!(repository
            .insert(EntityKind::Customer, json!({"id": "acc-1"}))
            .is_err());
        assert_eq!(repository.count(EntityKind::Customer), 0);
    }

    #[tokio::test]
    async fn test_fetch_list_applies_filter_in_order() {
        let repository = InMemoryRepository::new();
        for (id, appointment) in [("SA1", "A1"), ("SA2", "A2"), ("SA3", "A1")] {
            repository
                .insert(
                    EntityKind::ServiceAppointment,
                    json!({"id": id, "appointment_id": appointment, "service_id": "S1"}),
                )
                .unwrap();
        }

        let filter = ListFilter::new().eq("appointment_id", "A1");
        let rows = repository
            .fetch_list(EntityKind::ServiceAppointment, &filter)
            .await
            .unwrap();
        let ids: Vec<_> = rows.iter().map(|r| r["id"].as_str().unwrap()).collect();
        assert_eq!(ids, vec!["SA1", "SA3"]);

        let all = repository
            .fetch_list(EntityKind::ServiceAppointment, &ListFilter::new())
            .await
            .unwrap();
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn test_update_replaces_whole_record() {
        let repository = InMemoryRepository::new();
        repository
            .seed(&Shop {
                id: "SH1".to_string(),
                name: "Happy Paws".to_string(),
            })
            .unwrap();

        repository
            .update(EntityKind::Shop, json!({"id": "SH1", "name": "Happier Paws"}))
            .await
            .unwrap();

        let record = repository
            .fetch_by_id(EntityKind::Shop, "SH1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record["name"], "Happier Paws");
    }

    #[tokio::test]
    async fn test_update_missing_record_fails() {
        let repository = InMemoryRepository::new();
        let result = repository
            .update(EntityKind::Shop, json!({"id": "SH9", "name": "Ghost"}))
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_remove() {
        let repository = InMemoryRepository::new();
        repository
            .insert(EntityKind::Shop, json!({"id": "SH1", "name": "Happy Paws"}))
            .unwrap();

        assert!(repository.remove(EntityKind::Shop, "SH1").unwrap().is_some());
        assert!(repository.remove(EntityKind::Shop, "SH1").unwrap().is_none());
    }
}
