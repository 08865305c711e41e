//! Deduplicating, per-screen cache of single entities

use crate::core::entity::{Entity, EntityKind};
use crate::core::error::ResolveError;
use crate::core::repository::Repository;
use futures::future::{BoxFuture, FutureExt, Shared, join_all};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A resolved raw record, shared by every requester
pub type Resolved = Arc<Value>;

/// Outcome of resolving one reference. Errors are cached like successes.
pub type Resolution = Result<Resolved, ResolveError>;

type SharedFetch = Shared<BoxFuture<'static, Resolution>>;

/// Cache key: entity kind plus record id
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityKey {
    pub kind: EntityKind,
    pub id: String,
}

impl EntityKey {
    pub fn new(kind: EntityKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }
}

enum Slot {
    InFlight { generation: u64, fetch: SharedFetch },
    Ready(Resolution),
}

type Slots = Arc<Mutex<HashMap<EntityKey, Slot>>>;

/// Keyed fetch cache for single entities (customers, shops, services, rooms,
/// hotels).
///
/// - At most one fetch per `(kind, id)` is ever in flight. The fetch is
///   registered before the first await, so concurrent requesters attach to it
///   and all observe the same outcome.
/// - Completed outcomes, errors included, are kept until [`invalidate`] or
///   [`refresh`] is called. There is no expiry; the store lives as long as
///   the screen that owns it.
/// - Fetches run as tokio tasks. A fetch whose requesters were all dropped
///   still completes and fills the cache.
/// - Only the completion of the registered fetch may fill an entry. A
///   completion for an entry that was invalidated in the meantime is dropped.
///
/// Must be used from within a tokio runtime.
///
/// [`invalidate`]: EntityStore::invalidate
/// [`refresh`]: EntityStore::refresh
pub struct EntityStore {
    repository: Arc<dyn Repository>,
    slots: Slots,
    next_generation: AtomicU64,
}

impl EntityStore {
    pub fn new(repository: Arc<dyn Repository>) -> Self {
        Self {
            repository,
            slots: Arc::new(Mutex::new(HashMap::new())),
            next_generation: AtomicU64::new(0),
        }
    }

    /// Resolve `(kind, id)` to its raw record.
    ///
    /// Blank ids short-circuit with [`ResolveError::NotResolvable`] and never
    /// reach the repository.
    pub async fn resolve(&self, kind: EntityKind, id: &str) -> Resolution {
        let id = id.trim();
        if id.is_empty() {
            return Err(ResolveError::NotResolvable { kind });
        }

        let key = EntityKey::new(kind, id);
        let fetch = {
            let mut slots = lock(&self.slots);
            match slots.get(&key) {
                Some(Slot::Ready(outcome)) => return outcome.clone(),
                Some(Slot::InFlight { fetch, .. }) => {
                    tracing::trace!(kind = %kind, id = %id, "attaching to in-flight fetch");
                    fetch.clone()
                }
                None => {
                    let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
                    let fetch = self.spawn_fetch(key.clone(), generation);
                    slots.insert(
                        key,
                        Slot::InFlight {
                            generation,
                            fetch: fetch.clone(),
                        },
                    );
                    fetch
                }
            }
        };

        fetch.await
    }

    /// Resolve and decode into a typed record
    pub async fn resolve_as<T: Entity>(&self, id: &str) -> Result<T, ResolveError> {
        let record = self.resolve(T::KIND, id).await?;
        decode::<T>(id, &record)
    }

    /// Resolve every distinct id concurrently and wait for all of them.
    ///
    /// Duplicate ids in the input cost nothing extra.
    pub async fn resolve_many_as<T, I, S>(&self, ids: I) -> HashMap<String, Result<T, ResolveError>>
    where
        T: Entity,
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut distinct: Vec<String> = Vec::new();
        for id in ids {
            let id = id.as_ref();
            if !distinct.iter().any(|seen| seen == id) {
                distinct.push(id.to_string());
            }
        }

        let outcomes = join_all(distinct.iter().map(|id| self.resolve_as::<T>(id))).await;
        distinct.into_iter().zip(outcomes).collect()
    }

    /// Drop the entry for `(kind, id)` so the next resolve fetches again.
    ///
    /// Returns whether an entry existed. A fetch still in flight for the old
    /// entry keeps running but its result is not stored.
    pub fn invalidate(&self, kind: EntityKind, id: &str) -> bool {
        let removed = lock(&self.slots)
            .remove(&EntityKey::new(kind, id.trim()))
            .is_some();
        if removed {
            tracing::debug!(kind = %kind, id = %id, "invalidated cached entity");
        }
        removed
    }

    /// Hard refresh: invalidate, then resolve again
    pub async fn refresh(&self, kind: EntityKind, id: &str) -> Resolution {
        self.invalidate(kind, id);
        self.resolve(kind, id).await
    }

    /// Hard refresh with decoding
    pub async fn refresh_as<T: Entity>(&self, id: &str) -> Result<T, ResolveError> {
        self.invalidate(T::KIND, id);
        self.resolve_as::<T>(id).await
    }

    /// Drop every entry
    pub fn clear(&self) {
        lock(&self.slots).clear();
    }

    /// Whether `(kind, id)` has an entry, completed or in flight
    pub fn contains(&self, kind: EntityKind, id: &str) -> bool {
        lock(&self.slots).contains_key(&EntityKey::new(kind, id.trim()))
    }

    /// Whether a fetch for `(kind, id)` is still outstanding
    pub fn is_in_flight(&self, kind: EntityKind, id: &str) -> bool {
        matches!(
            lock(&self.slots).get(&EntityKey::new(kind, id.trim())),
            Some(Slot::InFlight { .. })
        )
    }

    pub fn len(&self) -> usize {
        lock(&self.slots).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.slots).is_empty()
    }

    fn spawn_fetch(&self, key: EntityKey, generation: u64) -> SharedFetch {
        let repository = Arc::clone(&self.repository);
        let slots = Arc::clone(&self.slots);
        let task_key = key.clone();

        let handle = tokio::spawn(async move {
            let outcome = fetch_record(repository.as_ref(), &task_key).await;
            commit(&slots, &task_key, generation, &outcome);
            outcome
        });

        async move {
            handle.await.unwrap_or_else(|e| {
                Err(ResolveError::FetchFailure {
                    kind: key.kind,
                    id: key.id,
                    message: format!("fetch task failed: {}", e),
                })
            })
        }
        .boxed()
        .shared()
    }
}

async fn fetch_record(repository: &dyn Repository, key: &EntityKey) -> Resolution {
    tracing::debug!(kind = %key.kind, id = %key.id, "fetching entity");

    match repository.fetch_by_id(key.kind, &key.id).await {
        Ok(Some(record)) => Ok(Arc::new(record)),
        Ok(None) => {
            tracing::warn!(kind = %key.kind, id = %key.id, "entity not found");
            Err(ResolveError::NotFound {
                kind: key.kind,
                id: key.id.clone(),
            })
        }
        Err(e) => {
            tracing::warn!(kind = %key.kind, id = %key.id, error = %e, "entity fetch failed");
            Err(ResolveError::FetchFailure {
                kind: key.kind,
                id: key.id.clone(),
                message: e.to_string(),
            })
        }
    }
}

/// Store `outcome` only if the entry still belongs to fetch `generation`
fn commit(
    slots: &Mutex<HashMap<EntityKey, Slot>>,
    key: &EntityKey,
    generation: u64,
    outcome: &Resolution,
) {
    let mut slots = lock(slots);
    let registered = matches!(
        slots.get(key),
        Some(Slot::InFlight { generation: current, .. }) if *current == generation
    );
    if registered {
        slots.insert(key.clone(), Slot::Ready(outcome.clone()));
    } else {
        tracing::debug!(kind = %key.kind, id = %key.id, "discarding completion for replaced entry");
    }
}

fn decode<T: Entity>(id: &str, record: &Value) -> Result<T, ResolveError> {
    T::from_record(record).map_err(|e| ResolveError::Decode {
        kind: T::KIND,
        id: id.trim().to_string(),
        message: e.to_string(),
    })
}

fn lock(slots: &Mutex<HashMap<EntityKey, Slot>>) -> MutexGuard<'_, HashMap<EntityKey, Slot>> {
    slots.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Hotel, Shop};
    use crate::storage::InMemoryRepository;
    use serde_json::json;

    fn repository() -> Arc<InMemoryRepository> {
        let repository = InMemoryRepository::new();
        repository
            .insert(EntityKind::Shop, json!({"id": "SH1", "name": "Happy Paws"}))
            .unwrap();
        repository
            .insert(EntityKind::Hotel, json!({"id": "H1", "title": "missing name"}))
            .unwrap();
        Arc::new(repository)
    }

    #[tokio::test]
    async fn test_blank_id_is_not_resolvable() {
        let store = EntityStore::new(repository());

        let outcome = store.resolve(EntityKind::Shop, "   ").await;
        assert_eq!(
            outcome,
            Err(ResolveError::NotResolvable {
                kind: EntityKind::Shop
            })
        );
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_resolve_caches_success() {
        let store = EntityStore::new(repository());

        let shop: Shop = store.resolve_as("SH1").await.unwrap();
        assert_eq!(shop.name, "Happy Paws");
        assert!(store.contains(EntityKind::Shop, "SH1"));
        assert!(!store.is_in_flight(EntityKind::Shop, "SH1"));

        // Whitespace around the id hits the same entry
        let again: Shop = store.resolve_as(" SH1 ").await.unwrap();
        assert_eq!(again, shop);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_not_found_is_cached() {
        let store = EntityStore::new(repository());

        let outcome = store.resolve(EntityKind::Shop, "SH404").await;
        assert!(matches!(outcome, Err(ResolveError::NotFound { .. })));
        assert!(store.contains(EntityKind::Shop, "SH404"));
    }

    #[tokio::test]
    async fn test_decode_failure() {
        let store = EntityStore::new(repository());

        let outcome = store.resolve_as::<Hotel>("H1").await;
        assert!(matches!(outcome, Err(ResolveError::Decode { .. })));
    }

    #[tokio::test]
    async fn test_invalidate_and_clear() {
        let store = EntityStore::new(repository());
        store.resolve(EntityKind::Shop, "SH1").await.unwrap();

        assert!(store.invalidate(EntityKind::Shop, "SH1"));
        assert!(!store.invalidate(EntityKind::Shop, "SH1"));
        assert!(store.is_empty());

        store.refresh(EntityKind::Shop, "SH1").await.unwrap();
        assert_eq!(store.len(), 1);

        store.clear();
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_resolve_many_dedups_input() {
        let store = EntityStore::new(repository());

        let resolved = store
            .resolve_many_as::<Shop, _, _>(["SH1", "SH1", "SH2"])
            .await;
        assert_eq!(resolved.len(), 2);
        assert!(resolved["SH1"].is_ok());
        assert!(resolved["SH2"].is_err());
    }
}
