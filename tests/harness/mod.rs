//! Shared test harness for repository-driven tests
//!
//! Provides `TestRepository`, a wrapper around `InMemoryRepository` that
//! counts calls, fails chosen records and can hold calls at a gate, plus
//! fixture helpers for the order and hotel screens.
//!
//! # Usage
//!
//! From any integration test file in `tests/`:
//! ```rust,ignore
//! mod harness;
//! use harness::*;
//! ```

#![allow(dead_code)]

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Value, json};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;

use stayboard::core::{EntityKind, ListFilter, Repository};
use stayboard::storage::InMemoryRepository;

// ---------------------------------------------------------------------------
// TestRepository
// ---------------------------------------------------------------------------

/// Which calls wait at the gate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GateScope {
    Fetches,
    Lists,
    Updates,
}

#[derive(Default)]
struct Counters {
    fetches: HashMap<(EntityKind, String), usize>,
    lists: HashMap<EntityKind, usize>,
    updates: usize,
}

#[derive(Default)]
struct Faults {
    ids: HashSet<(EntityKind, String)>,
    lists: HashSet<EntityKind>,
    updates: bool,
}

/// Repository double over `InMemoryRepository`.
///
/// Calls are counted when they start, before any gate, so a test can wait
/// for a call to be in flight and then release it.
#[derive(Clone)]
pub struct TestRepository {
    inner: InMemoryRepository,
    counters: Arc<Mutex<Counters>>,
    faults: Arc<Mutex<Faults>>,
    gated: Arc<Mutex<HashSet<GateScope>>>,
    gate: Arc<watch::Sender<bool>>,
}

impl TestRepository {
    pub fn new(inner: InMemoryRepository) -> Self {
        let (gate, _) = watch::channel(true);
        Self {
            inner,
            counters: Arc::default(),
            faults: Arc::default(),
            gated: Arc::default(),
            gate: Arc::new(gate),
        }
    }

    pub fn inner(&self) -> &InMemoryRepository {
        &self.inner
    }

    pub fn shared(&self) -> Arc<dyn Repository> {
        Arc::new(self.clone())
    }

    // === Faults ===

    pub fn fail_id(&self, kind: EntityKind, id: &str) {
        self.faults.lock().unwrap().ids.insert((kind, id.to_string()));
    }

    pub fn fail_list(&self, kind: EntityKind) {
        self.faults.lock().unwrap().lists.insert(kind);
    }

    pub fn fail_updates(&self) {
        self.faults.lock().unwrap().updates = true;
    }

    // === Gate ===

    /// Hold every call of `scope` until [`open_gate`](Self::open_gate)
    pub fn close_gate(&self, scope: GateScope) {
        self.gated.lock().unwrap().insert(scope);
        self.gate.send_replace(false);
    }

    pub fn open_gate(&self) {
        self.gate.send_replace(true);
    }

    async fn pass(&self, scope: GateScope) {
        let gated = self.gated.lock().unwrap().contains(&scope);
        if !gated {
            return;
        }
        let mut rx = self.gate.subscribe();
        let _ = rx.wait_for(|open| *open).await;
    }

    // === Counters ===

    pub fn fetch_count(&self, kind: EntityKind, id: &str) -> usize {
        self.counters
            .lock()
            .unwrap()
            .fetches
            .get(&(kind, id.to_string()))
            .copied()
            .unwrap_or(0)
    }

    /// Single fetches of `kind`, all ids together
    pub fn fetches_of(&self, kind: EntityKind) -> usize {
        self.counters
            .lock()
            .unwrap()
            .fetches
            .iter()
            .filter(|((k, _), _)| *k == kind)
            .map(|(_, count)| count)
            .sum()
    }

    pub fn list_count(&self, kind: EntityKind) -> usize {
        self.counters
            .lock()
            .unwrap()
            .lists
            .get(&kind)
            .copied()
            .unwrap_or(0)
    }

    pub fn update_count(&self) -> usize {
        self.counters.lock().unwrap().updates
    }

    /// Yield until at least `n` update calls have started
    pub async fn wait_for_updates(&self, n: usize) {
        while self.update_count() < n {
            tokio::task::yield_now().await;
        }
    }

    pub async fn wait_for_fetches(&self, kind: EntityKind, n: usize) {
        while self.fetches_of(kind) < n {
            tokio::task::yield_now().await;
        }
    }

    pub async fn wait_for_lists(&self, kind: EntityKind, n: usize) {
        while self.list_count(kind) < n {
            tokio::task::yield_now().await;
        }
    }
}

#[async_trait]
impl Repository for TestRepository {
    async fn fetch_by_id(&self, kind: EntityKind, id: &str) -> Result<Option<Value>> {
        *self
            .counters
            .lock()
            .unwrap()
            .fetches
            .entry((kind, id.to_string()))
            .or_default() += 1;
        self.pass(GateScope::Fetches).await;

        let failing = self.faults.lock().unwrap().ids.contains(&(kind, id.to_string()));
        if failing {
            return Err(anyhow!("injected failure for {} '{}'", kind, id));
        }
        self.inner.fetch_by_id(kind, id).await
    }

    async fn fetch_list(&self, kind: EntityKind, filter: &ListFilter) -> Result<Vec<Value>> {
        *self.counters.lock().unwrap().lists.entry(kind).or_default() += 1;
        self.pass(GateScope::Lists).await;

        let failing = self.faults.lock().unwrap().lists.contains(&kind);
        if failing {
            return Err(anyhow!("injected failure for {} list", kind));
        }
        self.inner.fetch_list(kind, filter).await
    }

    async fn update(&self, kind: EntityKind, record: Value) -> Result<Value> {
        self.counters.lock().unwrap().updates += 1;
        self.pass(GateScope::Updates).await;

        let failing = self.faults.lock().unwrap().updates;
        if failing {
            return Err(anyhow!("injected failure for {} update", kind));
        }
        self.inner.update(kind, record).await
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub fn at(raw: &str) -> DateTime<Utc> {
    raw.parse().unwrap()
}

pub fn shop(id: &str, name: &str) -> Value {
    json!({"id": id, "name": name})
}

pub fn service(id: &str, shop_id: &str, price: f64) -> Value {
    json!({"id": id, "name": format!("Service {}", id), "shop_id": shop_id, "price": price})
}

pub fn appointment(id: &str, customer_id: &str, status: &str, start_time: &str) -> Value {
    json!({
        "id": id,
        "customer_id": customer_id,
        "status": status,
        "start_time": start_time,
    })
}

pub fn service_appointment(id: &str, appointment_id: &str, service_id: &str) -> Value {
    json!({"id": id, "appointment_id": appointment_id, "service_id": service_id})
}

pub fn customer(account_id: &str, full_name: &str) -> Value {
    json!({"account_id": account_id, "full_name": full_name})
}

pub fn hotel(id: &str, name: &str) -> Value {
    json!({"id": id, "name": name, "address_name": "12 Nguyen Hue", "total_room": 10})
}

pub fn room(id: &str, number: &str, room_type: u8, hotel_id: &str) -> Value {
    json!({
        "id": id,
        "room_number": number,
        "room_type": room_type,
        "hotel_id": hotel_id,
        "max_capacity": 2,
        "daily_price": 400000.0,
    })
}

pub fn booking(
    id: &str,
    room_id: &str,
    customer_id: &str,
    check_in: &str,
    check_out: &str,
    status: u8,
) -> Value {
    json!({
        "id": id,
        "room_detail_id": room_id,
        "customer_id": customer_id,
        "check_in_date": check_in,
        "check_out_date": check_out,
        "total_night": 4,
        "total_amount": 1600000.0,
        "status": status,
    })
}

fn insert_all(repository: &InMemoryRepository, kind: EntityKind, records: Vec<Value>) {
    for record in records {
        repository.insert(kind, record).unwrap();
    }
}

/// Order screen data for customer `C1`:
///
/// - `A1` pending with services `S1` (200000) and `S2` (150000)
/// - `A2` in progress with `S1` only
/// - `A3` cancelled with `S3` (90000)
/// - `A4` finished with `S2`
/// - `A5` pending with no service appointments
pub fn order_fixture() -> TestRepository {
    let repository = InMemoryRepository::new();

    insert_all(
        &repository,
        EntityKind::Shop,
        vec![shop("SH1", "Happy Paws"), shop("SH2", "Fluffy Corner")],
    );
    insert_all(
        &repository,
        EntityKind::Service,
        vec![
            service("S1", "SH1", 200000.0),
            service("S2", "SH1", 150000.0),
            service("S3", "SH2", 90000.0),
        ],
    );
    insert_all(
        &repository,
        EntityKind::Appointment,
        vec![
            appointment("A1", "C1", "NoProgress", "2025-01-10T09:00:00Z"),
            appointment("A2", "C1", "InProgress", "2025-01-11T09:00:00Z"),
            appointment("A3", "C1", "Cancel", "2025-01-09T09:00:00Z"),
            appointment("A4", "C1", "Finish", "2025-01-08T09:00:00Z"),
            appointment("A5", "C1", "NoProgress", "2025-01-12T09:00:00Z"),
        ],
    );
    insert_all(
        &repository,
        EntityKind::ServiceAppointment,
        vec![
            service_appointment("SA1", "A1", "S1"),
            service_appointment("SA2", "A1", "S2"),
            service_appointment("SA3", "A2", "S1"),
            service_appointment("SA4", "A3", "S3"),
            service_appointment("SA5", "A4", "S2"),
        ],
    );

    TestRepository::new(repository)
}

/// Hotel screen data:
///
/// - `B1` in `R1` (hotel `H1`), not checked in, 2025-03-01..05
/// - `B2` in `R2` (hotel `H1`), checked in, 2025-03-01..05
/// - `B3` in `R3` (hotel `H2`), checked out, 2025-02-20..22
pub fn hotel_fixture() -> TestRepository {
    let repository = InMemoryRepository::new();

    insert_all(
        &repository,
        EntityKind::Customer,
        vec![customer("C1", "Lan Nguyen"), customer("C2", "")],
    );
    insert_all(
        &repository,
        EntityKind::Hotel,
        vec![hotel("H1", "Sunny Pet Hotel"), hotel("H2", "Moon Kennel")],
    );
    insert_all(
        &repository,
        EntityKind::Room,
        vec![room("R1", "101", 3, "H1"), room("R2", "102", 1, "H1"), room("R3", "201", 0, "H2")],
    );
    insert_all(
        &repository,
        EntityKind::RoomBooking,
        vec![
            booking("B1", "R1", "C1", "2025-03-01", "2025-03-05", 1),
            booking("B2", "R2", "C2", "2025-03-01T00:00:00Z", "2025-03-05T00:00:00Z", 2),
            booking("B3", "R3", "C1", "2025-02-20T00:00:00Z", "2025-02-22T00:00:00Z", 3),
        ],
    );

    TestRepository::new(repository)
}
