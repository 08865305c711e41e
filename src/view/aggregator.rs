//! Per-screen orchestration: fetch roots, join, classify, sort, filter

use crate::config::AggregatorConfig;
use crate::core::error::{ConflictReason, LifecycleError};
use crate::core::{
    BookingEvent, Clock, Entity, EntityKind, EventBus, EventEnvelope, ListFilter, Repository,
    SystemClock, ViewError, ViewResult,
};
use crate::entities::{Appointment, BookingStatus, RoomBooking};
use crate::join::{JoinedBooking, JoinedOrder, ResourceJoiner};
use crate::lifecycle::BookingLifecycle;
use crate::status::{OrderCategory, StatusClassifier, stay_progress};
use crate::store::EntityStore;
use crate::view::model::{BookingFilter, CurrentOrder, EnhancedBooking, OrderFilter, Schedule};
use crate::view::page::{Page, paginate};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::broadcast::{self, error::TryRecvError};
use uuid::Uuid;

/// Last committed list of one screen section
struct Snapshot<T, F> {
    filter: F,
    rows: Vec<T>,
    stale: bool,
}

type Slot<T, F> = RwLock<Option<Snapshot<T, F>>>;

/// Orchestrates the current-orders and room-management screens.
///
/// One aggregator per mounted screen. It owns the screen's [`EntityStore`],
/// so cached references live exactly as long as the screen.
///
/// Reads return the committed list when it is fresh and was built for the
/// same filter; otherwise they refresh. Category and check-in-state tabs
/// filter the committed list and never fetch.
///
/// A refresh that finishes after [`unmount`](ViewAggregator::unmount) is not
/// committed, and neither is one overtaken by a newer refresh of the same
/// list.
pub struct ViewAggregator {
    session_id: Uuid,
    repository: Arc<dyn Repository>,
    store: EntityStore,
    classifier: StatusClassifier,
    lifecycle: BookingLifecycle,
    events: EventBus,
    inbox: Mutex<broadcast::Receiver<EventEnvelope>>,
    clock: Arc<dyn Clock>,
    placeholder: String,
    mounted: AtomicBool,
    order_epoch: AtomicU64,
    booking_epoch: AtomicU64,
    orders: Slot<CurrentOrder, OrderFilter>,
    bookings: Slot<EnhancedBooking, BookingFilter>,
}

impl ViewAggregator {
    /// Create an aggregator with its own event bus
    pub fn new(repository: Arc<dyn Repository>, config: AggregatorConfig) -> Self {
        let events = EventBus::new(config.event_capacity);
        Self::with_events(repository, config, events)
    }

    /// Create an aggregator on a shared event bus, so status changes made
    /// from other screens also mark this one stale
    pub fn with_events(
        repository: Arc<dyn Repository>,
        config: AggregatorConfig,
        events: EventBus,
    ) -> Self {
        let session_id = Uuid::new_v4();
        tracing::debug!(session = %session_id, "screen aggregator created");

        Self {
            session_id,
            store: EntityStore::new(Arc::clone(&repository)),
            lifecycle: BookingLifecycle::new(Arc::clone(&repository), events.clone()),
            inbox: Mutex::new(events.subscribe()),
            classifier: StatusClassifier::from_config(&config),
            placeholder: config.placeholder,
            repository,
            events,
            clock: Arc::new(SystemClock),
            mounted: AtomicBool::new(true),
            order_epoch: AtomicU64::new(0),
            booking_epoch: AtomicU64::new(0),
            orders: RwLock::new(None),
            bookings: RwLock::new(None),
        }
    }

    /// Replace the time source
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// The screen's entity cache, for explicit invalidation or hard refresh
    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    pub fn lifecycle(&self) -> &BookingLifecycle {
        &self.lifecycle
    }

    /// The bus this screen listens on
    pub fn events(&self) -> EventBus {
        self.events.clone()
    }

    pub fn classifier(&self) -> &StatusClassifier {
        &self.classifier
    }

    /// Mark the screen as gone. In-flight work may finish and fill the entity
    /// cache, but nothing more is committed.
    pub fn unmount(&self) {
        self.mounted.store(false, Ordering::SeqCst);
        tracing::debug!(session = %self.session_id, "screen unmounted");
    }

    pub fn is_relevant(&self) -> bool {
        self.mounted.load(Ordering::SeqCst)
    }

    // =========================================================================
    // Current orders
    // =========================================================================

    /// Current orders for `filter`, most recent first
    pub async fn current_orders(&self, filter: &OrderFilter) -> ViewResult<Vec<CurrentOrder>> {
        self.ensure_mounted()?;
        self.drain_events();
        if let Some(rows) = cached(&self.orders, filter) {
            return Ok(rows);
        }
        self.refresh_orders(filter).await
    }

    /// Re-fetch, re-join and re-classify the current orders
    pub async fn refresh_orders(&self, filter: &OrderFilter) -> ViewResult<Vec<CurrentOrder>> {
        self.ensure_mounted()?;
        let ticket = self.order_epoch.fetch_add(1, Ordering::SeqCst) + 1;

        let records = self
            .fetch_roots(EntityKind::Appointment, filter.to_list_filter())
            .await?;
        let appointments: Vec<Appointment> = decode_all(&records)
            .into_iter()
            .filter(|appointment: &Appointment| appointment.status.is_current())
            .collect();

        let joined = self.joiner().join_orders(appointments).await?;

        let now = self.clock.now();
        let mut orders: Vec<CurrentOrder> = joined
            .into_iter()
            .filter_map(|order| self.build_order(order, now))
            .collect();
        orders.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.appointment_id.cmp(&b.appointment_id))
        });

        tracing::debug!(session = %self.session_id, orders = orders.len(), "current orders built");
        self.commit(&self.orders, &self.order_epoch, ticket, filter.clone(), orders.clone())?;
        Ok(orders)
    }

    /// Committed orders in one category; never fetches
    pub fn orders_in_category(&self, category: OrderCategory) -> Vec<CurrentOrder> {
        read(&self.orders)
            .as_ref()
            .map(|snapshot| {
                snapshot
                    .rows
                    .iter()
                    .filter(|order| order.category == category)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Number of committed orders per category, zero counts included
    pub fn order_counts(&self) -> BTreeMap<OrderCategory, usize> {
        let mut counts: BTreeMap<OrderCategory, usize> =
            OrderCategory::ALL.iter().map(|category| (*category, 0)).collect();
        if let Some(snapshot) = read(&self.orders).as_ref() {
            for order in &snapshot.rows {
                *counts.entry(order.category).or_default() += 1;
            }
        }
        counts
    }

    /// A page of committed orders, optionally restricted to one category
    pub fn orders_page(
        &self,
        category: Option<OrderCategory>,
        page: usize,
        limit: usize,
    ) -> Page<CurrentOrder> {
        let rows = match category {
            Some(category) => self.orders_in_category(category),
            None => read(&self.orders)
                .as_ref()
                .map(|snapshot| snapshot.rows.clone())
                .unwrap_or_default(),
        };
        paginate(&rows, page, limit)
    }

    /// Shop name for a rendered order row, or the placeholder
    pub async fn shop_name(&self, order: &CurrentOrder) -> String {
        match self.joiner().resolve_shop(order.shop_id.as_deref()).await {
            Ok(shop) => shop.name,
            Err(e) => {
                tracing::debug!(order = %order.appointment_id, error = %e, "shop name unresolved");
                self.placeholder.clone()
            }
        }
    }

    // =========================================================================
    // Room bookings
    // =========================================================================

    /// Bookings for `filter`, most recent check-in first
    pub async fn room_bookings(&self, filter: &BookingFilter) -> ViewResult<Vec<EnhancedBooking>> {
        self.ensure_mounted()?;
        self.drain_events();
        if let Some(rows) = cached(&self.bookings, filter) {
            return Ok(rows);
        }
        self.refresh_bookings(filter).await
    }

    /// Re-fetch, re-join and re-classify the bookings
    pub async fn refresh_bookings(
        &self,
        filter: &BookingFilter,
    ) -> ViewResult<Vec<EnhancedBooking>> {
        self.ensure_mounted()?;
        let ticket = self.booking_epoch.fetch_add(1, Ordering::SeqCst) + 1;

        let records = self
            .fetch_roots(EntityKind::RoomBooking, filter.to_list_filter())
            .await?;
        let bookings: Vec<RoomBooking> = decode_all(&records);

        let joined = self.joiner().join_bookings(bookings).await;

        let now = self.clock.now();
        let mut rows: Vec<EnhancedBooking> = joined
            .into_iter()
            .filter(|joined| filter.admits(joined.room.as_ref()))
            .map(|joined| self.build_booking(joined, now))
            .collect();
        rows.sort_by(|a, b| {
            b.booking
                .check_in_date
                .cmp(&a.booking.check_in_date)
                .then_with(|| a.booking.id.cmp(&b.booking.id))
        });

        tracing::debug!(session = %self.session_id, bookings = rows.len(), "room bookings built");
        self.commit(&self.bookings, &self.booking_epoch, ticket, filter.clone(), rows.clone())?;
        Ok(rows)
    }

    /// Committed bookings in one state; never fetches
    pub fn bookings_in_state(&self, status: BookingStatus) -> Vec<EnhancedBooking> {
        read(&self.bookings)
            .as_ref()
            .map(|snapshot| {
                snapshot
                    .rows
                    .iter()
                    .filter(|row| row.status() == status)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Check in a booking from the committed list
    pub async fn check_in(&self, booking_id: &str) -> ViewResult<RoomBooking> {
        self.transition(booking_id, BookingStatus::CheckedIn).await
    }

    /// Check out a booking from the committed list
    pub async fn check_out(&self, booking_id: &str) -> ViewResult<RoomBooking> {
        self.transition(booking_id, BookingStatus::CheckedOut).await
    }

    async fn transition(&self, booking_id: &str, target: BookingStatus) -> ViewResult<RoomBooking> {
        self.ensure_mounted()?;
        self.drain_events();
        if !self.is_listed(booking_id) {
            return Err(LifecycleError::StateConflict {
                booking_id: booking_id.to_string(),
                reason: ConflictReason::NotFound,
            }
            .into());
        }

        // The lifecycle validates against the stored record, not the row
        let confirmed = match self.lifecycle.transition(booking_id, target).await {
            Ok(confirmed) => confirmed,
            Err(e) => {
                if let LifecycleError::StateConflict {
                    reason: ConflictReason::NotFound | ConflictReason::InvalidTransition { .. },
                    ..
                } = &e
                {
                    tracing::debug!(
                        session = %self.session_id,
                        booking = %booking_id,
                        "row disagrees with stored booking, marking stale"
                    );
                    mark_stale(&self.bookings);
                }
                return Err(e.into());
            }
        };

        // The write is confirmed; reflect it before re-fetching so a failed
        // refresh cannot leave the old status on screen.
        self.apply_confirmed(&confirmed);
        self.drain_events();

        let filter = read(&self.bookings)
            .as_ref()
            .map(|snapshot| snapshot.filter.clone());
        if let Some(filter) = filter
            && let Err(e) = self.refresh_bookings(&filter).await
        {
            tracing::warn!(
                session = %self.session_id,
                error = %e,
                "refresh after status change failed"
            );
        }

        Ok(confirmed)
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn joiner(&self) -> ResourceJoiner<'_> {
        ResourceJoiner::new(self.repository.as_ref(), &self.store)
    }

    fn ensure_mounted(&self) -> ViewResult<()> {
        if self.is_relevant() {
            Ok(())
        } else {
            Err(ViewError::Unmounted)
        }
    }

    async fn fetch_roots(&self, kind: EntityKind, filter: ListFilter) -> ViewResult<Vec<Value>> {
        self.repository
            .fetch_list(kind, &filter)
            .await
            .map_err(|e| {
                tracing::warn!(
                    session = %self.session_id,
                    kind = %kind,
                    error = %e,
                    "root list fetch failed"
                );
                ViewError::RootFetch {
                    kind,
                    message: e.to_string(),
                }
            })
    }

    fn build_order(&self, joined: JoinedOrder, now: DateTime<Utc>) -> Option<CurrentOrder> {
        let JoinedOrder {
            appointment,
            lines,
            total_amount,
            shop_id,
        } = joined;
        let status = self.classifier.classify_appointment(appointment.status)?;
        let created_at = appointment.created();

        Some(CurrentOrder {
            schedule: Schedule {
                relative: self.classifier.relative_time(created_at, now),
                absolute: self.classifier.absolute_time(appointment.start_time),
            },
            appointment_id: appointment.id,
            customer_id: appointment.customer_id,
            status: appointment.status,
            category: status.category,
            badge: status.badge,
            lines,
            total_amount,
            shop_id,
            notes: appointment.notes,
            location_type: appointment.location_type,
            start_time: appointment.start_time,
            end_time: appointment.end_time,
            created_at,
        })
    }

    fn build_booking(&self, joined: JoinedBooking, now: DateTime<Utc>) -> EnhancedBooking {
        let JoinedBooking {
            booking,
            room,
            hotel,
            customer,
        } = joined;

        let customer_name = customer
            .as_ref()
            .and_then(|customer| customer.display_name())
            .unwrap_or(self.placeholder.as_str())
            .to_string();
        let room_label = room
            .as_ref()
            .map(|room| format!("{} ({})", room.room_number, room.room_type.label()))
            .unwrap_or_else(|| self.placeholder.clone());
        let hotel_name = hotel
            .as_ref()
            .map(|hotel| hotel.name.clone())
            .unwrap_or_else(|| self.placeholder.clone());

        EnhancedBooking {
            badge: self.classifier.classify_booking(booking.status),
            progress: stay_progress(
                booking.status,
                booking.check_in_date,
                booking.check_out_date,
                now,
            ),
            booking,
            room,
            hotel,
            customer_name,
            room_label,
            hotel_name,
        }
    }

    fn is_listed(&self, booking_id: &str) -> bool {
        read(&self.bookings)
            .as_ref()
            .is_some_and(|snapshot| snapshot.rows.iter().any(|row| row.id() == booking_id))
    }

    fn apply_confirmed(&self, confirmed: &RoomBooking) {
        let now = self.clock.now();
        if let Some(snapshot) = write(&self.bookings).as_mut()
            && let Some(row) = snapshot.rows.iter_mut().find(|row| row.id() == confirmed.id)
        {
            row.booking = confirmed.clone();
            row.badge = self.classifier.classify_booking(confirmed.status);
            row.progress = stay_progress(
                confirmed.status,
                confirmed.check_in_date,
                confirmed.check_out_date,
                now,
            );
        }
    }

    /// Apply pending bus events to the stale flags
    fn drain_events(&self) {
        let mut inbox = self.inbox.lock().unwrap_or_else(PoisonError::into_inner);
        loop {
            match inbox.try_recv() {
                Ok(envelope) => match &envelope.event {
                    BookingEvent::StatusChanged { booking_id, .. } => {
                        tracing::debug!(
                            session = %self.session_id,
                            booking = %booking_id,
                            "booking list marked stale"
                        );
                        mark_stale(&self.bookings);
                    }
                },
                Err(TryRecvError::Lagged(skipped)) => {
                    tracing::debug!(
                        session = %self.session_id,
                        skipped,
                        "event inbox lagged, marking stale"
                    );
                    mark_stale(&self.bookings);
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }
    }

    fn commit<T, F>(
        &self,
        slot: &Slot<T, F>,
        epoch: &AtomicU64,
        ticket: u64,
        filter: F,
        rows: Vec<T>,
    ) -> ViewResult<()> {
        if !self.is_relevant() {
            tracing::debug!(session = %self.session_id, "screen unmounted, result discarded");
            return Err(ViewError::Unmounted);
        }

        let mut guard = write(slot);
        if epoch.load(Ordering::SeqCst) != ticket {
            tracing::debug!(
                session = %self.session_id,
                "superseded by a newer refresh, not committed"
            );
            return Ok(());
        }
        *guard = Some(Snapshot {
            filter,
            rows,
            stale: false,
        });
        Ok(())
    }
}

fn cached<T: Clone, F: PartialEq>(slot: &Slot<T, F>, filter: &F) -> Option<Vec<T>> {
    read(slot)
        .as_ref()
        .filter(|snapshot| !snapshot.stale && &snapshot.filter == filter)
        .map(|snapshot| snapshot.rows.clone())
}

fn mark_stale<T, F>(slot: &Slot<T, F>) {
    if let Some(snapshot) = write(slot).as_mut() {
        snapshot.stale = true;
    }
}

/// Decode root records, skipping malformed ones
fn decode_all<T: Entity>(records: &[Value]) -> Vec<T> {
    records
        .iter()
        .filter_map(|record| match T::from_record(record) {
            Ok(entity) => Some(entity),
            Err(e) => {
                tracing::warn!(kind = %T::KIND, error = %e, "skipping malformed root record");
                None
            }
        })
        .collect()
}

fn read<T, F>(slot: &Slot<T, F>) -> RwLockReadGuard<'_, Option<Snapshot<T, F>>> {
    slot.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T, F>(slot: &Slot<T, F>) -> RwLockWriteGuard<'_, Option<Snapshot<T, F>>> {
    slot.write().unwrap_or_else(PoisonError::into_inner)
}
