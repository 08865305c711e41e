//! Guarded status transitions for room bookings
//!
//! ```text
//! NotCheckedIn(1) ──check_in──▶ CheckedIn(2) ──check_out──▶ CheckedOut(3)
//! ```
//!
//! Transitions only move one step forward from the stored status. Anything
//! else is rejected with a state conflict and nothing is written. There is no
//! undo.

use crate::core::error::{ConflictReason, LifecycleError};
use crate::core::{BookingEvent, Entity, EventBus, Repository};
use crate::entities::{BookingStatus, RoomBooking};
use serde_json::Value;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

/// Controller for booking status changes.
///
/// Every transition starts from the stored record, never from a row a screen
/// rendered earlier: the booking is read, the step is validated against what
/// was read, and only the `status` field of that record is changed before it
/// is written back. Fields this crate does not model travel through untouched.
///
/// Transitions are serialized per booking: while one is in flight, a second
/// request for the same booking is rejected with
/// [`ConflictReason::TransitionInFlight`].
pub struct BookingLifecycle {
    repository: Arc<dyn Repository>,
    events: EventBus,
    in_flight: Mutex<HashSet<String>>,
}

impl BookingLifecycle {
    pub fn new(repository: Arc<dyn Repository>, events: EventBus) -> Self {
        Self {
            repository,
            events,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    /// Move a booking from not-checked-in to checked-in
    pub async fn check_in(&self, booking_id: &str) -> Result<RoomBooking, LifecycleError> {
        self.transition(booking_id, BookingStatus::CheckedIn).await
    }

    /// Move a booking from checked-in to checked-out
    pub async fn check_out(&self, booking_id: &str) -> Result<RoomBooking, LifecycleError> {
        self.transition(booking_id, BookingStatus::CheckedOut).await
    }

    /// Check a transition against a known booking without performing it
    pub fn validate(booking: &RoomBooking, target: BookingStatus) -> Result<(), LifecycleError> {
        if booking.id.trim().is_empty() {
            return Err(not_found(&booking.id));
        }
        if !booking.status.can_transition_to(target) {
            return Err(LifecycleError::StateConflict {
                booking_id: booking.id.clone(),
                reason: ConflictReason::InvalidTransition {
                    current: booking.status,
                    target,
                },
            });
        }
        Ok(())
    }

    /// Read, validate, write and announce one forward step
    pub async fn transition(
        &self,
        booking_id: &str,
        target: BookingStatus,
    ) -> Result<RoomBooking, LifecycleError> {
        if booking_id.trim().is_empty() {
            return Err(not_found(booking_id));
        }
        let _claim = self.claim(booking_id)?;

        let mut record = self.load(booking_id).await?;
        let current = RoomBooking::from_record(&record).map_err(|e| decode_failed(booking_id, e))?;
        if let Err(e) = Self::validate(&current, target) {
            tracing::debug!(booking = %booking_id, error = %e, "transition rejected");
            return Err(e);
        }

        match record.as_object_mut() {
            Some(fields) => {
                fields.insert("status".to_string(), Value::from(target.code()));
            }
            None => return Err(decode_failed(booking_id, "stored booking is not an object")),
        }

        tracing::info!(
            booking = %booking_id,
            from = current.status.code(),
            to = target.code(),
            "updating booking status"
        );

        let stored = self
            .repository
            .update(RoomBooking::KIND, record)
            .await
            .map_err(|e| {
                tracing::warn!(booking = %booking_id, error = %e, "booking update failed");
                LifecycleError::Repository {
                    booking_id: booking_id.to_string(),
                    message: e.to_string(),
                }
            })?;

        let from = current.status;
        let confirmed = RoomBooking::from_record(&stored).unwrap_or_else(|e| {
            tracing::debug!(
                booking = %booking_id,
                error = %e,
                "update response not a booking, using sent record"
            );
            RoomBooking {
                status: target,
                ..current
            }
        });

        self.events.publish(BookingEvent::StatusChanged {
            booking_id: booking_id.to_string(),
            from,
            to: target,
        });

        Ok(confirmed)
    }

    /// Whether a transition for this booking is still being written
    pub fn is_in_flight(&self, booking_id: &str) -> bool {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(booking_id)
    }

    fn claim(&self, booking_id: &str) -> Result<InFlightClaim<'_>, LifecycleError> {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        if !in_flight.insert(booking_id.to_string()) {
            tracing::debug!(booking = %booking_id, "transition already in flight");
            return Err(LifecycleError::StateConflict {
                booking_id: booking_id.to_string(),
                reason: ConflictReason::TransitionInFlight,
            });
        }
        Ok(InFlightClaim {
            in_flight: &self.in_flight,
            booking_id: booking_id.to_string(),
        })
    }

    /// The booking as the repository holds it now
    async fn load(&self, booking_id: &str) -> Result<Value, LifecycleError> {
        let record = self
            .repository
            .fetch_by_id(RoomBooking::KIND, booking_id)
            .await
            .map_err(|e| {
                tracing::warn!(booking = %booking_id, error = %e, "booking read failed");
                LifecycleError::Repository {
                    booking_id: booking_id.to_string(),
                    message: e.to_string(),
                }
            })?;
        record.ok_or_else(|| {
            tracing::debug!(booking = %booking_id, "booking no longer exists");
            not_found(booking_id)
        })
    }
}

fn not_found(booking_id: &str) -> LifecycleError {
    LifecycleError::StateConflict {
        booking_id: booking_id.to_string(),
        reason: ConflictReason::NotFound,
    }
}

fn decode_failed(booking_id: &str, error: impl std::fmt::Display) -> LifecycleError {
    LifecycleError::Decode {
        booking_id: booking_id.to_string(),
        message: error.to_string(),
    }
}

/// Releases a booking's in-flight slot when dropped
struct InFlightClaim<'a> {
    in_flight: &'a Mutex<HashSet<String>>,
    booking_id: String,
}

impl Drop for InFlightClaim<'_> {
    fn drop(&mut self) {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.booking_id);
    }
}
