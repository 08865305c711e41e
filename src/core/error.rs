//! Typed error handling for the aggregation core
//!
//! # Error Categories
//!
//! - [`ResolveError`]: a single foreign reference could not be resolved.
//!   Cached by the [`EntityStore`](crate::store::EntityStore) and absorbed by
//!   the joiner as a placeholder.
//! - [`LifecycleError`]: a booking transition was rejected or its write failed.
//! - [`ViewError`]: what a screen sees. Only root list fetches and lifecycle
//!   failures reach this level.
//!
//! An appointment without resolvable services is not an error at all: the
//! joiner drops the row.
//!
//! # Example
//!
//! ```rust,ignore
//! match aggregator.check_in("B1").await {
//!     Ok(booking) => println!("checked in {}", booking.id),
//!     Err(ViewError::Lifecycle(e)) if !e.is_recoverable() => {
//!         println!("{}", e.user_message());
//!     }
//!     Err(e) => eprintln!("retry later: {}", e),
//! }
//! ```

use crate::core::entity::EntityKind;
use crate::entities::BookingStatus;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

// =============================================================================
// Resolve Errors
// =============================================================================

/// Errors produced while resolving one `(kind, id)` reference.
///
/// The type is `Clone` because one outcome is shared by every requester that
/// attached to the same fetch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// The id was blank or missing; no request was issued
    #[error("{kind} reference is blank and cannot be resolved")]
    NotResolvable { kind: EntityKind },

    /// The repository answered but has no such record
    #[error("{kind} with id '{id}' not found")]
    NotFound { kind: EntityKind, id: String },

    /// The repository call itself failed
    #[error("Failed to fetch {kind} '{id}': {message}")]
    FetchFailure {
        kind: EntityKind,
        id: String,
        message: String,
    },

    /// The record arrived but did not match the expected shape
    #[error("Failed to decode {kind} '{id}': {message}")]
    Decode {
        kind: EntityKind,
        id: String,
        message: String,
    },
}

impl ResolveError {
    pub fn error_code(&self) -> &'static str {
        match self {
            ResolveError::NotResolvable { .. } => "NOT_RESOLVABLE",
            ResolveError::NotFound { .. } => "ENTITY_NOT_FOUND",
            ResolveError::FetchFailure { .. } => "FETCH_FAILURE",
            ResolveError::Decode { .. } => "DECODE_FAILURE",
        }
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            ResolveError::NotResolvable { kind }
            | ResolveError::NotFound { kind, .. }
            | ResolveError::FetchFailure { kind, .. }
            | ResolveError::Decode { kind, .. } => *kind,
        }
    }
}

// =============================================================================
// Lifecycle Errors
// =============================================================================

/// Why a transition was refused before reaching the repository
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictReason {
    /// The booking is not part of the current list
    NotFound,

    /// The booking's current status does not allow the requested target
    InvalidTransition {
        current: BookingStatus,
        target: BookingStatus,
    },

    /// Another transition for the same booking has not finished yet
    TransitionInFlight,
}

impl fmt::Display for ConflictReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictReason::NotFound => write!(f, "booking not found"),
            ConflictReason::InvalidTransition { current, target } => write!(
                f,
                "cannot move from {} ({}) to {} ({})",
                current.as_str(),
                current.code(),
                target.as_str(),
                target.code()
            ),
            ConflictReason::TransitionInFlight => {
                write!(f, "another status change is still in progress")
            }
        }
    }
}

/// Errors related to booking status transitions
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifecycleError {
    /// Rejected locally; nothing was sent
    #[error("Booking '{booking_id}' state conflict: {reason}")]
    StateConflict {
        booking_id: String,
        reason: ConflictReason,
    },

    /// The write was attempted and failed; the booking is unchanged
    #[error("Failed to update booking '{booking_id}': {message}")]
    Repository { booking_id: String, message: String },

    /// The stored booking could not be read, so no transition was attempted
    #[error("Failed to decode booking '{booking_id}': {message}")]
    Decode { booking_id: String, message: String },
}

impl LifecycleError {
    pub fn error_code(&self) -> &'static str {
        match self {
            LifecycleError::StateConflict { .. } => "STATE_CONFLICT",
            LifecycleError::Repository { .. } => "BOOKING_UPDATE_FAILED",
            LifecycleError::Decode { .. } => "BOOKING_DECODE_FAILED",
        }
    }

    /// A failed write may succeed when retried; a conflict never will
    pub fn is_recoverable(&self) -> bool {
        matches!(self, LifecycleError::Repository { .. })
    }

    /// Message suitable for showing next to the booking row
    pub fn user_message(&self) -> String {
        match self {
            LifecycleError::StateConflict { reason, .. } => match reason {
                ConflictReason::NotFound => "This booking no longer exists.".to_string(),
                ConflictReason::InvalidTransition { current, target } => format!(
                    "A booking that is '{}' cannot be marked '{}'.",
                    current.as_str(),
                    target.as_str()
                ),
                ConflictReason::TransitionInFlight => {
                    "This booking is already being updated.".to_string()
                }
            },
            LifecycleError::Repository { .. } | LifecycleError::Decode { .. } => {
                "The booking could not be updated. Please try again.".to_string()
            }
        }
    }
}

// =============================================================================
// View Errors
// =============================================================================

/// Errors a screen can observe
#[derive(Debug, Clone, Error)]
pub enum ViewError {
    /// A root list (appointments, bookings, join table) could not be loaded
    #[error("Failed to load {kind} list: {message}")]
    RootFetch { kind: EntityKind, message: String },

    /// A lifecycle transition failed
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    /// The screen was unmounted; the result was not applied
    #[error("View is no longer mounted")]
    Unmounted,
}

/// Error payload handed to the presentation layer
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Whether retrying can help
    pub recoverable: bool,
}

impl ViewError {
    pub fn error_code(&self) -> &'static str {
        match self {
            ViewError::RootFetch { .. } => "ROOT_FETCH_FAILED",
            ViewError::Lifecycle(e) => e.error_code(),
            ViewError::Unmounted => "VIEW_UNMOUNTED",
        }
    }

    pub fn is_recoverable(&self) -> bool {
        match self {
            ViewError::RootFetch { .. } => true,
            ViewError::Lifecycle(e) => e.is_recoverable(),
            ViewError::Unmounted => false,
        }
    }

    /// Convert to an error response
    pub fn to_response(&self) -> ErrorResponse {
        let message = match self {
            ViewError::Lifecycle(e) => e.user_message(),
            other => other.to_string(),
        };
        ErrorResponse {
            code: self.error_code().to_string(),
            message,
            recoverable: self.is_recoverable(),
        }
    }
}

// =============================================================================
// Result type alias
// =============================================================================

/// A specialized Result type for screen operations
pub type ViewResult<T> = Result<T, ViewError>;
