//! Core module containing the fundamental traits and types of the crate

pub mod clock;
pub mod entity;
pub mod error;
pub mod events;
pub mod filter;
pub mod repository;

pub use clock::{Clock, FixedClock, SystemClock};
pub use entity::{Entity, EntityKind};
pub use error::{ConflictReason, ErrorResponse, LifecycleError, ResolveError, ViewError, ViewResult};
pub use events::{BookingEvent, EventBus, EventEnvelope};
pub use filter::{Condition, ListFilter};
pub use repository::Repository;
