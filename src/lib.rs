//! # Stayboard
//!
//! Booking aggregation and lifecycle core for a pet-care dashboard.
//!
//! ## Features
//!
//! - **Entity Store**: Per-screen cache that fetches each referenced record once
//! - **Resource Joining**: Appointments joined with their services, bookings with room,
//!   hotel and customer
//! - **Status Classification**: One table mapping backend statuses to labels, colors and icons
//! - **Booking Lifecycle**: Forward-only check-in/check-out, serialized per booking
//! - **View Aggregation**: Sorted, filtered screen rows with tab counts and pagination
//! - **Configuration-Based**: Labels and formats loaded from YAML
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use stayboard::prelude::*;
//!
//! let repository = Arc::new(InMemoryRepository::new());
//! let screen = ViewAggregator::new(repository, AggregatorConfig::default());
//!
//! let bookings = screen.room_bookings(&BookingFilter::for_hotel("H1")).await?;
//! for row in &bookings {
//!     println!("{} {} {}%", row.room_label, row.badge.label, row.progress);
//! }
//!
//! screen.check_in(bookings[0].id()).await?;
//! ```

pub mod config;
pub mod core;
pub mod entities;
pub mod join;
pub mod lifecycle;
pub mod status;
pub mod storage;
pub mod store;
pub mod view;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core Traits ===
    pub use crate::core::{
        Clock, ConflictReason, Entity, EntityKind, FixedClock, LifecycleError, ListFilter,
        Repository, ResolveError, SystemClock, ViewError, ViewResult,
    };

    // === Events ===
    pub use crate::core::{BookingEvent, EventBus, EventEnvelope};

    // === Entities ===
    pub use crate::entities::{
        Appointment, AppointmentStatus, BookingStatus, Customer, Hotel, Room, RoomBooking,
        RoomType, Service, ServiceAppointment, Shop,
    };

    // === Macros ===
    pub use crate::impl_entity;

    // === Aggregation ===
    pub use crate::join::{JoinedBooking, JoinedOrder, OrderLine, ResourceJoiner};
    pub use crate::lifecycle::BookingLifecycle;
    pub use crate::status::{OrderCategory, StatusBadge, StatusClassifier, stay_progress};
    pub use crate::store::EntityStore;
    pub use crate::view::{
        BookingFilter, CurrentOrder, EnhancedBooking, OrderFilter, Page, PageMeta, ViewAggregator,
    };

    // === Storage ===
    pub use crate::storage::InMemoryRepository;

    // === Config ===
    pub use crate::config::{AggregatorConfig, LabelConfig, LoggingConfig};

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use chrono::{DateTime, Utc};
    pub use serde::{Deserialize, Serialize};
    pub use std::sync::Arc;
    pub use uuid::Uuid;
}
