//! View models handed to presentation, and the filters that select them

use crate::core::ListFilter;
use crate::entities::{AppointmentStatus, BookingStatus, Hotel, Room, RoomBooking};
use crate::join::OrderLine;
use crate::status::{OrderCategory, StatusBadge};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Relative and absolute renderings of an order's time
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Schedule {
    /// e.g. "3 hours ago", from the creation timestamp
    pub relative: String,
    /// e.g. "10/01/2025 09:00", from the start time
    pub absolute: String,
}

/// One row of the "current orders" screen
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentOrder {
    pub appointment_id: String,
    pub customer_id: String,
    pub status: AppointmentStatus,
    pub category: OrderCategory,
    pub badge: StatusBadge,
    pub lines: Vec<OrderLine>,
    pub total_amount: f64,
    /// Resolved lazily through
    /// [`ViewAggregator::shop_name`](crate::view::ViewAggregator::shop_name)
    pub shop_id: Option<String>,
    pub notes: Option<String>,
    pub location_type: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub schedule: Schedule,
}

/// One row of the "hotel room management" screen
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnhancedBooking {
    pub booking: RoomBooking,
    pub room: Option<Room>,
    pub hotel: Option<Hotel>,
    /// Customer's name, or the placeholder
    pub customer_name: String,
    /// Room number and type, or the placeholder
    pub room_label: String,
    /// Hotel name, or the placeholder
    pub hotel_name: String,
    pub badge: StatusBadge,
    /// Stay progress, 0..=100
    pub progress: u8,
}

impl EnhancedBooking {
    pub fn id(&self) -> &str {
        &self.booking.id
    }

    pub fn status(&self) -> BookingStatus {
        self.booking.status
    }
}

/// Root filter for the current-orders screen
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderFilter {
    pub customer_id: Option<String>,
    pub status: Option<AppointmentStatus>,
}

impl OrderFilter {
    pub fn for_customer(customer_id: impl Into<String>) -> Self {
        Self {
            customer_id: Some(customer_id.into()),
            status: None,
        }
    }

    pub fn with_status(mut self, status: AppointmentStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn to_list_filter(&self) -> ListFilter {
        ListFilter::new()
            .eq_opt("customer_id", self.customer_id.as_deref())
            .eq_opt("status", self.status.map(|status| status.as_str()))
    }
}

/// Root filter for the hotel room management screen
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookingFilter {
    /// Pushed down to the booking list call
    pub customer_id: Option<String>,
    /// Applied after the join, on the booking's room
    pub hotel_id: Option<String>,
}

impl BookingFilter {
    pub fn for_customer(customer_id: impl Into<String>) -> Self {
        Self {
            customer_id: Some(customer_id.into()),
            hotel_id: None,
        }
    }

    pub fn for_hotel(hotel_id: impl Into<String>) -> Self {
        Self {
            customer_id: None,
            hotel_id: Some(hotel_id.into()),
        }
    }

    pub fn to_list_filter(&self) -> ListFilter {
        ListFilter::new().eq_opt("customer_id", self.customer_id.as_deref())
    }

    /// Whether a joined row passes the in-memory part of the filter
    pub fn admits(&self, room: Option<&Room>) -> bool {
        match &self.hotel_id {
            None => true,
            Some(hotel_id) => room.is_some_and(|room| &room.hotel_id == hotel_id),
        }
    }
}
