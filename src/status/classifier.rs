//! Single table mapping backend statuses to display tuples

use crate::config::{AggregatorConfig, BadgeConfig, LabelConfig};
use crate::entities::{AppointmentStatus, BookingStatus};
use crate::status::progress::{RelativeAge, relative_age};
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const DEFAULT_DATE_FORMAT: &str = "%d/%m/%Y %H:%M";

/// Tab an order is listed under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderCategory {
    Pending,
    InProgress,
    Cancelled,
}

impl OrderCategory {
    pub const ALL: [OrderCategory; 3] = [
        OrderCategory::Pending,
        OrderCategory::InProgress,
        OrderCategory::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderCategory::Pending => "pending",
            OrderCategory::InProgress => "in_progress",
            OrderCategory::Cancelled => "cancelled",
        }
    }

    /// Category of an appointment status; finished appointments have none
    pub fn of(status: AppointmentStatus) -> Option<OrderCategory> {
        match status {
            AppointmentStatus::NoProgress => Some(OrderCategory::Pending),
            AppointmentStatus::InProgress => Some(OrderCategory::InProgress),
            AppointmentStatus::Cancel => Some(OrderCategory::Cancelled),
            AppointmentStatus::Finish => None,
        }
    }
}

/// Rendered badge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusBadge {
    pub label: String,
    pub color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl From<&BadgeConfig> for StatusBadge {
    fn from(config: &BadgeConfig) -> Self {
        Self {
            label: config.label.clone(),
            color: config.color.clone(),
            icon: config.icon.clone(),
        }
    }
}

/// Category plus badge of a current order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderStatus {
    pub category: OrderCategory,
    pub badge: StatusBadge,
}

/// Pure mapping from raw statuses and timestamps to display values.
///
/// Holds only immutable label tables; no I/O.
#[derive(Debug, Clone)]
pub struct StatusClassifier {
    labels: LabelConfig,
    date_format: String,
}

impl Default for StatusClassifier {
    fn default() -> Self {
        Self::new(LabelConfig::default(), DEFAULT_DATE_FORMAT)
    }
}

impl StatusClassifier {
    /// Build a classifier; an unusable date format falls back to the default
    pub fn new(labels: LabelConfig, date_format: &str) -> Self {
        let valid = !date_format.is_empty()
            && !StrftimeItems::new(date_format).any(|item| matches!(item, Item::Error));
        let date_format = if valid {
            date_format.to_string()
        } else {
            tracing::warn!(format = %date_format, "invalid date format, using default");
            DEFAULT_DATE_FORMAT.to_string()
        };
        Self {
            labels,
            date_format,
        }
    }

    pub fn from_config(config: &AggregatorConfig) -> Self {
        Self::new(config.labels.clone(), &config.date_format)
    }

    /// Classify an appointment; `None` means it is not a current order
    pub fn classify_appointment(&self, status: AppointmentStatus) -> Option<OrderStatus> {
        let category = OrderCategory::of(status)?;
        Some(OrderStatus {
            category,
            badge: self.category_badge(category),
        })
    }

    pub fn category_badge(&self, category: OrderCategory) -> StatusBadge {
        let labels = &self.labels.appointments;
        match category {
            OrderCategory::Pending => (&labels.pending).into(),
            OrderCategory::InProgress => (&labels.in_progress).into(),
            OrderCategory::Cancelled => (&labels.cancelled).into(),
        }
    }

    pub fn classify_booking(&self, status: BookingStatus) -> StatusBadge {
        let labels = &self.labels.bookings;
        match status {
            BookingStatus::NotCheckedIn => (&labels.not_checked_in).into(),
            BookingStatus::CheckedIn => (&labels.checked_in).into(),
            BookingStatus::CheckedOut => (&labels.checked_out).into(),
        }
    }

    /// "just now", "<N> hours ago" or "<N> days ago"
    pub fn relative_time(&self, timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
        let templates = &self.labels.relative_time;
        match relative_age(timestamp, now) {
            RelativeAge::JustNow => templates.just_now.clone(),
            RelativeAge::Hours(n) => templates.hours_ago.replace("{n}", &n.to_string()),
            RelativeAge::Days(n) => templates.days_ago.replace("{n}", &n.to_string()),
        }
    }

    pub fn absolute_time(&self, timestamp: DateTime<Utc>) -> String {
        timestamp.format(&self.date_format).to_string()
    }
}
