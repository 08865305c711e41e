//! Appointments and their service line items

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Progress of an appointment as reported by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AppointmentStatus {
    NoProgress,
    InProgress,
    Finish,
    Cancel,
}

impl AppointmentStatus {
    /// The backend encoding (e.g., "NoProgress")
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::NoProgress => "NoProgress",
            AppointmentStatus::InProgress => "InProgress",
            AppointmentStatus::Finish => "Finish",
            AppointmentStatus::Cancel => "Cancel",
        }
    }

    /// Finished appointments are history, not current orders
    pub fn is_current(&self) -> bool {
        !matches!(self, AppointmentStatus::Finish)
    }
}

/// A booked visit by a customer; created and mutated by the backend only
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    #[serde(deserialize_with = "crate::entities::id::deserialize")]
    pub id: String,

    #[serde(default, deserialize_with = "crate::entities::id::deserialize")]
    pub customer_id: String,

    pub status: AppointmentStatus,

    #[serde(default)]
    pub notes: Option<String>,

    #[serde(with = "crate::entities::datetime")]
    pub start_time: DateTime<Utc>,

    #[serde(default, with = "crate::entities::datetime::option")]
    pub end_time: Option<DateTime<Utc>>,

    #[serde(default)]
    pub location_type: Option<String>,

    /// Creation timestamp, when the backend provides one
    #[serde(default, with = "crate::entities::datetime::option")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Appointment {
    /// Timestamp used for "most recent first" ordering and relative labels
    pub fn created(&self) -> DateTime<Utc> {
        self.created_at.unwrap_or(self.start_time)
    }
}

crate::impl_entity!(Appointment, Appointment);

/// Join row between an appointment and one service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceAppointment {
    #[serde(deserialize_with = "crate::entities::id::deserialize")]
    pub id: String,

    #[serde(default, deserialize_with = "crate::entities::id::deserialize")]
    pub appointment_id: String,

    #[serde(default, deserialize_with = "crate::entities::id::deserialize")]
    pub service_id: String,

    #[serde(default, deserialize_with = "crate::entities::id::option::deserialize")]
    pub rating_id: Option<String>,
}

crate::impl_entity!(ServiceAppointment, ServiceAppointment);
