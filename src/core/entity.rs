//! Entity traits defining the core abstraction for every backend record

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// The kinds of records the core knows how to read.
///
/// The variants mirror the backend resources one-to-one. A kind is half of the
/// cache key used by [`EntityStore`](crate::store::EntityStore); the other
/// half is the record id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Appointment,
    ServiceAppointment,
    Service,
    Shop,
    Customer,
    RoomBooking,
    Room,
    Hotel,
}

impl EntityKind {
    /// Every kind, in declaration order
    pub const ALL: [EntityKind; 8] = [
        EntityKind::Appointment,
        EntityKind::ServiceAppointment,
        EntityKind::Service,
        EntityKind::Shop,
        EntityKind::Customer,
        EntityKind::RoomBooking,
        EntityKind::Room,
        EntityKind::Hotel,
    ];

    /// The singular resource name (e.g., "room_booking")
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Appointment => "appointment",
            EntityKind::ServiceAppointment => "service_appointment",
            EntityKind::Service => "service",
            EntityKind::Shop => "shop",
            EntityKind::Customer => "customer",
            EntityKind::RoomBooking => "room_booking",
            EntityKind::Room => "room",
            EntityKind::Hotel => "hotel",
        }
    }

    /// The plural resource name used by REST collaborators (e.g., "room_bookings")
    pub fn resource_name(&self) -> &'static str {
        match self {
            EntityKind::Appointment => "appointments",
            EntityKind::ServiceAppointment => "service_appointments",
            EntityKind::Service => "services",
            EntityKind::Shop => "shops",
            EntityKind::Customer => "customers",
            EntityKind::RoomBooking => "room_bookings",
            EntityKind::Room => "rooms",
            EntityKind::Hotel => "hotels",
        }
    }

    /// Name of the field holding the record's identity.
    ///
    /// Customers are keyed by their account id, which is also the auth-user id.
    pub fn id_field(&self) -> &'static str {
        match self {
            EntityKind::Customer => "account_id",
            _ => "id",
        }
    }

    /// Read the identity out of a raw record, if present and non-blank
    pub fn record_id(&self, record: &Value) -> Option<String> {
        match record.get(self.id_field())? {
            Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Base trait for all typed records.
///
/// Records travel through the [`Repository`](crate::core::Repository) as JSON;
/// this trait ties a Rust type to its [`EntityKind`] and provides the
/// conversions in both directions.
pub trait Entity: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
    /// The kind this type is stored under
    const KIND: EntityKind;

    /// Get the identity of this record
    fn id(&self) -> &str;

    /// Decode a raw record
    fn from_record(record: &Value) -> Result<Self, serde_json::Error> {
        Self::deserialize(record)
    }

    /// Encode this record for a full-record write
    fn to_record(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}
