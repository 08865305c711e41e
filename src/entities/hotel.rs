//! Hotels, rooms and room bookings

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Check-in state of a room booking, encoded by the backend as 1, 2 or 3
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum BookingStatus {
    NotCheckedIn = 1,
    CheckedIn = 2,
    CheckedOut = 3,
}

impl BookingStatus {
    pub fn code(&self) -> u8 {
        *self as u8
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::NotCheckedIn => "not_checked_in",
            BookingStatus::CheckedIn => "checked_in",
            BookingStatus::CheckedOut => "checked_out",
        }
    }

    /// The only status this one may move to
    pub fn next(&self) -> Option<BookingStatus> {
        match self {
            BookingStatus::NotCheckedIn => Some(BookingStatus::CheckedIn),
            BookingStatus::CheckedIn => Some(BookingStatus::CheckedOut),
            BookingStatus::CheckedOut => None,
        }
    }

    pub fn can_transition_to(&self, target: BookingStatus) -> bool {
        self.next() == Some(target)
    }
}

impl TryFrom<u8> for BookingStatus {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(BookingStatus::NotCheckedIn),
            2 => Ok(BookingStatus::CheckedIn),
            3 => Ok(BookingStatus::CheckedOut),
            other => Err(format!("invalid booking status {}", other)),
        }
    }
}

impl From<BookingStatus> for u8 {
    fn from(status: BookingStatus) -> Self {
        status.code()
    }
}

/// A pet's stay in a hotel room; the one record this crate writes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomBooking {
    #[serde(deserialize_with = "crate::entities::id::deserialize")]
    pub id: String,

    #[serde(default, deserialize_with = "crate::entities::id::deserialize")]
    pub room_detail_id: String,

    #[serde(default, deserialize_with = "crate::entities::id::deserialize")]
    pub customer_id: String,

    #[serde(with = "crate::entities::datetime")]
    pub check_in_date: DateTime<Utc>,

    #[serde(with = "crate::entities::datetime")]
    pub check_out_date: DateTime<Utc>,

    #[serde(default)]
    pub total_night: u32,

    #[serde(default)]
    pub total_amount: f64,

    #[serde(default)]
    pub feeding_schedule: Option<String>,

    #[serde(default)]
    pub medication_schedule: Option<String>,

    pub status: BookingStatus,

    /// Backend fields not modelled here, written back unchanged
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

crate::impl_entity!(RoomBooking, RoomBooking);

/// Room category, encoded by the backend as 0..=3
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum RoomType {
    Economy = 0,
    Standard = 1,
    Suite = 2,
    Vip = 3,
}

impl RoomType {
    pub fn label(&self) -> &'static str {
        match self {
            RoomType::Economy => "Economy",
            RoomType::Standard => "Standard",
            RoomType::Suite => "Suite",
            RoomType::Vip => "VIP",
        }
    }
}

impl TryFrom<u8> for RoomType {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(RoomType::Economy),
            1 => Ok(RoomType::Standard),
            2 => Ok(RoomType::Suite),
            3 => Ok(RoomType::Vip),
            other => Err(format!("invalid room type {}", other)),
        }
    }
}

impl From<RoomType> for u8 {
    fn from(room_type: RoomType) -> Self {
        room_type as u8
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    #[serde(deserialize_with = "crate::entities::id::deserialize")]
    pub id: String,

    #[serde(default, deserialize_with = "crate::entities::id::deserialize")]
    pub room_number: String,

    pub room_type: RoomType,

    #[serde(default)]
    pub max_capacity: u32,

    #[serde(default)]
    pub daily_price: f64,

    #[serde(default, deserialize_with = "crate::entities::id::deserialize")]
    pub hotel_id: String,

    #[serde(default)]
    pub is_available: bool,
}

crate::impl_entity!(Room, Room);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hotel {
    #[serde(deserialize_with = "crate::entities::id::deserialize")]
    pub id: String,

    pub name: String,

    #[serde(default)]
    pub address_name: String,

    #[serde(default)]
    pub total_room: u32,

    #[serde(default)]
    pub available_room: u32,
}

crate::impl_entity!(Hotel, Hotel);
