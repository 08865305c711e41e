//! Room-booking join: bookings → rooms → hotels, plus customers

use super::{ResourceJoiner, settle};
use crate::core::{Entity, EntityKind, ListFilter};
use crate::entities::{Customer, Hotel, Room, RoomBooking};
use std::collections::HashMap;

/// A booking with whatever references could be resolved
#[derive(Debug, Clone, PartialEq)]
pub struct JoinedBooking {
    pub booking: RoomBooking,
    pub room: Option<Room>,
    pub hotel: Option<Hotel>,
    pub customer: Option<Customer>,
}

impl ResourceJoiner<'_> {
    /// Join bookings with their room, hotel and customer.
    ///
    /// Rooms are read with one unfiltered list call and indexed by id. Hotels
    /// and customers go through the store, each distinct id once. Every
    /// booking produces a row, in input order, whatever failed to resolve.
    pub async fn join_bookings(&self, bookings: Vec<RoomBooking>) -> Vec<JoinedBooking> {
        if bookings.is_empty() {
            return Vec::new();
        }

        let rooms = self.room_index().await;

        let hotel_ids = bookings
            .iter()
            .filter_map(|booking| rooms.get(&booking.room_detail_id))
            .map(|room| room.hotel_id.as_str());
        let customer_ids = bookings.iter().map(|booking| booking.customer_id.as_str());

        let (hotels, customers) = futures::join!(
            self.store.resolve_many_as::<Hotel, _, _>(hotel_ids),
            self.store.resolve_many_as::<Customer, _, _>(customer_ids),
        );

        bookings
            .into_iter()
            .map(|booking| {
                let room = rooms.get(&booking.room_detail_id).cloned();
                if room.is_none() {
                    tracing::warn!(
                        booking = %booking.id,
                        room = %booking.room_detail_id,
                        "room left unresolved"
                    );
                }
                let hotel = room
                    .as_ref()
                    .and_then(|room| settle(hotels.get(&room.hotel_id), &booking.id, "hotel"));
                let customer = settle(customers.get(&booking.customer_id), &booking.id, "customer");

                JoinedBooking {
                    booking,
                    room,
                    hotel,
                    customer,
                }
            })
            .collect()
    }

    /// All rooms, keyed by id. A failed call yields an empty index.
    async fn room_index(&self) -> HashMap<String, Room> {
        let records = match self
            .repository
            .fetch_list(EntityKind::Room, &ListFilter::new())
            .await
        {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(error = %e, "room list fetch failed, rooms left unresolved");
                return HashMap::new();
            }
        };

        records
            .iter()
            .filter_map(|record| match Room::from_record(record) {
                Ok(room) => Some((room.id.clone(), room)),
                Err(e) => {
                    tracing::warn!(error = %e, "skipping malformed room");
                    None
                }
            })
            .collect()
    }
}
