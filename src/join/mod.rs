//! Denormalization of root records into view rows
//!
//! The joiner never fetches the same foreign id twice: list-shaped lookups
//! (join table, rooms) are fetched once per call and indexed in memory, and
//! single references go through the screen's [`EntityStore`].
//!
//! Field-level failures degrade to `None` and are logged. Only the join-table
//! list call can fail a whole order join.

pub mod bookings;
pub mod orders;

pub use bookings::JoinedBooking;
pub use orders::{JoinedOrder, OrderLine};

use crate::core::{Repository, ResolveError};
use crate::entities::Shop;
use crate::store::EntityStore;

/// Joins root records against their references
#[derive(Clone, Copy)]
pub struct ResourceJoiner<'a> {
    repository: &'a dyn Repository,
    store: &'a EntityStore,
}

impl<'a> ResourceJoiner<'a> {
    pub fn new(repository: &'a dyn Repository, store: &'a EntityStore) -> Self {
        Self { repository, store }
    }

    /// Resolve the shop of an order row.
    ///
    /// Called per rendered row rather than during the join, so shop fetches
    /// scale with what is on screen.
    pub async fn resolve_shop(&self, shop_id: Option<&str>) -> Result<Shop, ResolveError> {
        self.store.resolve_as::<Shop>(shop_id.unwrap_or_default()).await
    }
}

/// Take a resolved reference, logging why it is missing otherwise
fn settle<T: Clone>(
    outcome: Option<&Result<T, ResolveError>>,
    root_id: &str,
    field: &'static str,
) -> Option<T> {
    match outcome {
        Some(Ok(value)) => Some(value.clone()),
        Some(Err(ResolveError::NotResolvable { .. })) => {
            tracing::debug!(root = %root_id, field, "reference is blank");
            None
        }
        Some(Err(e)) => {
            tracing::warn!(root = %root_id, field, error = %e, "reference left unresolved");
            None
        }
        None => None,
    }
}
