//! Screen-level aggregation
//!
//! A [`ViewAggregator`] builds the rows of the "current orders" and "hotel
//! room management" screens and routes check-in/check-out through the
//! booking lifecycle.

pub mod aggregator;
pub mod model;
pub mod page;

pub use aggregator::ViewAggregator;
pub use model::{BookingFilter, CurrentOrder, EnhancedBooking, OrderFilter, Schedule};
pub use page::{MAX_LIMIT, Page, PageMeta, paginate};
