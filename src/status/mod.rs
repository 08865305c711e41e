//! Status classification and time-derived fields
//!
//! Everything here is pure: no I/O, no mutable state.

pub mod classifier;
pub mod progress;

pub use classifier::{OrderCategory, OrderStatus, StatusBadge, StatusClassifier};
pub use progress::{RelativeAge, relative_age, stay_progress};
