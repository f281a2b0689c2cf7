//! Core domain types and traits for the Northwind lookup service.

pub mod customer;
pub mod error;
pub mod order;
pub mod tracking;
pub mod traits;

pub use customer::Customer;
pub use error::{CoreError, CoreResult};
pub use order::Order;
pub use tracking::{format_timestamp, parse_timestamp, TrackingEntry, UNKNOWN_SOURCE_IP};
pub use traits::{ConnectionProbe, CustomerOrderStore, RequestTracker};

/// Returns `true` when a lookup argument carries no usable text.
///
/// Both read operations answer blank input with an empty list without
/// consulting any backend.
#[must_use]
pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}
