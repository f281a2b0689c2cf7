use async_trait::async_trait;

use crate::customer::Customer;
use crate::error::CoreResult;
use crate::order::Order;
use crate::tracking::TrackingEntry;

/// Read capability shared by the relational and CSV backends.
///
/// Matching and ordering rules differ per backend and are documented on each
/// implementation.
#[async_trait]
pub trait CustomerOrderStore: Send + Sync {
    /// Short backend name used in logs (e.g. `"sqlite"`, `"csv"`).
    fn name(&self) -> &'static str;

    /// Lists customers located in `country`.
    async fn customers_by_country(&self, country: &str) -> CoreResult<Vec<Customer>>;

    /// Lists orders placed by `customer_id`.
    async fn orders_for_customer(&self, customer_id: &str) -> CoreResult<Vec<Order>>;
}

/// Append-only sink for request audit records.
#[async_trait]
pub trait RequestTracker: Send + Sync {
    /// Short backend name used in logs.
    fn name(&self) -> &'static str;

    /// Assigns the next identifier, stamps the current UTC time and persists
    /// the entry. Identifier assignment and persistence happen under one
    /// exclusive section.
    async fn track(&self, url_request: &str, source_ip: &str) -> CoreResult<TrackingEntry>;

    /// Returns up to `limit` entries, newest first.
    async fn recent(&self, limit: usize) -> CoreResult<Vec<TrackingEntry>>;
}

/// Single reachability check against the relational store.
#[async_trait]
pub trait ConnectionProbe: Send + Sync {
    /// Opens a fresh connection, verifies it answers, and closes it.
    async fn probe(&self) -> CoreResult<()>;
}
