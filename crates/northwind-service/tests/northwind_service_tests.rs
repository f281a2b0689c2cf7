use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use northwind_core::{
    CoreError, CoreResult, Customer, CustomerOrderStore, Order, RequestTracker, TrackingEntry,
};
use northwind_csv::CsvDataStore;
use northwind_service::{DataSourceAvailability, NorthwindService, TrackingService};

/// Store that either answers with fixed rows or fails every call.
struct MockStore {
    name: &'static str,
    fail: bool,
    calls: AtomicUsize,
    customers: Vec<Customer>,
    orders: Vec<Order>,
}

impl MockStore {
    fn healthy(name: &'static str, customers: Vec<Customer>, orders: Vec<Order>) -> Arc<Self> {
        Arc::new(Self {
            name,
            fail: false,
            calls: AtomicUsize::new(0),
            customers,
            orders,
        })
    }

    fn failing(name: &'static str) -> Arc<Self> {
        Arc::new(Self {
            name,
            fail: true,
            calls: AtomicUsize::new(0),
            customers: Vec::new(),
            orders: Vec::new(),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CustomerOrderStore for MockStore {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn customers_by_country(&self, _country: &str) -> CoreResult<Vec<Customer>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(CoreError::unavailable("mock", "connection reset"));
        }
        Ok(self.customers.clone())
    }

    async fn orders_for_customer(&self, _customer_id: &str) -> CoreResult<Vec<Order>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(CoreError::unavailable("mock", "connection reset"));
        }
        Ok(self.orders.clone())
    }
}

fn csv_fallback() -> Arc<CsvDataStore> {
    Arc::new(CsvDataStore::from_records(
        vec![
            Customer::new("ALFKI", "Alfreds Futterkiste")
                .with_contact("Maria Anders")
                .with_country("Germany"),
            Customer::new("AROUT", "Around the Horn")
                .with_contact("Thomas Hardy")
                .with_country("UK"),
        ],
        vec![Order::new(10643, Some("ALFKI".into()))],
    ))
}

#[tokio::test]
async fn relational_results_are_returned_when_available() {
    let relational = MockStore::healthy(
        "relational",
        vec![Customer::new("BLAUS", "Blauer See Delikatessen").with_country("Germany")],
        Vec::new(),
    );
    let fallback = MockStore::healthy("csv", Vec::new(), Vec::new());
    let service = NorthwindService::new(
        DataSourceAvailability::Relational,
        Some(relational.clone() as Arc<dyn CustomerOrderStore>),
        fallback.clone(),
    );

    let customers = service.customers_by_country("Germany").await;

    assert_eq!(customers.len(), 1);
    assert_eq!(customers[0].customer_id, "BLAUS");
    assert_eq!(relational.calls(), 1);
    assert_eq!(fallback.calls(), 0);
    assert_eq!(service.source_name(), "relational");
}

#[tokio::test]
async fn relational_failure_falls_back_to_csv_for_that_call() {
    let relational = MockStore::failing("relational");
    let service = NorthwindService::new(
        DataSourceAvailability::Relational,
        Some(relational.clone() as Arc<dyn CustomerOrderStore>),
        csv_fallback(),
    );

    let customers = service.customers_by_country("germany").await;
    assert_eq!(customers.len(), 1);
    assert_eq!(customers[0].customer_id, "ALFKI");

    let orders = service.orders_by_customer("alfki").await;
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].order_id, 10643);

    // Each call retries the relational store first.
    assert_eq!(relational.calls(), 2);
    assert_eq!(service.availability(), DataSourceAvailability::Relational);
}

#[tokio::test]
async fn unavailable_relational_store_is_never_called() {
    let relational = MockStore::failing("relational");
    let service = NorthwindService::new(
        DataSourceAvailability::CsvFallback,
        Some(relational.clone() as Arc<dyn CustomerOrderStore>),
        csv_fallback(),
    );

    let customers = service.customers_by_country("UK").await;

    assert_eq!(customers.len(), 1);
    assert_eq!(customers[0].customer_id, "AROUT");
    assert_eq!(relational.calls(), 0);
    assert_eq!(service.source_name(), "csv");
}

#[tokio::test]
async fn blank_input_returns_empty_without_backend_calls() {
    let relational = MockStore::healthy("relational", Vec::new(), Vec::new());
    let fallback = MockStore::healthy("csv", Vec::new(), Vec::new());
    let service = NorthwindService::new(
        DataSourceAvailability::Relational,
        Some(relational.clone() as Arc<dyn CustomerOrderStore>),
        fallback.clone(),
    );

    assert!(service.customers_by_country("").await.is_empty());
    assert!(service.customers_by_country("   ").await.is_empty());
    assert!(service.orders_by_customer("").await.is_empty());
    assert!(service.orders_by_customer("\t").await.is_empty());

    assert_eq!(relational.calls(), 0);
    assert_eq!(fallback.calls(), 0);
}

#[tokio::test]
async fn failing_fallback_yields_empty_lists() {
    let service = NorthwindService::csv_only(MockStore::failing("csv"));

    assert!(service.customers_by_country("Germany").await.is_empty());
    assert!(service.orders_by_customer("ALFKI").await.is_empty());
}

#[tokio::test]
async fn unknown_country_returns_empty() {
    let service = NorthwindService::csv_only(csv_fallback());

    assert!(service.customers_by_country("Atlantis").await.is_empty());
}

#[tokio::test]
async fn csv_matching_is_case_insensitive_substring() {
    let service = NorthwindService::csv_only(csv_fallback());

    for query in ["german", "GERMANY", "many", "  Germany  "] {
        let customers = service.customers_by_country(query).await;
        assert_eq!(customers.len(), 1, "query {query:?}");
        assert_eq!(customers[0].customer_id, "ALFKI");
    }
}

struct BrokenTracker;

#[async_trait]
impl RequestTracker for BrokenTracker {
    fn name(&self) -> &'static str {
        "broken"
    }

    async fn track(&self, _url_request: &str, _source_ip: &str) -> CoreResult<TrackingEntry> {
        Err(CoreError::internal("disk full"))
    }

    async fn recent(&self, _limit: usize) -> CoreResult<Vec<TrackingEntry>> {
        Ok(Vec::new())
    }
}

#[tokio::test]
async fn tracking_failures_are_swallowed() {
    let tracking = TrackingService::new(Arc::new(BrokenTracker));

    assert!(tracking.record("/Customers", "127.0.0.1").await.is_none());
    assert_eq!(tracking.backend(), "broken");
}
