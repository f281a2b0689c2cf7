use std::path::Path;

use async_trait::async_trait;
use northwind_core::{is_blank, CoreResult, Customer, CustomerOrderStore, Order};

use crate::parse::{customer_from_columns, order_from_columns, read_rows, Parsed};

/// Default file names inside the CSV data directory.
pub const CUSTOMERS_FILE: &str = "customers.csv";
pub const ORDERS_FILE: &str = "orders.csv";

/// Counters collected while loading the CSV files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub customers_loaded: usize,
    pub customers_discarded: usize,
    pub orders_loaded: usize,
    pub orders_discarded: usize,
}

/// In-memory Northwind data parsed once from the CSV exports.
///
/// The collections are never mutated after [`CsvDataStore::load`], so a
/// single instance can be shared across request tasks behind an `Arc`.
///
/// Matching rules:
/// - country: trimmed, case-insensitive substring; results sorted by contact
///   name ascending (missing contact sorts as `""`)
/// - customer id: case-insensitive equality; results sorted by shipped date
///   ascending with unshipped orders first
#[derive(Debug, Default)]
pub struct CsvDataStore {
    customers: Vec<Customer>,
    orders: Vec<Order>,
    report: LoadReport,
}

impl CsvDataStore {
    /// Loads both files. A missing file yields an empty collection.
    ///
    /// # Errors
    ///
    /// Returns an error when a file exists but cannot be read.
    pub fn load(customers_path: impl AsRef<Path>, orders_path: impl AsRef<Path>) -> CoreResult<Self> {
        let customers_path = customers_path.as_ref();
        let orders_path = orders_path.as_ref();

        let customers = load_if_present(customers_path, customer_from_columns)?;
        let orders = load_if_present(orders_path, order_from_columns)?;

        let report = LoadReport {
            customers_loaded: customers.rows.len(),
            customers_discarded: customers.discarded,
            orders_loaded: orders.rows.len(),
            orders_discarded: orders.discarded,
        };

        tracing::info!(
            customers = report.customers_loaded,
            orders = report.orders_loaded,
            "Loaded CSV data"
        );
        if report.customers_discarded > 0 || report.orders_discarded > 0 {
            tracing::debug!(
                customers_path = %customers_path.display(),
                orders_path = %orders_path.display(),
                customers_discarded = report.customers_discarded,
                orders_discarded = report.orders_discarded,
                "Discarded malformed CSV rows"
            );
        }

        Ok(Self {
            customers: customers.rows,
            orders: orders.rows,
            report,
        })
    }

    /// Loads `customers.csv` and `orders.csv` from `dir`.
    pub fn from_dir(dir: impl AsRef<Path>) -> CoreResult<Self> {
        let dir = dir.as_ref();
        Self::load(dir.join(CUSTOMERS_FILE), dir.join(ORDERS_FILE))
    }

    /// Builds a store from already-materialized rows.
    #[must_use]
    pub fn from_records(customers: Vec<Customer>, orders: Vec<Order>) -> Self {
        let report = LoadReport {
            customers_loaded: customers.len(),
            orders_loaded: orders.len(),
            ..LoadReport::default()
        };
        Self {
            customers,
            orders,
            report,
        }
    }

    #[must_use]
    pub fn report(&self) -> LoadReport {
        self.report
    }

    #[must_use]
    pub fn customers(&self) -> &[Customer] {
        &self.customers
    }

    #[must_use]
    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    /// Customers whose country contains `country`, ignoring case.
    #[must_use]
    pub fn customers_matching(&self, country: &str) -> Vec<Customer> {
        if is_blank(country) {
            return Vec::new();
        }

        let needle = country.trim().to_lowercase();
        let mut matches: Vec<Customer> = self
            .customers
            .iter()
            .filter(|c| {
                c.country
                    .as_deref()
                    .filter(|country| !is_blank(country))
                    .is_some_and(|country| country.to_lowercase().contains(&needle))
            })
            .cloned()
            .collect();

        // Stable sort; ties keep file order.
        matches.sort_by(|a, b| a.contact_sort_key().cmp(b.contact_sort_key()));
        matches
    }

    /// Orders whose customer id equals `customer_id`, ignoring case.
    #[must_use]
    pub fn orders_matching(&self, customer_id: &str) -> Vec<Order> {
        if is_blank(customer_id) {
            return Vec::new();
        }

        let wanted = customer_id.to_lowercase();
        let mut matches: Vec<Order> = self
            .orders
            .iter()
            .filter(|o| {
                o.customer_id
                    .as_deref()
                    .is_some_and(|id| id.to_lowercase() == wanted)
            })
            .cloned()
            .collect();

        // Stable sort; unshipped (`None`) first, ties keep file order.
        matches.sort_by_key(|o| o.shipped_date);
        matches
    }
}

fn load_if_present<T>(
    path: &Path,
    map_row: impl Fn(&[String]) -> Option<T>,
) -> CoreResult<Parsed<T>> {
    if !path.exists() {
        tracing::warn!(path = %path.display(), "CSV file not found, using empty collection");
        return Ok(Parsed::default());
    }
    read_rows(path, map_row)
}

#[async_trait]
impl CustomerOrderStore for CsvDataStore {
    fn name(&self) -> &'static str {
        "csv"
    }

    async fn customers_by_country(&self, country: &str) -> CoreResult<Vec<Customer>> {
        Ok(self.customers_matching(country))
    }

    async fn orders_for_customer(&self, customer_id: &str) -> CoreResult<Vec<Order>> {
        Ok(self.orders_matching(customer_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn store() -> CsvDataStore {
        let customers = vec![
            Customer::new("ALFKI", "Alfreds Futterkiste")
                .with_contact("Maria Anders")
                .with_country("Germany"),
            Customer::new("BLAUS", "Blauer See Delikatessen")
                .with_contact("Hanna Moos")
                .with_country("Germany"),
            Customer::new("DRACD", "Drachenblut Delikatessen").with_country("Germany"),
            Customer::new("AROUT", "Around the Horn")
                .with_contact("Thomas Hardy")
                .with_country("UK"),
            Customer::new("NOCTY", "No Country").with_contact("Zed"),
        ];

        let shipped = |d: u32| {
            NaiveDate::from_ymd_opt(1997, 9, d)
                .unwrap()
                .and_hms_opt(0, 0, 0)
        };
        let orders = vec![
            Order::new(3, Some("ALFKI".into())).with_shipped_date(shipped(20)),
            Order::new(1, Some("alfki".into())).with_shipped_date(shipped(2)),
            Order::new(2, Some("ALFKI".into())),
            Order::new(4, Some("BLAUS".into())).with_shipped_date(shipped(1)),
            Order::new(5, None),
        ];

        CsvDataStore::from_records(customers, orders)
    }

    #[test]
    fn country_match_is_case_insensitive_substring() {
        let store = store();
        for query in ["german", "GERMANY", "many", "  Germany  "] {
            let ids: Vec<_> = store
                .customers_matching(query)
                .into_iter()
                .map(|c| c.customer_id)
                .collect();
            assert_eq!(ids, vec!["DRACD", "BLAUS", "ALFKI"], "query {query:?}");
        }
    }

    #[test]
    fn unknown_country_is_empty() {
        assert!(store().customers_matching("Atlantis").is_empty());
    }

    #[test]
    fn blank_inputs_are_empty() {
        let store = store();
        assert!(store.customers_matching("").is_empty());
        assert!(store.customers_matching("   ").is_empty());
        assert!(store.orders_matching("").is_empty());
        assert!(store.orders_matching("\t").is_empty());
    }

    #[test]
    fn orders_sorted_by_shipped_date_with_unshipped_first() {
        let ids: Vec<i32> = store()
            .orders_matching("Alfki")
            .into_iter()
            .map(|o| o.order_id)
            .collect();
        assert_eq!(ids, vec![2, 1, 3]);
    }

    #[test]
    fn equal_shipped_dates_keep_file_order() {
        let day = NaiveDate::from_ymd_opt(1997, 10, 3).and_then(|d| d.and_hms_opt(0, 0, 0));
        let store = CsvDataStore::from_records(
            Vec::new(),
            vec![
                Order::new(10692, Some("ALFKI".into())).with_shipped_date(day),
                Order::new(10702, Some("ALFKI".into())),
                Order::new(10643, Some("ALFKI".into())).with_shipped_date(day),
                Order::new(10835, Some("ALFKI".into())),
            ],
        );

        let ids: Vec<i32> = store
            .orders_matching("ALFKI")
            .into_iter()
            .map(|o| o.order_id)
            .collect();
        assert_eq!(ids, vec![10702, 10835, 10692, 10643]);
    }

    #[test]
    fn equal_contact_names_keep_file_order() {
        let store = CsvDataStore::from_records(
            vec![
                Customer::new("WOLZA", "Wolski Zajazd")
                    .with_contact("Zbyszek")
                    .with_country("Poland"),
                Customer::new("SECND", "Second Shop")
                    .with_contact("Anna Nowak")
                    .with_country("Poland"),
                Customer::new("FIRST", "First Shop")
                    .with_contact("Anna Nowak")
                    .with_country("Poland"),
                Customer::new("NOCON", "No Contact").with_country("Poland"),
                Customer::new("NOCO2", "No Contact Either").with_country("Poland"),
            ],
            Vec::new(),
        );

        let ids: Vec<String> = store
            .customers_matching("poland")
            .into_iter()
            .map(|c| c.customer_id)
            .collect();
        assert_eq!(ids, vec!["NOCON", "NOCO2", "SECND", "FIRST", "WOLZA"]);
    }
}
