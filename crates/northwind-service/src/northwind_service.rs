use std::sync::Arc;

use northwind_core::{is_blank, CoreResult, Customer, CustomerOrderStore, Order};
use tracing::{debug, error};

use crate::health::DataSourceAvailability;

/// Read facade over the relational store with per-call CSV fallback.
///
/// Never returns an error: a failing relational call is logged and answered
/// from the CSV store, and a failing CSV call yields an empty list.
pub struct NorthwindService {
    availability: DataSourceAvailability,
    relational: Option<Arc<dyn CustomerOrderStore>>,
    fallback: Arc<dyn CustomerOrderStore>,
}

impl NorthwindService {
    /// `relational` is only consulted when `availability` is
    /// [`DataSourceAvailability::Relational`].
    pub fn new(
        availability: DataSourceAvailability,
        relational: Option<Arc<dyn CustomerOrderStore>>,
        fallback: Arc<dyn CustomerOrderStore>,
    ) -> Self {
        Self {
            availability,
            relational,
            fallback,
        }
    }

    /// Facade that never touches a relational store.
    pub fn csv_only(fallback: Arc<dyn CustomerOrderStore>) -> Self {
        Self::new(DataSourceAvailability::CsvFallback, None, fallback)
    }

    pub fn availability(&self) -> DataSourceAvailability {
        self.availability
    }

    /// Name of the backend answering reads.
    pub fn source_name(&self) -> &'static str {
        match self.active_relational() {
            Some(store) => store.name(),
            None => self.fallback.name(),
        }
    }

    pub async fn customers_by_country(&self, country: &str) -> Vec<Customer> {
        if is_blank(country) {
            return Vec::new();
        }

        if let Some(store) = self.active_relational() {
            match store.customers_by_country(country).await {
                Ok(customers) => {
                    debug!(
                        country,
                        count = customers.len(),
                        source = store.name(),
                        "Customers loaded"
                    );
                    return customers;
                }
                Err(e) => {
                    error!(
                        country,
                        source = store.name(),
                        error = %e,
                        "Customer lookup failed, using CSV fallback"
                    );
                }
            }
        }

        let result = self.fallback.customers_by_country(country).await;
        self.from_fallback(result, "customers_by_country")
    }

    pub async fn orders_by_customer(&self, customer_id: &str) -> Vec<Order> {
        if is_blank(customer_id) {
            return Vec::new();
        }

        if let Some(store) = self.active_relational() {
            match store.orders_for_customer(customer_id).await {
                Ok(orders) => {
                    debug!(
                        customer_id,
                        count = orders.len(),
                        source = store.name(),
                        "Orders loaded"
                    );
                    return orders;
                }
                Err(e) => {
                    error!(
                        customer_id,
                        source = store.name(),
                        error = %e,
                        "Order lookup failed, using CSV fallback"
                    );
                }
            }
        }

        let result = self.fallback.orders_for_customer(customer_id).await;
        self.from_fallback(result, "orders_by_customer")
    }

    fn active_relational(&self) -> Option<&Arc<dyn CustomerOrderStore>> {
        if self.availability.is_relational() {
            self.relational.as_ref()
        } else {
            None
        }
    }

    fn from_fallback<T>(&self, result: CoreResult<Vec<T>>, operation: &'static str) -> Vec<T> {
        match result {
            Ok(items) => items,
            Err(e) => {
                error!(
                    operation,
                    source = self.fallback.name(),
                    error = %e,
                    "Fallback lookup failed"
                );
                Vec::new()
            }
        }
    }
}
