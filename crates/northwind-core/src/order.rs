use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A Northwind order header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    #[serde(rename = "OrderID")]
    pub order_id: i32,
    /// Loose reference to a customer; not enforced by either backend.
    #[serde(rename = "CustomerID")]
    pub customer_id: Option<String>,
    #[serde(rename = "OrderDate")]
    pub order_date: Option<NaiveDateTime>,
    #[serde(rename = "ShippedDate")]
    pub shipped_date: Option<NaiveDateTime>,
}

impl Order {
    #[must_use]
    pub fn new(order_id: i32, customer_id: Option<String>) -> Self {
        Self {
            order_id,
            customer_id,
            order_date: None,
            shipped_date: None,
        }
    }

    #[must_use]
    pub fn with_order_date(mut self, order_date: Option<NaiveDateTime>) -> Self {
        self.order_date = order_date;
        self
    }

    #[must_use]
    pub fn with_shipped_date(mut self, shipped_date: Option<NaiveDateTime>) -> Self {
        self.shipped_date = shipped_date;
        self
    }
}
