//! SQLite implementation of the Northwind customer/order read store.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use northwind_core::{CoreError, CoreResult, Customer, CustomerOrderStore, Order};
use sqlx::sqlite::SqliteRow;
use sqlx::{query, Row, SqlitePool};

use crate::util::map_sqlx_error;

/// SQLite-backed customer/order store.
///
/// Matching is exact equality on `country` and `customer_id`. Orders come
/// back newest `order_date` first, unlike the CSV store which orders by
/// shipped date ascending.
pub struct SqliteNorthwindStore {
    pool: SqlitePool,
}

impl SqliteNorthwindStore {
    /// Creates a new store backed by the provided pool.
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Returns the underlying pool (useful for composing with other services).
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Upserts customers in one transaction. Returns the number of rows written.
    pub async fn insert_customers(&self, customers: &[Customer]) -> CoreResult<u64> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;
        let mut written = 0;

        for customer in customers {
            written += query(
                "INSERT OR REPLACE INTO customers (customer_id, company_name, contact_name, country, phone, fax)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )
            .bind(&customer.customer_id)
            .bind(&customer.company_name)
            .bind(&customer.contact_name)
            .bind(&customer.country)
            .bind(&customer.phone)
            .bind(&customer.fax)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?
            .rows_affected();
        }

        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(written)
    }

    /// Upserts orders in one transaction. Returns the number of rows written.
    pub async fn insert_orders(&self, orders: &[Order]) -> CoreResult<u64> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;
        let mut written = 0;

        for order in orders {
            written += query(
                "INSERT OR REPLACE INTO orders (order_id, customer_id, order_date, shipped_date)
                 VALUES (?1, ?2, ?3, ?4)",
            )
            .bind(order.order_id)
            .bind(&order.customer_id)
            .bind(order.order_date)
            .bind(order.shipped_date)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?
            .rows_affected();
        }

        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(written)
    }
}

#[async_trait]
impl CustomerOrderStore for SqliteNorthwindStore {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    async fn customers_by_country(&self, country: &str) -> CoreResult<Vec<Customer>> {
        let rows = query(
            "SELECT customer_id, company_name, contact_name, country, phone, fax
             FROM customers WHERE country = ?1 ORDER BY customer_id",
        )
        .bind(country)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.iter().map(parse_customer_row).collect()
    }

    async fn orders_for_customer(&self, customer_id: &str) -> CoreResult<Vec<Order>> {
        let rows = query(
            "SELECT order_id, customer_id, order_date, shipped_date
             FROM orders WHERE customer_id = ?1 ORDER BY order_date DESC",
        )
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.iter().map(parse_order_row).collect()
    }
}

fn parse_customer_row(row: &SqliteRow) -> CoreResult<Customer> {
    Ok(Customer {
        customer_id: try_get(row, "customer_id")?,
        company_name: try_get(row, "company_name")?,
        contact_name: try_get(row, "contact_name")?,
        country: try_get(row, "country")?,
        phone: try_get(row, "phone")?,
        fax: try_get(row, "fax")?,
    })
}

fn parse_order_row(row: &SqliteRow) -> CoreResult<Order> {
    let order_date: Option<NaiveDateTime> = try_get(row, "order_date")?;
    let shipped_date: Option<NaiveDateTime> = try_get(row, "shipped_date")?;

    Ok(Order::new(try_get(row, "order_id")?, try_get(row, "customer_id")?)
        .with_order_date(order_date)
        .with_shipped_date(shipped_date))
}

fn try_get<'r, T>(row: &'r SqliteRow, column: &str) -> CoreResult<T>
where
    T: sqlx::Decode<'r, sqlx::Sqlite> + sqlx::Type<sqlx::Sqlite>,
{
    row.try_get(column)
        .map_err(|e| CoreError::internal(format!("column `{column}`: {e}")))
}
