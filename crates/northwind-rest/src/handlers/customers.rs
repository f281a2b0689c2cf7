//! JSON read endpoints.
//!
//! # Endpoints
//!
//! - `GET /Customers/CustomersByCountryData?country=` and `GET /api/v1/customers?country=`
//! - `GET /Customers/CustomerOrdersInformation?id=`
//! - `GET /api/v1/customers/:id/orders`
//!
//! Blank or missing parameters produce an empty array.

use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use northwind_core::{Customer, Order};
use serde::Deserialize;

use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct CountryQuery {
    #[serde(default)]
    pub country: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct CustomerIdQuery {
    #[serde(default)]
    pub id: String,
}

pub async fn customers_by_country(
    State(state): State<AppState>,
    Query(query): Query<CountryQuery>,
) -> Json<Vec<Customer>> {
    Json(state.northwind.customers_by_country(&query.country).await)
}

pub async fn customer_orders_information(
    State(state): State<AppState>,
    Query(query): Query<CustomerIdQuery>,
) -> Json<Vec<Order>> {
    Json(state.northwind.orders_by_customer(&query.id).await)
}

pub async fn customer_orders(
    State(state): State<AppState>,
    Path(customer_id): Path<String>,
) -> Json<Vec<Order>> {
    Json(state.northwind.orders_by_customer(&customer_id).await)
}
