//! Flat-file backends for the Northwind lookup service.
//!
//! [`CsvDataStore`] is the read-only fallback used when the relational store
//! is unreachable; [`CsvRequestTracker`] appends request audit rows to a
//! tracking file.

mod parse;
mod store;
mod tracker;

pub use parse::{parse_csv_date, CUSTOMER_MIN_COLUMNS, ORDER_MIN_COLUMNS};
pub use store::{CsvDataStore, LoadReport, CUSTOMERS_FILE, ORDERS_FILE};
pub use tracker::{CsvRequestTracker, TRACKING_FILE, TRACKING_HEADER};
