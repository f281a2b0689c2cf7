//! SQLite adapters for the Northwind lookup service.

mod northwind_store;
mod probe;
mod tracker;
mod util;

pub use northwind_store::SqliteNorthwindStore;
pub use probe::SqliteConnectionProbe;
pub use tracker::SqliteRequestTracker;
pub use util::{connect_options, create_sqlite_pool, run_migrations};

/// Embedded SQL migrations for the Northwind database.
pub const MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
