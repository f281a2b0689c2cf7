//! Startup wiring: loads the CSV fallback, runs the health check and picks
//! the read and tracking backends before the listener binds.

use std::sync::Arc;

use northwind_core::{CoreError, CustomerOrderStore, RequestTracker};
use northwind_csv::{CsvDataStore, CsvRequestTracker};
use northwind_metadata::{
    connect_options, create_sqlite_pool, run_migrations, SqliteConnectionProbe,
    SqliteNorthwindStore, SqliteRequestTracker,
};
use sqlx::SqlitePool;
use tracing::{error, info, warn};

use crate::config::{Config, ConfigError, TrackingBackend};
use crate::health::{DataSourceAvailability, HealthChecker};
use crate::northwind_service::NorthwindService;
use crate::tracking_service::TrackingService;

/// Everything the HTTP layer needs, built once at startup.
pub struct AppContext {
    pub config: Config,
    pub northwind: Arc<NorthwindService>,
    pub tracking: TrackingService,
    pub csv_store: Arc<CsvDataStore>,
    pub sqlite_store: Option<Arc<SqliteNorthwindStore>>,
}

#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("invalid database url `{url}`: {message}")]
    DatabaseUrl { url: String, message: String },

    #[error("failed to load CSV data: {0}")]
    CsvData(#[source] CoreError),

    #[error("failed to open tracking store: {0}")]
    Tracking(#[source] CoreError),

    #[error("failed to migrate database: {0}")]
    Migration(String),

    #[error("failed to seed database: {0}")]
    Seed(#[source] CoreError),
}

/// Builds the application context from `config`.
///
/// The relational store is only wired in when the health check succeeds;
/// otherwise all reads are served from the CSV files for the lifetime of
/// the process.
///
/// # Errors
///
/// Fails on invalid configuration, unreadable CSV files or an unopenable
/// tracking file. An unreachable database is not an error.
pub async fn bootstrap(config: Config) -> Result<AppContext, BootstrapError> {
    config.validate()?;

    let csv_store = Arc::new(
        CsvDataStore::load(config.data.customers_path(), config.data.orders_path())
            .map_err(BootstrapError::CsvData)?,
    );

    let options = connect_options(&config.database.url, false).map_err(|e| {
        BootstrapError::DatabaseUrl {
            url: config.database.url.clone(),
            message: e.to_string(),
        }
    })?;

    let probe = Arc::new(SqliteConnectionProbe::new(options.clone()));
    let mut availability = HealthChecker::from_config(probe, &config.health_check)
        .check()
        .await;

    let mut sqlite_store = None;
    if availability.is_relational() {
        let pool = create_sqlite_pool(
            options,
            config.database.max_connections,
            config.database.connection_timeout(),
        );

        if config.database.run_migrations {
            if let Err(e) = run_migrations(&pool).await {
                error!(error = %e, "Database migrations failed");
                warn!("Serving reads from CSV fallback files");
                availability = DataSourceAvailability::CsvFallback;
            }
        }

        if availability.is_relational() {
            sqlite_store = Some(Arc::new(SqliteNorthwindStore::new(pool)));
        }
    }

    let pool = sqlite_store.as_deref().map(SqliteNorthwindStore::pool);
    let tracker = select_tracker(&config, pool)?;

    let relational = sqlite_store
        .clone()
        .map(|store| store as Arc<dyn CustomerOrderStore>);
    let northwind = Arc::new(NorthwindService::new(
        availability,
        relational,
        csv_store.clone(),
    ));

    info!(
        source = northwind.source_name(),
        tracking = tracker.name(),
        "Application context ready"
    );

    Ok(AppContext {
        config,
        northwind,
        tracking: TrackingService::new(tracker),
        csv_store,
        sqlite_store,
    })
}

fn select_tracker(
    config: &Config,
    pool: Option<&SqlitePool>,
) -> Result<Arc<dyn RequestTracker>, BootstrapError> {
    match (config.tracking.backend, pool) {
        (TrackingBackend::Database, Some(pool)) => {
            Ok(Arc::new(SqliteRequestTracker::new(pool.clone())))
        }
        (backend, _) => {
            if backend == TrackingBackend::Database {
                warn!(
                    file = %config.tracking.file.display(),
                    "Database tracking requested but the database is unavailable, tracking to CSV"
                );
            }
            let tracker =
                CsvRequestTracker::open(&config.tracking.file).map_err(BootstrapError::Tracking)?;
            Ok(Arc::new(tracker))
        }
    }
}

/// Creates the database if needed, applies migrations and copies every row
/// of the CSV files into it. Returns the customer and order row counts.
///
/// # Errors
///
/// Fails if the CSV files cannot be read or the database cannot be written.
pub async fn seed_from_csv(config: &Config) -> Result<(u64, u64), BootstrapError> {
    config.validate()?;

    let csv_store = CsvDataStore::load(config.data.customers_path(), config.data.orders_path())
        .map_err(BootstrapError::CsvData)?;

    let options = connect_options(&config.database.url, true).map_err(|e| {
        BootstrapError::DatabaseUrl {
            url: config.database.url.clone(),
            message: e.to_string(),
        }
    })?;
    let pool = create_sqlite_pool(
        options,
        config.database.max_connections,
        config.database.connection_timeout(),
    );
    run_migrations(&pool)
        .await
        .map_err(|e| BootstrapError::Migration(e.to_string()))?;

    let store = SqliteNorthwindStore::new(pool);
    let customers = store
        .insert_customers(csv_store.customers())
        .await
        .map_err(BootstrapError::Seed)?;
    let orders = store
        .insert_orders(csv_store.orders())
        .await
        .map_err(BootstrapError::Seed)?;

    info!(customers, orders, url = %config.database.url, "Seeded database from CSV");
    store.pool().close().await;

    Ok((customers, orders))
}
