//! Service layer for the Northwind lookup service.
//! Shared by the JSON and SOAP-style HTTP surfaces.

mod bootstrap;
mod config;
mod health;
mod northwind_service;
mod tracking_service;

pub use bootstrap::{bootstrap, seed_from_csv, AppContext, BootstrapError};
pub use config::{
    Config, ConfigError, DataConfig, DatabaseConfig, HealthCheckConfig, LoggingConfig,
    ServerConfig, TrackingBackend, TrackingConfig,
};
pub use health::{DataSourceAvailability, HealthChecker};
pub use northwind_service::NorthwindService;
pub use tracking_service::TrackingService;
