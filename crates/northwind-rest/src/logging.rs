//! Global `tracing` subscriber setup.
//!
//! `RUST_LOG` wins over the configured level when set. The format is either
//! human-readable (`pretty`) or one JSON object per line (`json`).

use northwind_service::LoggingConfig;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

/// Builds the filter for `config`, preferring `RUST_LOG` when present.
pub fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "{level},tower_http={level},sqlx=warn",
            level = config.level
        ))
    })
}

/// Installs the global subscriber.
///
/// # Errors
///
/// Fails if a global subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    let fmt_layer = if config.format == "json" {
        tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .with_target(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_line_number(true)
            .boxed()
    };

    Registry::default()
        .with(env_filter(config))
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
