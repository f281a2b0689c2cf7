use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use northwind_core::ConnectionProbe;
use tracing::{error, info, warn};

use crate::config::HealthCheckConfig;

/// Which backend serves read traffic for the lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSourceAvailability {
    /// The relational store answered the startup probe.
    Relational,
    /// Every probe failed; reads go to the CSV files.
    CsvFallback,
}

impl DataSourceAvailability {
    #[must_use]
    pub const fn is_relational(&self) -> bool {
        matches!(self, Self::Relational)
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Relational => "relational",
            Self::CsvFallback => "csv",
        }
    }
}

impl fmt::Display for DataSourceAvailability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Startup connectivity check with a fixed number of attempts.
///
/// The delay is only applied between attempts, so a run that exhausts
/// `max_attempts` waits `(max_attempts - 1) * retry_delay` in total.
pub struct HealthChecker {
    probe: Arc<dyn ConnectionProbe>,
    max_attempts: u32,
    retry_delay: Duration,
}

impl HealthChecker {
    pub fn new(probe: Arc<dyn ConnectionProbe>, max_attempts: u32, retry_delay: Duration) -> Self {
        Self {
            probe,
            max_attempts: max_attempts.max(1),
            retry_delay,
        }
    }

    pub fn from_config(probe: Arc<dyn ConnectionProbe>, config: &HealthCheckConfig) -> Self {
        Self::new(probe, config.max_attempts, config.retry_delay())
    }

    /// Probes the relational store until it answers or attempts run out.
    pub async fn check(&self) -> DataSourceAvailability {
        for attempt in 1..=self.max_attempts {
            info!(
                attempt,
                max_attempts = self.max_attempts,
                "Checking relational store connectivity"
            );

            match self.probe.probe().await {
                Ok(()) => {
                    info!(attempt, "Relational store is reachable");
                    return DataSourceAvailability::Relational;
                }
                Err(e) => {
                    warn!(
                        attempt,
                        max_attempts = self.max_attempts,
                        error = %e,
                        "Relational store probe failed"
                    );
                }
            }

            if attempt < self.max_attempts {
                tokio::time::sleep(self.retry_delay).await;
            }
        }

        error!(
            max_attempts = self.max_attempts,
            "Relational store unreachable after all attempts"
        );
        warn!("Serving reads from CSV fallback files");
        DataSourceAvailability::CsvFallback
    }
}
