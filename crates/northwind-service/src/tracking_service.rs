use std::sync::Arc;

use northwind_core::{CoreResult, RequestTracker, TrackingEntry};
use tracing::{debug, error};

/// Best-effort request auditing.
///
/// Tracking failures are logged and never surface to the request that
/// triggered them.
#[derive(Clone)]
pub struct TrackingService {
    tracker: Arc<dyn RequestTracker>,
}

impl TrackingService {
    pub fn new(tracker: Arc<dyn RequestTracker>) -> Self {
        Self { tracker }
    }

    pub fn backend(&self) -> &'static str {
        self.tracker.name()
    }

    /// Persists one entry, returning it on success.
    pub async fn record(&self, url_request: &str, source_ip: &str) -> Option<TrackingEntry> {
        match self.tracker.track(url_request, source_ip).await {
            Ok(entry) => {
                debug!(
                    id = entry.id,
                    url = %entry.url_request,
                    source_ip = %entry.source_ip,
                    backend = self.tracker.name(),
                    "Request tracked"
                );
                Some(entry)
            }
            Err(e) => {
                error!(
                    url = url_request,
                    source_ip,
                    backend = self.tracker.name(),
                    error = %e,
                    "Failed to track request"
                );
                None
            }
        }
    }

    /// Newest entries first.
    pub async fn recent(&self, limit: usize) -> CoreResult<Vec<TrackingEntry>> {
        self.tracker.recent(limit).await
    }
}
