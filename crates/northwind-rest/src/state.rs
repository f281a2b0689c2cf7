use std::sync::Arc;

use northwind_service::{AppContext, NorthwindService, TrackingService};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub northwind: Arc<NorthwindService>,
    pub tracking: TrackingService,
}

impl AppState {
    pub fn new(northwind: Arc<NorthwindService>, tracking: TrackingService) -> Self {
        Self {
            northwind,
            tracking,
        }
    }
}

impl From<&AppContext> for AppState {
    fn from(ctx: &AppContext) -> Self {
        Self::new(Arc::clone(&ctx.northwind), ctx.tracking.clone())
    }
}
