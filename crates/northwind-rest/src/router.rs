use std::time::Duration;

use axum::{
    extract::Request,
    middleware,
    response::Response,
    routing::{get, post},
    Router,
};
use tower_http::{classify::ServerErrorsFailureClass, trace::TraceLayer};
use tracing::{info_span, Span};

use crate::handlers;
use crate::middleware::track_request;
use crate::state::AppState;

/// Builds the router with every endpoint, the tracking middleware and the
/// request trace layer.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Liveness and readiness probes
        .route("/health", get(handlers::health_handler))
        .route("/ready", get(handlers::ready_handler))
        // Original controller routes
        .route(
            "/Customers/CustomersByCountryData",
            get(handlers::customers_by_country),
        )
        .route(
            "/Customers/CustomerOrdersInformation",
            get(handlers::customer_orders_information),
        )
        // REST-style aliases
        .route("/api/v1/customers", get(handlers::customers_by_country))
        .route("/api/v1/customers/:id/orders", get(handlers::customer_orders))
        // Audit trail
        .route("/api/v1/tracking", get(handlers::recent_tracking))
        // SOAP-style endpoint
        .route("/NorthwindService/basichttp", post(handlers::soap_endpoint))
        .layer(middleware::from_fn_with_state(state.clone(), track_request))
        .with_state(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request| {
                    info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        version = ?request.version(),
                    )
                })
                .on_request(|_request: &Request, _span: &Span| {
                    tracing::debug!("started processing request");
                })
                .on_response(|response: &Response, latency: Duration, _span: &Span| {
                    let status = response.status();
                    let latency_ms = latency.as_millis();

                    if status.is_server_error() {
                        tracing::error!(%status, latency_ms, "request failed with server error");
                    } else if status.is_client_error() {
                        tracing::warn!(%status, latency_ms, "request failed with client error");
                    } else {
                        tracing::info!(%status, latency_ms, "request completed");
                    }
                })
                .on_failure(
                    |failure_class: ServerErrorsFailureClass, latency: Duration, _span: &Span| {
                        tracing::error!(
                            failure_class = ?failure_class,
                            latency_ms = latency.as_millis(),
                            "request failed"
                        );
                    },
                ),
        )
}
