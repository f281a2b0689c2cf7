//! Request tracking middleware.
//!
//! Every request is recorded (path plus query string, peer IP) before the
//! handler runs. Tracking is best effort and never changes the response.

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use northwind_core::UNKNOWN_SOURCE_IP;

use crate::state::AppState;

pub async fn track_request(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let url_request = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_owned())
        .unwrap_or_else(|| req.uri().path().to_owned());

    let source_ip = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| UNKNOWN_SOURCE_IP.to_string());

    state.tracking.record(&url_request, &source_ip).await;

    next.run(req).await
}
