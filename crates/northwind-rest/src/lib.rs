//! HTTP surface of the Northwind lookup service.
//!
//! JSON read endpoints, a SOAP-style endpoint, health probes and the request
//! tracking middleware, all served from one axum [`Router`](axum::Router).

pub mod handlers;
pub mod logging;
pub mod middleware;
mod router;
mod state;

pub use router::build_router;
pub use state::AppState;
