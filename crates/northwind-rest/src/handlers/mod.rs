pub mod customers;
pub mod health; // Liveness and readiness probes
pub mod soap;
pub mod tracking;

pub use customers::{customer_orders, customer_orders_information, customers_by_country};
pub use health::{health_handler, ready_handler};
pub use soap::soap_endpoint;
pub use tracking::recent_tracking;
