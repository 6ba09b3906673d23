//! Vigil - liveness sidecar for container orchestration.
//!
//! Serves health, readiness, welcome and memory-metrics endpoints over plain
//! HTTP and drains in-flight requests on SIGTERM.

pub mod config;
pub mod error;
pub mod http;
pub mod memory;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::AppConfig;
pub use error::AppError;
pub use routes::create_router;
pub use state::AppState;
