//! HTTP server module.
//!
//! Binds the listener, serves the router and drains in-flight connections on
//! SIGTERM. The server handle is owned by whoever starts the server and handed
//! explicitly to the shutdown task.

mod server;
mod shutdown;

pub use server::{listen_addr, serve, start_server, ServerError};
pub use shutdown::{begin_drain, setup_shutdown_handler};
