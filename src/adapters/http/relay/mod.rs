//! Relay HTTP endpoints.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use handlers::RelayAppState;
pub use routes::{health_router, relay_router};
