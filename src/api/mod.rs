//! HTTP API layer
//!
//! Thin request/response mapping over the stores and the posting service.

pub mod routes;

pub use routes::{create_router, AppState};
