//! HTTP surface for the presentation layer.

pub mod auth;
pub mod routes;
pub mod types;

pub use routes::{serve, AppState};
