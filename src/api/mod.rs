//! HTTP API module

pub mod routes;
pub mod server;

pub use server::{create_app, AppState};
