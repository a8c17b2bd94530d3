//! HTTP surface for the policy store.

pub mod api;
pub mod config;
pub mod error;
pub mod state;

pub use api::{create_app, serve};
pub use config::ServerConfig;
pub use error::ApiError;
pub use state::AppState;
