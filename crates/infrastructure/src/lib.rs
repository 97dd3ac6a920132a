//! Bookcheck Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports
//! defined in the application layer.

pub mod adapters;
pub mod auth;
pub mod config;
pub mod export;
pub mod serialization;

pub use adapters::ReqwestHttpClient;
pub use auth::resolve_auth;
pub use self::config::{
    ConfigLoader, ENV_BASE_URL, ENV_PASSWORD, ENV_PREFIX, ENV_TIMEOUT_MS, ENV_USERNAME, parse_config,
};
pub use export::{render_json, render_text};
pub use serialization::{SerializationError, to_json_stable};
