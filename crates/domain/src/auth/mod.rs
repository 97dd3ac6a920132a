//! Authentication domain types

mod types;

pub use types::{AuthConfig, AuthResolution, Credentials};
