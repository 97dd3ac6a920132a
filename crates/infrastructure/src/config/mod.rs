//! Suite configuration loading.

mod loader;

pub use loader::{
    ConfigLoader, ENV_BASE_URL, ENV_PASSWORD, ENV_PREFIX, ENV_TIMEOUT_MS, ENV_USERNAME, parse_config,
};
