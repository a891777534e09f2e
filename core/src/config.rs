//! Client configuration.
//!
//! The backend base address is the only setting. It is read once, when the
//! `ApiClient` is constructed, and fixed for the client's lifetime.

use config::{Config, ConfigError, Environment};
use serde::Deserialize;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Environment prefix: `BRICKBROKER_API_BASE_URL` sets `api_base_url`.
pub const ENV_PREFIX: &str = "BRICKBROKER";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientConfig {
    pub api_base_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl ClientConfig {
    pub fn new(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
        }
    }

    /// Load from the environment, falling back to `DEFAULT_BASE_URL`.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Environment::with_prefix(ENV_PREFIX))
    }

    fn load_from(env: Environment) -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("api_base_url", DEFAULT_BASE_URL)?
            .add_source(env)
            .build()?
            .try_deserialize()
    }
}
