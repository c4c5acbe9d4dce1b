//! Trellis configuration structures to map the trellis.toml configuration.

#![deny(missing_docs)]

mod auth;
mod loader;
mod server;

use std::path::Path;

pub use auth::{
    AuthConfig, BasicAuthClientConfig, ClientConfig, FormClientConfig, HeaderClientConfig, ParameterClientConfig,
    ProfileStoreConfig, TokenConfig, UserConfig,
};
use serde::Deserialize;
pub use server::{HealthConfig, ServerConfig, SessionConfig, TlsServerConfig};

/// Main configuration structure for a Trellis application.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// HTTP server configuration settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Authentication filter configuration settings.
    #[serde(default)]
    pub auth: AuthConfig,
}

impl Config {
    /// Load configuration from a file path.
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Config> {
        loader::load(path)
    }

    /// Validates the configuration, returning the warnings worth logging.
    pub fn validate(&self) -> anyhow::Result<Vec<String>> {
        loader::validate(self)
    }
}
