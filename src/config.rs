//! Server configuration.
//!
//! Configuration is stored in TOML. Every field has a default, so an absent
//! key or an empty file yields a working config pointing at the proxy
//! backend on localhost.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Configuration for the query server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Base URL of the proxy backend that executes queries.
    #[serde(default = "default_backend_url")]
    pub backend_url: String,

    /// Timeout for a single backend request, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_backend_url() -> String {
    "http://localhost:8889".to_string()
}

fn default_request_timeout_secs() -> u64 {
    5
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            backend_url: default_backend_url(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        let config = toml::from_str(&raw)
            .with_context(|| format!("failed to parse config file: {}", path.display()))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn defaults_point_at_local_backend() {
        let config = ServerConfig::default();
        assert_eq!(config.backend_url, "http://localhost:8889");
        assert_eq!(config.request_timeout_secs, 5);
    }

    #[test]
    fn empty_file_yields_defaults() {
        let f = NamedTempFile::new().unwrap();
        let config = ServerConfig::load(f.path()).unwrap();
        assert_eq!(config.backend_url, "http://localhost:8889");
        assert_eq!(config.request_timeout_secs, 5);
    }

    #[test]
    fn file_overrides_defaults() {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(b"backend_url = \"http://127.0.0.1:9000\"\nrequest_timeout_secs = 2\n")
            .unwrap();
        f.flush().unwrap();
        let config = ServerConfig::load(f.path()).unwrap();
        assert_eq!(config.backend_url, "http://127.0.0.1:9000");
        assert_eq!(config.request_timeout_secs, 2);
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(ServerConfig::load(Path::new("/nonexistent/proxysift.toml")).is_err());
    }
}
