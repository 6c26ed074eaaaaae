//! Session configuration: which driver to open, against which URI, and a
//! couple of schema/commit policy knobs.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Configuration for one [`crate::session::Session`].
///
/// Deserializable via `serde` so a host can load it from TOML/JSON/environment
/// the way the rest of the corpus loads its runtime config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// The driver name to resolve through a
    /// [`object_store_backend::registry::DriverRegistry`] (`"sqlite"`,
    /// `"mssql"`, `"fake"`, …).
    pub backend: String,
    /// The connection string handed to [`object_store_backend::backend::Backend::open`].
    pub uri: String,
    /// Whether [`crate::session::Session::attach`] issues `CREATE TABLE`
    /// (and its container join tables) the first time a prototype is
    /// attached.
    #[serde(default = "default_true")]
    pub auto_create: bool,
    /// Whether [`crate::session::Session::commit`] also issues the backend's
    /// `COMMIT` immediately, versus leaving it to a caller that batches
    /// several sessions' commits under one outer transaction.
    #[serde(default = "default_true")]
    pub flush_on_commit: bool,
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Builds a config with `auto_create` and `flush_on_commit` both `true`.
    pub fn new(backend: impl Into<String>, uri: impl Into<String>) -> Self {
        Self { backend: backend.into(), uri: uri.into(), auto_create: true, flush_on_commit: true }
    }

    /// Validates that `backend` and `uri` are non-empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backend.is_empty() {
            return Err(ConfigError::MissingBackend);
        }
        if self.uri.is_empty() {
            return Err(ConfigError::MissingUri);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_defaults_to_auto_create_and_flush_on_commit() {
        let config = Config::new("sqlite", "file:test.db");
        assert!(config.auto_create);
        assert!(config.flush_on_commit);
    }

    #[test]
    fn empty_backend_is_rejected() {
        let config = Config::new("", "file:test.db");
        assert_eq!(config.validate().unwrap_err(), ConfigError::MissingBackend);
    }

    #[test]
    fn empty_uri_is_rejected() {
        let config = Config::new("sqlite", "");
        assert_eq!(config.validate().unwrap_err(), ConfigError::MissingUri);
    }

    #[test]
    fn deserializes_with_defaulted_flags() {
        let config: Config = serde_json::from_str(r#"{"backend":"sqlite","uri":"file:test.db"}"#).unwrap();
        assert!(config.auto_create);
        assert!(config.flush_on_commit);
    }
}
