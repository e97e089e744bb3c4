//! Client configuration.
//!
//! A [`ClientConfig`] names the index to talk to and where the server is.
//! It can be built in code or loaded from a JSON file:
//!
//! ```json
//! {
//!     "index_name": "products",
//!     "redis_url": "redis://127.0.0.1:6379/",
//!     "batch_chunk_size": 500
//! }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{RediSearchError, Result};

/// Connection and indexing settings for a [`Client`](crate::client::Client).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Name of the search index.
    pub index_name: String,

    /// Server URL understood by the `redis` crate.
    #[serde(default = "default_redis_url")]
    pub redis_url: String,

    /// Documents per pipeline flush in batch indexing.
    #[serde(default = "default_batch_chunk_size")]
    pub batch_chunk_size: usize,

    /// Key holding the autocomplete dictionary, if any.
    #[serde(default)]
    pub suggestion_key: Option<String>,
}

fn default_redis_url() -> String {
    "redis://127.0.0.1:6379/".to_string()
}

fn default_batch_chunk_size() -> usize {
    100
}

impl ClientConfig {
    /// Create a config for `index_name` with default connection settings.
    pub fn new<S: Into<String>>(index_name: S) -> Self {
        ClientConfig {
            index_name: index_name.into(),
            redis_url: default_redis_url(),
            batch_chunk_size: default_batch_chunk_size(),
            suggestion_key: None,
        }
    }

    pub fn redis_url<S: Into<String>>(mut self, url: S) -> Self {
        self.redis_url = url.into();
        self
    }

    pub fn batch_chunk_size(mut self, size: usize) -> Self {
        self.batch_chunk_size = size;
        self
    }

    pub fn suggestion_key<S: Into<String>>(mut self, key: S) -> Self {
        self.suggestion_key = Some(key.into());
        self
    }

    /// Parse and validate a JSON config.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: ClientConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON config file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn validate(&self) -> Result<()> {
        if self.index_name.is_empty() {
            return Err(RediSearchError::invalid_config("index_name cannot be empty"));
        }
        if self.redis_url.is_empty() {
            return Err(RediSearchError::invalid_config("redis_url cannot be empty"));
        }
        if self.batch_chunk_size == 0 {
            return Err(RediSearchError::invalid_config(
                "batch_chunk_size must be greater than zero",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn test_defaults_from_json() {
        let config = ClientConfig::from_json_str(r#"{"index_name": "idx"}"#).unwrap();
        assert_eq!(config, ClientConfig::new("idx"));
        assert_eq!(config.redis_url, "redis://127.0.0.1:6379/");
        assert_eq!(config.batch_chunk_size, 100);
        assert!(config.suggestion_key.is_none());
    }

    #[test]
    fn test_validation() {
        assert!(ClientConfig::new("").validate().is_err());
        assert!(ClientConfig::new("idx").batch_chunk_size(0).validate().is_err());
        assert!(matches!(
            ClientConfig::from_json_str(r#"{"index_name": "idx", "redis_url": ""}"#),
            Err(RediSearchError::InvalidConfig(_))
        ));
        assert!(matches!(
            ClientConfig::from_json_str("{"),
            Err(RediSearchError::Json(_))
        ));
    }

    #[test]
    fn test_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"index_name": "books", "redis_url": "redis://cache:6380/", "batch_chunk_size": 7, "suggestion_key": "ac"}}"#
        )
        .unwrap();

        let config = ClientConfig::from_file(file.path()).unwrap();
        assert_eq!(config.index_name, "books");
        assert_eq!(config.redis_url, "redis://cache:6380/");
        assert_eq!(config.batch_chunk_size, 7);
        assert_eq!(config.suggestion_key.as_deref(), Some("ac"));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            ClientConfig::from_file("/nonexistent/redisearch.json"),
            Err(RediSearchError::Io(_))
        ));
    }
}
