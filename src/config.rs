//! Required-setting resolution
//!
//! The check and relay pipelines resolve their secrets per invocation from a
//! [`ConfigSource`] instead of reading the process environment at scattered
//! call sites, so tests can inject a fixed table.

use std::collections::HashMap;

/// Alert-bus routing topic for the check pipeline.
pub const NTFY_TOPIC_ID: &str = "NTFY_TOPIC_ID";
/// Push endpoint base URL for the relay.
pub const NTFY_URL: &str = "NTFY_URL";
/// Push endpoint credential username.
pub const NTFY_USER: &str = "NTFY_USER";
/// Push endpoint credential password.
pub const NTFY_PASSWORD: &str = "NTFY_PASSWORD";

/// Where required settings come from.
#[derive(Debug, Clone)]
pub enum ConfigSource {
    /// The process environment.
    Env,
    /// A fixed key/value table (tests).
    Table(HashMap<String, String>),
}

impl ConfigSource {
    /// Build a table source from `(name, value)` pairs.
    pub fn table<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        ConfigSource::Table(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    fn get(&self, name: &str) -> Option<String> {
        match self {
            ConfigSource::Env => std::env::var(name).ok(),
            ConfigSource::Table(map) => map.get(name).cloned(),
        }
    }

    /// Resolve one required setting. Values are trimmed; a value that is
    /// empty after trimming counts as blank.
    pub fn require_one(&self, name: &str) -> Result<String, ConfigError> {
        let value = self
            .get(name)
            .ok_or_else(|| ConfigError::Missing(name.to_string()))?;
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ConfigError::Blank(name.to_string()));
        }
        Ok(trimmed.to_string())
    }

    /// Resolve several required settings. Names are resolved in declaration
    /// order and the first missing or blank one wins, so error messages are
    /// reproducible.
    pub fn require(&self, names: &[&str]) -> Result<HashMap<String, String>, ConfigError> {
        let mut resolved = HashMap::with_capacity(names.len());
        for name in names {
            resolved.insert(name.to_string(), self.require_one(name)?);
        }
        Ok(resolved)
    }
}

/// Configuration resolution errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("missing env var: {0}")]
    Missing(String),

    #[error("empty env var: {0}")]
    Blank(String),
}
