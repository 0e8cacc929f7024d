//! Environment variable overrides for [`LoaderConfig`](super::LoaderConfig).
//!
//! Keys use dotted names (`manifest.file`) and map to upper-case, underscore
//! separated variables behind a prefix (`PLUGIN_DESCRIPTOR_MANIFEST_FILE`).

use std::env::VarError;

use super::{ConfigError, ConfigResult};

pub const ENV_PREFIX: &str = "PLUGIN_DESCRIPTOR_";

/// Read-only environment lookup with key-to-variable mapping.
#[derive(Debug, Clone)]
pub struct EnvConfigProvider {
    prefix: Option<String>,
}

impl EnvConfigProvider {
    pub fn new() -> Self {
        Self { prefix: None }
    }

    pub fn prefixed(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
        }
    }

    pub fn env_key(&self, key: &str) -> String {
        let key = key.to_uppercase().replace('.', "_");
        match &self.prefix {
            Some(prefix) => format!("{prefix}{key}"),
            None => key,
        }
    }

    /// Looks `key` up in the process environment.
    pub fn get_raw(&self, key: &str) -> ConfigResult<Option<String>> {
        self.get_with(key, |name| std::env::var(name))
    }

    /// Looks `key` up through `lookup`, which receives the variable name.
    pub fn get_with<F>(&self, key: &str, lookup: F) -> ConfigResult<Option<String>>
    where
        F: Fn(&str) -> Result<String, VarError>,
    {
        let env_key = self.env_key(key);
        match lookup(&env_key) {
            Ok(value) if value.trim().is_empty() => Err(ConfigError::InvalidValue {
                key: env_key,
                message: "must not be empty".into(),
            }),
            Ok(value) => Ok(Some(value)),
            Err(VarError::NotPresent) => Ok(None),
            Err(e) => Err(ConfigError::Env {
                key: env_key,
                source: e,
            }),
        }
    }
}

impl Default for EnvConfigProvider {
    fn default() -> Self {
        Self::new()
    }
}
