//! Loader configuration.
//!
//! ```rust,no_run
//! use plugin_descriptor::config::LoaderConfig;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = LoaderConfig::from_env()?.with_plugin_dir("./plugins");
//! # Ok(())
//! # }
//! ```

pub mod env;

use std::env::VarError;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use env::{ENV_PREFIX, EnvConfigProvider};

use crate::manifest::DEFAULT_LOCALE;

pub const DEFAULT_MANIFEST_FILE: &str = "manifest.yaml";

/// Errors that can occur while building a [`LoaderConfig`]
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Invalid configuration value
    #[error("Invalid value for {key}: {message}")]
    InvalidValue {
        /// The key with invalid value
        key: String,
        /// Error message
        message: String,
    },

    /// Environment variable could not be read
    #[error("Environment variable {key} unreadable: {source}")]
    Env {
        key: String,
        #[source]
        source: VarError,
    },
}

/// Result type for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Where plugins live and how their manifests are read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// File name of the manifest inside each plugin root.
    pub manifest_file: String,
    /// Locale used when a requested locale has no text.
    pub default_locale: String,
    /// Directories that are plugin roots or contain plugin roots.
    pub plugin_dirs: Vec<PathBuf>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            manifest_file: DEFAULT_MANIFEST_FILE.to_string(),
            default_locale: DEFAULT_LOCALE.to_string(),
            plugin_dirs: default_plugins_dir().into_iter().collect(),
        }
    }
}

impl LoaderConfig {
    /// Defaults with no plugin directories.
    pub fn empty() -> Self {
        Self {
            plugin_dirs: Vec::new(),
            ..Self::default()
        }
    }

    /// Defaults overridden by `PLUGIN_DESCRIPTOR_*` environment variables.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|name| std::env::var(name))
    }

    /// Defaults overridden through `lookup`, which receives variable names.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Result<String, VarError>,
    {
        let provider = EnvConfigProvider::prefixed(ENV_PREFIX);
        let mut config = Self::default();

        if let Some(file) = provider.get_with("manifest.file", &lookup)? {
            config.manifest_file = file;
        }
        if let Some(locale) = provider.get_with("default.locale", &lookup)? {
            config.default_locale = locale;
        }
        if let Some(dirs) = provider.get_with("plugin.dirs", &lookup)? {
            config.plugin_dirs = std::env::split_paths(&dirs)
                .filter(|p| !p.as_os_str().is_empty())
                .collect();
        }

        Ok(config)
    }

    pub fn with_manifest_file(mut self, file: impl Into<String>) -> Self {
        self.manifest_file = file.into();
        self
    }

    pub fn with_default_locale(mut self, locale: impl Into<String>) -> Self {
        self.default_locale = locale.into();
        self
    }

    pub fn with_plugin_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.plugin_dirs.push(dir.into());
        self
    }
}

/// Platform data directory for plugins, e.g. `~/.local/share/plugins`.
pub fn default_plugins_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|dirs| dirs.data_dir().join("plugins"))
}
