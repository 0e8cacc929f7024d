//! # plugin-descriptor
//!
//! Loads and validates plugin manifests for a host plugin runtime.
//!
//! A host calls [`load`], then [`validate_config_schema`], then
//! [`resolve_execution_binding`]. Only a plugin that passes all three is
//! activated; the host then instantiates the bound symbol with the mapping
//! produced by [`resolve_config`].
//!
//! ```rust,no_run
//! use std::collections::BTreeMap;
//!
//! use plugin_descriptor::{LocalFs, load_file, resolve_config, resolve_execution_binding,
//!     validate_config_schema};
//!
//! fn main() -> Result<(), plugin_descriptor::DescriptorError> {
//!     let root = std::path::Path::new("plugins/good-news-generator");
//!     let descriptor = load_file(&root.join("manifest.yaml"))?;
//!     validate_config_schema(&descriptor)?;
//!     let binding = resolve_execution_binding(&descriptor, &LocalFs::new(root))?;
//!     let config = resolve_config(&descriptor, &BTreeMap::new())?;
//!     println!("{} -> {}", binding.entry_point.display(), binding.attr);
//!     println!("font_path = {:?}", config.get_str("font_path"));
//!     Ok(())
//! }
//! ```
//!
//! For whole plugin directories see [`PluginManager`].

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod binding;
pub mod config;
pub mod error;
pub mod manifest;
pub mod plugins;
pub mod values;

pub use binding::{
    EntryStatus, InMemoryFs, LocalFs, PluginFs, ResolvedBinding, resolve_execution_binding,
};
pub use config::{ConfigError, LoaderConfig};
pub use error::{
    ConfigSchemaErrors, ConfigSchemaIssue, ConfigValueErrors, ConfigValueIssue, DescriptorError,
    SchemaProblem, ValueProblem,
};
pub use manifest::{
    ConfigOption, ExecutionBinding, LocalizedText, OptionType, PluginDescriptor, PluginMetadata,
    RuntimeKind, load, load_file, validate_config_schema,
};
pub use plugins::{LoadedPlugin, PluginDiscovery, PluginManager, RejectedPlugin};
pub use values::{ConfigValue, PluginConfig, resolve_config};

/// Result type for descriptor operations.
pub type Result<T> = std::result::Result<T, DescriptorError>;
