//! Plugin discovery and activation.
//!
//! Plugins are directories holding a manifest (`manifest.yaml` by default)
//! and the entry point it names:
//!
//! ```text
//! plugins/
//! └── good-news-generator/
//!     ├── manifest.yaml
//!     ├── main.py
//!     └── assets/
//! ```
//!
//! A plugin is activated only after its manifest loads, its config schema
//! validates, and its entry point resolves. Plugin names are unique across
//! all configured directories.

mod discovery;
mod manager;

pub use discovery::PluginDiscovery;
pub use manager::{LoadedPlugin, PluginManager, RejectedPlugin};
