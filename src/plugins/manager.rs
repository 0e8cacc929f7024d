use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use crate::binding::{LocalFs, ResolvedBinding, resolve_execution_binding};
use crate::config::LoaderConfig;
use crate::error::DescriptorError;
use crate::manifest::{PluginDescriptor, load_file, validate_config_schema};
use crate::values::{ConfigValue, PluginConfig, resolve_config};

use super::discovery::PluginDiscovery;

/// A plugin that passed every loading step.
#[derive(Debug, Clone)]
pub struct LoadedPlugin {
    descriptor: PluginDescriptor,
    root_dir: PathBuf,
    binding: ResolvedBinding,
}

impl LoadedPlugin {
    /// Load, validate, and bind the plugin rooted at `root_dir`.
    pub fn load(root_dir: &Path, manifest_file: &str) -> Result<Self, DescriptorError> {
        let descriptor = load_file(&root_dir.join(manifest_file))?;
        validate_config_schema(&descriptor)?;
        let binding = resolve_execution_binding(&descriptor, &LocalFs::new(root_dir))?;

        Ok(Self {
            descriptor,
            root_dir: root_dir.to_path_buf(),
            binding,
        })
    }

    pub fn descriptor(&self) -> &PluginDescriptor {
        &self.descriptor
    }

    pub fn name(&self) -> &str {
        self.descriptor.name()
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    pub fn binding(&self) -> &ResolvedBinding {
        &self.binding
    }
}

/// A plugin that failed to load and will not be activated.
#[derive(Debug)]
pub struct RejectedPlugin {
    pub root_dir: PathBuf,
    pub error: DescriptorError,
}

pub struct PluginManager {
    plugins: Vec<LoadedPlugin>,
    rejected: Vec<RejectedPlugin>,
    default_locale: String,
}

impl PluginManager {
    /// Discovers and loads every plugin under `config.plugin_dirs`.
    ///
    /// Only a failure to scan a directory is returned as an error. A plugin
    /// that fails to load, or whose name is already taken, is recorded in
    /// [`rejected`](Self::rejected) and left inactive.
    pub fn load(config: &LoaderConfig) -> Result<Self, DescriptorError> {
        let roots = PluginDiscovery::discover(&config.plugin_dirs, &config.manifest_file)?;

        let mut plugins: Vec<LoadedPlugin> = Vec::new();
        let mut rejected = Vec::new();
        let mut seen: HashMap<String, PathBuf> = HashMap::new();

        for root in roots {
            let result = LoadedPlugin::load(&root, &config.manifest_file).and_then(|plugin| {
                match seen.get(plugin.name()) {
                    Some(first) => Err(DescriptorError::DuplicateName {
                        name: plugin.name().to_string(),
                        first: first.clone(),
                        second: root.clone(),
                    }),
                    None => Ok(plugin),
                }
            });

            match result {
                Ok(plugin) => {
                    tracing::debug!(
                        plugin = %plugin.name(),
                        path = %root.display(),
                        "Plugin loaded"
                    );
                    seen.insert(plugin.name().to_string(), root);
                    plugins.push(plugin);
                }
                Err(error) => {
                    tracing::warn!(path = %root.display(), error = %error, "Plugin rejected");
                    rejected.push(RejectedPlugin {
                        root_dir: root,
                        error,
                    });
                }
            }
        }

        Ok(Self {
            plugins,
            rejected,
            default_locale: config.default_locale.clone(),
        })
    }

    pub fn plugins(&self) -> &[LoadedPlugin] {
        &self.plugins
    }

    pub fn rejected(&self) -> &[RejectedPlugin] {
        &self.rejected
    }

    pub fn plugin_count(&self) -> usize {
        self.plugins.len()
    }

    pub fn has_plugin(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<&LoadedPlugin> {
        self.plugins.iter().find(|p| p.name() == name)
    }

    /// Display label for `name` in `locale`, using the configured default
    /// locale as fallback.
    pub fn label(&self, name: &str, locale: &str) -> Option<&str> {
        self.get(name).map(|p| {
            p.descriptor
                .metadata()
                .label_for(locale, &self.default_locale)
        })
    }

    /// Resolves user configuration for a loaded plugin.
    pub fn configure(
        &self,
        name: &str,
        values: &BTreeMap<String, ConfigValue>,
    ) -> Result<PluginConfig, DescriptorError> {
        let plugin = self.get(name).ok_or_else(|| DescriptorError::PluginNotFound {
            name: name.to_string(),
        })?;
        resolve_config(&plugin.descriptor, values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write_plugin(parent: &Path, dir_name: &str, plugin_name: &str, with_entry: bool) {
        let plugin_dir = parent.join(dir_name);
        std::fs::create_dir_all(&plugin_dir).unwrap();
        std::fs::write(
            plugin_dir.join("manifest.yaml"),
            format!(
                r#"apiVersion: v1
kind: Plugin
metadata:
  name: {plugin_name}
  version: 1.0.0
  label:
    en_US: {plugin_name} label
spec:
  config:
    - name: font_path
      label:
        en_US: Font Path
      type: string
      required: false
execution:
  python:
    path: main.py
    attr: {plugin_name}
"#
            ),
        )
        .unwrap();
        if with_entry {
            std::fs::write(plugin_dir.join("main.py"), "").unwrap();
        }
    }

    fn config_for(dir: &Path) -> LoaderConfig {
        LoaderConfig::empty().with_plugin_dir(dir)
    }

    #[test]
    fn test_load_all() {
        let dir = tempdir().unwrap();
        write_plugin(dir.path(), "a", "PluginA", true);
        write_plugin(dir.path(), "b", "PluginB", true);

        let manager = PluginManager::load(&config_for(dir.path())).unwrap();
        assert_eq!(manager.plugin_count(), 2);
        assert!(manager.has_plugin("PluginA"));
        assert!(manager.has_plugin("PluginB"));
        assert!(manager.rejected().is_empty());
        assert_eq!(
            manager.get("PluginA").unwrap().binding().entry_point,
            dir.path().join("a").join("main.py")
        );
    }

    #[test]
    fn test_missing_entry_point_rejected() {
        let dir = tempdir().unwrap();
        write_plugin(dir.path(), "ok", "Ok", true);
        write_plugin(dir.path(), "broken", "Broken", false);

        let manager = PluginManager::load(&config_for(dir.path())).unwrap();
        assert_eq!(manager.plugin_count(), 1);
        assert!(!manager.has_plugin("Broken"));
        assert_eq!(manager.rejected().len(), 1);
        assert!(matches!(
            manager.rejected()[0].error,
            DescriptorError::BindingPath { .. }
        ));
    }

    #[test]
    fn test_duplicate_name_rejects_second() {
        let dir = tempdir().unwrap();
        write_plugin(dir.path(), "first", "Same", true);
        write_plugin(dir.path(), "second", "Same", true);

        let manager = PluginManager::load(&config_for(dir.path())).unwrap();
        assert_eq!(manager.plugin_count(), 1);
        assert_eq!(
            manager.get("Same").unwrap().root_dir(),
            dir.path().join("first")
        );
        match &manager.rejected()[0].error {
            DescriptorError::DuplicateName { name, second, .. } => {
                assert_eq!(name, "Same");
                assert_eq!(second, &dir.path().join("second"));
            }
            other => panic!("expected DuplicateName, got {other:?}"),
        }
    }

    #[test]
    fn test_label_and_configure() {
        let dir = tempdir().unwrap();
        write_plugin(dir.path(), "a", "PluginA", true);
        let manager = PluginManager::load(&config_for(dir.path())).unwrap();

        assert_eq!(manager.label("PluginA", "zh_Hans"), Some("PluginA label"));
        assert_eq!(manager.label("Missing", "en_US"), None);

        let mut values = BTreeMap::new();
        values.insert("font_path".to_string(), ConfigValue::from("/fonts/a.ttf"));
        let config = manager.configure("PluginA", &values).unwrap();
        assert_eq!(config.get_str("font_path"), Some("/fonts/a.ttf"));

        let err = manager.configure("Missing", &values).unwrap_err();
        assert!(matches!(err, DescriptorError::PluginNotFound { .. }));
    }
}
