use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::error::DescriptorError;

pub struct PluginDiscovery;

impl PluginDiscovery {
    /// Finds plugin roots: each directory in `dirs` that holds `manifest_file`
    /// is a root itself; otherwise its direct children that hold it are.
    ///
    /// Missing directories are skipped. Roots keep the order of `dirs`;
    /// children of one directory are sorted by path. A root reached twice is
    /// kept at its first position.
    pub fn discover(dirs: &[PathBuf], manifest_file: &str) -> Result<Vec<PathBuf>, DescriptorError> {
        let mut roots = Vec::new();

        for dir in dirs {
            if !dir.exists() {
                tracing::debug!(path = %dir.display(), "Plugin directory does not exist");
                continue;
            }

            if Self::is_plugin_root(dir, manifest_file) {
                roots.push(dir.clone());
            } else {
                Self::scan_children(dir, manifest_file, &mut roots)?;
            }
        }

        let mut seen = HashSet::new();
        roots.retain(|root| seen.insert(root.clone()));
        tracing::debug!(count = roots.len(), "Discovered plugin roots");
        Ok(roots)
    }

    pub fn is_plugin_root(dir: &Path, manifest_file: &str) -> bool {
        dir.join(manifest_file).is_file()
    }

    fn scan_children(
        parent: &Path,
        manifest_file: &str,
        roots: &mut Vec<PathBuf>,
    ) -> Result<(), DescriptorError> {
        let mut children = Vec::new();
        for entry in std::fs::read_dir(parent)? {
            let path = entry?.path();
            if path.is_dir() && Self::is_plugin_root(&path, manifest_file) {
                children.push(path);
            }
        }

        children.sort();
        roots.extend(children);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const MANIFEST: &str = "manifest.yaml";

    fn create_plugin(parent: &Path, name: &str) -> PathBuf {
        let plugin_dir = parent.join(name);
        std::fs::create_dir_all(&plugin_dir).unwrap();
        std::fs::write(plugin_dir.join(MANIFEST), "apiVersion: v1\n").unwrap();
        plugin_dir
    }

    #[test]
    fn test_discover_direct_plugin_root() {
        let dir = tempdir().unwrap();
        let plugin_dir = create_plugin(dir.path(), "good-news");

        let roots = PluginDiscovery::discover(std::slice::from_ref(&plugin_dir), MANIFEST).unwrap();
        assert_eq!(roots, vec![plugin_dir]);
    }

    #[test]
    fn test_discover_parent_directory() {
        let dir = tempdir().unwrap();
        let b = create_plugin(dir.path(), "plugin-b");
        let a = create_plugin(dir.path(), "plugin-a");

        let roots = PluginDiscovery::discover(&[dir.path().to_path_buf()], MANIFEST).unwrap();
        assert_eq!(roots, vec![a, b]);
    }

    #[test]
    fn test_discover_nonexistent_dir() {
        let roots =
            PluginDiscovery::discover(&[PathBuf::from("/nonexistent/path")], MANIFEST).unwrap();
        assert!(roots.is_empty());
    }

    #[test]
    fn test_discover_mixed_dirs() {
        let dir = tempdir().unwrap();
        create_plugin(dir.path(), "real-plugin");
        std::fs::create_dir(dir.path().join("not-a-plugin")).unwrap();
        std::fs::write(dir.path().join("README.md"), "plugins").unwrap();

        let roots = PluginDiscovery::discover(&[dir.path().to_path_buf()], MANIFEST).unwrap();
        assert_eq!(roots.len(), 1);
        assert!(roots[0].ends_with("real-plugin"));
    }

    #[test]
    fn test_discover_custom_manifest_name() {
        let dir = tempdir().unwrap();
        create_plugin(dir.path(), "default-name");
        let custom = dir.path().join("custom");
        std::fs::create_dir(&custom).unwrap();
        std::fs::write(custom.join("plugin.yaml"), "").unwrap();

        let roots = PluginDiscovery::discover(&[dir.path().to_path_buf()], "plugin.yaml").unwrap();
        assert_eq!(roots, vec![custom]);
    }

    #[test]
    fn test_discover_multiple_dirs_dedup() {
        let dir1 = tempdir().unwrap();
        let dir2 = tempdir().unwrap();
        create_plugin(dir1.path(), "p1");
        create_plugin(dir2.path(), "p2");

        let roots = PluginDiscovery::discover(
            &[
                dir1.path().to_path_buf(),
                dir2.path().to_path_buf(),
                dir1.path().to_path_buf(),
            ],
            MANIFEST,
        )
        .unwrap();
        assert_eq!(roots.len(), 2);
    }

    #[test]
    fn test_discover_keeps_directory_order() {
        let base = tempdir().unwrap();
        let user = base.path().join("zzz-user");
        let system = base.path().join("aaa-system");
        let from_user = create_plugin(&user, "good-news");
        let from_system = create_plugin(&system, "good-news");

        let roots = PluginDiscovery::discover(&[user, system], MANIFEST).unwrap();
        assert_eq!(roots, vec![from_user, from_system]);
    }
}
