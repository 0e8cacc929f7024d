//! Execution binding resolution.
//!
//! Confirms that a descriptor's entry point exists under the plugin root.
//! Nothing is imported or executed here; the host does that when it
//! instantiates the plugin.

use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

use crate::error::DescriptorError;
use crate::manifest::{PluginDescriptor, RuntimeKind};

/// What a [`PluginFs`] found at a relative path.
#[derive(Debug)]
pub enum EntryStatus {
    ReadableFile,
    Directory,
    Missing,
    /// Resolves (through symlinks) to somewhere outside the root.
    OutsideRoot,
    Unreadable(std::io::Error),
}

/// Read-only view of a plugin's root directory.
pub trait PluginFs {
    fn root(&self) -> &Path;

    fn probe(&self, relative: &Path) -> EntryStatus;
}

/// A plugin root on the local disk.
#[derive(Debug, Clone)]
pub struct LocalFs {
    root: PathBuf,
}

impl LocalFs {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn contains(&self, full: &Path) -> bool {
        match (self.root.canonicalize(), full.canonicalize()) {
            (Ok(root), Ok(full)) => full.starts_with(root),
            _ => false,
        }
    }
}

impl PluginFs for LocalFs {
    fn root(&self) -> &Path {
        &self.root
    }

    fn probe(&self, relative: &Path) -> EntryStatus {
        let full = self.root.join(relative);
        match std::fs::metadata(&full) {
            Ok(_) if !self.contains(&full) => EntryStatus::OutsideRoot,
            Ok(meta) if meta.is_dir() => EntryStatus::Directory,
            Ok(_) => match std::fs::File::open(&full) {
                Ok(_) => EntryStatus::ReadableFile,
                Err(e) => EntryStatus::Unreadable(e),
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => EntryStatus::Missing,
            Err(e) => EntryStatus::Unreadable(e),
        }
    }
}

/// A plugin root held in memory, for hosts that stage plugins before
/// unpacking them.
#[derive(Debug, Clone, Default)]
pub struct InMemoryFs {
    root: PathBuf,
    files: HashSet<PathBuf>,
}

impl InMemoryFs {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            files: HashSet::new(),
        }
    }

    pub fn with_file(mut self, relative: impl Into<PathBuf>) -> Self {
        self.files.insert(relative.into());
        self
    }
}

impl PluginFs for InMemoryFs {
    fn root(&self) -> &Path {
        &self.root
    }

    fn probe(&self, relative: &Path) -> EntryStatus {
        if self.files.contains(relative) {
            EntryStatus::ReadableFile
        } else if self.files.iter().any(|f| f.starts_with(relative)) {
            EntryStatus::Directory
        } else {
            EntryStatus::Missing
        }
    }
}

/// A binding whose entry point was found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedBinding {
    pub runtime: RuntimeKind,
    /// Absolute (root-joined) path to the entry point.
    pub entry_point: PathBuf,
    pub attr: String,
}

/// Checks the entry-point symbol and path of `descriptor` against `fs`.
pub fn resolve_execution_binding(
    descriptor: &PluginDescriptor,
    fs: &impl PluginFs,
) -> Result<ResolvedBinding, DescriptorError> {
    let binding = descriptor.execution();

    binding
        .runtime
        .check_symbol(&binding.attr)
        .map_err(|reason| DescriptorError::BindingSymbol {
            runtime: binding.runtime,
            reason,
        })?;

    let path_error = |reason: String| DescriptorError::BindingPath {
        path: PathBuf::from(&binding.path),
        reason,
    };

    // `./main.py` and `main.py` name the same entry point.
    let relative: PathBuf = Path::new(&binding.path)
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect();

    if binding.path.trim().is_empty() || relative.as_os_str().is_empty() {
        return Err(path_error("entry-point path is empty".to_string()));
    }
    if relative.has_root() || relative.is_absolute() {
        return Err(path_error(
            "entry-point path must be relative to the plugin root".to_string(),
        ));
    }
    if relative
        .components()
        .any(|c| matches!(c, Component::ParentDir | Component::Prefix(_)))
    {
        return Err(path_error(
            "entry-point path escapes the plugin root".to_string(),
        ));
    }

    match fs.probe(&relative) {
        EntryStatus::ReadableFile => {}
        EntryStatus::Directory => return Err(path_error("is a directory".to_string())),
        EntryStatus::Missing => {
            return Err(path_error(format!(
                "not found under {}",
                fs.root().display()
            )));
        }
        EntryStatus::OutsideRoot => {
            return Err(path_error(
                "entry-point path escapes the plugin root".to_string(),
            ));
        }
        EntryStatus::Unreadable(e) => return Err(path_error(format!("not readable: {e}"))),
    }

    tracing::debug!(
        plugin = %descriptor.name(),
        runtime = %binding.runtime,
        path = %relative.display(),
        attr = %binding.attr,
        "Resolved execution binding"
    );

    Ok(ResolvedBinding {
        runtime: binding.runtime,
        entry_point: fs.root().join(&relative),
        attr: binding.attr.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::load;
    use tempfile::tempdir;

    fn descriptor(path: &str, attr: &str) -> PluginDescriptor {
        load(&format!(
            r#"
apiVersion: v1
kind: Plugin
metadata:
  name: GoodNewsGenerator
  version: 0.2.1
execution:
  python:
    path: "{path}"
    attr: "{attr}"
"#
        ))
        .unwrap()
    }

    fn path_reason(err: DescriptorError) -> String {
        match err {
            DescriptorError::BindingPath { reason, .. } => reason,
            other => panic!("expected BindingPath, got {other:?}"),
        }
    }

    #[test]
    fn test_resolves_existing_entry_point() {
        let fs = InMemoryFs::new("/plugins/good-news").with_file("main.py");
        let resolved =
            resolve_execution_binding(&descriptor("main.py", "GoodNewsGenerator"), &fs).unwrap();
        assert_eq!(resolved.runtime, RuntimeKind::Python);
        assert_eq!(
            resolved.entry_point,
            PathBuf::from("/plugins/good-news/main.py")
        );
        assert_eq!(resolved.attr, "GoodNewsGenerator");
    }

    #[test]
    fn test_missing_entry_point() {
        let fs = InMemoryFs::new("/plugins/good-news").with_file("generator.py");
        let err =
            resolve_execution_binding(&descriptor("main.py", "GoodNewsGenerator"), &fs).unwrap_err();
        assert!(path_reason(err).contains("not found"));
    }

    #[test]
    fn test_empty_symbol_is_descriptive() {
        let fs = InMemoryFs::new("/plugins/good-news").with_file("main.py");
        let err = resolve_execution_binding(&descriptor("main.py", ""), &fs).unwrap_err();
        match err {
            DescriptorError::BindingSymbol { runtime, reason } => {
                assert_eq!(runtime, RuntimeKind::Python);
                assert!(reason.contains("must not be empty"));
            }
            other => panic!("expected BindingSymbol, got {other:?}"),
        }
    }

    #[test]
    fn test_rejects_unsafe_paths() {
        let fs = InMemoryFs::new("/plugins/good-news").with_file("main.py");
        let attr = "GoodNewsGenerator";

        let err = resolve_execution_binding(&descriptor("", attr), &fs).unwrap_err();
        assert!(path_reason(err).contains("empty"));

        let err = resolve_execution_binding(&descriptor("/etc/main.py", attr), &fs).unwrap_err();
        assert!(path_reason(err).contains("relative"));

        let err = resolve_execution_binding(&descriptor("../other/main.py", attr), &fs).unwrap_err();
        assert!(path_reason(err).contains("escapes"));
    }

    #[test]
    fn test_directory_is_not_an_entry_point() {
        let fs = InMemoryFs::new("/plugins/good-news").with_file("pkg/__init__.py");
        let err = resolve_execution_binding(&descriptor("pkg", "GoodNewsGenerator"), &fs).unwrap_err();
        assert!(path_reason(err).contains("directory"));
    }

    #[test]
    fn test_local_fs() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("main.py"), "class GoodNewsGenerator: pass\n").unwrap();
        std::fs::create_dir(dir.path().join("assets")).unwrap();

        let fs = LocalFs::new(dir.path());
        assert!(matches!(
            fs.probe(Path::new("main.py")),
            EntryStatus::ReadableFile
        ));
        assert!(matches!(
            fs.probe(Path::new("assets")),
            EntryStatus::Directory
        ));
        assert!(matches!(
            fs.probe(Path::new("missing.py")),
            EntryStatus::Missing
        ));

        let resolved =
            resolve_execution_binding(&descriptor("main.py", "GoodNewsGenerator"), &fs).unwrap();
        assert_eq!(resolved.entry_point, dir.path().join("main.py"));
    }

    #[test]
    fn test_current_dir_prefix_resolves_on_both_filesystems() {
        let binding = descriptor("./main.py", "GoodNewsGenerator");

        let memory = InMemoryFs::new("/plugins/good-news").with_file("main.py");
        let resolved = resolve_execution_binding(&binding, &memory).unwrap();
        assert_eq!(
            resolved.entry_point,
            PathBuf::from("/plugins/good-news/main.py")
        );

        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("main.py"), "").unwrap();
        let resolved = resolve_execution_binding(&binding, &LocalFs::new(dir.path())).unwrap();
        assert_eq!(resolved.entry_point, dir.path().join("main.py"));

        let err = resolve_execution_binding(&descriptor(".", "GoodNewsGenerator"), &memory)
            .unwrap_err();
        assert!(path_reason(err).contains("empty"));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_out_of_root_is_rejected() {
        let outside = tempdir().unwrap();
        let target = outside.path().join("secret.py");
        std::fs::write(&target, "").unwrap();

        let dir = tempdir().unwrap();
        std::os::unix::fs::symlink(&target, dir.path().join("main.py")).unwrap();
        std::fs::write(dir.path().join("real.py"), "").unwrap();
        std::os::unix::fs::symlink(dir.path().join("real.py"), dir.path().join("alias.py"))
            .unwrap();

        let fs = LocalFs::new(dir.path());
        assert!(matches!(
            fs.probe(Path::new("main.py")),
            EntryStatus::OutsideRoot
        ));
        let err = resolve_execution_binding(&descriptor("main.py", "GoodNewsGenerator"), &fs)
            .unwrap_err();
        assert!(path_reason(err).contains("escapes"));

        resolve_execution_binding(&descriptor("alias.py", "GoodNewsGenerator"), &fs).unwrap();
    }
}
