//! Plugin manifest parsing.
//!
//! A manifest is a YAML document of the form:
//!
//! ```yaml
//! apiVersion: v1
//! kind: Plugin
//! metadata:
//!   author: HwlloChen
//!   name: GoodNewsGenerator
//!   repository: https://github.com/HwlloChen/GoodNewsGenerator
//!   version: 0.2.1
//!   description:
//!     en_US: Generates good/bad news images
//!   label:
//!     en_US: Good News Generator
//! spec:
//!   config:
//!     - name: font_path
//!       label:
//!         en_US: Font path
//!       type: string
//!       required: false
//! execution:
//!   python:
//!     path: main.py
//!     attr: GoodNewsGenerator
//! ```
//!
//! [`load`] only checks structure; [`validate_config_schema`] checks the
//! option declarations and the binding module checks the entry point.

mod descriptor;
mod locale;
mod raw;
mod validate;

use std::path::Path;

pub use descriptor::{
    ConfigOption, ExecutionBinding, OptionType, PluginDescriptor, PluginMetadata, RuntimeKind,
    SUPPORTED_API_VERSION, SUPPORTED_KIND,
};
pub use locale::{DEFAULT_LOCALE, LocalizedText};
pub use validate::validate_config_schema;

use raw::{RawBinding, RawHeader, RawManifest, RawMetadata, RawOption};

use crate::error::DescriptorError;

/// Parses a manifest document into a [`PluginDescriptor`].
///
/// `apiVersion` and `kind` are checked before the rest of the document is
/// interpreted, so a manifest written for another schema version fails with
/// [`DescriptorError::UnsupportedVersion`] rather than a shape error.
pub fn load(source: &str) -> Result<PluginDescriptor, DescriptorError> {
    let header: RawHeader = serde_yaml_bw::from_str(source)
        .map_err(|e| DescriptorError::schema("<document>", e.to_string()))?;
    check_header(header)?;

    let manifest: RawManifest = serde_yaml_bw::from_str(source)
        .map_err(|e| DescriptorError::schema("<document>", e.to_string()))?;

    let metadata = convert_metadata(
        manifest
            .metadata
            .ok_or_else(|| DescriptorError::missing("metadata"))?,
    )?;

    let config = manifest
        .spec
        .and_then(|spec| spec.config)
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .map(|(index, raw)| convert_option(index, raw))
        .collect::<Result<Vec<_>, _>>()?;

    let execution = convert_execution(
        manifest
            .execution
            .ok_or_else(|| DescriptorError::missing("execution"))?,
    )?;

    warn_informational(&metadata);
    tracing::debug!(
        plugin = %metadata.name,
        version = %metadata.version,
        options = config.len(),
        runtime = %execution.runtime,
        "Loaded plugin manifest"
    );

    Ok(PluginDescriptor {
        metadata,
        config,
        execution,
    })
}

/// Reads `path` and parses it with [`load`].
pub fn load_file(path: &Path) -> Result<PluginDescriptor, DescriptorError> {
    let content =
        std::fs::read_to_string(path).map_err(|source| DescriptorError::ManifestRead {
            path: path.to_path_buf(),
            source,
        })?;
    load(&content)
}

fn check_header(header: RawHeader) -> Result<(), DescriptorError> {
    let api_version = header
        .api_version
        .ok_or_else(|| DescriptorError::missing("apiVersion"))?;
    if api_version != SUPPORTED_API_VERSION {
        return Err(DescriptorError::UnsupportedVersion {
            field: "apiVersion",
            found: api_version,
            expected: SUPPORTED_API_VERSION,
        });
    }

    let kind = header
        .kind
        .ok_or_else(|| DescriptorError::missing("kind"))?;
    if kind != SUPPORTED_KIND {
        return Err(DescriptorError::UnsupportedVersion {
            field: "kind",
            found: kind,
            expected: SUPPORTED_KIND,
        });
    }

    Ok(())
}

fn non_empty(field: &str, value: Option<String>) -> Result<String, DescriptorError> {
    let value = value.ok_or_else(|| DescriptorError::missing(field))?;
    if value.trim().is_empty() {
        return Err(DescriptorError::schema(field, "must not be empty"));
    }
    Ok(value)
}

fn convert_metadata(raw: RawMetadata) -> Result<PluginMetadata, DescriptorError> {
    Ok(PluginMetadata {
        name: non_empty("metadata.name", raw.name)?,
        version: non_empty("metadata.version", raw.version)?,
        author: raw.author.unwrap_or_default(),
        repository: raw.repository.unwrap_or_default(),
        description: raw.description.unwrap_or_default(),
        label: raw.label.unwrap_or_default(),
    })
}

fn convert_option(index: usize, raw: RawOption) -> Result<ConfigOption, DescriptorError> {
    let field = |name: &str| format!("spec.config[{index}].{name}");

    Ok(ConfigOption {
        name: raw.name.ok_or_else(|| DescriptorError::missing(field("name")))?,
        option_type: raw
            .option_type
            .map(|t| OptionType::parse(&t))
            .ok_or_else(|| DescriptorError::missing(field("type")))?,
        label: raw.label.unwrap_or_default(),
        description: raw.description.unwrap_or_default(),
        required: raw.required.unwrap_or(false),
        default: raw.default,
        options: raw.options.unwrap_or_default(),
    })
}

fn convert_execution(
    raw: std::collections::BTreeMap<String, Option<RawBinding>>,
) -> Result<ExecutionBinding, DescriptorError> {
    let mut entries = raw.into_iter();
    let (key, body) = match (entries.next(), entries.next()) {
        (Some(entry), None) => entry,
        (None, _) => {
            return Err(DescriptorError::schema(
                "execution",
                "exactly one runtime must be declared, found none",
            ));
        }
        (Some((first, _)), Some((second, _))) => {
            return Err(DescriptorError::schema(
                "execution",
                format!("exactly one runtime must be declared, found '{first}' and '{second}'"),
            ));
        }
    };

    let runtime = RuntimeKind::from_key(&key).ok_or_else(|| {
        let supported: Vec<&str> = RuntimeKind::ALL.iter().map(RuntimeKind::as_str).collect();
        DescriptorError::schema(
            "execution",
            format!(
                "unsupported runtime '{key}' (supported: {})",
                supported.join(", ")
            ),
        )
    })?;

    let body = body.ok_or_else(|| DescriptorError::missing(format!("execution.{key}")))?;
    Ok(ExecutionBinding {
        runtime,
        path: body
            .path
            .ok_or_else(|| DescriptorError::missing(format!("execution.{key}.path")))?,
        attr: body
            .attr
            .ok_or_else(|| DescriptorError::missing(format!("execution.{key}.attr")))?,
    })
}

fn warn_informational(metadata: &PluginMetadata) {
    if metadata.semver().is_none() {
        tracing::warn!(
            plugin = %metadata.name,
            version = %metadata.version,
            "Plugin version is not a semantic version"
        );
    }
    if !metadata.repository.trim().is_empty() && metadata.repository_url().is_none() {
        tracing::warn!(
            plugin = %metadata.name,
            repository = %metadata.repository,
            "Plugin repository is not a valid URL"
        );
    }
}
