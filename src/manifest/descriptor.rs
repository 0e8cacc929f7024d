use std::fmt;

use serde::{Serialize, Serializer};

use super::locale::LocalizedText;
use crate::values::ConfigValue;

pub const SUPPORTED_API_VERSION: &str = "v1";
pub const SUPPORTED_KIND: &str = "Plugin";

/// Identity and presentation data for a plugin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PluginMetadata {
    pub author: String,
    pub name: String,
    pub repository: String,
    pub version: String,
    pub description: LocalizedText,
    pub label: LocalizedText,
}

impl PluginMetadata {
    /// The version parsed as semver, if it is semver-shaped.
    pub fn semver(&self) -> Option<semver::Version> {
        semver::Version::parse(self.version.trim()).ok()
    }

    /// The repository parsed as a URL, if it is one.
    pub fn repository_url(&self) -> Option<url::Url> {
        url::Url::parse(self.repository.trim()).ok()
    }

    pub fn label_for(&self, locale: &str, default_locale: &str) -> &str {
        self.label
            .resolve(locale, default_locale)
            .unwrap_or(&self.name)
    }

    pub fn description_for(&self, locale: &str, default_locale: &str) -> Option<&str> {
        self.description.resolve(locale, default_locale)
    }
}

/// Declared type of a configuration option.
///
/// Unknown type names survive loading as [`OptionType::Unsupported`] so the
/// schema validator can report them by option name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OptionType {
    String,
    Boolean,
    Number,
    Enum,
    Unsupported(String),
}

impl OptionType {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "string" => Self::String,
            "boolean" => Self::Boolean,
            "number" => Self::Number,
            "enum" => Self::Enum,
            other => Self::Unsupported(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::String => "string",
            Self::Boolean => "boolean",
            Self::Number => "number",
            Self::Enum => "enum",
            Self::Unsupported(raw) => raw,
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Unsupported(_))
    }

    /// Shape check only; enum membership is checked against the option.
    pub fn accepts(&self, value: &ConfigValue) -> bool {
        matches!(
            (self, value),
            (Self::String, ConfigValue::String(_))
                | (Self::Enum, ConfigValue::String(_))
                | (Self::Boolean, ConfigValue::Boolean(_))
                | (Self::Number, ConfigValue::Number(_))
        )
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for OptionType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// One user-settable parameter declared under `spec.config`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigOption {
    pub name: String,
    pub label: LocalizedText,
    pub description: LocalizedText,
    #[serde(rename = "type")]
    pub option_type: OptionType,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<ConfigValue>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

impl ConfigOption {
    /// Type and enum-membership check for a concrete value.
    pub fn admits(&self, value: &ConfigValue) -> bool {
        if !self.option_type.accepts(value) {
            return false;
        }
        match (&self.option_type, value) {
            (OptionType::Enum, ConfigValue::String(s)) => self.options.iter().any(|o| o == s),
            _ => true,
        }
    }
}

/// Language runtimes a plugin entry point can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuntimeKind {
    Python,
}

const PYTHON_KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global", "if",
    "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return", "try",
    "while", "with", "yield",
];

impl RuntimeKind {
    pub const ALL: &'static [RuntimeKind] = &[RuntimeKind::Python];

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.as_str() == key)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Python => "python",
        }
    }

    /// Checks that `symbol` is shaped like a name the runtime can resolve.
    pub fn check_symbol(&self, symbol: &str) -> Result<(), String> {
        if symbol.trim().is_empty() {
            return Err("symbol name must not be empty".to_string());
        }
        match self {
            Self::Python => {
                let mut chars = symbol.chars();
                let valid_start = chars
                    .next()
                    .is_some_and(|c| c == '_' || c.is_alphabetic());
                if !valid_start || !chars.all(|c| c == '_' || c.is_alphanumeric()) {
                    return Err(format!("'{symbol}' is not a valid Python identifier"));
                }
                if PYTHON_KEYWORDS.contains(&symbol) {
                    return Err(format!("'{symbol}' is a Python keyword"));
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for RuntimeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for RuntimeKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// `(runtime, path, attr)`: where the host finds the plugin's entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionBinding {
    pub runtime: RuntimeKind,
    pub path: String,
    pub attr: String,
}

#[derive(Serialize)]
struct BindingBody<'a> {
    path: &'a str,
    attr: &'a str,
}

impl Serialize for ExecutionBinding {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(
            self.runtime.as_str(),
            &BindingBody {
                path: &self.path,
                attr: &self.attr,
            },
        )?;
        map.end()
    }
}

/// A parsed plugin manifest.
///
/// Produced by [`load`](crate::load); immutable afterwards. Serializes back
/// to the manifest document shape.
#[derive(Debug, Clone, PartialEq)]
pub struct PluginDescriptor {
    pub(crate) metadata: PluginMetadata,
    pub(crate) config: Vec<ConfigOption>,
    pub(crate) execution: ExecutionBinding,
}

impl PluginDescriptor {
    pub fn metadata(&self) -> &PluginMetadata {
        &self.metadata
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn version(&self) -> &str {
        &self.metadata.version
    }

    pub fn config_options(&self) -> &[ConfigOption] {
        &self.config
    }

    pub fn config_option(&self, name: &str) -> Option<&ConfigOption> {
        self.config.iter().find(|o| o.name == name)
    }

    pub fn execution(&self) -> &ExecutionBinding {
        &self.execution
    }
}

#[derive(Serialize)]
struct SpecView<'a> {
    config: &'a [ConfigOption],
}

#[derive(Serialize)]
struct DocumentView<'a> {
    #[serde(rename = "apiVersion")]
    api_version: &'static str,
    kind: &'static str,
    metadata: &'a PluginMetadata,
    spec: SpecView<'a>,
    execution: &'a ExecutionBinding,
}

impl Serialize for PluginDescriptor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        DocumentView {
            api_version: SUPPORTED_API_VERSION,
            kind: SUPPORTED_KIND,
            metadata: &self.metadata,
            spec: SpecView {
                config: &self.config,
            },
            execution: &self.execution,
        }
        .serialize(serializer)
    }
}
