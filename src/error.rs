use std::fmt;
use std::path::PathBuf;

use crate::manifest::RuntimeKind;

/// Errors raised while loading, validating, binding, or configuring a plugin.
///
/// A plugin that produces any of these is not activated.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum DescriptorError {
    /// The document is structurally malformed: a required field is missing
    /// or a value has the wrong type.
    #[error("Invalid plugin manifest at {field}: {reason}")]
    Schema { field: String, reason: String },

    /// `apiVersion` or `kind` names something this loader does not support.
    #[error("Unsupported {field} '{found}' (expected '{expected}')")]
    UnsupportedVersion {
        field: &'static str,
        found: String,
        expected: &'static str,
    },

    /// One or more `spec.config` declarations are invalid.
    #[error("{0}")]
    ConfigSchema(ConfigSchemaErrors),

    #[error("Entry point '{path}' cannot be resolved: {reason}")]
    BindingPath { path: PathBuf, reason: String },

    #[error("Invalid entry-point symbol for runtime '{runtime}': {reason}")]
    BindingSymbol { runtime: RuntimeKind, reason: String },

    /// User-supplied configuration does not fit the declared schema.
    #[error("{0}")]
    ConfigValues(ConfigValueErrors),

    #[error("Duplicate plugin name '{name}': first at {first}, second at {second}")]
    DuplicateName {
        name: String,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("Plugin '{name}' is not loaded")]
    PluginNotFound { name: String },

    #[error("Failed to read plugin manifest {path}: {source}")]
    ManifestRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl DescriptorError {
    pub fn schema(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Schema {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn missing(field: impl Into<String>) -> Self {
        Self::schema(field, "missing required field")
    }

    /// True for errors a plugin author fixes by editing the manifest.
    pub fn is_manifest_error(&self) -> bool {
        matches!(
            self,
            Self::Schema { .. }
                | Self::UnsupportedVersion { .. }
                | Self::ConfigSchema(_)
                | Self::BindingPath { .. }
                | Self::BindingSymbol { .. }
        )
    }
}

/// What is wrong with a single `spec.config` entry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaProblem {
    #[error("name must not be empty")]
    EmptyName,
    #[error("name is declared more than once")]
    DuplicateName,
    #[error("label must be non-empty for at least one locale")]
    MissingLabel,
    #[error("type '{0}' is not one of string, boolean, number, enum")]
    UnsupportedType(String),
    #[error("enum option declares no allowed values")]
    EnumWithoutOptions,
    #[error("default is a {found}, expected {expected}")]
    DefaultTypeMismatch {
        expected: String,
        found: &'static str,
    },
    #[error("default '{0}' is not among the declared options")]
    DefaultNotAnOption(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigSchemaIssue {
    /// Position in `spec.config`.
    pub index: usize,
    pub name: String,
    pub problem: SchemaProblem,
}

impl fmt::Display for ConfigSchemaIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "option '{}' (spec.config[{}]): {}",
            self.name, self.index, self.problem
        )
    }
}

/// Every schema issue found in one validation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigSchemaErrors(pub Vec<ConfigSchemaIssue>);

impl ConfigSchemaErrors {
    /// Names of the offending options, in declaration order, without repeats.
    pub fn offending_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for issue in &self.0 {
            if !names.contains(&issue.name.as_str()) {
                names.push(&issue.name);
            }
        }
        names
    }

    pub fn issues(&self) -> &[ConfigSchemaIssue] {
        &self.0
    }
}

impl fmt::Display for ConfigSchemaErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid config schema: ")?;
        let msgs: Vec<String> = self.0.iter().map(|i| i.to_string()).collect();
        write!(f, "{}", msgs.join("; "))
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValueProblem {
    #[error("required option has no value and no default")]
    MissingRequired,
    #[error("expected {expected}, got {found}")]
    TypeMismatch {
        expected: String,
        found: &'static str,
    },
    #[error("'{value}' is not one of [{}]", allowed.join(", "))]
    NotAnOption { value: String, allowed: Vec<String> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConfigValueIssue {
    pub option: String,
    pub problem: ValueProblem,
}

impl fmt::Display for ConfigValueIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.option, self.problem)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConfigValueErrors(pub Vec<ConfigValueIssue>);

impl fmt::Display for ConfigValueErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid plugin configuration: ")?;
        let msgs: Vec<String> = self.0.iter().map(|i| i.to_string()).collect();
        write!(f, "{}", msgs.join("; "))
    }
}
