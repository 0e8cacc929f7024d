//! Resolution of user-supplied configuration against a plugin's declared schema.
//!
//! The host hands the result to the plugin's entry point at construction time.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigValueErrors, ConfigValueIssue, DescriptorError, ValueProblem};
use crate::manifest::{OptionType, PluginDescriptor};

/// A scalar configuration value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Boolean(bool),
    Number(f64),
    String(String),
}

impl ConfigValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Boolean(_) => "boolean",
            Self::Number(_) => "number",
            Self::String(_) => "string",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for ConfigValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<f64> for ConfigValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

/// Effective configuration for one plugin instance.
///
/// Holds an entry for every declared option; `None` means the option is
/// optional and was left unset with no declared default.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PluginConfig {
    values: BTreeMap<String, Option<ConfigValue>>,
}

impl PluginConfig {
    pub fn get(&self, name: &str) -> Option<&ConfigValue> {
        self.values.get(name).and_then(Option::as_ref)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(ConfigValue::as_str)
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(ConfigValue::as_bool)
    }

    pub fn get_f64(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(ConfigValue::as_f64)
    }

    pub fn is_declared(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn is_set(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&ConfigValue>)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_ref()))
    }
}

/// Builds the option-name → value mapping the host passes to the entry point.
///
/// For each declared option: the user's value if set (type-checked), else the
/// declared default, else absent. Missing required values and type mismatches
/// are collected across all options before failing.
pub fn resolve_config(
    descriptor: &PluginDescriptor,
    user_values: &BTreeMap<String, ConfigValue>,
) -> Result<PluginConfig, DescriptorError> {
    let mut values = BTreeMap::new();
    let mut issues = Vec::new();

    for option in descriptor.config_options() {
        let resolved = match user_values.get(&option.name) {
            Some(value) if option.admits(value) => Some(value.clone()),
            Some(value) => {
                let problem = match (&option.option_type, value) {
                    (OptionType::Enum, ConfigValue::String(s)) => ValueProblem::NotAnOption {
                        value: s.clone(),
                        allowed: option.options.clone(),
                    },
                    _ => ValueProblem::TypeMismatch {
                        expected: option.option_type.to_string(),
                        found: value.type_name(),
                    },
                };
                issues.push(ConfigValueIssue {
                    option: option.name.clone(),
                    problem,
                });
                continue;
            }
            None => option.default.clone(),
        };

        if resolved.is_none() && option.required {
            issues.push(ConfigValueIssue {
                option: option.name.clone(),
                problem: ValueProblem::MissingRequired,
            });
            continue;
        }

        values.insert(option.name.clone(), resolved);
    }

    for key in user_values.keys() {
        if descriptor.config_option(key).is_none() {
            tracing::warn!(
                plugin = %descriptor.name(),
                option = %key,
                "Ignoring value for undeclared config option"
            );
        }
    }

    if !issues.is_empty() {
        return Err(DescriptorError::ConfigValues(ConfigValueErrors(issues)));
    }

    Ok(PluginConfig { values })
}
