use std::collections::HashMap;

use super::descriptor::{ConfigOption, OptionType, PluginDescriptor};
use crate::error::{ConfigSchemaErrors, ConfigSchemaIssue, DescriptorError, SchemaProblem};
use crate::values::ConfigValue;

/// Checks every `spec.config` declaration and reports all problems at once.
///
/// Duplicate names are reported at each occurrence so both declarations
/// show up in the error.
pub fn validate_config_schema(descriptor: &PluginDescriptor) -> Result<(), DescriptorError> {
    let options = descriptor.config_options();
    let mut issues = Vec::new();

    let mut occurrences: HashMap<&str, usize> = HashMap::new();
    for option in options {
        *occurrences.entry(option.name.as_str()).or_default() += 1;
    }

    for (index, option) in options.iter().enumerate() {
        let mut report = |problem| {
            issues.push(ConfigSchemaIssue {
                index,
                name: option.name.clone(),
                problem,
            })
        };

        if option.name.trim().is_empty() {
            report(SchemaProblem::EmptyName);
        } else if occurrences.get(option.name.as_str()).copied().unwrap_or(0) > 1 {
            report(SchemaProblem::DuplicateName);
        }

        if !option.label.has_text() {
            report(SchemaProblem::MissingLabel);
        }

        for problem in type_problems(option) {
            report(problem);
        }
    }

    if issues.is_empty() {
        tracing::debug!(
            plugin = %descriptor.name(),
            options = options.len(),
            "Config schema valid"
        );
        Ok(())
    } else {
        Err(DescriptorError::ConfigSchema(ConfigSchemaErrors(issues)))
    }
}

fn type_problems(option: &ConfigOption) -> Vec<SchemaProblem> {
    let mut problems = Vec::new();

    if let OptionType::Unsupported(raw) = &option.option_type {
        problems.push(SchemaProblem::UnsupportedType(raw.clone()));
        return problems;
    }

    if option.option_type == OptionType::Enum && option.options.is_empty() {
        problems.push(SchemaProblem::EnumWithoutOptions);
    }

    if let Some(default) = &option.default {
        if !option.option_type.accepts(default) {
            problems.push(SchemaProblem::DefaultTypeMismatch {
                expected: option.option_type.to_string(),
                found: default.type_name(),
            });
        } else if let (OptionType::Enum, ConfigValue::String(s)) = (&option.option_type, default)
            && !option.options.is_empty()
            && !option.options.contains(s)
        {
            problems.push(SchemaProblem::DefaultNotAnOption(s.clone()));
        }
    }

    problems
}
