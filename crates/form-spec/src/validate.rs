use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::spec::field::{FormField, ValidationRules};
use crate::spec::submission::Payload;
use crate::spec::template::FormTemplate;
use crate::visibility::should_enforce_required;

/// Outcome of checking a payload against a template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ValidationResult {
    Accepted,
    Rejected { field_name: String, label: String },
}

impl ValidationResult {
    pub fn is_accepted(&self) -> bool {
        matches!(self, ValidationResult::Accepted)
    }
}

/// Checks required fields in ascending `order` and stops at the first one that
/// is missing while its requirement is active.
pub fn validate(template: &FormTemplate, payload: &Payload) -> ValidationResult {
    let missing = template
        .ordered_fields()
        .into_iter()
        .find(|field| is_missing_required(field, payload));

    match missing {
        Some(field) => {
            tracing::debug!(
                template = %template.name,
                field_name = %field.field_name,
                "submission rejected: missing required field"
            );
            ValidationResult::Rejected {
                field_name: field.field_name.clone(),
                label: field.label.clone(),
            }
        }
        None => ValidationResult::Accepted,
    }
}

fn is_missing_required(field: &FormField, payload: &Payload) -> bool {
    field.is_required
        && !payload.contains_key(&field.field_name)
        && should_enforce_required(field, payload)
}

/// A required field that was absent while its requirement was active.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingField {
    pub field_name: String,
    pub label: String,
}

/// A rule violated by a present answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field_name: String,
    pub message: String,
    pub code: String,
}

/// Every failure found in a payload, in field order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub missing_required: Vec<MissingField>,
    pub errors: Vec<FieldError>,
}

impl ValidationReport {
    /// The first missing field, matching what [`validate`] would report.
    pub fn first_failure(&self) -> ValidationResult {
        match self.missing_required.first() {
            Some(missing) => ValidationResult::Rejected {
                field_name: missing.field_name.clone(),
                label: missing.label.clone(),
            },
            None => ValidationResult::Accepted,
        }
    }
}

/// Collects all missing required fields plus rule and option violations on the
/// answers that are present.
pub fn validate_all(template: &FormTemplate, payload: &Payload) -> ValidationReport {
    let mut missing_required = Vec::new();
    let mut errors = Vec::new();

    for field in template.ordered_fields() {
        match payload.get(&field.field_name) {
            None => {
                if is_missing_required(field, payload) {
                    missing_required.push(MissingField {
                        field_name: field.field_name.clone(),
                        label: field.label.clone(),
                    });
                }
            }
            Some(value) => {
                if let Some(error) = check_value(field, value) {
                    errors.push(error);
                }
            }
        }
    }

    ValidationReport {
        valid: missing_required.is_empty() && errors.is_empty(),
        missing_required,
        errors,
    }
}

fn check_value(field: &FormField, value: &Value) -> Option<FieldError> {
    if let Some(error) = enforce_rules(field, value, &field.validation_rules) {
        return Some(error);
    }

    if field.widget_type.is_choice() && !field.options.is_empty() {
        return check_choice(field, value);
    }

    None
}

const BYTES_PER_MEGABYTE: f64 = 1024.0 * 1024.0;

fn enforce_rules(field: &FormField, value: &Value, rules: &ValidationRules) -> Option<FieldError> {
    if let Some(pattern) = &rules.pattern
        && let Some(text) = value.as_str()
    {
        match Regex::new(pattern) {
            Ok(regex) if !regex.is_match(text) => {
                return Some(field_error(
                    field,
                    "value does not match pattern",
                    "pattern_mismatch",
                ));
            }
            Ok(_) => {}
            Err(error) => {
                tracing::warn!(field_name = %field.field_name, %error, "invalid validation pattern");
                return Some(field_error(
                    field,
                    "validation pattern is invalid",
                    "invalid_pattern",
                ));
            }
        }
    }

    if let Some(min_length) = rules.min_length
        && let Some(text) = value.as_str()
        && text.chars().count() < min_length
    {
        return Some(field_error(
            field,
            "value shorter than min length",
            "min_length",
        ));
    }

    if let Some(max_length) = rules.max_length
        && let Some(text) = value.as_str()
        && text.chars().count() > max_length
    {
        return Some(field_error(
            field,
            "value longer than max length",
            "max_length",
        ));
    }

    let number = crate::condition::parse_number(value);

    if let Some(min) = rules.min
        && let Some(number) = number
        && number < min
    {
        return Some(field_error(field, "value below minimum", "min"));
    }

    if let Some(max) = rules.max
        && let Some(number) = number
        && number > max
    {
        return Some(field_error(field, "value above maximum", "max"));
    }

    enforce_file_limits(field, value, rules)
}

/// File answers are `{ name, size }` entries, or a list of them.
fn enforce_file_limits(
    field: &FormField,
    value: &Value,
    rules: &ValidationRules,
) -> Option<FieldError> {
    let entries: Vec<&Value> = match value {
        Value::Array(items) => items.iter().collect(),
        Value::Object(_) => vec![value],
        _ => return None,
    };

    if let Some(max_files) = rules.max_files
        && entries.len() > max_files
    {
        return Some(field_error(field, "too many files", "max_files"));
    }

    if let Some(max_file_size) = rules.max_file_size {
        let limit = max_file_size * BYTES_PER_MEGABYTE;
        let oversized = entries.iter().any(|entry| {
            entry
                .get("size")
                .and_then(Value::as_f64)
                .is_some_and(|size| size > limit)
        });
        if oversized {
            return Some(field_error(field, "file larger than max size", "max_file_size"));
        }
    }

    None
}

fn check_choice(field: &FormField, value: &Value) -> Option<FieldError> {
    let known = |candidate: &Value| {
        candidate
            .as_str()
            .is_some_and(|text| field.options.iter().any(|option| option.value == text))
    };

    let valid = match value {
        Value::Array(items) if field.widget_type.accepts_many() => items.iter().all(known),
        Value::Null => true,
        other => known(other),
    };

    (!valid).then(|| field_error(field, "value is not one of the field options", "invalid_option"))
}

fn field_error(field: &FormField, message: &str, code: &str) -> FieldError {
    FieldError {
        field_name: field.field_name.clone(),
        message: message.into(),
        code: code.into(),
    }
}
