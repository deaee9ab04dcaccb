use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

use crate::error::SpecError;
use crate::spec::field::FormField;

static NON_SLUG_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9_\s-]").expect("static slug pattern"));
static SLUG_SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-\s]+").expect("static separator pattern"));

/// Turns a display name into a URL-safe slug (`"Another Test Form"` becomes
/// `"another-test-form"`). Accented letters fold to their ASCII base under
/// NFKD; anything with no ASCII form is dropped.
pub fn slugify(text: &str) -> String {
    let folded: String = text.nfkd().filter(char::is_ascii).collect();
    let lowered = folded.to_lowercase();
    let stripped = NON_SLUG_CHARS.replace_all(&lowered, "");
    let joined = SLUG_SEPARATORS.replace_all(&stripped, "-");
    joined.trim_matches(|c| c == '-' || c == '_').to_string()
}

fn default_active() -> bool {
    true
}

/// Reusable form definition owning an ordered set of fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FormTemplate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub slug: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub category: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub fields: Vec<FormField>,
}

impl FormTemplate {
    pub fn new(name: impl Into<String>, fields: Vec<FormField>) -> Self {
        Self {
            id: None,
            name: name.into(),
            slug: String::new(),
            description: String::new(),
            category: String::new(),
            is_active: true,
            fields,
        }
        .with_derived_slug()
    }

    /// The stored slug, or one derived from the name when none was given.
    pub fn effective_slug(&self) -> String {
        if self.slug.is_empty() {
            slugify(&self.name)
        } else {
            self.slug.clone()
        }
    }

    pub fn with_derived_slug(mut self) -> Self {
        if self.slug.is_empty() {
            self.slug = slugify(&self.name);
        }
        self
    }

    /// Fields by ascending `order`; equal orders keep their stored position.
    pub fn ordered_fields(&self) -> Vec<&FormField> {
        let mut fields: Vec<&FormField> = self.fields.iter().collect();
        fields.sort_by_key(|field| field.order);
        fields
    }

    pub fn field(&self, field_name: &str) -> Option<&FormField> {
        self.fields
            .iter()
            .find(|field| field.field_name == field_name)
    }

    /// Structural checks a template must pass before it is served.
    pub fn check(&self) -> Result<(), SpecError> {
        let mut seen = BTreeSet::new();
        for field in &self.fields {
            if field.field_name.trim().is_empty() {
                return Err(SpecError::EmptyFieldName {
                    label: field.label.clone(),
                });
            }
            if !seen.insert(field.field_name.as_str()) {
                return Err(SpecError::DuplicateFieldName(field.field_name.clone()));
            }
            if let Some(pattern) = &field.validation_rules.pattern {
                Regex::new(pattern).map_err(|source| SpecError::InvalidPattern {
                    field_name: field.field_name.clone(),
                    source,
                })?;
            }
        }
        Ok(())
    }
}
