use thiserror::Error;

/// Structural problems in a template definition.
#[derive(Debug, Error)]
pub enum SpecError {
    #[error("field '{label}' has an empty field_name")]
    EmptyFieldName { label: String },
    #[error("field_name '{0}' is used more than once")]
    DuplicateFieldName(String),
    #[error("field '{field_name}' has an invalid pattern: {source}")]
    InvalidPattern {
        field_name: String,
        #[source]
        source: regex::Error,
    },
}
