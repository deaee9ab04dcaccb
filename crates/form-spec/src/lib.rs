#![allow(missing_docs)]

pub mod condition;
pub mod error;
pub mod spec;
pub mod stats;
pub mod validate;
pub mod visibility;

pub use condition::{
    Condition, ConditionOperator, ConditionalLogic, LogicOperator, coerce_string,
    evaluate_condition, is_blank, parse_number,
};
pub use error::SpecError;
pub use spec::{
    FieldOption, FormField, FormSubmission, FormTemplate, Payload, ValidationRules, WidgetType,
    slugify,
};
pub use stats::FormStats;
pub use validate::{
    FieldError, MissingField, ValidationReport, ValidationResult, validate, validate_all,
};
pub use visibility::{VisibilityMap, resolve_visibility, should_enforce_required};
