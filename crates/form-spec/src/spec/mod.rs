pub mod field;
pub mod submission;
pub mod template;

pub use field::{FieldOption, FormField, ValidationRules, WidgetType};
pub use submission::{FormSubmission, Payload};
pub use template::{FormTemplate, slugify};
