use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::condition::ConditionalLogic;

/// Input widgets a field can be rendered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum WidgetType {
    Text,
    Email,
    Password,
    Textarea,
    Number,
    Date,
    Datetime,
    Select,
    Radio,
    Checkbox,
    File,
    MultiSelect,
    Phone,
    Url,
}

impl WidgetType {
    /// Widgets whose answers are picked from the field's options.
    pub fn is_choice(&self) -> bool {
        matches!(
            self,
            WidgetType::Select | WidgetType::Radio | WidgetType::Checkbox | WidgetType::MultiSelect
        )
    }

    /// Choice widgets that may submit a list of option values.
    pub fn accepts_many(&self) -> bool {
        matches!(self, WidgetType::Checkbox | WidgetType::MultiSelect)
    }
}

/// One selectable choice for select, radio and checkbox style widgets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FieldOption {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub value: String,
    pub label: String,
    #[serde(default)]
    pub order: u32,
}

/// Constraints checked against a present answer.
///
/// Stored templates use camelCase keys (`minLength`, `maxValue`, ...); both
/// spellings are accepted.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct ValidationRules {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, alias = "minLength", skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(default, alias = "maxLength", skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(default, alias = "minValue", skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, alias = "maxValue", skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    /// Per-file limit in megabytes, checked against each entry's byte `size`.
    #[serde(default, alias = "maxFileSize", skip_serializing_if = "Option::is_none")]
    pub max_file_size: Option<f64>,
    #[serde(default, alias = "maxFiles", skip_serializing_if = "Option::is_none")]
    pub max_files: Option<usize>,
}

impl ValidationRules {
    pub fn is_empty(&self) -> bool {
        self == &ValidationRules::default()
    }
}

/// Definition of a single field inside a form template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FormField {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub field_name: String,
    pub label: String,
    pub widget_type: WidgetType,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub placeholder: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub help_text: String,
    #[serde(default)]
    pub is_required: bool,
    #[serde(default)]
    pub order: u32,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub widget_config: Map<String, Value>,
    #[serde(default, skip_serializing_if = "ValidationRules::is_empty")]
    pub validation_rules: ValidationRules,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditional_logic: Option<ConditionalLogic>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<FieldOption>,
}

impl FormField {
    pub fn new(
        field_name: impl Into<String>,
        label: impl Into<String>,
        widget_type: WidgetType,
    ) -> Self {
        Self {
            id: None,
            field_name: field_name.into(),
            label: label.into(),
            widget_type,
            placeholder: String::new(),
            help_text: String::new(),
            is_required: false,
            order: 0,
            widget_config: Map::new(),
            validation_rules: ValidationRules::default(),
            conditional_logic: None,
            options: Vec::new(),
        }
    }

    pub fn required(mut self) -> Self {
        self.is_required = true;
        self
    }

    pub fn with_order(mut self, order: u32) -> Self {
        self.order = order;
        self
    }

    pub fn with_logic(mut self, logic: ConditionalLogic) -> Self {
        self.conditional_logic = Some(logic);
        self
    }

    pub fn with_rules(mut self, rules: ValidationRules) -> Self {
        self.validation_rules = rules;
        self
    }

    pub fn with_options(mut self, options: Vec<FieldOption>) -> Self {
        self.options = options;
        self
    }

    /// True when the field's required flag depends on other answers.
    pub fn is_conditional(&self) -> bool {
        self.conditional_logic
            .as_ref()
            .is_some_and(|logic| !logic.is_empty())
    }

    /// Options in display order; ties keep their stored position.
    pub fn ordered_options(&self) -> Vec<&FieldOption> {
        let mut options: Vec<&FieldOption> = self.options.iter().collect();
        options.sort_by_key(|option| option.order);
        options
    }
}
