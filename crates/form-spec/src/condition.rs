use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::spec::submission::Payload;

/// Comparison applied by a single [`Condition`].
///
/// Operators arrive as free-form strings in stored templates; anything outside
/// the known set is kept as [`ConditionOperator::Unknown`] and never matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ConditionOperator {
    IsEmpty,
    IsNotEmpty,
    Equals,
    NotEquals,
    Contains,
    NotContains,
    GreaterThan,
    LessThan,
    GreaterThanOrEquals,
    LessThanOrEquals,
    Unknown(String),
}

impl ConditionOperator {
    pub fn as_str(&self) -> &str {
        match self {
            ConditionOperator::IsEmpty => "is_empty",
            ConditionOperator::IsNotEmpty => "is_not_empty",
            ConditionOperator::Equals => "equals",
            ConditionOperator::NotEquals => "not_equals",
            ConditionOperator::Contains => "contains",
            ConditionOperator::NotContains => "not_contains",
            ConditionOperator::GreaterThan => "greater_than",
            ConditionOperator::LessThan => "less_than",
            ConditionOperator::GreaterThanOrEquals => "greater_than_or_equals",
            ConditionOperator::LessThanOrEquals => "less_than_or_equals",
            ConditionOperator::Unknown(raw) => raw,
        }
    }

    fn is_numeric(&self) -> bool {
        matches!(
            self,
            ConditionOperator::GreaterThan
                | ConditionOperator::LessThan
                | ConditionOperator::GreaterThanOrEquals
                | ConditionOperator::LessThanOrEquals
        )
    }
}

impl From<String> for ConditionOperator {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "is_empty" => ConditionOperator::IsEmpty,
            "is_not_empty" => ConditionOperator::IsNotEmpty,
            "equals" => ConditionOperator::Equals,
            "not_equals" => ConditionOperator::NotEquals,
            "contains" => ConditionOperator::Contains,
            "not_contains" => ConditionOperator::NotContains,
            "greater_than" => ConditionOperator::GreaterThan,
            "less_than" => ConditionOperator::LessThan,
            "greater_than_or_equals" => ConditionOperator::GreaterThanOrEquals,
            "less_than_or_equals" => ConditionOperator::LessThanOrEquals,
            _ => ConditionOperator::Unknown(raw),
        }
    }
}

impl From<&str> for ConditionOperator {
    fn from(raw: &str) -> Self {
        ConditionOperator::from(raw.to_string())
    }
}

impl From<ConditionOperator> for String {
    fn from(operator: ConditionOperator) -> Self {
        match operator {
            ConditionOperator::Unknown(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for ConditionOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Boolean combinator applied across a field's conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LogicOperator {
    #[default]
    And,
    Or,
}

impl From<String> for LogicOperator {
    fn from(raw: String) -> Self {
        if raw.eq_ignore_ascii_case("or") {
            LogicOperator::Or
        } else {
            LogicOperator::And
        }
    }
}

impl From<LogicOperator> for String {
    fn from(operator: LogicOperator) -> Self {
        match operator {
            LogicOperator::And => "and".into(),
            LogicOperator::Or => "or".into(),
        }
    }
}

/// One `{ field, operator, value }` test against a submission payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Condition {
    pub field: String,
    #[schemars(with = "String")]
    pub operator: ConditionOperator,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl Condition {
    pub fn new(
        field: impl Into<String>,
        operator: impl Into<ConditionOperator>,
        value: Option<Value>,
    ) -> Self {
        Self {
            field: field.into(),
            operator: operator.into(),
            value,
        }
    }

    /// Evaluates the condition against `payload`. Never fails: malformed
    /// operands and unknown operators evaluate to `false`.
    pub fn evaluate(&self, payload: &Payload) -> bool {
        let field_value = payload.get(&self.field);
        let field_exists = field_value.is_some();

        let outcome = match &self.operator {
            ConditionOperator::IsEmpty => field_value.is_none_or(is_blank),
            ConditionOperator::IsNotEmpty => field_value.is_some_and(|value| !is_blank(value)),
            _ if !field_exists => false,
            ConditionOperator::Unknown(raw) => {
                tracing::debug!(field = %self.field, operator = %raw, "unknown condition operator");
                false
            }
            operator if operator.is_numeric() => field_value
                .is_some_and(|value| self.compare_numbers(operator, value)),
            operator => field_value.is_some_and(|value| self.compare_strings(operator, value)),
        };

        tracing::trace!(
            field = %self.field,
            operator = %self.operator,
            field_exists,
            outcome,
            "condition evaluated"
        );
        outcome
    }

    fn compare_strings(&self, operator: &ConditionOperator, field_value: &Value) -> bool {
        let actual = coerce_string(field_value);
        let expected = self.value.as_ref().map(coerce_string).unwrap_or_default();
        match operator {
            ConditionOperator::Equals => actual == expected,
            ConditionOperator::NotEquals => actual != expected,
            ConditionOperator::Contains => actual.contains(&expected),
            ConditionOperator::NotContains => !actual.contains(&expected),
            _ => false,
        }
    }

    fn compare_numbers(&self, operator: &ConditionOperator, field_value: &Value) -> bool {
        let expected = match &self.value {
            None => Some(0.0),
            Some(value) => parse_number(value),
        };
        let (Some(actual), Some(expected)) = (parse_number(field_value), expected) else {
            return false;
        };
        match operator {
            ConditionOperator::GreaterThan => actual > expected,
            ConditionOperator::LessThan => actual < expected,
            ConditionOperator::GreaterThanOrEquals => actual >= expected,
            ConditionOperator::LessThanOrEquals => actual <= expected,
            _ => false,
        }
    }
}

/// Evaluates `condition` against `payload`.
pub fn evaluate_condition(condition: &Condition, payload: &Payload) -> bool {
    condition.evaluate(payload)
}

/// `null` and `""` count as empty; every other value, including `0`,
/// `false` and empty collections, is a real answer.
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(text) => text.is_empty(),
        _ => false,
    }
}

/// String form used by the textual operators.
pub fn coerce_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(number) => number.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// Numeric form used by the ordering operators, if the value has one.
pub fn parse_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Conditions attached to a field; `operator` combines their outcomes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct ConditionalLogic {
    #[serde(default)]
    #[schemars(with = "String")]
    pub operator: LogicOperator,
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

impl ConditionalLogic {
    pub fn all(conditions: Vec<Condition>) -> Self {
        Self {
            operator: LogicOperator::And,
            conditions,
        }
    }

    pub fn any(conditions: Vec<Condition>) -> Self {
        Self {
            operator: LogicOperator::Or,
            conditions,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Combines every condition with the block's operator. An empty block is
    /// vacuously satisfied.
    pub fn evaluate(&self, payload: &Payload) -> bool {
        let mut outcomes = self
            .conditions
            .iter()
            .map(|condition| condition.evaluate(payload));
        match self.operator {
            LogicOperator::And => outcomes.all(|outcome| outcome),
            LogicOperator::Or => outcomes.any(|outcome| outcome),
        }
    }
}
