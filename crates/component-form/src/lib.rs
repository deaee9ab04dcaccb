use std::net::IpAddr;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use thiserror::Error;

use form_spec::{
    FormSubmission, FormTemplate, Payload, SpecError, ValidationResult, resolve_visibility,
    validate, validate_all,
};

const DEFAULT_TEMPLATE: &str = include_str!("../../form-spec/tests/fixtures/application_form.json");

/// Message surfaced to clients when a required answer is absent.
pub const MISSING_REQUIRED_MESSAGE: &str = "Missing required field";

#[derive(Debug, Error)]
pub enum ComponentError {
    #[error("failed to parse config: {0}")]
    ConfigParse(#[source] serde_json::Error),
    #[error("failed to parse form template: {0}")]
    TemplateParse(#[source] serde_json::Error),
    #[error("form '{0}' is not available")]
    FormUnavailable(String),
    #[error("form '{0}' is not accepting submissions")]
    FormInactive(String),
    #[error("invalid form template: {0}")]
    InvalidTemplate(#[from] SpecError),
    #[error("failed to parse submission payload: {0}")]
    PayloadParse(#[source] serde_json::Error),
    #[error("submission payload must be a JSON object, got {0}")]
    PayloadShape(&'static str),
    #[error("json encode error: {0}")]
    JsonEncode(#[source] serde_json::Error),
}

#[derive(Debug, Deserialize, Serialize, Default)]
struct ComponentConfig {
    #[serde(default)]
    template_json: Option<String>,
}

/// Request metadata recorded alongside an accepted submission.
#[derive(Debug, Deserialize, Serialize, Default)]
struct SubmissionContext {
    #[serde(default)]
    submitted_by: Option<String>,
    #[serde(default)]
    ip_address: Option<IpAddr>,
    #[serde(default)]
    submission_id: Option<u64>,
}

fn load_template(config_json: &str) -> Result<FormTemplate, ComponentError> {
    let config = if config_json.trim().is_empty() {
        ComponentConfig::default()
    } else {
        serde_json::from_str(config_json).map_err(ComponentError::ConfigParse)?
    };

    let template_json = config.template_json.as_deref().unwrap_or(DEFAULT_TEMPLATE);
    let template: FormTemplate =
        serde_json::from_str(template_json).map_err(ComponentError::TemplateParse)?;
    let template = template.with_derived_slug();
    template.check()?;
    Ok(template)
}

/// Resolves `lookup` by slug first, then by numeric id.
fn ensure_form(lookup: &str, config_json: &str) -> Result<FormTemplate, ComponentError> {
    let template = load_template(config_json)?;
    let by_id = template.id.is_some_and(|id| id.to_string() == lookup);
    if template.slug == lookup || by_id {
        Ok(template)
    } else {
        Err(ComponentError::FormUnavailable(lookup.to_string()))
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn parse_payload(payload_json: &str) -> Result<Payload, ComponentError> {
    match serde_json::from_str(payload_json).map_err(ComponentError::PayloadParse)? {
        Value::Object(map) => Ok(map),
        other => Err(ComponentError::PayloadShape(value_kind(&other))),
    }
}

fn parse_context(ctx_json: &str) -> SubmissionContext {
    if ctx_json.trim().is_empty() {
        return SubmissionContext::default();
    }
    serde_json::from_str(ctx_json).unwrap_or_else(|error| {
        tracing::warn!(%error, "ignoring unreadable submission context");
        SubmissionContext::default()
    })
}

fn respond(result: Result<Value, ComponentError>) -> String {
    match result {
        Ok(value) => serde_json::to_string(&value).unwrap_or_else(|error| {
            json!({"error": format!("json encode: {}", error)}).to_string()
        }),
        Err(err) => json!({ "error": err.to_string() }).to_string(),
    }
}

/// Body returned for a rejected submission.
pub fn rejection_body(field_name: &str, label: &str) -> Value {
    json!({
        "status": "rejected",
        "message": MISSING_REQUIRED_MESSAGE,
        "field_name": field_name,
        "label": label,
    })
}

fn decision_body(result: &ValidationResult) -> Value {
    match result {
        ValidationResult::Accepted => json!({ "status": "accepted" }),
        ValidationResult::Rejected { field_name, label } => rejection_body(field_name, label),
    }
}

pub fn describe(lookup: &str, config_json: &str) -> String {
    respond(ensure_form(lookup, config_json).and_then(|template| {
        serde_json::to_value(template).map_err(ComponentError::JsonEncode)
    }))
}

pub fn validate_submission(lookup: &str, config_json: &str, payload_json: &str) -> String {
    respond(ensure_form(lookup, config_json).and_then(|template| {
        let payload = parse_payload(payload_json)?;
        Ok(decision_body(&validate(&template, &payload)))
    }))
}

pub fn validation_report(lookup: &str, config_json: &str, payload_json: &str) -> String {
    respond(ensure_form(lookup, config_json).and_then(|template| {
        let payload = parse_payload(payload_json)?;
        serde_json::to_value(validate_all(&template, &payload)).map_err(ComponentError::JsonEncode)
    }))
}

pub fn visible_fields(lookup: &str, config_json: &str, payload_json: &str) -> String {
    respond(ensure_form(lookup, config_json).and_then(|template| {
        let payload = parse_payload(payload_json)?;
        serde_json::to_value(resolve_visibility(&template, &payload))
            .map_err(ComponentError::JsonEncode)
    }))
}

fn build_submission(
    template: &FormTemplate,
    ctx: SubmissionContext,
    payload: Payload,
) -> FormSubmission {
    let submission = FormSubmission::new(template.slug.clone(), payload)
        .submitted_by(ctx.submitted_by)
        .from_ip(ctx.ip_address);
    match ctx.submission_id {
        Some(id) => submission.with_id(id),
        None => submission,
    }
}

/// Validates the payload and, when accepted, returns the submission record
/// the caller should persist.
pub fn submit(lookup: &str, config_json: &str, ctx_json: &str, payload_json: &str) -> String {
    respond(ensure_form(lookup, config_json).and_then(|template| {
        if !template.is_active {
            return Err(ComponentError::FormInactive(template.slug));
        }
        let payload = parse_payload(payload_json)?;

        let decision = validate(&template, &payload);
        if !decision.is_accepted() {
            return Ok(decision_body(&decision));
        }

        let submission = build_submission(&template, parse_context(ctx_json), payload);
        tracing::info!(
            form = %template.slug,
            answers = submission.data().len(),
            "submission accepted"
        );
        let record = serde_json::to_value(&submission).map_err(ComponentError::JsonEncode)?;
        Ok(json!({
            "status": "accepted",
            "submission": record,
        }))
    }))
}
