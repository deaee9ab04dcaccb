use std::net::IpAddr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Raw submitted answers keyed by `field_name`.
pub type Payload = Map<String, Value>;

/// A recorded submission. The payload is kept exactly as received and the
/// record cannot be changed once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormSubmission {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<u64>,
    form_template: String,
    #[serde(default)]
    submitted_by: Option<String>,
    submission_data: Payload,
    submitted_at: DateTime<Utc>,
    #[serde(default)]
    ip_address: Option<IpAddr>,
}

impl FormSubmission {
    pub fn new(form_template: impl Into<String>, submission_data: Payload) -> Self {
        Self::at(form_template, submission_data, Utc::now())
    }

    pub fn at(
        form_template: impl Into<String>,
        submission_data: Payload,
        submitted_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: None,
            form_template: form_template.into(),
            submitted_by: None,
            submission_data,
            submitted_at,
            ip_address: None,
        }
    }

    pub fn with_id(mut self, id: u64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn submitted_by(mut self, submitter: Option<String>) -> Self {
        self.submitted_by = submitter;
        self
    }

    pub fn from_ip(mut self, ip_address: Option<IpAddr>) -> Self {
        self.ip_address = ip_address;
        self
    }

    pub fn id(&self) -> Option<u64> {
        self.id
    }

    /// Slug of the template the submission was made against.
    pub fn form_template(&self) -> &str {
        &self.form_template
    }

    pub fn submitter(&self) -> Option<&str> {
        self.submitted_by.as_deref()
    }

    pub fn data(&self) -> &Payload {
        &self.submission_data
    }

    pub fn submitted_at(&self) -> DateTime<Utc> {
        self.submitted_at
    }

    pub fn ip_address(&self) -> Option<IpAddr> {
        self.ip_address
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn record_keeps_payload_and_metadata() {
        let data = json!({ "field1": "value1", "nested": { "n": 1 } })
            .as_object()
            .cloned()
            .expect("object");
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let submission = FormSubmission::at("test-form", data.clone(), at)
            .with_id(3)
            .submitted_by(Some("tester".into()))
            .from_ip("127.0.0.1".parse().ok());

        assert_eq!(submission.id(), Some(3));
        assert_eq!(submission.form_template(), "test-form");
        assert_eq!(submission.submitter(), Some("tester"));
        assert_eq!(submission.data(), &data);
        assert_eq!(submission.submitted_at(), at);
        assert_eq!(
            submission.ip_address(),
            Some("127.0.0.1".parse().expect("ip"))
        );

        let encoded = serde_json::to_value(&submission).expect("serialize");
        assert_eq!(encoded["submitted_at"], "2024-05-01T12:00:00Z");
        let decoded: FormSubmission = serde_json::from_value(encoded).expect("deserialize");
        assert_eq!(decoded, submission);
    }
}
