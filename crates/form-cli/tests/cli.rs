use assert_cmd::Command;
use assert_fs::TempDir;
use assert_fs::prelude::*;
use serde_json::{Value, json};

const TEMPLATE: &str = include_str!("../../form-spec/tests/fixtures/application_form.json");

fn cli() -> Command {
    Command::cargo_bin("greentic-forms").expect("binary")
}

fn stdout_of(output: &std::process::Output) -> String {
    String::from_utf8(output.stdout.clone()).expect("utf8")
}

fn workspace(payload: Value) -> TempDir {
    let dir = TempDir::new().expect("temp dir");
    dir.child("template.json").write_str(TEMPLATE).expect("template");
    dir.child("payload.json")
        .write_str(&payload.to_string())
        .expect("payload");
    dir
}

#[test]
fn validate_accepts_complete_payload() {
    let dir = workspace(json!({ "full_name": "Ada", "marital_status": "single" }));
    let output = cli()
        .arg("validate")
        .arg("--template")
        .arg(dir.child("template.json").path())
        .arg("--payload")
        .arg(dir.child("payload.json").path())
        .output()
        .expect("run");
    assert!(output.status.success());
    assert!(stdout_of(&output).contains("Validation result: accepted"));
}

#[test]
fn validate_names_first_missing_field() {
    let dir = workspace(json!({ "full_name": "Ada", "marital_status": "married" }));
    let output = cli()
        .arg("validate")
        .arg("--template")
        .arg(dir.child("template.json").path())
        .arg("--payload")
        .arg(dir.child("payload.json").path())
        .output()
        .expect("run");
    assert!(!output.status.success());
    let stdout = stdout_of(&output);
    assert!(stdout.contains("Validation result: rejected"));
    assert!(stdout.contains("Missing required field: Spouse name (spouse_name)"));
}

#[test]
fn validate_all_lists_every_failure() {
    let dir = workspace(json!({ "marital_status": "married", "vip": "true" }));
    let output = cli()
        .arg("validate")
        .arg("--all")
        .arg("--template")
        .arg(dir.child("template.json").path())
        .arg("--payload")
        .arg(dir.child("payload.json").path())
        .output()
        .expect("run");
    assert!(!output.status.success());
    let stdout = stdout_of(&output);
    assert!(stdout.contains("Full name (full_name)"));
    assert!(stdout.contains("Spouse name (spouse_name)"));
    assert!(stdout.contains("Discount code (discount_code)"));
}

#[test]
fn visible_prints_active_flags() {
    let dir = workspace(json!({ "coupon_applied": "yes" }));
    let output = cli()
        .arg("visible")
        .arg("--template")
        .arg(dir.child("template.json").path())
        .arg("--payload")
        .arg(dir.child("payload.json").path())
        .output()
        .expect("run");
    assert!(output.status.success());
    let parsed: Value = serde_json::from_str(&stdout_of(&output)).expect("json");
    assert_eq!(parsed["discount_code"], true);
    assert_eq!(parsed["spouse_name"], false);
}

#[test]
fn submit_emits_record() {
    let dir = workspace(json!({ "full_name": "Ada", "marital_status": "single" }));
    let output = cli()
        .arg("submit")
        .arg("--template")
        .arg(dir.child("template.json").path())
        .arg("--payload")
        .arg(dir.child("payload.json").path())
        .arg("--submitted-by")
        .arg("ada")
        .arg("--ip")
        .arg("127.0.0.1")
        .output()
        .expect("run");
    assert!(output.status.success());
    let parsed: Value = serde_json::from_str(&stdout_of(&output)).expect("json");
    assert_eq!(parsed["submission"]["submitted_by"], "ada");
    assert_eq!(parsed["submission"]["ip_address"], "127.0.0.1");
    assert_eq!(parsed["submission"]["form_template"], "membership-application");
}

#[test]
fn slug_is_derived_from_name() {
    let output = cli()
        .arg("slug")
        .arg("Another Test Form")
        .output()
        .expect("run");
    assert!(output.status.success());
    assert_eq!(stdout_of(&output).trim(), "another-test-form");
}

#[test]
fn schema_describes_fields() {
    let output = cli().arg("schema").output().expect("run");
    assert!(output.status.success());
    let stdout = stdout_of(&output);
    assert!(stdout.contains("conditional_logic"));
    assert!(stdout.contains("multi_select"));
}

#[test]
fn stats_counts_submissions_per_form() {
    let dir = workspace(json!({}));
    let submissions = json!([
        {
            "form_template": "membership-application",
            "submission_data": { "full_name": "Ada" },
            "submitted_at": "2024-01-01T00:00:00Z"
        },
        {
            "form_template": "membership-application",
            "submission_data": { "full_name": "Grace" },
            "submitted_at": "2024-01-02T00:00:00Z",
            "ip_address": "10.0.0.1"
        }
    ]);
    dir.child("submissions.json")
        .write_str(&submissions.to_string())
        .expect("submissions");

    let output = cli()
        .arg("stats")
        .arg("--template")
        .arg(dir.child("template.json").path())
        .arg("--submissions")
        .arg(dir.child("submissions.json").path())
        .output()
        .expect("run");
    assert!(output.status.success());
    let parsed: Value = serde_json::from_str(&stdout_of(&output)).expect("json");
    assert_eq!(parsed["total_forms"], 1);
    assert_eq!(parsed["active_forms"], 1);
    assert_eq!(parsed["total_submissions"], 2);
    assert_eq!(parsed["submissions_by_form"]["membership-application"], 2);
}
