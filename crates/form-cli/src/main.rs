use clap::{Parser, Subcommand};
use component_form::submit as component_submit;
use form_spec::{
    FormStats, FormSubmission, FormTemplate, Payload, ValidationReport, ValidationResult,
    resolve_visibility, slugify, validate, validate_all,
};
use serde::Deserialize;
use serde_json::{Value, json};
use std::fs;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Form template and submission helper",
    long_about = "Validates submissions against form templates, inspects conditional fields, and emits template schemas"
)]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate a submission payload against a form template.
    Validate {
        /// Path to the FormTemplate JSON.
        #[arg(long, value_name = "TEMPLATE")]
        template: PathBuf,
        /// Path to the submission payload JSON.
        #[arg(long, value_name = "PAYLOAD")]
        payload: PathBuf,
        /// Report every failure instead of stopping at the first missing field.
        #[arg(long)]
        all: bool,
    },
    /// Show which fields currently have their required rule active.
    Visible {
        /// Path to the FormTemplate JSON.
        #[arg(long, value_name = "TEMPLATE")]
        template: PathBuf,
        /// Path to the submission payload JSON.
        #[arg(long, value_name = "PAYLOAD")]
        payload: PathBuf,
    },
    /// Validate and build the submission record a store would persist.
    Submit {
        /// Path to the FormTemplate JSON.
        #[arg(long, value_name = "TEMPLATE")]
        template: PathBuf,
        /// Path to the submission payload JSON.
        #[arg(long, value_name = "PAYLOAD")]
        payload: PathBuf,
        /// Identity of the submitter.
        #[arg(long, value_name = "USER")]
        submitted_by: Option<String>,
        /// Client IP address recorded with the submission.
        #[arg(long, value_name = "IP")]
        ip: Option<IpAddr>,
    },
    /// Print the JSON schema for form templates.
    Schema,
    /// Print the slug derived from a form name.
    Slug {
        /// Form name to convert.
        name: String,
    },
    /// Count forms and submissions.
    Stats {
        /// FormTemplate JSON files.
        #[arg(long = "template", value_name = "TEMPLATE")]
        templates: Vec<PathBuf>,
        /// JSON files holding one submission or an array of submissions.
        #[arg(long = "submissions", value_name = "SUBMISSIONS")]
        submissions: Vec<PathBuf>,
    },
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match cli.command {
        Command::Validate {
            template,
            payload,
            all,
        } => run_validate(template, payload, all),
        Command::Visible { template, payload } => run_visible(template, payload),
        Command::Submit {
            template,
            payload,
            submitted_by,
            ip,
        } => run_submit(template, payload, submitted_by, ip),
        Command::Schema => run_schema(),
        Command::Slug { name } => {
            println!("{}", slugify(&name));
            Ok(())
        }
        Command::Stats {
            templates,
            submissions,
        } => run_stats(templates, submissions),
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_template(path: &Path) -> CliResult<FormTemplate> {
    let template_json = fs::read_to_string(path)?;
    let template: FormTemplate = serde_json::from_str(&template_json)?;
    let template = template.with_derived_slug();
    template.check()?;
    tracing::debug!(form = %template.slug, fields = template.fields.len(), "template loaded");
    Ok(template)
}

fn load_payload(path: &Path) -> CliResult<Payload> {
    let payload_json = fs::read_to_string(path)?;
    match serde_json::from_str::<Value>(&payload_json)? {
        Value::Object(map) => Ok(map),
        _ => Err(format!("payload in {} must be a JSON object", path.display()).into()),
    }
}

fn run_validate(template_path: PathBuf, payload_path: PathBuf, all: bool) -> CliResult<()> {
    let template = load_template(&template_path)?;
    let payload = load_payload(&payload_path)?;

    if all {
        let report = validate_all(&template, &payload);
        println!(
            "Validation result: {}",
            if report.valid { "valid" } else { "invalid" }
        );
        describe_report(&report);
        return if report.valid {
            Ok(())
        } else {
            Err("validation failed".into())
        };
    }

    match validate(&template, &payload) {
        ValidationResult::Accepted => {
            println!("Validation result: accepted");
            Ok(())
        }
        ValidationResult::Rejected { field_name, label } => {
            println!("Validation result: rejected");
            println!("Missing required field: {} ({})", label, field_name);
            Err("validation failed".into())
        }
    }
}

fn describe_report(report: &ValidationReport) {
    if !report.missing_required.is_empty() {
        println!("Missing required fields:");
        for missing in &report.missing_required {
            println!("  {} ({})", missing.label, missing.field_name);
        }
    }
    if !report.errors.is_empty() {
        println!("Errors:");
        for error in &report.errors {
            println!("  {} - {} [{}]", error.field_name, error.message, error.code);
        }
    }
}

fn run_visible(template_path: PathBuf, payload_path: PathBuf) -> CliResult<()> {
    let template = load_template(&template_path)?;
    let payload = load_payload(&payload_path)?;
    let visibility = resolve_visibility(&template, &payload);
    println!("{}", serde_json::to_string_pretty(&visibility)?);
    Ok(())
}

fn run_submit(
    template_path: PathBuf,
    payload_path: PathBuf,
    submitted_by: Option<String>,
    ip: Option<IpAddr>,
) -> CliResult<()> {
    let template_json = fs::read_to_string(&template_path)?;
    let lookup = load_template(&template_path)?.slug;
    let payload_json = fs::read_to_string(&payload_path)?;

    let config = json!({ "template_json": template_json });
    let ctx = json!({ "submitted_by": submitted_by, "ip_address": ip });
    let response = component_submit(
        &lookup,
        &config.to_string(),
        &ctx.to_string(),
        &payload_json,
    );
    let parsed: Value = serde_json::from_str(&response)?;
    println!("{}", serde_json::to_string_pretty(&parsed)?);

    if let Some(error) = parsed.get("error").and_then(Value::as_str) {
        return Err(error.to_string().into());
    }
    if parsed["status"] != "accepted" {
        return Err("submission rejected".into());
    }
    Ok(())
}

fn run_schema() -> CliResult<()> {
    let schema = schemars::schema_for!(FormTemplate);
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SubmissionFile {
    Many(Vec<FormSubmission>),
    One(Box<FormSubmission>),
}

fn run_stats(template_paths: Vec<PathBuf>, submission_paths: Vec<PathBuf>) -> CliResult<()> {
    let templates = template_paths
        .iter()
        .map(|path| load_template(path))
        .collect::<CliResult<Vec<_>>>()?;

    let mut submissions = Vec::new();
    for path in &submission_paths {
        let contents = fs::read_to_string(path)?;
        match serde_json::from_str::<SubmissionFile>(&contents)? {
            SubmissionFile::Many(batch) => submissions.extend(batch),
            SubmissionFile::One(single) => submissions.push(*single),
        }
    }

    let stats = FormStats::collect(&templates, &submissions);
    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}
