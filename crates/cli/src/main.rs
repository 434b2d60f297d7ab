use std::io::Read;
use std::path::PathBuf;

use anyhow::{bail, Context};
use api_client::ApiClient;
use arogith_core::config::{api_base_url_from_env_value, request_timeout_from_env_value};
use arogith_core::dashboard::{self, DashboardTab};
use arogith_core::{
    summary, AuthService, ClientConfig, DraftAction, DraftField, FormMode, IntakeError, Nurse,
    PatientDraft, PatientRecord, RegistrationService, VisitRecord,
};
use chrono::{Datelike, Local};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use serde_json::{json, Value};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "arogith")]
#[command(about = "Arogith clinic patient intake CLI")]
struct Cli {
    /// Backend base URL (overrides AROGITH_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode an Aadhaar QR payload
    DecodeQr {
        /// File containing the scanned text (stdin if omitted)
        file: Option<PathBuf>,
    },
    /// Reconcile raw backend JSON into canonical records
    Normalise {
        #[arg(long, value_enum, default_value_t = RecordKind::Patient)]
        kind: RecordKind,
        /// JSON file holding one record or an array (stdin if omitted)
        file: Option<PathBuf>,
    },
    /// Check a national ID against the backend
    Check {
        national_id: String,
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long, default_value = "")]
        surname: String,
    },
    /// Log a nurse in
    Login {
        nurse_id: String,
        #[arg(long)]
        password: String,
    },
    /// Log a nurse out
    Logout { nurse_id: String },
    /// List patients for a dashboard tab
    List {
        /// today, yesterday, all or consulted
        #[arg(long, default_value = "all")]
        tab: DashboardTab,
        /// Search text
        #[arg(long, default_value = "")]
        query: String,
    },
    /// Show the visit summary for a patient
    Show { patient_id: String },
    /// Register a patient visit, or update one with --edit
    Register {
        /// Draft JSON file (stdin if omitted)
        draft: Option<PathBuf>,
        /// Apply a scanned QR payload from this file before submitting
        #[arg(long)]
        scan: Option<PathBuf>,
        /// Update this stored patient and their latest visit instead
        #[arg(long)]
        edit: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum RecordKind {
    Patient,
    Visit,
}

/// Entry point for the Arogith CLI
///
/// # Environment Variables
/// - `AROGITH_API_URL`: backend base URL (default: "http://localhost:8084/api")
/// - `AROGITH_HTTP_TIMEOUT_SECS`: per-request timeout in seconds (default: 30)
/// - `RUST_LOG`: log filter; `arogith=info` is always added
///
/// Logs go to stderr; command output is JSON on stdout.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("arogith=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::DecodeQr { file } => {
            let payload = read_input(file.as_ref())?;
            let identity = aadhaar::try_decode(&payload).context("not an Aadhaar QR payload")?;
            print_json(&identity)
        }
        Commands::Normalise { kind, file } => {
            let raw: Value = serde_json::from_str(&read_input(file.as_ref())?)
                .context("input is not valid JSON")?;
            print_json(&normalise(kind, &raw)?)
        }
        Commands::Check {
            national_id,
            name,
            surname,
        } => {
            let service = RegistrationService::new(backend(cli.api_url)?);
            let draft = PatientDraft::default()
                .apply(DraftAction::Edit(DraftField::NationalId, national_id))
                .apply(DraftAction::Edit(DraftField::Name, name))
                .apply(DraftAction::Edit(DraftField::Surname, surname));

            let Some(verification) = service.verify(&draft).await? else {
                bail!("national ID must be 12 digits");
            };
            print_json(&json!({
                "match": verification.result,
                "existingPatientId": verification.existing_patient_id(),
                "draft": verification.draft,
            }))
        }
        Commands::Login { nurse_id, password } => {
            let auth = AuthService::new(backend(cli.api_url)?);
            match auth.login(&nurse_id, &password).await? {
                Some(nurse) => print_json(&nurse),
                None => print_json(&json!({ "nurseId": nurse_id, "loggedIn": true })),
            }
        }
        Commands::Logout { nurse_id } => {
            let auth = AuthService::new(backend(cli.api_url)?);
            let nurse = Nurse {
                nurse_id,
                name: String::new(),
                email: None,
                role: None,
                status: None,
            };
            auth.logout(&nurse).await;
            Ok(())
        }
        Commands::List { tab, query } => {
            let client = backend(cli.api_url)?;
            let summaries = dashboard::load(&client).await?;
            let shown = dashboard::filter(&summaries, tab, &query, Local::now().date_naive());
            print_json(&json!({
                "label": dashboard::count_label(tab, shown.len()),
                "patients": shown,
            }))
        }
        Commands::Show { patient_id } => {
            let client = backend(cli.api_url)?;
            let summary = summary::load(&client, &patient_id, Local::now().naive_local()).await?;
            print_json(&summary)
        }
        Commands::Register { draft, scan, edit } => {
            let service = RegistrationService::new(backend(cli.api_url)?);
            register(&service, draft, scan, edit).await
        }
    }
}

async fn register(
    service: &RegistrationService<ApiClient>,
    draft: Option<PathBuf>,
    scan: Option<PathBuf>,
    edit: Option<String>,
) -> anyhow::Result<()> {
    let mut draft: PatientDraft = serde_json::from_str(&read_input(draft.as_ref())?)
        .context("draft is not valid JSON")?;

    if let Some(scan) = scan {
        let payload = std::fs::read_to_string(&scan)
            .with_context(|| format!("failed to read {}", scan.display()))?;
        let identity = aadhaar::try_decode(&payload).context("scan is not an Aadhaar QR payload")?;
        draft = draft.apply(DraftAction::ApplyScan {
            identity,
            current_year: Local::now().year(),
        });
    }

    let mode = match edit {
        Some(patient_id) => FormMode::Edit { patient_id },
        None => FormMode::Register,
    };

    let prior = if mode.is_edit() {
        None
    } else {
        service.verify(&draft).await?
    };
    if let Some(verification) = &prior {
        draft = verification.draft.clone();
    }

    match service.submit(&draft, &mode, prior.as_ref()).await {
        Ok(outcome) => print_json(&outcome),
        Err(IntakeError::ValidationFailure(errors)) => {
            for (field, message) in errors.iter() {
                eprintln!("  {field}: {message}");
            }
            bail!("{} field(s) need attention", errors.len())
        }
        Err(err) if err.is_blocking() => bail!("{err}; correct the draft and submit again"),
        Err(err) => Err(err.into()),
    }
}

fn backend(api_url: Option<String>) -> anyhow::Result<ApiClient> {
    let url = api_base_url_from_env_value(api_url.or_else(|| std::env::var("AROGITH_API_URL").ok()));
    let timeout =
        request_timeout_from_env_value(std::env::var("AROGITH_HTTP_TIMEOUT_SECS").ok())?;
    let config = ClientConfig::new(url, timeout)?;
    tracing::debug!(api = config.api_base_url(), "backend configured");
    Ok(ApiClient::new(config)?)
}

fn normalise(kind: RecordKind, raw: &Value) -> anyhow::Result<Value> {
    let one = |item: &Value| -> anyhow::Result<Value> {
        Ok(match kind {
            RecordKind::Patient => serde_json::to_value(PatientRecord::from_json(item))?,
            RecordKind::Visit => serde_json::to_value(VisitRecord::from_json(item))?,
        })
    };
    match raw {
        Value::Array(items) => Ok(Value::Array(
            items.iter().map(one).collect::<anyhow::Result<_>>()?,
        )),
        item => one(item),
    }
}

fn read_input(path: Option<&PathBuf>) -> anyhow::Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        None => {
            let mut input = String::new();
            std::io::stdin()
                .read_to_string(&mut input)
                .context("failed to read stdin")?;
            Ok(input)
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
