//! Pulsoft demo CLI
//!
//! Exercises the mock generator directly, or runs the caregiver service
//! against a configured backend and shows where each answer came from.
//!
//! Usage:
//!   cargo run -p demo -- profiles
//!   cargo run -p demo -- metrics --patient 1
//!   cargo run -p demo -- weekly --patient 4
//!   cargo run -p demo -- notes --patient 2
//!   cargo run -p demo -- watch --patient 1 --ticks 3 --interval-ms 1000
//!   cargo run -p demo -- dashboard --caregiver c1 --config config/pulsoft.toml

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use clap::{Parser, Subcommand};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use pulsoft_contracts::{
    envelope::ServiceResponse,
    error::{PulsoftError, PulsoftResult},
    metrics::MetricReading,
};
use pulsoft_mock::MockDataGenerator;
use pulsoft_service::{CaregiverService, ServiceConfig, StaticAuth};

// ── CLI definition ────────────────────────────────────────────────────────────

/// Pulsoft caregiver monitoring core demo.
#[derive(Parser)]
#[command(
    name = "demo",
    about = "Pulsoft monitoring core demo",
    long_about = "Prints mock biometric data for the built-in patient profiles, or runs\n\
                  the caregiver service against a backend with mock fallback."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the built-in patient profiles.
    Profiles,
    /// Print one fresh reading for a patient.
    Metrics {
        #[arg(long)]
        patient: String,
    },
    /// Print a seven-day series for a patient.
    Weekly {
        #[arg(long)]
        patient: String,
    },
    /// Print the analysis notes for a patient.
    Notes {
        #[arg(long)]
        patient: String,
    },
    /// Stream simulated readings for a patient.
    Watch {
        #[arg(long)]
        patient: String,
        /// Stop after this many readings.
        #[arg(long, default_value_t = 3)]
        ticks: usize,
        #[arg(long, default_value_t = 5_000)]
        interval_ms: u64,
    },
    /// Load a caregiver's dashboard through the service layer.
    Dashboard {
        #[arg(long)]
        caregiver: String,
        /// TOML service configuration. Defaults apply when omitted.
        #[arg(long)]
        config: Option<PathBuf>,
        /// Bearer token sent to the backend.
        #[arg(long, default_value = "demo-token")]
        token: String,
    },
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() {
    // Set RUST_LOG=debug for per-request output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();
    let generator = Arc::new(MockDataGenerator::with_defaults());

    let result = match cli.command {
        Command::Profiles => {
            show_profiles(&generator);
            Ok(())
        }
        Command::Metrics { patient } => {
            print_reading(&generator.current_metrics(&patient));
            Ok(())
        }
        Command::Weekly { patient } => {
            show_weekly(&generator, &patient);
            Ok(())
        }
        Command::Notes { patient } => {
            show_notes(&generator, &patient);
            Ok(())
        }
        Command::Watch {
            patient,
            ticks,
            interval_ms,
        } => watch(&generator, &patient, ticks, Duration::from_millis(interval_ms)).await,
        Command::Dashboard {
            caregiver,
            config,
            token,
        } => dashboard(&caregiver, config, &token).await,
    };

    if let Err(e) = result {
        eprintln!("Demo error: {}", e);
        std::process::exit(1);
    }
}

// ── Generator views ───────────────────────────────────────────────────────────

fn show_profiles(generator: &MockDataGenerator) {
    println!(
        "{:<3} {:<18} {:>3}  {:<14} {:>6} {:>6} {:>6}  {:<8} notes",
        "id", "name", "age", "condition", "cardio", "sweat", "temp", "status"
    );
    for p in generator.all_profiles() {
        let b = &p.baselines;
        println!(
            "{:<3} {:<18} {:>3}  {:<14} {:>6.1} {:>6.1} {:>6.1}  {:<8} {}",
            p.id,
            p.name,
            p.age,
            p.condition,
            b.cardiovascular,
            b.sweat,
            b.temperature,
            format!("{:?}", generator.baseline_status(p)),
            p.notes_count
        );
    }
}

fn print_reading(reading: &MetricReading) {
    let who = reading
        .patient_info
        .as_ref()
        .map(|i| format!("{} ({}, {})", i.name, i.age, i.condition))
        .unwrap_or_else(|| "unknown patient".to_string());
    println!(
        "{:<32} cardio {:>5.1}  sweat {:>5.1}  temp {:>4.1}  [{:?}]",
        who, reading.cardiovascular, reading.sweat, reading.temperature, reading.status
    );
}

fn show_weekly(generator: &MockDataGenerator, patient: &str) {
    let series = generator.weekly_series(patient);
    if let Some(info) = &series.patient_info {
        println!("{} ({}, {})", info.name, info.age, info.condition);
    }
    println!("{:<5} {:>6} {:>6} {:>6}", "day", "cardio", "sweat", "temp");
    for (i, label) in series.labels.iter().enumerate() {
        println!(
            "{:<5} {:>6.1} {:>6.1} {:>6.1}",
            label, series.cardiovascular[i], series.sweat[i], series.temperature[i]
        );
    }
}

fn show_notes(generator: &MockDataGenerator, patient: &str) {
    let now = Utc::now();
    for note in generator.notes(patient) {
        let severity = note
            .severity
            .map(|s| format!("{:?}", s))
            .unwrap_or_else(|| "-".to_string());
        println!("[{:<6}] {:<14} {}", severity, note.relative_label(now), note.body);
    }
}

async fn watch(
    generator: &Arc<MockDataGenerator>,
    patient: &str,
    ticks: usize,
    interval: Duration,
) -> PulsoftResult<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let subscription = generator.start_periodic_updates_every(patient, interval, move |reading| {
        let _ = tx.send(reading);
    });

    for _ in 0..ticks {
        let Some(reading) = rx.recv().await else {
            break;
        };
        print_reading(&reading);
    }
    subscription.cancel();
    Ok(())
}

// ── Service dashboard ─────────────────────────────────────────────────────────

async fn dashboard(caregiver: &str, config: Option<PathBuf>, token: &str) -> PulsoftResult<()> {
    let config = match config {
        Some(path) => ServiceConfig::from_file(&path)?,
        None => ServiceConfig::default(),
    };
    let auth = Arc::new(StaticAuth::signed_in(caregiver, None, token));
    let service = CaregiverService::connect(&config, auth)?;

    println!("Backend: {}", config.backend.base_url);
    println!();

    let patients = service.fetch_linked_patients(caregiver).await;
    report("linked patients", &patients);
    let patients = patients
        .into_result()
        .map_err(|reason| PulsoftError::Transport { reason })?;

    for patient in &patients.patients {
        let label = patient.name.as_deref().unwrap_or(patient.email.as_str());
        println!("- {} <{}>", label, patient.email);
    }
    println!();

    let stats = service.caregiver_stats(caregiver).await;
    report("caregiver stats", &stats);
    if let Some(stats) = stats.data() {
        println!("  {} patients, last activity {}", stats.total_patients, stats.last_activity);
    }

    let Some(first) = patients.patients.first() else {
        return Ok(());
    };

    let metrics = service.fetch_current_metrics(&first.uid, caregiver).await;
    report("current metrics", &metrics);
    if let Some(reading) = metrics.data() {
        print_reading(reading);
    }

    let notes = service.fetch_patient_notes(&first.uid, caregiver).await;
    report("patient notes", &notes);

    let chart = service.fetch_chart_data(&first.uid, caregiver).await;
    report("chart data", &chart);

    let search = service.search_patients(caregiver, &first.email).await;
    report("search", &search);

    Ok(())
}

fn report<T>(what: &str, response: &ServiceResponse<T>) {
    match (&response.error, &response.fallback_reason) {
        (Some(error), _) => println!("{:<16} FAILED  {}", what, error),
        (None, Some(reason)) => println!("{:<16} mock    ({})", what, reason),
        (None, None) => println!("{:<16} remote", what),
    }
}
