//! Dashboard reads served straight from the real-time database.
//!
//! Layout:
//!
//! ```text
//! caregivers/{caregiver_uid}/linkedPatients/{patient_uid} = true | "<linked at>" | { linkedAt }
//! patients/{patient_uid} = { email, cardiovascular, sweat, temperature, last_update, ... }
//! ```
//!
//! Patient nodes written by older clients use `sudor`, `temperatura` and
//! `lastUpdate`; both spellings are read.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use pulsoft_contracts::{
    api::{LinkedPatients, PatientSummary},
    envelope::{ServiceResponse, Source},
    error::{PulsoftError, PulsoftResult},
    metrics::MetricReading,
    profile::PatientInfo,
    remote::Snapshot,
    timestamp,
};
use pulsoft_core::traits::{ObserverHandle, RealtimeDatabase};
use pulsoft_mock::UpdateSubscription;

use crate::service::CaregiverService;

pub fn linked_patients_path(caregiver_uid: &str) -> String {
    format!("caregivers/{}/linkedPatients", caregiver_uid)
}

pub fn patient_path(patient_uid: &str) -> String {
    format!("patients/{}", patient_uid)
}

// ── Node decoding ─────────────────────────────────────────────────────────────

fn number(node: &Map<String, Value>, keys: &[&str]) -> Option<f64> {
    keys.iter().find_map(|k| node.get(*k).and_then(Value::as_f64))
}

fn text(node: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|k| node.get(*k).and_then(Value::as_str))
        .map(str::to_string)
}

fn updated_at(node: &Map<String, Value>) -> Option<DateTime<Utc>> {
    ["last_update", "lastUpdate"]
        .iter()
        .find_map(|k| node.get(*k))
        .and_then(timestamp::from_value)
}

fn cardiovascular(node: &Map<String, Value>) -> Option<f64> {
    number(node, &["cardiovascular"])
}

fn sweat(node: &Map<String, Value>) -> Option<f64> {
    number(node, &["sweat", "sudor"])
}

fn temperature(node: &Map<String, Value>) -> Option<f64> {
    number(node, &["temperature", "temperatura"])
}

/// When the link was made, if the link value records it.
fn linked_at(link: &Value) -> Option<String> {
    match link {
        Value::String(s) => Some(s.clone()),
        Value::Object(map) => text(map, &["linkedAt", "linked_at"]),
        _ => None,
    }
}

/// Build a dashboard row from a patient node.
///
/// Missing metrics read as 0; a missing email becomes
/// `patient-{uid}@example.com`.
pub fn summary_from_node(patient_uid: &str, node: Option<&Value>, link: &Value) -> PatientSummary {
    let empty = Map::new();
    let node = node.and_then(Value::as_object).unwrap_or(&empty);

    PatientSummary {
        cardiovascular: Some(cardiovascular(node).unwrap_or(0.0)),
        sweat: Some(sweat(node).unwrap_or(0.0)),
        temperature: Some(temperature(node).unwrap_or(0.0)),
        last_update: updated_at(node),
        notes_count: number(node, &["notes_count", "notesCount"]).map(|n| n as u32),
        name: text(node, &["name"]),
        age: number(node, &["age"]).map(|n| n as u32),
        condition: text(node, &["condition"]),
        linked_at: linked_at(link),
        ..PatientSummary::bare(
            patient_uid,
            text(node, &["email"]).unwrap_or_else(|| format!("patient-{}@example.com", patient_uid)),
        )
    }
}

/// Convert a patient snapshot into a reading.
///
/// Returns `None` when the node is absent or carries none of the three
/// metrics. Missing metrics among present ones read as 0.
pub fn reading_from_snapshot(snapshot: &Snapshot) -> Option<MetricReading> {
    let node = snapshot.val()?.as_object()?;
    let (c, s, t) = (cardiovascular(node), sweat(node), temperature(node));
    if c.is_none() && s.is_none() && t.is_none() {
        return None;
    }

    let mut reading = MetricReading::new(c.unwrap_or(0.0), s.unwrap_or(0.0), t.unwrap_or(0.0));
    if let Some(at) = updated_at(node) {
        reading.last_update = at;
    }
    if let (Some(name), Some(age), Some(condition)) = (
        text(node, &["name"]),
        number(node, &["age"]),
        text(node, &["condition"]),
    ) {
        reading = reading.with_patient_info(PatientInfo {
            name,
            age: age as u32,
            condition,
        });
    }
    Some(reading)
}

// ── Watch handle ──────────────────────────────────────────────────────────────

/// A live metrics feed for one patient.
///
/// Dropping it stops the feed, whichever kind it is.
#[derive(Debug)]
#[must_use = "dropping the watch stops the feed immediately"]
pub enum MetricsWatch {
    /// Snapshots from the real-time database.
    Database(ObserverHandle),
    /// Readings from the periodic-update simulator.
    Simulated(UpdateSubscription),
}

impl MetricsWatch {
    /// `Remote` for a database feed, `Mock` for the simulator.
    pub fn source(&self) -> Source {
        match self {
            MetricsWatch::Database(_) => Source::Remote,
            MetricsWatch::Simulated(_) => Source::Mock,
        }
    }

    pub fn cancel(self) {
        match self {
            MetricsWatch::Database(handle) => handle.cancel(),
            MetricsWatch::Simulated(subscription) => subscription.cancel(),
        }
    }
}

// ── Service operations ────────────────────────────────────────────────────────

impl CaregiverService {
    /// Linked patients read from the real-time database.
    ///
    /// A caregiver with no link node gets an empty remote list. No configured
    /// database, or any database error, falls back like a REST failure.
    pub async fn load_linked_patients_from_database(
        &self,
        caregiver_uid: &str,
    ) -> ServiceResponse<LinkedPatients> {
        let mock = || LinkedPatients::new(self.generator.patient_summaries());
        let Some(database) = &self.database else {
            return self.fall_back(
                "load_linked_patients_from_database",
                "no real-time database configured".to_string(),
                mock,
            );
        };

        let outcome = read_linked_patients(database.as_ref(), caregiver_uid).await;
        self.resolve("load_linked_patients_from_database", outcome, mock)
    }

    /// Follow one patient's metrics as they change.
    ///
    /// With a database attached this observes `patients/{uid}` and calls
    /// `callback` with the current reading and after every change. Without
    /// one it falls back to the periodic-update simulator at the configured
    /// interval, which must run inside a tokio runtime.
    pub fn watch_patient_metrics<F>(&self, patient_uid: &str, callback: F) -> MetricsWatch
    where
        F: Fn(MetricReading) + Send + Sync + 'static,
    {
        let Some(database) = &self.database else {
            warn!(
                patient_uid = %patient_uid,
                "no real-time database configured; simulating metrics"
            );
            return MetricsWatch::Simulated(self.generator.start_periodic_updates_every(
                patient_uid,
                self.update_interval,
                callback,
            ));
        };

        let path = patient_path(patient_uid);
        let watched = patient_uid.to_string();
        let failed = patient_uid.to_string();
        let handle = database.observe(
            &path,
            Box::new(move |snapshot: Snapshot| match reading_from_snapshot(&snapshot) {
                Some(reading) => callback(reading),
                None => debug!(patient_uid = %watched, "patient node has no metrics"),
            }),
            Box::new(move |err: PulsoftError| {
                warn!(patient_uid = %failed, error = %err, "metrics watch failed");
            }),
        );
        info!(patient_uid = %patient_uid, path = %path, "watching patient metrics");
        MetricsWatch::Database(handle)
    }
}

async fn read_linked_patients(
    database: &dyn RealtimeDatabase,
    caregiver_uid: &str,
) -> PulsoftResult<LinkedPatients> {
    let links_path = linked_patients_path(caregiver_uid);
    let links = database.read_once(&links_path).await?;

    let links = match links.value {
        None => {
            debug!(caregiver_uid = %caregiver_uid, "caregiver has no linked patients");
            return Ok(LinkedPatients::new(Vec::new()));
        }
        Some(Value::Object(map)) => map,
        Some(other) => {
            return Err(PulsoftError::MalformedPayload {
                reason: format!("'{}' holds {} instead of an object", links_path, kind_of(&other)),
            })
        }
    };

    let mut patients = Vec::with_capacity(links.len());
    for (patient_uid, link) in &links {
        let node = database.read_once(&patient_path(patient_uid)).await?;
        patients.push(summary_from_node(patient_uid, node.val(), link));
    }
    Ok(LinkedPatients::new(patients))
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
