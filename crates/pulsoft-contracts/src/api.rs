//! JSON shapes exchanged with the REST backend.
//!
//! The backend is not part of this workspace; these types describe what the
//! service layer sends and what it expects back. Field aliases accept the
//! backend's legacy key names (`sudor`, `temperatura`, `lastUpdate`,
//! `linked_patients`) alongside the canonical ones.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    envelope::Source,
    metrics::{MetricReading, WeeklySeries},
    note::AnalysisNote,
};

// ── Users ─────────────────────────────────────────────────────────────────────

/// Which side of the caregiver/patient relationship an account is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Patient,
    Caregiver,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Patient => "patient",
            UserRole::Caregiver => "caregiver",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_user_type() -> UserRole {
    UserRole::Patient
}

// ── Patients ──────────────────────────────────────────────────────────────────

/// A patient as listed on a caregiver's dashboard.
///
/// Only `uid` and `email` are guaranteed; search results carry nothing else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientSummary {
    pub uid: String,
    pub email: String,
    #[serde(default = "default_user_type")]
    pub user_type: UserRole,
    #[serde(default)]
    pub cardiovascular: Option<f64>,
    #[serde(default, alias = "sudor")]
    pub sweat: Option<f64>,
    #[serde(default, alias = "temperatura")]
    pub temperature: Option<f64>,
    #[serde(
        default,
        alias = "lastUpdate",
        deserialize_with = "crate::timestamp::option::deserialize"
    )]
    pub last_update: Option<DateTime<Utc>>,
    #[serde(default, alias = "notesCount")]
    pub notes_count: Option<u32>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub condition: Option<String>,
    #[serde(default)]
    pub linked_at: Option<String>,
}

impl PatientSummary {
    /// A summary carrying only identity fields.
    pub fn bare(uid: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            email: email.into(),
            user_type: UserRole::Patient,
            cardiovascular: None,
            sweat: None,
            temperature: None,
            last_update: None,
            notes_count: None,
            name: None,
            age: None,
            condition: None,
            linked_at: None,
        }
    }
}

/// Body of `GET caregiver-patients/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkedPatients {
    #[serde(alias = "linked_patients")]
    pub patients: Vec<PatientSummary>,
    #[serde(default)]
    pub total_patients: Option<usize>,
}

impl LinkedPatients {
    pub fn new(patients: Vec<PatientSummary>) -> Self {
        let total = patients.len();
        Self {
            patients,
            total_patients: Some(total),
        }
    }

    /// The backend's reported total, or the list length when absent.
    pub fn total(&self) -> usize {
        self.total_patients.unwrap_or(self.patients.len())
    }
}

/// Body of `GET search-patients/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientSearchResults {
    pub patients: Vec<PatientSummary>,
}

/// Body of `GET patient-notes/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientNotes {
    pub notes: Vec<AnalysisNote>,
    pub patient_email: String,
    #[serde(default)]
    pub total_notes: usize,
}

/// Body of `GET patient-chart-data/`: a weekly series plus the latest reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    #[serde(flatten)]
    pub series: WeeklySeries,
    #[serde(default)]
    pub metrics: Option<MetricReading>,
}

// ── Linking ───────────────────────────────────────────────────────────────────

/// JSON body of `POST link-patient/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRequest {
    pub caregiver_uid: String,
    pub patient_uid: String,
}

/// Generic success/error body returned by mutating endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Acknowledgement {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl Acknowledgement {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            error: None,
        }
    }
}

// ── Profiles ──────────────────────────────────────────────────────────────────

/// Activity statistics for a patient account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientStatistics {
    pub total_notes: u32,
    pub caregivers_count: u32,
    #[serde(default)]
    pub notes_by_type: HashMap<String, u32>,
    pub last_activity: String,
}

/// Activity statistics for a caregiver account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaregiverStatistics {
    pub patients_count: u32,
    pub total_notes_access: u32,
    pub average_notes_per_patient: f64,
    #[serde(default)]
    pub active_since: Option<String>,
}

/// Role-specific statistics; the backend sends one shape or the other.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProfileStatistics {
    Patient(PatientStatistics),
    Caregiver(CaregiverStatistics),
}

/// An account profile as returned by `GET user-profile/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub uid: String,
    pub email: String,
    pub user_type: UserRole,
    /// Milliseconds since the Unix epoch.
    pub created_at: i64,
    pub statistics: ProfileStatistics,
}

/// JSON body of `PUT user-profile/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub user_uid: String,
    pub user_type: UserRole,
    pub email: String,
}

// ── Derived ───────────────────────────────────────────────────────────────────

/// Dashboard counters computed from a caregiver's linked-patient list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaregiverStats {
    pub total_patients: usize,
    pub linked_patients: usize,
    pub last_activity: DateTime<Utc>,
    pub source: Source,
}
