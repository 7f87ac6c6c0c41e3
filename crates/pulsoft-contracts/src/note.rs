//! Analysis notes attached to a patient.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How urgently a caregiver should look at a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// Which biomarker a note is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Cardiovascular,
    #[serde(alias = "sudor")]
    Sweat,
    #[serde(alias = "temperatura")]
    Temperature,
    General,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Cardiovascular => "cardiovascular",
            Category::Sweat => "sweat",
            Category::Temperature => "temperature",
            Category::General => "general",
        }
    }
}

/// A textual analysis of a patient's readings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisNote {
    #[serde(alias = "note_id")]
    pub id: String,
    #[serde(alias = "analisis_IA")]
    pub body: String,
    #[serde(alias = "analizadoEn", deserialize_with = "crate::timestamp::deserialize")]
    pub analyzed_at: DateTime<Utc>,
    pub patient_email: String,
    #[serde(default)]
    pub severity: Option<Severity>,
    #[serde(default)]
    pub category: Option<Category>,
}

impl AnalysisNote {
    /// Describe how long before `now` the note was produced, e.g.
    /// "2 hours ago" or "1 day ago".
    ///
    /// Notes stamped in the future relative to `now` read as "just now".
    pub fn relative_label(&self, now: DateTime<Utc>) -> String {
        let elapsed = now.signed_duration_since(self.analyzed_at);
        let minutes = elapsed.num_minutes();
        if minutes < 1 {
            return "just now".to_string();
        }
        let (amount, unit) = if minutes < 60 {
            (minutes, "minute")
        } else if elapsed.num_hours() < 24 {
            (elapsed.num_hours(), "hour")
        } else {
            (elapsed.num_days(), "day")
        };
        if amount == 1 {
            format!("1 {unit} ago")
        } else {
            format!("{amount} {unit}s ago")
        }
    }
}
