//! Biometric readings, weekly series, and status classification.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::profile::PatientInfo;

/// Fixed x-axis labels for a weekly series, oldest day first.
pub const WEEKDAY_LABELS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// Round to one decimal place, half away from zero.
pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Coarse health status derived from a single reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricStatus {
    Normal,
    Warning,
    Alert,
}

impl MetricStatus {
    /// Classify a reading.
    ///
    /// Alert thresholds are checked first so a reading that crosses both an
    /// alert and a warning threshold is reported as `Alert`:
    ///
    /// - `Alert`: cardiovascular > 90 or temperature > 38
    /// - `Warning`: cardiovascular > 85, sweat > 50, or temperature > 37.5
    /// - `Normal`: everything else
    pub fn classify(cardiovascular: f64, sweat: f64, temperature: f64) -> Self {
        if cardiovascular > 90.0 || temperature > 38.0 {
            MetricStatus::Alert
        } else if cardiovascular > 85.0 || sweat > 50.0 || temperature > 37.5 {
            MetricStatus::Warning
        } else {
            MetricStatus::Normal
        }
    }
}

/// One point-in-time biometric reading.
///
/// Decoding accepts readings without a `status`; it is classified from the
/// three values in that case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "WireReading")]
pub struct MetricReading {
    pub cardiovascular: f64,
    pub sweat: f64,
    pub temperature: f64,
    pub last_update: DateTime<Utc>,
    pub status: MetricStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_info: Option<PatientInfo>,
}

/// A reading as backends send it.
#[derive(Deserialize)]
struct WireReading {
    cardiovascular: f64,
    #[serde(alias = "sudor")]
    sweat: f64,
    #[serde(alias = "temperatura")]
    temperature: f64,
    #[serde(
        alias = "lastUpdate",
        default = "Utc::now",
        deserialize_with = "crate::timestamp::deserialize"
    )]
    last_update: DateTime<Utc>,
    #[serde(default)]
    status: Option<MetricStatus>,
    #[serde(default, alias = "patientInfo")]
    patient_info: Option<PatientInfo>,
}

impl From<WireReading> for MetricReading {
    fn from(wire: WireReading) -> Self {
        let status = wire.status.unwrap_or_else(|| {
            MetricStatus::classify(wire.cardiovascular, wire.sweat, wire.temperature)
        });
        Self {
            cardiovascular: wire.cardiovascular,
            sweat: wire.sweat,
            temperature: wire.temperature,
            last_update: wire.last_update,
            status,
            patient_info: wire.patient_info,
        }
    }
}

impl MetricReading {
    /// Build a reading stamped now, deriving `status` from the three values.
    pub fn new(cardiovascular: f64, sweat: f64, temperature: f64) -> Self {
        Self {
            cardiovascular,
            sweat,
            temperature,
            last_update: Utc::now(),
            status: MetricStatus::classify(cardiovascular, sweat, temperature),
            patient_info: None,
        }
    }

    /// Attach display details for the owning patient.
    pub fn with_patient_info(mut self, info: PatientInfo) -> Self {
        self.patient_info = Some(info);
        self
    }
}

/// Seven daily samples per metric, oldest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklySeries {
    pub cardiovascular: Vec<f64>,
    #[serde(alias = "sudor")]
    pub sweat: Vec<f64>,
    #[serde(alias = "temperatura")]
    pub temperature: Vec<f64>,
    pub labels: Vec<String>,
    #[serde(default, alias = "patientInfo", skip_serializing_if = "Option::is_none")]
    pub patient_info: Option<PatientInfo>,
}

impl WeeklySeries {
    /// Number of samples in every metric vector of a well-formed series.
    pub const DAYS: usize = 7;

    /// Return the fixed weekday labels as owned strings.
    pub fn weekday_labels() -> Vec<String> {
        WEEKDAY_LABELS.iter().map(|s| s.to_string()).collect()
    }

    /// True when every metric vector and the label vector hold exactly
    /// `DAYS` entries.
    pub fn is_complete(&self) -> bool {
        self.cardiovascular.len() == Self::DAYS
            && self.sweat.len() == Self::DAYS
            && self.temperature.len() == Self::DAYS
            && self.labels.len() == Self::DAYS
    }
}
