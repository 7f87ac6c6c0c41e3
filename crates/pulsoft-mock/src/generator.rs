//! The mock data generator.
//!
//! `MockDataGenerator` derives readings, weekly series, and analysis notes
//! from an injected `ProfileSet` and an injected `RandomSource`. It performs
//! no I/O and never fails: unknown patient ids get fixed, displayable
//! defaults instead of an error.

use std::sync::Arc;

use chrono::Utc;
use tracing::debug;

use pulsoft_contracts::{
    api::PatientSummary,
    metrics::{round_one_decimal, MetricReading, MetricStatus, WeeklySeries},
    note::AnalysisNote,
    profile::{PatientInfo, PatientProfile, ProfileSet},
};
use pulsoft_core::{random::ThreadRandom, traits::RandomSource};

use crate::{fixtures::default_profiles, notes};

/// Full width of the perturbation window for one metric.
///
/// A sample is `baseline + (u - 0.5) * spread`, so it lands within
/// `spread / 2` of the baseline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spreads {
    pub cardiovascular: f64,
    pub sweat: f64,
    pub temperature: f64,
}

/// Spreads for a single current reading.
pub const CURRENT_SPREADS: Spreads = Spreads {
    cardiovascular: 6.0,
    sweat: 4.0,
    temperature: 0.4,
};

/// Spreads for each day of a weekly series.
pub const WEEKLY_SPREADS: Spreads = Spreads {
    cardiovascular: 8.0,
    sweat: 5.0,
    temperature: 0.3,
};

/// Reading returned for an unknown patient.
pub const DEFAULT_READING: (f64, f64, f64) = (75.0, 45.0, 37.0);

/// Series returned for an unknown patient.
pub const DEFAULT_WEEKLY_CARDIOVASCULAR: [f64; 7] = [65.0, 70.0, 75.0, 80.0, 85.0, 82.0, 78.0];
pub const DEFAULT_WEEKLY_SWEAT: [f64; 7] = [40.0, 45.0, 50.0, 48.0, 42.0, 45.0, 43.0];
pub const DEFAULT_WEEKLY_TEMPERATURE: [f64; 7] = [36.8, 37.0, 37.2, 37.1, 36.9, 37.0, 37.1];

/// Synthesizes plausible biometric data for the profiles it was built with.
///
/// Cheap to share: wrap it in an `Arc` and hand clones to every consumer.
pub struct MockDataGenerator {
    profiles: ProfileSet,
    rng: Arc<dyn RandomSource>,
}

impl MockDataGenerator {
    /// Build a generator over `profiles`, drawing perturbations from `rng`.
    pub fn new(profiles: ProfileSet, rng: Arc<dyn RandomSource>) -> Self {
        Self { profiles, rng }
    }

    /// The built-in fixture profiles with an unseeded thread RNG.
    pub fn with_defaults() -> Self {
        Self::new(default_profiles(), Arc::new(ThreadRandom))
    }

    // ── Profiles ─────────────────────────────────────────────────────────────

    /// Every seed profile, in declaration order.
    pub fn all_profiles(&self) -> &[PatientProfile] {
        self.profiles.all()
    }

    /// The seed profile with the given id, or `None`.
    pub fn profile(&self, id: &str) -> Option<&PatientProfile> {
        self.profiles.get(id)
    }

    // ── Readings ─────────────────────────────────────────────────────────────

    fn perturb(&self, baseline: f64, spread: f64) -> f64 {
        round_one_decimal(baseline + (self.rng.next_unit() - 0.5) * spread)
    }

    /// A fresh reading for patient `id`.
    ///
    /// Unknown ids always get `75 / 45 / 37.0`, status normal, no patient
    /// info. Known ids get each metric perturbed around its baseline by at
    /// most half of `CURRENT_SPREADS`, rounded to one decimal.
    pub fn current_metrics(&self, id: &str) -> MetricReading {
        let Some(profile) = self.profiles.get(id) else {
            let (cardiovascular, sweat, temperature) = DEFAULT_READING;
            return MetricReading::new(cardiovascular, sweat, temperature);
        };

        let b = &profile.baselines;
        let reading = MetricReading::new(
            self.perturb(b.cardiovascular, CURRENT_SPREADS.cardiovascular),
            self.perturb(b.sweat, CURRENT_SPREADS.sweat),
            self.perturb(b.temperature, CURRENT_SPREADS.temperature),
        )
        .with_patient_info(PatientInfo::from(profile));

        debug!(
            patient_id = %id,
            cardiovascular = reading.cardiovascular,
            sweat = reading.sweat,
            temperature = reading.temperature,
            status = ?reading.status,
            "generated mock reading"
        );

        reading
    }

    /// Seven daily samples per metric for patient `id`, oldest first.
    ///
    /// Unknown ids get the fixed `DEFAULT_WEEKLY_*` series.
    pub fn weekly_series(&self, id: &str) -> WeeklySeries {
        let Some(profile) = self.profiles.get(id) else {
            return WeeklySeries {
                cardiovascular: DEFAULT_WEEKLY_CARDIOVASCULAR.to_vec(),
                sweat: DEFAULT_WEEKLY_SWEAT.to_vec(),
                temperature: DEFAULT_WEEKLY_TEMPERATURE.to_vec(),
                labels: WeeklySeries::weekday_labels(),
                patient_info: Some(PatientInfo {
                    name: "Patient".to_string(),
                    age: 70,
                    condition: "General".to_string(),
                }),
            };
        };

        let b = &profile.baselines;
        let week = |baseline: f64, spread: f64| -> Vec<f64> {
            (0..WeeklySeries::DAYS)
                .map(|_| self.perturb(baseline, spread))
                .collect()
        };

        WeeklySeries {
            cardiovascular: week(b.cardiovascular, WEEKLY_SPREADS.cardiovascular),
            sweat: week(b.sweat, WEEKLY_SPREADS.sweat),
            temperature: week(b.temperature, WEEKLY_SPREADS.temperature),
            labels: WeeklySeries::weekday_labels(),
            patient_info: Some(PatientInfo::from(profile)),
        }
    }

    // ── Notes ────────────────────────────────────────────────────────────────

    /// Analysis notes for patient `id`.
    ///
    /// Draws one fresh reading and templates every note from it. Known ids
    /// get five base notes plus one for "Hypertension" or "Diabetes"; unknown
    /// ids get three generic notes.
    pub fn notes(&self, id: &str) -> Vec<AnalysisNote> {
        let now = Utc::now();
        match self.profiles.get(id) {
            Some(profile) => {
                let reading = self.current_metrics(id);
                notes::profile_notes(profile, &reading, now)
            }
            None => notes::default_notes(now),
        }
    }

    // ── Summaries ────────────────────────────────────────────────────────────

    /// One dashboard row for `profile`, carrying a fresh reading.
    pub fn patient_summary(&self, profile: &PatientProfile) -> PatientSummary {
        let reading = self.current_metrics(&profile.id);
        PatientSummary {
            cardiovascular: Some(reading.cardiovascular),
            sweat: Some(reading.sweat),
            temperature: Some(reading.temperature),
            last_update: Some(reading.last_update),
            notes_count: Some(profile.notes_count),
            name: Some(profile.name.clone()),
            age: Some(profile.age),
            condition: Some(profile.condition.clone()),
            ..PatientSummary::bare(profile.id.clone(), profile.email.clone())
        }
    }

    /// Dashboard rows for every profile.
    pub fn patient_summaries(&self) -> Vec<PatientSummary> {
        self.profiles
            .all()
            .iter()
            .map(|p| self.patient_summary(p))
            .collect()
    }

    /// Profiles whose email or name contains `query`, case-insensitively.
    ///
    /// A blank query matches nothing.
    pub fn search(&self, query: &str) -> Vec<PatientSummary> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        self.profiles
            .all()
            .iter()
            .filter(|p| {
                p.email.to_lowercase().contains(&needle) || p.name.to_lowercase().contains(&needle)
            })
            .map(|p| PatientSummary::bare(p.id.clone(), p.email.clone()))
            .collect()
    }

    /// Status a reading of `profile`'s exact baselines would get.
    pub fn baseline_status(&self, profile: &PatientProfile) -> MetricStatus {
        let b = &profile.baselines;
        MetricStatus::classify(b.cardiovascular, b.sweat, b.temperature)
    }
}

impl std::fmt::Debug for MockDataGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockDataGenerator")
            .field("profiles", &self.profiles.len())
            .finish_non_exhaustive()
    }
}
