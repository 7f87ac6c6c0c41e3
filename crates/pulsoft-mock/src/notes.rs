//! Templated analysis notes.
//!
//! Every note interpolates one reading, so all notes in a batch agree with
//! each other. Thresholds used in the wording and in the severity are the
//! same constants, so a note never reads "elevated" while rated low.

use chrono::{DateTime, Duration, Utc};

use pulsoft_contracts::{
    metrics::MetricReading,
    note::{AnalysisNote, Category, Severity},
    profile::PatientProfile,
};

use crate::fixtures::{DIABETES, HYPERTENSION};

/// Cardiovascular rate above which notes call the rate elevated.
pub const CARDIO_ELEVATED: f64 = 80.0;

/// Sweat level above which notes call sweating elevated.
pub const SWEAT_ELEVATED: f64 = 45.0;

/// Temperature above which notes call the temperature elevated.
pub const TEMPERATURE_ELEVATED: f64 = 37.2;

/// Email used on notes generated for an unknown patient.
pub const GENERIC_EMAIL: &str = "patient@example.com";

fn note(
    id: &str,
    body: String,
    now: DateTime<Utc>,
    hours_ago: i64,
    email: &str,
    severity: Severity,
    category: Category,
) -> AnalysisNote {
    AnalysisNote {
        id: id.to_string(),
        body,
        analyzed_at: now - Duration::hours(hours_ago),
        patient_email: email.to_string(),
        severity: Some(severity),
        category: Some(category),
    }
}

fn medium_if(elevated: bool) -> Severity {
    if elevated {
        Severity::Medium
    } else {
        Severity::Low
    }
}

/// Build the note batch for a known profile from one reading.
///
/// Five base notes (cardiovascular, sweat, temperature, general, trends) at
/// 2, 4, 6, 8 and 12 hours before `now`, plus one condition-specific note a
/// day before `now` for hypertension or diabetes.
pub fn profile_notes(
    profile: &PatientProfile,
    reading: &MetricReading,
    now: DateTime<Utc>,
) -> Vec<AnalysisNote> {
    let name = &profile.name;
    let email = &profile.email;
    let cardio = reading.cardiovascular;
    let sweat = reading.sweat;
    let temp = reading.temperature;

    let cardio_high = cardio > CARDIO_ELEVATED;
    let sweat_high = sweat > SWEAT_ELEVATED;
    let temp_high = temp > TEMPERATURE_ELEVATED;
    let healthy = cardio < CARDIO_ELEVATED && sweat < SWEAT_ELEVATED && temp < TEMPERATURE_ELEVATED;

    let mut notes = vec![
        note(
            "1",
            format!(
                "Heart rate analysis for {name}: measured {cardio} bpm, which is {}. \
                 The pattern has been stable over the last 24 hours. Recommendation: {}.",
                if cardio_high { "slightly elevated" } else { "within the normal range" },
                if cardio_high {
                    "monitor more closely and consider a medication review"
                } else {
                    "keep the current routine"
                },
            ),
            now,
            2,
            email,
            medium_if(cardio_high),
            Category::Cardiovascular,
        ),
        note(
            "2",
            format!(
                "Sweat analysis for {name}: GSR reads {sweat} units, indicating {}. \
                 This may be related to {}. Recommendation: {}.",
                if sweat_high { "elevated sweat activity" } else { "normal sweating levels" },
                profile.condition.to_lowercase(),
                if sweat_high {
                    "check hydration and stress levels"
                } else {
                    "keep current habits"
                },
            ),
            now,
            4,
            email,
            medium_if(sweat_high),
            Category::Sweat,
        ),
        note(
            "3",
            format!(
                "Body temperature analysis for {name}: holding at {temp}°C, which is {}. \
                 No signs of fever or hypothermia. The pattern matches the patient's history.",
                if temp_high { "slightly elevated" } else { "within the normal range" },
            ),
            now,
            6,
            email,
            Severity::Low,
            Category::Temperature,
        ),
        note(
            "4",
            format!(
                "General biomarker analysis for {name}: the overall profile is {}. \
                 Values are {}. Continue regular monitoring.",
                if healthy { "healthy" } else { "in need of attention" },
                if healthy { "within expected ranges" } else { "outside the optimal range" },
            ),
            now,
            8,
            email,
            medium_if(cardio_high || sweat_high || temp_high),
            Category::General,
        ),
        note(
            "5",
            format!(
                "Trend review for {name}: cardiovascular values show {} over the past week. \
                 Sweat levels show {}. Body temperature is stable. Suggestion: {}.",
                if cardio_high { "an upward trend" } else { "stability" },
                if sweat_high { "variability" } else { "consistency" },
                if cardio_high {
                    "adjust the treatment plan"
                } else {
                    "keep the current routine"
                },
            ),
            now,
            12,
            email,
            medium_if(cardio_high),
            Category::General,
        ),
    ];

    match profile.condition.as_str() {
        HYPERTENSION => notes.push(note(
            "6",
            format!(
                "Hypertension follow-up for {name}: cardiovascular rate of {cardio} bpm is {}. \
                 Recommendation: {}.",
                if cardio_high {
                    "above the recommended range for hypertensive patients"
                } else {
                    "within the controlled range"
                },
                if cardio_high {
                    "review antihypertensive medication"
                } else {
                    "keep the current treatment"
                },
            ),
            now,
            24,
            email,
            if cardio_high { Severity::High } else { Severity::Low },
            Category::Cardiovascular,
        )),
        DIABETES => notes.push(note(
            "7",
            format!(
                "Diabetes follow-up for {name}: sweat level of {sweat} units may indicate {}. \
                 Recommendation: {}.",
                if sweat_high {
                    "possible glucose fluctuations"
                } else {
                    "stable glycemic control"
                },
                if sweat_high {
                    "monitor blood sugar more closely"
                } else {
                    "continue regular checks"
                },
            ),
            now,
            24,
            email,
            medium_if(sweat_high),
            Category::Sweat,
        )),
        _ => {}
    }

    notes
}

/// The three fixed notes returned for an unknown patient.
pub fn default_notes(now: DateTime<Utc>) -> Vec<AnalysisNote> {
    vec![
        note(
            "1",
            "Heart rate analysis: a slightly elevated heart rate (85 bpm) was detected, which may \
             indicate stress or recent physical activity. Monitor over the next few hours."
                .to_string(),
            now,
            2,
            GENERIC_EMAIL,
            Severity::Medium,
            Category::Cardiovascular,
        ),
        note(
            "2",
            "Sweat analysis: GSR levels are 15% below the weekly average. This may indicate \
             better hydration or reduced stress."
                .to_string(),
            now,
            4,
            GENERIC_EMAIL,
            Severity::Low,
            Category::Sweat,
        ),
        note(
            "3",
            "Temperature analysis: body temperature is stable at 37.1°C, within the normal \
             range. No signs of fever or hypothermia."
                .to_string(),
            now,
            6,
            GENERIC_EMAIL,
            Severity::Low,
            Category::Temperature,
        ),
    ]
}
