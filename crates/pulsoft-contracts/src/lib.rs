//! # pulsoft-contracts
//!
//! Shared types, wire shapes, and error contracts for the Pulsoft monitoring
//! core.
//!
//! Every crate in the workspace imports from here. The only logic in this
//! crate is pure derivation: status classification, rounding, and relative
//! timestamps.

pub mod api;
pub mod envelope;
pub mod error;
pub mod metrics;
pub mod note;
pub mod profile;
pub mod remote;
pub mod subscription;
pub mod timestamp;

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};
    use serde_json::json;

    use super::*;
    use api::{ChartData, LinkedPatients, PatientSummary, ProfileStatistics, UserProfile, UserRole};
    use envelope::{ServiceResponse, Source};
    use error::PulsoftError;
    use metrics::{round_one_decimal, MetricReading, MetricStatus, WeeklySeries};
    use note::{AnalysisNote, Category, Severity};
    use profile::{Baselines, PatientProfile, ProfileSet};
    use subscription::SubscriptionId;

    // ── MetricStatus ─────────────────────────────────────────────────────────

    #[test]
    fn status_alert_on_high_cardiovascular_regardless_of_others() {
        assert_eq!(MetricStatus::classify(95.0, 10.0, 36.5), MetricStatus::Alert);
        assert_eq!(MetricStatus::classify(95.0, 60.0, 37.9), MetricStatus::Alert);
    }

    #[test]
    fn status_alert_on_fever() {
        assert_eq!(MetricStatus::classify(70.0, 30.0, 38.1), MetricStatus::Alert);
    }

    #[test]
    fn status_warning_thresholds() {
        assert_eq!(MetricStatus::classify(86.0, 30.0, 36.8), MetricStatus::Warning);
        assert_eq!(MetricStatus::classify(70.0, 50.5, 36.8), MetricStatus::Warning);
        assert_eq!(MetricStatus::classify(70.0, 30.0, 37.6), MetricStatus::Warning);
    }

    #[test]
    fn status_thresholds_are_strict() {
        // Exactly on a threshold does not cross it.
        assert_eq!(MetricStatus::classify(85.0, 50.0, 37.5), MetricStatus::Normal);
        assert_eq!(MetricStatus::classify(90.0, 30.0, 38.0), MetricStatus::Warning);
    }

    #[test]
    fn reading_new_derives_status() {
        let reading = MetricReading::new(91.0, 40.0, 36.9);
        assert_eq!(reading.status, MetricStatus::Alert);
        assert!(reading.patient_info.is_none());
    }

    #[test]
    fn rounding_keeps_one_decimal() {
        assert_eq!(round_one_decimal(78.26), 78.3);
        assert_eq!(round_one_decimal(37.04), 37.0);
        assert_eq!(round_one_decimal(42.0), 42.0);
    }

    // ── Wire decoding ────────────────────────────────────────────────────────

    #[test]
    fn reading_accepts_legacy_field_names() {
        let raw = json!({
            "cardiovascular": 80.0,
            "sudor": 44.5,
            "temperatura": 37.2,
            "lastUpdate": "2026-01-15T14:30:00Z",
            "status": "normal"
        });
        let reading: MetricReading = serde_json::from_value(raw).unwrap();
        assert_eq!(reading.sweat, 44.5);
        assert_eq!(reading.temperature, 37.2);
        assert_eq!(reading.status, MetricStatus::Normal);
    }

    #[test]
    fn linked_patients_accepts_either_list_key() {
        let canonical: LinkedPatients = serde_json::from_value(json!({
            "patients": [{ "uid": "p1", "email": "p1@example.com" }]
        }))
        .unwrap();
        assert_eq!(canonical.total(), 1);
        assert_eq!(canonical.patients[0].user_type, UserRole::Patient);

        let legacy: LinkedPatients = serde_json::from_value(json!({
            "linked_patients": [],
            "total_patients": 4
        }))
        .unwrap();
        assert!(legacy.patients.is_empty());
        assert_eq!(legacy.total(), 4);
    }

    #[test]
    fn linked_patients_without_list_is_rejected() {
        let result: Result<LinkedPatients, _> =
            serde_json::from_value(json!({ "total_patients": 2 }));
        assert!(result.is_err());
    }

    #[test]
    fn chart_data_flattens_series() {
        let raw = json!({
            "cardiovascular": [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0],
            "sudor": [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0],
            "temperatura": [36.0, 36.1, 36.2, 36.3, 36.4, 36.5, 36.6],
            "labels": ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"]
        });
        let chart: ChartData = serde_json::from_value(raw).unwrap();
        assert!(chart.series.is_complete());
        assert!(chart.metrics.is_none());
    }

    #[test]
    fn note_accepts_legacy_field_names() {
        let raw = json!({
            "note_id": "n-1",
            "analisis_IA": "stable",
            "analizadoEn": "2026-01-15T14:30:00Z",
            "patient_email": "p@example.com",
            "severity": "medium",
            "category": "sudor"
        });
        let note: AnalysisNote = serde_json::from_value(raw).unwrap();
        assert_eq!(note.id, "n-1");
        assert_eq!(note.severity, Some(Severity::Medium));
        assert_eq!(note.category, Some(Category::Sweat));
    }

    #[test]
    fn reading_without_status_is_classified() {
        let raw = json!({
            "cardiovascular": 75,
            "sudor": 45,
            "temperatura": 38.4,
            "lastUpdate": "2024-01-15T14:30:00Z"
        });
        let reading: MetricReading = serde_json::from_value(raw).unwrap();
        assert_eq!(reading.status, MetricStatus::Alert);
        assert_eq!(reading.cardiovascular, 75.0);

        let encoded = serde_json::to_value(&reading).unwrap();
        assert_eq!(encoded["status"], "alert");
        assert_eq!(encoded["sweat"], 45.0);
    }

    #[test]
    fn chart_metrics_without_status_decode() {
        let raw = json!({
            "cardiovascular": [70, 71, 72, 73, 74, 75, 76],
            "sudor": [40, 41, 42, 43, 44, 45, 46],
            "temperatura": [36.5, 36.6, 36.7, 36.8, 36.9, 37.0, 37.1],
            "labels": ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"],
            "metrics": { "cardiovascular": 86, "sudor": 45, "temperatura": 37.0 }
        });
        let chart: ChartData = serde_json::from_value(raw).unwrap();
        assert_eq!(chart.metrics.map(|m| m.status), Some(MetricStatus::Warning));
    }

    #[test]
    fn note_accepts_offsetless_timestamp() {
        let raw = json!({
            "note_id": "n-2",
            "analisis_IA": "elevated sweat",
            "analizadoEn": "2024-01-15T14:30:00.250000",
            "patient_email": "p@example.com"
        });
        let note: AnalysisNote = serde_json::from_value(raw).unwrap();
        assert_eq!(
            note.analyzed_at,
            Utc.with_ymd_and_hms(2024, 1, 15, 14, 30, 0).unwrap() + Duration::milliseconds(250)
        );
    }

    #[test]
    fn summary_last_update_accepts_every_shape() {
        let expected = Utc.with_ymd_and_hms(2024, 1, 15, 14, 30, 0).unwrap();
        for stamp in [
            json!("2024-01-15T14:30:00Z"),
            json!("2024-01-15T15:30:00+01:00"),
            json!("2024-01-15T14:30:00"),
            json!("2024-01-15 14:30:00"),
            json!(expected.timestamp_millis()),
        ] {
            let summary: PatientSummary = serde_json::from_value(json!({
                "uid": "p1",
                "email": "p1@example.com",
                "lastUpdate": stamp.clone()
            }))
            .unwrap();
            assert_eq!(summary.last_update, Some(expected), "stamp {}", stamp);
        }

        let missing: PatientSummary =
            serde_json::from_value(json!({ "uid": "p1", "email": "p1@example.com", "last_update": null }))
                .unwrap();
        assert_eq!(missing.last_update, None);
    }

    #[test]
    fn unrecognized_timestamp_is_rejected() {
        let result: Result<AnalysisNote, _> = serde_json::from_value(json!({
            "id": "n-3",
            "body": "text",
            "analyzed_at": "yesterday",
            "patient_email": "p@example.com"
        }));
        assert!(result.is_err());
        assert_eq!(timestamp::from_value(&json!(true)), None);
    }

    #[test]
    fn profile_statistics_picks_role_shape() {
        let caregiver: UserProfile = serde_json::from_value(json!({
            "uid": "c1",
            "email": "c1@example.com",
            "user_type": "caregiver",
            "created_at": 1700000000000i64,
            "statistics": {
                "patients_count": 2,
                "total_notes_access": 8,
                "average_notes_per_patient": 4.0,
                "active_since": null
            }
        }))
        .unwrap();
        assert!(matches!(caregiver.statistics, ProfileStatistics::Caregiver(_)));

        let patient: UserProfile = serde_json::from_value(json!({
            "uid": "p1",
            "email": "p1@example.com",
            "user_type": "patient",
            "created_at": 1700000000000i64,
            "statistics": {
                "total_notes": 3,
                "caregivers_count": 1,
                "notes_by_type": { "general": 3 },
                "last_activity": "2026-01-15"
            }
        }))
        .unwrap();
        assert!(matches!(patient.statistics, ProfileStatistics::Patient(_)));
    }

    // ── AnalysisNote::relative_label ─────────────────────────────────────────

    fn note_at(offset: Duration) -> (AnalysisNote, chrono::DateTime<Utc>) {
        let now = Utc::now();
        let note = AnalysisNote {
            id: "1".to_string(),
            body: String::new(),
            analyzed_at: now - offset,
            patient_email: "p@example.com".to_string(),
            severity: None,
            category: None,
        };
        (note, now)
    }

    #[test]
    fn relative_label_units() {
        let (note, now) = note_at(Duration::hours(2));
        assert_eq!(note.relative_label(now), "2 hours ago");

        let (note, now) = note_at(Duration::hours(24));
        assert_eq!(note.relative_label(now), "1 day ago");

        let (note, now) = note_at(Duration::minutes(1));
        assert_eq!(note.relative_label(now), "1 minute ago");

        let (note, now) = note_at(Duration::seconds(-30));
        assert_eq!(note.relative_label(now), "just now");
    }

    // ── ServiceResponse ──────────────────────────────────────────────────────

    #[test]
    fn envelope_constructors_hold_invariant() {
        let remote = ServiceResponse::remote(1);
        assert!(remote.success && remote.data.is_some() && remote.error.is_none());
        assert_eq!(remote.source, Source::Remote);

        let mock = ServiceResponse::mock(2, "connection refused");
        assert!(mock.success && mock.data.is_some() && mock.error.is_none());
        assert!(mock.is_mock());
        assert_eq!(mock.fallback_reason.as_deref(), Some("connection refused"));

        let failure: ServiceResponse<i32> = ServiceResponse::failure("HTTP 500");
        assert!(!failure.success && failure.data.is_none());
        assert_eq!(failure.into_result(), Err("HTTP 500".to_string()));
    }

    #[test]
    fn envelope_map_keeps_provenance() {
        let mapped = ServiceResponse::mock(vec![1, 2, 3], "offline").map(|v| v.len());
        assert_eq!(mapped.data, Some(3));
        assert!(mapped.is_mock());
        assert_eq!(mapped.fallback_reason.as_deref(), Some("offline"));
    }

    // ── ProfileSet ───────────────────────────────────────────────────────────

    #[test]
    fn profile_set_lookup() {
        let set = ProfileSet::new(vec![PatientProfile {
            id: "7".to_string(),
            email: "seven@example.com".to_string(),
            name: "Seven".to_string(),
            age: 50,
            condition: "General".to_string(),
            baselines: Baselines {
                cardiovascular: 70.0,
                sweat: 40.0,
                temperature: 36.9,
            },
            notes_count: 0,
        }]);

        assert_eq!(set.len(), 1);
        assert_eq!(set.get("7").map(|p| p.age), Some(50));
        assert!(set.get("8").is_none());
        assert!(ProfileSet::default().is_empty());
    }

    #[test]
    fn weekly_series_completeness() {
        let mut series = WeeklySeries {
            cardiovascular: vec![0.0; 7],
            sweat: vec![0.0; 7],
            temperature: vec![0.0; 7],
            labels: WeeklySeries::weekday_labels(),
            patient_info: None,
        };
        assert!(series.is_complete());
        series.sweat.pop();
        assert!(!series.is_complete());
    }

    // ── SubscriptionId ───────────────────────────────────────────────────────

    #[test]
    fn subscription_ids_are_unique() {
        let ids: std::collections::HashSet<SubscriptionId> =
            (0..100).map(|_| SubscriptionId::new()).collect();
        assert_eq!(ids.len(), 100);
    }

    // ── PulsoftError display messages ────────────────────────────────────────

    #[test]
    fn error_http_status_display() {
        let err = PulsoftError::HttpStatus {
            status: 503,
            endpoint: "caregiver-patients/".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("503"));
        assert!(msg.contains("caregiver-patients/"));
    }

    #[test]
    fn error_transport_display() {
        let err = PulsoftError::Transport {
            reason: "connection refused".to_string(),
        };
        assert!(err.to_string().contains("transport error"));
    }

    #[test]
    fn error_config_display() {
        let err = PulsoftError::Config {
            reason: "interval must be positive".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("configuration error"));
        assert!(msg.contains("interval must be positive"));
    }
}
