//! # pulsoft-mock
//!
//! Mock biometric data for the Pulsoft monitoring core.
//!
//! Whenever the REST backend is unavailable the service layer asks this
//! crate for something displayable instead:
//!
//! 1. **Readings**: one point-in-time cardiovascular / sweat / temperature
//!    triple with a derived status.
//! 2. **Weekly series**: seven daily samples per metric.
//! 3. **Analysis notes**: templated narrative over a fresh reading.
//! 4. **Periodic updates**: a cancellable tokio task that streams readings.
//!
//! All data is synthetic. Profiles and randomness are injected, so tests can
//! pin every output exactly.

pub mod fixtures;
pub mod generator;
pub mod notes;
pub mod updates;

pub use fixtures::default_profiles;
pub use generator::MockDataGenerator;
pub use updates::{UpdateSubscription, DEFAULT_UPDATE_INTERVAL};

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use pulsoft_contracts::{
        metrics::{MetricReading, MetricStatus, WEEKDAY_LABELS},
        note::{Category, Severity},
        profile::{Baselines, PatientProfile, ProfileSet},
    };
    use pulsoft_core::random::{SequenceRandom, ThreadRandom};

    use super::*;

    const EPS: f64 = 1e-9;

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn generator_with(rng: SequenceRandom) -> MockDataGenerator {
        MockDataGenerator::new(default_profiles(), Arc::new(rng))
    }

    fn single_profile(condition: &str, cardio: f64, sweat: f64, temp: f64) -> MockDataGenerator {
        let profiles = ProfileSet::new(vec![PatientProfile {
            id: "x".to_string(),
            email: "x@example.com".to_string(),
            name: "Test Patient".to_string(),
            age: 60,
            condition: condition.to_string(),
            baselines: Baselines {
                cardiovascular: cardio,
                sweat,
                temperature: temp,
            },
            notes_count: 0,
        }]);
        MockDataGenerator::new(profiles, Arc::new(SequenceRandom::constant(0.5)))
    }

    fn has_one_decimal(value: f64) -> bool {
        ((value * 10.0).round() - value * 10.0).abs() < 1e-6
    }

    fn category_counts(notes: &[pulsoft_contracts::note::AnalysisNote]) -> HashMap<Category, usize> {
        let mut counts = HashMap::new();
        for note in notes {
            *counts.entry(note.category.unwrap()).or_insert(0) += 1;
        }
        counts
    }

    // ── Profiles ──────────────────────────────────────────────────────────────

    #[test]
    fn default_fixture_has_five_profiles() {
        let generator = MockDataGenerator::with_defaults();
        let ids: Vec<&str> = generator.all_profiles().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3", "4", "5"]);
    }

    #[test]
    fn profile_lookup() {
        let generator = MockDataGenerator::with_defaults();
        assert_eq!(generator.profile("2").map(|p| p.condition.as_str()), Some("Diabetes"));
        assert!(generator.profile("99").is_none());
    }

    // ── current_metrics ───────────────────────────────────────────────────────

    /// Every reading for a known profile lands within half a spread of its
    /// baseline and carries one decimal.
    #[test]
    fn current_metrics_within_half_spread() {
        let generator = generator_with_thread_rng();
        for profile in generator.all_profiles().to_vec() {
            let b = profile.baselines;
            for _ in 0..200 {
                let r = generator.current_metrics(&profile.id);
                assert!((r.cardiovascular - b.cardiovascular).abs() <= 3.0 + EPS, "{r:?}");
                assert!((r.sweat - b.sweat).abs() <= 2.0 + EPS, "{r:?}");
                assert!((r.temperature - b.temperature).abs() <= 0.2 + EPS, "{r:?}");
                assert!(has_one_decimal(r.cardiovascular));
                assert!(has_one_decimal(r.sweat));
                assert!(has_one_decimal(r.temperature));
                assert_eq!(
                    r.status,
                    MetricStatus::classify(r.cardiovascular, r.sweat, r.temperature)
                );
                assert_eq!(r.patient_info.as_ref().map(|i| i.name.as_str()), Some(profile.name.as_str()));
            }
        }
    }

    fn generator_with_thread_rng() -> MockDataGenerator {
        MockDataGenerator::new(default_profiles(), Arc::new(ThreadRandom))
    }

    #[test]
    fn current_metrics_unknown_id_is_fixed_default() {
        let generator = generator_with_thread_rng();
        for _ in 0..10 {
            let r = generator.current_metrics("no-such-patient");
            assert_eq!(r.cardiovascular, 75.0);
            assert_eq!(r.sweat, 45.0);
            assert_eq!(r.temperature, 37.0);
            assert_eq!(r.status, MetricStatus::Normal);
            assert!(r.patient_info.is_none());
        }
    }

    #[test]
    fn current_metrics_exact_with_deterministic_source() {
        // Draws: cardio 1.0-ε → +3, sweat 0.0 → -2, temp 0.75 → +0.1
        let generator = generator_with(SequenceRandom::new(vec![1.0, 0.0, 0.75]));
        let r = generator.current_metrics("1");
        assert_eq!(r.cardiovascular, 81.0);
        assert_eq!(r.sweat, 40.0);
        assert_eq!(r.temperature, 37.2);
        assert_eq!(r.status, MetricStatus::Normal);
    }

    #[test]
    fn current_metrics_midpoint_draw_returns_baseline() {
        let generator = generator_with(SequenceRandom::constant(0.5));
        let r = generator.current_metrics("4");
        assert_eq!(r.cardiovascular, 92.0);
        assert_eq!(r.sweat, 35.0);
        assert_eq!(r.temperature, 36.9);
        // 92 bpm crosses the alert threshold.
        assert_eq!(r.status, MetricStatus::Alert);
    }

    // ── weekly_series ─────────────────────────────────────────────────────────

    #[test]
    fn weekly_series_always_has_seven_days() {
        let generator = generator_with_thread_rng();
        for profile in generator.all_profiles().to_vec() {
            for _ in 0..20 {
                let series = generator.weekly_series(&profile.id);
                assert!(series.is_complete());
                assert_eq!(series.labels, WEEKDAY_LABELS.to_vec());
                let b = profile.baselines;
                assert!(series.cardiovascular.iter().all(|v| (v - b.cardiovascular).abs() <= 4.0 + EPS));
                assert!(series.sweat.iter().all(|v| (v - b.sweat).abs() <= 2.5 + EPS));
                assert!(series.temperature.iter().all(|v| (v - b.temperature).abs() <= 0.15 + 0.05 + EPS));
            }
        }
    }

    #[test]
    fn weekly_series_unknown_id_is_fixed() {
        let generator = generator_with_thread_rng();
        let series = generator.weekly_series("missing");
        assert_eq!(series.cardiovascular, vec![65.0, 70.0, 75.0, 80.0, 85.0, 82.0, 78.0]);
        assert_eq!(series.sweat, vec![40.0, 45.0, 50.0, 48.0, 42.0, 45.0, 43.0]);
        assert_eq!(series.temperature, vec![36.8, 37.0, 37.2, 37.1, 36.9, 37.0, 37.1]);
        assert_eq!(series.patient_info.unwrap().condition, "General");
    }

    #[test]
    fn weekly_series_draws_per_day() {
        // Alternating extremes: cardio days swing ±4 around 78.
        let generator = generator_with(SequenceRandom::new(vec![0.0, 1.0]));
        let series = generator.weekly_series("1");
        assert_eq!(series.cardiovascular[0], 74.0);
        assert_eq!(series.cardiovascular[1], 82.0);
        assert_eq!(series.cardiovascular[2], 74.0);
    }

    // ── notes ─────────────────────────────────────────────────────────────────

    #[test]
    fn notes_for_hypertension_profile_are_stable_in_shape() {
        let generator = generator_with_thread_rng();
        let first = generator.notes("1");
        let second = generator.notes("1");

        assert_eq!(first.len(), 6);
        assert_eq!(second.len(), 6);
        assert_eq!(category_counts(&first), category_counts(&second));

        let condition_notes: Vec<_> = first.iter().filter(|n| n.id == "6").collect();
        assert_eq!(condition_notes.len(), 1);
        assert_eq!(condition_notes[0].category, Some(Category::Cardiovascular));
        assert!(condition_notes[0].body.contains("Hypertension"));
    }

    #[test]
    fn hypertension_note_severity_follows_cardiovascular() {
        // Baseline 84 with midpoint draws → 84 bpm > 80 → high.
        let high = single_profile("Hypertension", 84.0, 40.0, 36.8);
        let notes = high.notes("x");
        let note = notes.iter().find(|n| n.id == "6").unwrap();
        assert_eq!(note.severity, Some(Severity::High));
        assert!(note.body.contains("84 bpm"));

        let low = single_profile("Hypertension", 72.0, 40.0, 36.8);
        let notes = low.notes("x");
        let note = notes.iter().find(|n| n.id == "6").unwrap();
        assert_eq!(note.severity, Some(Severity::Low));
    }

    #[test]
    fn diabetes_profile_gets_sweat_note() {
        let generator = single_profile("Diabetes", 70.0, 47.0, 36.8);
        let notes = generator.notes("x");
        assert_eq!(notes.len(), 6);
        let note = notes.iter().find(|n| n.id == "7").unwrap();
        assert_eq!(note.category, Some(Category::Sweat));
        assert_eq!(note.severity, Some(Severity::Medium));
    }

    #[test]
    fn other_conditions_get_five_notes() {
        let generator = generator_with_thread_rng();
        assert_eq!(generator.notes("3").len(), 5);
        assert_eq!(generator.notes("5").len(), 5);
    }

    #[test]
    fn base_note_severities_use_reading_values() {
        let calm = single_profile("Asthma", 70.0, 40.0, 36.8);
        let notes = calm.notes("x");
        assert!(notes.iter().all(|n| n.severity == Some(Severity::Low)));
        assert!(notes[3].body.contains("healthy"));

        let stressed = single_profile("Asthma", 82.0, 46.0, 37.3);
        let notes = stressed.notes("x");
        assert_eq!(notes[0].severity, Some(Severity::Medium));
        assert_eq!(notes[1].severity, Some(Severity::Medium));
        assert_eq!(notes[2].severity, Some(Severity::Low));
        assert_eq!(notes[3].severity, Some(Severity::Medium));
        assert_eq!(notes[4].severity, Some(Severity::Medium));
    }

    #[test]
    fn notes_embed_one_consistent_reading() {
        let generator = generator_with(SequenceRandom::new(vec![0.9, 0.1, 0.5]));
        let notes = generator.notes("2");
        // 85 + 0.4 * 6 = 87.4 bpm, 38 - 0.4 * 4 = 36.4 units.
        assert!(notes[0].body.contains("87.4 bpm"));
        assert!(notes[1].body.contains("36.4 units"));
        let diabetes = notes.iter().find(|n| n.id == "7").unwrap();
        assert!(diabetes.body.contains("36.4 units"));
    }

    #[test]
    fn notes_are_backdated() {
        let generator = generator_with_thread_rng();
        let notes = generator.notes("1");
        let now = chrono::Utc::now();
        let labels: Vec<String> = notes.iter().map(|n| n.relative_label(now)).collect();
        assert_eq!(
            labels,
            vec!["2 hours ago", "4 hours ago", "6 hours ago", "8 hours ago", "12 hours ago", "1 day ago"]
        );
        assert!(notes.iter().all(|n| n.patient_email == "maria.gonzalez@email.com"));
    }

    #[test]
    fn notes_unknown_id_are_generic() {
        let generator = generator_with_thread_rng();
        let notes = generator.notes("nobody");
        assert_eq!(notes.len(), 3);
        let categories: Vec<_> = notes.iter().map(|n| n.category.unwrap()).collect();
        assert_eq!(
            categories,
            vec![Category::Cardiovascular, Category::Sweat, Category::Temperature]
        );
        assert_eq!(notes[0].severity, Some(Severity::Medium));
    }

    // ── summaries & search ────────────────────────────────────────────────────

    #[test]
    fn summaries_cover_every_profile() {
        let generator = generator_with_thread_rng();
        let summaries = generator.patient_summaries();
        assert_eq!(summaries.len(), 5);
        assert!(summaries.iter().all(|s| s.cardiovascular.is_some() && s.name.is_some()));
    }

    #[test]
    fn search_matches_email_or_name() {
        let generator = generator_with_thread_rng();
        let by_email = generator.search("LOPEZ@");
        assert_eq!(by_email.len(), 1);
        assert_eq!(by_email[0].uid, "4");

        let by_name = generator.search("ana");
        assert_eq!(by_name.iter().map(|s| s.uid.as_str()).collect::<Vec<_>>(), vec!["3"]);

        assert!(generator.search("   ").is_empty());
    }

    // ── Periodic updates ──────────────────────────────────────────────────────

    fn collecting_callback() -> (Arc<Mutex<Vec<MetricReading>>>, impl FnMut(MetricReading) + Send + 'static) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        (seen, move |reading| sink.lock().unwrap().push(reading))
    }

    #[tokio::test(start_paused = true)]
    async fn periodic_updates_fire_every_interval() {
        let generator = Arc::new(generator_with_thread_rng());
        let (seen, callback) = collecting_callback();

        let subscription = generator.start_periodic_updates("1", callback);
        assert!(subscription.is_active());

        tokio::time::sleep(Duration::from_millis(15_500)).await;
        assert_eq!(seen.lock().unwrap().len(), 3);
        assert!(seen
            .lock()
            .unwrap()
            .iter()
            .all(|r| r.patient_info.as_ref().map(|i| i.name.as_str()) == Some("María González")));

        subscription.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_before_first_interval_never_fires() {
        let generator = Arc::new(generator_with_thread_rng());
        let (seen, callback) = collecting_callback();

        let subscription = generator.start_periodic_updates("1", callback);
        tokio::time::sleep(Duration::from_secs(2)).await;
        subscription.cancel();

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_subscription_stops_updates() {
        let generator = Arc::new(generator_with_thread_rng());
        let (seen, callback) = collecting_callback();

        let subscription =
            generator.start_periodic_updates_every("2", Duration::from_secs(1), callback);
        tokio::time::sleep(Duration::from_millis(2_500)).await;
        drop(subscription);
        let delivered = seen.lock().unwrap().len();
        assert_eq!(delivered, 2);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(seen.lock().unwrap().len(), delivered);
    }

    #[tokio::test(start_paused = true)]
    async fn callback_can_cancel_its_own_subscription() {
        let generator = Arc::new(generator_with_thread_rng());
        let slot: Arc<Mutex<Option<UpdateSubscription>>> = Arc::new(Mutex::new(None));
        let delivered = Arc::new(Mutex::new(0));

        let own_slot = Arc::clone(&slot);
        let counter = Arc::clone(&delivered);
        let subscription =
            generator.start_periodic_updates_every("3", Duration::from_secs(1), move |_| {
                *counter.lock().unwrap() += 1;
                if let Some(own) = own_slot.lock().unwrap().take() {
                    own.cancel();
                }
            });
        *slot.lock().unwrap() = Some(subscription);

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(*delivered.lock().unwrap(), 1);
        assert!(slot.lock().unwrap().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn callback_can_drop_its_own_subscription() {
        let generator = Arc::new(generator_with_thread_rng());
        let slot: Arc<Mutex<Option<UpdateSubscription>>> = Arc::new(Mutex::new(None));
        let (seen, mut collect) = collecting_callback();

        let own_slot = Arc::clone(&slot);
        let subscription =
            generator.start_periodic_updates_every("3", Duration::from_secs(1), move |reading| {
                collect(reading);
                let own = own_slot.lock().unwrap().take();
                drop(own);
            });
        *slot.lock().unwrap() = Some(subscription);

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn subscriptions_are_independent() {
        let generator = Arc::new(generator_with_thread_rng());
        let (seen_a, callback_a) = collecting_callback();
        let (seen_b, callback_b) = collecting_callback();

        let a = generator.start_periodic_updates_every("1", Duration::from_secs(1), callback_a);
        let b = generator.start_periodic_updates_every("unknown", Duration::from_secs(1), callback_b);
        assert_ne!(a.id(), b.id());

        tokio::time::sleep(Duration::from_millis(1_500)).await;
        a.cancel();
        tokio::time::sleep(Duration::from_secs(2)).await;

        assert_eq!(seen_a.lock().unwrap().len(), 1);
        assert_eq!(seen_b.lock().unwrap().len(), 3);
        assert!(seen_b.lock().unwrap().iter().all(|r| r.cardiovascular == 75.0));
        assert_eq!(b.patient_id(), "unknown");
    }
}
