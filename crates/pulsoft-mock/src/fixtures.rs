//! Built-in seed profiles.
//!
//! All data in this module is hardcoded and fictional. It stands in for the
//! patient directory the backend would normally serve.

use pulsoft_contracts::profile::{Baselines, PatientProfile, ProfileSet};

/// Condition label that adds a cardiovascular follow-up note.
pub const HYPERTENSION: &str = "Hypertension";

/// Condition label that adds a sweat follow-up note.
pub const DIABETES: &str = "Diabetes";

fn profile(
    id: &str,
    email: &str,
    name: &str,
    age: u32,
    condition: &str,
    (cardiovascular, sweat, temperature): (f64, f64, f64),
    notes_count: u32,
) -> PatientProfile {
    PatientProfile {
        id: id.to_string(),
        email: email.to_string(),
        name: name.to_string(),
        age,
        condition: condition.to_string(),
        baselines: Baselines {
            cardiovascular,
            sweat,
            temperature,
        },
        notes_count,
    }
}

/// The five default patients, ids `"1"` through `"5"`.
pub fn default_profiles() -> ProfileSet {
    ProfileSet::new(vec![
        profile("1", "maria.gonzalez@email.com", "María González", 68, HYPERTENSION, (78.0, 42.0, 37.1), 5),
        profile("2", "juan.rodriguez@email.com", "Juan Rodríguez", 72, DIABETES, (85.0, 38.0, 36.8), 3),
        profile("3", "ana.martinez@email.com", "Ana Martínez", 65, "Arthritis", (72.0, 45.0, 37.3), 4),
        profile("4", "carlos.lopez@email.com", "Carlos López", 70, "Heart disease", (92.0, 35.0, 36.9), 6),
        profile("5", "lucia.hernandez@email.com", "Lucía Hernández", 67, "Asthma", (75.0, 48.0, 37.0), 2),
    ])
}
