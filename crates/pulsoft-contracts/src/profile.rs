//! Seed patient profiles.
//!
//! A `PatientProfile` is the fixed reference record the mock generator
//! perturbs. Profiles are grouped into a `ProfileSet` that is built once and
//! shared read-only behind an `Arc`.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Baseline reference values a profile's readings are perturbed around.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Baselines {
    /// Heart rate in beats per minute.
    pub cardiovascular: f64,
    /// Galvanic skin response, arbitrary sensor units.
    pub sweat: f64,
    /// Body temperature in °C.
    pub temperature: f64,
}

/// One synthetic patient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientProfile {
    pub id: String,
    pub email: String,
    pub name: String,
    pub age: u32,
    /// Free-form condition label. "Hypertension" and "Diabetes" trigger an
    /// extra condition-specific analysis note.
    pub condition: String,
    pub baselines: Baselines,
    pub notes_count: u32,
}

/// Display-only patient details attached to generated readings and series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientInfo {
    pub name: String,
    pub age: u32,
    pub condition: String,
}

impl From<&PatientProfile> for PatientInfo {
    fn from(profile: &PatientProfile) -> Self {
        Self {
            name: profile.name.clone(),
            age: profile.age,
            condition: profile.condition.clone(),
        }
    }
}

/// An immutable, cheaply clonable list of profiles.
///
/// Lookups are linear; the set is expected to hold a handful of entries.
#[derive(Debug, Clone, Default)]
pub struct ProfileSet {
    inner: Arc<[PatientProfile]>,
}

impl ProfileSet {
    /// Freeze `profiles` into a shared set.
    pub fn new(profiles: Vec<PatientProfile>) -> Self {
        Self { inner: profiles.into() }
    }

    /// Return the profile with the given id, if any.
    pub fn get(&self, id: &str) -> Option<&PatientProfile> {
        self.inner.iter().find(|p| p.id == id)
    }

    /// Return every profile in declaration order.
    pub fn all(&self) -> &[PatientProfile] {
        &self.inner
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
