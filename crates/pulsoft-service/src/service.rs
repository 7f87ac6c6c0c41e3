//! `CaregiverService`: every remote capability, wrapped with mock fallback.
//!
//! Each operation makes a single attempt against the backend. Whatever goes
//! wrong (no signed-in user, network failure, non-2xx status, a body that
//! does not decode, an acknowledgement carrying `error`) is logged once at
//! `warn` and replaced with mock data from the generator. The envelope keeps
//! track of which happened: `source = mock` plus the underlying error text in
//! `fallback_reason`.
//!
//! With `fallback.enabled = false` the same failures come back as
//! `success = false` envelopes instead.
//!
//! Operations never return `Err`.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{Duration as ChronoDuration, Utc};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use pulsoft_contracts::{
    api::{
        Acknowledgement, CaregiverStatistics, CaregiverStats, ChartData, LinkRequest,
        LinkedPatients, PatientNotes, PatientSearchResults, PatientStatistics, ProfileStatistics,
        ProfileUpdate, UserProfile, UserRole,
    },
    envelope::ServiceResponse,
    error::{PulsoftError, PulsoftResult},
    metrics::{round_one_decimal, MetricReading},
    note::Category,
    remote::ApiRequest,
};
use pulsoft_core::traits::{AuthProvider, RealtimeDatabase, Transport};
use pulsoft_mock::{notes::GENERIC_EMAIL, MockDataGenerator};

use crate::config::{EmptyPayloadPolicy, FallbackConfig, ServiceConfig};
use crate::rest::RestTransport;

// ── Endpoints ─────────────────────────────────────────────────────────────────

pub const CAREGIVER_PATIENTS: &str = "caregiver-patients/";
pub const PATIENT_NOTES: &str = "patient-notes/";
pub const PATIENT_CHART_DATA: &str = "patient-chart-data/";
pub const PATIENT_METRICS: &str = "patient-metrics/";
pub const LINK_PATIENT: &str = "link-patient/";
pub const UNLINK_PATIENT: &str = "unlink-patient/";
pub const SEARCH_PATIENTS: &str = "search-patients/";
pub const USER_PROFILE: &str = "user-profile/";

/// Backend-first access to caregiver data with mock fallback.
pub struct CaregiverService {
    transport: Arc<dyn Transport>,
    auth: Arc<dyn AuthProvider>,
    pub(crate) generator: Arc<MockDataGenerator>,
    pub(crate) database: Option<Arc<dyn RealtimeDatabase>>,
    pub(crate) fallback: FallbackConfig,
    pub(crate) update_interval: Duration,
}

impl CaregiverService {
    /// Assemble a service from explicit collaborators.
    pub fn new(
        transport: Arc<dyn Transport>,
        auth: Arc<dyn AuthProvider>,
        generator: Arc<MockDataGenerator>,
        config: &ServiceConfig,
    ) -> Self {
        Self {
            transport,
            auth,
            generator,
            database: None,
            fallback: config.fallback.clone(),
            update_interval: config.update_interval(),
        }
    }

    /// A service talking to the configured REST backend, falling back to the
    /// built-in fixture profiles.
    pub fn connect(config: &ServiceConfig, auth: Arc<dyn AuthProvider>) -> PulsoftResult<Self> {
        config.validate()?;
        let transport = RestTransport::from_config(config)?;
        info!(base_url = %transport.base_url(), fallback = config.fallback.enabled, "caregiver service ready");
        Ok(Self::new(
            Arc::new(transport),
            auth,
            Arc::new(MockDataGenerator::with_defaults()),
            config,
        ))
    }

    /// Attach the real-time database used by the dashboard reads.
    pub fn with_database(mut self, database: Arc<dyn RealtimeDatabase>) -> Self {
        self.database = Some(database);
        self
    }

    pub fn generator(&self) -> &Arc<MockDataGenerator> {
        &self.generator
    }

    // ── Plumbing ──────────────────────────────────────────────────────────────

    /// Authenticate, send, and return the raw JSON body.
    async fn send(&self, request: ApiRequest) -> PulsoftResult<Value> {
        let user = self.auth.current_user().ok_or_else(|| PulsoftError::Unauthenticated {
            reason: "no user is signed in".to_string(),
        })?;
        let token = self.auth.id_token().await?;
        debug!(
            user_uid = %user.uid,
            method = %request.method,
            endpoint = %request.endpoint,
            "calling backend"
        );
        self.transport.send(&request, &token).await
    }

    /// Send and decode the body as `T`.
    async fn call<T: DeserializeOwned>(&self, request: ApiRequest) -> PulsoftResult<T> {
        let endpoint = request.endpoint.clone();
        let body = self.send(request).await?;
        decode(&endpoint, body)
    }

    /// Send to a mutating endpoint and check its acknowledgement.
    ///
    /// An empty body counts as a bare success.
    async fn acknowledge(&self, request: ApiRequest) -> PulsoftResult<Acknowledgement> {
        let endpoint = request.endpoint.clone();
        let body = self.send(request).await?;
        let ack = if body.is_null() {
            Acknowledgement::default()
        } else {
            decode::<Acknowledgement>(&endpoint, body)?
        };
        match ack.error {
            Some(reason) => Err(PulsoftError::Rejected { endpoint, reason }),
            None => Ok(ack),
        }
    }

    pub(crate) fn resolve<T>(
        &self,
        operation: &'static str,
        outcome: PulsoftResult<T>,
        mock: impl FnOnce() -> T,
    ) -> ServiceResponse<T> {
        match outcome {
            Ok(data) => ServiceResponse::remote(data),
            Err(err) => self.fall_back(operation, err.to_string(), mock),
        }
    }

    pub(crate) fn fall_back<T>(
        &self,
        operation: &'static str,
        reason: String,
        mock: impl FnOnce() -> T,
    ) -> ServiceResponse<T> {
        if !self.fallback.enabled {
            warn!(operation, error = %reason, "remote call failed and fallback is disabled");
            return ServiceResponse::failure(reason);
        }
        warn!(operation, error = %reason, "remote call failed; serving mock data");
        ServiceResponse::mock(mock(), reason)
    }

    fn empty_means_mock(&self) -> bool {
        self.fallback.empty_payload == EmptyPayloadPolicy::Mock
    }

    // ── Patients ──────────────────────────────────────────────────────────────

    /// Patients linked to `caregiver_uid`.
    ///
    /// Falls back to every seed profile with a fresh reading.
    pub async fn fetch_linked_patients(&self, caregiver_uid: &str) -> ServiceResponse<LinkedPatients> {
        let request = ApiRequest::get(CAREGIVER_PATIENTS).with_query("caregiver_uid", caregiver_uid);
        let outcome = self.call::<LinkedPatients>(request).await;
        let mock = || LinkedPatients::new(self.generator.patient_summaries());

        match outcome {
            Ok(list) if list.patients.is_empty() && self.empty_means_mock() => self.fall_back(
                "fetch_linked_patients",
                format!("'{}' returned no patients", CAREGIVER_PATIENTS),
                mock,
            ),
            outcome => self.resolve("fetch_linked_patients", outcome, mock),
        }
    }

    /// Analysis notes for one patient, as visible to `caregiver_uid`.
    pub async fn fetch_patient_notes(
        &self,
        patient_uid: &str,
        caregiver_uid: &str,
    ) -> ServiceResponse<PatientNotes> {
        let request = ApiRequest::get(PATIENT_NOTES)
            .with_query("patient_uid", patient_uid)
            .with_query("caregiver_uid", caregiver_uid);
        let outcome = self.call::<PatientNotes>(request).await;
        let mock = || self.mock_notes(patient_uid);

        match outcome {
            Ok(notes) if notes.notes.is_empty() && self.empty_means_mock() => self.fall_back(
                "fetch_patient_notes",
                format!("'{}' returned no notes", PATIENT_NOTES),
                mock,
            ),
            outcome => self.resolve("fetch_patient_notes", outcome, mock),
        }
    }

    fn mock_notes(&self, patient_uid: &str) -> PatientNotes {
        let notes = self.generator.notes(patient_uid);
        let patient_email = self
            .generator
            .profile(patient_uid)
            .map(|p| p.email.clone())
            .unwrap_or_else(|| GENERIC_EMAIL.to_string());
        PatientNotes {
            total_notes: notes.len(),
            notes,
            patient_email,
        }
    }

    /// The weekly series plus the latest reading for one patient.
    pub async fn fetch_chart_data(&self, patient_uid: &str, caregiver_uid: &str) -> ServiceResponse<ChartData> {
        let request = ApiRequest::get(PATIENT_CHART_DATA)
            .with_query("patient_uid", patient_uid)
            .with_query("caregiver_uid", caregiver_uid);
        let outcome = self.call::<ChartData>(request).await;
        self.resolve("fetch_chart_data", outcome, || ChartData {
            series: self.generator.weekly_series(patient_uid),
            metrics: Some(self.generator.current_metrics(patient_uid)),
        })
    }

    /// The latest reading for one patient.
    pub async fn fetch_current_metrics(
        &self,
        patient_uid: &str,
        caregiver_uid: &str,
    ) -> ServiceResponse<MetricReading> {
        let request = ApiRequest::get(PATIENT_METRICS)
            .with_query("patient_uid", patient_uid)
            .with_query("caregiver_uid", caregiver_uid);
        let outcome = self.call::<MetricReading>(request).await;
        self.resolve("fetch_current_metrics", outcome, || {
            self.generator.current_metrics(patient_uid)
        })
    }

    /// Patients whose email or name matches `query`.
    pub async fn search_patients(&self, caregiver_uid: &str, query: &str) -> ServiceResponse<PatientSearchResults> {
        let request = ApiRequest::get(SEARCH_PATIENTS)
            .with_query("caregiver_uid", caregiver_uid)
            .with_query("search", query);
        let outcome = self.call::<PatientSearchResults>(request).await;
        self.resolve("search_patients", outcome, || PatientSearchResults {
            patients: self.generator.search(query),
        })
    }

    // ── Linking ───────────────────────────────────────────────────────────────

    pub async fn link_patient(&self, caregiver_uid: &str, patient_uid: &str) -> ServiceResponse<Acknowledgement> {
        let body = LinkRequest {
            caregiver_uid: caregiver_uid.to_string(),
            patient_uid: patient_uid.to_string(),
        };
        let outcome = match encode(LINK_PATIENT, &body) {
            Ok(json) => self.acknowledge(ApiRequest::post(LINK_PATIENT, json)).await,
            Err(err) => Err(err),
        };
        self.resolve("link_patient", outcome, || {
            Acknowledgement::ok("Patient linked locally")
        })
    }

    pub async fn unlink_patient(&self, caregiver_uid: &str, patient_uid: &str) -> ServiceResponse<Acknowledgement> {
        let request = ApiRequest::delete(UNLINK_PATIENT)
            .with_query("caregiver_uid", caregiver_uid)
            .with_query("patient_uid", patient_uid);
        let outcome = self.acknowledge(request).await;
        self.resolve("unlink_patient", outcome, || {
            Acknowledgement::ok("Patient unlinked locally")
        })
    }

    /// Whether `patient_uid` is among the caregiver's linked patients.
    ///
    /// Derived from `fetch_linked_patients`, so it carries that call's
    /// provenance.
    pub async fn validate_patient_link(&self, caregiver_uid: &str, patient_uid: &str) -> ServiceResponse<bool> {
        self.fetch_linked_patients(caregiver_uid)
            .await
            .map(|list| list.patients.iter().any(|p| p.uid == patient_uid))
    }

    /// Dashboard counters for `caregiver_uid`.
    pub async fn caregiver_stats(&self, caregiver_uid: &str) -> ServiceResponse<CaregiverStats> {
        let response = self.fetch_linked_patients(caregiver_uid).await;
        let source = response.source;
        response.map(|list| CaregiverStats {
            total_patients: list.total(),
            linked_patients: list.patients.len(),
            last_activity: Utc::now(),
            source,
        })
    }

    // ── Profiles ──────────────────────────────────────────────────────────────

    /// Account profile and activity statistics for `user_uid`.
    pub async fn fetch_user_profile(&self, user_uid: &str, role: UserRole) -> ServiceResponse<UserProfile> {
        let request = ApiRequest::get(USER_PROFILE)
            .with_query("user_uid", user_uid)
            .with_query("user_type", role.as_str());
        let outcome = self
            .call::<ProfileEnvelope>(request)
            .await
            .map(ProfileEnvelope::into_profile);
        self.resolve("fetch_user_profile", outcome, || self.mock_profile(user_uid, role))
    }

    pub async fn update_user_profile(&self, update: &ProfileUpdate) -> ServiceResponse<Acknowledgement> {
        let outcome = match encode(USER_PROFILE, update) {
            Ok(json) => self.acknowledge(ApiRequest::put(USER_PROFILE, json)).await,
            Err(err) => Err(err),
        };
        self.resolve("update_user_profile", outcome, || {
            Acknowledgement::ok("Profile updated locally")
        })
    }

    fn mock_profile(&self, user_uid: &str, role: UserRole) -> UserProfile {
        let now = Utc::now();
        let created = now - ChronoDuration::days(30);

        let email = match self.generator.profile(user_uid) {
            Some(profile) => profile.email.clone(),
            None => self
                .auth
                .current_user()
                .filter(|u| u.uid == user_uid)
                .and_then(|u| u.email)
                .unwrap_or_else(|| format!("{}@example.com", user_uid)),
        };

        let statistics = match role {
            UserRole::Patient => {
                let notes = self.generator.notes(user_uid);
                let mut notes_by_type = HashMap::new();
                for note in &notes {
                    let category = note.category.unwrap_or(Category::General);
                    *notes_by_type.entry(category.as_str().to_string()).or_insert(0) += 1;
                }
                ProfileStatistics::Patient(PatientStatistics {
                    total_notes: notes.len() as u32,
                    caregivers_count: 1,
                    notes_by_type,
                    last_activity: now.to_rfc3339(),
                })
            }
            UserRole::Caregiver => {
                let profiles = self.generator.all_profiles();
                let patients_count = profiles.len() as u32;
                let total_notes_access: u32 = profiles.iter().map(|p| p.notes_count).sum();
                let average_notes_per_patient = if patients_count == 0 {
                    0.0
                } else {
                    round_one_decimal(f64::from(total_notes_access) / f64::from(patients_count))
                };
                ProfileStatistics::Caregiver(CaregiverStatistics {
                    patients_count,
                    total_notes_access,
                    average_notes_per_patient,
                    active_since: Some(created.to_rfc3339()),
                })
            }
        };

        UserProfile {
            uid: user_uid.to_string(),
            email,
            user_type: role,
            created_at: created.timestamp_millis(),
            statistics,
        }
    }
}

impl std::fmt::Debug for CaregiverService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaregiverService")
            .field("generator", &self.generator)
            .field("database", &self.database.is_some())
            .field("fallback", &self.fallback)
            .field("update_interval", &self.update_interval)
            .finish_non_exhaustive()
    }
}

// ── Wire helpers ──────────────────────────────────────────────────────────────

/// `GET user-profile/` answers either `{ "profile": {...} }` or the bare profile.
#[derive(serde::Deserialize)]
#[serde(untagged)]
enum ProfileEnvelope {
    Wrapped { profile: UserProfile },
    Bare(UserProfile),
}

impl ProfileEnvelope {
    fn into_profile(self) -> UserProfile {
        match self {
            ProfileEnvelope::Wrapped { profile } => profile,
            ProfileEnvelope::Bare(profile) => profile,
        }
    }
}

fn decode<T: DeserializeOwned>(endpoint: &str, body: Value) -> PulsoftResult<T> {
    serde_json::from_value(body).map_err(|e| PulsoftError::MalformedPayload {
        reason: format!("'{}' response did not match the expected shape: {}", endpoint, e),
    })
}

fn encode<B: Serialize>(endpoint: &str, body: &B) -> PulsoftResult<Value> {
    serde_json::to_value(body).map_err(|e| PulsoftError::MalformedPayload {
        reason: format!("could not encode request body for '{}': {}", endpoint, e),
    })
}
