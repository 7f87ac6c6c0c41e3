//! # pulsoft-service
//!
//! The service layer of the Pulsoft monitoring core.
//!
//! `CaregiverService` is what screens talk to. It tries the REST backend
//! first and, when that fails for any reason, answers from the mock
//! generator instead, always wrapped in a `ServiceResponse` that records
//! where the data came from.
//!
//! Also provided:
//!
//! - `ServiceConfig`: TOML configuration for the backend, the fallback
//!   policy and the update interval
//! - `RestTransport`: the reqwest-backed `Transport`
//! - `InMemoryDatabase`: a process-local `RealtimeDatabase`
//! - `StaticAuth`: a fixed-session `AuthProvider`

pub mod auth;
pub mod config;
pub mod dashboard;
pub mod realtime;
pub mod rest;
pub mod service;

pub use auth::StaticAuth;
pub use config::{EmptyPayloadPolicy, ServiceConfig};
pub use dashboard::MetricsWatch;
pub use realtime::InMemoryDatabase;
pub use rest::RestTransport;
pub use service::CaregiverService;

// ── Tests ─────────────────────────────────────────────────────────────────────
