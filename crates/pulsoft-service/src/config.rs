//! TOML configuration for the service layer.
//!
//! Every section and key is optional; omitted values take the defaults
//! below. Parsing and validation failures surface as `PulsoftError::Config`.
//!
//! ```toml
//! [backend]
//! base_url = "http://localhost:8000/api"
//! timeout_secs = 30
//! use_system_proxy = true
//!
//! [fallback]
//! enabled = true
//! empty_payload = "remote"
//!
//! [updates]
//! interval_ms = 5000
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use pulsoft_contracts::error::{PulsoftError, PulsoftResult};

/// Where the REST backend lives and how to reach it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL every endpoint path is joined onto.
    pub base_url: String,

    /// Whole-request timeout. `None` leaves the HTTP client's default.
    pub timeout_secs: Option<u64>,

    /// Honour `HTTP_PROXY` / `HTTPS_PROXY` from the environment.
    pub use_system_proxy: bool,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/api".to_string(),
            timeout_secs: None,
            use_system_proxy: true,
        }
    }
}

/// What to do with a list endpoint that answers successfully but empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmptyPayloadPolicy {
    /// Return the empty list as remote data.
    Remote,
    /// Treat it like a failure and substitute mock data.
    Mock,
}

/// Whether and how failed remote calls are replaced with mock data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackConfig {
    /// When `false`, failures are returned as `success = false` envelopes.
    pub enabled: bool,

    /// Applies to the linked-patients and patient-notes lists.
    pub empty_payload: EmptyPayloadPolicy,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            empty_payload: EmptyPayloadPolicy::Remote,
        }
    }
}

/// Periodic-update simulator settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateConfig {
    pub interval_ms: u64,
}

impl Default for UpdateConfig {
    fn default() -> Self {
        Self { interval_ms: 5_000 }
    }
}

/// The top-level structure deserialized from a TOML config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub backend: BackendConfig,
    pub fallback: FallbackConfig,
    pub updates: UpdateConfig,
}

impl ServiceConfig {
    /// Parse `s` as TOML and validate the result.
    ///
    /// Returns `PulsoftError::Config` if the TOML is malformed, does not
    /// match the expected schema, or fails validation.
    pub fn from_toml_str(s: &str) -> PulsoftResult<Self> {
        let config: ServiceConfig = toml::from_str(s).map_err(|e| PulsoftError::Config {
            reason: format!("failed to parse service TOML: {}", e),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Read the file at `path` and parse it as TOML service configuration.
    pub fn from_file(path: &Path) -> PulsoftResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| PulsoftError::Config {
            reason: format!("failed to read config file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    /// Check cross-field constraints serde cannot express.
    pub fn validate(&self) -> PulsoftResult<()> {
        let url = &self.backend.base_url;
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(PulsoftError::Config {
                reason: format!("backend.base_url '{}' must start with http:// or https://", url),
            });
        }
        if self.backend.timeout_secs == Some(0) {
            return Err(PulsoftError::Config {
                reason: "backend.timeout_secs must be positive when set".to_string(),
            });
        }
        if self.updates.interval_ms == 0 {
            return Err(PulsoftError::Config {
                reason: "updates.interval_ms must be positive".to_string(),
            });
        }
        Ok(())
    }

    pub fn update_interval(&self) -> Duration {
        Duration::from_millis(self.updates.interval_ms)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.backend.timeout_secs.map(Duration::from_secs)
    }
}
