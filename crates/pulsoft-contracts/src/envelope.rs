//! The uniform response envelope returned by the service layer.
//!
//! An envelope is always in exactly one of two shapes:
//!
//! - `success = true`, `data = Some(_)`, `error = None`
//! - `success = false`, `data = None`, `error = Some(_)`
//!
//! The constructors below are the only way the service builds envelopes, so
//! the invariant holds for every value it returns. When mock data stands in
//! for a failed remote call the envelope is still a success, but `source`
//! is `Mock` and `fallback_reason` carries the underlying error text.

use serde::{Deserialize, Serialize};

/// Where an envelope's payload came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// Decoded from a successful backend response.
    Remote,
    /// Produced by the mock generator.
    Mock,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceResponse<T> {
    pub success: bool,
    #[serde(default)]
    pub data: Option<T>,
    #[serde(default)]
    pub error: Option<String>,
    pub source: Source,
    /// Why the remote call was abandoned, when `source` is `Mock`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
}

impl<T> ServiceResponse<T> {
    /// Wrap data decoded from the backend.
    pub fn remote(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            source: Source::Remote,
            fallback_reason: None,
        }
    }

    /// Wrap mock data substituted for a failed remote call.
    pub fn mock(data: T, reason: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            source: Source::Mock,
            fallback_reason: Some(reason.into()),
        }
    }

    /// Report a remote failure without substituting anything.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            source: Source::Remote,
            fallback_reason: None,
        }
    }

    /// True when the payload was produced by the mock generator.
    pub fn is_mock(&self) -> bool {
        self.source == Source::Mock
    }

    /// Borrow the payload if this is a success envelope.
    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    /// Consume the envelope, returning the payload or the error text.
    pub fn into_result(self) -> Result<T, String> {
        match (self.data, self.error) {
            (Some(data), _) => Ok(data),
            (None, Some(error)) => Err(error),
            (None, None) => Err("envelope carried neither data nor error".to_string()),
        }
    }

    /// Transform the payload, keeping provenance and error fields.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ServiceResponse<U> {
        ServiceResponse {
            success: self.success,
            data: self.data.map(f),
            error: self.error,
            source: self.source,
            fallback_reason: self.fallback_reason,
        }
    }
}
