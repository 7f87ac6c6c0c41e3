//! A fixed-session `AuthProvider`.

use async_trait::async_trait;

use pulsoft_contracts::{
    error::{PulsoftError, PulsoftResult},
    remote::AuthUser,
};
use pulsoft_core::traits::AuthProvider;

/// An auth provider whose session never changes.
///
/// Used by the demo binary and by tests. Real deployments supply their own
/// `AuthProvider` backed by the identity service.
#[derive(Debug, Clone)]
pub struct StaticAuth {
    user: Option<AuthUser>,
    token: String,
}

impl StaticAuth {
    pub fn signed_in(uid: impl Into<String>, email: Option<String>, token: impl Into<String>) -> Self {
        Self {
            user: Some(AuthUser {
                uid: uid.into(),
                email,
            }),
            token: token.into(),
        }
    }

    pub fn signed_out() -> Self {
        Self {
            user: None,
            token: String::new(),
        }
    }
}

#[async_trait]
impl AuthProvider for StaticAuth {
    fn current_user(&self) -> Option<AuthUser> {
        self.user.clone()
    }

    async fn id_token(&self) -> PulsoftResult<String> {
        match &self.user {
            Some(_) => Ok(self.token.clone()),
            None => Err(PulsoftError::Unauthenticated {
                reason: "no user is signed in".to_string(),
            }),
        }
    }
}
