//! Sign-in via the external identity provider.
//!
//! Itadaki does not verify credentials itself. The login form posts an
//! identity assertion issued by the provider; this service sends it to the
//! provider's verification endpoint and, on success, matches the asserted
//! email against an active local user. The provider is a black box
//! consumed through that one documented endpoint.

use secrecy::SecretString;
use serde::Deserialize;
use sqlx::PgPool;
use tracing::instrument;
use url::Url;

use itadaki_core::{Email, UserStatus};

use crate::config::AuthConfig;
use crate::db::{RepositoryError, UserRepository};
use crate::models::CurrentUser;

/// Per-request timeout for the verification call.
const VERIFY_TIMEOUT_SECS: u64 = 10;

/// Errors from the sign-in flow.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No identity provider is configured on this deployment.
    #[error("login is not configured")]
    NotConfigured,

    /// The provider refused the assertion.
    #[error("identity assertion rejected")]
    AssertionRejected,

    /// The provider could not be reached or answered garbage.
    #[error("identity provider error: {0}")]
    Provider(String),

    /// The asserted email does not belong to an active user.
    #[error("unknown or inactive user")]
    UnknownUser,

    /// Local lookup failed.
    #[error("database error: {0}")]
    Database(#[from] RepositoryError),
}

/// Identity asserted and verified by the external provider.
#[derive(Debug, Clone)]
pub struct VerifiedIdentity {
    /// The verified email address, normalized.
    pub email: Email,
}

/// Raw verification response; the email is re-parsed so a sloppy provider
/// payload cannot bypass normalization.
#[derive(Debug, Deserialize)]
struct VerifyResponse {
    email: String,
}

/// The external identity provider, as configured for this deployment.
#[derive(Debug)]
pub enum IdentityProvider {
    /// Verify assertions against the provider's HTTP endpoint.
    Http(HttpIdentityVerifier),
    /// No provider configured; every sign-in attempt is refused.
    Disabled,
}

impl IdentityProvider {
    /// Build the provider from configuration.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be created, which does not happen
    /// with a standard TLS configuration.
    #[must_use]
    pub fn from_config(auth: &AuthConfig) -> Self {
        auth.verify_url.clone().map_or(Self::Disabled, |verify_url| {
            Self::Http(HttpIdentityVerifier::new(verify_url))
        })
    }

    /// Verify an identity assertion with the provider.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NotConfigured` when no provider is set up,
    /// `AuthError::AssertionRejected` when the provider refuses the
    /// assertion, and `AuthError::Provider` on transport failures.
    pub async fn verify(&self, assertion: &SecretString) -> Result<VerifiedIdentity, AuthError> {
        match self {
            Self::Http(verifier) => verifier.verify(assertion).await,
            Self::Disabled => Err(AuthError::NotConfigured),
        }
    }
}

/// HTTP-backed assertion verifier.
pub struct HttpIdentityVerifier {
    http: reqwest::Client,
    verify_url: Url,
}

impl std::fmt::Debug for HttpIdentityVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpIdentityVerifier")
            .field("verify_url", &self.verify_url.as_str())
            .finish_non_exhaustive()
    }
}

impl HttpIdentityVerifier {
    /// Create a verifier for the provider's verification endpoint.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be created, which does not happen
    /// with a standard TLS configuration.
    #[must_use]
    pub fn new(verify_url: Url) -> Self {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(VERIFY_TIMEOUT_SECS))
            .build()
            .expect("Failed to create HTTP client");
        Self { http, verify_url }
    }

    async fn verify(&self, assertion: &SecretString) -> Result<VerifiedIdentity, AuthError> {
        use secrecy::ExposeSecret;

        let response = self
            .http
            .post(self.verify_url.clone())
            .json(&serde_json::json!({ "assertion": assertion.expose_secret() }))
            .send()
            .await
            .map_err(|e| AuthError::Provider(e.to_string()))?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Err(AuthError::AssertionRejected);
        }
        if !response.status().is_success() {
            return Err(AuthError::Provider(format!(
                "verification endpoint returned {}",
                response.status()
            )));
        }

        let body = response
            .json::<VerifyResponse>()
            .await
            .map_err(|e| AuthError::Provider(e.to_string()))?;
        let email = Email::parse(&body.email)
            .map_err(|e| AuthError::Provider(format!("provider returned invalid email: {e}")))?;
        Ok(VerifiedIdentity { email })
    }
}

/// Sign a user in: verify the assertion, match an active local user, and
/// record the login.
///
/// # Errors
///
/// Returns `AuthError::UnknownUser` for both unknown and inactive users, so
/// the response does not reveal which one it was.
#[instrument(skip_all)]
pub async fn login(
    pool: &PgPool,
    provider: &IdentityProvider,
    assertion: &SecretString,
) -> Result<CurrentUser, AuthError> {
    let identity = provider.verify(assertion).await?;

    let repo = UserRepository::new(pool);
    let user = repo
        .get_by_email(&identity.email)
        .await?
        .ok_or(AuthError::UnknownUser)?;

    if user.status != UserStatus::Active {
        tracing::warn!(user_id = %user.id, "sign-in refused for inactive user");
        return Err(AuthError::UnknownUser);
    }

    repo.record_login(user.id).await?;
    tracing::info!(user_id = %user.id, "user signed in");

    Ok(CurrentUser::from(&user))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_disabled_provider_refuses_login() {
        let provider = IdentityProvider::from_config(&AuthConfig { verify_url: None });
        let result = provider.verify(&SecretString::from("token")).await;
        assert!(matches!(result, Err(AuthError::NotConfigured)));
    }

    #[test]
    fn test_configured_provider_is_http() {
        #[allow(clippy::unwrap_used)]
        let url = Url::parse("https://auth.example/verify").unwrap();
        let provider = IdentityProvider::from_config(&AuthConfig {
            verify_url: Some(url),
        });
        assert!(matches!(provider, IdentityProvider::Http(_)));
    }
}
