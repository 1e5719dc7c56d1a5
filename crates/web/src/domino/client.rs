//! Domino REST API client.

use std::collections::BTreeSet;
use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::instrument;
use url::Url;

use super::types::{DominoJob, DominoLead, DominoShop, ListResponse, RecordCategory};
use super::DominoError;
use crate::models::DominoIntegration;

/// Header carrying the API key.
const API_KEY_HEADER: &str = "X-Domino-Api-Key";

/// Per-request timeout; this is also the only deadline a sync run has.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Domino REST API client.
///
/// Cheap to clone; one instance is built per integration, carrying that
/// integration's base URL and credential.
#[derive(Clone)]
pub struct DominoClient {
    inner: Arc<DominoClientInner>,
}

struct DominoClientInner {
    http: reqwest::Client,
    base_url: Url,
    api_key: SecretString,
}

impl std::fmt::Debug for DominoClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DominoClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("api_key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl DominoClient {
    /// Create a client for a base URL and API key.
    ///
    /// # Errors
    ///
    /// Returns `DominoError::Http` if the HTTP client cannot be built.
    pub fn new(base_url: Url, api_key: SecretString) -> Result<Self, DominoError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            inner: Arc::new(DominoClientInner {
                http,
                base_url: ensure_trailing_slash(base_url),
                api_key,
            }),
        })
    }

    /// Create a client for one integration's endpoint and credential.
    ///
    /// # Errors
    ///
    /// Returns `DominoError::Http` if the HTTP client cannot be built.
    pub fn for_integration(integration: &DominoIntegration) -> Result<Self, DominoError> {
        Self::new(integration.base_url.clone(), integration.api_key.clone())
    }

    /// Fetch job postings whose status is in `filter`.
    ///
    /// # Errors
    ///
    /// Returns `DominoError` on transport failure or a non-success status.
    #[instrument(skip(self, filter))]
    pub async fn fetch_jobs(
        &self,
        filter: &BTreeSet<String>,
    ) -> Result<Vec<DominoJob>, DominoError> {
        self.get_list(RecordCategory::Jobs, filter).await
    }

    /// Fetch candidate leads whose status is in `filter`.
    ///
    /// # Errors
    ///
    /// Returns `DominoError` on transport failure or a non-success status.
    #[instrument(skip(self, filter))]
    pub async fn fetch_leads(
        &self,
        filter: &BTreeSet<String>,
    ) -> Result<Vec<DominoLead>, DominoError> {
        self.get_list(RecordCategory::Leads, filter).await
    }

    /// Fetch shop records whose status is in `filter`.
    ///
    /// # Errors
    ///
    /// Returns `DominoError` on transport failure or a non-success status.
    #[instrument(skip(self, filter))]
    pub async fn fetch_shops(
        &self,
        filter: &BTreeSet<String>,
    ) -> Result<Vec<DominoShop>, DominoError> {
        self.get_list(RecordCategory::Shops, filter).await
    }

    async fn get_list<T: DeserializeOwned>(
        &self,
        category: RecordCategory,
        filter: &BTreeSet<String>,
    ) -> Result<Vec<T>, DominoError> {
        let url = list_url(&self.inner.base_url, category, filter)?;
        let response = self
            .inner
            .http
            .get(url)
            .header(API_KEY_HEADER, self.inner.api_key.expose_secret())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(DominoError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: ListResponse<T> = response.json().await?;
        Ok(body.data)
    }
}

/// `Url::join` treats a base without a trailing slash as a file and would
/// drop its last path segment.
fn ensure_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        url.set_path(&format!("{}/", url.path()));
    }
    url
}

/// Build the list URL for a category, with the status filter as a
/// comma-separated query parameter.
fn list_url(
    base_url: &Url,
    category: RecordCategory,
    filter: &BTreeSet<String>,
) -> Result<Url, DominoError> {
    let mut url = base_url.join(&format!("v1/{category}"))?;
    if !filter.is_empty() {
        let statuses = filter.iter().cloned().collect::<Vec<_>>().join(",");
        url.query_pairs_mut().append_pair("status", &statuses);
    }
    Ok(url)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_list_url_without_filter() {
        let base = ensure_trailing_slash(Url::parse("https://api.domino.example").unwrap());
        let url = list_url(&base, RecordCategory::Jobs, &BTreeSet::new()).unwrap();
        assert_eq!(url.as_str(), "https://api.domino.example/v1/jobs");
    }

    #[test]
    fn test_list_url_with_filter() {
        let base = ensure_trailing_slash(Url::parse("https://api.domino.example").unwrap());
        let filter: BTreeSet<String> = ["trial".to_owned(), "active".to_owned()].into();
        let url = list_url(&base, RecordCategory::Shops, &filter).unwrap();
        // Set order makes the parameter deterministic
        assert_eq!(
            url.as_str(),
            "https://api.domino.example/v1/shops?status=active%2Ctrial"
        );
    }

    #[test]
    fn test_base_url_path_is_preserved() {
        let base = ensure_trailing_slash(Url::parse("https://domino.example/api").unwrap());
        let url = list_url(&base, RecordCategory::Leads, &BTreeSet::new()).unwrap();
        assert_eq!(url.as_str(), "https://domino.example/api/v1/leads");
    }
}
