//! Base HTTP client with shared logic

use crate::constants::{ERROR_BODY_LIMIT, REQUEST_TIMEOUT_SECS};
use crate::infrastructure::model::retry::RetryPolicy;
use crate::infrastructure::model::types::ModelError;
use reqwest::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// How the API key is attached to requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScheme {
    /// `Authorization: Bearer <key>`
    Bearer,
    /// `x-goog-api-key: <key>`
    GoogleApiKey,
}

/// Base HTTP client with shared functionality
#[derive(Clone)]
pub struct HttpClientBase {
    pub id: String,
    pub endpoint: String,
    pub api_key: Option<String>,
    pub http: Client,
    pub retry: RetryPolicy,
}

impl HttpClientBase {
    pub fn new(id: String, endpoint: String, api_key: Option<String>) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            id,
            endpoint,
            api_key,
            http,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Build URL from endpoint and path
    pub fn build_url(&self, path: &str) -> String {
        let base = self.endpoint.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{base}/{path}")
    }

    /// Post JSON with the given auth scheme, retrying rate limits.
    pub async fn post_json<Req, Res>(
        &self,
        url: &str,
        body: &Req,
        auth: AuthScheme,
    ) -> Result<Res, ModelError>
    where
        Req: Serialize + Sync,
        Res: DeserializeOwned,
    {
        let api_key = self.require_api_key()?;
        self.retry
            .run(&self.id, || self.post_once(url, body, auth, api_key))
            .await
    }

    async fn post_once<Req, Res>(
        &self,
        url: &str,
        body: &Req,
        auth: AuthScheme,
        api_key: &str,
    ) -> Result<Res, ModelError>
    where
        Req: Serialize + Sync,
        Res: DeserializeOwned,
    {
        let request = self
            .http
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .json(body);
        let request = match auth {
            AuthScheme::Bearer => request.bearer_auth(api_key),
            AuthScheme::GoogleApiKey => request.header("x-goog-api-key", api_key),
        };

        let response = request
            .send()
            .await
            .map_err(|e| ModelError::network(&self.id, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let body: String = body.chars().take(ERROR_BODY_LIMIT).collect();
            return Err(ModelError::status(&self.id, status, body));
        }

        response
            .json()
            .await
            .map_err(|e| ModelError::invalid_response(&self.id, e.to_string()))
    }

    /// Download raw bytes (used for providers that answer with image URLs)
    pub async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, ModelError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| ModelError::network(&self.id, e))?;
        let status = response.status();
        if !status.is_success() {
            return Err(ModelError::status(&self.id, status, "image download failed"));
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ModelError::network(&self.id, e))?;
        Ok(bytes.to_vec())
    }

    fn require_api_key(&self) -> Result<&str, ModelError> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| ModelError::missing_api_key(&self.id))
    }
}
