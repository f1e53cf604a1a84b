//! Envelope-aware client for the school REST backend.
//!
//! Every endpoint takes the session's `authCode` as a query parameter and
//! answers a `{success, data|message}` envelope. Any non-2xx status or
//! `success: false` is a source failure.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::instrument;

use crate::error::SourceError;
use crate::retry::{send_with_retry, RetryPolicy};

/// The backend's response envelope.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
}

/// Shared HTTP client for all backend source adapters.
#[derive(Clone)]
pub struct RestClient {
    client: reqwest::Client,
    base_url: String,
    auth_code: String,
    policy: RetryPolicy,
}

impl RestClient {
    pub fn new(base_url: &str, auth_code: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_code: auth_code.to_string(),
            policy: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// GET `path` with the session auth code and the given query pairs,
    /// unwrap the envelope, and decode `data`.
    #[instrument(skip(self, query), level = "debug")]
    pub async fn get_enveloped<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, SourceError> {
        let mut url = format!(
            "{}/{}?authCode={}",
            self.base_url,
            path.trim_start_matches('/'),
            urlencoding::encode(&self.auth_code),
        );
        for (key, value) in query {
            url.push_str(&format!("&{}={}", key, urlencoding::encode(value)));
        }

        let response = send_with_retry(&self.policy, || self.client.get(&url).send()).await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SourceError::Http {
                status: status.as_u16(),
                message,
            });
        }

        let envelope: Envelope<T> = response
            .json()
            .await
            .map_err(|e| SourceError::Decode(e.to_string()))?;

        if !envelope.success {
            return Err(SourceError::Rejected(
                envelope.message.unwrap_or_else(|| "unknown".to_string()),
            ));
        }

        envelope
            .data
            .ok_or_else(|| SourceError::Decode("missing data field".to_string()))
    }
}
