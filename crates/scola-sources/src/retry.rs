//! Retry with exponential backoff for backend fetches.
//!
//! Transient failures are retried: timeouts, connection errors, 5xx, 429
//! and 408. Client errors (including 401/403) are permanent and returned
//! immediately.

use std::future::Future;
use std::time::Duration;

use reqwest::{Response, StatusCode};

/// Backoff policy for one adapter's requests.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retry attempts after the initial request.
    pub max_retries: u32,
    /// Delay before the first retry; doubles each attempt.
    pub initial_delay: Duration,
    /// Upper bound on the per-attempt delay.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(5000),
        }
    }
}

impl RetryPolicy {
    /// No retries at all; the initial request is the only attempt.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let factor = 2u64.saturating_pow(attempt);
        let delay_ms = (self.initial_delay.as_millis() as u64).saturating_mul(factor);
        Duration::from_millis(delay_ms.min(self.max_delay.as_millis() as u64))
    }
}

/// Whether a transport-level error is worth another attempt.
pub fn is_transient_error(error: &reqwest::Error) -> bool {
    if error.is_timeout() || error.is_connect() {
        return true;
    }
    if error.is_request() {
        return false;
    }
    error.status().map(is_transient_status).unwrap_or(false)
}

/// Whether a status code is worth another attempt.
pub fn is_transient_status(status: StatusCode) -> bool {
    status.is_server_error()
        || status == StatusCode::TOO_MANY_REQUESTS
        || status == StatusCode::REQUEST_TIMEOUT
}

/// Run `operation` until it yields a non-transient outcome or the policy is
/// exhausted. The last response or error is returned either way; callers
/// still have to inspect the status.
pub async fn send_with_retry<F, Fut>(
    policy: &RetryPolicy,
    operation: F,
) -> Result<Response, reqwest::Error>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<Response, reqwest::Error>>,
{
    let mut last_error = None;

    for attempt in 0..=policy.max_retries {
        if attempt > 0 {
            let delay = policy.delay_for_attempt(attempt - 1);
            tracing::debug!(attempt, ?delay, "Retrying backend request");
            tokio::time::sleep(delay).await;
        }

        match operation().await {
            Ok(response) => {
                if is_transient_status(response.status()) && attempt < policy.max_retries {
                    tracing::warn!(
                        status = %response.status(),
                        attempt,
                        "Backend returned transient status"
                    );
                    continue;
                }
                return Ok(response);
            }
            Err(e) => {
                if !is_transient_error(&e) {
                    return Err(e);
                }
                tracing::warn!(attempt, error = %e, "Transient backend error");
                last_error = Some(e);
            }
        }
    }

    // Only reachable when every attempt produced a transport error.
    match last_error {
        Some(e) => Err(e),
        None => unreachable!("retry loop exits early on every non-error path"),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_delay_doubles_and_caps() {
        let policy = RetryPolicy {
            max_retries: 10,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(1000),
        };

        assert_eq!(policy.delay_for_attempt(0), Duration::from_millis(100));
        assert_eq!(policy.delay_for_attempt(1), Duration::from_millis(200));
        assert_eq!(policy.delay_for_attempt(2), Duration::from_millis(400));
        assert_eq!(policy.delay_for_attempt(4), Duration::from_millis(1000));
        assert_eq!(policy.delay_for_attempt(10), Duration::from_millis(1000));
    }

    #[test]
    fn test_transient_status_table() {
        assert!(is_transient_status(StatusCode::INTERNAL_SERVER_ERROR));
        assert!(is_transient_status(StatusCode::BAD_GATEWAY));
        assert!(is_transient_status(StatusCode::SERVICE_UNAVAILABLE));
        assert!(is_transient_status(StatusCode::TOO_MANY_REQUESTS));
        assert!(is_transient_status(StatusCode::REQUEST_TIMEOUT));

        assert!(!is_transient_status(StatusCode::BAD_REQUEST));
        assert!(!is_transient_status(StatusCode::UNAUTHORIZED));
        assert!(!is_transient_status(StatusCode::FORBIDDEN));
        assert!(!is_transient_status(StatusCode::NOT_FOUND));
        assert!(!is_transient_status(StatusCode::OK));
    }

    #[tokio::test]
    async fn test_retries_until_success() {
        let mock_server = MockServer::start().await;

        // First two attempts fail, third succeeds.
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .up_to_n_times(2)
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&mock_server)
            .await;

        let client = reqwest::Client::new();
        let url = mock_server.uri();
        let policy = RetryPolicy {
            max_retries: 3,
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(2),
        };

        let response = send_with_retry(&policy, || client.get(&url).send())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_client_error_not_retried() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = reqwest::Client::new();
        let url = mock_server.uri();
        let response = send_with_retry(&RetryPolicy::default(), || client.get(&url).send())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_exhausted_retries_return_last_response() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .expect(3)
            .mount(&mock_server)
            .await;

        let client = reqwest::Client::new();
        let url = mock_server.uri();
        let policy = RetryPolicy {
            max_retries: 2,
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(2),
        };

        let response = send_with_retry(&policy, || client.get(&url).send())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
