//! Retry with exponential back-off and jitter for the Shopify client.
//!
//! [`retry_with_backoff`] wraps any fallible async operation and retries on
//! transient errors (network failures, 5xx, 429 rate limits). Everything
//! else is surfaced immediately: a sync pass treats upstream failure as
//! fatal, so there is no point hammering a broken credential or a payload
//! the client cannot parse.

use std::future::Future;
use std::time::Duration;

use crate::error::ShopifyError;

/// Returns `true` for errors worth retrying after a back-off delay.
///
/// **Retriable:**
/// - Network-level failures: timeout, connection reset.
/// - HTTP 5xx responses and 429 (Shopify's REST rate limit answer).
///
/// **Not retriable (hard stop):**
/// - Other HTTP statuses — 401/403 mean a bad credential, 404 a bad shop.
/// - [`ShopifyError::Deserialize`] — malformed response; retrying won't fix it.
/// - [`ShopifyError::InvalidBaseUrl`] — construction-time configuration error.
pub(crate) fn is_retriable(err: &ShopifyError) -> bool {
    match err {
        ShopifyError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        ShopifyError::Status { status, .. } => *status == 429 || *status >= 500,
        ShopifyError::Deserialize { .. } | ShopifyError::InvalidBaseUrl(_) => false,
    }
}

/// Runs `operation` with up to `max_retries` additional attempts on transient
/// errors. Delay doubles per attempt from `backoff_base_ms`, with ±25% jitter,
/// capped at 60 s. Non-retriable errors are returned immediately.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, ShopifyError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ShopifyError>>,
{
    const MAX_DELAY_MS: u64 = 60_000;
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;
                let computed = backoff_base_ms.saturating_mul(1u64 << (attempt - 1).min(10));
                let capped = computed.min(MAX_DELAY_MS);
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let delay_ms = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "Shopify transient error — retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deserialize_err() -> ShopifyError {
        let src = serde_json::from_str::<()>("invalid").unwrap_err();
        ShopifyError::Deserialize {
            context: "test".to_owned(),
            source: src,
        }
    }

    #[test]
    fn rate_limit_status_is_retriable() {
        assert!(is_retriable(&ShopifyError::Status {
            status: 429,
            body: "throttled".to_owned()
        }));
    }

    #[test]
    fn server_error_status_is_retriable() {
        assert!(is_retriable(&ShopifyError::Status {
            status: 503,
            body: String::new()
        }));
    }

    #[test]
    fn auth_failure_is_not_retriable() {
        assert!(!is_retriable(&ShopifyError::Status {
            status: 401,
            body: "bad token".to_owned()
        }));
    }

    #[test]
    fn deserialize_error_is_not_retriable() {
        assert!(!is_retriable(&deserialize_err()));
    }

    #[tokio::test]
    async fn returns_first_success() {
        let mut calls = 0u32;
        let result = retry_with_backoff(3, 1, || {
            calls += 1;
            async { Ok::<_, ShopifyError>(42) }
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn retries_transient_then_succeeds() {
        let mut calls = 0u32;
        let result = retry_with_backoff(3, 1, || {
            calls += 1;
            let fail = calls < 3;
            async move {
                if fail {
                    Err(ShopifyError::Status {
                        status: 500,
                        body: String::new(),
                    })
                } else {
                    Ok(7)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls, 3);
    }

    #[tokio::test]
    async fn does_not_retry_non_transient() {
        let mut calls = 0u32;
        let result: Result<(), _> = retry_with_backoff(3, 1, || {
            calls += 1;
            async { Err(deserialize_err()) }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls, 1);
    }
}
