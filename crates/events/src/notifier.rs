//! Outbound callbacks to the chat frontend, with retry.
//!
//! When a run finishes, the frontend is told over plain HTTP: a JSON
//! payload POSTed to the configured callback URL. Failed attempts are
//! retried with exponential backoff (1 s, 2 s, 4 s) before giving up.
//! Callback failures never fail the run that triggered them; that policy
//! lives with the callers.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use reelgen_core::types::DbId;

/// Retry delays in seconds (exponential backoff: 1s, 2s, 4s).
const RETRY_DELAYS_SECS: [u64; 3] = [1, 2, 4];

/// HTTP request timeout for a single delivery attempt.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Callback endpoints loaded from environment variables.
#[derive(Debug, Clone)]
pub struct CallbackConfig {
    /// URL receiving completion callbacks.
    pub completion_url: String,
    /// URL receiving failure callbacks.
    pub failure_url: String,
}

impl CallbackConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var              | Default                 |
    /// |----------------------|-------------------------|
    /// | `CALLBACK_URL`       | (required)              |
    /// | `CALLBACK_ERROR_URL` | value of `CALLBACK_URL` |
    pub fn from_env() -> Self {
        let completion_url = std::env::var("CALLBACK_URL").expect("CALLBACK_URL must be set");
        let failure_url =
            std::env::var("CALLBACK_ERROR_URL").unwrap_or_else(|_| completion_url.clone());
        Self {
            completion_url,
            failure_url,
        }
    }
}

// ---------------------------------------------------------------------------
// Notices
// ---------------------------------------------------------------------------

/// Data carried by a completion callback.
#[derive(Debug, Clone, Serialize)]
pub struct CompletionNotice {
    /// For revisions, the replacement artifact's identifier rather than
    /// the original video's.
    pub video_id: DbId,
    pub chat_id: String,
    pub user_id: String,
    pub video_url: String,
    pub is_revision: bool,
}

/// Data carried by a failure callback.
#[derive(Debug, Clone, Serialize)]
pub struct FailureNotice {
    pub video_id: DbId,
    pub chat_id: String,
    pub user_id: String,
    pub error: String,
}

// ---------------------------------------------------------------------------
// Notifier
// ---------------------------------------------------------------------------

/// Error type for callback delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The remote server returned a non-2xx status code.
    #[error("Callback returned HTTP {0}")]
    HttpStatus(u16),
}

/// Delivers run outcomes to the frontend.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Tell the frontend a run produced a finished video.
    async fn notify_completion(&self, notice: &CompletionNotice) -> Result<(), NotifyError>;

    /// Tell the frontend a run failed for good.
    async fn notify_failure(&self, notice: &FailureNotice) -> Result<(), NotifyError>;
}

/// HTTP implementation of [`Notifier`].
pub struct WebhookNotifier {
    client: reqwest::Client,
    config: CallbackConfig,
}

impl WebhookNotifier {
    /// Create a notifier with a pre-configured HTTP client.
    pub fn new(config: CallbackConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build reqwest HTTP client");
        Self { client, config }
    }

    /// Deliver a payload to `url` with retry.
    ///
    /// Retries up to 3 times with exponential backoff before giving up.
    /// Returns `Ok(())` on the first successful attempt.
    async fn deliver(&self, url: &str, payload: &serde_json::Value) -> Result<(), NotifyError> {
        let mut last_err: Option<NotifyError> = None;

        for (attempt, delay_secs) in RETRY_DELAYS_SECS.iter().enumerate() {
            match self.try_send(url, payload).await {
                Ok(()) => return Ok(()),
                Err(e) => {
                    tracing::warn!(
                        attempt = attempt + 1,
                        url,
                        error = %e,
                        "Callback delivery attempt failed, retrying"
                    );
                    last_err = Some(e);
                    tokio::time::sleep(Duration::from_secs(*delay_secs)).await;
                }
            }
        }

        // Final attempt after the last backoff.
        match self.try_send(url, payload).await {
            Ok(()) => Ok(()),
            Err(e) => {
                tracing::error!(url, error = %e, "Callback delivery failed after all retries");
                Err(last_err.unwrap_or(e))
            }
        }
    }

    /// Execute a single POST request and check the response status.
    async fn try_send(&self, url: &str, payload: &serde_json::Value) -> Result<(), NotifyError> {
        let response = self.client.post(url).json(payload).send().await?;
        if !response.status().is_success() {
            return Err(NotifyError::HttpStatus(response.status().as_u16()));
        }
        Ok(())
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify_completion(&self, notice: &CompletionNotice) -> Result<(), NotifyError> {
        let payload = serde_json::json!({
            "video_id": notice.video_id,
            "chat_id": notice.chat_id,
            "user_id": notice.user_id,
            "video_url": notice.video_url,
            "is_revision": notice.is_revision,
        });
        self.deliver(&self.config.completion_url, &payload).await
    }

    async fn notify_failure(&self, notice: &FailureNotice) -> Result<(), NotifyError> {
        let payload = serde_json::json!({
            "video_id": notice.video_id,
            "chat_id": notice.chat_id,
            "user_id": notice.user_id,
            "error": notice.error,
            "status": "failed",
        });
        self.deliver(&self.config.failure_url, &payload).await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
