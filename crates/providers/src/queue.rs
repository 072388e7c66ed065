//! HTTP client for fal.ai's submit-and-poll queue API.
//!
//! Every media model hangs off the same queue: `POST {base}/{model}`
//! returns a `request_id`, then `GET {base}/{model}/requests/{id}/status`
//! reports `IN_QUEUE`, `IN_PROGRESS`, `COMPLETED`, or `FAILED`, and the
//! result body is fetched from `GET {base}/{model}/requests/{id}` once
//! the job completes.

use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;
use tokio::time::Instant;

use crate::error::ProviderError;

/// Poll cadence and wait budget for one class of queue job.
#[derive(Debug, Clone, Copy)]
pub struct PollConfig {
    /// Maximum wall-clock time to wait for the job to settle.
    pub budget: Duration,
    /// Delay between checks while the job is queued or running.
    pub busy_interval: Duration,
    /// Delay before rechecking after an unrecognized status or a failed
    /// status request.
    pub retry_interval: Duration,
}

impl PollConfig {
    /// Cadence for ordinary media jobs (image edits, music, loudnorm).
    pub const MEDIA: Self = Self {
        budget: Duration::from_secs(300),
        busy_interval: Duration::from_secs(10),
        retry_interval: Duration::from_secs(5),
    };

    /// Cadence for long render jobs (clip synthesis, composition,
    /// captioning).
    pub const RENDER: Self = Self {
        budget: Duration::from_secs(600),
        busy_interval: Duration::from_secs(10),
        retry_interval: Duration::from_secs(5),
    };

    /// Cadence for speech synthesis, which settles quickly.
    pub const SPEECH: Self = Self {
        budget: Duration::from_secs(120),
        busy_interval: Duration::from_secs(5),
        retry_interval: Duration::from_secs(3),
    };
}

/// Response returned when a job is accepted into the queue.
#[derive(Debug, Deserialize)]
struct SubmitResponse {
    /// Queue-assigned identifier for the job.
    request_id: String,
}

/// Outcome of a single status check.
enum PollStep {
    /// Job completed; carries the fetched result body.
    Done(Value),
    /// Job is still queued or running.
    Busy,
    /// Status was not one of the known values.
    Unsettled,
}

/// Client for one fal.ai queue deployment.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Clone)]
pub struct FalQueueClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl FalQueueClient {
    /// Create a client for the queue at `base_url`, authenticating every
    /// request with `api_key`.
    pub fn new(base_url: String, api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
            api_key,
        }
    }

    /// Submit a job and wait for its result.
    ///
    /// `submit_path` is the full model path including any action suffix;
    /// `poll_path` is the path the queue exposes request status under,
    /// which for some models drops the action suffix.
    pub async fn run(
        &self,
        submit_path: &str,
        poll_path: &str,
        payload: &Value,
        poll: PollConfig,
    ) -> Result<Value, ProviderError> {
        let request_id = self.submit(submit_path, payload).await?;
        self.await_result(poll_path, &request_id, poll).await
    }

    /// Submit a job, returning the queue-assigned request ID.
    pub async fn submit(
        &self,
        submit_path: &str,
        payload: &Value,
    ) -> Result<String, ProviderError> {
        let url = format!("{}/{}", self.base_url, submit_path);
        let response = self
            .client
            .post(&url)
            .header(reqwest::header::AUTHORIZATION, &self.api_key)
            .json(payload)
            .send()
            .await?;
        let accepted: SubmitResponse = Self::parse_response(response).await?;

        tracing::debug!(
            path = submit_path,
            request_id = %accepted.request_id,
            "Queued provider job",
        );
        Ok(accepted.request_id)
    }

    /// Poll a submitted job until it settles or the budget elapses.
    ///
    /// Transport errors during polling are logged and retried; a remote
    /// `FAILED` status ends the wait immediately.
    pub async fn await_result(
        &self,
        poll_path: &str,
        request_id: &str,
        poll: PollConfig,
    ) -> Result<Value, ProviderError> {
        let status_url = format!(
            "{}/{}/requests/{}/status",
            self.base_url, poll_path, request_id
        );
        let result_url = format!("{}/{}/requests/{}", self.base_url, poll_path, request_id);
        let started = Instant::now();

        loop {
            if started.elapsed() > poll.budget {
                return Err(ProviderError::Timeout {
                    request_id: request_id.to_string(),
                    budget_secs: poll.budget.as_secs(),
                });
            }

            match self.poll_once(&status_url, &result_url, request_id).await {
                Ok(PollStep::Done(result)) => return Ok(result),
                Ok(PollStep::Busy) => tokio::time::sleep(poll.busy_interval).await,
                Ok(PollStep::Unsettled) => tokio::time::sleep(poll.retry_interval).await,
                Err(err @ ProviderError::JobFailed { .. }) => return Err(err),
                Err(err) => {
                    tracing::warn!(
                        request_id,
                        error = %err,
                        "Status poll failed, will retry",
                    );
                    tokio::time::sleep(poll.retry_interval).await;
                }
            }
        }
    }

    /// Check the job's status once, fetching the result if it completed.
    async fn poll_once(
        &self,
        status_url: &str,
        result_url: &str,
        request_id: &str,
    ) -> Result<PollStep, ProviderError> {
        let status_body: Value = self.get_json(status_url).await?;
        let status = status_body
            .get("status")
            .and_then(Value::as_str)
            .unwrap_or("");

        tracing::debug!(request_id, status, "Queue job status");

        match status {
            "COMPLETED" => Ok(PollStep::Done(self.get_json(result_url).await?)),
            "FAILED" => Err(ProviderError::JobFailed {
                request_id: request_id.to_string(),
                detail: status_body.to_string(),
            }),
            "IN_PROGRESS" | "IN_QUEUE" => Ok(PollStep::Busy),
            _ => Ok(PollStep::Unsettled),
        }
    }

    async fn get_json(&self, url: &str) -> Result<Value, ProviderError> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::AUTHORIZATION, &self.api_key)
            .send()
            .await?;
        Self::parse_response(response).await
    }

    /// Parse a successful JSON response body, or surface the status and
    /// body text on a non-2xx response.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ProviderError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(ProviderError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json::<T>().await?)
    }
}

/// Pluck a string out of a queue result by JSON pointer.
///
/// Result shapes vary per model (`/images/0/url`, `/video/url`,
/// `/video_url`, `/audio/url`), so extraction is left to each caller.
pub fn result_str(result: &Value, pointer: &str) -> Result<String, ProviderError> {
    result
        .pointer(pointer)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| ProviderError::Malformed(format!("missing `{pointer}` in queue result")))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
