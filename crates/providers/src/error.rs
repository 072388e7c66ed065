//! Error type shared by all provider clients.

/// Errors from the external generation services.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service returned a non-2xx status code.
    #[error("Provider API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The remote job reported a terminal `FAILED` status.
    #[error("Request {request_id} failed: {detail}")]
    JobFailed {
        /// Queue-assigned request identifier.
        request_id: String,
        /// Status payload returned with the failure.
        detail: String,
    },

    /// The wait budget elapsed before the remote job settled.
    #[error("Request {request_id} timed out after {budget_secs}s")]
    Timeout {
        /// Queue-assigned request identifier.
        request_id: String,
        /// Budget that was exhausted, in seconds.
        budget_secs: u64,
    },

    /// The response arrived but did not have the expected shape.
    #[error("Malformed provider response: {0}")]
    Malformed(String),
}
