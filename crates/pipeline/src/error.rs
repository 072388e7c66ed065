use reelgen_db::StoreError;
use reelgen_providers::ProviderError;

/// Errors surfaced by a pipeline run.
///
/// The scheduler consults [`PipelineError::is_retryable`] to decide
/// whether a failed attempt gets another one: capability call failures
/// and transient persistence errors do, malformed capability output and
/// state conflicts do not.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// An external capability call failed, timed out, or returned
    /// output that could not be parsed.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// A Job Store read or write failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A capability's output or an entity's data violated an invariant.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The run was requested against an entity in an incompatible status.
    #[error("Invalid state: {0}")]
    State(String),
}

impl PipelineError {
    /// Whether the scheduler should retry the run after this error.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Provider(ProviderError::Malformed(_)) => false,
            Self::Provider(_) => true,
            Self::Store(StoreError::NotFound { .. }) => false,
            Self::Store(_) => true,
            Self::Validation(_) | Self::State(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn provider_call_failures_are_retryable() {
        let err = PipelineError::Provider(ProviderError::Timeout {
            request_id: "req-1".into(),
            budget_secs: 300,
        });
        assert!(err.is_retryable());

        let err = PipelineError::Provider(ProviderError::JobFailed {
            request_id: "req-2".into(),
            detail: "worker crashed".into(),
        });
        assert!(err.is_retryable());
    }

    #[test]
    fn malformed_provider_output_is_not_retryable() {
        let err = PipelineError::Provider(ProviderError::Malformed("no JSON object".into()));
        assert!(!err.is_retryable());
    }

    #[test]
    fn validation_and_state_are_not_retryable() {
        assert!(!PipelineError::Validation("bad script".into()).is_retryable());
        assert!(!PipelineError::State("not completed".into()).is_retryable());
    }

    #[test]
    fn missing_entity_is_not_retryable() {
        let err = PipelineError::Store(StoreError::NotFound {
            entity: "video",
            id: Uuid::new_v4(),
        });
        assert!(!err.is_retryable());
    }
}
