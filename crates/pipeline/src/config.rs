//! Pipeline behavior configuration.

use std::str::FromStr;

/// What to do when a single scene's voiceover synthesis fails.
///
/// Clip synthesis is always all-or-nothing, but narration is allowed to
/// degrade by default: a silent segment is preferable to losing the whole
/// run over one audio track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VoiceoverFailurePolicy {
    /// Record an empty reference for the failed scene and keep going;
    /// that segment plays without narration.
    #[default]
    AllowPartial,
    /// Fail the run on the first voiceover failure.
    FailFast,
}

impl FromStr for VoiceoverFailurePolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "allow_partial" => Ok(Self::AllowPartial),
            "fail_fast" => Ok(Self::FailFast),
            other => Err(format!("unknown voiceover failure policy: {other}")),
        }
    }
}

/// Pipeline settings loaded from environment variables.
#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    pub voiceover_failure_policy: VoiceoverFailurePolicy,
}

impl PipelineConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var                    | Default         |
    /// |----------------------------|-----------------|
    /// | `VOICEOVER_FAILURE_POLICY` | `allow_partial` |
    pub fn from_env() -> Self {
        let voiceover_failure_policy = std::env::var("VOICEOVER_FAILURE_POLICY")
            .unwrap_or_else(|_| "allow_partial".to_string())
            .parse()
            .expect("VOICEOVER_FAILURE_POLICY must be allow_partial or fail_fast");
        Self {
            voiceover_failure_policy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_parses_known_values() {
        assert_eq!(
            "allow_partial".parse::<VoiceoverFailurePolicy>().unwrap(),
            VoiceoverFailurePolicy::AllowPartial
        );
        assert_eq!(
            "fail_fast".parse::<VoiceoverFailurePolicy>().unwrap(),
            VoiceoverFailurePolicy::FailFast
        );
        assert!("best_effort".parse::<VoiceoverFailurePolicy>().is_err());
    }

    #[test]
    fn default_policy_allows_partial_narration() {
        assert_eq!(
            PipelineConfig::default().voiceover_failure_policy,
            VoiceoverFailurePolicy::AllowPartial
        );
    }
}
