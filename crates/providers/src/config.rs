//! Provider configuration loaded from environment variables.

/// Configuration for the external generation services.
#[derive(Debug, Clone)]
pub struct ProvidersConfig {
    /// fal.ai queue API key, sent verbatim as the `Authorization` header.
    pub fal_api_key: String,
    /// fal.ai queue base URL (default: `https://queue.fal.run`).
    pub fal_base_url: String,
    /// OpenAI API key, sent as a bearer token.
    pub openai_api_key: String,
    /// OpenAI API base URL (default: `https://api.openai.com/v1`).
    pub openai_base_url: String,
    /// Chat model used for script generation and revision analysis.
    pub openai_model: String,
}

impl ProvidersConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var           | Default                     |
    /// |-------------------|-----------------------------|
    /// | `FAL_API_KEY`     | (required)                  |
    /// | `FAL_BASE_URL`    | `https://queue.fal.run`     |
    /// | `OPENAI_API_KEY`  | (required)                  |
    /// | `OPENAI_BASE_URL` | `https://api.openai.com/v1` |
    /// | `OPENAI_MODEL`    | `gpt-4-1106-preview`        |
    pub fn from_env() -> Self {
        let fal_api_key = std::env::var("FAL_API_KEY").expect("FAL_API_KEY must be set");

        let fal_base_url =
            std::env::var("FAL_BASE_URL").unwrap_or_else(|_| "https://queue.fal.run".into());

        let openai_api_key = std::env::var("OPENAI_API_KEY").expect("OPENAI_API_KEY must be set");

        let openai_base_url = std::env::var("OPENAI_BASE_URL")
            .unwrap_or_else(|_| "https://api.openai.com/v1".into());

        let openai_model =
            std::env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4-1106-preview".into());

        Self {
            fal_api_key,
            fal_base_url,
            openai_api_key,
            openai_base_url,
            openai_model,
        }
    }
}
