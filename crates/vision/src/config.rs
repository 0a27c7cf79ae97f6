//! Vision service configuration.

/// Default model name sent in each request.
const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Default per-request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct VisionConfig {
    /// Base URL of the OpenAI-compatible API, e.g. `https://api.openai.com/v1`.
    pub api_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub timeout_secs: u64,
}

impl VisionConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` if `VISION_API_URL` is not set, which disables video
    /// validation.
    ///
    /// | Variable              | Required | Default       |
    /// |-----------------------|----------|---------------|
    /// | `VISION_API_URL`      | yes      | —             |
    /// | `VISION_API_KEY`      | no       | —             |
    /// | `VISION_MODEL`        | no       | `gpt-4o-mini` |
    /// | `VISION_TIMEOUT_SECS` | no       | `30`          |
    pub fn from_env() -> Option<Self> {
        let api_url = std::env::var("VISION_API_URL").ok()?;
        Some(Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            api_key: std::env::var("VISION_API_KEY").ok().filter(|k| !k.is_empty()),
            model: std::env::var("VISION_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            timeout_secs: std::env::var("VISION_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
        })
    }
}
