//! HTTP client for an OpenAI-compatible chat-completions endpoint.

use std::time::Duration;

use fitback_core::video_validation::{parse_frame_reply, FrameAnalysis, FrameParseError};
use serde::Deserialize;

use crate::config::VisionConfig;

/// Instructions sent with every frame. The reply must contain one JSON object.
pub const FRAME_PROMPT: &str = "You are checking one still frame from a clothing try-on video. \
Answer with a single JSON object and nothing else, using exactly these keys: \
\"hasHuman\" (a person is visible), \"hasGarment\" (a worn garment is clearly visible), \
\"hasFace\" (a face is visible), \"hasOcclusion\" (the garment is substantially blocked), \
\"hasBlur\" (the frame is too blurry to judge fit), \"hasNoise\" (the frame is too dark or noisy), \
all booleans, and \"reasons\" (an array of short strings explaining any problem).";

#[derive(Debug, thiserror::Error)]
pub enum VisionError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service returned a non-2xx status code.
    #[error("Vision API error ({status}): {body}")]
    ApiError { status: u16, body: String },

    /// The completion had no message content.
    #[error("Vision API returned an empty reply")]
    EmptyReply,

    /// The reply could not be read as a frame verdict.
    #[error("Unreadable frame verdict: {0}")]
    Parse(#[from] FrameParseError),

    /// Every frame failed, so there is nothing to aggregate.
    #[error("No frame could be analyzed: {0}")]
    NoFramesAnalyzed(String),
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Turn a bare base64 payload into a data URL; pass data URLs through.
pub fn frame_data_url(frame: &str) -> String {
    if frame.starts_with("data:") {
        frame.to_string()
    } else {
        format!("data:image/jpeg;base64,{frame}")
    }
}

pub struct VisionClient {
    client: reqwest::Client,
    config: VisionConfig,
}

impl VisionClient {
    pub fn new(config: VisionConfig) -> Result<Self, VisionError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    fn request_body(&self, frame: &str) -> serde_json::Value {
        serde_json::json!({
            "model": self.config.model,
            "temperature": 0,
            "messages": [{
                "role": "user",
                "content": [
                    { "type": "text", "text": FRAME_PROMPT },
                    { "type": "image_url", "image_url": { "url": frame_data_url(frame) } },
                ],
            }],
        })
    }

    /// Ask the model about one frame and parse its verdict.
    pub async fn analyze_frame(&self, frame: &str) -> Result<FrameAnalysis, VisionError> {
        let mut request = self
            .client
            .post(format!("{}/chat/completions", self.config.api_url))
            .json(&self.request_body(frame));
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(VisionError::ApiError {
                status: status.as_u16(),
                body,
            });
        }

        let completion: ChatCompletion = response.json().await?;
        let reply = completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(VisionError::EmptyReply)?;

        Ok(parse_frame_reply(&reply)?)
    }
}
