//! LLM Invocation
//!
//! One outbound chat-completion call per attempt, behind the
//! [`ChatCompletion`] seam so the retry controller and the tests never
//! touch the network directly.

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::config::CoachConfig;
use crate::error::TransformError;

/// Provider seam: send a system prompt plus user message, get back the
/// assistant's raw text.
#[async_trait]
pub trait ChatCompletion: Send + Sync {
    async fn complete(&self, system: &str, user: &str) -> Result<String, TransformError>;
}

pub struct LlmClient {
    config: CoachConfig,
    client: reqwest::Client,
}

impl LlmClient {
    pub fn new(config: CoachConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl ChatCompletion for LlmClient {
    async fn complete(&self, system: &str, user: &str) -> Result<String, TransformError> {
        let url = format!(
            "{}/chat/completions",
            self.config.api_base.trim_end_matches('/')
        );

        // Low temperature and JSON mode: the output is parsed, not read.
        let payload = json!({
            "model": self.config.model,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user }
            ],
            "temperature": self.config.temperature,
            "max_tokens": self.config.max_output_tokens,
            "response_format": { "type": "json_object" }
        });

        let res = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&payload)
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let err_text = res.text().await.unwrap_or_default();
            return Err(TransformError::Api(format!("{} - {}", status, err_text)));
        }

        let body: Value = res.json().await?;
        extract_text(&body)
            .ok_or_else(|| TransformError::Api("No message content in response".to_string()))
    }
}

fn extract_text(body: &Value) -> Option<String> {
    body.get("choices")?
        .get(0)?
        .get("message")?
        .get("content")?
        .as_str()
        .map(|s| s.to_string())
}
