use async_trait::async_trait;

use crate::errors::{TinderError, TinderResult};
use crate::vision::provider::VisionProvider;
use crate::vision::types::CallConfig;

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Messages-API adapter: the image goes in as a base64 source block ahead of
/// the text instruction.
pub struct AnthropicProvider {
    id: String,
    api_base: String,
    api_key: String,
    call: CallConfig,
    client: reqwest::Client,
}

impl AnthropicProvider {
    pub fn new(id: String, api_base: String, api_key: String, call: CallConfig) -> Self {
        Self {
            id,
            api_base,
            api_key,
            call,
            client: reqwest::Client::new(),
        }
    }

    fn request_body(&self, image_png_base64: &str, prompt: &str) -> serde_json::Value {
        serde_json::json!({
            "model": self.call.model,
            "max_tokens": self.call.max_tokens,
            "temperature": self.call.temperature,
            "messages": [{
                "role": "user",
                "content": [
                    {
                        "type": "image",
                        "source": {
                            "type": "base64",
                            "media_type": "image/png",
                            "data": image_png_base64,
                        },
                    },
                    { "type": "text", "text": prompt },
                ],
            }],
        })
    }
}

#[async_trait]
impl VisionProvider for AnthropicProvider {
    fn name(&self) -> &str {
        &self.id
    }

    async fn analyze(&self, image_png_base64: &str, prompt: &str) -> TinderResult<String> {
        let body = self.request_body(image_png_base64, prompt);

        tracing::debug!(
            provider = %self.id,
            model = %self.call.model,
            prompt_len = prompt.len(),
            image_len = image_png_base64.len(),
            "sending perception request"
        );

        let response = self
            .client
            .post(&self.api_base)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let err_body = response.text().await.unwrap_or_default();
            return Err(TinderError::Perception(format!("{}: {}", status, err_body)));
        }

        let json: serde_json::Value = response.json().await?;
        extract_text(&json)
    }
}

/// Concatenates every text block of the reply.
fn extract_text(json: &serde_json::Value) -> TinderResult<String> {
    let blocks = json["content"]
        .as_array()
        .ok_or_else(|| TinderError::Perception("response has no content blocks".into()))?;

    let text: String = blocks
        .iter()
        .filter(|b| b["type"].as_str() == Some("text"))
        .filter_map(|b| b["text"].as_str())
        .collect();

    if text.is_empty() {
        return Err(TinderError::Perception("response has no text block".into()));
    }
    Ok(text)
}
