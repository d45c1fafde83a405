use async_trait::async_trait;

use crate::errors::{TinderError, TinderResult};
use crate::vision::provider::VisionProvider;
use crate::vision::types::{CallConfig, ChatMessage};

pub struct OpenAiCompatibleProvider {
    id: String,
    api_base: String,
    api_key: String,
    call: CallConfig,
    client: reqwest::Client,
}

impl OpenAiCompatibleProvider {
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
            "messages": [ChatMessage::user_with_image(prompt, image_png_base64)],
            "temperature": self.call.temperature,
            "max_tokens": self.call.max_tokens,
        })
    }
}

#[async_trait]
impl VisionProvider for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        &self.id
    }

    async fn analyze(&self, image_png_base64: &str, prompt: &str) -> TinderResult<String> {
        let body = self.request_body(image_png_base64, prompt);

        tracing::debug!(
            provider = %self.id,
            model = %self.call.model,
            body = %sanitized_body(&body),
            "sending perception request"
        );

        let response = self
            .client
            .post(&self.api_base)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let err_body = response.text().await.unwrap_or_default();
            return Err(TinderError::Perception(format!("{}: {}", status, err_body)));
        }

        let json: serde_json::Value = response.json().await?;
        extract_content(&json)
    }
}

fn extract_content(json: &serde_json::Value) -> TinderResult<String> {
    json["choices"][0]["message"]["content"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| TinderError::Perception("response has no message content".into()))
}

/// Copy of the body with image payloads replaced, for logging only.
fn sanitized_body(body: &serde_json::Value) -> String {
    let mut log_body = body.clone();
    if let Some(msgs) = log_body.get_mut("messages").and_then(|m| m.as_array_mut()) {
        for msg in msgs {
            if let Some(parts) = msg.get_mut("content").and_then(|c| c.as_array_mut()) {
                for part in parts {
                    if part.get("type").and_then(|t| t.as_str()) == Some("image_url") {
                        if let Some(url) = part.get_mut("image_url").and_then(|i| i.get_mut("url")) {
                            *url = serde_json::Value::String("<omitted_base64_image>".to_string());
                        }
                    }
                }
            }
        }
    }
    serde_json::to_string(&log_body).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> OpenAiCompatibleProvider {
        OpenAiCompatibleProvider::new(
            "openai".into(),
            "http://localhost/v1/chat/completions".into(),
            "key".into(),
            CallConfig {
                model: "gpt-4o".into(),
                temperature: 0.1,
                max_tokens: 1024,
            },
        )
    }

    #[test]
    fn body_carries_model_and_image() {
        let body = provider().request_body("QUJD", "find the logs");
        assert_eq!(body["model"], "gpt-4o");
        assert_eq!(body["max_tokens"], 1024);
        assert_eq!(body["messages"][0]["content"][0]["text"], "find the logs");
    }

    #[test]
    fn logged_body_omits_image() {
        let body = provider().request_body("SECRETPIXELS", "find the logs");
        let logged = sanitized_body(&body);
        assert!(!logged.contains("SECRETPIXELS"));
        assert!(logged.contains("<omitted_base64_image>"));
    }

    #[test]
    fn content_is_extracted() {
        let json = serde_json::json!({"choices": [{"message": {"content": "7"}}]});
        assert_eq!(extract_content(&json).unwrap(), "7");
        assert!(extract_content(&serde_json::json!({"choices": []})).is_err());
    }
}
