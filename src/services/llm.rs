use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;

/// Upper bound on generated tokens; the reply is a two-field JSON object.
const MAX_TOKENS: u32 = 200;

/// Text-completion backend used to classify transcriptions.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Send a single-turn prompt and return the reply text.
    async fn complete(&self, prompt: &str) -> Result<String, LlmError>;
}

/// Client for OpenAI-compatible chat completion APIs.
pub struct OpenAiClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
    model: Option<String>,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: Option<ChatReply>,
}

#[derive(Deserialize)]
struct ChatReply {
    content: Option<String>,
}

impl OpenAiClient {
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        model: Option<String>,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(LlmError::Http)?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            model: model.map(|m| m.trim().to_string()).filter(|m| !m.is_empty()),
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, LlmError> {
        Self::new(
            &config.base_url,
            config.openai_api_key.clone(),
            config.model_openai.clone(),
            Duration::from_secs(config.llm_timeout_secs),
        )
    }

    fn request_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let model = self.model.as_deref().ok_or(LlmError::MissingModel)?;

        let body = ChatRequest {
            model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: 0.0,
            max_tokens: MAX_TOKENS,
        };

        let mut request = self.http.post(self.request_url()).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(LlmError::Http)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Status { status, body });
        }

        let chat: ChatResponse = response.json().await.map_err(LlmError::Decode)?;

        let content = chat
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| "{}".to_string());

        Ok(content)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Missing MODEL_OPENAI")]
    MissingModel,

    #[error("LLM request failed: {0}")]
    Http(#[source] reqwest::Error),

    #[error("LLM returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("Failed to decode LLM response: {0}")]
    Decode(#[source] reqwest::Error),
}

impl LlmError {
    pub fn is_config(&self) -> bool {
        matches!(self, LlmError::MissingModel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(model: Option<&str>) -> OpenAiClient {
        OpenAiClient::new(
            "http://127.0.0.1:9/v1/",
            Some("  ".to_string()),
            model.map(str::to_string),
            Duration::from_secs(1),
        )
        .unwrap()
    }

    #[test]
    fn trims_trailing_slash_from_base_url() {
        assert_eq!(client(Some("m")).request_url(), "http://127.0.0.1:9/v1/chat/completions");
    }

    #[test]
    fn blank_api_key_is_ignored() {
        assert!(client(Some("m")).api_key.is_none());
    }

    #[tokio::test]
    async fn missing_model_fails_before_any_request() {
        let err = client(None).complete("prompt").await.unwrap_err();
        assert!(matches!(err, LlmError::MissingModel));
        assert!(err.is_config());
    }

    #[tokio::test]
    async fn blank_model_counts_as_missing() {
        let err = client(Some("   ")).complete("prompt").await.unwrap_err();
        assert!(matches!(err, LlmError::MissingModel));
    }

    #[test]
    fn request_body_uses_deterministic_sampling() {
        let body = ChatRequest {
            model: "gpt-4o-mini",
            messages: [ChatMessage {
                role: "user",
                content: "hello",
            }],
            temperature: 0.0,
            max_tokens: MAX_TOKENS,
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "model": "gpt-4o-mini",
                "messages": [{"role": "user", "content": "hello"}],
                "temperature": 0.0,
                "max_tokens": 200,
            })
        );
    }
}
