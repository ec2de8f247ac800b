//! Test doubles for the LLM and webhook seams

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Bytes;
use axum::http::{HeaderMap, StatusCode, Uri};
use axum::{Json, Router};
use serde_json::Value;

use call_classifier::models::classification::WebhookPayload;
use call_classifier::services::llm::{CompletionClient, LlmError};
use call_classifier::services::webhook::{ResultPublisher, WebhookError};

/// LLM double that answers from a script. `None` entries fail with a
/// configuration error; an exhausted script repeats `default_reply`.
pub struct ScriptedLlm {
    replies: Mutex<VecDeque<Option<String>>>,
    default_reply: String,
    pub prompts: Mutex<Vec<String>>,
}

impl ScriptedLlm {
    pub fn always(reply: &str) -> Self {
        Self::scripted(Vec::new(), reply)
    }

    pub fn scripted(replies: Vec<Option<&str>>, default_reply: &str) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().map(|r| r.map(str::to_string)).collect()),
            default_reply: default_reply.to_string(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionClient for ScriptedLlm {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match self.replies.lock().unwrap().pop_front() {
            Some(Some(reply)) => Ok(reply),
            Some(None) => Err(LlmError::MissingModel),
            None => Ok(self.default_reply.clone()),
        }
    }
}

/// Publisher double that records every payload as JSON.
#[derive(Default)]
pub struct RecordingPublisher {
    pub published: Mutex<Vec<Value>>,
    /// Transcription ids for which publishing fails.
    pub reject: Vec<String>,
}

impl RecordingPublisher {
    pub fn rejecting(ids: &[&str]) -> Self {
        Self {
            published: Mutex::new(Vec::new()),
            reject: ids.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn published(&self) -> Vec<Value> {
        self.published.lock().unwrap().clone()
    }
}

#[async_trait]
impl ResultPublisher for RecordingPublisher {
    async fn publish(&self, payload: &WebhookPayload) -> Result<(), WebhookError> {
        if self.reject.contains(&payload.transcription_id.to_string()) {
            return Err(WebhookError::Status(StatusCode::BAD_GATEWAY));
        }
        let value = serde_json::to_value(payload).unwrap();
        self.published.lock().unwrap().push(value);
        Ok(())
    }
}

/// A request captured by [`MockServer`].
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    pub headers: HeaderMap,
    pub body: Value,
}

/// In-process HTTP endpoint that answers every request with a canned
/// response and records what it received.
pub struct MockServer {
    pub base_url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockServer {
    pub async fn start(status: StatusCode, response: Value) -> Self {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let recorded = requests.clone();

        let app = Router::new().fallback(move |uri: Uri, headers: HeaderMap, body: Bytes| {
            let recorded = recorded.clone();
            let response = response.clone();
            async move {
                let body = serde_json::from_slice(&body).unwrap_or(Value::Null);
                recorded.lock().unwrap().push(RecordedRequest {
                    path: uri.path().to_string(),
                    headers,
                    body,
                });
                (status, Json(response))
            }
        });

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}"),
            requests,
        }
    }

    /// OpenAI-style chat completion answering with `content`.
    pub async fn chat_completion(content: &str) -> Self {
        Self::start(
            StatusCode::OK,
            serde_json::json!({
                "id": "chatcmpl-test",
                "object": "chat.completion",
                "choices": [{
                    "index": 0,
                    "message": {"role": "assistant", "content": content},
                    "finish_reason": "stop"
                }]
            }),
        )
        .await
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}
