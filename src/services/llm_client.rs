use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use crate::core::config::Settings;

pub(crate) const STATUS_TIMEOUT: u16 = 408;
pub(crate) const STATUS_BAD_GATEWAY: u16 = 502;
pub(crate) const STATUS_UNAVAILABLE: u16 = 503;

/// One system + user prompt exchange. `None` overrides fall back to the
/// client's configured temperature and token budget.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ChatRequest<'a> {
    pub(crate) system_message: Option<&'a str>,
    pub(crate) user_message: &'a str,
    pub(crate) temperature: Option<f64>,
    pub(crate) max_tokens: Option<u32>,
}

impl<'a> ChatRequest<'a> {
    pub(crate) fn new(system_message: &'a str, user_message: &'a str) -> Self {
        let system_message = Some(system_message).filter(|message| !message.is_empty());
        Self { system_message, user_message, temperature: None, max_tokens: None }
    }
}

/// Status code and decoded body of a chat-completion call. Transport failures
/// are folded into the same shape with a synthetic status and an `error` object,
/// so callers only ever inspect one kind of value.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ChatResponse {
    pub(crate) status: u16,
    pub(crate) body: Value,
}

impl ChatResponse {
    pub(crate) fn synthetic(status: u16, kind: &str, message: impl Into<String>) -> Self {
        Self { status, body: json!({"error": {"message": message.into(), "type": kind}}) }
    }

    pub(crate) fn is_success(&self) -> bool {
        self.status == 200
    }

    pub(crate) fn content(&self) -> Option<&str> {
        self.body
            .get("choices")
            .and_then(|choices| choices.get(0))
            .and_then(|choice| choice.get("message"))
            .and_then(|message| message.get("content"))
            .and_then(Value::as_str)
    }

    pub(crate) fn error_payload(&self) -> Value {
        match self.body.get("error") {
            Some(error) if !error.is_null() => error.clone(),
            _ => Value::String("Unknown error".to_string()),
        }
    }
}

#[async_trait]
pub(crate) trait ChatCompletion: Send + Sync {
    async fn chat_completion(&self, request: ChatRequest<'_>) -> ChatResponse;
}

#[derive(Debug, Clone)]
pub(crate) struct ChatCompletionClient {
    client: Client,
    api_key: String,
    endpoint: String,
    model: String,
    temperature: f64,
    max_tokens: u32,
}

impl ChatCompletionClient {
    pub(crate) fn from_settings(settings: &Settings) -> Result<Self> {
        let ai = settings.ai();
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(ai.ai_connect_timeout))
            .timeout(Duration::from_secs(ai.ai_request_timeout))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            api_key: ai.openai_api_key.clone(),
            endpoint: format!("{}/chat/completions", ai.openai_base_url.trim_end_matches('/')),
            model: ai.ai_model.clone(),
            temperature: ai.ai_temperature,
            max_tokens: ai.ai_max_tokens,
        })
    }

    pub(crate) fn build_payload(&self, request: &ChatRequest<'_>) -> Value {
        let mut messages = Vec::with_capacity(2);
        if let Some(system_message) = request.system_message {
            messages.push(json!({"role": "system", "content": system_message}));
        }
        messages.push(json!({"role": "user", "content": request.user_message}));

        json!({
            "model": self.model,
            "messages": messages,
            "temperature": request.temperature.unwrap_or(self.temperature),
            "max_tokens": request.max_tokens.unwrap_or(self.max_tokens),
        })
    }

    async fn send(&self, payload: &Value) -> Result<ChatResponse, reqwest::Error> {
        let response =
            self.client.post(&self.endpoint).bearer_auth(&self.api_key).json(payload).send().await?;
        let status = response.status().as_u16();
        let text = response.text().await?;

        let body = match serde_json::from_str::<Value>(&text) {
            Ok(body) => body,
            Err(_) => json!({"error": {"message": text, "type": "invalid_response"}}),
        };

        Ok(ChatResponse { status, body })
    }
}

#[async_trait]
impl ChatCompletion for ChatCompletionClient {
    async fn chat_completion(&self, request: ChatRequest<'_>) -> ChatResponse {
        let payload = self.build_payload(&request);
        let timer = Instant::now();

        tracing::info!(model = %self.model, "Sending chat completion request");

        let response = match self.send(&payload).await {
            Ok(response) => response,
            Err(err) if err.is_timeout() => {
                tracing::warn!(error = %err, "Chat completion timed out");
                ChatResponse::synthetic(STATUS_TIMEOUT, "timeout", "Request timed out")
            }
            Err(err) if err.is_connect() => {
                tracing::warn!(error = %err, "Could not connect to chat completion endpoint");
                ChatResponse::synthetic(
                    STATUS_UNAVAILABLE,
                    "connection_error",
                    format!("Connection error: {err}"),
                )
            }
            Err(err) => {
                tracing::warn!(error = %err, "Chat completion request failed");
                ChatResponse::synthetic(
                    STATUS_BAD_GATEWAY,
                    "request_error",
                    format!("Request failed: {err}"),
                )
            }
        };

        let usage = response
            .body
            .get("usage")
            .and_then(|usage| usage.get("total_tokens"))
            .and_then(Value::as_u64);
        tracing::info!(
            status = response.status,
            duration_seconds = timer.elapsed().as_secs_f64(),
            tokens_used = usage,
            "Chat completion finished"
        );

        response
    }
}
