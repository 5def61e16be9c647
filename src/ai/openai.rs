use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use super::AiHandler;
use super::types::{ChatResponse, FinishReason, Usage};
use crate::config::loader::get_settings;
use crate::error::PrPilotError;

/// OpenAI-compatible chat completions handler.
///
/// Works with any provider exposing the `/v1/chat/completions` API:
/// OpenAI, Azure OpenAI, Ollama, Groq, OpenRouter, Mistral, etc.
pub struct OpenAiCompatibleHandler {
    client: Client,
    base_url: String,
    api_key: String,
}

impl OpenAiCompatibleHandler {
    /// Create a new handler from the current settings.
    pub fn from_settings() -> Result<Self, PrPilotError> {
        let settings = get_settings();
        let api_key = settings.openai.key.clone();
        let base_url = if settings.openai.api_base.is_empty() {
            "https://api.openai.com/v1".to_string()
        } else {
            settings.openai.api_base.clone()
        };

        let client = Client::builder()
            .timeout(Duration::from_secs(settings.config.ai_timeout))
            .build()
            .map_err(PrPilotError::Http)?;

        Ok(Self {
            client,
            base_url,
            api_key,
        })
    }

    fn build_request_body(
        &self,
        model: &str,
        system: &str,
        user: &str,
        temperature: Option<f32>,
    ) -> serde_json::Value {
        let settings = get_settings();
        json!({
            "model": model,
            "messages": [
                {"role": "system", "content": system},
                {"role": "user", "content": user},
            ],
            "temperature": temperature.unwrap_or(settings.config.temperature),
        })
    }
}

#[async_trait]
impl AiHandler for OpenAiCompatibleHandler {
    async fn chat_completion(
        &self,
        model: &str,
        system: &str,
        user: &str,
        temperature: Option<f32>,
    ) -> Result<ChatResponse, PrPilotError> {
        let body = self.build_request_body(model, system, user, temperature);
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));

        let mut req = self.client.post(&url).json(&body);
        if !self.api_key.is_empty() {
            req = req.bearer_auth(&self.api_key);
        }

        let resp = req.send().await.map_err(PrPilotError::Http)?;
        if !resp.status().is_success() {
            let status = resp.status();
            let body_text = resp.text().await.unwrap_or_default();
            return Err(PrPilotError::AiHandler(format!(
                "API returned {status}: {body_text}"
            )));
        }

        let api_resp: ApiResponse = resp.json().await.map_err(PrPilotError::Http)?;

        let choice = api_resp
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| PrPilotError::AiHandler("no choices in response".into()))?;

        let content = choice.message.content.unwrap_or_default();
        let finish_reason = choice
            .finish_reason
            .as_deref()
            .map(FinishReason::from)
            .unwrap_or_default();
        let usage = api_resp.usage.map(|u| Usage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        });

        Ok(ChatResponse {
            content,
            finish_reason,
            usage,
        })
    }
}

// ── API response types ─────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ApiResponse {
    choices: Vec<ApiChoice>,
    usage: Option<ApiUsage>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ApiMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}
