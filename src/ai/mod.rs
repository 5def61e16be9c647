pub mod openai;
pub mod types;

use async_trait::async_trait;
use types::ChatResponse;

use crate::error::PrPilotError;

/// Trait for AI/LLM provider handlers.
///
/// Implementors handle a single provider family (e.g. OpenAI-compatible
/// endpoints). Object-safe for dynamic dispatch via `Arc<dyn AiHandler>`.
#[async_trait]
pub trait AiHandler: Send + Sync {
    /// Send a chat completion request. Single attempt; callers degrade on
    /// failure.
    async fn chat_completion(
        &self,
        model: &str,
        system: &str,
        user: &str,
        temperature: Option<f32>,
    ) -> Result<ChatResponse, PrPilotError>;
}

/// Try the primary model first, then each fallback in order.
/// If all models fail, returns the last error.
pub async fn chat_completion_with_fallback(
    handler: &dyn AiHandler,
    primary_model: &str,
    fallback_models: &[String],
    system: &str,
    user: &str,
    temperature: Option<f32>,
) -> Result<ChatResponse, PrPilotError> {
    match handler
        .chat_completion(primary_model, system, user, temperature)
        .await
    {
        Ok(resp) => return Ok(resp),
        Err(e) => {
            if fallback_models.is_empty() {
                return Err(e);
            }
            tracing::warn!(
                model = primary_model,
                error = %e,
                "primary model failed, trying fallbacks"
            );
        }
    }

    let mut last_err = PrPilotError::AiHandler("no fallback models configured".into());
    for (i, fallback) in fallback_models.iter().enumerate() {
        match handler
            .chat_completion(fallback, system, user, temperature)
            .await
        {
            Ok(resp) => {
                tracing::info!(model = fallback.as_str(), "fallback model succeeded");
                return Ok(resp);
            }
            Err(e) => {
                tracing::warn!(
                    model = fallback.as_str(),
                    attempt = i + 2,
                    error = %e,
                    "fallback model failed"
                );
                last_err = e;
            }
        }
    }

    Err(last_err)
}

/// Pull a string field out of a JSON response body.
///
/// Models occasionally wrap the object in a markdown code fence; strip one
/// before parsing. Returns `None` when the content is not JSON or the field
/// is missing or non-string; callers treat that as a degraded call.
pub fn parse_json_field(content: &str, field: &str) -> Option<String> {
    let trimmed = content.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .map(|rest| rest.trim_start_matches(['\r', '\n']))
        .and_then(|rest| rest.strip_suffix("```"))
        .unwrap_or(trimmed);
    let value: serde_json::Value = serde_json::from_str(body.trim()).ok()?;
    Some(value.get(field)?.as_str()?.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Mutex;
    use types::{FinishReason, Usage};

    /// Mock AI handler that fails for specific models and tracks all attempted models.
    struct FallbackTestHandler {
        failing_models: HashSet<String>,
        attempted_models: Mutex<Vec<String>>,
    }

    impl FallbackTestHandler {
        fn new(failing: &[&str]) -> Self {
            Self {
                failing_models: failing.iter().map(|s| s.to_string()).collect(),
                attempted_models: Mutex::new(Vec::new()),
            }
        }

        fn attempted(&self) -> Vec<String> {
            self.attempted_models.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl AiHandler for FallbackTestHandler {
        async fn chat_completion(
            &self,
            model: &str,
            _system: &str,
            _user: &str,
            _temperature: Option<f32>,
        ) -> Result<ChatResponse, PrPilotError> {
            self.attempted_models
                .lock()
                .unwrap()
                .push(model.to_string());
            if self.failing_models.contains(model) {
                Err(PrPilotError::AiHandler(format!("model {model} unavailable")))
            } else {
                Ok(ChatResponse {
                    content: format!("response from {model}"),
                    finish_reason: FinishReason::Stop,
                    usage: Some(Usage {
                        prompt_tokens: 10,
                        completion_tokens: 20,
                        total_tokens: 30,
                    }),
                })
            }
        }
    }

    #[tokio::test]
    async fn test_fallback_primary_succeeds_no_fallback_tried() {
        let handler = FallbackTestHandler::new(&[]);
        let fallbacks = vec!["fallback-1".into()];
        let resp =
            chat_completion_with_fallback(&handler, "primary", &fallbacks, "sys", "usr", None)
                .await
                .unwrap();

        assert_eq!(resp.content, "response from primary");
        assert_eq!(handler.attempted(), vec!["primary"]);
    }

    #[tokio::test]
    async fn test_fallback_primary_fails_fallback_succeeds() {
        let handler = FallbackTestHandler::new(&["primary"]);
        let fallbacks = vec!["fallback-1".into()];
        let resp =
            chat_completion_with_fallback(&handler, "primary", &fallbacks, "sys", "usr", None)
                .await
                .unwrap();

        assert_eq!(resp.content, "response from fallback-1");
        assert_eq!(handler.attempted(), vec!["primary", "fallback-1"]);
    }

    #[tokio::test]
    async fn test_fallback_all_models_fail_returns_last_error() {
        let handler = FallbackTestHandler::new(&["primary", "fallback-1"]);
        let fallbacks = vec!["fallback-1".into()];
        let err =
            chat_completion_with_fallback(&handler, "primary", &fallbacks, "sys", "usr", None)
                .await
                .unwrap_err();

        assert!(
            err.to_string().contains("fallback-1"),
            "should return last model's error, got: {err}"
        );
    }

    #[tokio::test]
    async fn test_fallback_no_fallbacks_returns_primary_error() {
        let handler = FallbackTestHandler::new(&["primary"]);
        let fallbacks: Vec<String> = vec![];
        let err =
            chat_completion_with_fallback(&handler, "primary", &fallbacks, "sys", "usr", None)
                .await
                .unwrap_err();

        assert!(err.to_string().contains("primary"));
        assert_eq!(handler.attempted(), vec!["primary"]);
    }

    #[test]
    fn test_parse_json_field_plain() {
        assert_eq!(
            parse_json_field(r#"{"title": "fix: handle null"}"#, "title").as_deref(),
            Some("fix: handle null")
        );
    }

    #[test]
    fn test_parse_json_field_fenced() {
        let content = "```json\n{\"translation\": \"## Registro\"}\n```";
        assert_eq!(
            parse_json_field(content, "translation").as_deref(),
            Some("## Registro")
        );
    }

    #[test]
    fn test_parse_json_field_missing_or_malformed() {
        assert!(parse_json_field(r#"{"other": "x"}"#, "title").is_none());
        assert!(parse_json_field("not json at all", "title").is_none());
        assert!(parse_json_field(r#"{"title": 42}"#, "title").is_none());
    }
}
