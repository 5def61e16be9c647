use std::sync::Mutex;

use async_trait::async_trait;

use crate::ai::AiHandler;
use crate::ai::types::{ChatResponse, FinishReason};
use crate::error::PrPilotError;

/// Mock AI handler returning a scripted response (or failing when none is
/// scripted). Records the prompts it was asked to complete.
pub struct MockAiHandler {
    pub response: Option<String>,
    pub prompts: Mutex<Vec<(String, String)>>,
}

impl MockAiHandler {
    pub fn with_response(content: &str) -> Self {
        Self {
            response: Some(content.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            response: None,
            prompts: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl AiHandler for MockAiHandler {
    async fn chat_completion(
        &self,
        _model: &str,
        system: &str,
        user: &str,
        _temperature: Option<f32>,
    ) -> Result<ChatResponse, PrPilotError> {
        self.prompts
            .lock()
            .unwrap()
            .push((system.to_string(), user.to_string()));
        match &self.response {
            Some(content) => Ok(ChatResponse {
                content: content.clone(),
                finish_reason: FinishReason::Stop,
                usage: None,
            }),
            None => Err(PrPilotError::AiHandler("scripted failure".into())),
        }
    }
}
