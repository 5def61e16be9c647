pub mod create;
pub mod edit;
pub mod open;

use std::sync::Arc;

use crate::ai::AiHandler;
use crate::ai::openai::OpenAiCompatibleHandler;
use crate::error::PrPilotError;

/// Resolve the AI handler: use the injected one or create from settings.
pub fn resolve_ai_handler(
    injected: &Option<Arc<dyn AiHandler>>,
) -> Result<Arc<dyn AiHandler>, PrPilotError> {
    match injected {
        Some(ai) => Ok(ai.clone()),
        None => Ok(Arc::new(OpenAiCompatibleHandler::from_settings()?)),
    }
}
