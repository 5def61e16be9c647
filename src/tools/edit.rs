use std::collections::HashMap;
use std::sync::Arc;

use minijinja::Value;

use crate::ai::AiHandler;
use crate::config::loader::get_settings;
use crate::error::PrPilotError;
use crate::host::HostProvider;
use crate::intent::summary::extract;
use crate::template::render::render_prompt;
use crate::tools::resolve_ai_handler;

/// PR description refresh tool.
///
/// Harvests the review bot's summary block from the PR's reviews and
/// comments and overwrites the PR body with it. The overwrite is
/// destructive: the previous body is replaced, not merged.
pub struct RefreshDescription {
    host: Arc<dyn HostProvider>,
    ai: Option<Arc<dyn AiHandler>>,
}

impl RefreshDescription {
    pub fn new(host: Arc<dyn HostProvider>) -> Self {
        Self { host, ai: None }
    }

    #[cfg(test)]
    pub fn new_with_ai(host: Arc<dyn HostProvider>, ai: Arc<dyn AiHandler>) -> Self {
        Self {
            host,
            ai: Some(ai),
        }
    }

    /// Run the refresh pipeline for one PR. Returns the PR URL.
    pub async fn run(&self, number: u64) -> Result<String, PrPilotError> {
        let settings = get_settings();

        // 1. Fetch reviews and comments, reviews first (fixed priority)
        let view = self.host.view_pr(number).await?;
        let records = view.reviews.iter().chain(view.comments.iter());

        // 2. Extract the bot summary; absence is terminal, not recoverable
        let summary = extract(records, &settings.summary.bot_author, &settings.summary.marker)
            .ok_or(PrPilotError::NoBotSummary(number))?;
        tracing::info!(
            number,
            chars = summary.len(),
            "extracted review-bot summary"
        );

        // 3. Optional translation, best-effort
        let body = if settings.summary.translate {
            self.translate(&summary).await
        } else {
            summary
        };

        // 4. Overwrite the PR body
        self.host.edit_pr_body(number, &body).await?;
        tracing::info!(number, "pull request description updated");
        Ok(view.url)
    }

    /// Translate the extracted summary, preserving structural markers.
    ///
    /// Any failure (handler construction, the call itself, a response
    /// missing the expected field) degrades to the untranslated text.
    async fn translate(&self, text: &str) -> String {
        let settings = get_settings();

        let mut vars: HashMap<String, Value> = HashMap::new();
        vars.insert("text".into(), Value::from(text));
        vars.insert(
            "target_language".into(),
            Value::from(settings.summary.target_language.as_str()),
        );

        let rendered = match render_prompt(&settings.translate_prompt, vars) {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(error = %e, "failed to render translate prompt, using untranslated text");
                return text.to_string();
            }
        };

        let ai = match resolve_ai_handler(&self.ai) {
            Ok(ai) => ai,
            Err(e) => {
                tracing::warn!(error = %e, "AI handler unavailable, using untranslated text");
                return text.to_string();
            }
        };

        let response = match crate::ai::chat_completion_with_fallback(
            ai.as_ref(),
            &settings.config.model,
            &settings.config.fallback_models,
            &rendered.system,
            &rendered.user,
            Some(settings.config.temperature),
        )
        .await
        {
            Ok(resp) => resp,
            Err(e) => {
                tracing::warn!(error = %e, "translation call failed, using untranslated text");
                return text.to_string();
            }
        };

        match crate::ai::parse_json_field(&response.content, "translation") {
            Some(translated) => translated,
            None => {
                tracing::warn!("translation response missing 'translation' field, using untranslated text");
                text.to_string()
            }
        }
    }
}
