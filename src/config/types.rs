use std::fmt;

use serde::{Deserialize, Serialize};

/// Redact a secret string for Debug output. Shows "[REDACTED]" if non-empty, "[]" if empty.
fn redact(s: &str) -> &str {
    if s.is_empty() { "[]" } else { "[REDACTED]" }
}

// ── Top-level Settings ──────────────────────────────────────────────

/// Top-level configuration. Each field maps to a TOML `[section]`.
/// Uses `#[serde(default)]` so missing sections gracefully fall back.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct Settings {
    pub config: GlobalConfig,
    pub create: CreateConfig,
    pub labels: LabelsConfig,
    pub summary: SummaryConfig,
    pub github: GithubConfig,
    // Prompt templates (loaded from settings/*_prompts.toml files)
    pub pr_title_prompt: PromptTemplate,
    pub translate_prompt: PromptTemplate,
    // Secrets (env vars or .pr-pilot.toml)
    pub openai: OpenAiSecrets,
}

// ── [config] ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GlobalConfig {
    pub model: String,
    pub fallback_models: Vec<String>,
    pub ai_timeout: u64,
    pub temperature: f32,
    pub verbosity_level: u8,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4.1-mini".into(),
            fallback_models: vec![],
            ai_timeout: 60,
            temperature: 0.2,
            verbosity_level: 0,
        }
    }
}

// ── [create] ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CreateConfig {
    /// Target branch when `--base` is not given.
    pub base_branch: String,
    /// Open `$EDITOR` for title/body unless `--no-prompt`.
    pub open_editor: bool,
    /// Ask the AI model for a title suggestion unless `--no-ai`.
    pub generate_ai_title: bool,
    /// Create the PR as a draft by default.
    pub draft: bool,
}

impl Default for CreateConfig {
    fn default() -> Self {
        Self {
            base_branch: "main".into(),
            open_editor: true,
            generate_ai_title: true,
            draft: false,
        }
    }
}

// ── [labels] ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LabelsConfig {
    /// Local mapping file, one `type:label` entry per line. Optional.
    pub mapping_file: String,
    /// Index into the mapping supplying the default label when nothing matches.
    /// Decoupled from iteration order so reordering for match priority does
    /// not change the default.
    pub default_index: usize,
    /// Color for labels created by `ensure_label_exists` (hex, no '#').
    pub color: String,
    /// Description for labels created by `ensure_label_exists`.
    pub description: String,
}

impl Default for LabelsConfig {
    fn default() -> Self {
        Self {
            mapping_file: ".pr-labels".into(),
            default_index: 3,
            color: "ededed".into(),
            description: "Added by pr-pilot".into(),
        }
    }
}

// ── [summary] ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SummaryConfig {
    /// Login of the review bot whose comment carries the summary block.
    pub bot_author: String,
    /// Heading text marking the start of the summary block.
    pub marker: String,
    /// Translate the extracted summary before publishing.
    pub translate: bool,
    /// Target language for translation (BCP 47 tag).
    pub target_language: String,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            bot_author: "gemini-code-assist[bot]".into(),
            marker: "Summary of Changes".into(),
            translate: false,
            target_language: "en-US".into(),
        }
    }
}

// ── [github] ────────────────────────────────────────────────────────

#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GithubConfig {
    pub base_url: String,
    pub user_token: String,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.github.com".into(),
            user_token: String::new(),
        }
    }
}

impl fmt::Debug for GithubConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GithubConfig")
            .field("base_url", &self.base_url)
            .field("user_token", &redact(&self.user_token))
            .finish()
    }
}

// ── [openai] ────────────────────────────────────────────────────────

#[derive(Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct OpenAiSecrets {
    pub key: String,
    pub api_base: String,
}

impl fmt::Debug for OpenAiSecrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiSecrets")
            .field("key", &redact(&self.key))
            .field("api_base", &self.api_base)
            .finish()
    }
}

// ── Prompt templates ────────────────────────────────────────────────

/// A system/user prompt template pair (minijinja syntax).
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct PromptTemplate {
    pub system: String,
    pub user: String,
}
