use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use figment::Figment;
use figment::providers::{Env, Format, Toml};

use crate::config::types::Settings;
use crate::error::PrPilotError;

// Embedded default TOML files.
// This makes the binary self-contained; a repo-local .pr-pilot.toml
// layers on top.
static CONFIGURATION_TOML: &str = include_str!("../../settings/configuration.toml");
static PR_TITLE_PROMPTS: &str = include_str!("../../settings/pr_title_prompts.toml");
static TRANSLATE_PROMPTS: &str = include_str!("../../settings/translate_prompts.toml");

/// Repo-local configuration file name.
const LOCAL_CONFIG_FILE: &str = ".pr-pilot.toml";

/// Global settings, set once at startup.
static GLOBAL_SETTINGS: RwLock<Option<Arc<Settings>>> = RwLock::new(None);

/// Get the current settings.
///
/// Falls back to loading defaults if `init_settings` was never called
/// (should only happen in tests).
pub fn get_settings() -> Arc<Settings> {
    let guard = GLOBAL_SETTINGS.read().unwrap_or_else(|poisoned| {
        tracing::error!("settings RwLock poisoned, recovering inner value");
        poisoned.into_inner()
    });
    match guard.as_ref() {
        Some(s) => s.clone(),
        None => {
            let fallback = Arc::new(load_settings(&HashMap::new()).unwrap_or_else(|e| {
                tracing::error!(error = %e, "failed to load fallback settings, using Default");
                Settings::default()
            }));
            drop(guard);
            let mut write_guard = GLOBAL_SETTINGS
                .write()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            *write_guard = Some(fallback.clone());
            fallback
        }
    }
}

/// Initialize (or re-initialize) global settings.
pub fn init_settings(
    cli_overrides: &HashMap<String, String>,
) -> Result<Arc<Settings>, PrPilotError> {
    let settings = Arc::new(load_settings(cli_overrides)?);
    *GLOBAL_SETTINGS.write().unwrap_or_else(|poisoned| {
        tracing::error!("settings RwLock poisoned, recovering inner value");
        poisoned.into_inner()
    }) = Some(settings.clone());
    Ok(settings)
}

/// Build the full configuration by merging layers:
///
/// 1. Embedded TOML defaults (`settings/configuration.toml` + prompts)
/// 2. Repo-local `.pr-pilot.toml` (optional)
/// 3. CLI argument overrides (`--section.key=value`)
/// 4. Well-known env var aliases (highest precedence for secrets)
pub fn load_settings(
    cli_overrides: &HashMap<String, String>,
) -> Result<Settings, PrPilotError> {
    // Layer 1: embedded defaults
    let mut figment = Figment::new()
        .merge(Toml::string(CONFIGURATION_TOML))
        .merge(Toml::string(PR_TITLE_PROMPTS))
        .merge(Toml::string(TRANSLATE_PROMPTS));

    // Layer 2: repo-local config file (optional)
    figment = figment.merge(Toml::file(LOCAL_CONFIG_FILE));

    // Layer 3: CLI argument overrides (--labels.default_index=0)
    for (key, value) in cli_overrides {
        // Figment doesn't have a direct "set key" method for arbitrary dotted keys,
        // so we build a TOML fragment: `[section]\nkey = value`
        if let Some(toml_fragment) = cli_override_to_toml(key, value) {
            figment = figment.merge(Toml::string(&toml_fragment));
        }
    }

    // Layer 4: Well-known env var aliases (underscore-separated names)
    figment = figment.merge(
        Env::raw()
            .map(|key| match key.as_str() {
                "OPENAI_API_KEY" | "OPENAI_KEY" => "openai.key".into(),
                "GITHUB_TOKEN" | "GITHUB_USER_TOKEN" => "github.user_token".into(),
                _ => key.into(),
            })
            .only(&[
                "OPENAI_API_KEY",
                "OPENAI_KEY",
                "GITHUB_TOKEN",
                "GITHUB_USER_TOKEN",
            ]),
    );

    let settings: Settings = figment.extract()?;
    Ok(settings)
}

/// Convert a CLI override like "labels.default_index=0" into a TOML fragment.
fn cli_override_to_toml(key: &str, value: &str) -> Option<String> {
    let (section, field) = match key.split_once('.') {
        Some(pair) => pair,
        None => {
            tracing::warn!("ignoring CLI override with no section: {key}={value}");
            return None;
        }
    };
    // Try to detect type: bool, int, float, or string
    let is_literal = value == "true"
        || value == "false"
        || value.parse::<i64>().is_ok()
        || value.parse::<f64>().is_ok();
    let toml_value = if is_literal {
        value.to_string()
    } else {
        let escaped = value
            .replace('\\', "\\\\")
            .replace('"', "\\\"")
            .replace('\n', "\\n")
            .replace('\r', "\\r")
            .replace('\t', "\\t");
        format!("\"{escaped}\"")
    };
    Some(format!("[{section}]\n{field} = {toml_value}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_embedded_defaults() {
        let settings = load_settings(&HashMap::new()).unwrap();
        assert_eq!(settings.create.base_branch, "main");
        assert_eq!(settings.summary.marker, "Summary of Changes");
        assert!(settings.pr_title_prompt.system.contains("conventional-commit"));
        assert!(settings.translate_prompt.system.contains("translation"));
    }

    #[test]
    fn test_cli_override_layers_over_defaults() {
        let mut overrides = HashMap::new();
        overrides.insert("create.base_branch".to_string(), "develop".to_string());
        overrides.insert("labels.default_index".to_string(), "0".to_string());
        let settings = load_settings(&overrides).unwrap();
        assert_eq!(settings.create.base_branch, "develop");
        assert_eq!(settings.labels.default_index, 0);
    }

    #[test]
    fn test_cli_override_to_toml_types() {
        assert_eq!(
            cli_override_to_toml("create.draft", "true").unwrap(),
            "[create]\ndraft = true"
        );
        assert_eq!(
            cli_override_to_toml("config.temperature", "0.5").unwrap(),
            "[config]\ntemperature = 0.5"
        );
        assert_eq!(
            cli_override_to_toml("summary.marker", "Walkthrough").unwrap(),
            "[summary]\nmarker = \"Walkthrough\""
        );
        assert!(cli_override_to_toml("nodot", "x").is_none());
    }
}
