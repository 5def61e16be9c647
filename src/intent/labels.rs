use std::path::Path;

use crate::config::types::LabelsConfig;
use crate::host::HostProvider;

/// Built-in type→label table, used when no mapping file is present.
///
/// Order is match priority: `fix` leads so bug-fix branches never pick up a
/// later label whose token also appears in the haystack. The default entry
/// (see `LabelsConfig::default_index`) is positional, not first.
const DEFAULT_TABLE: &[(&str, &str)] = &[
    ("fix", "bug"),
    ("perf", "performance"),
    ("refactor", "refactor"),
    ("feat", "enhancement"),
    ("docs", "documentation"),
    ("style", "style"),
    ("test", "testing"),
    ("build", "build"),
    ("ci", "ci"),
];

/// Ordered type→label mapping. First match wins; duplicate type tokens are
/// allowed, which is why this is a list of pairs and not a map.
#[derive(Debug, Clone)]
pub struct LabelMapping {
    entries: Vec<(String, String)>,
    default_index: usize,
}

impl LabelMapping {
    /// The built-in default table.
    pub fn builtin(default_index: usize) -> Self {
        Self {
            entries: DEFAULT_TABLE
                .iter()
                .map(|(t, l)| (t.to_string(), l.to_string()))
                .collect(),
            default_index,
        }
    }

    /// Load the mapping from a local file if present, else the built-in table.
    ///
    /// File format: one `type:label` entry per line, type before the first
    /// colon, label after. Blank lines and `#` comments are skipped. A file
    /// with no usable entries falls back to the built-in table, keeping the
    /// non-empty invariant.
    pub fn load(config: &LabelsConfig) -> Self {
        let path = Path::new(&config.mapping_file);
        let Ok(raw) = std::fs::read_to_string(path) else {
            return Self::builtin(config.default_index);
        };
        let mapping = Self::parse(&raw, config.default_index);
        if mapping.entries.is_empty() {
            tracing::warn!(
                file = %config.mapping_file,
                "label mapping file has no entries, using built-in table"
            );
            return Self::builtin(config.default_index);
        }
        mapping
    }

    /// Parse mapping file content. May produce an empty mapping; `load`
    /// guards against that.
    pub fn parse(raw: &str, default_index: usize) -> Self {
        let entries = raw
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .filter_map(|line| {
                let (type_token, label) = line.split_once(':')?;
                let (type_token, label) = (type_token.trim(), label.trim());
                if type_token.is_empty() || label.is_empty() {
                    tracing::warn!(line, "skipping malformed label mapping entry");
                    return None;
                }
                Some((type_token.to_string(), label.to_string()))
            })
            .collect();
        Self {
            entries,
            default_index,
        }
    }

    /// The type tokens, in order. Feeds the title normalizer's vocabulary.
    pub fn type_tokens(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(t, _)| t.as_str())
    }

    /// The label at the configured fallback index, clamped to the table.
    ///
    /// Positional rather than "first entry" so reordering the table for
    /// match priority does not change the default.
    pub fn default_label(&self) -> &str {
        let idx = self.default_index.min(self.entries.len().saturating_sub(1));
        &self.entries[idx].1
    }

    /// Resolve the label for a branch/title pair.
    ///
    /// Case-insensitive substring search of each type token over
    /// `"<branch> <title>"`, in table order; first match wins. No match
    /// resolves to the default label.
    pub fn map_label(&self, branch: &str, title: &str) -> &str {
        let haystack = format!("{branch} {title}").to_lowercase();
        for (type_token, label) in &self.entries {
            if haystack.contains(&type_token.to_lowercase()) {
                return label;
            }
        }
        self.default_label()
    }
}

/// Guarantee the label exists on the remote, creating it if missing.
///
/// Idempotent and non-fatal: every failure path degrades to a warning so
/// label omission never blocks PR creation. A create failure triggers one
/// existence re-check to absorb a concurrent creator.
pub async fn ensure_label_exists(host: &dyn HostProvider, label: &str, config: &LabelsConfig) {
    match host.label_exists(label).await {
        Ok(true) => {}
        Ok(false) => {
            if let Err(create_err) = host
                .create_label(label, &config.color, &config.description)
                .await
            {
                // Another invocation may have created it between our check
                // and the create call.
                match host.label_exists(label).await {
                    Ok(true) => {
                        tracing::debug!(label, "label appeared concurrently, create skipped");
                    }
                    _ => {
                        tracing::warn!(label, error = %create_err, "failed to create label, continuing without");
                    }
                }
            }
        }
        Err(e) => {
            tracing::warn!(label, error = %e, "label existence check failed, continuing without");
        }
    }
}
