use std::fmt;

use serde::{Deserialize, Serialize};

/// Conventional-commit change type for a whole branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    Build,
    Ci,
    Docs,
    Feat,
    Fix,
    Perf,
    Refactor,
    Style,
    Test,
}

impl ChangeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeType::Build => "build",
            ChangeType::Ci => "ci",
            ChangeType::Docs => "docs",
            ChangeType::Feat => "feat",
            ChangeType::Fix => "fix",
            ChangeType::Perf => "perf",
            ChangeType::Refactor => "refactor",
            ChangeType::Style => "style",
            ChangeType::Test => "test",
        }
    }
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for ChangeType {
    fn default() -> Self {
        ChangeType::Feat
    }
}

/// Keyword categories tested in priority order. First match wins.
///
/// "fix" outranks "feat" so a bug-fix branch is never misclassified as a
/// feature even when a commit also says "feature flag fix".
const KEYWORD_PRIORITY: &[(&[&str], ChangeType)] = &[
    (&["fix", "bug", "hotfix"], ChangeType::Fix),
    (&["feat", "feature"], ChangeType::Feat),
    (&["refactor"], ChangeType::Refactor),
    (&["docs", "doc"], ChangeType::Docs),
];

/// Classify a branch's commit subjects into one change type.
///
/// Case-insensitive substring search over the concatenated subjects.
/// Empty input or no keyword match returns the default (`feat`).
pub fn classify(commits: &[String]) -> ChangeType {
    let haystack = commits.join("\n").to_lowercase();
    for (keywords, change_type) in KEYWORD_PRIORITY {
        if keywords.iter().any(|kw| haystack.contains(*kw)) {
            return *change_type;
        }
    }
    ChangeType::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subjects(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_fix_beats_feat() {
        let commits = subjects(&["feat: add feature flag", "fix crash on startup"]);
        assert_eq!(classify(&commits), ChangeType::Fix);
    }

    #[test]
    fn test_fix_keywords_case_insensitive() {
        assert_eq!(classify(&subjects(&["HOTFIX for prod"])), ChangeType::Fix);
        assert_eq!(classify(&subjects(&["Bug in parser"])), ChangeType::Fix);
        assert_eq!(classify(&subjects(&["Fix typo"])), ChangeType::Fix);
    }

    #[test]
    fn test_feature_branch() {
        let commits = subjects(&["feature: dark mode", "polish styles"]);
        assert_eq!(classify(&commits), ChangeType::Feat);
    }

    #[test]
    fn test_refactor_and_docs() {
        assert_eq!(
            classify(&subjects(&["refactor session store"])),
            ChangeType::Refactor
        );
        assert_eq!(
            classify(&subjects(&["update docs for v2"])),
            ChangeType::Docs
        );
        assert_eq!(
            classify(&subjects(&["doc: clarify setup"])),
            ChangeType::Docs
        );
    }

    #[test]
    fn test_no_match_defaults_to_feat() {
        assert_eq!(classify(&subjects(&["bump version"])), ChangeType::Feat);
    }

    #[test]
    fn test_empty_defaults_to_feat() {
        assert_eq!(classify(&[]), ChangeType::Feat);
    }

    #[test]
    fn test_keyword_spans_multiple_subjects() {
        // Keywords are matched over the concatenation, so a match in any
        // subject counts.
        let commits = subjects(&["bump version", "tweak config", "fix lint"]);
        assert_eq!(classify(&commits), ChangeType::Fix);
    }
}
