use crate::intent::classify::ChangeType;
use crate::intent::labels::LabelMapping;
use crate::util::get_or_compile_regex;

/// Competing title sources, highest precedence first: a manual edit, an AI
/// suggestion, then synthesis from the change type and latest commit.
#[derive(Debug)]
pub struct TitleSources<'a> {
    /// First line of an interactive editing pass, if one ran.
    pub manual: Option<&'a str>,
    /// AI-suggested title, if the call succeeded.
    pub ai_suggestion: Option<&'a str>,
    pub change_type: ChangeType,
    /// Newest commit subject in the range.
    pub latest_commit_subject: &'a str,
    pub issue_ref: Option<u64>,
}

/// Resolve the final PR title from its competing sources.
///
/// Precedence: manual edit > usable AI suggestion > synthesized
/// `"<type>: <subject> (#issue)?"`. Normalization runs exactly once on the
/// winner, whatever its source. Always returns some string; the caller
/// decides whether an empty result is fatal.
pub fn resolve_title(sources: &TitleSources, mapping: &LabelMapping) -> String {
    let raw = if let Some(manual) = sources.manual.map(str::trim).filter(|s| !s.is_empty()) {
        manual.to_string()
    } else if let Some(ai) = usable_ai_suggestion(sources.ai_suggestion) {
        ai.to_string()
    } else {
        let mut title = format!(
            "{}: {}",
            sources.change_type, sources.latest_commit_subject
        );
        if let Some(issue) = sources.issue_ref {
            title.push_str(&format!(" (#{issue})"));
        }
        title
    };
    normalize_title(&raw, mapping)
}

/// An AI suggestion is usable when present, non-empty, and not the literal
/// sentinel "null" some model endpoints emit for no-answer.
fn usable_ai_suggestion(suggestion: Option<&str>) -> Option<&str> {
    suggestion
        .map(str::trim)
        .filter(|s| !s.is_empty() && *s != "null")
}

/// Normalize a resolved title. Idempotent; order matters:
///
/// 1. duplicate type-prefix collapse, repairing `"<t1>: ... <t2>(...): rest"`
///    double-wraps produced by re-running the tool on its own output
///    (any two tokens from the mapping's vocabulary, deliberately
///    permissive across differing tokens);
/// 2. dedupe of an identical trailing `(#N) (#N)` issue-ref pair;
/// 3. whitespace trim.
pub fn normalize_title(title: &str, mapping: &LabelMapping) -> String {
    let mut out = collapse_duplicate_prefix(title, mapping);
    out = dedupe_trailing_issue_ref(&out);
    out.trim().to_string()
}

fn collapse_duplicate_prefix(title: &str, mapping: &LabelMapping) -> String {
    let Some(vocabulary) = vocabulary_pattern(mapping) else {
        return title.to_string();
    };
    let pattern = format!(r"^({vocabulary}): .*?(?:{vocabulary})(?:\([^)]*\))?: (.*)$");
    let Some(re) = get_or_compile_regex(&pattern) else {
        return title.to_string();
    };
    match re.captures(title) {
        Some(caps) => {
            let collapsed = format!("{}: {}", &caps[1], &caps[2]);
            // Replace only when the repair changed something and left a
            // non-empty title; otherwise keep the original.
            if !collapsed.trim().is_empty() && collapsed != title {
                collapsed
            } else {
                title.to_string()
            }
        }
        None => title.to_string(),
    }
}

/// Alternation of the mapping's type tokens, longest first so `docs` is
/// preferred over a `doc` prefix at the same position.
fn vocabulary_pattern(mapping: &LabelMapping) -> Option<String> {
    let mut tokens: Vec<&str> = mapping.type_tokens().collect();
    if tokens.is_empty() {
        return None;
    }
    tokens.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
    tokens.dedup();
    Some(
        tokens
            .iter()
            .map(|t| regex::escape(t))
            .collect::<Vec<_>>()
            .join("|"),
    )
}

fn dedupe_trailing_issue_ref(title: &str) -> String {
    let Some(re) = get_or_compile_regex(r"\(#(\d+)\)\s*\(#(\d+)\)$") else {
        return title.to_string();
    };
    if let Some(caps) = re.captures(title) {
        if caps[1] == caps[2] {
            let keep = format!("(#{})", &caps[1]);
            return re.replace(title, keep.as_str()).into_owned();
        }
    }
    title.to_string()
}

/// Capture the first `#<digits>` reference from the branch name, then from
/// the commit subjects in order. First match wins; absent if none match.
pub fn extract_issue_ref(branch: &str, subjects: &[String]) -> Option<u64> {
    let re = get_or_compile_regex(r"#(\d+)")?;
    std::iter::once(branch)
        .chain(subjects.iter().map(String::as_str))
        .find_map(|text| re.captures(text)?.get(1)?.as_str().parse().ok())
}
