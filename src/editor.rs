use std::io::Write;

use tokio::process::Command;

use crate::error::PrPilotError;

/// Comment marker: lines starting with this are stripped from the buffer.
const COMMENT_CHAR: char = '#';

/// Outcome of an interactive editing session: first non-blank line becomes
/// the PR title, the remainder the body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditedMessage {
    pub title: String,
    pub body: String,
}

/// Open `$VISUAL`/`$EDITOR` (fallback `vi`) on a seeded buffer and parse the
/// result. A non-zero editor exit aborts the surrounding operation.
pub async fn edit_interactive(seed: &str) -> Result<EditedMessage, PrPilotError> {
    let mut file = tempfile::Builder::new()
        .prefix("pr-pilot-")
        .suffix(".md")
        .tempfile()?;
    file.write_all(seed.as_bytes())?;
    file.flush()?;
    let path = file.path().to_path_buf();

    let editor = std::env::var("VISUAL")
        .or_else(|_| std::env::var("EDITOR"))
        .unwrap_or_else(|_| "vi".to_string());
    let mut parts = editor.split_whitespace();
    let program = parts
        .next()
        .ok_or_else(|| PrPilotError::Editor("empty $EDITOR".into()))?;

    let status = Command::new(program)
        .args(parts)
        .arg(&path)
        .status()
        .await
        .map_err(|e| PrPilotError::Editor(format!("failed to launch '{editor}': {e}")))?;
    if !status.success() {
        return Err(PrPilotError::Editor(status.to_string()));
    }

    let raw = tokio::fs::read_to_string(&path).await?;
    Ok(parse_message(&raw))
}

/// Parse an edited buffer into title and body.
///
/// Comment lines are stripped, leading blanks dropped, the first remaining
/// line is the title, and the blank-line run between title and body is
/// collapsed away.
pub fn parse_message(raw: &str) -> EditedMessage {
    let mut lines = raw
        .lines()
        .filter(|line| !line.trim_start().starts_with(COMMENT_CHAR))
        .skip_while(|line| line.trim().is_empty());

    let title = lines.next().unwrap_or_default().trim().to_string();

    let body_lines: Vec<&str> = lines.skip_while(|line| line.trim().is_empty()).collect();
    let body = body_lines.join("\n").trim_end().to_string();

    EditedMessage { title, body }
}
