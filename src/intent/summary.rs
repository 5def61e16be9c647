use crate::host::ReviewRecord;

/// States of the line scanner that slices the summary block out of a bot
/// review body. Modeled explicitly so the under-specified paths are named
/// and testable instead of hiding in boolean flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    /// Before the `## <marker>` heading.
    Seeking,
    /// Under the marker heading, no changelog section seen yet.
    InSummary,
    /// Saw the changelog heading, waiting for one of its two sub-layouts.
    InChangelogUnresolved,
    /// Inside an expandable `<details>` block.
    InDetailsBlock,
    /// Inside a bullet list.
    InBulletList,
    Done,
}

/// Find the bot-authored summary among a PR's records and slice it out.
///
/// Reviews are scanned before comments (fixed priority); the first record
/// whose author equals `bot_author` and whose body contains `marker` is
/// selected. Returns `None` when no record qualifies; the caller treats
/// that as a terminal "nothing to update".
pub fn extract<'a, I>(records: I, bot_author: &str, marker: &str) -> Option<String>
where
    I: IntoIterator<Item = &'a ReviewRecord>,
{
    let record = records
        .into_iter()
        .find(|r| r.author == bot_author && r.body.contains(marker))?;
    Some(slice_summary(&record.body, marker))
}

/// Slice the summary block out of one record body.
///
/// With a `## <marker>` heading present, runs the structured scan below it.
/// Without one, falls back to everything before the first `<details` line
/// (a heuristic for malformed or differently-shaped bot output). Either way
/// blank-line runs are collapsed afterwards.
pub fn slice_summary(body: &str, marker: &str) -> String {
    let heading = format!("## {marker}");
    let has_heading = body.lines().any(|line| line.trim() == heading);

    let extracted = if has_heading {
        structured_scan(body, &heading)
    } else {
        naive_head_scan(body)
    };
    collapse_blank_runs(&extracted)
}

/// Structured scan: emit the lines under the marker heading, relabel the
/// changelog heading from level 3 to level 2, and pass one of its two
/// sub-layouts through verbatim.
///
/// When the changelog heading is followed by neither a `<details>` tag nor
/// a bullet line, nothing beyond the relabeled heading is emitted (known
/// limitation, kept visible via the `InChangelogUnresolved` state).
fn structured_scan(body: &str, heading: &str) -> String {
    let mut state = ScanState::Seeking;
    let mut out: Vec<&str> = Vec::new();

    for line in body.lines() {
        match state {
            ScanState::Seeking => {
                if line.trim() == heading {
                    state = ScanState::InSummary;
                }
            }
            ScanState::InSummary => {
                if line.trim() == "### Changelog" {
                    out.push("## Changelog");
                    state = ScanState::InChangelogUnresolved;
                } else {
                    out.push(line);
                }
            }
            ScanState::InChangelogUnresolved => {
                if line.trim_start().starts_with("<details") {
                    out.push(line);
                    state = ScanState::InDetailsBlock;
                } else if is_bullet(line) {
                    out.push(line);
                    state = ScanState::InBulletList;
                }
                // Anything else before a sub-layout appears is dropped.
            }
            ScanState::InDetailsBlock => {
                out.push(line);
                if line.contains("</details>") {
                    state = ScanState::Done;
                }
            }
            ScanState::InBulletList => {
                if line.trim().is_empty() || line.starts_with("## ") {
                    state = ScanState::Done;
                } else {
                    out.push(line);
                }
            }
            ScanState::Done => break,
        }
        if state == ScanState::Done {
            break;
        }
    }

    out.join("\n")
}

/// Bullet-list lines: `* ` at the margin or indented by two spaces.
fn is_bullet(line: &str) -> bool {
    line.starts_with("* ") || line.starts_with("  * ")
}

/// Fallback: everything from the start of the body up to (excluding) the
/// first opening `<details` line.
fn naive_head_scan(body: &str) -> String {
    body.lines()
        .take_while(|line| !line.trim_start().starts_with("<details"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Collapse runs of consecutive blank lines to a single blank line and trim
/// blank edges.
fn collapse_blank_runs(text: &str) -> String {
    let mut out: Vec<&str> = Vec::new();
    let mut last_blank = false;
    for line in text.lines() {
        let blank = line.trim().is_empty();
        if blank && last_blank {
            continue;
        }
        out.push(if blank { "" } else { line });
        last_blank = blank;
    }
    while out.first().is_some_and(|l| l.is_empty()) {
        out.remove(0);
    }
    while out.last().is_some_and(|l| l.is_empty()) {
        out.pop();
    }
    out.join("\n")
}
