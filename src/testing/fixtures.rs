use crate::host::ReviewRecord;

/// The review bot login used across tests.
pub const BOT_AUTHOR: &str = "gemini-code-assist[bot]";

/// A realistic bot review body with the details-block changelog layout.
pub const BOT_REVIEW_DETAILS: &str = "\
Thanks for the contribution!

## Summary of Changes

This change reworks the login flow to survive expired sessions.

### Changelog

<details>
<summary>2 files changed</summary>

* src/session.rs: guard against null session pointers
* src/login.rs: re-validate before redirect

</details>

<details>
<summary>Review settings</summary>
internal knobs
</details>";

/// A bot review body with the bullet-list changelog layout.
pub const BOT_REVIEW_BULLETS: &str = "\
## Summary of Changes

Stabilizes the login flow.

### Changelog
* guard against null session pointers
* re-validate before redirect

## How to review
Start with session.rs.";

pub fn bot_record(body: &str) -> ReviewRecord {
    ReviewRecord {
        author: BOT_AUTHOR.into(),
        body: body.into(),
    }
}

pub fn human_record(body: &str) -> ReviewRecord {
    ReviewRecord {
        author: "octocat".into(),
        body: body.into(),
    }
}
