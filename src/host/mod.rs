pub mod github;

use async_trait::async_trait;

use crate::error::PrPilotError;

/// A review or comment record attached to a PR.
///
/// Formal review entries and informal issue comments share this shape; the
/// summary pipeline only cares about who wrote it and what it says.
#[derive(Debug, Clone)]
pub struct ReviewRecord {
    pub author: String,
    pub body: String,
}

/// Reviews and comments attached to a PR, fetched fresh per invocation.
#[derive(Debug, Clone)]
pub struct PrView {
    pub number: u64,
    pub url: String,
    pub reviews: Vec<ReviewRecord>,
    pub comments: Vec<ReviewRecord>,
}

/// Lightweight PR identifier, as returned by list queries.
#[derive(Debug, Clone)]
pub struct PrRef {
    pub number: u64,
    pub url: String,
}

/// Parameters for creating a pull request.
#[derive(Debug, Clone)]
pub struct NewPullRequest {
    pub title: String,
    pub body: String,
    pub base: String,
    pub head: String,
    pub draft: bool,
    /// Labels applied after creation. Label failures must not fail the PR.
    pub labels: Vec<String>,
}

/// Trait for the git hosting platform (PR and label operations).
///
/// Calls are single-shot: a non-success status is surfaced to the caller,
/// which degrades or aborts per its own policy. No retry or backoff here.
#[async_trait]
pub trait HostProvider: Send + Sync {
    /// Create a pull request and return its identifier and URL.
    async fn create_pr(&self, pr: &NewPullRequest) -> Result<PrRef, PrPilotError>;

    /// Overwrite the PR body. Destructive: the previous body is replaced.
    async fn edit_pr_body(&self, number: u64, body: &str) -> Result<(), PrPilotError>;

    /// Fetch a PR with its reviews and comments.
    async fn view_pr(&self, number: u64) -> Result<PrView, PrPilotError>;

    /// Whether a label with this name exists on the repository.
    async fn label_exists(&self, name: &str) -> Result<bool, PrPilotError>;

    /// Create a repository label.
    async fn create_label(
        &self,
        name: &str,
        color: &str,
        description: &str,
    ) -> Result<(), PrPilotError>;

    /// Open PRs whose head is the given branch, newest first.
    async fn list_open_prs(&self, head_branch: &str) -> Result<Vec<PrRef>, PrPilotError>;
}
