pub mod local;
pub mod remote;

use async_trait::async_trait;

use crate::error::PrPilotError;

/// Trait for the local source-control query interface.
///
/// The pipeline only reads history and refs; all mutations happen on the
/// hosting side.
#[async_trait]
pub trait SourceControl: Send + Sync {
    /// Name of the currently checked-out branch. Fails on detached HEAD.
    async fn current_branch(&self) -> Result<String, PrPilotError>;

    /// Commit subject lines in `base..head`, newest first.
    async fn commit_subjects(&self, base: &str, head: &str)
    -> Result<Vec<String>, PrPilotError>;

    /// Number of commits in `base..head`.
    async fn commit_count(&self, base: &str, head: &str) -> Result<usize, PrPilotError>;

    /// Push URL of the branch's remote (falls back to `origin`).
    async fn push_remote_url(&self, branch: &str) -> Result<String, PrPilotError>;
}
