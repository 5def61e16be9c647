use std::sync::Arc;

use crate::error::PrPilotError;
use crate::host::{HostProvider, PrRef};
use crate::scm::SourceControl;

/// Resolve the open PR for the current branch.
///
/// The browser launch itself happens in the CLI layer; this tool only does
/// the lookup so it stays testable.
pub struct OpenPullRequest {
    scm: Arc<dyn SourceControl>,
    host: Arc<dyn HostProvider>,
}

impl OpenPullRequest {
    pub fn new(scm: Arc<dyn SourceControl>, host: Arc<dyn HostProvider>) -> Self {
        Self { scm, host }
    }

    pub async fn run(&self) -> Result<PrRef, PrPilotError> {
        let branch = self.scm.current_branch().await?;
        let prs = self.host.list_open_prs(&branch).await?;
        prs.into_iter()
            .next()
            .ok_or(PrPilotError::MissingPr(branch))
    }
}
