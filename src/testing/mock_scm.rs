use async_trait::async_trait;

use crate::error::PrPilotError;
use crate::scm::SourceControl;

/// Mock source control pre-configured with a branch and commit range.
pub struct MockSourceControl {
    pub branch: String,
    pub subjects: Vec<String>,
    pub remote_url: String,
}

impl MockSourceControl {
    pub fn new(branch: &str, subjects: &[&str]) -> Self {
        Self {
            branch: branch.to_string(),
            subjects: subjects.iter().map(|s| s.to_string()).collect(),
            remote_url: "https://github.com/acme/widgets.git".into(),
        }
    }
}

#[async_trait]
impl SourceControl for MockSourceControl {
    async fn current_branch(&self) -> Result<String, PrPilotError> {
        Ok(self.branch.clone())
    }

    async fn commit_subjects(
        &self,
        _base: &str,
        _head: &str,
    ) -> Result<Vec<String>, PrPilotError> {
        Ok(self.subjects.clone())
    }

    async fn commit_count(&self, _base: &str, _head: &str) -> Result<usize, PrPilotError> {
        Ok(self.subjects.len())
    }

    async fn push_remote_url(&self, _branch: &str) -> Result<String, PrPilotError> {
        Ok(self.remote_url.clone())
    }
}
