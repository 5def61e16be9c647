use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::PrPilotError;
use crate::host::{HostProvider, NewPullRequest, PrRef, PrView, ReviewRecord};

/// Captured calls made to the mock provider, for test assertions.
#[derive(Debug, Default)]
pub struct MockCalls {
    pub created_prs: Vec<NewPullRequest>,
    pub edited_bodies: Vec<(u64, String)>,
    /// (name, color, description) triples passed to create_label.
    pub created_labels: Vec<(String, String, String)>,
}

/// Mock hosting provider for pipeline tests.
///
/// Pre-configured with labels, a PR view, and open PRs. Captures all
/// mutating calls for assertions.
pub struct MockHostProvider {
    pub existing_labels: Mutex<HashSet<String>>,
    pub fail_create_label: bool,
    pub fail_label_exists: bool,
    pub view: Option<PrView>,
    pub open_prs: Vec<PrRef>,
    pub calls: Mutex<MockCalls>,
}

impl MockHostProvider {
    pub fn new() -> Self {
        Self {
            existing_labels: Mutex::new(HashSet::new()),
            fail_create_label: false,
            fail_label_exists: false,
            view: None,
            open_prs: Vec::new(),
            calls: Mutex::new(MockCalls::default()),
        }
    }

    pub fn with_existing_labels(self, labels: &[&str]) -> Self {
        {
            let mut set = self.existing_labels.lock().unwrap();
            for label in labels {
                set.insert(label.to_string());
            }
        }
        self
    }

    pub fn with_create_label_failure(mut self) -> Self {
        self.fail_create_label = true;
        self
    }

    pub fn with_label_exists_failure(mut self) -> Self {
        self.fail_label_exists = true;
        self
    }

    pub fn with_view(mut self, view: PrView) -> Self {
        self.view = Some(view);
        self
    }

    pub fn with_open_prs(mut self, prs: Vec<PrRef>) -> Self {
        self.open_prs = prs;
        self
    }

    pub fn calls(&self) -> std::sync::MutexGuard<'_, MockCalls> {
        self.calls.lock().unwrap()
    }
}

#[async_trait]
impl HostProvider for MockHostProvider {
    async fn create_pr(&self, pr: &NewPullRequest) -> Result<PrRef, PrPilotError> {
        self.calls.lock().unwrap().created_prs.push(pr.clone());
        Ok(PrRef {
            number: 101,
            url: "https://github.com/acme/widgets/pull/101".into(),
        })
    }

    async fn edit_pr_body(&self, number: u64, body: &str) -> Result<(), PrPilotError> {
        self.calls
            .lock()
            .unwrap()
            .edited_bodies
            .push((number, body.to_string()));
        Ok(())
    }

    async fn view_pr(&self, number: u64) -> Result<PrView, PrPilotError> {
        match &self.view {
            Some(view) => Ok(view.clone()),
            None => Err(PrPilotError::Host(format!("PR #{number} not found"))),
        }
    }

    async fn label_exists(&self, name: &str) -> Result<bool, PrPilotError> {
        if self.fail_label_exists {
            return Err(PrPilotError::Host("label lookup unavailable".into()));
        }
        Ok(self.existing_labels.lock().unwrap().contains(name))
    }

    async fn create_label(
        &self,
        name: &str,
        color: &str,
        description: &str,
    ) -> Result<(), PrPilotError> {
        if self.fail_create_label {
            return Err(PrPilotError::Host("label create rejected".into()));
        }
        self.calls.lock().unwrap().created_labels.push((
            name.to_string(),
            color.to_string(),
            description.to_string(),
        ));
        self.existing_labels.lock().unwrap().insert(name.to_string());
        Ok(())
    }

    async fn list_open_prs(&self, _head_branch: &str) -> Result<Vec<PrRef>, PrPilotError> {
        Ok(self.open_prs.clone())
    }
}

/// Build a PrView with bot review/comment bodies for extraction tests.
pub fn view_with_records(
    number: u64,
    reviews: Vec<ReviewRecord>,
    comments: Vec<ReviewRecord>,
) -> PrView {
    PrView {
        number,
        url: format!("https://github.com/acme/widgets/pull/{number}"),
        reviews,
        comments,
    }
}
