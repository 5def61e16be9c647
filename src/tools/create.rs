use std::collections::HashMap;
use std::sync::Arc;

use minijinja::Value;

use crate::ai::AiHandler;
use crate::config::loader::get_settings;
use crate::editor::{EditedMessage, edit_interactive};
use crate::error::PrPilotError;
use crate::host::{HostProvider, NewPullRequest, PrRef};
use crate::intent::classify::classify;
use crate::intent::labels::{LabelMapping, ensure_label_exists};
use crate::intent::title::{TitleSources, extract_issue_ref, resolve_title};
use crate::scm::SourceControl;
use crate::template::render::render_prompt;
use crate::tools::resolve_ai_handler;

/// PR creation tool.
///
/// Classifies the commit range, resolves a title from its competing
/// sources, reconciles the label, and opens the PR.
pub struct CreatePullRequest {
    scm: Arc<dyn SourceControl>,
    host: Arc<dyn HostProvider>,
    ai: Option<Arc<dyn AiHandler>>,
}

/// Per-invocation flags (CLI layer fills these in).
#[derive(Debug, Default)]
pub struct CreateOptions {
    pub base: Option<String>,
    pub head: Option<String>,
    pub draft: bool,
    /// Skip the interactive editor pass.
    pub no_prompt: bool,
    /// Skip the AI title suggestion.
    pub no_ai: bool,
}

impl CreatePullRequest {
    pub fn new(scm: Arc<dyn SourceControl>, host: Arc<dyn HostProvider>) -> Self {
        Self {
            scm,
            host,
            ai: None,
        }
    }

    #[cfg(test)]
    pub fn new_with_ai(
        scm: Arc<dyn SourceControl>,
        host: Arc<dyn HostProvider>,
        ai: Arc<dyn AiHandler>,
    ) -> Self {
        Self {
            scm,
            host,
            ai: Some(ai),
        }
    }

    /// Run the full creation pipeline. Returns the created PR reference.
    pub async fn run(&self, opts: &CreateOptions) -> Result<PrRef, PrPilotError> {
        let settings = get_settings();

        // 1. Resolve refs
        let head = match &opts.head {
            Some(h) => h.clone(),
            None => self.scm.current_branch().await?,
        };
        let base = opts
            .base
            .clone()
            .unwrap_or_else(|| settings.create.base_branch.clone());

        // 2. Commit range; an empty range is a terminal input error
        let count = self.scm.commit_count(&base, &head).await?;
        if count == 0 {
            return Err(PrPilotError::EmptyCommitRange { base, head });
        }
        let subjects = self.scm.commit_subjects(&base, &head).await?;
        tracing::info!(branch = %head, base = %base, commits = count, "preparing pull request");

        // 3. Classify and extract the issue reference
        let change_type = classify(&subjects);
        let issue_ref = extract_issue_ref(&head, &subjects);
        tracing::debug!(change_type = %change_type, issue = ?issue_ref, "classified commit range");

        let mapping = LabelMapping::load(&settings.labels);

        // 4. Optional AI title suggestion; any failure degrades to synthesis
        let ai_suggestion = if !opts.no_ai && settings.create.generate_ai_title {
            self.suggest_title(&head, &base, change_type.as_str(), &subjects, issue_ref)
                .await
        } else {
            None
        };

        // 5. Optional interactive edit, seeded with the best title so far
        let latest_subject = subjects.first().map(String::as_str).unwrap_or_default();
        let provisional = resolve_title(
            &TitleSources {
                manual: None,
                ai_suggestion: ai_suggestion.as_deref(),
                change_type,
                latest_commit_subject: latest_subject,
                issue_ref,
            },
            &mapping,
        );

        let edited: Option<EditedMessage> = if !opts.no_prompt && settings.create.open_editor {
            let seed = format!(
                "{provisional}\n\n\
                 # Edit the pull request. The first line becomes the title,\n\
                 # the rest the body. Lines starting with '#' are stripped.\n\
                 # An empty title aborts the operation.\n"
            );
            Some(edit_interactive(&seed).await?)
        } else {
            None
        };

        // 6. Final title resolution; normalization runs on the winner
        let title = resolve_title(
            &TitleSources {
                manual: edited.as_ref().map(|e| e.title.as_str()),
                ai_suggestion: ai_suggestion.as_deref(),
                change_type,
                latest_commit_subject: latest_subject,
                issue_ref,
            },
            &mapping,
        );
        if title.is_empty() {
            return Err(PrPilotError::EmptyTitle);
        }

        // 7. Label reconciliation; label omission never blocks creation
        let label = mapping.map_label(&head, &title).to_string();
        ensure_label_exists(self.host.as_ref(), &label, &settings.labels).await;

        // 8. Body: edited text, else the commit subjects as bullets
        let body = match &edited {
            Some(msg) if !msg.body.is_empty() => msg.body.clone(),
            _ => subjects
                .iter()
                .map(|s| format!("* {s}"))
                .collect::<Vec<_>>()
                .join("\n"),
        };

        let draft = opts.draft || settings.create.draft;
        let pr = self
            .host
            .create_pr(&NewPullRequest {
                title: title.clone(),
                body,
                base,
                head,
                draft,
                labels: vec![label],
            })
            .await?;
        tracing::info!(number = pr.number, url = %pr.url, title = %title, "pull request created");
        Ok(pr)
    }

    /// Ask the AI model for a title. Every failure path returns `None` so the
    /// synthesized title takes over.
    async fn suggest_title(
        &self,
        branch: &str,
        base: &str,
        change_type: &str,
        subjects: &[String],
        issue_ref: Option<u64>,
    ) -> Option<String> {
        let settings = get_settings();

        let mut vars: HashMap<String, Value> = HashMap::new();
        vars.insert("branch".into(), Value::from(branch));
        vars.insert("base".into(), Value::from(base));
        vars.insert("change_type".into(), Value::from(change_type));
        vars.insert(
            "commits".into(),
            Value::from(subjects.to_vec()),
        );
        vars.insert(
            "issue_number".into(),
            Value::from(issue_ref.map(|n| n.to_string()).unwrap_or_default()),
        );

        let rendered = match render_prompt(&settings.pr_title_prompt, vars) {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(error = %e, "failed to render title prompt, skipping AI suggestion");
                return None;
            }
        };

        let ai = match resolve_ai_handler(&self.ai) {
            Ok(ai) => ai,
            Err(e) => {
                tracing::warn!(error = %e, "AI handler unavailable, skipping title suggestion");
                return None;
            }
        };

        let response = match crate::ai::chat_completion_with_fallback(
            ai.as_ref(),
            &settings.config.model,
            &settings.config.fallback_models,
            &rendered.system,
            &rendered.user,
            Some(settings.config.temperature),
        )
        .await
        {
            Ok(resp) => resp,
            Err(e) => {
                tracing::warn!(error = %e, "AI title suggestion failed, falling back to synthesis");
                return None;
            }
        };

        match crate::ai::parse_json_field(&response.content, "title") {
            Some(title) => {
                tracing::debug!(title = %title, "AI suggested title");
                Some(title)
            }
            None => {
                tracing::warn!("AI response missing 'title' field, falling back to synthesis");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::mock_ai::MockAiHandler;
    use crate::testing::mock_host::MockHostProvider;
    use crate::testing::mock_scm::MockSourceControl;

    fn opts() -> CreateOptions {
        CreateOptions {
            no_prompt: true,
            no_ai: true,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_synthesized_title_and_label() {
        let scm = Arc::new(MockSourceControl::new(
            "fix-123-login",
            &["fix: null pointer on login (#123)"],
        ));
        let host = Arc::new(MockHostProvider::new());
        let tool = CreatePullRequest::new(scm, host.clone());

        let pr = tool.run(&opts()).await.unwrap();
        assert_eq!(pr.number, 101);

        let calls = host.calls();
        assert_eq!(calls.created_prs.len(), 1);
        let created = &calls.created_prs[0];
        // Double-wrapped synthesis repaired by normalization
        assert_eq!(created.title, "fix: null pointer on login (#123)");
        assert_eq!(created.labels, vec!["bug".to_string()]);
        assert_eq!(created.base, "main");
        assert_eq!(created.head, "fix-123-login");
        assert!(!created.draft);
        // Label was absent, so it got created
        assert_eq!(calls.created_labels.len(), 1);
        assert_eq!(calls.created_labels[0].0, "bug");
    }

    #[tokio::test]
    async fn test_create_empty_range_is_fatal() {
        let scm = Arc::new(MockSourceControl::new("feature-x", &[]));
        let host = Arc::new(MockHostProvider::new());
        let tool = CreatePullRequest::new(scm, host.clone());

        let err = tool.run(&opts()).await.unwrap_err();
        assert!(matches!(err, PrPilotError::EmptyCommitRange { .. }));
        assert!(host.calls().created_prs.is_empty());
    }

    #[tokio::test]
    async fn test_create_uses_ai_title_when_available() {
        let scm = Arc::new(MockSourceControl::new(
            "feature-dark-mode",
            &["wip", "more wip"],
        ));
        let host = Arc::new(MockHostProvider::new());
        let ai = Arc::new(MockAiHandler::with_response(
            r#"{"title": "feat: add dark mode toggle"}"#,
        ));
        let tool = CreatePullRequest::new_with_ai(scm, host.clone(), ai);

        let run_opts = CreateOptions {
            no_prompt: true,
            ..Default::default()
        };
        tool.run(&run_opts).await.unwrap();

        let calls = host.calls();
        assert_eq!(calls.created_prs[0].title, "feat: add dark mode toggle");
    }

    #[tokio::test]
    async fn test_create_ai_failure_degrades_to_synthesis() {
        let scm = Arc::new(MockSourceControl::new("tweaks", &["adjust padding"]));
        let host = Arc::new(MockHostProvider::new());
        let ai = Arc::new(MockAiHandler::failing());
        let tool = CreatePullRequest::new_with_ai(scm, host.clone(), ai);

        let run_opts = CreateOptions {
            no_prompt: true,
            ..Default::default()
        };
        tool.run(&run_opts).await.unwrap();

        let calls = host.calls();
        // No keyword match → default change type
        assert_eq!(calls.created_prs[0].title, "feat: adjust padding");
    }

    #[tokio::test]
    async fn test_create_ai_null_sentinel_degrades_to_synthesis() {
        let scm = Arc::new(MockSourceControl::new("tweaks", &["adjust padding"]));
        let host = Arc::new(MockHostProvider::new());
        let ai = Arc::new(MockAiHandler::with_response(r#"{"title": "null"}"#));
        let tool = CreatePullRequest::new_with_ai(scm, host.clone(), ai);

        let run_opts = CreateOptions {
            no_prompt: true,
            ..Default::default()
        };
        tool.run(&run_opts).await.unwrap();

        assert_eq!(host.calls().created_prs[0].title, "feat: adjust padding");
    }

    #[tokio::test]
    async fn test_create_body_lists_commit_subjects() {
        let scm = Arc::new(MockSourceControl::new(
            "fix-cache",
            &["fix: stale cache reads", "add regression test"],
        ));
        let host = Arc::new(MockHostProvider::new());
        let tool = CreatePullRequest::new(scm, host.clone());

        tool.run(&opts()).await.unwrap();

        let calls = host.calls();
        assert_eq!(
            calls.created_prs[0].body,
            "* fix: stale cache reads\n* add regression test"
        );
    }

    #[tokio::test]
    async fn test_create_existing_label_not_recreated() {
        let scm = Arc::new(MockSourceControl::new("fix-1", &["fix: x"]));
        let host = Arc::new(MockHostProvider::new().with_existing_labels(&["bug"]));
        let tool = CreatePullRequest::new(scm, host.clone());

        tool.run(&opts()).await.unwrap();
        assert!(host.calls().created_labels.is_empty());
    }

    #[tokio::test]
    async fn test_create_label_failure_does_not_block_pr() {
        let scm = Arc::new(MockSourceControl::new("fix-1", &["fix: x"]));
        let host = Arc::new(MockHostProvider::new().with_label_exists_failure());
        let tool = CreatePullRequest::new(scm, host.clone());

        let pr = tool.run(&opts()).await.unwrap();
        assert_eq!(pr.number, 101);
        assert_eq!(host.calls().created_prs.len(), 1);
    }

    #[tokio::test]
    async fn test_create_base_and_draft_overrides() {
        let scm = Arc::new(MockSourceControl::new("fix-1", &["fix: x"]));
        let host = Arc::new(MockHostProvider::new());
        let tool = CreatePullRequest::new(scm, host.clone());

        let run_opts = CreateOptions {
            base: Some("release/1.2".into()),
            draft: true,
            no_prompt: true,
            no_ai: true,
            ..Default::default()
        };
        tool.run(&run_opts).await.unwrap();

        let calls = host.calls();
        assert_eq!(calls.created_prs[0].base, "release/1.2");
        assert!(calls.created_prs[0].draft);
    }
}
