use async_trait::async_trait;
use tokio::process::Command;

use super::SourceControl;
use crate::error::PrPilotError;

/// Source-control implementation shelling out to the `git` binary.
pub struct GitCli;

impl GitCli {
    /// Verify that `git` is on PATH before any pipeline work starts.
    pub async fn ensure_available() -> Result<Self, PrPilotError> {
        match Command::new("git").arg("--version").output().await {
            Ok(out) if out.status.success() => Ok(Self),
            _ => Err(PrPilotError::MissingTool("git".into())),
        }
    }

    /// Run a git subcommand and return trimmed stdout.
    async fn git_output(&self, args: &[&str]) -> Result<String, PrPilotError> {
        let out = Command::new("git")
            .args(args)
            .output()
            .await
            .map_err(|e| PrPilotError::SourceControl(format!("failed to run git: {e}")))?;
        if !out.status.success() {
            let stderr = String::from_utf8_lossy(&out.stderr);
            return Err(PrPilotError::SourceControl(format!(
                "git {} failed: {}",
                args.join(" "),
                stderr.trim()
            )));
        }
        Ok(String::from_utf8_lossy(&out.stdout).trim().to_string())
    }
}

#[async_trait]
impl SourceControl for GitCli {
    async fn current_branch(&self) -> Result<String, PrPilotError> {
        let branch = self
            .git_output(&["rev-parse", "--abbrev-ref", "HEAD"])
            .await?;
        if branch.is_empty() || branch == "HEAD" {
            // Detached HEAD has no branch to open a PR from.
            return Err(PrPilotError::SourceControl(
                "not on a branch (detached HEAD)".into(),
            ));
        }
        Ok(branch)
    }

    async fn commit_subjects(
        &self,
        base: &str,
        head: &str,
    ) -> Result<Vec<String>, PrPilotError> {
        let range = format!("{base}..{head}");
        let out = self
            .git_output(&["log", "--pretty=format:%s", &range])
            .await?;
        Ok(out
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(String::from)
            .collect())
    }

    async fn commit_count(&self, base: &str, head: &str) -> Result<usize, PrPilotError> {
        let range = format!("{base}..{head}");
        let out = self.git_output(&["rev-list", "--count", &range]).await?;
        out.parse::<usize>().map_err(|_| {
            PrPilotError::SourceControl(format!("unexpected rev-list output: '{out}'"))
        })
    }

    async fn push_remote_url(&self, branch: &str) -> Result<String, PrPilotError> {
        // branch.<name>.remote if configured, else origin
        let remote = self
            .git_output(&["config", "--get", &format!("branch.{branch}.remote")])
            .await
            .unwrap_or_default();
        let remote = if remote.is_empty() {
            "origin"
        } else {
            remote.as_str()
        };
        self.git_output(&["remote", "get-url", "--push", remote])
            .await
    }
}
