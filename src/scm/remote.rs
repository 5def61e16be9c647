use url::Url;

use crate::error::PrPilotError;

/// Hosting coordinates inferred from a push remote URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoSlug {
    /// Hostname (e.g. "github.com", or an Enterprise host).
    pub host: String,
    /// Repository owner or organization.
    pub owner: String,
    /// Repository name, without the `.git` suffix.
    pub repo: String,
}

impl RepoSlug {
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

/// Parse a git remote URL into host/owner/repo.
///
/// Supports the three shapes git emits for GitHub-style hosts:
/// - `https://github.com/owner/repo.git`
/// - `ssh://git@github.com/owner/repo.git`
/// - `git@github.com:owner/repo.git` (scp-like, no scheme)
pub fn parse_remote_url(remote: &str) -> Result<RepoSlug, PrPilotError> {
    let remote = remote.trim();
    if remote.is_empty() {
        return Err(PrPilotError::SourceControl("empty remote URL".into()));
    }

    // scp-like form has no scheme: user@host:path
    if !remote.contains("://") {
        return parse_scp_like(remote);
    }

    let url = Url::parse(remote)
        .map_err(|e| PrPilotError::SourceControl(format!("invalid remote URL '{remote}': {e}")))?;
    let host = url
        .host_str()
        .ok_or_else(|| PrPilotError::SourceControl(format!("remote URL has no host: {remote}")))?
        .to_string();

    let parts: Vec<&str> = url
        .path()
        .trim_matches('/')
        .split('/')
        .filter(|s| !s.is_empty())
        .collect();
    slug_from_parts(&host, &parts, remote)
}

fn parse_scp_like(remote: &str) -> Result<RepoSlug, PrPilotError> {
    let after_user = remote.split_once('@').map_or(remote, |(_, rest)| rest);
    let (host, path) = after_user.split_once(':').ok_or_else(|| {
        PrPilotError::SourceControl(format!("unrecognized remote URL: {remote}"))
    })?;
    let parts: Vec<&str> = path
        .trim_matches('/')
        .split('/')
        .filter(|s| !s.is_empty())
        .collect();
    slug_from_parts(host, &parts, remote)
}

fn slug_from_parts(host: &str, parts: &[&str], remote: &str) -> Result<RepoSlug, PrPilotError> {
    if parts.len() < 2 {
        return Err(PrPilotError::SourceControl(format!(
            "cannot infer owner/repo from remote: {remote}"
        )));
    }
    // Last two components are owner/repo; deeper paths (Enterprise
    // subgroups) keep only the tail, matching where the PR actually lives.
    let owner = parts[parts.len() - 2].to_string();
    let repo = parts[parts.len() - 1]
        .trim_end_matches(".git")
        .to_string();
    if repo.is_empty() {
        return Err(PrPilotError::SourceControl(format!(
            "cannot infer repo name from remote: {remote}"
        )));
    }
    Ok(RepoSlug {
        host: host.to_string(),
        owner,
        repo,
    })
}
