use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

use super::{HostProvider, NewPullRequest, PrRef, PrView, ReviewRecord};
use crate::config::loader::get_settings;
use crate::error::PrPilotError;
use crate::scm::remote::RepoSlug;

/// GitHub provider implementation using raw reqwest for full API control.
pub struct GithubProvider {
    /// Raw reqwest client.
    client: Client,
    /// Base URL for the GitHub API (supports Enterprise).
    base_url: String,
    /// Auth token.
    token: String,
    /// Full repo name "owner/repo".
    repo_full: String,
}

impl GithubProvider {
    /// Create a new GitHub provider for a repository.
    pub fn new(slug: &RepoSlug) -> Result<Self, PrPilotError> {
        let settings = get_settings();

        let base_url = if slug.host == "github.com" {
            settings.github.base_url.clone()
        } else {
            // Enterprise hosts serve the API under /api/v3
            format!("https://{}/api/v3", slug.host)
        };
        let timeout = std::time::Duration::from_secs(settings.config.ai_timeout);
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PrPilotError::Other(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url,
            token: settings.github.user_token.clone(),
            repo_full: slug.full_name(),
        })
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), path);
        self.client
            .request(method, url)
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", "pr-pilot")
    }

    /// Check response status and return a Host error on failure.
    async fn check_response(
        resp: reqwest::Response,
        method: &str,
    ) -> Result<reqwest::Response, PrPilotError> {
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(PrPilotError::Host(format!(
                "GitHub API {method} {status}: {body}"
            )));
        }
        Ok(resp)
    }

    /// Make an authenticated GET request to the GitHub API.
    async fn api_get(&self, path: &str) -> Result<serde_json::Value, PrPilotError> {
        let resp = self
            .request(reqwest::Method::GET, path)
            .send()
            .await
            .map_err(PrPilotError::Http)?;
        let resp = Self::check_response(resp, "GET").await?;
        resp.json().await.map_err(PrPilotError::Http)
    }

    /// Make an authenticated POST request to the GitHub API.
    async fn api_post(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, PrPilotError> {
        let resp = self
            .request(reqwest::Method::POST, path)
            .json(body)
            .send()
            .await
            .map_err(PrPilotError::Http)?;
        let resp = Self::check_response(resp, "POST").await?;
        resp.json().await.map_err(PrPilotError::Http)
    }

    /// Make an authenticated PATCH request.
    async fn api_patch(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, PrPilotError> {
        let resp = self
            .request(reqwest::Method::PATCH, path)
            .json(body)
            .send()
            .await
            .map_err(PrPilotError::Http)?;
        let resp = Self::check_response(resp, "PATCH").await?;
        resp.json().await.map_err(PrPilotError::Http)
    }

    fn records_from_array(items: &serde_json::Value, author_key: &str) -> Vec<ReviewRecord> {
        items
            .as_array()
            .map(|arr| {
                arr.iter()
                    .map(|item| ReviewRecord {
                        author: item[author_key]["login"]
                            .as_str()
                            .unwrap_or_default()
                            .to_string(),
                        body: item["body"].as_str().unwrap_or_default().to_string(),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[async_trait]
impl HostProvider for GithubProvider {
    async fn create_pr(&self, pr: &NewPullRequest) -> Result<PrRef, PrPilotError> {
        let body = json!({
            "title": pr.title,
            "body": pr.body,
            "base": pr.base,
            "head": pr.head,
            "draft": pr.draft,
        });
        let created = self
            .api_post(&format!("repos/{}/pulls", self.repo_full), &body)
            .await?;

        let number = created["number"].as_u64().ok_or_else(|| {
            PrPilotError::Host("create PR response missing 'number'".into())
        })?;
        let url = created["html_url"].as_str().unwrap_or_default().to_string();

        // Labels ride on the issues endpoint; a failure here must not undo
        // the already-created PR.
        if !pr.labels.is_empty() {
            let label_body = json!({ "labels": pr.labels });
            if let Err(e) = self
                .api_post(
                    &format!("repos/{}/issues/{number}/labels", self.repo_full),
                    &label_body,
                )
                .await
            {
                tracing::warn!(error = %e, "failed to apply labels to new PR");
            }
        }

        Ok(PrRef { number, url })
    }

    async fn edit_pr_body(&self, number: u64, body: &str) -> Result<(), PrPilotError> {
        self.api_patch(
            &format!("repos/{}/pulls/{number}", self.repo_full),
            &json!({ "body": body }),
        )
        .await?;
        Ok(())
    }

    async fn view_pr(&self, number: u64) -> Result<PrView, PrPilotError> {
        let pr = self
            .api_get(&format!("repos/{}/pulls/{number}", self.repo_full))
            .await?;
        let url = pr["html_url"].as_str().unwrap_or_default().to_string();

        let reviews = self
            .api_get(&format!(
                "repos/{}/pulls/{number}/reviews?per_page=100",
                self.repo_full
            ))
            .await?;
        let comments = self
            .api_get(&format!(
                "repos/{}/issues/{number}/comments?per_page=100",
                self.repo_full
            ))
            .await?;

        Ok(PrView {
            number,
            url,
            reviews: Self::records_from_array(&reviews, "user"),
            comments: Self::records_from_array(&comments, "user"),
        })
    }

    async fn label_exists(&self, name: &str) -> Result<bool, PrPilotError> {
        let encoded = urlencode(name);
        let resp = self
            .request(
                reqwest::Method::GET,
                &format!("repos/{}/labels/{encoded}", self.repo_full),
            )
            .send()
            .await
            .map_err(PrPilotError::Http)?;
        match resp.status().as_u16() {
            404 => Ok(false),
            _ => {
                Self::check_response(resp, "GET").await?;
                Ok(true)
            }
        }
    }

    async fn create_label(
        &self,
        name: &str,
        color: &str,
        description: &str,
    ) -> Result<(), PrPilotError> {
        self.api_post(
            &format!("repos/{}/labels", self.repo_full),
            &json!({
                "name": name,
                "color": color,
                "description": description,
            }),
        )
        .await?;
        Ok(())
    }

    async fn list_open_prs(&self, head_branch: &str) -> Result<Vec<PrRef>, PrPilotError> {
        // GitHub's head filter requires the "owner:branch" form.
        let owner = self
            .repo_full
            .split('/')
            .next()
            .unwrap_or_default()
            .to_string();
        let prs = self
            .api_get(&format!(
                "repos/{}/pulls?state=open&head={owner}:{}&sort=created&direction=desc",
                self.repo_full,
                urlencode(head_branch)
            ))
            .await?;
        Ok(prs
            .as_array()
            .map(|arr| {
                arr.iter()
                    .filter_map(|pr| {
                        Some(PrRef {
                            number: pr["number"].as_u64()?,
                            url: pr["html_url"].as_str().unwrap_or_default().to_string(),
                        })
                    })
                    .collect()
            })
            .unwrap_or_default())
    }
}

/// Percent-encode a path/query segment (labels and branches may hold spaces,
/// slashes, unicode).
fn urlencode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for byte in s.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => {
                out.push('%');
                out.push_str(&format!("{byte:02X}"));
            }
        }
    }
    out
}
