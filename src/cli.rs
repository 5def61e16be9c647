use std::collections::HashMap;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::config::loader::init_settings;
use crate::error::PrPilotError;
use crate::host::github::GithubProvider;
use crate::scm::SourceControl;
use crate::scm::local::GitCli;
use crate::scm::remote::parse_remote_url;
use crate::tools::create::{CreateOptions, CreatePullRequest};
use crate::tools::edit::RefreshDescription;
use crate::tools::open::OpenPullRequest;

/// pr-pilot: scriptable pull request creation and maintenance.
#[derive(Parser, Debug)]
#[command(name = "pr-pilot", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Extra arguments passed as config overrides (--section.key=value).
    /// Place after `--` separator: `pr-pilot create -- --labels.default_index=0`
    #[arg(last = true, allow_hyphen_values = true, global = true)]
    pub rest: Vec<String>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Create a pull request for the current branch.
    Create {
        /// Target branch (defaults to `create.base_branch`).
        #[arg(long)]
        base: Option<String>,
        /// Source branch (defaults to the checked-out branch).
        #[arg(long)]
        head: Option<String>,
        /// Create the PR as a draft.
        #[arg(long)]
        draft: bool,
        /// Skip the interactive editor pass.
        #[arg(long)]
        no_prompt: bool,
        /// Skip the AI title suggestion.
        #[arg(long)]
        no_ai: bool,
    },
    /// Replace a PR description with the review bot's summary.
    Edit {
        /// Pull request number.
        number: u64,
    },
    /// Open the current branch's PR in the browser.
    Open,
}

impl Command {
    /// Return the canonical subcommand name used in logs.
    pub fn canonical_name(&self) -> &'static str {
        match self {
            Command::Create { .. } => "create",
            Command::Edit { .. } => "edit",
            Command::Open => "open",
        }
    }
}

/// Forbidden config keys that cannot be overridden via trailing CLI args.
///
/// These are security-sensitive: scripts wrapping pr-pilot should not be
/// able to redirect requests or inject credentials through override args.
pub const FORBIDDEN_OVERRIDE_KEYS: &[&str] =
    &["key", "user_token", "base_url", "api_base"];

/// Check if a config key is forbidden for override.
///
/// Returns `Some(matched_forbidden_key)` if the key matches, `None` if allowed.
pub fn check_forbidden_key(key: &str) -> Option<&'static str> {
    let key_lower = key.to_lowercase();
    let segments: Vec<&str> = key_lower.split('.').collect();
    FORBIDDEN_OVERRIDE_KEYS
        .iter()
        .find(|&&forbidden| key_lower == forbidden || segments.contains(&forbidden))
        .copied()
}

/// Parse the `rest` args into a HashMap of config overrides.
/// Format: `--section.key=value` or `--section__key=value` (double underscores → dots).
fn parse_config_overrides(rest: &[String]) -> Result<HashMap<String, String>, PrPilotError> {
    let mut overrides = HashMap::new();

    for arg in rest {
        let stripped = arg.trim_start_matches('-');
        if stripped.is_empty() {
            continue;
        }

        let stripped = stripped.replace("__", ".");

        if let Some((key, value)) = stripped.split_once('=') {
            if let Some(forbidden) = check_forbidden_key(key) {
                return Err(PrPilotError::Other(format!(
                    "forbidden CLI override: '{key}' (matches '{forbidden}')"
                )));
            }

            overrides.insert(key.to_string(), value.to_string());
        }
        // Args without `=` are not config overrides; ignored
    }

    Ok(overrides)
}

pub async fn run() -> Result<(), PrPilotError> {
    let cli = Cli::parse();

    let config_overrides = parse_config_overrides(&cli.rest)?;
    let settings = init_settings(&config_overrides)?;

    tracing::info!(
        command = cli.command.canonical_name(),
        overrides = config_overrides.len(),
        model = %settings.config.model,
        "starting pr-pilot"
    );

    let git = Arc::new(GitCli::ensure_available().await?);

    match cli.command {
        Command::Create {
            base,
            head,
            draft,
            no_prompt,
            no_ai,
        } => {
            let branch = match &head {
                Some(h) => h.clone(),
                None => git.current_branch().await?,
            };
            let host = github_host(git.as_ref(), &branch).await?;
            let tool = CreatePullRequest::new(git.clone(), host);
            let pr = tool
                .run(&CreateOptions {
                    base,
                    head,
                    draft,
                    no_prompt,
                    no_ai,
                })
                .await?;
            println!("{}", pr.url);
        }
        Command::Edit { number } => {
            // Slug resolution tolerates detached HEAD; the PR number is
            // what identifies the work here.
            let branch = git.current_branch().await.unwrap_or_default();
            let host = github_host(git.as_ref(), &branch).await?;
            let url = RefreshDescription::new(host).run(number).await?;
            println!("{url}");
        }
        Command::Open => {
            let branch = git.current_branch().await?;
            let host = github_host(git.as_ref(), &branch).await?;
            let tool = OpenPullRequest::new(git.clone(), host);
            let pr = tool.run().await?;
            if webbrowser::open(&pr.url).is_err() {
                println!("{}", pr.url);
            }
        }
    }

    Ok(())
}

/// Build the GitHub provider from the branch's push remote.
async fn github_host(
    git: &GitCli,
    branch: &str,
) -> Result<Arc<GithubProvider>, PrPilotError> {
    let remote_url = git.push_remote_url(branch).await?;
    let slug = parse_remote_url(&remote_url)?;
    tracing::debug!(repo = %slug.full_name(), host = %slug.host, "resolved repository");
    Ok(Arc::new(GithubProvider::new(&slug)?))
}
