use thiserror::Error;

#[derive(Error, Debug)]
pub enum PrPilotError {
    #[error("Configuration error: {0}")]
    Config(Box<figment::Error>),

    #[error("required tool '{0}' not found on PATH")]
    MissingTool(String),

    #[error("Source control error: {0}")]
    SourceControl(String),

    #[error("no commits between '{base}' and '{head}', nothing to submit")]
    EmptyCommitRange { base: String, head: String },

    #[error("resolved PR title is empty")]
    EmptyTitle,

    #[error("no pull request found for branch '{0}'")]
    MissingPr(String),

    #[error("no review-bot summary found on PR #{0}, nothing to update")]
    NoBotSummary(u64),

    #[error("editor exited with {0}, aborting")]
    Editor(String),

    #[error("Host API error: {0}")]
    Host(String),

    #[error("AI handler error: {0}")]
    AiHandler(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Template rendering error: {0}")]
    Template(#[from] minijinja::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl From<figment::Error> for PrPilotError {
    fn from(err: figment::Error) -> Self {
        PrPilotError::Config(Box::new(err))
    }
}
