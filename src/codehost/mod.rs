//! Code host adapter: the REST API boundary to GitHub / GitHub Enterprise
//! (spec §6 "External Interfaces" — code search, repo contents, PR lifecycle).

mod github;

pub use github::GithubCodeHost;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodeHostError {
    #[error("code host returned {status}: {body}")]
    Api { status: u16, body: String },
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("missing token env var {0}")]
    MissingToken(String),
    #[error("file {path} not found in {repo}@{ref_}")]
    FileNotFound { repo: String, path: String, ref_: String },
}

/// One hit from a code-search query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeSearchResult {
    pub repository: String,
    pub path: String,
}

/// A pull request as seen through the code host's API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    pub html_url: String,
    pub state: String,
}

/// Fields needed to open a new pull request.
#[derive(Debug, Clone)]
pub struct CreatePullRequest<'a> {
    pub head_branch: &'a str,
    pub base_branch: &'a str,
    pub title: &'a str,
    pub body: &'a str,
}

/// The capability the Broker and discovery's code-search source use to talk
/// to a code host. Concrete implementations hit the REST API; Enterprise
/// deployments are handled entirely by the base URL the caller configures
/// (the conventional `/api/v3` suffix), not by branching logic here.
#[async_trait]
pub trait CodeHost: Send + Sync {
    /// Reads the contents of `path` in `repo`, decoded as UTF-8 text, at
    /// `ref_` if given or the repo's default branch if `None`.
    async fn get_file_contents(&self, repo: &str, path: &str, ref_: Option<&str>) -> Result<String, CodeHostError>;

    /// Runs a code-search query, used by the discovery engine's codehost source.
    async fn search_code(&self, query: &str) -> Result<Vec<CodeSearchResult>, CodeHostError>;

    /// Finds an open pull request for `branch` in `repo`, if one exists.
    async fn find_pull_request(&self, repo: &str, branch: &str) -> Result<Option<PullRequest>, CodeHostError>;

    /// Opens a new pull request.
    async fn create_pull_request(&self, repo: &str, req: &CreatePullRequest<'_>) -> Result<PullRequest, CodeHostError>;

    /// Applies `labels` to an existing pull request.
    async fn add_labels(&self, repo: &str, pr_number: u64, labels: &[String]) -> Result<(), CodeHostError>;

    /// Posts a comment on an existing pull request.
    async fn add_comment(&self, repo: &str, pr_number: u64, body: &str) -> Result<(), CodeHostError>;
}
