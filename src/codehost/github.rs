//! `reqwest`-backed [`CodeHost`] implementation for GitHub and GitHub
//! Enterprise Server (the latter via a caller-supplied `/api/v3`-suffixed
//! base URL — this type never branches on deployment flavor itself).

use base64::Engine as _;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::{CodeHost, CodeHostError, CodeSearchResult, CreatePullRequest, PullRequest};

pub struct GithubCodeHost {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl GithubCodeHost {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            token: token.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, self.url(path))
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", "cascade")
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, CodeHostError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Err(CodeHostError::Api { status, body })
    }
}

#[derive(Debug, Deserialize)]
struct ContentsResponse {
    content: String,
    encoding: String,
}

#[derive(Debug, Deserialize)]
struct SearchCodeResponse {
    items: Vec<SearchCodeItem>,
}

#[derive(Debug, Deserialize)]
struct SearchCodeItem {
    path: String,
    repository: SearchCodeRepository,
}

#[derive(Debug, Deserialize)]
struct SearchCodeRepository {
    full_name: String,
}

#[derive(Debug, Deserialize)]
struct PullRequestResponse {
    number: u64,
    html_url: String,
    state: String,
}

impl From<PullRequestResponse> for PullRequest {
    fn from(r: PullRequestResponse) -> Self {
        Self { number: r.number, html_url: r.html_url, state: r.state }
    }
}

#[async_trait::async_trait]
impl CodeHost for GithubCodeHost {
    async fn get_file_contents(&self, repo: &str, path: &str, ref_: Option<&str>) -> Result<String, CodeHostError> {
        debug!(%repo, %path, ?ref_, "get_file_contents: called");
        let api_path = match ref_ {
            Some(ref_) => format!("/repos/{repo}/contents/{path}?ref={ref_}"),
            None => format!("/repos/{repo}/contents/{path}"),
        };
        let response = self.request(reqwest::Method::GET, &api_path).send().await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(CodeHostError::FileNotFound {
                repo: repo.to_string(),
                path: path.to_string(),
                ref_: ref_.unwrap_or("default branch").to_string(),
            });
        }
        let response = Self::check_status(response).await?;
        let parsed: ContentsResponse = response.json().await?;
        if parsed.encoding != "base64" {
            return Err(CodeHostError::Api {
                status: 0,
                body: format!("unsupported contents encoding: {}", parsed.encoding),
            });
        }
        let cleaned: String = parsed.content.chars().filter(|c| !c.is_whitespace()).collect();
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(cleaned)
            .map_err(|e| CodeHostError::Api { status: 0, body: e.to_string() })?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    async fn search_code(&self, query: &str) -> Result<Vec<CodeSearchResult>, CodeHostError> {
        debug!(%query, "search_code: called");
        const PER_PAGE: u32 = 100;
        // GitHub's code search caps results at 1000 (10 pages of 100).
        const MAX_PAGES: u32 = 10;

        let mut results = Vec::new();
        for page in 1..=MAX_PAGES {
            let response = self
                .request(reqwest::Method::GET, "/search/code")
                .query(&[("q", query), ("per_page", &PER_PAGE.to_string()), ("page", &page.to_string())])
                .send()
                .await?;
            let response = Self::check_status(response).await?;
            let parsed: SearchCodeResponse = response.json().await?;
            let page_len = parsed.items.len();
            results.extend(
                parsed
                    .items
                    .into_iter()
                    .map(|item| CodeSearchResult { repository: item.repository.full_name, path: item.path }),
            );
            if page_len < PER_PAGE as usize {
                break;
            }
        }
        Ok(results)
    }

    async fn find_pull_request(&self, repo: &str, branch: &str) -> Result<Option<PullRequest>, CodeHostError> {
        debug!(%repo, %branch, "find_pull_request: called");
        let owner = repo.split('/').next().unwrap_or(repo);
        let head = format!("{owner}:{branch}");
        let api_path = format!("/repos/{repo}/pulls");
        let response = self
            .request(reqwest::Method::GET, &api_path)
            .query(&[("head", head.as_str()), ("state", "open")])
            .send()
            .await?;
        let response = Self::check_status(response).await?;
        let parsed: Vec<PullRequestResponse> = response.json().await?;
        Ok(parsed.into_iter().next().map(PullRequest::from))
    }

    async fn create_pull_request(&self, repo: &str, req: &CreatePullRequest<'_>) -> Result<PullRequest, CodeHostError> {
        debug!(%repo, head = %req.head_branch, base = %req.base_branch, "create_pull_request: called");
        let api_path = format!("/repos/{repo}/pulls");
        let response = self
            .request(reqwest::Method::POST, &api_path)
            .json(&json!({
                "title": req.title,
                "body": req.body,
                "head": req.head_branch,
                "base": req.base_branch,
            }))
            .send()
            .await?;
        let response = Self::check_status(response).await?;
        let parsed: PullRequestResponse = response.json().await?;
        Ok(parsed.into())
    }

    async fn add_labels(&self, repo: &str, pr_number: u64, labels: &[String]) -> Result<(), CodeHostError> {
        debug!(%repo, pr_number, ?labels, "add_labels: called");
        let api_path = format!("/repos/{repo}/issues/{pr_number}/labels");
        let response = self
            .request(reqwest::Method::POST, &api_path)
            .json(&json!({ "labels": labels }))
            .send()
            .await?;
        Self::check_status(response).await?;
        Ok(())
    }

    async fn add_comment(&self, repo: &str, pr_number: u64, body: &str) -> Result<(), CodeHostError> {
        debug!(%repo, pr_number, "add_comment: called");
        let api_path = format!("/repos/{repo}/issues/{pr_number}/comments");
        let response = self
            .request(reqwest::Method::POST, &api_path)
            .json(&json!({ "body": body }))
            .send()
            .await?;
        Self::check_status(response).await?;
        Ok(())
    }
}
