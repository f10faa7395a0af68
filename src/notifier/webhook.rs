//! Generic webhook notifier: POSTs the raw event as JSON, for destinations
//! that consume structured payloads rather than chat-formatted text.

use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

use super::{NotificationEvent, Notifier, NotifierError};

pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>) -> Self {
        Self { client: reqwest::Client::new(), url: url.into() }
    }
}

#[derive(Serialize)]
struct WebhookPayload<'a> {
    repo: &'a str,
    module: &'a str,
    version: &'a str,
    status: &'a str,
    reason: &'a str,
    pr_url: Option<&'a str>,
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, event: &NotificationEvent) -> Result<(), NotifierError> {
        debug!(repo = %event.repo, url = %self.url, "WebhookNotifier::notify: called");
        let payload = WebhookPayload {
            repo: &event.repo,
            module: &event.module,
            version: &event.version,
            status: match event.status {
                crate::domain::ItemStatus::Pending => "pending",
                crate::domain::ItemStatus::Completed => "completed",
                crate::domain::ItemStatus::ManualReview => "manual_review",
                crate::domain::ItemStatus::Skipped => "skipped",
                crate::domain::ItemStatus::Failed => "failed",
            },
            reason: &event.reason,
            pr_url: event.pr_url.as_deref(),
        };
        self.client.post(&self.url).json(&payload).send().await?.error_for_status()?;
        Ok(())
    }
}
