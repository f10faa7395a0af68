//! Chat notifier: posts a formatted message to an incoming-webhook style
//! chat destination (Slack/Teams-compatible payload shape).

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use super::{NotificationEvent, Notifier, NotifierError};
use crate::domain::ItemStatus;

pub struct ChatNotifier {
    client: reqwest::Client,
    webhook_url: String,
}

impl ChatNotifier {
    pub fn new(webhook_url: impl Into<String>) -> Self {
        Self { client: reqwest::Client::new(), webhook_url: webhook_url.into() }
    }

    fn format(event: &NotificationEvent) -> String {
        let glyph = event.status.glyph();
        match &event.pr_url {
            Some(url) => format!("{glyph} `{}` {}@{} — {} ({url})", event.repo, event.module, event.version, event.reason),
            None => format!("{glyph} `{}` {}@{} — {}", event.repo, event.module, event.version, event.reason),
        }
    }
}

#[async_trait]
impl Notifier for ChatNotifier {
    async fn notify(&self, event: &NotificationEvent) -> Result<(), NotifierError> {
        debug!(repo = %event.repo, status = ?event.status, "ChatNotifier::notify: called");
        self.client
            .post(&self.webhook_url)
            .json(&json!({ "text": Self::format(event) }))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_includes_pr_url_when_present() {
        let event = NotificationEvent {
            repo: "owner/dependent".to_string(),
            module: "github.com/example/lib".to_string(),
            version: "v1.2.3".to_string(),
            status: ItemStatus::Completed,
            reason: "tests passed".to_string(),
            pr_url: Some("https://example.com/pr/1".to_string()),
        };
        let text = ChatNotifier::format(&event);
        assert!(text.contains("owner/dependent"));
        assert!(text.contains("https://example.com/pr/1"));
    }

    #[test]
    fn format_omits_pr_url_when_absent() {
        let event = NotificationEvent {
            repo: "owner/dependent".to_string(),
            module: "github.com/example/lib".to_string(),
            version: "v1.2.3".to_string(),
            status: ItemStatus::Failed,
            reason: "clone failed".to_string(),
            pr_url: None,
        };
        let text = ChatNotifier::format(&event);
        assert!(!text.contains("http"));
    }
}
