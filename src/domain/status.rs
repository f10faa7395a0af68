//! [`ItemStatus`]: the closed tagged union of per-item outcomes (spec §3).

use serde::{Deserialize, Serialize};

/// Status of a single work item, at any point in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    Pending,
    Completed,
    ManualReview,
    Skipped,
    Failed,
}

impl ItemStatus {
    /// `completed` and `skipped` are the only statuses that stop resume
    /// from re-running this item.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ItemStatus::Completed | ItemStatus::Skipped)
    }

    /// The status glyph used in the human-readable run summary (spec §7).
    pub fn glyph(&self) -> char {
        match self {
            ItemStatus::Completed => '✓',
            ItemStatus::ManualReview => '!',
            ItemStatus::Skipped => '⏭',
            ItemStatus::Failed => '✗',
            ItemStatus::Pending => '…',
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completed_and_skipped_are_terminal() {
        assert!(ItemStatus::Completed.is_terminal());
        assert!(ItemStatus::Skipped.is_terminal());
    }

    #[test]
    fn manual_review_and_failed_are_not_terminal() {
        assert!(!ItemStatus::ManualReview.is_terminal());
        assert!(!ItemStatus::Failed.is_terminal());
        assert!(!ItemStatus::Pending.is_terminal());
    }
}
