//! [`Plan`] and [`PlanStats`]: the Planner's deterministic output.

use serde::{Deserialize, Serialize};

use super::WorkItem;

/// Aggregate statistics produced alongside a [`Plan`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlanStats {
    pub total_dependents: usize,
    pub work_items_created: usize,
    pub skipped_up_to_date: usize,
    pub skipped_up_to_date_repos: Vec<String>,
    pub check_errors: usize,
    pub check_strategy: Option<String>,
    #[serde(with = "duration_millis_opt")]
    pub check_duration: Option<std::time::Duration>,
    pub parallel_checks: usize,
    pub cache_hits: usize,
    pub cache_misses: usize,
}

/// The deterministic, ordered output of the Planner: an immutable sequence
/// of work items plus the statistics describing how it was derived.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    pub items: Vec<WorkItem>,
    pub stats: PlanStats,
}

mod duration_millis_opt {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
        match d {
            Some(d) => s.serialize_some(&(d.as_millis() as u64)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Duration>, D::Error> {
        let millis: Option<u64> = Option::deserialize(d)?;
        Ok(millis.map(Duration::from_millis))
    }
}
