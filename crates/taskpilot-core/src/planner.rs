//! Smart planner session.
//!
//! Surfaces one task at a time. Skipping a suggestion excludes it for the
//! rest of the session, so the next call moves on to the runner-up.

use chrono::{DateTime, Utc};
use std::collections::HashSet;

use crate::recommend::{Recommendation, Recommender};
use crate::task::Task;

#[derive(Debug, Clone, Default)]
pub struct PlannerSession {
    recommender: Recommender,
    skipped: HashSet<String>,
    skip_order: Vec<String>,
}

impl PlannerSession {
    pub fn new(recommender: Recommender) -> Self {
        Self {
            recommender,
            skipped: HashSet::new(),
            skip_order: Vec::new(),
        }
    }

    /// Best task that has not been skipped.
    pub fn next(&mut self, tasks: &[Task], now: DateTime<Utc>) -> Option<Recommendation> {
        self.recommender.select_best(tasks, &self.skipped, now)
    }

    /// Exclude a task for the rest of the session.
    pub fn skip(&mut self, task_id: impl Into<String>) {
        let task_id = task_id.into();
        if self.skipped.insert(task_id.clone()) {
            tracing::debug!(task_id = %task_id, "skipped suggestion");
            self.skip_order.push(task_id);
        }
    }

    /// Skipped ids in the order they were skipped.
    pub fn skipped(&self) -> &[String] {
        &self.skip_order
    }

    pub fn reset(&mut self) {
        self.skipped.clear();
        self.skip_order.clear();
    }
}
