//! Dashboard aggregates over a workspace snapshot.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::task::{TaskPriority, TaskStatus};
use crate::workspace::Workspace;

/// Longest daily series [`DashboardStats::compute`] will build.
pub const MAX_DAILY_WINDOW_DAYS: u32 = 3650;

/// Tracked minutes for one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyMinutes {
    pub date: NaiveDate,
    pub minutes: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    /// Non-archived tasks
    pub total_tasks: usize,
    pub by_status: BTreeMap<String, usize>,
    pub by_priority: BTreeMap<String, usize>,
    /// completed / (total - cancelled), 0 when nothing counts
    pub completion_rate: f64,
    pub overdue: usize,
    pub tracked_minutes: u64,
    /// Keyed by project id; sessions on tasks without a project are skipped
    pub tracked_minutes_by_project: BTreeMap<String, u64>,
    /// Oldest first, one entry per day ending today
    pub daily_minutes: Vec<DailyMinutes>,
}

impl DashboardStats {
    /// Compute the dashboard for the `days` days ending at `now`.
    ///
    /// `days` is clamped to [`MAX_DAILY_WINDOW_DAYS`]. Days before the
    /// earliest representable date are left out of the series.
    pub fn compute(workspace: &Workspace, now: DateTime<Utc>, days: u32) -> Self {
        let today = now.date_naive();
        let live: Vec<_> = workspace.tasks.iter().filter(|t| !t.is_archived()).collect();

        let mut by_status: BTreeMap<String, usize> = TaskStatus::ALL
            .iter()
            .map(|s| (s.as_str().to_string(), 0))
            .collect();
        let mut by_priority: BTreeMap<String, usize> = TaskPriority::ALL
            .iter()
            .map(|p| (p.as_str().to_string(), 0))
            .collect();

        for task in &live {
            *by_status.entry(task.status.as_str().to_string()).or_default() += 1;
            *by_priority.entry(task.priority.as_str().to_string()).or_default() += 1;
        }

        let completed = by_status[TaskStatus::Completed.as_str()];
        let cancelled = by_status[TaskStatus::Cancelled.as_str()];
        let denominator = live.len() - cancelled;
        let completion_rate = if denominator == 0 {
            0.0
        } else {
            completed as f64 / denominator as f64
        };

        let overdue = live.iter().filter(|t| t.is_overdue_on(today)).count();

        let project_of: HashMap<&str, &str> = workspace
            .tasks
            .iter()
            .filter_map(|t| t.project_id.as_deref().map(|p| (t.id.as_str(), p)))
            .collect();

        let mut tracked_minutes = 0u64;
        let mut tracked_minutes_by_project = BTreeMap::new();
        let mut per_day: HashMap<NaiveDate, u64> = HashMap::new();
        let window: Vec<NaiveDate> = (0..days.min(MAX_DAILY_WINDOW_DAYS))
            .rev()
            .filter_map(|back| today.checked_sub_signed(Duration::days(i64::from(back))))
            .collect();
        let first_day = window.first().copied();

        for session in &workspace.sessions {
            let minutes = u64::from(session.duration_minutes);
            tracked_minutes += minutes;

            if let Some(project_id) = project_of.get(session.task_id.as_str()) {
                *tracked_minutes_by_project
                    .entry(project_id.to_string())
                    .or_insert(0) += minutes;
            }

            let day = session.started_at.date_naive();
            if first_day.is_some_and(|first| day >= first && day <= today) {
                *per_day.entry(day).or_insert(0) += minutes;
            }
        }

        let daily_minutes = window
            .into_iter()
            .map(|date| DailyMinutes {
                date,
                minutes: per_day.get(&date).copied().unwrap_or(0),
            })
            .collect();

        Self {
            total_tasks: live.len(),
            by_status,
            by_priority,
            completion_rate,
            overdue,
            tracked_minutes,
            tracked_minutes_by_project,
            daily_minutes,
        }
    }
}
