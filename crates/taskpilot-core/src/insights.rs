//! Contextual insights.
//!
//! Scans a workspace and produces short, actionable observations: what is
//! late, what is slipping, which budgets are running out, and where work
//! can be closed off. Each insight carries a suggested action and the ids it
//! refers to, so a front end can link straight to the records.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::task::{Task, TaskStatus};
use crate::workspace::Workspace;

/// Longest look-back window accepted for the day-based thresholds.
pub const MAX_WINDOW_DAYS: u32 = 3650;

/// Thresholds used by [`generate_insights`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightSettings {
    /// In-progress tasks idle this long are flagged
    #[serde(default = "default_stale_after_days")]
    pub stale_after_days: u32,
    /// Minutes of work that fit into one day
    #[serde(default = "default_daily_capacity_minutes")]
    pub daily_capacity_minutes: u32,
    /// Budget utilization that triggers a warning
    #[serde(default = "default_budget_warning_ratio")]
    pub budget_warning_ratio: f64,
    /// Window without sessions before suggesting a focus block
    #[serde(default = "default_focus_window_days")]
    pub focus_window_days: u32,
    #[serde(default = "default_momentum_window_days")]
    pub momentum_window_days: u32,
}

fn default_stale_after_days() -> u32 {
    7
}
fn default_daily_capacity_minutes() -> u32 {
    480
}
fn default_budget_warning_ratio() -> f64 {
    0.9
}
fn default_focus_window_days() -> u32 {
    3
}
fn default_momentum_window_days() -> u32 {
    7
}

impl Default for InsightSettings {
    fn default() -> Self {
        Self {
            stale_after_days: default_stale_after_days(),
            daily_capacity_minutes: default_daily_capacity_minutes(),
            budget_warning_ratio: default_budget_warning_ratio(),
            focus_window_days: default_focus_window_days(),
            momentum_window_days: default_momentum_window_days(),
        }
    }
}

impl InsightSettings {
    /// Reject windows outside `1..=MAX_WINDOW_DAYS` and ratios that are
    /// not positive finite numbers.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let windows = [
            ("insights.stale_after_days", self.stale_after_days),
            ("insights.focus_window_days", self.focus_window_days),
            ("insights.momentum_window_days", self.momentum_window_days),
        ];
        for (field, days) in windows {
            if days == 0 || days > MAX_WINDOW_DAYS {
                return Err(ValidationError::InvalidValue {
                    field: field.into(),
                    message: format!("{days} is outside 1..={MAX_WINDOW_DAYS} days"),
                });
            }
        }
        if !(self.budget_warning_ratio.is_finite() && self.budget_warning_ratio > 0.0) {
            return Err(ValidationError::InvalidValue {
                field: "insights.budget_warning_ratio".into(),
                message: format!("{} is not a positive ratio", self.budget_warning_ratio),
            });
        }
        Ok(())
    }
}

/// Start of a look-back window, or the earliest instant when it reaches past it.
fn window_start(now: DateTime<Utc>, days: u32) -> DateTime<Utc> {
    now.checked_sub_signed(Duration::days(i64::from(days)))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    OverdueTasks,
    DueToday,
    StaleTasks,
    Overcommitted,
    ProjectOverBudget,
    ProjectNearBudget,
    ReadyToClose,
    NoRecentFocus,
    Momentum,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub kind: InsightKind,
    pub severity: Severity,
    pub title: String,
    pub message: String,
    pub suggested_action: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub task_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
}

fn plural(n: usize, one: &str, many: &str) -> String {
    if n == 1 {
        format!("1 {one}")
    } else {
        format!("{n} {many}")
    }
}

fn ids<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> Vec<String> {
    tasks.into_iter().map(|t| t.id.clone()).collect()
}

/// Produce insights for `workspace` at `now`, most severe first.
pub fn generate_insights(
    workspace: &Workspace,
    settings: &InsightSettings,
    now: DateTime<Utc>,
) -> Vec<Insight> {
    let today = now.date_naive();
    let actionable: Vec<&Task> = workspace.tasks.iter().filter(|t| t.is_actionable()).collect();
    let mut insights = Vec::new();

    let overdue: Vec<&Task> = actionable
        .iter()
        .copied()
        .filter(|t| t.is_overdue_on(today))
        .collect();
    if !overdue.is_empty() {
        insights.push(Insight {
            kind: InsightKind::OverdueTasks,
            severity: Severity::Critical,
            title: "Overdue work".into(),
            message: format!("{} past the due date.", plural(overdue.len(), "task is", "tasks are")),
            suggested_action: "Finish, reschedule or cancel the overdue tasks.".into(),
            task_ids: ids(overdue),
            project_id: None,
        });
    }

    let due_today: Vec<&Task> = actionable
        .iter()
        .copied()
        .filter(|t| t.due_day() == Some(today))
        .collect();
    if !due_today.is_empty() {
        insights.push(Insight {
            kind: InsightKind::DueToday,
            severity: Severity::Warning,
            title: "Due today".into(),
            message: format!("{} due today.", plural(due_today.len(), "task is", "tasks are")),
            suggested_action: "Block time for today's deadlines before anything else.".into(),
            task_ids: ids(due_today.iter().copied()),
            project_id: None,
        });

        let planned: u32 = due_today.iter().filter_map(|t| t.estimated_duration).sum();
        if planned > settings.daily_capacity_minutes {
            insights.push(Insight {
                kind: InsightKind::Overcommitted,
                severity: Severity::Warning,
                title: "Too much for one day".into(),
                message: format!(
                    "Tasks due today need about {planned} minutes, more than the {} available.",
                    settings.daily_capacity_minutes
                ),
                suggested_action: "Move or split the lowest-priority tasks due today.".into(),
                task_ids: ids(due_today),
                project_id: None,
            });
        }
    }

    let stale: Vec<&Task> = actionable
        .iter()
        .copied()
        .filter(|t| {
            t.status == TaskStatus::InProgress
                && t.days_since_update(now) >= settings.stale_after_days
        })
        .collect();
    if !stale.is_empty() {
        insights.push(Insight {
            kind: InsightKind::StaleTasks,
            severity: Severity::Warning,
            title: "Stalled work".into(),
            message: format!(
                "{} in progress with no update for {} days or more.",
                plural(stale.len(), "task is", "tasks are"),
                settings.stale_after_days
            ),
            suggested_action: "Resume, split or pause the stalled tasks.".into(),
            task_ids: ids(stale),
            project_id: None,
        });
    }

    for project in workspace.projects.iter().filter(|p| !p.is_closed()) {
        let Some(ratio) = project.budget_utilization() else {
            continue;
        };
        let percent = (ratio * 100.0).round() as i64;
        if ratio > 1.0 {
            insights.push(Insight {
                kind: InsightKind::ProjectOverBudget,
                severity: Severity::Critical,
                title: format!("{} is over budget", project.name),
                message: format!("{percent}% of the budget has been spent."),
                suggested_action: "Review remaining scope or raise the budget.".into(),
                task_ids: Vec::new(),
                project_id: Some(project.id.clone()),
            });
        } else if ratio >= settings.budget_warning_ratio {
            insights.push(Insight {
                kind: InsightKind::ProjectNearBudget,
                severity: Severity::Warning,
                title: format!("{} is close to its budget", project.name),
                message: format!("{percent}% of the budget has been spent."),
                suggested_action: "Check what is left before committing more work.".into(),
                task_ids: Vec::new(),
                project_id: Some(project.id.clone()),
            });
        }
    }

    let closable: Vec<&Task> = actionable
        .iter()
        .copied()
        .filter(|t| {
            let (done, total) = workspace.subtask_progress(&t.id);
            total > 0 && done == total
        })
        .collect();
    if !closable.is_empty() {
        insights.push(Insight {
            kind: InsightKind::ReadyToClose,
            severity: Severity::Info,
            title: "Ready to close".into(),
            message: format!(
                "{} all subtasks completed.",
                plural(closable.len(), "task has", "tasks have")
            ),
            suggested_action: "Mark the parent tasks as completed.".into(),
            task_ids: ids(closable),
            project_id: None,
        });
    }

    let has_started_work = actionable.iter().any(|t| t.status == TaskStatus::InProgress);
    let focus_since = window_start(now, settings.focus_window_days);
    let recent_focus = workspace.sessions.iter().any(|s| s.started_at >= focus_since);
    if has_started_work && !recent_focus {
        insights.push(Insight {
            kind: InsightKind::NoRecentFocus,
            severity: Severity::Info,
            title: "No recent focus time".into(),
            message: format!(
                "No work sessions logged in the last {} days.",
                settings.focus_window_days
            ),
            suggested_action: "Schedule a focus block for your in-progress work.".into(),
            task_ids: Vec::new(),
            project_id: None,
        });
    }

    let momentum_since = window_start(now, settings.momentum_window_days);
    let finished: Vec<&Task> = workspace
        .tasks
        .iter()
        .filter(|t| {
            t.status == TaskStatus::Completed
                && t.completed_at.is_some_and(|at| at >= momentum_since && at <= now)
        })
        .collect();
    if !finished.is_empty() {
        insights.push(Insight {
            kind: InsightKind::Momentum,
            severity: Severity::Info,
            title: "Good momentum".into(),
            message: format!(
                "{} in the last {} days.",
                plural(finished.len(), "task completed", "tasks completed"),
                settings.momentum_window_days
            ),
            suggested_action: "Keep going with the next recommended task.".into(),
            task_ids: ids(finished),
            project_id: None,
        });
    }

    // stable: equal severities keep generation order
    insights.sort_by(|a, b| b.severity.cmp(&a.severity));
    tracing::debug!(count = insights.len(), "generated insights");
    insights
}
