//! Task, project and session records.
//!
//! These mirror the rows the web application keeps in its managed database.
//! The core never writes them back; it reads an exported snapshot (see
//! [`crate::workspace`]) and scores, aggregates and validates it.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// Task lifecycle status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Not started yet (initial state)
    #[default]
    Pending,
    /// Work has started
    InProgress,
    /// Done (terminal)
    Completed,
    /// Dropped (terminal)
    Cancelled,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
            TaskStatus::Cancelled => "cancelled",
        }
    }

    /// Completed and cancelled tasks never come back into planning.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Cancelled)
    }

    pub const ALL: [TaskStatus; 4] = [
        TaskStatus::Pending,
        TaskStatus::InProgress,
        TaskStatus::Completed,
        TaskStatus::Cancelled,
    ];
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "pending" | "todo" => Ok(TaskStatus::Pending),
            "in_progress" => Ok(TaskStatus::InProgress),
            "completed" | "done" => Ok(TaskStatus::Completed),
            "cancelled" | "canceled" => Ok(TaskStatus::Cancelled),
            other => Err(ValidationError::InvalidValue {
                field: "status".into(),
                message: format!("unknown status '{other}'"),
            }),
        }
    }
}

/// Manual priority set by the user.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl TaskPriority {
    /// Ordinal rank, low = 0 through urgent = 3.
    pub fn rank(&self) -> u8 {
        match self {
            TaskPriority::Low => 0,
            TaskPriority::Medium => 1,
            TaskPriority::High => 2,
            TaskPriority::Urgent => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "low",
            TaskPriority::Medium => "medium",
            TaskPriority::High => "high",
            TaskPriority::Urgent => "urgent",
        }
    }

    pub const ALL: [TaskPriority; 4] = [
        TaskPriority::Low,
        TaskPriority::Medium,
        TaskPriority::High,
        TaskPriority::Urgent,
    ];
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskPriority {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(TaskPriority::Low),
            "medium" => Ok(TaskPriority::Medium),
            "high" => Ok(TaskPriority::High),
            "urgent" => Ok(TaskPriority::Urgent),
            other => Err(ValidationError::InvalidValue {
                field: "priority".into(),
                message: format!("unknown priority '{other}'"),
            }),
        }
    }
}

/// Depth in the task / subtask / microtask hierarchy.
///
/// Serialized as the integer `1`, `2` or `3`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Default)]
#[serde(try_from = "u8", into = "u8")]
pub enum TaskLevel {
    #[default]
    Task,
    Subtask,
    Microtask,
}

impl TaskLevel {
    pub fn depth(&self) -> u8 {
        match self {
            TaskLevel::Task => 1,
            TaskLevel::Subtask => 2,
            TaskLevel::Microtask => 3,
        }
    }

    /// Level a direct parent must have, `None` for top-level tasks.
    pub fn parent_level(&self) -> Option<TaskLevel> {
        match self {
            TaskLevel::Task => None,
            TaskLevel::Subtask => Some(TaskLevel::Task),
            TaskLevel::Microtask => Some(TaskLevel::Subtask),
        }
    }
}

impl TryFrom<u8> for TaskLevel {
    type Error = ValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(TaskLevel::Task),
            2 => Ok(TaskLevel::Subtask),
            3 => Ok(TaskLevel::Microtask),
            other => Err(ValidationError::InvalidValue {
                field: "task_level".into(),
                message: format!("expected 1, 2 or 3, got {other}"),
            }),
        }
    }
}

impl From<TaskLevel> for u8 {
    fn from(level: TaskLevel) -> Self {
        level.depth()
    }
}

impl fmt::Display for TaskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TaskLevel::Task => "task",
            TaskLevel::Subtask => "subtask",
            TaskLevel::Microtask => "microtask",
        };
        f.write_str(name)
    }
}

/// A unit of work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier
    pub id: String,
    /// Task title
    pub title: String,
    /// Optional description
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub priority: TaskPriority,
    /// Deadline; only the calendar day matters for scoring
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    /// Estimated duration in minutes
    #[serde(default)]
    pub estimated_duration: Option<u32>,
    #[serde(default)]
    pub task_level: TaskLevel,
    #[serde(default)]
    pub parent_task_id: Option<String>,
    #[serde(default)]
    pub project_id: Option<String>,
    /// Soft-delete marker
    #[serde(default)]
    pub archived_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Create a pending, medium-priority top-level task.
    pub fn new(title: impl Into<String>) -> Self {
        let now = Utc::now();
        Task {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.into(),
            description: None,
            status: TaskStatus::Pending,
            priority: TaskPriority::Medium,
            due_date: None,
            estimated_duration: None,
            task_level: TaskLevel::Task,
            parent_task_id: None,
            project_id: None,
            archived_at: None,
            created_at: now,
            updated_at: now,
            completed_at: None,
        }
    }

    pub fn is_archived(&self) -> bool {
        self.archived_at.is_some()
    }

    /// Whether the task can still be worked on.
    pub fn is_actionable(&self) -> bool {
        !self.status.is_terminal() && !self.is_archived()
    }

    /// Calendar day of the deadline (UTC).
    pub fn due_day(&self) -> Option<NaiveDate> {
        self.due_date.map(|d| d.date_naive())
    }

    /// Actionable and due on a day before `today`.
    pub fn is_overdue_on(&self, today: NaiveDate) -> bool {
        self.is_actionable() && self.due_day().is_some_and(|d| d < today)
    }

    /// Whole days since the last update, never negative.
    pub fn days_since_update(&self, now: DateTime<Utc>) -> u32 {
        (now - self.updated_at).num_days().max(0) as u32
    }
}

/// Project lifecycle status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Planning,
    #[default]
    Active,
    OnHold,
    Completed,
    Cancelled,
}

/// A container of tasks with an optional budget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub status: ProjectStatus,
    #[serde(default)]
    pub budget: Option<f64>,
    #[serde(default)]
    pub budget_used: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Project {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            status: ProjectStatus::Active,
            budget: None,
            budget_used: 0.0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Fraction of the budget spent, `None` without a positive budget.
    pub fn budget_utilization(&self) -> Option<f64> {
        match self.budget {
            Some(budget) if budget > 0.0 => Some(self.budget_used / budget),
            _ => None,
        }
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.status, ProjectStatus::Completed | ProjectStatus::Cancelled)
    }
}

/// Logged work time against a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskSession {
    pub id: String,
    pub task_id: String,
    pub started_at: DateTime<Utc>,
    pub duration_minutes: u32,
}
