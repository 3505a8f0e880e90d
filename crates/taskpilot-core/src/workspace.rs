//! Workspace snapshot: the tasks, projects and sessions exported from the
//! backend, loaded as one JSON document.
//!
//! ```json
//! { "tasks": [...], "projects": [...], "sessions": [...] }
//! ```
//!
//! Every array is optional. The backend enforces referential integrity on
//! its side; [`Workspace::validate`] re-checks it so that a hand-edited
//! snapshot fails loudly instead of producing odd rankings.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::error::{Result, ValidationError};
use crate::task::{Project, Task, TaskSession, TaskStatus};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Workspace {
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub sessions: Vec<TaskSession>,
}

impl Workspace {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a snapshot from disk. Does not validate.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let workspace = Self::from_json(&content)?;
        tracing::debug!(
            path = %path.display(),
            tasks = workspace.tasks.len(),
            projects = workspace.projects.len(),
            sessions = workspace.sessions.len(),
            "loaded workspace"
        );
        Ok(workspace)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn project(&self, id: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    /// Direct children of `parent_id`, archived ones excluded.
    pub fn children<'a>(&'a self, parent_id: &'a str) -> impl Iterator<Item = &'a Task> + 'a {
        self.tasks
            .iter()
            .filter(move |t| t.parent_task_id.as_deref() == Some(parent_id) && !t.is_archived())
    }

    /// `(completed, total)` over the direct children of `parent_id`.
    pub fn subtask_progress(&self, parent_id: &str) -> (usize, usize) {
        self.children(parent_id).fold((0, 0), |(done, total), t| {
            let done = done + usize::from(t.status == TaskStatus::Completed);
            (done, total + 1)
        })
    }

    /// Check ids, hierarchy and references, returning the first violation.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut tasks_by_id: HashMap<&str, &Task> = HashMap::with_capacity(self.tasks.len());
        for task in &self.tasks {
            if tasks_by_id.insert(task.id.as_str(), task).is_some() {
                return Err(ValidationError::DuplicateId {
                    entity: "task".into(),
                    id: task.id.clone(),
                });
            }
        }

        let mut project_ids = HashSet::with_capacity(self.projects.len());
        for project in &self.projects {
            if !project_ids.insert(project.id.as_str()) {
                return Err(ValidationError::DuplicateId {
                    entity: "project".into(),
                    id: project.id.clone(),
                });
            }
        }

        for task in &self.tasks {
            match (task.task_level.parent_level(), task.parent_task_id.as_deref()) {
                (None, Some(_)) => {
                    return Err(ValidationError::InvalidHierarchy {
                        task_id: task.id.clone(),
                        message: "top-level task must not have a parent".into(),
                    });
                }
                (Some(_), None) => {
                    return Err(ValidationError::InvalidHierarchy {
                        task_id: task.id.clone(),
                        message: format!("{} requires a parent task", task.task_level),
                    });
                }
                (Some(expected), Some(parent_id)) => {
                    let parent = tasks_by_id.get(parent_id).ok_or_else(|| {
                        ValidationError::UnknownReference {
                            entity: "task".into(),
                            id: task.id.clone(),
                            target: "parent task".into(),
                            target_id: parent_id.to_string(),
                        }
                    })?;
                    if parent.task_level != expected {
                        return Err(ValidationError::InvalidHierarchy {
                            task_id: task.id.clone(),
                            message: format!(
                                "parent '{}' is a {}, expected a {}",
                                parent.id, parent.task_level, expected
                            ),
                        });
                    }
                }
                (None, None) => {}
            }

            if let Some(project_id) = task.project_id.as_deref() {
                if !project_ids.contains(project_id) {
                    return Err(ValidationError::UnknownReference {
                        entity: "task".into(),
                        id: task.id.clone(),
                        target: "project".into(),
                        target_id: project_id.to_string(),
                    });
                }
            }
        }

        let mut session_ids = HashSet::with_capacity(self.sessions.len());
        for session in &self.sessions {
            if !session_ids.insert(session.id.as_str()) {
                return Err(ValidationError::DuplicateId {
                    entity: "session".into(),
                    id: session.id.clone(),
                });
            }
            if !tasks_by_id.contains_key(session.task_id.as_str()) {
                return Err(ValidationError::UnknownReference {
                    entity: "session".into(),
                    id: session.id.clone(),
                    target: "task".into(),
                    target_id: session.task_id.clone(),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskLevel;
    use chrono::Utc;

    fn task(id: &str, level: TaskLevel, parent: Option<&str>) -> Task {
        let mut t = Task::new(id);
        t.id = id.to_string();
        t.task_level = level;
        t.parent_task_id = parent.map(str::to_string);
        t
    }

    fn session(id: &str, task_id: &str) -> TaskSession {
        TaskSession {
            id: id.to_string(),
            task_id: task_id.to_string(),
            started_at: Utc::now(),
            duration_minutes: 25,
        }
    }

    #[test]
    fn test_empty_document_is_valid() {
        let ws = Workspace::from_json("{}").unwrap();
        assert!(ws.tasks.is_empty());
        assert!(ws.validate().is_ok());
    }

    #[test]
    fn test_valid_hierarchy() {
        let ws = Workspace {
            tasks: vec![
                task("root", TaskLevel::Task, None),
                task("sub", TaskLevel::Subtask, Some("root")),
                task("micro", TaskLevel::Microtask, Some("sub")),
            ],
            ..Workspace::default()
        };
        assert!(ws.validate().is_ok());
    }

    #[test]
    fn test_duplicate_task_id() {
        let ws = Workspace {
            tasks: vec![task("a", TaskLevel::Task, None), task("a", TaskLevel::Task, None)],
            ..Workspace::default()
        };
        assert!(matches!(ws.validate(), Err(ValidationError::DuplicateId { .. })));
    }

    #[test]
    fn test_subtask_requires_parent() {
        let ws = Workspace {
            tasks: vec![task("orphan", TaskLevel::Subtask, None)],
            ..Workspace::default()
        };
        assert!(matches!(ws.validate(), Err(ValidationError::InvalidHierarchy { .. })));
    }

    #[test]
    fn test_microtask_under_task_is_rejected() {
        let ws = Workspace {
            tasks: vec![
                task("root", TaskLevel::Task, None),
                task("micro", TaskLevel::Microtask, Some("root")),
            ],
            ..Workspace::default()
        };
        let err = ws.validate().unwrap_err();
        assert!(err.to_string().contains("expected a subtask"));
    }

    #[test]
    fn test_unknown_parent() {
        let ws = Workspace {
            tasks: vec![task("sub", TaskLevel::Subtask, Some("ghost"))],
            ..Workspace::default()
        };
        assert!(matches!(ws.validate(), Err(ValidationError::UnknownReference { .. })));
    }

    #[test]
    fn test_unknown_project() {
        let mut t = task("a", TaskLevel::Task, None);
        t.project_id = Some("p-missing".into());
        let ws = Workspace {
            tasks: vec![t],
            ..Workspace::default()
        };
        let err = ws.validate().unwrap_err();
        assert!(err.to_string().contains("p-missing"));
    }

    #[test]
    fn test_session_must_reference_task() {
        let ws = Workspace {
            tasks: vec![task("a", TaskLevel::Task, None)],
            sessions: vec![session("s1", "a"), session("s2", "b")],
            ..Workspace::default()
        };
        assert!(matches!(ws.validate(), Err(ValidationError::UnknownReference { .. })));
    }

    #[test]
    fn test_subtask_progress_ignores_archived() {
        let mut done = task("s1", TaskLevel::Subtask, Some("root"));
        done.status = TaskStatus::Completed;
        let open = task("s2", TaskLevel::Subtask, Some("root"));
        let mut gone = task("s3", TaskLevel::Subtask, Some("root"));
        gone.archived_at = Some(Utc::now());

        let ws = Workspace {
            tasks: vec![task("root", TaskLevel::Task, None), done, open, gone],
            ..Workspace::default()
        };
        assert_eq!(ws.subtask_progress("root"), (1, 2));
        assert_eq!(ws.subtask_progress("s1"), (0, 0));
    }
}
