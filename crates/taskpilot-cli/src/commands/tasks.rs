//! Read-only task listing and snapshot validation.

use clap::Args;

use taskpilot_core::{Task, TaskPriority, TaskStatus};

use super::{format_day, print_json, WorkspaceArgs};

#[derive(Args, Debug)]
pub struct TasksArgs {
    #[command(flatten)]
    pub workspace: WorkspaceArgs,
    /// Filter by status (pending, in_progress, completed, cancelled)
    #[arg(long)]
    pub status: Option<TaskStatus>,
    /// Filter by priority (low, medium, high, urgent)
    #[arg(long)]
    pub priority: Option<TaskPriority>,
    /// Filter by project ID
    #[arg(long)]
    pub project: Option<String>,
    /// Include archived tasks
    #[arg(long)]
    pub all: bool,
}

impl TasksArgs {
    fn matches(&self, task: &Task) -> bool {
        (self.all || !task.is_archived())
            && self.status.map_or(true, |s| task.status == s)
            && self.priority.map_or(true, |p| task.priority == p)
            && self
                .project
                .as_deref()
                .map_or(true, |p| task.project_id.as_deref() == Some(p))
    }
}

pub fn run(args: TasksArgs) -> Result<(), Box<dyn std::error::Error>> {
    let loaded = args.workspace.load()?;
    let tasks: Vec<&Task> = loaded
        .workspace
        .tasks
        .iter()
        .filter(|t| args.matches(t))
        .collect();

    if args.workspace.json {
        return print_json(&tasks);
    }
    if tasks.is_empty() {
        println!("No tasks found.");
        return Ok(());
    }

    for task in tasks {
        let indent = "  ".repeat(usize::from(task.task_level.depth() - 1));
        println!(
            "{indent}{}  [{}] [{}] due {}  {}",
            task.id,
            task.status,
            task.priority,
            format_day(task.due_date),
            task.title
        );
    }
    Ok(())
}

pub fn run_validate(args: WorkspaceArgs) -> Result<(), Box<dyn std::error::Error>> {
    let loaded = args.load()?;
    let ws = &loaded.workspace;
    if args.json {
        return print_json(&serde_json::json!({
            "valid": true,
            "tasks": ws.tasks.len(),
            "projects": ws.projects.len(),
            "sessions": ws.sessions.len(),
        }));
    }
    println!(
        "Workspace OK: {} tasks, {} projects, {} sessions",
        ws.tasks.len(),
        ws.projects.len(),
        ws.sessions.len()
    );
    Ok(())
}
