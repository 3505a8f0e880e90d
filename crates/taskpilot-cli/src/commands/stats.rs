use clap::Args;

use taskpilot_core::{DashboardStats, MAX_DAILY_WINDOW_DAYS};

use super::{print_json, WorkspaceArgs};

#[derive(Args, Debug)]
pub struct StatsArgs {
    #[command(flatten)]
    pub workspace: WorkspaceArgs,
    /// Days of tracked time to show
    #[arg(
        long,
        default_value = "7",
        value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_DAILY_WINDOW_DAYS))
    )]
    pub days: u32,
}

pub fn run(args: StatsArgs) -> Result<(), Box<dyn std::error::Error>> {
    let loaded = args.workspace.load()?;
    let stats = DashboardStats::compute(&loaded.workspace, loaded.now, args.days);

    if args.workspace.json {
        return print_json(&stats);
    }

    println!("Tasks: {}", stats.total_tasks);
    for (status, count) in &stats.by_status {
        println!("  {status}: {count}");
    }
    println!("Priority:");
    for (priority, count) in &stats.by_priority {
        println!("  {priority}: {count}");
    }
    println!("Completion rate: {:.0}%", stats.completion_rate * 100.0);
    println!("Overdue: {}", stats.overdue);
    println!("Tracked: {} min", stats.tracked_minutes);
    for (project, minutes) in &stats.tracked_minutes_by_project {
        let name = loaded
            .workspace
            .project(project)
            .map(|p| p.name.as_str())
            .unwrap_or(project.as_str());
        println!("  {name}: {minutes} min");
    }
    if !stats.daily_minutes.is_empty() {
        println!("Last {} days:", args.days);
        for day in &stats.daily_minutes {
            println!("  {}  {:>4} min", day.date, day.minutes);
        }
    }
    Ok(())
}
