//! Insight command for CLI.

use clap::Args;

use taskpilot_core::{generate_insights, Severity};

use super::{print_json, WorkspaceArgs};

#[derive(Args, Debug)]
pub struct InsightsArgs {
    #[command(flatten)]
    pub workspace: WorkspaceArgs,
    /// Only show insights at or above this severity (info, warning, critical)
    #[arg(long, default_value = "info")]
    pub min_severity: String,
}

fn parse_severity(value: &str) -> Result<Severity, String> {
    match value.to_ascii_lowercase().as_str() {
        "info" => Ok(Severity::Info),
        "warning" | "warn" => Ok(Severity::Warning),
        "critical" => Ok(Severity::Critical),
        other => Err(format!("unknown severity '{other}'")),
    }
}

pub fn run(args: InsightsArgs) -> Result<(), Box<dyn std::error::Error>> {
    let min = parse_severity(&args.min_severity)?;
    let loaded = args.workspace.load()?;
    let insights: Vec<_> = generate_insights(&loaded.workspace, &loaded.config.insights, loaded.now)
        .into_iter()
        .filter(|i| i.severity >= min)
        .collect();

    if args.workspace.json {
        return print_json(&insights);
    }
    if insights.is_empty() {
        println!("All clear: no insights right now.");
        return Ok(());
    }

    for insight in &insights {
        let tag = match insight.severity {
            Severity::Critical => "CRITICAL",
            Severity::Warning => "WARNING",
            Severity::Info => "INFO",
        };
        println!("[{tag}] {}", insight.title);
        println!("  {}", insight.message);
        println!("  Action: {}", insight.suggested_action);
        if !insight.task_ids.is_empty() {
            println!("  Tasks: {}", insight.task_ids.join(", "));
        }
        println!();
    }
    Ok(())
}
