//! Recommendation commands for CLI.

use clap::Args;
use std::collections::HashSet;

use taskpilot_core::{Recommendation, Recommender};

use super::{format_day, print_json, WorkspaceArgs};

#[derive(Args, Debug)]
pub struct RecommendArgs {
    #[command(flatten)]
    pub workspace: WorkspaceArgs,
    /// Task IDs to leave out (repeatable or comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub exclude: Vec<String>,
    /// Number of recommendations to show
    #[arg(long, default_value = "1")]
    pub top: usize,
}

#[derive(Args, Debug)]
pub struct ScoreArgs {
    #[command(flatten)]
    pub workspace: WorkspaceArgs,
    /// Task IDs to leave out (repeatable or comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub exclude: Vec<String>,
}

pub fn run(args: RecommendArgs) -> Result<(), Box<dyn std::error::Error>> {
    let loaded = args.workspace.load()?;
    let mut recommender = Recommender::from_config(&loaded.config)?;
    let excluded: HashSet<String> = args.exclude.into_iter().collect();

    if args.top <= 1 {
        let best = recommender.select_best(&loaded.workspace.tasks, &excluded, loaded.now);
        if args.workspace.json {
            return print_json(&best);
        }
        match best {
            Some(rec) => print_recommendation(&rec),
            None => println!("Nothing to work on: every task is done, archived or excluded."),
        }
        return Ok(());
    }

    let top: Vec<Recommendation> = recommender
        .rank(&loaded.workspace.tasks, &excluded, loaded.now)
        .into_iter()
        .take(args.top)
        .map(Recommendation::from)
        .collect();

    if args.workspace.json {
        return print_json(&top);
    }
    if top.is_empty() {
        println!("Nothing to work on: every task is done, archived or excluded.");
        return Ok(());
    }

    println!("=== Recommendations ===\n");
    for (i, rec) in top.iter().enumerate() {
        println!("{}. {} (Score: {})", i + 1, rec.task.title, rec.score);
        println!("   ID: {}", rec.task.id);
        println!("   Reason: {}", rec.reason);
        println!();
    }
    Ok(())
}

fn print_recommendation(rec: &Recommendation) {
    println!("Next up: {}", rec.task.title);
    println!("  ID: {}", rec.task.id);
    println!("  Reason: {}", rec.reason);
    println!("  Score: {}", rec.score);
    println!("  Status: {}", rec.task.status);
    println!("  Priority: {}", rec.task.priority);
    println!("  Due: {}", format_day(rec.task.due_date));
    if let Some(minutes) = rec.task.estimated_duration {
        println!("  Estimate: {minutes} min");
    }
}

pub fn run_score(args: ScoreArgs) -> Result<(), Box<dyn std::error::Error>> {
    let loaded = args.workspace.load()?;
    let mut recommender = Recommender::from_config(&loaded.config)?;
    let excluded: HashSet<String> = args.exclude.into_iter().collect();
    let ranked = recommender.rank(&loaded.workspace.tasks, &excluded, loaded.now);

    if args.workspace.json {
        return print_json(&ranked);
    }
    if ranked.is_empty() {
        println!("No actionable tasks.");
        return Ok(());
    }

    println!("{:<4} {:>6}  {:<20} TITLE", "RANK", "SCORE", "ID");
    for (i, scored) in ranked.iter().enumerate() {
        println!(
            "{:<4} {:>6}  {:<20} {}",
            i + 1,
            scored.score,
            scored.task.id,
            scored.task.title
        );
        let terms: Vec<String> = scored
            .breakdown
            .terms
            .iter()
            .map(|t| format!("{} +{}", t.factor.label(), t.points))
            .collect();
        println!("             {} ({})", scored.reason, terms.join(", "));
    }

    if let Some(stats) = recommender.cache_stats() {
        tracing::debug!(hits = stats.hits, misses = stats.misses, "score memo");
    }
    Ok(())
}
