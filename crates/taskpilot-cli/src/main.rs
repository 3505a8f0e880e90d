use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "taskpilot", version, about = "Taskpilot CLI: decide what to work on next")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug); TASKPILOT_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Recommend the task to work on now
    Recommend(commands::recommend::RecommendArgs),
    /// Show the full ranking with score breakdowns
    Score(commands::recommend::ScoreArgs),
    /// Contextual insights and suggested actions
    Insights(commands::insights::InsightsArgs),
    /// Dashboard statistics
    Stats(commands::stats::StatsArgs),
    /// List tasks in the workspace snapshot
    Tasks(commands::tasks::TasksArgs),
    /// Check the workspace snapshot for broken references
    Validate(commands::WorkspaceArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Print shell completions
    Completions {
        /// Target shell
        shell: clap_complete::Shell,
    },
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_env("TASKPILOT_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Recommend(args) => commands::recommend::run(args),
        Commands::Score(args) => commands::recommend::run_score(args),
        Commands::Insights(args) => commands::insights::run(args),
        Commands::Stats(args) => commands::stats::run(args),
        Commands::Tasks(args) => commands::tasks::run(args),
        Commands::Validate(args) => commands::tasks::run_validate(args),
        Commands::Config { action } => commands::config::run(action),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "taskpilot", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
