pub mod config;
pub mod insights;
pub mod recommend;
pub mod stats;
pub mod tasks;

use chrono::{DateTime, Utc};
use clap::Args;
use std::path::PathBuf;

use taskpilot_core::storage::default_workspace_path;
use taskpilot_core::{Config, Workspace};

/// Options shared by every command that reads a workspace snapshot.
#[derive(Args, Debug, Clone)]
pub struct WorkspaceArgs {
    /// Workspace snapshot (JSON); defaults to the configured path
    #[arg(long, short = 'w')]
    pub workspace: Option<PathBuf>,
    /// Evaluate as of this instant (RFC 3339) instead of the current time
    #[arg(long)]
    pub now: Option<DateTime<Utc>>,
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Everything a command needs: config, validated snapshot and the clock.
pub struct Loaded {
    pub config: Config,
    pub workspace: Workspace,
    pub now: DateTime<Utc>,
}

impl WorkspaceArgs {
    fn resolve_path(&self, config: &Config) -> Result<PathBuf, Box<dyn std::error::Error>> {
        if let Some(path) = &self.workspace {
            return Ok(path.clone());
        }
        if let Some(path) = &config.workspace_path {
            return Ok(PathBuf::from(path));
        }
        Ok(default_workspace_path()?)
    }

    /// Load config and snapshot, then validate the snapshot.
    pub fn load(&self) -> Result<Loaded, Box<dyn std::error::Error>> {
        let config = Config::load()?;
        let path = self.resolve_path(&config)?;
        let workspace = Workspace::load(&path)
            .map_err(|e| format!("cannot read workspace {}: {e}", path.display()))?;
        workspace.validate()?;

        Ok(Loaded {
            config,
            workspace,
            now: self.now.unwrap_or_else(Utc::now),
        })
    }
}

/// Print a value as pretty JSON.
pub fn print_json<T: serde::Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// `YYYY-MM-DD` or `-`.
pub fn format_day(date: Option<DateTime<Utc>>) -> String {
    date.map(|d| d.date_naive().to_string())
        .unwrap_or_else(|| "-".to_string())
}
