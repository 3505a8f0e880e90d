//! # Taskpilot Core Library
//!
//! Planning logic behind the Smart Planner: given an exported snapshot of
//! tasks, projects and work sessions, decide what to work on next and
//! explain why. A standalone CLI exposes every operation; the web front end
//! consumes the same scoring rules.
//!
//! ## Architecture
//!
//! - **Recommend**: additive, deadline-first scoring with a stable ranking
//! - **Cache**: TTL map with LRU eviction used to memoize task scores
//! - **Insights**: actionable observations (overdue, stalled, over budget)
//! - **Analytics**: dashboard aggregates
//! - **Storage**: TOML configuration and data directory resolution
//!
//! ## Key Components
//!
//! - [`Recommender`]: scoring and selection
//! - [`PlannerSession`]: skip-aware "what next" flow
//! - [`Workspace`]: snapshot loading and validation
//! - [`Config`]: application configuration management

pub mod analytics;
pub mod cache;
pub mod error;
pub mod insights;
pub mod planner;
pub mod recommend;
pub mod storage;
pub mod task;
pub mod workspace;

pub use analytics::{DailyMinutes, DashboardStats, MAX_DAILY_WINDOW_DAYS};
pub use cache::{CacheStats, TtlCache};
pub use error::{ConfigError, CoreError, ValidationError};
pub use insights::{generate_insights, Insight, InsightKind, InsightSettings, Severity};
pub use planner::PlannerSession;
pub use recommend::{
    rank_tasks, score_task, select_best_task, Recommendation, RecommendationReason, Recommender,
    ScoreBreakdown, ScoreFactor, ScoredTask, ScoringWeights,
};
pub use storage::{CacheConfig, Config};
pub use task::{
    Project, ProjectStatus, Task, TaskLevel, TaskPriority, TaskSession, TaskStatus,
};
pub use workspace::Workspace;
