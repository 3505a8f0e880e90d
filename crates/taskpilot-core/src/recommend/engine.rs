//! Recommendation engine.
//!
//! Filters the candidate set, scores every remaining task, orders them with
//! a stable sort (ties keep input order) and explains the winner.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use super::scoring::{score_task, ScoreBreakdown, ScoreFactor, ScoringWeights};
use crate::cache::{CacheStats, TtlCache};
use crate::error::Result;
use crate::storage::Config;
use crate::task::{Task, TaskPriority, TaskStatus};

/// Why a task was recommended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RecommendationReason {
    /// Past its due date
    Overdue { days: u32 },
    /// Due on the current day
    DueToday,
    /// Due on the next day
    DueTomorrow,
    /// Already started
    InProgress,
    /// Driven mostly by the manual priority
    Priority { priority: TaskPriority },
    /// Untouched for a while
    Stale { days: u32 },
    /// Nothing stands out
    Default,
}

impl RecommendationReason {
    /// Derive the reason from the dominant scoring term.
    pub fn from_breakdown(task: &Task, breakdown: &ScoreBreakdown) -> Self {
        if let Some(days) = breakdown.days_overdue {
            return RecommendationReason::Overdue { days };
        }
        if breakdown.has(ScoreFactor::DueToday) {
            return RecommendationReason::DueToday;
        }

        match breakdown.top_term().map(|t| t.factor) {
            Some(ScoreFactor::DueTomorrow) => RecommendationReason::DueTomorrow,
            Some(ScoreFactor::InProgress) => RecommendationReason::InProgress,
            Some(ScoreFactor::Priority) => RecommendationReason::Priority {
                priority: task.priority,
            },
            Some(ScoreFactor::Staleness) => RecommendationReason::Stale {
                days: breakdown.idle_days,
            },
            _ => RecommendationReason::Default,
        }
    }
}

impl fmt::Display for RecommendationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecommendationReason::Overdue { days: 1 } => {
                write!(f, "Overdue by 1 day, this needs attention now")
            }
            RecommendationReason::Overdue { days } => {
                write!(f, "Overdue by {days} days, this needs attention now")
            }
            RecommendationReason::DueToday => write!(f, "Due today"),
            RecommendationReason::DueTomorrow => write!(f, "Due tomorrow, get ahead of it"),
            RecommendationReason::InProgress => {
                write!(f, "Already in progress, keep the momentum going")
            }
            RecommendationReason::Priority { priority } => {
                write!(f, "Marked as {priority} priority")
            }
            RecommendationReason::Stale { days } => {
                write!(f, "Untouched for {days} days")
            }
            RecommendationReason::Default => write!(f, "Next available task"),
        }
    }
}

/// The single task to work on now.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub task: Task,
    pub reason: RecommendationReason,
    pub score: u32,
}

/// A task with its score and explanation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredTask {
    pub task: Task,
    pub score: u32,
    pub reason: RecommendationReason,
    pub breakdown: ScoreBreakdown,
}

impl From<ScoredTask> for Recommendation {
    fn from(scored: ScoredTask) -> Self {
        Recommendation {
            task: scored.task,
            reason: scored.reason,
            score: scored.score,
        }
    }
}

/// Everything a task's score depends on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ScoreKey {
    task_id: String,
    updated_at: DateTime<Utc>,
    status: TaskStatus,
    priority: TaskPriority,
    due_day: Option<NaiveDate>,
    today: NaiveDate,
    idle_days: u32,
}

impl ScoreKey {
    fn new(task: &Task, now: DateTime<Utc>) -> Self {
        Self {
            task_id: task.id.clone(),
            updated_at: task.updated_at,
            status: task.status,
            priority: task.priority,
            due_day: task.due_day(),
            today: now.date_naive(),
            idle_days: task.days_since_update(now),
        }
    }
}

/// Scorer with configured weights and an optional per-task score memo.
#[derive(Debug, Clone)]
pub struct Recommender {
    weights: ScoringWeights,
    memo: Option<TtlCache<ScoreKey, ScoreBreakdown>>,
}

impl Default for Recommender {
    fn default() -> Self {
        Self {
            weights: ScoringWeights::default(),
            memo: None,
        }
    }
}

impl Recommender {
    /// Create a recommender after validating the weights.
    pub fn new(weights: ScoringWeights) -> Result<Self> {
        weights.validate()?;
        Ok(Self {
            weights,
            memo: None,
        })
    }

    /// Build from the `[scoring]` and `[cache]` config sections.
    pub fn from_config(config: &Config) -> Result<Self> {
        let recommender = Self::new(config.scoring)?;
        if config.cache.enabled {
            config.cache.validate()?;
            Ok(recommender.with_cache(config.cache.ttl()?, config.cache.capacity))
        } else {
            Ok(recommender)
        }
    }

    /// Memoize per-task scores for `ttl`, keeping at most `capacity` entries.
    pub fn with_cache(mut self, ttl: Duration, capacity: usize) -> Self {
        self.memo = Some(TtlCache::new(ttl, capacity));
        self
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    pub fn cache_stats(&self) -> Option<CacheStats> {
        self.memo.as_ref().map(|m| m.stats())
    }

    /// Score a single task, consulting the memo when enabled.
    pub fn score(&mut self, task: &Task, now: DateTime<Utc>) -> ScoredTask {
        let weights = self.weights;
        let breakdown = match self.memo.as_mut() {
            Some(memo) => memo.get_or_insert_with(ScoreKey::new(task, now), now, || {
                score_task(task, &weights, now)
            }),
            None => score_task(task, &weights, now),
        };

        ScoredTask {
            reason: RecommendationReason::from_breakdown(task, &breakdown),
            score: breakdown.total,
            task: task.clone(),
            breakdown,
        }
    }

    /// Score and order every candidate, best first.
    ///
    /// Completed, cancelled, archived and excluded tasks are skipped.
    pub fn rank(
        &mut self,
        tasks: &[Task],
        excluded_ids: &HashSet<String>,
        now: DateTime<Utc>,
    ) -> Vec<ScoredTask> {
        let mut scored: Vec<ScoredTask> = tasks
            .iter()
            .filter(|t| t.is_actionable() && !excluded_ids.contains(&t.id))
            .map(|t| self.score(t, now))
            .collect();

        // stable: equal scores keep input order
        scored.sort_by(|a, b| b.score.cmp(&a.score));
        scored
    }

    /// Pick the single best task, `None` when nothing qualifies.
    pub fn select_best(
        &mut self,
        tasks: &[Task],
        excluded_ids: &HashSet<String>,
        now: DateTime<Utc>,
    ) -> Option<Recommendation> {
        let best = self.rank(tasks, excluded_ids, now).into_iter().next();

        match &best {
            Some(scored) => tracing::debug!(
                task_id = %scored.task.id,
                score = scored.score,
                reason = %scored.reason,
                candidates = tasks.len(),
                "selected task"
            ),
            None => tracing::debug!(candidates = tasks.len(), "no task to recommend"),
        }

        best.map(Recommendation::from)
    }
}

/// Rank with default weights and no memo.
pub fn rank_tasks(
    tasks: &[Task],
    excluded_ids: &HashSet<String>,
    now: DateTime<Utc>,
) -> Vec<ScoredTask> {
    Recommender::default().rank(tasks, excluded_ids, now)
}

/// Select the best task with default weights.
pub fn select_best_task(
    tasks: &[Task],
    excluded_ids: &HashSet<String>,
    now: DateTime<Utc>,
) -> Option<Recommendation> {
    Recommender::default().select_best(tasks, excluded_ids, now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 15, 10, 0, 0).unwrap()
    }

    fn make_task(id: &str, priority: TaskPriority, due_in_days: Option<i64>) -> Task {
        let mut task = Task::new(format!("Task {id}"));
        task.id = id.to_string();
        task.priority = priority;
        task.due_date = due_in_days.map(|d| now() + Duration::days(d));
        task.created_at = now();
        task.updated_at = now();
        task
    }

    fn none() -> HashSet<String> {
        HashSet::new()
    }

    #[test]
    fn test_empty_input_returns_none() {
        assert!(select_best_task(&[], &none(), now()).is_none());
    }

    #[test]
    fn test_overdue_beats_urgent_in_progress() {
        let mut busy = make_task("busy", TaskPriority::Urgent, Some(1));
        busy.status = TaskStatus::InProgress;
        busy.updated_at = now() - Duration::days(30);
        let late = make_task("late", TaskPriority::Low, Some(-1));

        let best = select_best_task(&[busy, late], &none(), now()).unwrap();
        assert_eq!(best.task.id, "late");
        assert_eq!(best.reason, RecommendationReason::Overdue { days: 1 });
        assert_eq!(best.score, 1000);
    }

    #[test]
    fn test_filters_terminal_archived_and_excluded() {
        let mut done = make_task("done", TaskPriority::Urgent, Some(-3));
        done.status = TaskStatus::Completed;
        let mut dropped = make_task("dropped", TaskPriority::Urgent, Some(-3));
        dropped.status = TaskStatus::Cancelled;
        let mut archived = make_task("archived", TaskPriority::Urgent, Some(-3));
        archived.archived_at = Some(now());
        let skipped = make_task("skipped", TaskPriority::Urgent, Some(0));
        let plain = make_task("plain", TaskPriority::Low, None);

        let excluded: HashSet<String> = ["skipped".to_string()].into_iter().collect();
        let ranked = rank_tasks(&[done, dropped, archived, skipped, plain], &excluded, now());
        let ids: Vec<_> = ranked.iter().map(|s| s.task.id.as_str()).collect();
        assert_eq!(ids, vec!["plain"]);
    }

    #[test]
    fn test_all_excluded_returns_none() {
        let task = make_task("a", TaskPriority::High, None);
        let excluded: HashSet<String> = ["a".to_string()].into_iter().collect();
        assert!(select_best_task(&[task], &excluded, now()).is_none());
    }

    #[test]
    fn test_ties_keep_input_order() {
        let first = make_task("first", TaskPriority::Low, Some(-5));
        let second = make_task("second", TaskPriority::Urgent, Some(-1));
        let best = select_best_task(&[first, second], &none(), now()).unwrap();
        assert_eq!(best.task.id, "first");
    }

    #[test]
    fn test_reason_follows_dominant_term() {
        let mut task = make_task("a", TaskPriority::Low, None);
        task.status = TaskStatus::InProgress;
        let scored = Recommender::default().score(&task, now());
        assert_eq!(scored.reason, RecommendationReason::InProgress);

        let task = make_task("b", TaskPriority::High, None);
        let scored = Recommender::default().score(&task, now());
        assert_eq!(
            scored.reason,
            RecommendationReason::Priority {
                priority: TaskPriority::High
            }
        );

        let mut task = make_task("c", TaskPriority::Low, None);
        task.updated_at = now() - Duration::days(8);
        let scored = Recommender::default().score(&task, now());
        assert_eq!(scored.reason, RecommendationReason::Stale { days: 8 });
    }

    #[test]
    fn test_reason_display() {
        assert_eq!(
            RecommendationReason::Overdue { days: 3 }.to_string(),
            "Overdue by 3 days, this needs attention now"
        );
        assert_eq!(RecommendationReason::DueToday.to_string(), "Due today");
    }

    #[test]
    fn test_memo_hits_on_repeat_ranking() {
        let tasks = vec![
            make_task("a", TaskPriority::High, None),
            make_task("b", TaskPriority::Low, Some(1)),
        ];
        let mut recommender =
            Recommender::default().with_cache(Duration::seconds(60), 16);
        let first = recommender.rank(&tasks, &none(), now());
        let second = recommender.rank(&tasks, &none(), now() + Duration::seconds(5));
        assert_eq!(first, second);

        let stats = recommender.cache_stats().unwrap();
        assert_eq!(stats.misses, 2);
        assert_eq!(stats.hits, 2);
    }

    #[test]
    fn test_memo_misses_after_task_changes() {
        let mut task = make_task("a", TaskPriority::Low, None);
        let mut recommender =
            Recommender::default().with_cache(Duration::seconds(60), 16);
        let before = recommender.score(&task, now()).score;

        task.priority = TaskPriority::Urgent;
        let after = recommender.score(&task, now()).score;
        assert!(after > before);
        assert_eq!(recommender.cache_stats().unwrap().hits, 0);
    }

    #[test]
    fn test_new_rejects_invalid_weights() {
        let weights = ScoringWeights {
            overdue_bonus: 1,
            ..ScoringWeights::default()
        };
        assert!(Recommender::new(weights).is_err());
    }

    #[test]
    fn test_from_config_honours_cache_switch() {
        let mut config = Config::default();
        config.cache.enabled = false;
        assert!(Recommender::from_config(&config).unwrap().cache_stats().is_none());

        config.cache.enabled = true;
        assert!(Recommender::from_config(&config).unwrap().cache_stats().is_some());
    }

    #[test]
    fn test_from_config_rejects_unrepresentable_ttl() {
        let mut config = Config::default();
        config.cache.ttl_secs = 10_000_000_000_000_000;
        assert!(Recommender::from_config(&config).is_err());

        config.cache.ttl_secs = u64::MAX;
        assert!(Recommender::from_config(&config).is_err());

        // a disabled memo never reads the TTL
        config.cache.enabled = false;
        assert!(Recommender::from_config(&config).is_ok());
    }
}
