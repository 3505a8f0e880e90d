//! Additive task scoring.
//!
//! Each task gets an unsigned integer score built from independent terms:
//!
//! | Term        | Points                                   |
//! |-------------|------------------------------------------|
//! | Overdue     | `overdue_bonus` (short-circuits)         |
//! | Due today   | `due_today_bonus` (short-circuits)       |
//! | Due tomorrow| `due_tomorrow_bonus`                     |
//! | In progress | `in_progress_bonus`                      |
//! | Priority    | `priority_low` .. `priority_urgent`      |
//! | Staleness   | days idle × `staleness_per_day`, capped  |
//!
//! The short-circuit terms are sized so that nothing else can reach them,
//! which [`ScoringWeights::validate`] enforces.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::task::{Task, TaskPriority, TaskStatus};

/// Point values for each scoring term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScoringWeights {
    #[serde(default = "default_overdue_bonus")]
    pub overdue_bonus: u32,
    #[serde(default = "default_due_today_bonus")]
    pub due_today_bonus: u32,
    #[serde(default = "default_due_tomorrow_bonus")]
    pub due_tomorrow_bonus: u32,
    /// Momentum bonus for tasks already started
    #[serde(default = "default_in_progress_bonus")]
    pub in_progress_bonus: u32,
    #[serde(default = "default_priority_low")]
    pub priority_low: u32,
    #[serde(default = "default_priority_medium")]
    pub priority_medium: u32,
    #[serde(default = "default_priority_high")]
    pub priority_high: u32,
    #[serde(default = "default_priority_urgent")]
    pub priority_urgent: u32,
    #[serde(default = "default_staleness_per_day")]
    pub staleness_per_day: u32,
    #[serde(default = "default_staleness_cap")]
    pub staleness_cap: u32,
}

fn default_overdue_bonus() -> u32 {
    1000
}
fn default_due_today_bonus() -> u32 {
    500
}
fn default_due_tomorrow_bonus() -> u32 {
    200
}
fn default_in_progress_bonus() -> u32 {
    75
}
fn default_priority_low() -> u32 {
    10
}
fn default_priority_medium() -> u32 {
    30
}
fn default_priority_high() -> u32 {
    60
}
fn default_priority_urgent() -> u32 {
    100
}
fn default_staleness_per_day() -> u32 {
    5
}
fn default_staleness_cap() -> u32 {
    50
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            overdue_bonus: default_overdue_bonus(),
            due_today_bonus: default_due_today_bonus(),
            due_tomorrow_bonus: default_due_tomorrow_bonus(),
            in_progress_bonus: default_in_progress_bonus(),
            priority_low: default_priority_low(),
            priority_medium: default_priority_medium(),
            priority_high: default_priority_high(),
            priority_urgent: default_priority_urgent(),
            staleness_per_day: default_staleness_per_day(),
            staleness_cap: default_staleness_cap(),
        }
    }
}

impl ScoringWeights {
    /// Points for a manual priority tier.
    pub fn priority_bonus(&self, priority: TaskPriority) -> u32 {
        match priority {
            TaskPriority::Low => self.priority_low,
            TaskPriority::Medium => self.priority_medium,
            TaskPriority::High => self.priority_high,
            TaskPriority::Urgent => self.priority_urgent,
        }
    }

    /// Highest score reachable without a short-circuit term.
    pub fn max_open_score(&self) -> u32 {
        let top_priority = self
            .priority_low
            .max(self.priority_medium)
            .max(self.priority_high)
            .max(self.priority_urgent);
        self.due_tomorrow_bonus
            .saturating_add(self.in_progress_bonus)
            .saturating_add(top_priority)
            .saturating_add(self.staleness_cap)
    }

    /// Check that overdue > due today > anything else, and that priority
    /// tiers are monotone.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.overdue_bonus <= self.due_today_bonus {
            return Err(ValidationError::InvalidWeights(format!(
                "overdue_bonus ({}) must exceed due_today_bonus ({})",
                self.overdue_bonus, self.due_today_bonus
            )));
        }

        let open = self.max_open_score();
        if self.due_today_bonus <= open {
            return Err(ValidationError::InvalidWeights(format!(
                "due_today_bonus ({}) must exceed the highest non-deadline score ({open})",
                self.due_today_bonus
            )));
        }

        let tiers = [
            ("priority_low", self.priority_low),
            ("priority_medium", self.priority_medium),
            ("priority_high", self.priority_high),
            ("priority_urgent", self.priority_urgent),
        ];
        for pair in tiers.windows(2) {
            let (lower_name, lower) = pair[0];
            let (upper_name, upper) = pair[1];
            if lower > upper {
                return Err(ValidationError::InvalidWeights(format!(
                    "{lower_name} ({lower}) must not exceed {upper_name} ({upper})"
                )));
            }
        }

        Ok(())
    }
}

/// Which rule contributed points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreFactor {
    Overdue,
    DueToday,
    DueTomorrow,
    InProgress,
    Priority,
    Staleness,
}

impl ScoreFactor {
    pub fn label(&self) -> &'static str {
        match self {
            ScoreFactor::Overdue => "overdue",
            ScoreFactor::DueToday => "due today",
            ScoreFactor::DueTomorrow => "due tomorrow",
            ScoreFactor::InProgress => "in progress",
            ScoreFactor::Priority => "priority",
            ScoreFactor::Staleness => "staleness",
        }
    }
}

/// One scoring term and the points it added.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreTerm {
    pub factor: ScoreFactor,
    pub points: u32,
}

/// Complete scoring breakdown for explainability.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub terms: Vec<ScoreTerm>,
    pub total: u32,
    /// Days past the due date, set only for overdue tasks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_overdue: Option<u32>,
    /// Whole days since the last update
    pub idle_days: u32,
}

impl ScoreBreakdown {
    fn add(&mut self, factor: ScoreFactor, points: u32) {
        self.total = self.total.saturating_add(points);
        self.terms.push(ScoreTerm { factor, points });
    }

    /// Points contributed by `factor`, 0 when absent.
    pub fn points_for(&self, factor: ScoreFactor) -> u32 {
        self.terms
            .iter()
            .filter(|t| t.factor == factor)
            .map(|t| t.points)
            .sum()
    }

    pub fn has(&self, factor: ScoreFactor) -> bool {
        self.terms.iter().any(|t| t.factor == factor)
    }

    /// Largest non-zero term; the earliest wins a tie.
    pub fn top_term(&self) -> Option<&ScoreTerm> {
        let mut top: Option<&ScoreTerm> = None;
        for term in self.terms.iter().filter(|t| t.points > 0) {
            if top.map_or(true, |best| term.points > best.points) {
                top = Some(term);
            }
        }
        top
    }
}

/// Score a task at `now`.
///
/// The task's status is not checked here; callers filter out tasks that are
/// not actionable before ranking.
pub fn score_task(task: &Task, weights: &ScoringWeights, now: DateTime<Utc>) -> ScoreBreakdown {
    let today = now.date_naive();
    let tomorrow = today + Duration::days(1);
    let idle_days = task.days_since_update(now);

    let mut breakdown = ScoreBreakdown {
        idle_days,
        ..ScoreBreakdown::default()
    };

    if let Some(due) = task.due_day() {
        if due < today {
            breakdown.days_overdue = Some((today - due).num_days().max(0) as u32);
            breakdown.add(ScoreFactor::Overdue, weights.overdue_bonus);
            return breakdown;
        }
        if due == today {
            breakdown.add(ScoreFactor::DueToday, weights.due_today_bonus);
            return breakdown;
        }
        if due == tomorrow {
            breakdown.add(ScoreFactor::DueTomorrow, weights.due_tomorrow_bonus);
        }
    }

    if task.status == TaskStatus::InProgress {
        breakdown.add(ScoreFactor::InProgress, weights.in_progress_bonus);
    }

    breakdown.add(ScoreFactor::Priority, weights.priority_bonus(task.priority));

    let staleness = idle_days
        .saturating_mul(weights.staleness_per_day)
        .min(weights.staleness_cap);
    if staleness > 0 {
        breakdown.add(ScoreFactor::Staleness, staleness);
    }

    breakdown
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 15, 10, 0, 0).unwrap()
    }

    fn make_task(priority: TaskPriority, due_in_days: Option<i64>) -> Task {
        let mut task = Task::new("Test Task");
        task.priority = priority;
        task.due_date = due_in_days.map(|d| now() + Duration::days(d));
        task.created_at = now();
        task.updated_at = now();
        task
    }

    #[test]
    fn test_default_weights_are_valid() {
        assert!(ScoringWeights::default().validate().is_ok());
        assert_eq!(ScoringWeights::default().max_open_score(), 425);
    }

    #[test]
    fn test_validate_rejects_unreachable_today_bonus() {
        let weights = ScoringWeights {
            due_today_bonus: 400,
            ..ScoringWeights::default()
        };
        assert!(weights.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_overdue_below_today() {
        let weights = ScoringWeights {
            overdue_bonus: 500,
            ..ScoringWeights::default()
        };
        assert!(weights.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_inverted_priority_tiers() {
        let weights = ScoringWeights {
            priority_high: 20,
            ..ScoringWeights::default()
        };
        let err = weights.validate().unwrap_err();
        assert!(err.to_string().contains("priority_medium"));
    }

    #[test]
    fn test_overdue_short_circuits() {
        let mut task = make_task(TaskPriority::Urgent, Some(-2));
        task.status = TaskStatus::InProgress;
        let breakdown = score_task(&task, &ScoringWeights::default(), now());
        assert_eq!(breakdown.total, 1000);
        assert_eq!(breakdown.terms.len(), 1);
        assert_eq!(breakdown.days_overdue, Some(2));
    }

    #[test]
    fn test_due_today_short_circuits() {
        let task = make_task(TaskPriority::Low, Some(0));
        let breakdown = score_task(&task, &ScoringWeights::default(), now());
        assert_eq!(breakdown.total, 500);
        assert!(breakdown.has(ScoreFactor::DueToday));
    }

    #[test]
    fn test_due_earlier_today_is_not_overdue() {
        let mut task = make_task(TaskPriority::Medium, None);
        task.due_date = Some(Utc.with_ymd_and_hms(2026, 6, 15, 1, 0, 0).unwrap());
        let breakdown = score_task(&task, &ScoringWeights::default(), now());
        assert_eq!(breakdown.total, 500);
        assert!(breakdown.has(ScoreFactor::DueToday));
        assert!(!breakdown.has(ScoreFactor::Overdue));
        assert_eq!(breakdown.days_overdue, None);
    }

    #[test]
    fn test_due_tomorrow_adds_to_other_terms() {
        let mut task = make_task(TaskPriority::High, Some(1));
        task.status = TaskStatus::InProgress;
        let breakdown = score_task(&task, &ScoringWeights::default(), now());
        // 200 tomorrow + 75 in progress + 60 high
        assert_eq!(breakdown.total, 335);
    }

    #[test]
    fn test_staleness_is_capped() {
        let mut task = make_task(TaskPriority::Medium, None);
        task.updated_at = now() - Duration::days(4);
        let breakdown = score_task(&task, &ScoringWeights::default(), now());
        assert_eq!(breakdown.points_for(ScoreFactor::Staleness), 20);

        task.updated_at = now() - Duration::days(90);
        let breakdown = score_task(&task, &ScoringWeights::default(), now());
        assert_eq!(breakdown.points_for(ScoreFactor::Staleness), 50);
        assert_eq!(breakdown.total, 80);
    }

    #[test]
    fn test_top_term_prefers_earliest_on_tie() {
        let mut breakdown = ScoreBreakdown::default();
        breakdown.add(ScoreFactor::InProgress, 30);
        breakdown.add(ScoreFactor::Priority, 30);
        assert_eq!(breakdown.top_term().unwrap().factor, ScoreFactor::InProgress);
    }

    #[test]
    fn test_weights_deserialize_with_partial_table() {
        let weights: ScoringWeights = toml::from_str("overdue_bonus = 5000").unwrap();
        assert_eq!(weights.overdue_bonus, 5000);
        assert_eq!(weights.due_today_bonus, 500);
    }
}
