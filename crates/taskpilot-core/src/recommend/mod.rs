//! Task recommendation.
//!
//! Answers one question: given the tasks on hand, which should the user work
//! on right now? Deadlines dominate (overdue, then due today), after which
//! momentum, manual priority and staleness are summed.

mod engine;
mod scoring;

pub use engine::{
    rank_tasks, select_best_task, Recommendation, RecommendationReason, Recommender, ScoredTask,
};
pub use scoring::{score_task, ScoreBreakdown, ScoreFactor, ScoreTerm, ScoringWeights};
