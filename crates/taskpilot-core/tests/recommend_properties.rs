//! Property tests for the recommendation scorer.

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;
use std::collections::HashSet;

use taskpilot_core::{
    rank_tasks, score_task, select_best_task, ScoringWeights, Task, TaskPriority, TaskStatus,
};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 6, 15, 10, 0, 0).unwrap()
}

fn priority_strategy() -> impl Strategy<Value = TaskPriority> {
    prop_oneof![
        Just(TaskPriority::Low),
        Just(TaskPriority::Medium),
        Just(TaskPriority::High),
        Just(TaskPriority::Urgent),
    ]
}

fn status_strategy() -> impl Strategy<Value = TaskStatus> {
    prop_oneof![
        4 => Just(TaskStatus::Pending),
        3 => Just(TaskStatus::InProgress),
        1 => Just(TaskStatus::Completed),
        1 => Just(TaskStatus::Cancelled),
    ]
}

fn task_strategy() -> impl Strategy<Value = (TaskPriority, TaskStatus, Option<i64>, i64)> {
    (
        priority_strategy(),
        status_strategy(),
        proptest::option::of(-10i64..10),
        0i64..120,
    )
}

fn build_tasks(specs: Vec<(TaskPriority, TaskStatus, Option<i64>, i64)>) -> Vec<Task> {
    specs
        .into_iter()
        .enumerate()
        .map(|(i, (priority, status, due, idle))| {
            let mut task = Task::new(format!("Task {i}"));
            task.id = format!("t{i}");
            task.priority = priority;
            task.status = status;
            task.due_date = due.map(|d| now() + Duration::days(d));
            task.created_at = now() - Duration::days(idle);
            task.updated_at = now() - Duration::days(idle);
            task
        })
        .collect()
}

proptest! {
    #[test]
    fn overdue_tasks_rank_above_everything_else(specs in prop::collection::vec(task_strategy(), 0..25)) {
        let tasks = build_tasks(specs);
        let today = now().date_naive();
        let ranked = rank_tasks(&tasks, &HashSet::new(), now());

        let mut seen_non_overdue = false;
        for scored in &ranked {
            let overdue = scored.task.is_overdue_on(today);
            if overdue {
                prop_assert!(!seen_non_overdue, "overdue task {} ranked below a non-overdue one", scored.task.id);
            } else {
                seen_non_overdue = true;
            }
        }
    }

    #[test]
    fn excluded_tasks_are_never_returned(
        specs in prop::collection::vec(task_strategy(), 1..20),
        mask in prop::collection::vec(any::<bool>(), 20),
    ) {
        let tasks = build_tasks(specs);
        let excluded: HashSet<String> = tasks
            .iter()
            .zip(mask.iter())
            .filter(|(_, skip)| **skip)
            .map(|(t, _)| t.id.clone())
            .collect();

        if let Some(best) = select_best_task(&tasks, &excluded, now()) {
            prop_assert!(!excluded.contains(&best.task.id));
            prop_assert!(best.task.is_actionable());
        }
        for scored in rank_tasks(&tasks, &excluded, now()) {
            prop_assert!(!excluded.contains(&scored.task.id));
        }
    }

    #[test]
    fn raising_priority_never_lowers_score(
        (_, status, due, idle) in task_strategy(),
        from in priority_strategy(),
        to in priority_strategy(),
    ) {
        prop_assume!(from <= to);
        let mut tasks = build_tasks(vec![(from, status, due, idle)]);
        let weights = ScoringWeights::default();
        let before = score_task(&tasks[0], &weights, now()).total;
        tasks[0].priority = to;
        let after = score_task(&tasks[0], &weights, now()).total;
        prop_assert!(after >= before);
    }

    #[test]
    fn best_is_head_of_ranking(specs in prop::collection::vec(task_strategy(), 0..20)) {
        let tasks = build_tasks(specs);
        let best = select_best_task(&tasks, &HashSet::new(), now());
        let ranked = rank_tasks(&tasks, &HashSet::new(), now());
        match (best, ranked.first()) {
            (None, None) => {}
            (Some(best), Some(head)) => {
                prop_assert_eq!(&best.task.id, &head.task.id);
                prop_assert_eq!(best.score, head.score);
            }
            _ => prop_assert!(false, "select_best_task disagrees with rank_tasks"),
        }
    }

    #[test]
    fn ranking_is_sorted_and_stable(specs in prop::collection::vec(task_strategy(), 0..25)) {
        let tasks = build_tasks(specs);
        let ranked = rank_tasks(&tasks, &HashSet::new(), now());
        let position = |id: &str| tasks.iter().position(|t| t.id == id).unwrap();
        for pair in ranked.windows(2) {
            prop_assert!(pair[0].score >= pair[1].score);
            if pair[0].score == pair[1].score {
                prop_assert!(position(&pair[0].task.id) < position(&pair[1].task.id));
            }
        }
    }
}

#[test]
fn medium_to_urgent_on_identical_task() {
    let mut task = Task::new("Draft proposal");
    task.updated_at = now() - Duration::days(2);
    task.due_date = Some(now() + Duration::days(4));
    let weights = ScoringWeights::default();

    task.priority = TaskPriority::Medium;
    let medium = score_task(&task, &weights, now()).total;
    task.priority = TaskPriority::Urgent;
    let urgent = score_task(&task, &weights, now()).total;

    assert_eq!(medium, 40);
    assert_eq!(urgent, 110);
}

#[test]
fn empty_input_has_no_recommendation() {
    assert!(select_best_task(&[], &HashSet::new(), now()).is_none());
}
