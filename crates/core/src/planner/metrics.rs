//! Derived planner metrics over the task log.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};

use crate::aggregate::{bucket, streaks, DateWindow, Period, SeriesPoint, Streaks};

use super::model::{Task, TaskStatus};

/// Calendar days with at least one task completion.
pub fn completion_days(tasks: &[Task]) -> BTreeSet<NaiveDate> {
    tasks
        .iter()
        .filter_map(|t| t.completed_at)
        .map(|at| at.date_naive())
        .collect()
}

/// Current and longest completion streaks as of `today`.
pub fn completion_streaks(tasks: &[Task], today: NaiveDate) -> Streaks {
    streaks(&completion_days(tasks), today)
}

/// Percentage of tasks due in the window that are done, rounded.
pub fn completion_rate(tasks: &[Task], w: DateWindow) -> u32 {
    let due: Vec<&Task> = tasks
        .iter()
        .filter(|t| {
            let due_start = t.due_on.and_hms_opt(0, 0, 0).unwrap().and_utc();
            w.contains(due_start)
        })
        .collect();
    if due.is_empty() {
        return 0;
    }
    let done = due.iter().filter(|t| t.status == TaskStatus::Done).count();
    ((done * 100 + due.len() / 2) / due.len()) as u32
}

/// Completions per day over the last seven days, zero-filled.
pub fn daily_completion_series(tasks: &[Task], anchor: DateTime<Utc>) -> Vec<SeriesPoint<u32>> {
    let completed: Vec<DateTime<Utc>> = tasks.iter().filter_map(|t| t.completed_at).collect();
    bucket(
        &completed,
        Period::Daily,
        anchor,
        |at| *at,
        |count: &mut u32, _| *count += 1,
    )
}
