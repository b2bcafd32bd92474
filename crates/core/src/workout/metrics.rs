//! Derived workout metrics over the session log.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

use crate::aggregate::{bucket, streaks, summarize, Contribution, DateWindow, Period, SeriesPoint, Streaks};

use super::model::WorkoutSession;

/// Calendar days with at least one session.
pub fn session_days(sessions: &[WorkoutSession]) -> BTreeSet<NaiveDate> {
    sessions
        .iter()
        .map(|s| s.performed_at.date_naive())
        .collect()
}

/// Current and longest training streaks as of `today`.
pub fn session_streaks(sessions: &[WorkoutSession], today: NaiveDate) -> Streaks {
    streaks(&session_days(sessions), today)
}

/// Sessions per day over the last seven days, zero-filled.
pub fn weekly_session_series(
    sessions: &[WorkoutSession],
    anchor: DateTime<Utc>,
) -> Vec<SeriesPoint<u32>> {
    bucket(
        sessions,
        Period::Daily,
        anchor,
        |s| s.performed_at,
        |count: &mut u32, _| *count += 1,
    )
}

/// Total lifted volume within a window.
pub fn volume_in_window(sessions: &[WorkoutSession], w: DateWindow) -> Decimal {
    summarize(
        sessions,
        |s| w.contains(s.performed_at),
        |s| Contribution::Inflow(s.total_volume),
    )
    .inflow
}
