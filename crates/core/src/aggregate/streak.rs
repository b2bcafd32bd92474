//! Completion streaks over calendar days.

use std::collections::BTreeSet;

use chrono::NaiveDate;

/// Current and longest consecutive-day streaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Streaks {
    pub current: u32,
    pub longest: u32,
}

/// Compute streaks from the set of days with at least one completion.
///
/// The current streak walks backward from `today` and requires a
/// qualifying completion on `today` itself; the longest streak is the
/// longest consecutive run anywhere in the set and is unaffected by gaps
/// before today.
pub fn streaks(completion_days: &BTreeSet<NaiveDate>, today: NaiveDate) -> Streaks {
    let mut current = 0u32;
    let mut cursor = today;
    while completion_days.contains(&cursor) {
        current += 1;
        match cursor.pred_opt() {
            Some(previous) => cursor = previous,
            None => break,
        }
    }

    let mut longest = 0u32;
    let mut run = 0u32;
    let mut previous: Option<NaiveDate> = None;
    for &day in completion_days {
        run = match previous {
            Some(p) if p.succ_opt() == Some(day) => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        previous = Some(day);
    }

    Streaks { current, longest }
}
