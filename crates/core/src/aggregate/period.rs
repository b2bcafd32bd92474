//! Period types and `[start, end)` window computation.
//!
//! End boundaries are exclusive so an event exactly on a boundary counts
//! toward the next window, never both.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Supported period types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    Yearly,
}

/// Half-open date range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateWindow {
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }
}

pub(crate) fn day_start(date: NaiveDate) -> DateTime<Utc> {
    // Midnight always exists.
    date.and_hms_opt(0, 0, 0).unwrap().and_utc()
}

fn month_start(year: i32, month: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, 1).unwrap()
}

/// Calendar month arithmetic on a (year, month) pair.
pub(crate) fn shift_months(year: i32, month: u32, delta: i32) -> (i32, u32) {
    let zero_based = year * 12 + month as i32 - 1 + delta;
    (zero_based.div_euclid(12), (zero_based.rem_euclid(12) + 1) as u32)
}

fn quarter_of(month: u32) -> u32 {
    (month - 1) / 3 + 1
}

/// Window of the period instance containing `anchor`.
///
/// Daily, monthly, quarterly and yearly windows align to calendar
/// boundaries; the weekly window is the rolling seven days ending at the
/// anchor instant.
pub fn window(period: Period, anchor: DateTime<Utc>) -> DateWindow {
    let date = anchor.date_naive();
    match period {
        Period::Daily => {
            let start = day_start(date);
            DateWindow {
                start,
                end: start + Duration::days(1),
            }
        }
        Period::Weekly => DateWindow {
            start: anchor - Duration::days(7),
            end: anchor,
        },
        Period::Monthly => {
            let (next_year, next_month) = shift_months(date.year(), date.month(), 1);
            DateWindow {
                start: day_start(month_start(date.year(), date.month())),
                end: day_start(month_start(next_year, next_month)),
            }
        }
        Period::Quarterly => {
            let first_month = (quarter_of(date.month()) - 1) * 3 + 1;
            let (next_year, next_month) = shift_months(date.year(), first_month, 3);
            DateWindow {
                start: day_start(month_start(date.year(), first_month)),
                end: day_start(month_start(next_year, next_month)),
            }
        }
        Period::Yearly => DateWindow {
            start: day_start(month_start(date.year(), 1)),
            end: day_start(month_start(date.year() + 1, 1)),
        },
    }
}

/// Sub-bucket key for a timestamp: day, month, quarter or year shaped.
/// Weekly views chart as daily points, so they share the day key.
pub fn bucket_key(period: Period, instant: DateTime<Utc>) -> String {
    match period {
        Period::Daily | Period::Weekly => instant.format("%Y-%m-%d").to_string(),
        Period::Monthly => instant.format("%Y-%m").to_string(),
        Period::Quarterly => format!("{}-Q{}", instant.year(), quarter_of(instant.month())),
        Period::Yearly => instant.year().to_string(),
    }
}
