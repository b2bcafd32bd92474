//! Zero-filled time-series bucketing for chart output.
//!
//! A series always covers the full extended range for its period type;
//! sub-buckets without events stay present with default values so charts
//! never silently omit empty periods.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, Duration, Utc};

use super::period::{bucket_key, day_start, shift_months, Period};

/// How many sub-buckets each period's chart covers.
const DAILY_BUCKETS: i64 = 7;
const MONTHLY_BUCKETS: i32 = 12;
const QUARTERLY_BUCKETS: i32 = 8;
const YEARLY_BUCKETS: i32 = 5;

/// One sub-bucket of an ordered series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesPoint<V> {
    pub key: String,
    pub value: V,
}

/// Ordered sub-bucket keys covering the extended range ending at `anchor`:
/// the last 7 days for daily/weekly, 12 months, 8 quarters, or 5 years.
pub fn bucket_keys(period: Period, anchor: DateTime<Utc>) -> Vec<String> {
    let date = anchor.date_naive();
    match period {
        Period::Daily | Period::Weekly => (0..DAILY_BUCKETS)
            .rev()
            .map(|back| bucket_key(period, day_start(date) - Duration::days(back)))
            .collect(),
        Period::Monthly => (0..MONTHLY_BUCKETS)
            .rev()
            .map(|back| {
                let (year, month) = shift_months(date.year(), date.month(), -back);
                format!("{:04}-{:02}", year, month)
            })
            .collect(),
        Period::Quarterly => (0..QUARTERLY_BUCKETS)
            .rev()
            .map(|back| {
                let quarter_month = (date.month0() / 3) * 3 + 1;
                let (year, month) = shift_months(date.year(), quarter_month, -back * 3);
                format!("{}-Q{}", year, (month - 1) / 3 + 1)
            })
            .collect(),
        Period::Yearly => (0..YEARLY_BUCKETS)
            .rev()
            .map(|back| (date.year() - back).to_string())
            .collect(),
    }
}

/// Fold events into the zero-filled series for `period` ending at `anchor`.
///
/// Events outside the extended range key to no bucket and are skipped.
pub fn bucket<E, V: Default>(
    events: &[E],
    period: Period,
    anchor: DateTime<Utc>,
    occurred_at: impl Fn(&E) -> DateTime<Utc>,
    mut fold: impl FnMut(&mut V, &E),
) -> Vec<SeriesPoint<V>> {
    let keys = bucket_keys(period, anchor);
    let index: HashMap<&str, usize> = keys
        .iter()
        .enumerate()
        .map(|(i, key)| (key.as_str(), i))
        .collect();

    let mut points: Vec<SeriesPoint<V>> = keys
        .iter()
        .map(|key| SeriesPoint {
            key: key.clone(),
            value: V::default(),
        })
        .collect();

    for event in events {
        let key = bucket_key(period, occurred_at(event));
        if let Some(&i) = index.get(key.as_str()) {
            fold(&mut points[i].value, event);
        }
    }

    points
}
