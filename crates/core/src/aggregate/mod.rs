//! Period-aggregation engine.
//!
//! The read path of the core: derived metrics are recomputed from the raw
//! event log against a requested time window, never trusted from stored
//! counters. Domain modules build their budget/goal/streak/chart values on
//! these primitives.

mod period;
mod series;
mod streak;
mod summary;

pub use period::{bucket_key, window, DateWindow, Period};
pub use series::{bucket, bucket_keys, SeriesPoint};
pub use streak::{streaks, Streaks};
pub use summary::{summarize, Contribution, Totals};
