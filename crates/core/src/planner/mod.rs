//! Task planning: tasks, completions, streaks.

mod metrics;
mod model;
mod service;

pub use metrics::{completion_days, completion_rate, completion_streaks, daily_completion_series};
pub use model::{Task, TaskPriority, TaskRow, TaskStatus};
pub use service::PlannerDomain;
