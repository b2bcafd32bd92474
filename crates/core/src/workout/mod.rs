//! Workout tracking: programs and logged sessions.

mod metrics;
mod model;
mod service;

pub use metrics::{session_days, session_streaks, volume_in_window, weekly_session_series};
pub use model::{Program, ProgramFocus, ProgramRow, WorkoutSession, WorkoutSessionRow};
pub use service::WorkoutDomain;
