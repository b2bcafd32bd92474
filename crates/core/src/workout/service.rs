//! Workout domain wiring over the sync engine.

use crate::errors::Result;
use crate::sync::{EntityEngine, RemoteContext, SyncConfig};

use super::model::{Program, WorkoutSession};

pub struct WorkoutDomain {
    pub programs: EntityEngine<Program>,
    pub sessions: EntityEngine<WorkoutSession>,
}

impl WorkoutDomain {
    pub fn new(context: &RemoteContext, config: SyncConfig) -> Self {
        Self {
            programs: EntityEngine::new(context, config.clone()),
            sessions: EntityEngine::new(context, config),
        }
    }

    /// Log a session. The program reference is resolved to a canonical id
    /// first so the session row never points at a temporary program.
    pub async fn log_session(&self, mut session: WorkoutSession) -> Result<WorkoutSession> {
        let program_id = self
            .programs
            .resolver()
            .resolve_reference(&session.program_id)
            .await?;
        session.program_id = program_id;
        self.sessions.coordinator().create(session).await
    }
}
