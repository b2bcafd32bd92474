//! Planner domain wiring over the sync engine.

use chrono::{DateTime, Utc};

use crate::errors::{CoreError, Result};
use crate::ids::EntityId;
use crate::records::Record;
use crate::sync::{EntityEngine, RemoteContext, SyncConfig};

use super::model::Task;

pub struct PlannerDomain {
    pub tasks: EntityEngine<Task>,
}

impl PlannerDomain {
    pub fn new(context: &RemoteContext, config: SyncConfig) -> Self {
        Self {
            tasks: EntityEngine::new(context, config),
        }
    }

    /// Mark a task done, optimistically and remotely.
    pub async fn complete_task(&self, id: &EntityId, at: DateTime<Utc>) -> Result<Task> {
        let mut task = self
            .tasks
            .cache()
            .read(|c| c.get(id).cloned())
            .ok_or_else(|| CoreError::reference_not_found(Task::KIND, id.as_str()))?;
        task.complete(at);
        self.tasks.coordinator().update(task).await
    }
}
