//! Planner domain entities and their wire rows.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::ids::EntityId;
use crate::records::{EntityKind, Record};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Done,
}

/// A planned task. Completions are the raw events behind streaks and the
/// completion-rate metric.
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    pub id: EntityId,
    pub title: String,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    pub due_on: NaiveDate,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Task {
    pub fn new(title: impl Into<String>, priority: TaskPriority, due_on: NaiveDate) -> Self {
        Self {
            id: EntityId::mint_temp(),
            title: title.into(),
            priority,
            status: TaskStatus::Todo,
            due_on,
            completed_at: None,
            created_at: Utc::now(),
        }
    }

    pub fn complete(&mut self, at: DateTime<Utc>) {
        self.status = TaskStatus::Done;
        self.completed_at = Some(at);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRow {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub user_id: String,
    pub title: String,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    pub due_on: NaiveDate,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Record for Task {
    type Row = TaskRow;

    const KIND: EntityKind = EntityKind::Task;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn to_row(&self, principal: &str) -> TaskRow {
        TaskRow {
            id: self.id.is_canonical().then(|| self.id.as_str().to_string()),
            user_id: principal.to_string(),
            title: self.title.clone(),
            priority: self.priority,
            status: self.status,
            due_on: self.due_on,
            completed_at: self.completed_at,
            created_at: self.created_at,
        }
    }

    fn from_row(row: TaskRow) -> Result<Self> {
        Ok(Self {
            id: row.id.map(EntityId::parse).unwrap_or_else(EntityId::mint_temp),
            title: row.title,
            priority: row.priority,
            status: row.status,
            due_on: row.due_on,
            completed_at: row.completed_at,
            created_at: row.created_at,
        })
    }
}
