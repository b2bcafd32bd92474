//! Entity kinds and the per-entity record contract used by the sync engine.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::ids::{EntityId, NaturalKey};

/// Domain collections that participate in sync.
///
/// The snake_case serde names double as remote collection names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Account,
    Transaction,
    Budget,
    SavingsGoal,
    Program,
    WorkoutSession,
    Task,
}

impl EntityKind {
    /// Remote collection name for this kind.
    pub fn collection(&self) -> &'static str {
        match self {
            Self::Account => "accounts",
            Self::Transaction => "transactions",
            Self::Budget => "budgets",
            Self::SavingsGoal => "savings_goals",
            Self::Program => "programs",
            Self::WorkoutSession => "workout_sessions",
            Self::Task => "tasks",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Account => "account",
            Self::Transaction => "transaction",
            Self::Budget => "budget",
            Self::SavingsGoal => "savings_goal",
            Self::Program => "program",
            Self::WorkoutSession => "workout_session",
            Self::Task => "task",
        };
        f.write_str(name)
    }
}

/// Per-entity contract the sync engine is generic over.
///
/// `Row` is the typed wire shape for this kind; untyped JSON payloads from
/// the remote store are converted at the boundary and never propagate past
/// it. `to_row` attaches the owning principal; rows for temporary entities
/// carry no id so the store assigns one on insert.
pub trait Record: Clone + Send + Sync + 'static {
    type Row: Serialize + DeserializeOwned + Send + 'static;

    const KIND: EntityKind;

    fn id(&self) -> &EntityId;

    fn set_id(&mut self, id: EntityId);

    fn created_at(&self) -> DateTime<Utc>;

    /// Deduplication key, for kinds where the user perceives equal-named
    /// entities as the same record.
    fn natural_key(&self) -> Option<NaturalKey> {
        None
    }

    fn to_row(&self, principal: &str) -> Self::Row;

    fn from_row(row: Self::Row) -> Result<Self>;
}
