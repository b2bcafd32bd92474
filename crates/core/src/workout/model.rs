//! Workout domain entities and their wire rows.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::ids::{EntityId, NaturalKey};
use crate::records::{EntityKind, Record};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgramFocus {
    Strength,
    Cardio,
    Mobility,
    Mixed,
}

impl ProgramFocus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Strength => "strength",
            Self::Cardio => "cardio",
            Self::Mobility => "mobility",
            Self::Mixed => "mixed",
        }
    }
}

/// A training program sessions are logged against.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub id: EntityId,
    pub name: String,
    pub focus: ProgramFocus,
    pub days_per_week: u8,
    pub created_at: DateTime<Utc>,
}

impl Program {
    pub fn new(name: impl Into<String>, focus: ProgramFocus, days_per_week: u8) -> Self {
        Self {
            id: EntityId::mint_temp(),
            name: name.into(),
            focus,
            days_per_week,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramRow {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub user_id: String,
    pub name: String,
    pub focus: ProgramFocus,
    pub days_per_week: u8,
    pub created_at: DateTime<Utc>,
}

impl Record for Program {
    type Row = ProgramRow;

    const KIND: EntityKind = EntityKind::Program;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn natural_key(&self) -> Option<NaturalKey> {
        Some(NaturalKey::new(&self.name, self.focus.as_str()))
    }

    fn to_row(&self, principal: &str) -> ProgramRow {
        ProgramRow {
            id: self.id.is_canonical().then(|| self.id.as_str().to_string()),
            user_id: principal.to_string(),
            name: self.name.clone(),
            focus: self.focus,
            days_per_week: self.days_per_week,
            created_at: self.created_at,
        }
    }

    fn from_row(row: ProgramRow) -> Result<Self> {
        Ok(Self {
            id: row.id.map(EntityId::parse).unwrap_or_else(EntityId::mint_temp),
            name: row.name,
            focus: row.focus,
            days_per_week: row.days_per_week,
            created_at: row.created_at,
        })
    }
}

/// One completed workout. The raw event behind streaks and volume charts.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkoutSession {
    pub id: EntityId,
    pub program_id: EntityId,
    pub performed_at: DateTime<Utc>,
    pub duration_minutes: u32,
    pub total_volume: Decimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutSessionRow {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub user_id: String,
    pub program_id: String,
    pub performed_at: DateTime<Utc>,
    pub duration_minutes: u32,
    pub total_volume: Decimal,
    pub created_at: DateTime<Utc>,
}

impl Record for WorkoutSession {
    type Row = WorkoutSessionRow;

    const KIND: EntityKind = EntityKind::WorkoutSession;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn to_row(&self, principal: &str) -> WorkoutSessionRow {
        WorkoutSessionRow {
            id: self.id.is_canonical().then(|| self.id.as_str().to_string()),
            user_id: principal.to_string(),
            program_id: self.program_id.as_str().to_string(),
            performed_at: self.performed_at,
            duration_minutes: self.duration_minutes,
            total_volume: self.total_volume,
            created_at: self.created_at,
        }
    }

    fn from_row(row: WorkoutSessionRow) -> Result<Self> {
        Ok(Self {
            id: row.id.map(EntityId::parse).unwrap_or_else(EntityId::mint_temp),
            program_id: EntityId::parse(row.program_id),
            performed_at: row.performed_at,
            duration_minutes: row.duration_minutes,
            total_volume: row.total_volume,
            created_at: row.created_at,
        })
    }
}
