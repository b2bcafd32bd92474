//! Finance domain entities and their wire rows.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::aggregate::Period;
use crate::errors::Result;
use crate::ids::{EntityId, NaturalKey};
use crate::records::{EntityKind, Record};

/// Account kinds offered by the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountKind {
    Cash,
    Card,
    Bank,
    Crypto,
    Investment,
}

impl AccountKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::Card => "card",
            Self::Bank => "bank",
            Self::Crypto => "crypto",
            Self::Investment => "investment",
        }
    }
}

/// A money account. Balance is adjusted alongside its transactions and
/// refreshed from remote truth on reload.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub id: EntityId,
    pub name: String,
    pub kind: AccountKind,
    pub currency: String,
    pub balance: Decimal,
    pub color: String,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
}

impl Account {
    pub fn new(name: impl Into<String>, kind: AccountKind, currency: impl Into<String>) -> Self {
        Self {
            id: EntityId::mint_temp(),
            name: name.into(),
            kind,
            currency: currency.into(),
            balance: Decimal::ZERO,
            color: "#10B981".to_string(),
            is_default: false,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountRow {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub user_id: String,
    pub name: String,
    pub kind: AccountKind,
    pub currency: String,
    pub balance: Decimal,
    pub color: String,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
}

impl Record for Account {
    type Row = AccountRow;

    const KIND: EntityKind = EntityKind::Account;

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
        Some(NaturalKey::new(&self.name, self.kind.as_str()))
    }

    fn to_row(&self, principal: &str) -> AccountRow {
        AccountRow {
            id: self.id.is_canonical().then(|| self.id.as_str().to_string()),
            user_id: principal.to_string(),
            name: self.name.clone(),
            kind: self.kind,
            currency: self.currency.clone(),
            balance: self.balance,
            color: self.color.clone(),
            is_default: self.is_default,
            created_at: self.created_at,
        }
    }

    fn from_row(row: AccountRow) -> Result<Self> {
        Ok(Self {
            id: row.id.map(EntityId::parse).unwrap_or_else(EntityId::mint_temp),
            name: row.name,
            kind: row.kind,
            currency: row.currency,
            balance: row.balance,
            color: row.color,
            is_default: row.is_default,
            created_at: row.created_at,
        })
    }
}

/// Direction of a cash movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowDirection {
    Income,
    Expense,
}

/// A single cash movement against an account. The raw event the finance
/// aggregations are computed from.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub id: EntityId,
    pub account_id: EntityId,
    pub direction: FlowDirection,
    pub amount: Decimal,
    pub currency: String,
    pub category: String,
    pub description: String,
    pub occurred_at: DateTime<Utc>,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// Balance impact: income adds, expense subtracts.
    pub fn signed_amount(&self) -> Decimal {
        match self.direction {
            FlowDirection::Income => self.amount,
            FlowDirection::Expense => -self.amount,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRow {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub user_id: String,
    pub account_id: String,
    pub direction: FlowDirection,
    pub amount: Decimal,
    pub currency: String,
    pub category: String,
    pub description: String,
    pub occurred_at: DateTime<Utc>,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl Record for Transaction {
    type Row = TransactionRow;

    const KIND: EntityKind = EntityKind::Transaction;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn to_row(&self, principal: &str) -> TransactionRow {
        TransactionRow {
            id: self.id.is_canonical().then(|| self.id.as_str().to_string()),
            user_id: principal.to_string(),
            account_id: self.account_id.as_str().to_string(),
            direction: self.direction,
            amount: self.amount,
            currency: self.currency.clone(),
            category: self.category.clone(),
            description: self.description.clone(),
            occurred_at: self.occurred_at,
            tags: self.tags.clone(),
            created_at: self.created_at,
        }
    }

    fn from_row(row: TransactionRow) -> Result<Self> {
        Ok(Self {
            id: row.id.map(EntityId::parse).unwrap_or_else(EntityId::mint_temp),
            account_id: EntityId::parse(row.account_id),
            direction: row.direction,
            amount: row.amount,
            currency: row.currency,
            category: row.category,
            description: row.description,
            occurred_at: row.occurred_at,
            tags: row.tags,
            created_at: row.created_at,
        })
    }
}

/// A spending cap for one category over a recurring period. The `spent`
/// side is derived, never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct Budget {
    pub id: EntityId,
    pub category: String,
    pub limit: Decimal,
    pub period: Period,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetRow {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub user_id: String,
    pub category: String,
    pub limit: Decimal,
    pub period: Period,
    pub created_at: DateTime<Utc>,
}

impl Record for Budget {
    type Row = BudgetRow;

    const KIND: EntityKind = EntityKind::Budget;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn to_row(&self, principal: &str) -> BudgetRow {
        BudgetRow {
            id: self.id.is_canonical().then(|| self.id.as_str().to_string()),
            user_id: principal.to_string(),
            category: self.category.clone(),
            limit: self.limit,
            period: self.period,
            created_at: self.created_at,
        }
    }

    fn from_row(row: BudgetRow) -> Result<Self> {
        Ok(Self {
            id: row.id.map(EntityId::parse).unwrap_or_else(EntityId::mint_temp),
            category: row.category,
            limit: row.limit,
            period: row.period,
            created_at: row.created_at,
        })
    }
}

/// A savings target fed by income transactions in its contribution
/// category. `current_amount` is derived from the transaction log.
#[derive(Debug, Clone, PartialEq)]
pub struct SavingsGoal {
    pub id: EntityId,
    pub name: String,
    pub target_amount: Decimal,
    pub contribution_category: String,
    pub deadline: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavingsGoalRow {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub user_id: String,
    pub name: String,
    pub target_amount: Decimal,
    pub contribution_category: String,
    pub deadline: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl Record for SavingsGoal {
    type Row = SavingsGoalRow;

    const KIND: EntityKind = EntityKind::SavingsGoal;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn to_row(&self, principal: &str) -> SavingsGoalRow {
        SavingsGoalRow {
            id: self.id.is_canonical().then(|| self.id.as_str().to_string()),
            user_id: principal.to_string(),
            name: self.name.clone(),
            target_amount: self.target_amount,
            contribution_category: self.contribution_category.clone(),
            deadline: self.deadline,
            created_at: self.created_at,
        }
    }

    fn from_row(row: SavingsGoalRow) -> Result<Self> {
        Ok(Self {
            id: row.id.map(EntityId::parse).unwrap_or_else(EntityId::mint_temp),
            name: row.name,
            target_amount: row.target_amount,
            contribution_category: row.contribution_category,
            deadline: row.deadline,
            created_at: row.created_at,
        })
    }
}
