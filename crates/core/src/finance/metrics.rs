//! Derived finance metrics, recomputed from the transaction log on demand.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::aggregate::{
    bucket, summarize, window, Contribution, DateWindow, Period, SeriesPoint, Totals,
};
use crate::ids::EntityId;

use super::model::{Account, Budget, FlowDirection, SavingsGoal, Transaction};

fn classify(transaction: &Transaction) -> Contribution {
    match transaction.direction {
        FlowDirection::Income => Contribution::Inflow(transaction.amount),
        FlowDirection::Expense => Contribution::Outflow(transaction.amount),
    }
}

/// Amount spent against a budget within the period window containing
/// `anchor`: expenses in the budget's category, case-insensitive.
pub fn budget_spent(budget: &Budget, transactions: &[Transaction], anchor: DateTime<Utc>) -> Decimal {
    let w = window(budget.period, anchor);
    summarize(
        transactions,
        |t| {
            t.direction == FlowDirection::Expense
                && t.category.eq_ignore_ascii_case(&budget.category)
                && w.contains(t.occurred_at)
        },
        classify,
    )
    .outflow
}

/// Totals over a window, optionally filtered to one account.
pub fn window_totals(
    transactions: &[Transaction],
    w: DateWindow,
    account: Option<&EntityId>,
) -> Totals {
    summarize(
        transactions,
        |t| w.contains(t.occurred_at) && account.map_or(true, |id| &t.account_id == id),
        classify,
    )
}

/// Income and expense per sub-bucket for a cash-flow chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CashFlow {
    pub income: Decimal,
    pub expense: Decimal,
}

impl CashFlow {
    pub fn net(&self) -> Decimal {
        self.income - self.expense
    }
}

/// Zero-filled cash-flow series for the extended chart range.
pub fn cash_flow_series(
    transactions: &[Transaction],
    period: Period,
    anchor: DateTime<Utc>,
    account: Option<&EntityId>,
) -> Vec<SeriesPoint<CashFlow>> {
    let filtered: Vec<&Transaction> = transactions
        .iter()
        .filter(|t| account.map_or(true, |id| &t.account_id == id))
        .collect();
    bucket(
        &filtered,
        period,
        anchor,
        |t| t.occurred_at,
        |flow: &mut CashFlow, t| match t.direction {
            FlowDirection::Income => flow.income += t.amount,
            FlowDirection::Expense => flow.expense += t.amount,
        },
    )
}

/// Expense totals per category within a window, largest first.
pub fn category_breakdown(transactions: &[Transaction], w: DateWindow) -> Vec<(String, Decimal)> {
    let mut by_category: HashMap<String, Decimal> = HashMap::new();
    for t in transactions {
        if t.direction == FlowDirection::Expense && w.contains(t.occurred_at) {
            *by_category.entry(t.category.clone()).or_default() += t.amount;
        }
    }
    let mut breakdown: Vec<(String, Decimal)> = by_category.into_iter().collect();
    breakdown.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    breakdown
}

/// Sum of balances across accounts.
pub fn total_balance(accounts: &[Account]) -> Decimal {
    accounts.iter().map(|a| a.balance).sum()
}

/// Progress toward a savings goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SavingsProgress {
    pub current: Decimal,
    pub percent: Decimal,
}

/// Current amount and percent toward the goal's target, derived from
/// income transactions in the goal's contribution category over all time.
pub fn savings_progress(goal: &SavingsGoal, transactions: &[Transaction]) -> SavingsProgress {
    let current = summarize(
        transactions,
        |t| {
            t.direction == FlowDirection::Income
                && t.category.eq_ignore_ascii_case(&goal.contribution_category)
        },
        classify,
    )
    .inflow;

    let percent = if goal.target_amount.is_zero() {
        Decimal::ZERO
    } else {
        (current / goal.target_amount * Decimal::ONE_HUNDRED).min(Decimal::ONE_HUNDRED)
    };

    SavingsProgress { current, percent }
}
