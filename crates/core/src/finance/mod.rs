//! Personal finance: accounts, transactions, budgets, savings goals.

mod metrics;
mod model;
mod service;

pub use metrics::{
    budget_spent, cash_flow_series, category_breakdown, savings_progress, total_balance,
    window_totals, CashFlow, SavingsProgress,
};
pub use model::{
    Account, AccountKind, AccountRow, Budget, BudgetRow, FlowDirection, SavingsGoal,
    SavingsGoalRow, Transaction, TransactionRow,
};
pub use service::FinanceDomain;
