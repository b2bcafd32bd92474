//! Finance domain wiring over the sync engine.

use crate::errors::{CoreError, Result};
use crate::ids::EntityId;
use crate::mirror;
use crate::records::Record;
use crate::sync::{EntityEngine, RemoteContext, SyncConfig};

use super::model::{Account, Budget, SavingsGoal, Transaction};

/// Per-kind engines for the finance collections plus the transaction flow
/// that couples two of them.
pub struct FinanceDomain {
    pub accounts: EntityEngine<Account>,
    pub transactions: EntityEngine<Transaction>,
    pub budgets: EntityEngine<Budget>,
    pub goals: EntityEngine<SavingsGoal>,
    context: RemoteContext,
}

impl FinanceDomain {
    pub fn new(context: &RemoteContext, config: SyncConfig) -> Self {
        Self {
            accounts: EntityEngine::new(context, config.clone()),
            transactions: EntityEngine::new(context, config.clone()),
            budgets: EntityEngine::new(context, config.clone()),
            goals: EntityEngine::new(context, config),
            context: context.clone(),
        }
    }

    /// Record a transaction with its account-balance companion mutation.
    ///
    /// The account reference is resolved to a canonical id before the write
    /// goes remote (reusing a same-named canonical account rather than
    /// creating a twin). The balance adjustment is applied in the same
    /// optimistic step as the transaction and rolled back with it when
    /// every remote attempt fails.
    pub async fn record_transaction(&self, mut transaction: Transaction) -> Result<Transaction> {
        let account_id = self
            .accounts
            .resolver()
            .resolve_reference(&transaction.account_id)
            .await?;
        transaction.account_id = account_id.clone();

        let accounts_before = self.accounts.cache().read(|c| c.snapshot());
        self.adjust_balance(&account_id, transaction.signed_amount());

        match self.transactions.coordinator().create(transaction).await {
            Ok(stored) => Ok(stored),
            Err(err) => {
                self.accounts.cache().write(|c| c.restore(accounts_before));
                self.persist_accounts();
                Err(err)
            }
        }
    }

    /// Delete a transaction, reversing its balance impact in the same
    /// optimistic step. Both revert together when the remote delete fails.
    pub async fn remove_transaction(&self, id: &EntityId) -> Result<()> {
        let transaction = self
            .transactions
            .cache()
            .read(|c| c.get(id).cloned())
            .ok_or_else(|| CoreError::reference_not_found(Transaction::KIND, id.as_str()))?;

        let accounts_before = self.accounts.cache().read(|c| c.snapshot());
        self.adjust_balance(&transaction.account_id, -transaction.signed_amount());

        match self.transactions.coordinator().delete(id).await {
            Ok(()) => Ok(()),
            Err(err) => {
                self.accounts.cache().write(|c| c.restore(accounts_before));
                self.persist_accounts();
                Err(err)
            }
        }
    }

    fn adjust_balance(&self, account_id: &EntityId, delta: rust_decimal::Decimal) {
        self.accounts.cache().write(|c| {
            if let Some(account) = c.get(account_id).cloned() {
                let mut adjusted = account;
                adjusted.balance += delta;
                c.replace(adjusted);
            }
        });
        self.persist_accounts();
    }

    fn persist_accounts(&self) {
        if let Some(principal) = self.context.principal.current_principal_id() {
            self.accounts
                .cache()
                .read(|c| mirror::persist_collection(self.context.mirror.as_ref(), &principal, c));
        }
    }
}
