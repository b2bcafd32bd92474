//! One-time import of durable-mirror-only records into the remote store.
//!
//! Runs at session start, ahead of normal mutation traffic. Idempotent by
//! the remote-count guard: when the remote store already has rows for the
//! kind, the runner no-ops.

use std::sync::Arc;

use log::{info, warn};

use crate::cache::CollectionHandle;
use crate::errors::Result;
use crate::ids::EntityId;
use crate::mirror::{self, DurableMirror, ANON_SCOPE};
use crate::records::Record;
use crate::store::{PrincipalProvider, RemoteStore};

/// What the runner did, for logging and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationOutcome {
    /// No signed-in principal; migration only runs for authenticated users.
    SkippedUnauthenticated,
    /// The remote store already has rows for this kind.
    RemoteAlreadyPopulated,
    /// Neither the principal scope nor the anonymous scope held records.
    NothingToImport,
    /// Imported this many mirror records as canonical rows.
    Imported(usize),
}

pub struct MigrationRunner<R: Record> {
    cache: CollectionHandle<R>,
    store: Arc<dyn RemoteStore>,
    principal: Arc<dyn PrincipalProvider>,
    mirror: Arc<dyn DurableMirror>,
}

impl<R: Record> MigrationRunner<R> {
    pub fn new(
        cache: CollectionHandle<R>,
        store: Arc<dyn RemoteStore>,
        principal: Arc<dyn PrincipalProvider>,
        mirror: Arc<dyn DurableMirror>,
    ) -> Self {
        Self {
            cache,
            store,
            principal,
            mirror,
        }
    }

    /// Import mirror-only records when the remote store is empty, then
    /// clear the mirror copy and reload the cache from remote truth.
    ///
    /// Mirror records are bulk-created as canonical rows directly; they
    /// skip the temporary-identity stage entirely. A failed insert aborts
    /// the run without clearing the mirror, so nothing is lost.
    pub async fn run(&self) -> Result<MigrationOutcome> {
        let Some(principal) = self.principal.current_principal_id() else {
            return Ok(MigrationOutcome::SkippedUnauthenticated);
        };

        let existing = self.store.select(R::KIND, &principal).await?;
        if !existing.is_empty() {
            return Ok(MigrationOutcome::RemoteAlreadyPopulated);
        }

        // Principal scope first, then records written before sign-in.
        let mut scope = principal.clone();
        let mut records = mirror::load_collection::<R>(self.mirror.as_ref(), &scope)?;
        if records.is_empty() {
            scope = ANON_SCOPE.to_string();
            records = mirror::load_collection::<R>(self.mirror.as_ref(), &scope)?;
        }
        if records.is_empty() {
            return Ok(MigrationOutcome::NothingToImport);
        }

        let mut imported = 0usize;
        for record in &records {
            // Re-minting drops any stale id so the store assigns a fresh
            // canonical one on insert.
            let mut fresh = record.clone();
            fresh.set_id(EntityId::mint_temp());
            let row = serde_json::to_value(fresh.to_row(&principal))?;
            self.store.insert(R::KIND, row).await?;
            imported += 1;
        }

        if let Err(err) = mirror::clear_collection(self.mirror.as_ref(), &scope, R::KIND.collection()) {
            warn!(
                "imported {} {} rows but failed to clear mirror scope '{}': {}",
                imported,
                R::KIND,
                scope,
                err
            );
        }

        // Hydrate the cache with the canonical rows just created.
        let rows = self.store.select(R::KIND, &principal).await?;
        let items = rows
            .into_iter()
            .map(|value| {
                let row: R::Row = serde_json::from_value(value)?;
                R::from_row(row)
            })
            .collect::<Result<Vec<R>>>()?;
        self.cache.write(|c| {
            c.replace_all(items);
            mirror::persist_collection(self.mirror.as_ref(), &principal, c);
        });

        info!("migrated {} {} rows from the durable mirror", imported, R::KIND);
        Ok(MigrationOutcome::Imported(imported))
    }

    /// Offline bootstrap: hydrate the cache from the anonymous mirror scope
    /// when no principal is signed in. The mirror is never authoritative
    /// once a remote connection exists.
    pub fn bootstrap_offline(&self) -> Result<usize> {
        let scope = match self.principal.current_principal_id() {
            Some(principal) => principal,
            None => ANON_SCOPE.to_string(),
        };
        let records = mirror::load_collection::<R>(self.mirror.as_ref(), &scope)?;
        let count = records.len();
        self.cache.write(|c| c.replace_all(records));
        Ok(count)
    }
}
