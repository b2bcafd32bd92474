//! Optimistic mutation coordination.
//!
//! Every mutation follows the same shape: apply to the local cache first
//! (optimistic visibility), then commit remotely through the primary path,
//! falling back to the secondary transport under a bounded timeout when the
//! primary fails for a retryable reason. On total failure the optimistic
//! apply is rolled back and a single `PartialFailure` surfaces; remote
//! errors never bubble up with the cache left mid-mutation.

use std::sync::Arc;
use std::time::Duration;

use log::warn;
use tokio::time::timeout;

use crate::cache::CollectionHandle;
use crate::errors::{CoreError, MutationOp, Result};
use crate::ids::EntityId;
use crate::mirror::{self, DurableMirror};
use crate::records::Record;
use crate::store::{PrincipalProvider, RemoteStore};
use crate::sync::invalidator::ReloadTrigger;

/// Timeout applied to the fallback commit attempt.
pub const DEFAULT_FALLBACK_TIMEOUT: Duration = Duration::from_secs(12);

/// Tunables for the commit pipeline.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub fallback_timeout: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            fallback_timeout: DEFAULT_FALLBACK_TIMEOUT,
        }
    }
}

/// Executes create/update/delete against one collection.
pub struct MutationCoordinator<R: Record> {
    cache: CollectionHandle<R>,
    primary: Arc<dyn RemoteStore>,
    fallback: Arc<dyn RemoteStore>,
    principal: Arc<dyn PrincipalProvider>,
    mirror: Arc<dyn DurableMirror>,
    reload: ReloadTrigger,
    config: SyncConfig,
}

impl<R: Record> MutationCoordinator<R> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        cache: CollectionHandle<R>,
        primary: Arc<dyn RemoteStore>,
        fallback: Arc<dyn RemoteStore>,
        principal: Arc<dyn PrincipalProvider>,
        mirror: Arc<dyn DurableMirror>,
        reload: ReloadTrigger,
        config: SyncConfig,
    ) -> Self {
        Self {
            cache,
            primary,
            fallback,
            principal,
            mirror,
            reload,
            config,
        }
    }

    pub fn cache(&self) -> &CollectionHandle<R> {
        &self.cache
    }

    /// Create an entity: optimistic insert, remote commit, temp → canonical
    /// swap in place. Total failure removes the optimistic entity again.
    pub async fn create(&self, entity: R) -> Result<R> {
        let principal = self.require_principal()?;
        let temp_id = entity.id().clone();

        self.cache.write(|c| c.insert_front(entity.clone()));
        self.persist_mirror(&principal);

        match self.insert_remote(&entity, &principal).await {
            Ok(canonical_id) => {
                self.cache.write(|c| c.swap_id(&temp_id, canonical_id.clone()));
                self.persist_mirror(&principal);
                self.reload.request();
                let mut stored = entity;
                stored.set_id(canonical_id);
                Ok(stored)
            }
            Err(cause) => {
                self.cache.write(|c| c.remove(&temp_id));
                self.persist_mirror(&principal);
                Err(self.partial_failure(MutationOp::Create, cause))
            }
        }
    }

    /// Update an entity: the new field values become visible immediately,
    /// the remote row is updated by canonical id. An entity that is still
    /// temporary has no remote row yet and falls through to the create
    /// path with the merged fields. Total failure restores the pre-update
    /// snapshot.
    pub async fn update(&self, entity: R) -> Result<R> {
        let principal = self.require_principal()?;
        let id = entity.id().clone();

        let previous = self
            .cache
            .read(|c| c.get(&id).cloned())
            .ok_or_else(|| CoreError::reference_not_found(R::KIND, id.as_str()))?;

        self.cache.write(|c| c.replace(entity.clone()));
        self.persist_mirror(&principal);

        let outcome = if id.is_temp() {
            self.insert_remote(&entity, &principal).await.map(Some)
        } else {
            match serde_json::to_value(entity.to_row(&principal)) {
                Ok(row) => self.update_remote(id.as_str(), row).await.map(|_| None),
                Err(err) => Err(err.into()),
            }
        };

        match outcome {
            Ok(Some(canonical_id)) => {
                self.cache.write(|c| c.swap_id(&id, canonical_id.clone()));
                self.persist_mirror(&principal);
                self.reload.request();
                let mut stored = entity;
                stored.set_id(canonical_id);
                Ok(stored)
            }
            Ok(None) => {
                self.persist_mirror(&principal);
                self.reload.request();
                Ok(entity)
            }
            Err(cause) => {
                self.cache.write(|c| c.replace(previous));
                self.persist_mirror(&principal);
                Err(self.partial_failure(MutationOp::Update, cause))
            }
        }
    }

    /// Delete an entity: removed from the cache immediately. A temporary
    /// entity was never persisted, so removal is final with no remote call
    /// and no rollback path. A canonical delete that fails remotely
    /// re-inserts the entity at its original position.
    pub async fn delete(&self, id: &EntityId) -> Result<()> {
        let principal = self.require_principal()?;

        let (index, removed) = self
            .cache
            .write(|c| c.remove(id))
            .ok_or_else(|| CoreError::reference_not_found(R::KIND, id.as_str()))?;
        self.persist_mirror(&principal);

        if id.is_temp() {
            return Ok(());
        }

        match self.delete_remote(id.as_str()).await {
            Ok(()) => {
                self.reload.request();
                Ok(())
            }
            Err(cause) => {
                self.cache.write(|c| c.insert_at(index, removed));
                self.persist_mirror(&principal);
                Err(self.partial_failure(MutationOp::Delete, cause))
            }
        }
    }

    fn require_principal(&self) -> Result<String> {
        self.principal
            .current_principal_id()
            .ok_or(CoreError::NotAuthenticated)
    }

    fn persist_mirror(&self, principal: &str) {
        self.cache
            .read(|c| mirror::persist_collection(self.mirror.as_ref(), principal, c));
    }

    fn partial_failure(&self, operation: MutationOp, cause: CoreError) -> CoreError {
        CoreError::PartialFailure {
            operation,
            kind: R::KIND,
            cause: cause.to_string(),
        }
    }

    async fn insert_remote(&self, entity: &R, principal: &str) -> Result<EntityId> {
        let row = serde_json::to_value(entity.to_row(principal))?;
        let stored = match self.primary.insert(R::KIND, row.clone()).await {
            Ok(stored) => stored,
            Err(err) if err.retryable() => {
                warn!(
                    "primary insert of {} failed, falling back: {}",
                    R::KIND,
                    err
                );
                self.fallback_insert(row).await?
            }
            Err(err) => return Err(err),
        };
        Self::canonical_id_from(stored)
    }

    async fn fallback_insert(&self, row: serde_json::Value) -> Result<serde_json::Value> {
        match timeout(
            self.config.fallback_timeout,
            self.fallback.insert(R::KIND, row),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(CoreError::remote_unreachable(
                "fallback insert timed out",
            )),
        }
    }

    async fn update_remote(&self, id: &str, row: serde_json::Value) -> Result<()> {
        match self.primary.update(R::KIND, id, row.clone()).await {
            Ok(()) => Ok(()),
            Err(err) if err.retryable() => {
                warn!(
                    "primary update of {} '{}' failed, falling back: {}",
                    R::KIND,
                    id,
                    err
                );
                match timeout(
                    self.config.fallback_timeout,
                    self.fallback.update(R::KIND, id, row),
                )
                .await
                {
                    Ok(result) => result,
                    Err(_) => Err(CoreError::remote_unreachable("fallback update timed out")),
                }
            }
            Err(err) => Err(err),
        }
    }

    async fn delete_remote(&self, id: &str) -> Result<()> {
        match self.primary.delete(R::KIND, id).await {
            Ok(()) => Ok(()),
            Err(err) if err.retryable() => {
                warn!(
                    "primary delete of {} '{}' failed, falling back: {}",
                    R::KIND,
                    id,
                    err
                );
                match timeout(
                    self.config.fallback_timeout,
                    self.fallback.delete(R::KIND, id),
                )
                .await
                {
                    Ok(result) => result,
                    Err(_) => Err(CoreError::remote_unreachable("fallback delete timed out")),
                }
            }
            Err(err) => Err(err),
        }
    }

    fn canonical_id_from(stored: serde_json::Value) -> Result<EntityId> {
        let row: R::Row = serde_json::from_value(stored)?;
        let entity = R::from_row(row)?;
        let id = entity.id().clone();
        if id.is_canonical() {
            Ok(id)
        } else {
            Err(CoreError::remote_rejected(
                "store returned a row without a canonical id",
            ))
        }
    }
}
