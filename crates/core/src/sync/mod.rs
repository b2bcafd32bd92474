//! Optimistic mutation and synchronization engine.
//!
//! The write path of the core: optimistic apply against the local cache,
//! primary + fallback remote commit, temp → canonical identity
//! reconciliation, rollback on total failure, and reload-based eventual
//! consistency. Domain modules supply only their entity mapping; the
//! machinery here is shared across every kind.

mod coordinator;
mod invalidator;
mod migration;
mod resolver;

pub use coordinator::{MutationCoordinator, SyncConfig, DEFAULT_FALLBACK_TIMEOUT};
pub use invalidator::{ReloadTrigger, Reloader, SubscriptionHandle, SyncInvalidator};
pub use migration::{MigrationOutcome, MigrationRunner};
pub use resolver::IdentityResolver;

use std::sync::Arc;

use crate::cache::CollectionHandle;
use crate::mirror::DurableMirror;
use crate::records::Record;
use crate::store::{ChangeFeed, PrincipalProvider, RemoteStore};

/// Shared collaborator set, constructor-injected so tests can substitute
/// fakes for every seam.
#[derive(Clone)]
pub struct RemoteContext {
    pub primary: Arc<dyn RemoteStore>,
    pub fallback: Arc<dyn RemoteStore>,
    pub principal: Arc<dyn PrincipalProvider>,
    pub mirror: Arc<dyn DurableMirror>,
}

/// Per-kind assembly of the sync machinery over one shared cache.
pub struct EntityEngine<R: Record> {
    cache: CollectionHandle<R>,
    coordinator: MutationCoordinator<R>,
    resolver: IdentityResolver<R>,
    invalidator: SyncInvalidator<R>,
    migration: MigrationRunner<R>,
}

impl<R: Record> EntityEngine<R> {
    pub fn new(context: &RemoteContext, config: SyncConfig) -> Self {
        let cache = CollectionHandle::new();
        let trigger = ReloadTrigger::new();

        let reloader = Arc::new(Reloader::new(
            cache.clone(),
            Arc::clone(&context.primary),
            Arc::clone(&context.principal),
            Arc::clone(&context.mirror),
        ));

        let coordinator = MutationCoordinator::new(
            cache.clone(),
            Arc::clone(&context.primary),
            Arc::clone(&context.fallback),
            Arc::clone(&context.principal),
            Arc::clone(&context.mirror),
            trigger.clone(),
            config,
        );

        let resolver = IdentityResolver::new(
            cache.clone(),
            Arc::clone(&context.primary),
            Arc::clone(&context.principal),
        );

        let invalidator = SyncInvalidator::new(reloader, trigger);

        let migration = MigrationRunner::new(
            cache.clone(),
            Arc::clone(&context.primary),
            Arc::clone(&context.principal),
            Arc::clone(&context.mirror),
        );

        Self {
            cache,
            coordinator,
            resolver,
            invalidator,
            migration,
        }
    }

    pub fn cache(&self) -> &CollectionHandle<R> {
        &self.cache
    }

    pub fn coordinator(&self) -> &MutationCoordinator<R> {
        &self.coordinator
    }

    pub fn resolver(&self) -> &IdentityResolver<R> {
        &self.resolver
    }

    pub fn invalidator(&self) -> &SyncInvalidator<R> {
        &self.invalidator
    }

    pub fn migration(&self) -> &MigrationRunner<R> {
        &self.migration
    }

    /// Subscribe this kind's invalidation stream for the signed-in
    /// principal. Returns `None` when signed out (mutations are rejected
    /// then anyway; the mirror covers reads).
    pub fn subscribe(
        &self,
        feed: &dyn ChangeFeed,
        principal: &dyn PrincipalProvider,
    ) -> Option<SubscriptionHandle> {
        let id = principal.current_principal_id()?;
        Some(self.invalidator.subscribe(feed, &id))
    }
}
