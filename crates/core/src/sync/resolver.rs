//! Identity resolution for cross-entity references.
//!
//! A referencing entity must carry a canonical reference before its own
//! write goes remote. The resolver turns a local reference into a canonical
//! id: pass-through when already canonical, natural-key reuse when a
//! canonical twin exists, remote create otherwise.

use std::sync::Arc;

use log::debug;

use crate::cache::CollectionHandle;
use crate::errors::{CoreError, Result};
use crate::ids::EntityId;
use crate::records::Record;
use crate::store::{PrincipalProvider, RemoteStore};

pub struct IdentityResolver<R: Record> {
    cache: CollectionHandle<R>,
    store: Arc<dyn RemoteStore>,
    principal: Arc<dyn PrincipalProvider>,
}

impl<R: Record> IdentityResolver<R> {
    pub fn new(
        cache: CollectionHandle<R>,
        store: Arc<dyn RemoteStore>,
        principal: Arc<dyn PrincipalProvider>,
    ) -> Self {
        Self {
            cache,
            store,
            principal,
        }
    }

    /// Canonical twin of a still-temporary entity, by natural key.
    ///
    /// Case-insensitive name + kind match against already-canonical
    /// entities; `None` when the entity has no key or no twin exists.
    pub fn deduplicate(&self, entity: &R) -> Option<EntityId> {
        let key = entity.natural_key()?;
        self.cache
            .read(|c| c.find_canonical_by_key(&key).map(|twin| twin.id().clone()))
    }

    /// Resolve a local reference to a canonical id.
    ///
    /// Fails with `ReferenceNotFound` when the referenced entity no longer
    /// exists locally — the dependent write must abort rather than silently
    /// substitute a different entity.
    pub async fn resolve_reference(&self, id: &EntityId) -> Result<EntityId> {
        if id.is_canonical() {
            return Ok(id.clone());
        }

        let entity = self
            .cache
            .read(|c| c.get(id).cloned())
            .ok_or_else(|| CoreError::reference_not_found(R::KIND, id.as_str()))?;

        // Reuse an existing canonical row before creating a remote twin.
        // The temporary entry is dropped rather than re-identified: the
        // canonical twin already represents it, and two cache entries must
        // never share an id.
        if let Some(canonical) = self.deduplicate(&entity) {
            debug!(
                "reference {} '{}' resolved to canonical twin '{}'",
                R::KIND,
                id,
                canonical
            );
            self.cache.write(|c| c.remove(id));
            return Ok(canonical);
        }

        let principal = self
            .principal
            .current_principal_id()
            .ok_or(CoreError::NotAuthenticated)?;

        let row = serde_json::to_value(entity.to_row(&principal))?;
        let stored = self.store.insert(R::KIND, row).await?;
        let stored_row: R::Row = serde_json::from_value(stored)?;
        let canonical = R::from_row(stored_row)?.id().clone();
        if !canonical.is_canonical() {
            return Err(CoreError::remote_rejected(
                "store returned a row without a canonical id",
            ));
        }

        self.cache.write(|c| c.swap_id(id, canonical.clone()));
        debug!(
            "reference {} '{}' promoted to canonical '{}'",
            R::KIND,
            id,
            canonical
        );
        Ok(canonical)
    }
}
