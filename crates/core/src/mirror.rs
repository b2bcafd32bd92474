//! Durable local mirror for offline continuity and one-time migration.
//!
//! The mirror is a host-provided key-value store (per principal, or an
//! anonymous scope when signed out). It is written after every cache change
//! and read at startup, but is never authoritative once a remote store
//! connection exists.

use log::warn;

use crate::cache::Collection;
use crate::errors::{CoreError, Result};
use crate::records::Record;

/// Scope used for mirror keys when no principal is signed in.
pub const ANON_SCOPE: &str = "anon";

/// Restart-surviving key-value store provided by the host.
pub trait DurableMirror: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// Mirror key for one collection under one principal scope.
pub fn collection_key(scope: &str, collection: &str) -> String {
    format!("{}/{}", scope, collection)
}

/// Best-effort snapshot of a collection into the mirror.
///
/// Mirror failures are logged, not surfaced: the cache already holds the
/// state and the remote store remains the source of truth.
pub fn persist_collection<R: Record>(mirror: &dyn DurableMirror, scope: &str, collection: &Collection<R>) {
    let rows: Vec<R::Row> = collection.iter().map(|item| item.to_row(scope)).collect();
    let payload = match serde_json::to_string(&rows) {
        Ok(payload) => payload,
        Err(err) => {
            warn!("failed to serialize {} mirror snapshot: {}", R::KIND, err);
            return;
        }
    };
    let key = collection_key(scope, R::KIND.collection());
    if let Err(err) = mirror.set(&key, &payload) {
        warn!("failed to write mirror key '{}': {}", key, err);
    }
}

/// Load a collection snapshot from the mirror, empty when absent.
pub fn load_collection<R: Record>(mirror: &dyn DurableMirror, scope: &str) -> Result<Vec<R>> {
    let key = collection_key(scope, R::KIND.collection());
    let Some(raw) = mirror.get(&key)? else {
        return Ok(Vec::new());
    };
    let rows: Vec<R::Row> =
        serde_json::from_str(&raw).map_err(|err| CoreError::mirror(err.to_string()))?;
    rows.into_iter().map(R::from_row).collect()
}

/// Drop a collection's mirror copy (after migration has imported it).
pub fn clear_collection(mirror: &dyn DurableMirror, scope: &str, collection: &str) -> Result<()> {
    mirror.remove(&collection_key(scope, collection))
}
