//! Collaborator seams the core consumes but does not implement: the remote
//! row store, the change-notification channel, and the principal provider.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::errors::Result;
use crate::records::EntityKind;

/// Authenticated row store, scoped server-side to the owning principal.
///
/// Row payloads are structured records keyed by field name; the engine
/// converts them to typed rows immediately at this boundary. A secondary
/// implementation of the same trait (a different transport to the same
/// store) serves as the fallback commit path.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Fetch the principal's rows for a kind, creation time descending.
    async fn select(&self, kind: EntityKind, principal: &str) -> Result<Vec<serde_json::Value>>;

    /// Insert a row; the store assigns the canonical id and returns the
    /// stored row.
    async fn insert(&self, kind: EntityKind, row: serde_json::Value) -> Result<serde_json::Value>;

    /// Update the row with the given canonical id.
    async fn update(&self, kind: EntityKind, id: &str, row: serde_json::Value) -> Result<()>;

    /// Delete the row with the given canonical id.
    async fn delete(&self, kind: EntityKind, id: &str) -> Result<()>;
}

/// Opaque change trigger; the payload carries no diff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeNotice {
    pub kind: EntityKind,
}

/// Change-notification channel keyed by (kind, principal).
///
/// Emits a notice whenever a matching remote row changes. The core treats
/// every notice as a reload trigger, never as a patch.
pub trait ChangeFeed: Send + Sync {
    fn subscribe(&self, kind: EntityKind, principal: &str) -> mpsc::UnboundedReceiver<ChangeNotice>;
}

/// Session seam: the signed-in principal, if any.
pub trait PrincipalProvider: Send + Sync {
    fn current_principal_id(&self) -> Option<String>;
}
