//! Reload scheduling from remote change notifications.
//!
//! Notifications are opaque triggers. They are coalesced through a
//! [`ReloadTrigger`]: any number of notices arriving while a reload is in
//! flight collapse into exactly one subsequent reload.

use std::sync::Arc;

use log::{debug, warn};
use tokio::sync::Notify;
use tokio::task::JoinHandle;

use crate::cache::CollectionHandle;
use crate::errors::{CoreError, Result};
use crate::mirror::{self, DurableMirror};
use crate::records::Record;
use crate::store::{ChangeFeed, PrincipalProvider, RemoteStore};

/// Coalescing reload request handle.
///
/// Built on [`Notify`] permit semantics: requests made while no reload is
/// waiting store a single permit, so a burst of notifications yields one
/// reload after the in-flight one completes.
#[derive(Clone, Default)]
pub struct ReloadTrigger {
    notify: Arc<Notify>,
}

impl ReloadTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.notify.notify_one();
    }

    pub(crate) async fn wait(&self) {
        self.notify.notified().await;
    }
}

/// Full reload of one collection from remote truth.
pub struct Reloader<R: Record> {
    cache: CollectionHandle<R>,
    store: Arc<dyn RemoteStore>,
    principal: Arc<dyn PrincipalProvider>,
    mirror: Arc<dyn DurableMirror>,
}

impl<R: Record> Reloader<R> {
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

    /// Fetch the principal's rows and replace the cache collection
    /// wholesale. Intentionally not a merge: convergence to remote truth
    /// beats preserving mid-flight optimistic entries, which the mutation
    /// coordinator re-applies on its own.
    pub async fn reload(&self) -> Result<usize> {
        let principal = self
            .principal
            .current_principal_id()
            .ok_or(CoreError::NotAuthenticated)?;

        let rows = self.store.select(R::KIND, &principal).await?;
        let items = rows
            .into_iter()
            .map(|value| {
                let row: R::Row = serde_json::from_value(value)?;
                R::from_row(row)
            })
            .collect::<Result<Vec<R>>>()?;

        let count = items.len();
        self.cache.write(|c| {
            c.replace_all(items);
            mirror::persist_collection(self.mirror.as_ref(), &principal, c);
        });
        Ok(count)
    }
}

/// Subscription lifetime for one (kind, principal) invalidation stream.
///
/// Dropping the handle tears the subscription down, bounding resource
/// usage to the views that are still active.
pub struct SubscriptionHandle {
    tasks: Vec<JoinHandle<()>>,
}

impl SubscriptionHandle {
    pub fn shutdown(mut self) {
        self.abort_all();
    }

    fn abort_all(&mut self) {
        for task in self.tasks.drain(..) {
            task.abort();
        }
    }
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        self.abort_all();
    }
}

/// Debounced reload scheduling for one entity kind.
pub struct SyncInvalidator<R: Record> {
    reloader: Arc<Reloader<R>>,
    trigger: ReloadTrigger,
}

impl<R: Record> SyncInvalidator<R> {
    pub fn new(reloader: Arc<Reloader<R>>, trigger: ReloadTrigger) -> Self {
        Self { reloader, trigger }
    }

    pub fn trigger(&self) -> ReloadTrigger {
        self.trigger.clone()
    }

    /// Reload immediately, outside the coalesced stream (initial hydration).
    pub async fn reload_now(&self) -> Result<usize> {
        self.reloader.reload().await
    }

    /// Subscribe to the change feed for the current principal and spawn the
    /// coalesced reload worker.
    pub fn subscribe(&self, feed: &dyn ChangeFeed, principal: &str) -> SubscriptionHandle {
        let mut notices = feed.subscribe(R::KIND, principal);
        let trigger = self.trigger.clone();
        let forward = tokio::spawn(async move {
            while notices.recv().await.is_some() {
                trigger.request();
            }
        });

        let reloader = Arc::clone(&self.reloader);
        let trigger = self.trigger.clone();
        let worker = tokio::spawn(async move {
            loop {
                trigger.wait().await;
                match reloader.reload().await {
                    Ok(count) => debug!("reloaded {} rows of {}", count, R::KIND),
                    Err(err) => warn!("reload of {} failed: {}", R::KIND, err),
                }
            }
        });

        SubscriptionHandle {
            tasks: vec![forward, worker],
        }
    }
}
