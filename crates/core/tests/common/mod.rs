//! In-memory fakes for every collaborator seam.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, Semaphore};

use daybook_core::errors::{CoreError, Result};
use daybook_core::mirror::DurableMirror;
use daybook_core::records::EntityKind;
use daybook_core::store::{ChangeFeed, ChangeNotice, PrincipalProvider, RemoteStore};

/// How a faked store operation should fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailKind {
    Unreachable,
    Rejected,
}

impl FailKind {
    fn to_error(self) -> CoreError {
        match self {
            Self::Unreachable => CoreError::remote_unreachable("simulated network failure"),
            Self::Rejected => CoreError::remote_rejected("simulated policy rejection"),
        }
    }
}

type RowMap = HashMap<EntityKind, Vec<serde_json::Value>>;

struct SharedRows {
    rows: Mutex<RowMap>,
    next_id: AtomicU64,
}

/// In-memory row store. `pair()` returns two transports over the same
/// rows, standing in for the primary and fallback paths.
pub struct MemoryRowStore {
    shared: Arc<SharedRows>,
    fail: Mutex<Option<FailKind>>,
    pub insert_calls: AtomicUsize,
    pub update_calls: AtomicUsize,
    pub delete_calls: AtomicUsize,
    pub selects_started: AtomicUsize,
    pub selects_finished: AtomicUsize,
    select_gate: Option<Semaphore>,
}

impl MemoryRowStore {
    fn over(shared: Arc<SharedRows>, gated: bool) -> Self {
        Self {
            shared,
            fail: Mutex::new(None),
            insert_calls: AtomicUsize::new(0),
            update_calls: AtomicUsize::new(0),
            delete_calls: AtomicUsize::new(0),
            selects_started: AtomicUsize::new(0),
            selects_finished: AtomicUsize::new(0),
            select_gate: gated.then(|| Semaphore::new(0)),
        }
    }

    pub fn new() -> Arc<Self> {
        Arc::new(Self::over(
            Arc::new(SharedRows {
                rows: Mutex::new(HashMap::new()),
                next_id: AtomicU64::new(1),
            }),
            false,
        ))
    }

    /// Two transports over one row set.
    pub fn pair() -> (Arc<Self>, Arc<Self>) {
        let shared = Arc::new(SharedRows {
            rows: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        });
        (
            Arc::new(Self::over(Arc::clone(&shared), false)),
            Arc::new(Self::over(shared, false)),
        )
    }

    /// A gated primary whose `select` blocks until permits are released.
    pub fn gated() -> Arc<Self> {
        Arc::new(Self::over(
            Arc::new(SharedRows {
                rows: Mutex::new(HashMap::new()),
                next_id: AtomicU64::new(1),
            }),
            true,
        ))
    }

    pub fn set_fail(&self, kind: Option<FailKind>) {
        *self.fail.lock().unwrap() = kind;
    }

    pub fn release_selects(&self, permits: usize) {
        if let Some(gate) = &self.select_gate {
            gate.add_permits(permits);
        }
    }

    pub fn row_count(&self, kind: EntityKind) -> usize {
        self.shared
            .rows
            .lock()
            .unwrap()
            .get(&kind)
            .map(|rows| rows.len())
            .unwrap_or(0)
    }

    pub fn seed_row(&self, kind: EntityKind, row: serde_json::Value) {
        self.shared
            .rows
            .lock()
            .unwrap()
            .entry(kind)
            .or_default()
            .push(row);
    }

    fn check_fail(&self) -> Result<()> {
        match *self.fail.lock().unwrap() {
            Some(kind) => Err(kind.to_error()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl RemoteStore for MemoryRowStore {
    async fn select(&self, kind: EntityKind, principal: &str) -> Result<Vec<serde_json::Value>> {
        self.selects_started.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.select_gate {
            let permit = gate.acquire().await.expect("select gate closed");
            permit.forget();
        }
        self.check_fail()?;
        let rows = self
            .shared
            .rows
            .lock()
            .unwrap()
            .get(&kind)
            .map(|rows| {
                rows.iter()
                    .filter(|row| row.get("userId").and_then(|v| v.as_str()) == Some(principal))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        self.selects_finished.fetch_add(1, Ordering::SeqCst);
        Ok(rows)
    }

    async fn insert(&self, kind: EntityKind, row: serde_json::Value) -> Result<serde_json::Value> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);
        self.check_fail()?;
        let mut row = row;
        let object = row
            .as_object_mut()
            .ok_or_else(|| CoreError::remote_rejected("row must be an object"))?;
        if !object.contains_key("id") {
            let id = self.shared.next_id.fetch_add(1, Ordering::SeqCst);
            object.insert("id".to_string(), serde_json::json!(format!("row-{}", id)));
        }
        self.shared
            .rows
            .lock()
            .unwrap()
            .entry(kind)
            .or_default()
            .push(row.clone());
        Ok(row)
    }

    async fn update(&self, kind: EntityKind, id: &str, row: serde_json::Value) -> Result<()> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        self.check_fail()?;
        let mut rows = self.shared.rows.lock().unwrap();
        let stored = rows
            .entry(kind)
            .or_default()
            .iter_mut()
            .find(|stored| stored.get("id").and_then(|v| v.as_str()) == Some(id));
        match stored {
            Some(stored) => {
                let mut row = row;
                if let Some(object) = row.as_object_mut() {
                    object.insert("id".to_string(), serde_json::json!(id));
                }
                *stored = row;
                Ok(())
            }
            None => Err(CoreError::remote_rejected("row not found")),
        }
    }

    async fn delete(&self, kind: EntityKind, id: &str) -> Result<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        self.check_fail()?;
        self.shared
            .rows
            .lock()
            .unwrap()
            .entry(kind)
            .or_default()
            .retain(|row| row.get("id").and_then(|v| v.as_str()) != Some(id));
        Ok(())
    }
}

/// In-memory durable mirror.
#[derive(Default)]
pub struct MemoryMirror {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryMirror {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.lock().unwrap().contains_key(key)
    }

    pub fn put(&self, key: &str, value: &str) {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
    }
}

impl DurableMirror for MemoryMirror {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }
}

/// Switchable principal provider.
pub struct FakePrincipal {
    id: Mutex<Option<String>>,
}

impl FakePrincipal {
    pub fn signed_in(id: &str) -> Arc<Self> {
        Arc::new(Self {
            id: Mutex::new(Some(id.to_string())),
        })
    }

    pub fn signed_out() -> Arc<Self> {
        Arc::new(Self {
            id: Mutex::new(None),
        })
    }

    pub fn sign_in(&self, id: &str) {
        *self.id.lock().unwrap() = Some(id.to_string());
    }
}

impl PrincipalProvider for FakePrincipal {
    fn current_principal_id(&self) -> Option<String> {
        self.id.lock().unwrap().clone()
    }
}

/// In-memory change feed with manual emission.
#[derive(Default)]
pub struct MemoryFeed {
    subscribers: Mutex<HashMap<(EntityKind, String), Vec<mpsc::UnboundedSender<ChangeNotice>>>>,
}

impl MemoryFeed {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn emit(&self, kind: EntityKind, principal: &str) {
        let subscribers = self.subscribers.lock().unwrap();
        if let Some(senders) = subscribers.get(&(kind, principal.to_string())) {
            for sender in senders {
                let _ = sender.send(ChangeNotice { kind });
            }
        }
    }
}

impl ChangeFeed for MemoryFeed {
    fn subscribe(&self, kind: EntityKind, principal: &str) -> mpsc::UnboundedReceiver<ChangeNotice> {
        let (sender, receiver) = mpsc::unbounded_channel();
        self.subscribers
            .lock()
            .unwrap()
            .entry((kind, principal.to_string()))
            .or_default()
            .push(sender);
        receiver
    }
}

/// Poll until `check` passes or the deadline expires.
pub async fn wait_until(check: impl Fn() -> bool) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while !check() {
        if tokio::time::Instant::now() > deadline {
            panic!("condition not reached within deadline");
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
