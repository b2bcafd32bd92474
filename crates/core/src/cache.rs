//! Process-local cache of domain collections.
//!
//! Collections keep remote ordering (creation time descending) and support
//! the operations the sync engine needs for optimistic apply and rollback:
//! positional remove/re-insert, snapshot/restore, and in-place id swap.
//! Only the mutation coordinator and the invalidator write to them.

use std::sync::{Arc, RwLock};

use crate::ids::{EntityId, NaturalKey};
use crate::records::Record;

/// Ordered collection of one entity kind.
#[derive(Debug, Clone)]
pub struct Collection<R: Record> {
    items: Vec<R>,
}

impl<R: Record> Default for Collection<R> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<R: Record> Collection<R> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &R> {
        self.items.iter()
    }

    pub fn get(&self, id: &EntityId) -> Option<&R> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn position(&self, id: &EntityId) -> Option<usize> {
        self.items.iter().position(|item| item.id() == id)
    }

    /// Newest-first insert for freshly created entities.
    pub fn insert_front(&mut self, item: R) {
        self.items.insert(0, item);
    }

    /// Re-insert at a remembered position (delete rollback).
    pub fn insert_at(&mut self, index: usize, item: R) {
        let index = index.min(self.items.len());
        self.items.insert(index, item);
    }

    /// Remove by id, returning the removed entity and its position.
    pub fn remove(&mut self, id: &EntityId) -> Option<(usize, R)> {
        let index = self.position(id)?;
        Some((index, self.items.remove(index)))
    }

    /// Replace the entry with the same id, keeping its position.
    pub fn replace(&mut self, item: R) -> bool {
        match self.position(item.id()) {
            Some(index) => {
                self.items[index] = item;
                true
            }
            None => false,
        }
    }

    /// Swap a temporary id for its canonical one, in place.
    ///
    /// The entity keeps its position so it never flickers out of the
    /// UI-facing collection, and at no point do two entries for the same
    /// record coexist.
    pub fn swap_id(&mut self, old: &EntityId, new: EntityId) -> bool {
        match self.position(old) {
            Some(index) => {
                self.items[index].set_id(new);
                true
            }
            None => false,
        }
    }

    /// Wholesale replacement from remote truth, creation time descending.
    pub fn replace_all(&mut self, mut items: Vec<R>) {
        items.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        self.items = items;
    }

    /// Canonical entity sharing the given natural key, if any.
    pub fn find_canonical_by_key(&self, key: &NaturalKey) -> Option<&R> {
        self.items.iter().find(|item| {
            item.id().is_canonical() && item.natural_key().as_ref() == Some(key)
        })
    }

    pub fn snapshot(&self) -> Vec<R> {
        self.items.clone()
    }

    pub fn restore(&mut self, snapshot: Vec<R>) {
        self.items = snapshot;
    }
}

/// Shared handle to one collection.
///
/// Lock scopes are closure-bounded and never held across an await.
pub struct CollectionHandle<R: Record> {
    inner: Arc<RwLock<Collection<R>>>,
}

impl<R: Record> Clone for CollectionHandle<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R: Record> Default for CollectionHandle<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Record> CollectionHandle<R> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(Collection::default())),
        }
    }

    pub fn read<T>(&self, f: impl FnOnce(&Collection<R>) -> T) -> T {
        let guard = self.inner.read().unwrap_or_else(|e| e.into_inner());
        f(&guard)
    }

    pub fn write<T>(&self, f: impl FnOnce(&mut Collection<R>) -> T) -> T {
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        f(&mut guard)
    }

    pub fn items(&self) -> Vec<R> {
        self.read(|c| c.snapshot())
    }
}
