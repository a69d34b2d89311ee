//! Selection registry: which functions are currently selected for instrumentation.
//!
//! The registry is owned by the orchestrator and shared (by reference or `Arc`)
//! with the selection path and the sampling engine. It only keeps weak links, so a
//! function dropped on module unload can never be reached through it; such
//! entries read as not selected and are pruned on the next write.

use ahash::AHashMap as HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};
use tracing::debug;

use crate::function::Function;

#[derive(Default)]
pub struct SelectionRegistry {
    entries: RwLock<HashMap<u64, Weak<Function>>>,
}

impl SelectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Maps `address` to `function`, replacing any previous mapping.
    /// Returns the function that was replaced, if it was still alive.
    pub fn insert(&self, address: u64, function: &Arc<Function>) -> Option<Arc<Function>> {
        let mut entries = self.write();
        prune_dead(&mut entries);
        entries
            .insert(address, Arc::downgrade(function))
            .and_then(|previous| previous.upgrade())
            .filter(|previous| !Arc::ptr_eq(previous, function))
    }

    /// Removes the mapping at `address`. Removing an absent address is a no-op.
    pub fn remove(&self, address: u64) -> Option<Arc<Function>> {
        self.write().remove(&address).and_then(|w| w.upgrade())
    }

    /// True if a live function is mapped at `address`.
    pub fn contains(&self, address: u64) -> bool {
        self.read()
            .get(&address)
            .is_some_and(|w| w.strong_count() > 0)
    }

    /// The function mapped at `address`, for callers that need identity checks.
    pub fn get(&self, address: u64) -> Option<Arc<Function>> {
        self.read().get(&address).and_then(|w| w.upgrade())
    }

    /// Unselects every function of an unloading module.
    pub fn remove_functions<'a, I>(&self, functions: I) -> usize
    where
        I: IntoIterator<Item = &'a Arc<Function>>,
    {
        let mut entries = self.write();
        let mut removed = 0;
        for function in functions {
            let address = function.virtual_address();
            let owned = entries
                .get(&address)
                .is_some_and(|w| std::ptr::eq(w.as_ptr(), Arc::as_ptr(function)));
            if owned {
                entries.remove(&address);
                removed += 1;
            }
        }
        prune_dead(&mut entries);
        debug!("Removed {} functions from selection", removed);
        removed
    }

    /// Live selected functions ordered by virtual address.
    pub fn selected_functions(&self) -> Vec<Arc<Function>> {
        let entries = self.read();
        let mut selected: Vec<(u64, Arc<Function>)> = entries
            .iter()
            .filter_map(|(address, w)| w.upgrade().map(|f| (*address, f)))
            .collect();
        selected.sort_by_key(|(address, _)| *address);
        selected.into_iter().map(|(_, f)| f).collect()
    }

    /// Live selected addresses in ascending order.
    pub fn selected_addresses(&self) -> Vec<u64> {
        let entries = self.read();
        let mut addresses: Vec<u64> = entries
            .iter()
            .filter(|(_, w)| w.strong_count() > 0)
            .map(|(address, _)| *address)
            .collect();
        addresses.sort_unstable();
        addresses
    }

    pub fn len(&self) -> usize {
        self.read().values().filter(|w| w.strong_count() > 0).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.write().clear();
    }

    /// Drops entries whose function no longer exists. Returns how many were dropped.
    pub fn prune(&self) -> usize {
        prune_dead(&mut self.write())
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<u64, Weak<Function>>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<u64, Weak<Function>>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for SelectionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectionRegistry")
            .field("selected", &self.selected_addresses())
            .finish()
    }
}

fn prune_dead(entries: &mut HashMap<u64, Weak<Function>>) -> usize {
    let before = entries.len();
    entries.retain(|_, w| w.strong_count() > 0);
    before - entries.len()
}
