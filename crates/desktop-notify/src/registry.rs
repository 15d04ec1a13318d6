//! Identifier registry: which live notification owns a daemon-assigned id.
//!
//! Daemon signals carry nothing but the numeric identifier, so this map is
//! the only way back to the owning object. Entries are non-owning (`Weak`);
//! one mutex guards the whole map and is shared by every notification of a
//! [`crate::Notifier`]. Never make IPC calls while holding it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

/// Map from daemon identifier to the notification that owns it.
pub struct Registry<T> {
    entries: Mutex<HashMap<u32, Weak<T>>>,
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }
}

impl<T> Registry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the registry lock for a compound operation.
    ///
    /// A panic while holding the lock cannot leave the map half-updated, so
    /// a poisoned lock is recovered rather than propagated.
    pub fn lock(&self) -> RegistryGuard<'_, T> {
        RegistryGuard {
            entries: self.entries.lock().unwrap_or_else(PoisonError::into_inner),
        }
    }

    /// Insert or overwrite the owner of `id`.
    pub fn register(&self, id: u32, owner: &Arc<T>) {
        self.lock().register(id, owner);
    }

    /// Current owner of `id`, if it is still alive.
    pub fn lookup(&self, id: u32) -> Option<Arc<T>> {
        self.lock().lookup(id)
    }

    /// Deregister `id`; no-op if absent.
    pub fn remove(&self, id: u32) {
        self.lock().remove(id);
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, id: u32) -> bool {
        self.lookup(id).is_some()
    }
}

/// Exclusive access to the registry for the lifetime of the guard.
pub struct RegistryGuard<'a, T> {
    entries: MutexGuard<'a, HashMap<u32, Weak<T>>>,
}

impl<T> RegistryGuard<'_, T> {
    pub fn register(&mut self, id: u32, owner: &Arc<T>) {
        let weak = Arc::downgrade(owner);
        if let Some(previous) = self.entries.insert(id, weak) {
            let same = previous
                .upgrade()
                .is_some_and(|previous| Arc::ptr_eq(&previous, owner));
            if !same && previous.strong_count() > 0 {
                tracing::warn!(id, "Identifier re-registered to a different notification");
            }
        }
    }

    /// Current owner of `id`. Entries whose owner was dropped are pruned.
    pub fn lookup(&mut self, id: u32) -> Option<Arc<T>> {
        let owner = self.entries.get(&id)?.upgrade();
        if owner.is_none() {
            tracing::trace!(id, "Pruning registry entry of dropped notification");
            self.entries.remove(&id);
        }
        owner
    }

    /// Look up and deregister `id` in one step.
    pub fn take(&mut self, id: u32) -> Option<Arc<T>> {
        self.entries.remove(&id)?.upgrade()
    }

    pub fn remove(&mut self, id: u32) {
        self.entries.remove(&id);
    }

    /// Deregister `id` only if `owner` is the one registered under it.
    pub fn remove_if_owned(&mut self, id: u32, owner: &T) {
        let owned = self
            .entries
            .get(&id)
            .is_some_and(|weak| std::ptr::eq(weak.as_ptr(), owner));
        if owned {
            self.entries.remove(&id);
        }
    }
}
