//! Temporary, decodable resources.
//!
//! Before a vector document can be decoded it is registered here and
//! addressed by id, much like an object URL. The returned
//! [`ResourceHandle`] revokes the entry when dropped, so every exit path of
//! an export releases what it registered.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::debug;

#[derive(Debug, Default)]
struct Inner {
    next_id: AtomicU64,
    entries: Mutex<HashMap<u64, Arc<[u8]>>>,
}

/// Shared table of live resources. Cloning shares the table.
#[derive(Debug, Clone, Default)]
pub struct ResourceRegistry {
    inner: Arc<Inner>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<u64, Arc<[u8]>>> {
        // A panic while holding the lock leaves the map itself intact.
        self.inner
            .entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Registers `data` and returns the handle that owns it.
    pub fn register(&self, data: impl Into<Arc<[u8]>>) -> ResourceHandle {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let data = data.into();
        debug!(id, bytes = data.len(), "registered resource");
        self.entries().insert(id, data);
        ResourceHandle {
            id,
            registry: self.clone(),
        }
    }

    /// Returns the bytes behind `id` if it is still registered.
    pub fn fetch(&self, id: u64) -> Option<Arc<[u8]>> {
        self.entries().get(&id).cloned()
    }

    /// Releases `id`. Returns false if it was already gone.
    pub fn revoke(&self, id: u64) -> bool {
        let removed = self.entries().remove(&id).is_some();
        if removed {
            debug!(id, "released resource");
        }
        removed
    }

    /// Number of resources currently registered.
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Owning reference to one registered resource.
#[derive(Debug)]
pub struct ResourceHandle {
    id: u64,
    registry: ResourceRegistry,
}

impl ResourceHandle {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// The registered bytes, or `None` if the resource was revoked early.
    pub fn data(&self) -> Option<Arc<[u8]>> {
        self.registry.fetch(self.id)
    }
}

impl Drop for ResourceHandle {
    fn drop(&mut self) {
        self.registry.revoke(self.id);
    }
}
