//! Finalizer/weak-handle facility modeling the host collector's
//! cooperation surface.
//!
//! Each tracked proxy has one entry: a weak handle to the proxy, an
//! optional *pinning* strong handle, and a finalizer. While an entry is
//! pinned the proxy survives collection regardless of host reachability;
//! unpinned entries whose proxy became unreachable are finalized by
//! [`collect`](ProxyHeap::collect), which the embedder runs at safe
//! points. Pinning is driven exclusively by native toggle notifications.
//!
//! Finalizers run strictly after the entry table borrow is released, so a
//! finalizer may re-enter the heap (wrapping further objects, removing
//! attached data) without observing a half-swept table.

use std::rc::{Rc, Weak};

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

/// Cleanup callback run exactly once when an entry is collected.
pub type Finalizer = Box<dyn FnOnce()>;

struct HeapEntry<T> {
    weak: Weak<T>,
    pinned: Option<Rc<T>>,
    finalizer: Option<Finalizer>,
}

/// Tracked proxy entries, keyed by proxy identifier.
pub struct ProxyHeap<T> {
    entries: Mutex<FxHashMap<u64, HeapEntry<T>>>,
}

impl<T> ProxyHeap<T> {
    /// Create an empty heap.
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(FxHashMap::default()),
        }
    }

    /// Track a proxy. `pinned` selects the initial reachability state;
    /// `finalizer` runs exactly once when the entry is collected.
    pub fn insert(&self, id: u64, proxy: &Rc<T>, pinned: bool, finalizer: Finalizer) {
        let entry = HeapEntry {
            weak: Rc::downgrade(proxy),
            pinned: pinned.then(|| Rc::clone(proxy)),
            finalizer: Some(finalizer),
        };
        self.entries.lock().insert(id, entry);
    }

    /// The live proxy for an id, if it has not been collected.
    pub fn get(&self, id: u64) -> Option<Rc<T>> {
        let entries = self.entries.lock();
        let entry = entries.get(&id)?;
        entry.weak.upgrade()
    }

    /// Whether an entry exists for the id (collected entries are gone).
    pub fn contains(&self, id: u64) -> bool {
        self.entries.lock().contains_key(&id)
    }

    /// Pin an entry: the proxy becomes strongly reachable and will not be
    /// collected. Returns false when the entry is gone or already dead.
    pub fn pin(&self, id: u64) -> bool {
        let mut entries = self.entries.lock();
        let Some(entry) = entries.get_mut(&id) else {
            return false;
        };
        match entry.weak.upgrade() {
            Some(strong) => {
                entry.pinned = Some(strong);
                true
            }
            None => false,
        }
    }

    /// Unpin an entry: the proxy becomes weakly reachable and collectible
    /// once the host drops its references.
    pub fn unpin(&self, id: u64) -> bool {
        let mut entries = self.entries.lock();
        match entries.get_mut(&id) {
            Some(entry) => {
                entry.pinned = None;
                true
            }
            None => false,
        }
    }

    /// Number of tracked entries.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether no entries are tracked.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Remove one entry immediately if its proxy is already dead,
    /// returning the finalizer for the caller to run. Used when a stale
    /// identity association is found before the sweeping pass reached it.
    pub fn take_dead(&self, id: u64) -> Option<Finalizer> {
        let mut entries = self.entries.lock();
        let entry = entries.get(&id)?;
        if entry.pinned.is_some() || entry.weak.upgrade().is_some() {
            return None;
        }
        entries.remove(&id).and_then(|mut e| e.finalizer.take())
    }

    /// Finalize every unpinned entry whose proxy is no longer reachable.
    /// Returns the number of entries collected. Finalizers run after the
    /// sweep, outside the table borrow.
    pub fn collect(&self) -> usize {
        let mut finalizers = Vec::new();
        {
            let mut entries = self.entries.lock();
            let dead: Vec<u64> = entries
                .iter()
                .filter(|(_, e)| e.pinned.is_none() && e.weak.upgrade().is_none())
                .map(|(id, _)| *id)
                .collect();
            for id in dead {
                if let Some(mut entry) = entries.remove(&id) {
                    if let Some(finalizer) = entry.finalizer.take() {
                        finalizers.push(finalizer);
                    }
                }
            }
        }
        let count = finalizers.len();
        for finalizer in finalizers {
            finalizer();
        }
        count
    }
}

impl<T> Default for ProxyHeap<T> {
    fn default() -> Self {
        Self::new()
    }
}
