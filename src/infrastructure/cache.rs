//! Identity-keyed cache of root hashes.
//!
//! Entries are keyed by the address of the root's allocation and hold a
//! `Weak` handle to it. The weak handle never keeps the tree alive, but it
//! does keep the allocation reserved, so the address cannot be handed to a
//! different tree while the entry exists. Entries whose root has been dropped
//! are purged periodically.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

use dashmap::DashMap;
use tracing::{debug, trace};

use crate::domain::expr::{Expr, ExprRef};

/// Default number of inserts between automatic purges.
pub const DEFAULT_PURGE_THRESHOLD: usize = 4096;

#[derive(Debug)]
struct CachedHash {
    root: Weak<Expr>,
    hash: u32,
}

/// Thread-safe cache mapping root identity to its hash code.
#[derive(Debug)]
pub struct IdentityCache {
    entries: DashMap<usize, CachedHash>,
    enabled: AtomicBool,
    purge_threshold: usize,
    inserts_since_purge: AtomicUsize,
}

impl IdentityCache {
    pub fn new(enabled: bool, purge_threshold: usize) -> Self {
        Self {
            entries: DashMap::new(),
            enabled: AtomicBool::new(enabled),
            purge_threshold: purge_threshold.max(1),
            inserts_since_purge: AtomicUsize::new(0),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    /// Turn caching on or off. Disabling drops every entry.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Release);
        if !enabled {
            self.clear();
        }
    }

    /// Cached hash of `root`, if caching is on and `root` was hashed before.
    pub fn get(&self, root: &ExprRef) -> Option<u32> {
        if !self.is_enabled() {
            return None;
        }
        let entry = self.entries.get(&key_of(root))?;
        // the weak handle pins the allocation, so a live root at this address is the cached one
        debug_assert!(std::ptr::eq(entry.root.as_ptr(), Arc::as_ptr(root)));
        trace!(hash = entry.hash, "identity cache hit");
        Some(entry.hash)
    }

    pub fn insert(&self, root: &ExprRef, hash: u32) {
        if !self.is_enabled() {
            return;
        }
        self.entries.insert(
            key_of(root),
            CachedHash {
                root: Arc::downgrade(root),
                hash,
            },
        );
        let inserts = self.inserts_since_purge.fetch_add(1, Ordering::AcqRel) + 1;
        if inserts >= self.purge_threshold {
            self.inserts_since_purge.store(0, Ordering::Release);
            self.purge();
        }
    }

    /// Remove entries whose root is no longer alive. Returns how many were removed.
    pub fn purge(&self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.root.strong_count() > 0);
        let removed = before.saturating_sub(self.entries.len());
        debug!(removed, remaining = self.entries.len(), "purged identity cache");
        removed
    }

    pub fn clear(&self) {
        self.entries.clear();
        self.inserts_since_purge.store(0, Ordering::Release);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for IdentityCache {
    fn default() -> Self {
        Self::new(true, DEFAULT_PURGE_THRESHOLD)
    }
}

fn key_of(root: &ExprRef) -> usize {
    Arc::as_ptr(root) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::symbol::Sym;

    fn leaf(v: i32) -> ExprRef {
        Expr::constant(v, Sym::named("System.Int32"))
    }

    #[test]
    fn test_get_after_insert() {
        let cache = IdentityCache::default();
        let root = leaf(1);
        assert_eq!(cache.get(&root), None);
        cache.insert(&root, 42);
        assert_eq!(cache.get(&root), Some(42));
        // structurally equal but a different allocation
        assert_eq!(cache.get(&leaf(1)), None);
    }

    #[test]
    fn test_entries_do_not_keep_roots_alive() {
        let cache = IdentityCache::default();
        let root = leaf(7);
        let weak = Arc::downgrade(&root);
        cache.insert(&root, 1);
        drop(root);
        assert!(weak.upgrade().is_none());
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.purge(), 1);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_automatic_purge_at_threshold() {
        let cache = IdentityCache::new(true, 4);
        let survivor = leaf(0);
        cache.insert(&survivor, 0);
        for i in 1..4 {
            let temporary = leaf(i);
            cache.insert(&temporary, i as u32);
        }
        // the fourth insert purged the two roots already dropped; the last one was still alive
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(&survivor), Some(0));
    }

    #[test]
    fn test_disabled_cache_skips_everything() {
        let cache = IdentityCache::new(false, 16);
        let root = leaf(3);
        cache.insert(&root, 9);
        assert!(cache.is_empty());
        assert_eq!(cache.get(&root), None);

        cache.set_enabled(true);
        cache.insert(&root, 9);
        assert_eq!(cache.get(&root), Some(9));
        cache.set_enabled(false);
        assert!(cache.is_empty());
    }
}
