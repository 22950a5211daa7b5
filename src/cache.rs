//! Rendered-panel cache for peek and back/forward rendering
//!
//! Strict LRU keyed by panel path. Purely a rendering aid: what is current
//! is decided by the URL and the history store, never by this cache.

use crate::debug::{self, cat};
use crate::types::PanelPath;
use lru::LruCache;
use std::cell::RefCell;
use std::num::NonZeroUsize;
use std::rc::Rc;

/// Panels kept alive by default.
pub const DEFAULT_KEEP_ALIVE: usize = 5;

/// One cache per tab, shared by the loader and the renderer.
pub type SharedPanelCache<V> = Rc<RefCell<PanelCache<V>>>;

pub struct PanelCache<V> {
    inner: LruCache<PanelPath, V>,
}

impl<V> Default for PanelCache<V> {
    fn default() -> Self {
        Self::new(DEFAULT_KEEP_ALIVE)
    }
}

impl<V> PanelCache<V> {
    /// A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        PanelCache {
            inner: LruCache::new(cap),
        }
    }

    pub fn shared(capacity: usize) -> SharedPanelCache<V> {
        Rc::new(RefCell::new(Self::new(capacity)))
    }

    /// Insert or refresh `key` as most recent. Returns the key evicted to
    /// make room, if any.
    pub fn set(&mut self, key: PanelPath, value: V) -> Option<PanelPath> {
        let evicted = match self.inner.push(key.clone(), value) {
            Some((old, _)) if old != key => Some(old),
            _ => None,
        };
        if let Some(old) = &evicted {
            debug::log(cat::CACHE, format!("evicted '{old}' for '{key}'"));
        }
        evicted
    }

    /// Cached value for `key`, marking it most recently used.
    pub fn get(&mut self, key: &str) -> Option<&V> {
        self.inner.get(key)
    }

    /// Presence check without touching recency.
    pub fn has(&self, key: &str) -> bool {
        self.inner.contains(key)
    }

    /// Keys from least to most recently used.
    pub fn keys(&self) -> Vec<PanelPath> {
        self.inner.iter().rev().map(|(k, _)| k.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.inner.cap().get()
    }

    pub fn clear(&mut self) {
        self.inner.clear();
    }
}
