//! Session-scoped key/value storage seam.
//!
//! The history store only ever talks to a [`SessionStore`]. Browsers back it
//! with `window.sessionStorage` (see `crate::web`); native builds and tests
//! use [`MemoryStore`]. [`UnavailableStore`] stands in for a disabled or
//! private-mode storage where every call fails.

use anyhow::{anyhow, Result};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

pub trait SessionStore {
    fn get_item(&self, key: &str) -> Result<Option<String>>;
    fn set_item(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove_item(&mut self, key: &str) -> Result<()>;
}

/// In-memory store for native builds and tests.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    items: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Simulates the tab being closed: everything goes.
    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl SessionStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<()> {
        self.items.remove(key);
        Ok(())
    }
}

/// Storage that refuses every operation.
#[derive(Clone, Copy, Debug, Default)]
pub struct UnavailableStore;

impl SessionStore for UnavailableStore {
    fn get_item(&self, _key: &str) -> Result<Option<String>> {
        Err(anyhow!("session storage unavailable"))
    }

    fn set_item(&mut self, _key: &str, _value: &str) -> Result<()> {
        Err(anyhow!("session storage unavailable"))
    }

    fn remove_item(&mut self, _key: &str) -> Result<()> {
        Err(anyhow!("session storage unavailable"))
    }
}

/// Shared handle, so several navigators in one tab see the same records.
impl<T: SessionStore> SessionStore for Rc<RefCell<T>> {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        self.try_borrow()
            .map_err(|_| anyhow!("session store busy"))?
            .get_item(key)
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
        self.try_borrow_mut()
            .map_err(|_| anyhow!("session store busy"))?
            .set_item(key, value)
    }

    fn remove_item(&mut self, key: &str) -> Result<()> {
        self.try_borrow_mut()
            .map_err(|_| anyhow!("session store busy"))?
            .remove_item(key)
    }
}

impl SessionStore for Box<dyn SessionStore> {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        (**self).get_item(key)
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
        (**self).set_item(key, value)
    }

    fn remove_item(&mut self, key: &str) -> Result<()> {
        (**self).remove_item(key)
    }
}

/// The platform's session store: `sessionStorage` in the browser, memory
/// elsewhere. Falls back to [`UnavailableStore`] when the browser denies
/// access.
pub fn default_store() -> Box<dyn SessionStore> {
    cfg_if::cfg_if! {
        if #[cfg(all(target_arch = "wasm32", feature = "web"))] {
            match crate::web::SessionStorageStore::open() {
                Ok(store) => Box::new(store),
                Err(e) => {
                    log::warn!("sessionStorage unavailable, history disabled: {e:#}");
                    Box::new(UnavailableStore)
                }
            }
        } else {
            Box::new(MemoryStore::new())
        }
    }
}
