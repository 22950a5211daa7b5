//! Per-modal panel history persisted in session storage
//!
//! One JSON record per modal under `<prefix><modal>` (default `sheet:settings`),
//! always written whole. Storage failures never surface: reads degrade to
//! "no history" and writes are dropped with a warning, while the computed
//! history is still returned to the caller.

use crate::debug::{self, cat};
use crate::path::{build_stack_from_path, is_segment_prefix};
use crate::storage::SessionStore;
use crate::types::{ModalId, PanelPath, SheetHistory};

pub const DEFAULT_KEY_PREFIX: &str = "sheet:";

/// How the current document was loaded (Navigation Timing `type`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NavigationType {
    #[default]
    Navigate,
    Reload,
    BackForward,
    Prerender,
}

impl NavigationType {
    /// Map a `PerformanceNavigationTiming.type` string; unknown values count
    /// as a plain navigation.
    pub fn from_entry_type(raw: &str) -> Self {
        match raw {
            "reload" => NavigationType::Reload,
            "back_forward" => NavigationType::BackForward,
            "prerender" => NavigationType::Prerender,
            _ => NavigationType::Navigate,
        }
    }

    pub fn is_reload(self) -> bool {
        self == NavigationType::Reload
    }
}

pub struct HistoryStore<S: SessionStore> {
    store: S,
    key_prefix: String,
    cleared_on_reload: bool,
}

impl<S: SessionStore> HistoryStore<S> {
    pub fn new(store: S) -> Self {
        Self::with_prefix(store, DEFAULT_KEY_PREFIX)
    }

    pub fn with_prefix(store: S, key_prefix: &str) -> Self {
        Self {
            store,
            key_prefix: key_prefix.to_string(),
            cleared_on_reload: false,
        }
    }

    pub fn key(&self, modal: ModalId) -> String {
        format!("{}{}", self.key_prefix, modal)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn read(&self, modal: ModalId) -> Option<SheetHistory> {
        let key = self.key(modal);
        let raw = match self.store.get_item(&key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                log::warn!("history read for {key} failed: {e:#}");
                return None;
            }
        };
        match serde_json::from_str::<SheetHistory>(&raw) {
            Ok(h) if h.is_consistent() => Some(h),
            Ok(h) => {
                log::warn!(
                    "discarding inconsistent history for {key}: cursor {} of {}",
                    h.cursor,
                    h.stack.len()
                );
                None
            }
            Err(e) => {
                log::warn!("discarding unreadable history for {key}: {e}");
                None
            }
        }
    }

    /// Replace the stored record for `modal`.
    pub fn write(&mut self, modal: ModalId, history: &SheetHistory) {
        let key = self.key(modal);
        let json = match serde_json::to_string(history) {
            Ok(json) => json,
            Err(e) => {
                log::warn!("history encode for {key} failed: {e}");
                return;
            }
        };
        if let Err(e) = self.store.set_item(&key, &json) {
            log::warn!("history write for {key} dropped: {e:#}");
            return;
        }
        debug::log(cat::HISTORY, format!("{key} <- {json}"));
    }

    /// Start over with `current` as the only entry.
    pub fn reset(&mut self, modal: ModalId, current: PanelPath) -> SheetHistory {
        let next = SheetHistory::single(current);
        self.write(modal, &next);
        next
    }

    /// Drop the record entirely (hard close).
    pub fn clear(&mut self, modal: ModalId) {
        let key = self.key(modal);
        if let Err(e) = self.store.remove_item(&key) {
            log::warn!("history clear for {key} failed: {e:#}");
            return;
        }
        debug::log(cat::HISTORY, format!("{key} cleared"));
    }

    /// Clear the active modal's record once per page load if the load was a
    /// reload. Returns true when it cleared.
    pub fn clear_on_reload_once(&mut self, modal: ModalId, nav: NavigationType) -> bool {
        if !nav.is_reload() || self.cleared_on_reload {
            return false;
        }
        self.cleared_on_reload = true;
        self.clear(modal);
        log::debug!("page reload detected, history for {modal} reset");
        true
    }

    /// Reconcile the stored history with the panel just observed in the URL.
    ///
    /// - no record: seed `[current]`, or `["", current]` when the modal's
    ///   default is the root and `current` is deeper
    /// - `current` already in the stack: move the cursor there
    /// - otherwise: drop forward entries and append `current`
    pub fn sync(
        &mut self,
        modal: ModalId,
        current: &PanelPath,
        default_panel: &PanelPath,
    ) -> SheetHistory {
        let Some(mut history) = self.read(modal) else {
            if default_panel.is_root() && !current.is_root() {
                let seeded = SheetHistory {
                    stack: vec![PanelPath::root(), current.clone()],
                    cursor: 1,
                };
                self.write(modal, &seeded);
                return seeded;
            }
            return self.reset(modal, current.clone());
        };

        if let Some(idx) = history.position(current) {
            if idx != history.cursor {
                history.cursor = idx;
                self.write(modal, &history);
            }
            return history;
        }

        history.stack.truncate(history.cursor + 1);
        history.stack.push(current.clone());
        history.cursor = history.stack.len() - 1;
        self.write(modal, &history);
        history
    }

    /// Record a direct jump to `target`, filling in its ancestors.
    ///
    /// A target already in the stack just moves the cursor. Otherwise the
    /// stack is cut after the deepest non-root ancestor of `target` at or
    /// before the cursor (after the cursor when there is none), and every
    /// ancestor of `target` not yet present (the root first, when it is the
    /// default) is appended, ending on `target`.
    pub fn jump(
        &mut self,
        modal: ModalId,
        target: &PanelPath,
        default_panel: &PanelPath,
    ) -> SheetHistory {
        let mut chain = Vec::new();
        if default_panel.is_root() && !target.is_root() {
            chain.push(PanelPath::root());
        }
        chain.extend(build_stack_from_path(target));

        let next = match self.read(modal) {
            None => SheetHistory {
                cursor: chain.len() - 1,
                stack: chain,
            },
            Some(mut h) => {
                if let Some(idx) = h.position(target) {
                    h.cursor = idx;
                    h
                } else {
                    let keep = h.stack[..=h.cursor]
                        .iter()
                        .rposition(|p| !p.is_root() && is_segment_prefix(p.as_str(), target.as_str()))
                        .unwrap_or(h.cursor);
                    h.stack.truncate(keep + 1);
                    for p in chain {
                        if !h.stack.contains(&p) {
                            h.stack.push(p);
                        }
                    }
                    h.cursor = h.stack.len() - 1;
                    h
                }
            }
        };
        self.write(modal, &next);
        next
    }

    /// Move the stored cursor to `index`; returns the entry there.
    pub fn move_cursor(&mut self, modal: ModalId, index: usize) -> Option<PanelPath> {
        let mut h = self.read(modal)?;
        let target = h.stack.get(index)?.clone();
        h.cursor = index;
        self.write(modal, &h);
        Some(target)
    }

    pub fn can_go_back(&self, modal: ModalId) -> bool {
        self.read(modal).is_some_and(|h| h.can_go_back())
    }

    pub fn can_go_forward(&self, modal: ModalId) -> bool {
        self.read(modal).is_some_and(|h| h.can_go_forward())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStore, UnavailableStore};

    const M: ModalId = ModalId::Settings;

    fn p(s: &str) -> PanelPath {
        PanelPath::parse(s).unwrap()
    }

    fn stack(h: &SheetHistory) -> Vec<&str> {
        h.stack.iter().map(|p| p.as_str()).collect()
    }

    #[test]
    fn test_sync_fresh_root_seeds_single() {
        let mut hs = HistoryStore::new(MemoryStore::new());
        let h = hs.sync(M, &PanelPath::root(), &PanelPath::root());
        assert_eq!(h, SheetHistory::single(PanelPath::root()));
        assert_eq!(hs.read(M), Some(h));
    }

    #[test]
    fn test_sync_fresh_deep_link_seeds_root() {
        let mut hs = HistoryStore::new(MemoryStore::new());
        let h = hs.sync(M, &p("a/b"), &PanelPath::root());
        assert_eq!(stack(&h), vec!["", "a/b"]);
        assert_eq!(h.cursor, 1);
        assert!(hs.can_go_back(M));
        assert!(!hs.can_go_forward(M));
    }

    #[test]
    fn test_sync_fresh_with_non_root_default_resets() {
        let mut hs = HistoryStore::new(MemoryStore::new());
        let h = hs.sync(M, &p("a/b"), &p("a"));
        assert_eq!(stack(&h), vec!["a/b"]);
        assert_eq!(h.cursor, 0);
    }

    #[test]
    fn test_sync_push_truncates_forward() {
        let mut hs = HistoryStore::new(MemoryStore::new());
        hs.write(
            M,
            &SheetHistory {
                stack: vec![p(""), p("a"), p("a/b")],
                cursor: 1,
            },
        );
        let h = hs.sync(M, &p("d"), &PanelPath::root());
        assert_eq!(stack(&h), vec!["", "a", "d"]);
        assert_eq!(h.cursor, 2);
    }

    #[test]
    fn test_sync_existing_moves_cursor() {
        let mut hs = HistoryStore::new(MemoryStore::new());
        hs.write(
            M,
            &SheetHistory {
                stack: vec![p(""), p("a"), p("a/b")],
                cursor: 1,
            },
        );
        let h = hs.sync(M, &p("a/b"), &PanelPath::root());
        assert_eq!(h.stack.len(), 3);
        assert_eq!(h.cursor, 2);
    }

    #[test]
    fn test_sync_is_idempotent() {
        let mut hs = HistoryStore::new(MemoryStore::new());
        hs.sync(M, &p("a"), &PanelPath::root());
        let first = hs.sync(M, &p("a/c"), &PanelPath::root());
        let second = hs.sync(M, &p("a/c"), &PanelPath::root());
        assert_eq!(first, second);
        assert_eq!(hs.read(M), Some(second));
    }

    #[test]
    fn test_jump_fills_ancestors() {
        let mut hs = HistoryStore::new(MemoryStore::new());
        hs.sync(M, &PanelPath::root(), &PanelPath::root());
        let h = hs.jump(M, &p("a/b"), &PanelPath::root());
        assert_eq!(stack(&h), vec!["", "a", "a/b"]);
        assert_eq!(h.cursor, 2);
    }

    #[test]
    fn test_jump_to_sibling_appends() {
        let mut hs = HistoryStore::new(MemoryStore::new());
        hs.write(
            M,
            &SheetHistory {
                stack: vec![p(""), p("a"), p("a/b")],
                cursor: 2,
            },
        );
        let h = hs.jump(M, &p("d"), &PanelPath::root());
        assert_eq!(stack(&h), vec!["", "a", "a/b", "d"]);
        assert_eq!(h.cursor, 3);
    }

    #[test]
    fn test_jump_within_subtree_rewinds_to_shared_ancestor() {
        let mut hs = HistoryStore::new(MemoryStore::new());
        hs.write(
            M,
            &SheetHistory {
                stack: vec![p(""), p("a"), p("a/b")],
                cursor: 2,
            },
        );
        let h = hs.jump(M, &p("a/c"), &PanelPath::root());
        assert_eq!(stack(&h), vec!["", "a", "a/c"]);
        assert_eq!(h.cursor, 2);
    }

    #[test]
    fn test_jump_without_record() {
        let mut hs = HistoryStore::new(MemoryStore::new());
        let h = hs.jump(M, &p("a/b/c"), &PanelPath::root());
        assert_eq!(stack(&h), vec!["", "a", "a/b", "a/b/c"]);
        assert_eq!(h.cursor, 3);
    }

    #[test]
    fn test_clear_on_reload_only_once() {
        let mut hs = HistoryStore::new(MemoryStore::new());
        hs.sync(M, &p("a"), &PanelPath::root());
        assert!(!hs.clear_on_reload_once(M, NavigationType::Navigate));
        assert!(hs.read(M).is_some());
        assert!(hs.clear_on_reload_once(M, NavigationType::Reload));
        assert!(hs.read(M).is_none());
        hs.sync(M, &p("a"), &PanelPath::root());
        assert!(!hs.clear_on_reload_once(M, NavigationType::Reload));
        assert!(hs.read(M).is_some());
    }

    #[test]
    fn test_unavailable_storage_degrades() {
        let mut hs = HistoryStore::new(UnavailableStore);
        let h = hs.sync(M, &p("a/b"), &PanelPath::root());
        assert_eq!(stack(&h), vec!["", "a/b"]);
        assert!(hs.read(M).is_none());
        assert!(!hs.can_go_back(M));
        assert!(!hs.can_go_forward(M));
    }

    #[test]
    fn test_corrupt_record_is_ignored() {
        let mut store = MemoryStore::new();
        store.set_item("sheet:settings", "{not json").unwrap();
        let hs = HistoryStore::new(store);
        assert!(hs.read(M).is_none());

        let mut store = MemoryStore::new();
        store
            .set_item("sheet:settings", r#"{"stack":["a"],"cursor":4}"#)
            .unwrap();
        let hs = HistoryStore::new(store);
        assert!(hs.read(M).is_none());
    }

    #[test]
    fn test_navigation_type_mapping() {
        assert!(NavigationType::from_entry_type("reload").is_reload());
        assert_eq!(
            NavigationType::from_entry_type("back_forward"),
            NavigationType::BackForward
        );
        assert_eq!(NavigationType::from_entry_type("???"), NavigationType::Navigate);
    }
}
