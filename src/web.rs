//! Browser adapters (wasm32 with the `web` feature)
//!
//! - [`SessionStorageStore`]: `window.sessionStorage`
//! - [`BrowserRouter`]: `window.history` push/replace/back/forward
//! - [`navigation_type`]: Navigation Timing entry type (reload detection)
//! - [`page_context`]: origin + `document.referrer`
//! - [`install_popstate_listener`]: popstate into the route-event channel

use crate::debug::{self, cat};
use crate::history::{HistoryStore, NavigationType};
use crate::navigation::{PageContext, SheetNavigator};
use crate::registry::PanelRegistry;
use crate::router::{route_channel, Location, RouteEvent, RouteEventKind, RouteEventReceiver, RouteEventSender, Router};
use crate::storage::SessionStore;
use anyhow::{anyhow, Result};
use js_sys::Reflect;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::window;

#[inline]
fn js_err(e: JsValue) -> anyhow::Error {
    anyhow!("{e:?}")
}

/// Install panic hook, logger and debug mask. Safe to call more than once.
pub fn init() {
    use std::sync::Once;
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        console_error_panic_hook::set_once();
        wasm_logger::init(wasm_logger::Config::new(log::Level::Debug));
    });
    debug::init_from_url_and_storage_once();
}

// ----------------------- SESSION STORAGE ----------------------------

pub struct SessionStorageStore {
    storage: web_sys::Storage,
}

impl SessionStorageStore {
    pub fn open() -> Result<Self> {
        let win = window().ok_or_else(|| anyhow!("no window"))?;
        let storage = win
            .session_storage()
            .map_err(js_err)?
            .ok_or_else(|| anyhow!("sessionStorage disabled"))?;
        Ok(SessionStorageStore { storage })
    }
}

impl SessionStore for SessionStorageStore {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        self.storage.get_item(key).map_err(js_err)
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
        self.storage.set_item(key, value).map_err(js_err)
    }

    fn remove_item(&mut self, key: &str) -> Result<()> {
        self.storage.remove_item(key).map_err(js_err)
    }
}

// ----------------------- PAGE INFO ----------------------------

fn current_location() -> Location {
    let Some(win) = window() else {
        return Location::default();
    };
    let loc = win.location();
    let pathname = loc.pathname().unwrap_or_else(|_| "/".to_string());
    let search = loc.search().unwrap_or_default();
    Location {
        pathname,
        search: search.trim_start_matches('?').to_string(),
    }
}

/// `performance.getEntriesByType("navigation")[0].type`.
pub fn navigation_type() -> NavigationType {
    let Some(perf) = window().and_then(|w| w.performance()) else {
        return NavigationType::Navigate;
    };
    let entries = perf.get_entries_by_type("navigation");
    let first = entries.get(0);
    if first.is_undefined() {
        return NavigationType::Navigate;
    }
    Reflect::get(&first, &JsValue::from_str("type"))
        .ok()
        .and_then(|v| v.as_string())
        .map(|t| NavigationType::from_entry_type(&t))
        .unwrap_or_default()
}

pub fn page_context() -> PageContext {
    let Some(win) = window() else {
        return PageContext::default();
    };
    let origin = win.location().origin().ok();
    let referrer = win.document().map(|d| d.referrer()).filter(|r| !r.is_empty());
    PageContext { origin, referrer }
}

// ----------------------- ROUTER ----------------------------

/// `window.history` router. Push/replace report immediately; back/forward
/// report through the popstate listener.
pub struct BrowserRouter {
    events: RouteEventSender,
}

impl BrowserRouter {
    pub fn new(events: RouteEventSender) -> Self {
        BrowserRouter { events }
    }

    fn emit(&self, kind: RouteEventKind) {
        let location = current_location();
        debug::log(cat::ROUTER, format!("{kind:?} {}", location.href()));
        if self.events.send(RouteEvent { kind, location }).is_err() {
            log::debug!("route event dropped, no listener");
        }
    }
}

impl Router for BrowserRouter {
    fn push(&mut self, url: &str) {
        let Some(win) = window() else { return };
        match win.history() {
            Ok(h) => {
                if let Err(e) = h.push_state_with_url(&JsValue::NULL, "", Some(url)) {
                    log::warn!("pushState failed: {e:?}");
                    return;
                }
                self.emit(RouteEventKind::Push);
            }
            Err(e) => log::warn!("history unavailable: {e:?}"),
        }
    }

    fn replace(&mut self, url: &str) {
        let Some(win) = window() else { return };
        match win.history() {
            Ok(h) => {
                if let Err(e) = h.replace_state_with_url(&JsValue::NULL, "", Some(url)) {
                    log::warn!("replaceState failed: {e:?}");
                    return;
                }
                self.emit(RouteEventKind::Replace);
            }
            Err(e) => log::warn!("history unavailable: {e:?}"),
        }
    }

    fn back(&mut self) {
        if let Some(Ok(h)) = window().map(|w| w.history()) {
            if let Err(e) = h.back() {
                log::warn!("history.back failed: {e:?}");
            }
        }
    }

    fn forward(&mut self) {
        if let Some(Ok(h)) = window().map(|w| w.history()) {
            if let Err(e) = h.forward() {
                log::warn!("history.forward failed: {e:?}");
            }
        }
    }

    fn location(&self) -> Location {
        current_location()
    }
}

/// Forward every popstate as a `Pop` route event. The listener lives for the
/// rest of the page.
pub fn install_popstate_listener(events: RouteEventSender) -> Result<()> {
    let win = window().ok_or_else(|| anyhow!("no window"))?;
    let cb = Closure::<dyn FnMut(web_sys::Event)>::new(move |_ev: web_sys::Event| {
        let location = current_location();
        debug::log(cat::ROUTER, format!("popstate {}", location.href()));
        let sent = events.send(RouteEvent {
            kind: RouteEventKind::Pop,
            location,
        });
        if sent.is_err() {
            log::debug!("popstate dropped, no listener");
        }
    });
    win.add_event_listener_with_callback("popstate", cb.as_ref().unchecked_ref())
        .map_err(js_err)?;
    cb.forget();
    Ok(())
}

/// Navigator wired to the real browser, plus the route-event receiver the
/// app drains each frame.
pub fn browser_navigator(
    registry: PanelRegistry,
    key_prefix: &str,
) -> Result<(SheetNavigator<Box<dyn SessionStore>, BrowserRouter>, RouteEventReceiver)> {
    let (tx, rx) = route_channel();
    install_popstate_listener(tx.clone())?;
    let store = crate::storage::default_store();
    let nav = SheetNavigator::new(
        registry,
        HistoryStore::with_prefix(store, key_prefix),
        BrowserRouter::new(tx),
    )
    .with_page_context(page_context())
    .with_navigation_type(navigation_type());
    Ok((nav, rx))
}
