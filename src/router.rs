//! Router seam and route-change events
//!
//! A [`Router`] performs browser-style navigations. Every resulting URL
//! change is reported as a [`RouteEvent`] on an unbounded channel; the owner
//! drains it and hands each event to
//! [`SheetNavigator::handle_route_event`](crate::navigation::SheetNavigator::handle_route_event),
//! which is the single place history reconciliation happens.
//!
//! ## Implementations
//!
//! - [`MemoryRouter`]: emulates a tab's session history (native, tests, CLI)
//! - `crate::web::BrowserRouter`: `window.history` (wasm32 + `web` feature)

use crate::debug::{self, cat};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

/// Strip fragment from a URL.
#[inline]
fn strip_frag(s: &str) -> &str {
    match s.find('#') {
        Some(i) => &s[..i],
        None => s,
    }
}

/// Path plus query of the current document (no origin, no fragment).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Location {
    /// e.g. `/account`
    pub pathname: String,
    /// Query string without the leading `?`.
    pub search: String,
}

impl Location {
    /// Parse `"/path?query#frag"`. A missing path becomes `/`.
    pub fn parse(raw: &str) -> Self {
        let s = strip_frag(raw.trim());
        let (path, query) = match s.split_once('?') {
            Some((p, q)) => (p, q),
            None => (s, ""),
        };
        let pathname = if path.is_empty() {
            "/".to_string()
        } else {
            path.to_string()
        };
        Location {
            pathname,
            search: query.to_string(),
        }
    }

    /// `pathname` plus `?search` when there is a query.
    pub fn href(&self) -> String {
        if self.search.is_empty() {
            self.pathname.clone()
        } else {
            format!("{}?{}", self.pathname, self.search)
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RouteEventKind {
    /// A new history entry was created.
    Push,
    /// The current entry was rewritten.
    Replace,
    /// Browser back/forward (popstate).
    Pop,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouteEvent {
    pub kind: RouteEventKind,
    pub location: Location,
}

pub type RouteEventSender = UnboundedSender<RouteEvent>;
pub type RouteEventReceiver = UnboundedReceiver<RouteEvent>;

pub fn route_channel() -> (RouteEventSender, RouteEventReceiver) {
    unbounded_channel()
}

/// Browser navigation primitives.
///
/// Fire-and-forget: the resulting URL is observed later through the route
/// event channel.
pub trait Router {
    /// Navigate to `url`, creating a history entry.
    fn push(&mut self, url: &str);
    /// Navigate to `url`, rewriting the current entry.
    fn replace(&mut self, url: &str);
    fn back(&mut self);
    fn forward(&mut self);
    fn location(&self) -> Location;
}

/// In-memory session history for one tab.
///
/// `back()` on the first entry leaves the site; that is recorded in
/// [`MemoryRouter::left_site`] rather than emitted as an event.
#[derive(Debug)]
pub struct MemoryRouter {
    entries: Vec<Location>,
    index: usize,
    events: RouteEventSender,
    left_site: bool,
}

impl MemoryRouter {
    pub fn new(initial_url: &str) -> (Self, RouteEventReceiver) {
        let (tx, rx) = route_channel();
        (Self::with_sender(initial_url, tx), rx)
    }

    pub fn with_sender(initial_url: &str, events: RouteEventSender) -> Self {
        MemoryRouter {
            entries: vec![Location::parse(initial_url)],
            index: 0,
            events,
            left_site: false,
        }
    }

    pub fn entries(&self) -> &[Location] {
        &self.entries
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn left_site(&self) -> bool {
        self.left_site
    }

    fn emit(&self, kind: RouteEventKind) {
        let location = self.entries[self.index].clone();
        debug::log(cat::ROUTER, format!("{kind:?} {}", location.href()));
        if self.events.send(RouteEvent { kind, location }).is_err() {
            log::debug!("route event dropped, no listener");
        }
    }
}

impl Router for MemoryRouter {
    fn push(&mut self, url: &str) {
        self.entries.truncate(self.index + 1);
        self.entries.push(Location::parse(url));
        self.index = self.entries.len() - 1;
        self.emit(RouteEventKind::Push);
    }

    fn replace(&mut self, url: &str) {
        self.entries[self.index] = Location::parse(url);
        self.emit(RouteEventKind::Replace);
    }

    fn back(&mut self) {
        if self.index == 0 {
            self.left_site = true;
            debug::log(cat::ROUTER, "back past first entry, leaving site");
            return;
        }
        self.index -= 1;
        self.emit(RouteEventKind::Pop);
    }

    fn forward(&mut self) {
        if self.index + 1 >= self.entries.len() {
            return;
        }
        self.index += 1;
        self.emit(RouteEventKind::Pop);
    }

    fn location(&self) -> Location {
        self.entries[self.index].clone()
    }
}
