//! Navigation facade for the bottom sheet
//!
//! [`SheetNavigator`] owns the registry, the history store and the router.
//! Commands (`open_sheet`, `jump_to`, `go_back`, ...) only write history and
//! issue router navigations. The URL they produce comes back later as a
//! [`RouteEvent`], and [`SheetNavigator::handle_route_event`] reconciles
//! history with it before the next command can read the store.
//!
//! ## States
//!
//! `Closed` and `Open@path`. `open_sheet` opens, `jump_to`/`go_panel` move
//! anywhere, `go_back`/`go_forward` move to a stack neighbor when one exists,
//! `close_sheet` returns to `Closed`.

use crate::debug::{self, cat};
use crate::history::{HistoryStore, NavigationType};
use crate::path::split_segments;
use crate::registry::PanelRegistry;
use crate::router::{Location, RouteEvent, RouteEventReceiver, Router};
use crate::storage::SessionStore;
use crate::transition::{determine_transition, TransitionKind};
use crate::types::{ModalId, PanelPath, ResolvedState, SheetHistory};
use crate::url_state;
use crate::validation::{default_panel_for, is_known_panel, normalize_panel_for};
use url::Url;

/// What the page knows about how it was reached.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PageContext {
    /// e.g. `https://app.example.com`
    pub origin: Option<String>,
    /// `document.referrer`, empty counts as none.
    pub referrer: Option<String>,
}

impl PageContext {
    pub fn new(origin: impl Into<String>, referrer: Option<String>) -> Self {
        PageContext {
            origin: Some(origin.into()),
            referrer: referrer.filter(|r| !r.is_empty()),
        }
    }

    /// True when the referrer parses and shares the page's origin.
    pub fn same_origin_referrer(&self) -> bool {
        let (Some(origin), Some(referrer)) = (&self.origin, &self.referrer) else {
            return false;
        };
        match (Url::parse(origin), Url::parse(referrer)) {
            (Ok(o), Ok(r)) => o.origin() == r.origin(),
            _ => false,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CloseOptions {
    /// Discard the modal's history and replace the URL instead of going back.
    pub hard: bool,
}

impl CloseOptions {
    pub fn hard() -> Self {
        CloseOptions { hard: true }
    }
}

/// Result of reconciling one observed URL.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouteChange {
    pub state: ResolvedState,
    /// Panel of the previous observation.
    pub previous: Option<PanelPath>,
    /// Animation direction from `previous` to the new panel.
    pub transition: TransitionKind,
    /// History after reconciliation, when a modal is open.
    pub history: Option<SheetHistory>,
}

pub struct SheetNavigator<S: SessionStore, R: Router> {
    registry: PanelRegistry,
    history: HistoryStore<S>,
    router: R,
    page: PageContext,
    nav_type: NavigationType,
    state: ResolvedState,
    last_panel: Option<PanelPath>,
    /// href of the entry the page was loaded on.
    landing: Option<String>,
}

impl<S: SessionStore, R: Router> SheetNavigator<S, R> {
    pub fn new(registry: PanelRegistry, history: HistoryStore<S>, router: R) -> Self {
        SheetNavigator {
            registry,
            history,
            router,
            page: PageContext::default(),
            nav_type: NavigationType::default(),
            state: ResolvedState::closed(),
            last_panel: None,
            landing: None,
        }
    }

    pub fn with_page_context(mut self, page: PageContext) -> Self {
        self.page = page;
        self
    }

    pub fn with_navigation_type(mut self, nav_type: NavigationType) -> Self {
        self.nav_type = nav_type;
        self
    }

    // ---- accessors ----

    pub fn state(&self) -> &ResolvedState {
        &self.state
    }

    pub fn modal_id(&self) -> Option<ModalId> {
        self.state.modal_id
    }

    pub fn panel_path(&self) -> Option<&PanelPath> {
        self.state.panel_path.as_ref()
    }

    pub fn registry(&self) -> &PanelRegistry {
        &self.registry
    }

    pub fn router(&self) -> &R {
        &self.router
    }

    pub fn router_mut(&mut self) -> &mut R {
        &mut self.router
    }

    pub fn history_store(&self) -> &HistoryStore<S> {
        &self.history
    }

    /// Stored history of the active modal.
    pub fn history(&self) -> Option<SheetHistory> {
        self.history.read(self.state.modal_id?)
    }

    // ---- reconciliation ----

    /// Observe the router's current location; call once after construction.
    pub fn mount(&mut self) -> RouteChange {
        let loc = self.router.location();
        self.landing = Some(loc.href());
        self.observe(&loc)
    }

    pub fn handle_route_event(&mut self, event: RouteEvent) -> RouteChange {
        debug::log(cat::NAV, format!("{:?} {}", event.kind, event.location.href()));
        self.observe(&event.location)
    }

    /// Handle every queued route event, in order.
    pub fn process_pending(&mut self, events: &mut RouteEventReceiver) -> Vec<RouteChange> {
        let mut out = Vec::new();
        while let Ok(ev) = events.try_recv() {
            out.push(self.handle_route_event(ev));
        }
        out
    }

    /// Resolve `location`, sync the active modal's history and classify the
    /// transition against the previously observed panel.
    pub fn observe(&mut self, location: &Location) -> RouteChange {
        let next = url_state::read_state(&self.registry, location);
        let mut previous = self.last_panel.take();
        if let (Some(from), Some(to)) = (self.state.modal_id, next.modal_id) {
            if from != to {
                previous = None;
            }
        }
        let transition = determine_transition(
            previous.as_ref().map(PanelPath::as_str),
            next.panel_path.as_ref().map(PanelPath::as_str),
        );

        let history = match (next.modal_id, next.panel_path.as_ref()) {
            (Some(modal), Some(panel)) => {
                self.history.clear_on_reload_once(modal, self.nav_type);
                let default = default_panel_for(&self.registry, modal);
                Some(self.history.sync(modal, panel, &default))
            }
            _ => None,
        };

        self.last_panel = next.panel_path.clone();
        self.state = next.clone();
        RouteChange {
            state: next,
            previous,
            transition,
            history,
        }
    }

    // ---- commands ----

    fn push_state(&mut self, modal: ModalId, panel: &PanelPath) {
        url_state::set_modal_panel(&mut self.router, &self.registry, modal, Some(panel));
    }

    fn replace_with_base(&mut self) {
        let url = url_state::base_url(&self.router.location());
        self.router.replace(&url);
    }

    /// Open `modal` on `panel` (default panel when `None`).
    pub fn open_sheet(&mut self, modal: ModalId, panel: Option<&PanelPath>) {
        let panel = panel
            .cloned()
            .unwrap_or_else(|| default_panel_for(&self.registry, modal));
        log::debug!("open {modal} at '{panel}'");
        self.push_state(modal, &panel);
    }

    /// Push `panel` of the active modal; history follows on observation.
    pub fn go_panel(&mut self, panel: &PanelPath) -> bool {
        let Some(modal) = self.state.modal_id else {
            return false;
        };
        self.push_state(modal, panel);
        true
    }

    /// Jump straight to `raw` in the active modal, recording its ancestors so
    /// that back steps up the hierarchy. `""` is the root panel. No-op for
    /// unknown panels.
    pub fn jump_to(&mut self, raw: &str) -> bool {
        let Some(modal) = self.state.modal_id else {
            return false;
        };
        let target = if raw.is_empty() {
            Some(PanelPath::root())
        } else {
            normalize_panel_for(&self.registry, modal, Some(raw))
        };
        let Some(target) = target else {
            debug::log(cat::NAV, format!("jump_to rejected '{raw}'"));
            return false;
        };
        if !is_known_panel(&self.registry, modal, target.as_str()) {
            debug::log(cat::NAV, format!("jump_to unknown panel '{target}' for {modal}"));
            return false;
        }
        let default = default_panel_for(&self.registry, modal);
        self.history.jump(modal, &target, &default);
        log::debug!("jump {modal} to '{target}'");
        self.push_state(modal, &target);
        true
    }

    pub fn can_go_back(&self) -> bool {
        self.state
            .modal_id
            .is_some_and(|m| self.history.can_go_back(m))
    }

    pub fn can_go_forward(&self) -> bool {
        self.state
            .modal_id
            .is_some_and(|m| self.history.can_go_forward(m))
    }

    fn step(&mut self, forward: bool) -> bool {
        let Some(modal) = self.state.modal_id else {
            return false;
        };
        let Some(h) = self.history.read(modal) else {
            return false;
        };
        let index = if forward {
            if !h.can_go_forward() {
                return false;
            }
            h.cursor + 1
        } else {
            if !h.can_go_back() {
                return false;
            }
            h.cursor - 1
        };
        let Some(target) = self.history.move_cursor(modal, index) else {
            return false;
        };
        debug::log(cat::NAV, format!("step to #{index} '{target}'"));
        self.push_state(modal, &target);
        true
    }

    /// Move to the previous stack entry. Returns false (and does nothing)
    /// when there is none.
    pub fn go_back(&mut self) -> bool {
        self.step(false)
    }

    pub fn go_forward(&mut self) -> bool {
        self.step(true)
    }

    /// True when a soft close should replace rather than go back: the sheet
    /// sits on the landing entry (or has no record) and the page was not
    /// reached from this site, so a browser back would leave it.
    fn should_replace_for_direct_link(&self) -> bool {
        let Some(modal) = self.state.modal_id else {
            return false;
        };
        let at_landing = self.landing.as_deref() == Some(self.router.location().href().as_str());
        let no_internal_history = at_landing || self.history.read(modal).is_none();
        no_internal_history && !self.page.same_origin_referrer()
    }

    pub fn close_sheet(&mut self, opts: CloseOptions) {
        if opts.hard {
            if let Some(modal) = self.state.modal_id {
                self.history.clear(modal);
                log::debug!("hard close {modal}");
            }
            self.replace_with_base();
            return;
        }
        if self.should_replace_for_direct_link() {
            debug::log(cat::NAV, "close of direct link, replacing");
            self.replace_with_base();
            return;
        }
        self.router.back();
    }

    /// Reset the active modal's history to just the current panel.
    pub fn clear_history(&mut self) -> Option<SheetHistory> {
        let modal = self.state.modal_id?;
        let panel = self.state.panel_path.clone()?;
        Some(self.history.reset(modal, panel))
    }

    /// Registered depth if any modal has `path`, else its segment count.
    pub fn panel_depth(&self, path: &str) -> usize {
        self.registry
            .depth_of(path)
            .unwrap_or_else(|| split_segments(path).len())
    }
}
