//! Navigator scenarios against the in-memory router and session store

use sheetnav::router::RouteEventReceiver;
use sheetnav::{
    CloseOptions, HistoryStore, MemoryRouter, MemoryStore, ModalId, NavigationType, PageContext,
    PanelPath, PanelRegistry, RouteChange, Router, SessionStore, SheetNavigator, TransitionKind,
    UnavailableStore,
};
use std::cell::RefCell;
use std::rc::Rc;

fn p(s: &str) -> PanelPath {
    PanelPath::parse(s).unwrap()
}

fn stack(items: &[&str]) -> Vec<PanelPath> {
    items.iter().map(|s| p(s)).collect()
}

fn navigator_with<S: SessionStore>(
    url: &str,
    store: S,
) -> (SheetNavigator<S, MemoryRouter>, RouteEventReceiver) {
    let (router, rx) = MemoryRouter::new(url);
    let nav = SheetNavigator::new(PanelRegistry::builtin(), HistoryStore::new(store), router);
    (nav, rx)
}

fn navigator(url: &str) -> (SheetNavigator<MemoryStore, MemoryRouter>, RouteEventReceiver) {
    navigator_with(url, MemoryStore::new())
}

fn drain<S: SessionStore>(
    nav: &mut SheetNavigator<S, MemoryRouter>,
    rx: &mut RouteEventReceiver,
) -> RouteChange {
    let mut changes = nav.process_pending(rx);
    assert_eq!(changes.len(), 1, "expected exactly one route event");
    changes.remove(0)
}

#[test]
fn deep_link_seeds_root_and_goes_back_to_it() {
    let (mut nav, mut rx) = navigator("/?m=settings&p=a/b");
    let mounted = nav.mount();
    let h = mounted.history.unwrap();
    assert_eq!(h.stack, stack(&["", "a/b"]));
    assert_eq!(h.cursor, 1);

    assert!(nav.can_go_back());
    assert!(nav.go_back());
    let change = drain(&mut nav, &mut rx);
    assert_eq!(change.state.panel_path, Some(PanelPath::root()));
    assert_eq!(change.transition, TransitionKind::Back);
    assert_eq!(change.history.unwrap().cursor, 0);
    assert!(!nav.can_go_back());
    assert!(nav.can_go_forward());
}

#[test]
fn jump_to_sibling_appends_after_cursor() {
    let (mut nav, mut rx) = navigator("/?m=settings&p=a");
    nav.mount();
    assert!(nav.go_panel(&p("a/b")));
    let change = drain(&mut nav, &mut rx);
    assert_eq!(change.transition, TransitionKind::Forward);
    assert_eq!(change.history.unwrap().stack, stack(&["", "a", "a/b"]));

    assert!(nav.jump_to("d"));
    let change = drain(&mut nav, &mut rx);
    let h = change.history.unwrap();
    assert_eq!(h.stack, stack(&["", "a", "a/b", "d"]));
    assert_eq!(h.cursor, 3);
    assert_eq!(change.transition, TransitionKind::Fade);
}

#[test]
fn popstate_moves_cursor_without_growing_stack() {
    let (mut nav, mut rx) = navigator("/?m=settings&p=a");
    nav.mount();
    nav.go_panel(&p("a/b"));
    drain(&mut nav, &mut rx);

    assert!(nav.go_back());
    let change = drain(&mut nav, &mut rx);
    assert_eq!(change.state.panel_path, Some(p("a")));
    assert_eq!(change.history.unwrap().cursor, 1);

    // Browser back lands on the earlier "a/b" entry.
    nav.router_mut().back();
    let change = drain(&mut nav, &mut rx);
    assert_eq!(change.state.panel_path, Some(p("a/b")));
    assert_eq!(change.transition, TransitionKind::Forward);
    let h = change.history.unwrap();
    assert_eq!(h.cursor, 2);
    assert_eq!(h.stack.len(), 3);
}

#[test]
fn jump_to_deep_panel_lets_back_climb_the_hierarchy() {
    let (mut nav, mut rx) = navigator("/?m=settings&p=");
    let mounted = nav.mount();
    assert_eq!(mounted.history.unwrap().stack, stack(&[""]));

    assert!(nav.jump_to("a/c"));
    let change = drain(&mut nav, &mut rx);
    assert_eq!(change.history.unwrap().stack, stack(&["", "a", "a/c"]));

    assert!(nav.go_back());
    assert_eq!(drain(&mut nav, &mut rx).state.panel_path, Some(p("a")));
    assert!(nav.go_back());
    assert_eq!(drain(&mut nav, &mut rx).state.panel_path, Some(PanelPath::root()));
    assert!(!nav.go_back());
    assert!(nav.process_pending(&mut rx).is_empty());
}

#[test]
fn jump_within_subtree_backs_to_shared_ancestor() {
    let (mut nav, mut rx) = navigator("/?m=settings&p=a");
    nav.mount();
    nav.go_panel(&p("a/b"));
    drain(&mut nav, &mut rx);

    assert!(nav.jump_to("a/c"));
    let h = drain(&mut nav, &mut rx).history.unwrap();
    assert_eq!(h.stack, stack(&["", "a", "a/c"]));

    assert!(nav.go_back());
    assert_eq!(drain(&mut nav, &mut rx).state.panel_path, Some(p("a")));
}

#[test]
fn jump_to_rejects_unknown_and_malformed_panels() {
    let (mut nav, mut rx) = navigator("/?m=settings&p=a");
    nav.mount();
    assert!(!nav.jump_to("nope"));
    assert!(!nav.jump_to("Bad Path"));
    assert!(nav.process_pending(&mut rx).is_empty());
    assert_eq!(nav.router().entries().len(), 1);

    assert!(nav.jump_to("/a/b"));
    assert_eq!(drain(&mut nav, &mut rx).state.panel_path, Some(p("a/b")));
}

#[test]
fn jump_to_panel_already_in_stack_only_moves_cursor() {
    let (mut nav, mut rx) = navigator("/?m=settings&p=a");
    nav.mount();
    nav.go_panel(&p("a/b"));
    drain(&mut nav, &mut rx);

    assert!(nav.jump_to(""));
    let h = drain(&mut nav, &mut rx).history.unwrap();
    assert_eq!(h.stack, stack(&["", "a", "a/b"]));
    assert_eq!(h.cursor, 0);
}

#[test]
fn commands_need_an_open_sheet() {
    let (mut nav, mut rx) = navigator("/");
    let mounted = nav.mount();
    assert!(!mounted.state.is_open());
    assert!(mounted.history.is_none());
    assert!(!nav.go_panel(&p("a")));
    assert!(!nav.jump_to("a"));
    assert!(!nav.go_back());
    assert!(!nav.go_forward());
    assert!(nav.clear_history().is_none());
    assert!(nav.process_pending(&mut rx).is_empty());
}

#[test]
fn open_sheet_uses_default_panel_and_keeps_other_params() {
    let (mut nav, mut rx) = navigator("/account?tab=2");
    nav.mount();
    nav.open_sheet(ModalId::Settings, None);
    let change = drain(&mut nav, &mut rx);
    assert_eq!(change.state.modal_id, Some(ModalId::Settings));
    assert_eq!(change.state.panel_path, Some(PanelPath::root()));
    assert_eq!(change.transition, TransitionKind::None);

    let loc = nav.router().location();
    assert_eq!(loc.pathname, "/account");
    assert!(loc.search.starts_with("tab=2&"));
}

#[test]
fn switching_modals_has_no_transition() {
    let (mut nav, mut rx) = navigator("/?m=settings&p=a");
    nav.mount();
    nav.open_sheet(ModalId::Dashboard, None);
    let change = drain(&mut nav, &mut rx);
    assert_eq!(change.state.modal_id, Some(ModalId::Dashboard));
    assert_eq!(change.previous, None);
    assert_eq!(change.transition, TransitionKind::None);
}

#[test]
fn invalid_url_panel_falls_back_to_default() {
    let (mut nav, _rx) = navigator("/?m=settings&p=zzz");
    let mounted = nav.mount();
    assert_eq!(mounted.state.panel_path, Some(PanelPath::root()));

    let (mut nav, _rx) = navigator("/?m=billing&p=a");
    assert!(!nav.mount().state.is_open());
}

#[test]
fn hard_close_clears_history_and_replaces_url() {
    let (mut nav, mut rx) = navigator("/?x=1&m=settings&p=a");
    nav.mount();
    assert!(nav.history_store().read(ModalId::Settings).is_some());

    nav.close_sheet(CloseOptions::hard());
    let change = drain(&mut nav, &mut rx);
    assert!(!change.state.is_open());
    assert_eq!(nav.router().entries().len(), 1);
    assert_eq!(nav.router().location().href(), "/?x=1");
    assert!(nav.history_store().read(ModalId::Settings).is_none());
}

#[test]
fn soft_close_of_direct_link_from_elsewhere_replaces() {
    let (router, mut rx) = MemoryRouter::new("/?m=settings&p=a/b");
    let mut nav = SheetNavigator::new(
        PanelRegistry::builtin(),
        HistoryStore::new(MemoryStore::new()),
        router,
    )
    .with_page_context(PageContext::new(
        "https://app.example.com",
        Some("https://search.example.org/?q=x".into()),
    ));
    nav.mount();

    nav.close_sheet(CloseOptions::default());
    let change = drain(&mut nav, &mut rx);
    assert!(!change.state.is_open());
    assert!(!nav.router().left_site());
    assert_eq!(nav.router().entries().len(), 1);
    // Soft close keeps the record for a later forward.
    assert!(nav.history_store().read(ModalId::Settings).is_some());
}

#[test]
fn soft_close_with_same_origin_referrer_goes_back() {
    let (router, mut rx) = MemoryRouter::new("/?m=settings&p=a");
    let mut nav = SheetNavigator::new(
        PanelRegistry::builtin(),
        HistoryStore::new(MemoryStore::new()),
        router,
    )
    .with_page_context(PageContext::new(
        "https://app.example.com",
        Some("https://app.example.com/home".into()),
    ));
    nav.mount();

    nav.close_sheet(CloseOptions::default());
    assert!(nav.router().left_site());
    assert!(nav.process_pending(&mut rx).is_empty());
}

#[test]
fn soft_close_after_opening_in_app_goes_back() {
    let (mut nav, mut rx) = navigator("/");
    nav.mount();
    nav.open_sheet(ModalId::Settings, Some(&p("a")));
    drain(&mut nav, &mut rx);

    nav.close_sheet(CloseOptions::default());
    let change = drain(&mut nav, &mut rx);
    assert!(!change.state.is_open());
    assert_eq!(change.previous, Some(p("a")));
    assert!(!nav.router().left_site());
    assert_eq!(nav.router().index(), 0);
    assert!(nav.history_store().read(ModalId::Settings).is_some());
}

#[test]
fn soft_close_after_returning_to_direct_link_entry_replaces() {
    let (mut nav, mut rx) = navigator("/?m=settings&p=a");
    nav.mount();
    nav.go_panel(&p("a/b"));
    drain(&mut nav, &mut rx);

    // Browser back to the entry the page was loaded on.
    nav.router_mut().back();
    assert_eq!(drain(&mut nav, &mut rx).state.panel_path, Some(p("a")));
    assert_eq!(nav.router().index(), 0);

    nav.close_sheet(CloseOptions::default());
    let change = drain(&mut nav, &mut rx);
    assert!(!change.state.is_open());
    assert!(!nav.router().left_site());
    assert_eq!(nav.router().location().href(), "/");
}

#[test]
fn soft_close_away_from_direct_link_entry_goes_back() {
    let (mut nav, mut rx) = navigator("/?m=settings&p=a");
    nav.mount();
    nav.go_panel(&p("a/b"));
    drain(&mut nav, &mut rx);

    nav.close_sheet(CloseOptions::default());
    let change = drain(&mut nav, &mut rx);
    assert_eq!(change.state.panel_path, Some(p("a")));
    assert!(!nav.router().left_site());
}

#[test]
fn reload_clears_history_once() {
    let shared = Rc::new(RefCell::new(MemoryStore::new()));

    let (mut first, _rx) = navigator_with("/?m=settings&p=a/b", shared.clone());
    first.mount();

    let (router, mut rx) = MemoryRouter::new("/?m=settings&p=a");
    let mut nav = SheetNavigator::new(
        PanelRegistry::builtin(),
        HistoryStore::new(shared.clone()),
        router,
    )
    .with_navigation_type(NavigationType::Reload);
    let h = nav.mount().history.unwrap();
    assert_eq!(h.stack, stack(&["", "a"]));

    nav.go_panel(&p("a/b"));
    let h = drain(&mut nav, &mut rx).history.unwrap();
    assert_eq!(h.stack, stack(&["", "a", "a/b"]));
}

#[test]
fn remount_without_reload_keeps_history() {
    let shared = Rc::new(RefCell::new(MemoryStore::new()));

    let (mut first, mut rx) = navigator_with("/?m=settings&p=a", shared.clone());
    first.mount();
    first.go_panel(&p("a/b"));
    drain(&mut first, &mut rx);

    let (mut second, _rx) = navigator_with("/?m=settings&p=a/b", shared);
    let h = second.mount().history.unwrap();
    assert_eq!(h.stack, stack(&["", "a", "a/b"]));
    assert_eq!(h.cursor, 2);
    assert!(second.can_go_back());
}

#[test]
fn unavailable_storage_disables_history_navigation() {
    let (mut nav, mut rx) = navigator_with("/?m=settings&p=a/b", UnavailableStore);
    let mounted = nav.mount();
    assert_eq!(mounted.state.panel_path, Some(p("a/b")));
    assert!(!nav.can_go_back());
    assert!(!nav.go_back());
    assert!(nav.history().is_none());

    // Navigation itself still works.
    nav.go_panel(&p("a"));
    let change = drain(&mut nav, &mut rx);
    assert_eq!(change.state.panel_path, Some(p("a")));
    assert_eq!(change.transition, TransitionKind::Back);
}

#[test]
fn forward_after_back_returns_to_the_same_entry() {
    let (mut nav, mut rx) = navigator("/?m=settings&p=a");
    nav.mount();
    nav.go_panel(&p("a/c"));
    drain(&mut nav, &mut rx);

    assert!(nav.go_back());
    drain(&mut nav, &mut rx);
    assert!(nav.go_forward());
    let change = drain(&mut nav, &mut rx);
    assert_eq!(change.state.panel_path, Some(p("a/c")));
    assert_eq!(change.history.unwrap().cursor, 2);
    assert!(!nav.go_forward());
}

#[test]
fn clear_history_keeps_only_current_panel() {
    let (mut nav, _rx) = navigator("/?m=settings&p=a/b");
    nav.mount();
    let h = nav.clear_history().unwrap();
    assert_eq!(h.stack, stack(&["a/b"]));
    assert_eq!(h.cursor, 0);
    assert!(!nav.can_go_back());
}

#[test]
fn panel_depth_prefers_registry() {
    let (nav, _rx) = navigator("/");
    assert_eq!(nav.panel_depth(""), 0);
    assert_eq!(nav.panel_depth("a"), 0);
    assert_eq!(nav.panel_depth("a/b"), 1);
    assert_eq!(nav.panel_depth("x/y/z"), 3);
}
