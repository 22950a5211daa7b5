//! Two-way binding between the URL query and `(modal, panel)`
//!
//! ## Query parameters
//!
//! - `m`: modal id, absent or unknown means the sheet is closed
//! - `p`: panel path within `m`; `""` is the root panel, absent or invalid
//!   falls back to the modal default, a leading `/` is tolerated
//!
//! Any other query parameters are carried through untouched.

use crate::registry::PanelRegistry;
use crate::router::{Location, Router};
use crate::types::{ModalId, PanelPath, ResolvedState};
use crate::validation::{default_panel_for, resolve_valid_state};

pub const MODAL_PARAM: &str = "m";
pub const PANEL_PARAM: &str = "p";

#[inline]
fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|v| v.into_owned())
        .unwrap_or(spaced)
}

/// First value of `key` in a query string (no leading `?`).
///
/// `Some("")` for `p=` or a bare `p`, `None` when the key is absent.
pub fn query_get(search: &str, key: &str) -> Option<String> {
    let qs = search.trim_start_matches('?');
    for part in qs.split('&').filter(|s| !s.is_empty()) {
        let mut it = part.splitn(2, '=');
        let k = it.next().unwrap_or_default();
        if decode_component(k) == key {
            return Some(decode_component(it.next().unwrap_or_default()));
        }
    }
    None
}

/// Rewrite `search` with the sheet parameters set (or removed when `modal`
/// is `None`). Other parameters keep their order; `m` and `p` go last.
pub fn with_sheet_params(search: &str, modal: Option<ModalId>, panel: Option<&PanelPath>) -> String {
    let qs = search.trim_start_matches('?');
    let mut parts: Vec<String> = qs
        .split('&')
        .filter(|s| !s.is_empty())
        .filter(|part| {
            let k = decode_component(part.split('=').next().unwrap_or_default());
            k != MODAL_PARAM && k != PANEL_PARAM
        })
        .map(str::to_string)
        .collect();
    if let Some(m) = modal {
        parts.push(format!("{MODAL_PARAM}={}", urlencoding::encode(m.as_str())));
        let p = panel.map(|p| p.as_str()).unwrap_or_default();
        parts.push(format!("{PANEL_PARAM}={}", urlencoding::encode(p)));
    }
    parts.join("&")
}

/// URL for `location` with the sheet parameters replaced.
///
/// An open modal with no panel gets its default panel.
pub fn build_url(
    reg: &PanelRegistry,
    location: &Location,
    modal: Option<ModalId>,
    panel: Option<&PanelPath>,
) -> String {
    let default;
    let panel = match (modal, panel) {
        (Some(m), None) => {
            default = default_panel_for(reg, m);
            Some(&default)
        }
        (_, p) => p,
    };
    Location {
        pathname: location.pathname.clone(),
        search: with_sheet_params(&location.search, modal, panel),
    }
    .href()
}

/// Current page without the sheet parameters.
pub fn base_url(location: &Location) -> String {
    Location {
        pathname: location.pathname.clone(),
        search: with_sheet_params(&location.search, None, None),
    }
    .href()
}

/// Validated state for `location`.
pub fn read_state(reg: &PanelRegistry, location: &Location) -> ResolvedState {
    let m = query_get(&location.search, MODAL_PARAM);
    let p = query_get(&location.search, PANEL_PARAM);
    resolve_valid_state(reg, m.as_deref(), p.as_deref())
}

pub fn sheet_is_open(reg: &PanelRegistry, location: &Location) -> bool {
    read_state(reg, location).is_open()
}

/// Push `(modal, panel)`; the panel defaults to the modal's default.
pub fn set_modal_panel<R: Router>(
    router: &mut R,
    reg: &PanelRegistry,
    modal: ModalId,
    panel: Option<&PanelPath>,
) {
    let url = build_url(reg, &router.location(), Some(modal), panel);
    router.push(&url);
}

/// Replace the current entry with `(modal, panel)`, or strip the sheet
/// parameters when `modal` is `None`.
pub fn replace_modal_panel<R: Router>(
    router: &mut R,
    reg: &PanelRegistry,
    modal: Option<ModalId>,
    panel: Option<&PanelPath>,
) {
    let url = build_url(reg, &router.location(), modal, panel);
    router.replace(&url);
}
