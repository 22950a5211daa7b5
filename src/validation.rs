//! Translate untrusted `m` / `p` query values into validated sheet state.
//!
//! Nothing here fails: bad input degrades to "closed" or to the modal's
//! default panel.

use crate::debug::{self, cat};
use crate::registry::PanelRegistry;
use crate::types::{ModalId, PanelPath, ResolvedState};
use regex::Regex;
use std::sync::OnceLock;

/// Canonical non-root panel path.
pub const PANEL_PATH_PATTERN: &str = r"^[a-z0-9-]+(/[a-z0-9-]+)*$";

fn panel_path_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(PANEL_PATH_PATTERN).ok()).as_ref()
}

/// Modal id from a raw value, if it names a modal present in `reg`.
pub fn parse_known_modal(reg: &PanelRegistry, raw: Option<&str>) -> Option<ModalId> {
    let modal: ModalId = raw?.parse().ok()?;
    reg.contains_modal(modal).then_some(modal)
}

pub fn is_known_modal(reg: &PanelRegistry, raw: Option<&str>) -> bool {
    parse_known_modal(reg, raw).is_some()
}

/// `""` (root) or a canonical slash-joined path.
pub fn is_valid_panel_string(raw: &str) -> bool {
    if raw.is_empty() {
        return true;
    }
    panel_path_re().is_some_and(|re| re.is_match(raw))
}

/// Canonical path or `None`, no normalization.
pub fn sanitize_panel_path(raw: Option<&str>) -> Option<PanelPath> {
    PanelPath::parse(raw?)
}

/// The panel a modal opens on when none (or garbage) is requested.
///
/// Unregistered modals fall back to the root panel.
pub fn default_panel_for(reg: &PanelRegistry, modal: ModalId) -> PanelPath {
    reg.default_panel(modal).cloned().unwrap_or_default()
}

/// Normalize a raw panel value for `modal`.
///
/// - absent or blank: `None`, the caller falls back to the default
/// - `"/"`: the modal's default panel
/// - one leading `/` is stripped, the rest must be canonical
pub fn normalize_panel_for(
    reg: &PanelRegistry,
    modal: ModalId,
    raw: Option<&str>,
) -> Option<PanelPath> {
    let s = raw?.trim();
    if s.is_empty() {
        return None;
    }
    if s == "/" {
        return Some(default_panel_for(reg, modal));
    }
    let s = s.strip_prefix('/').unwrap_or(s);
    PanelPath::parse(s)
}

pub fn is_known_panel(reg: &PanelRegistry, modal: ModalId, path: &str) -> bool {
    reg.lookup(modal, path).is_some()
}

/// Resolve raw URL parameters into a registered `(modal, panel)` pair.
///
/// Unknown modal: closed. Otherwise the requested panel if it normalizes to a
/// registered one, else the modal's default. An explicit empty `p` requests
/// the root panel.
pub fn resolve_valid_state(
    reg: &PanelRegistry,
    m_raw: Option<&str>,
    p_raw: Option<&str>,
) -> ResolvedState {
    let Some(modal) = parse_known_modal(reg, m_raw) else {
        return ResolvedState::closed();
    };
    let requested = match p_raw {
        Some("") => Some(PanelPath::root()),
        other => normalize_panel_for(reg, modal, other),
    };
    if let Some(panel) = requested {
        if is_known_panel(reg, modal, panel.as_str()) {
            return ResolvedState::open(modal, panel);
        }
        debug::log(
            cat::VALIDATE,
            format!("unregistered panel '{panel}' for {modal}, using default"),
        );
    }
    ResolvedState::open(modal, default_panel_for(reg, modal))
}
