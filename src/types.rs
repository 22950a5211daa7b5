use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Known modal identifiers.
///
/// Closed set: anything else arriving through the URL means "sheet closed".
/// A variant is only treated as known when the active registry carries it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModalId {
    Settings,
    Dashboard,
}

impl ModalId {
    pub const ALL: [ModalId; 2] = [ModalId::Settings, ModalId::Dashboard];

    pub fn as_str(self) -> &'static str {
        match self {
            ModalId::Settings => "settings",
            ModalId::Dashboard => "dashboard",
        }
    }
}

impl std::str::FromStr for ModalId {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "settings" => Ok(ModalId::Settings),
            "dashboard" => Ok(ModalId::Dashboard),
            _ => Err(anyhow!("Unknown modal '{s}'. Valid options: settings, dashboard")),
        }
    }
}

impl fmt::Display for ModalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Hierarchical, slash-delimited panel address within a modal.
///
/// Always stored in canonical form: no leading or trailing slash, every
/// segment matching `[a-z0-9-]+`. The empty path is the modal's root panel,
/// which is distinct from "no panel" (`Option::None` at call sites).
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PanelPath(String);

impl PanelPath {
    /// The modal's root panel (`""`).
    pub fn root() -> Self {
        PanelPath(String::new())
    }

    /// Accepts a path already in canonical form; returns `None` otherwise.
    ///
    /// No trimming or slash stripping happens here, see
    /// [`crate::validation::normalize_panel_for`] for untrusted input.
    pub fn parse(raw: &str) -> Option<Self> {
        if crate::validation::is_valid_panel_string(raw) {
            Some(PanelPath(raw.to_string()))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Non-empty segments, root yields none.
    pub fn segments(&self) -> Vec<&str> {
        crate::path::split_segments(&self.0)
    }

    /// Builds a path from segments known to be canonical.
    pub(crate) fn from_canonical(raw: String) -> Self {
        PanelPath(raw)
    }
}

impl TryFrom<String> for PanelPath {
    type Error = anyhow::Error;
    fn try_from(raw: String) -> Result<Self> {
        if crate::validation::is_valid_panel_string(&raw) {
            Ok(PanelPath(raw))
        } else {
            Err(anyhow!("invalid panel path '{raw}'"))
        }
    }
}

impl From<PanelPath> for String {
    fn from(p: PanelPath) -> String {
        p.0
    }
}

impl AsRef<str> for PanelPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for PanelPath {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PanelPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Visited panels for one modal plus the cursor marking the current entry.
///
/// Persisted as `{"stack": [...], "cursor": n}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetHistory {
    pub stack: Vec<PanelPath>,
    pub cursor: usize,
}

impl SheetHistory {
    /// Single-entry history positioned on `panel`.
    pub fn single(panel: PanelPath) -> Self {
        SheetHistory {
            stack: vec![panel],
            cursor: 0,
        }
    }

    pub fn current(&self) -> Option<&PanelPath> {
        self.stack.get(self.cursor)
    }

    pub fn can_go_back(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_go_forward(&self) -> bool {
        self.cursor + 1 < self.stack.len()
    }

    /// First index holding `panel`.
    pub fn position(&self, panel: &PanelPath) -> Option<usize> {
        self.stack.iter().position(|p| p == panel)
    }

    /// `0 <= cursor < stack.len()` for a non-empty stack.
    pub fn is_consistent(&self) -> bool {
        !self.stack.is_empty() && self.cursor < self.stack.len()
    }
}

/// Validated `(modal, panel)` pair derived from the URL.
///
/// `modal_id == None` means the sheet is closed; then `panel_path` is `None`
/// as well.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResolvedState {
    pub modal_id: Option<ModalId>,
    pub panel_path: Option<PanelPath>,
}

impl ResolvedState {
    pub fn closed() -> Self {
        ResolvedState::default()
    }

    pub fn open(modal_id: ModalId, panel_path: PanelPath) -> Self {
        ResolvedState {
            modal_id: Some(modal_id),
            panel_path: Some(panel_path),
        }
    }

    pub fn is_open(&self) -> bool {
        self.modal_id.is_some()
    }
}
