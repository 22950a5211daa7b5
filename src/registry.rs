//! Panel registry: which panels exist for which modal.
//!
//! Explicit lookups over a typed table keyed by [`ModalId`] and canonical
//! [`PanelPath`]s. Tables come from [`PanelRegistry::builtin`] or from the
//! `[modals.*]` section of the config file.

use crate::types::{ModalId, PanelPath};
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;

/// Registry metadata for one panel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PanelDef {
    /// Segment count minus one; 0 for the root and top-level panels.
    pub depth: usize,
    /// Placeholder content shown while the panel loads.
    pub fallback: Option<String>,
    /// Panels worth warming when this one is shown.
    pub neighbors: Vec<PanelPath>,
}

impl PanelDef {
    pub fn for_path(path: &PanelPath) -> Self {
        PanelDef {
            depth: depth_for(path),
            fallback: None,
            neighbors: Vec::new(),
        }
    }
}

#[inline]
fn depth_for(path: &PanelPath) -> usize {
    path.segments().len().saturating_sub(1)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModalEntry {
    pub default_panel: PanelPath,
    pub panels: BTreeMap<PanelPath, PanelDef>,
}

/// Declarative modal description (config file form).
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct ModalSpec {
    #[serde(default)]
    pub default: String,
    #[serde(default)]
    pub panels: Vec<PanelSpec>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct PanelSpec {
    pub path: String,
    #[serde(default)]
    pub fallback: Option<String>,
    #[serde(default)]
    pub neighbors: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PanelRegistry {
    modals: BTreeMap<ModalId, ModalEntry>,
}

impl PanelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The registry shipped with the app: `dashboard` and `settings`, both
    /// rooted at `""`.
    pub fn builtin() -> Self {
        let mut reg = PanelRegistry::new();
        let root = PanelPath::root();
        reg.insert_modal(ModalId::Dashboard, root.clone());
        reg.insert_modal(ModalId::Settings, root.clone());
        for raw in ["", "a", "a/b", "a/c", "d"] {
            let path = PanelPath::from_canonical(raw.to_string());
            let def = PanelDef::for_path(&path);
            reg.insert_panel(ModalId::Settings, path, def);
        }
        reg.insert_panel(ModalId::Dashboard, root.clone(), PanelDef::for_path(&root));
        reg
    }

    /// Build from config specs keyed by modal id string.
    ///
    /// Every default panel must itself be registered, and paths must be
    /// canonical and unique per modal.
    pub fn from_specs(specs: &BTreeMap<String, ModalSpec>) -> Result<Self> {
        let mut reg = PanelRegistry::new();
        for (raw_id, spec) in specs {
            let modal: ModalId = raw_id.parse().context("in [modals] table")?;
            let default = PanelPath::parse(&spec.default)
                .with_context(|| format!("modal '{modal}': invalid default panel '{}'", spec.default))?;
            reg.insert_modal(modal, default.clone());
            for p in &spec.panels {
                let path = PanelPath::parse(&p.path)
                    .with_context(|| format!("modal '{modal}': invalid panel path '{}'", p.path))?;
                let neighbors = p
                    .neighbors
                    .iter()
                    .map(|n| {
                        PanelPath::parse(n)
                            .with_context(|| format!("modal '{modal}': invalid neighbor '{n}'"))
                    })
                    .collect::<Result<Vec<_>>>()?;
                let def = PanelDef {
                    depth: depth_for(&path),
                    fallback: p.fallback.clone(),
                    neighbors,
                };
                if !reg.insert_panel(modal, path.clone(), def) {
                    bail!("modal '{modal}': duplicate panel '{path}'");
                }
            }
            if reg.lookup(modal, default.as_str()).is_none() {
                bail!("modal '{modal}': default panel '{default}' is not registered");
            }
        }
        Ok(reg)
    }

    /// Register a modal with its default panel. Existing panels are kept.
    pub fn insert_modal(&mut self, modal: ModalId, default_panel: PanelPath) {
        self.modals
            .entry(modal)
            .and_modify(|e| e.default_panel = default_panel.clone())
            .or_insert_with(|| ModalEntry {
                default_panel,
                panels: BTreeMap::new(),
            });
    }

    /// Register a panel; returns false if `(modal, path)` already exists or
    /// the modal is unknown.
    pub fn insert_panel(&mut self, modal: ModalId, path: PanelPath, def: PanelDef) -> bool {
        let Some(entry) = self.modals.get_mut(&modal) else {
            return false;
        };
        if entry.panels.contains_key(&path) {
            return false;
        }
        entry.panels.insert(path, def);
        true
    }

    pub fn contains_modal(&self, modal: ModalId) -> bool {
        self.modals.contains_key(&modal)
    }

    pub fn modals(&self) -> impl Iterator<Item = ModalId> + '_ {
        self.modals.keys().copied()
    }

    pub fn entry(&self, modal: ModalId) -> Option<&ModalEntry> {
        self.modals.get(&modal)
    }

    /// Panel definition for `(modal, path)`, if registered.
    pub fn lookup(&self, modal: ModalId, path: &str) -> Option<&PanelDef> {
        self.modals.get(&modal)?.panels.get(path)
    }

    pub fn default_panel(&self, modal: ModalId) -> Option<&PanelPath> {
        self.modals.get(&modal).map(|e| &e.default_panel)
    }

    /// Registered depth of `path` in whichever modal has it first.
    pub fn depth_of(&self, path: &str) -> Option<usize> {
        self.modals
            .values()
            .find_map(|e| e.panels.get(path).map(|d| d.depth))
    }
}
