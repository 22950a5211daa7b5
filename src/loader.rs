//! Panel content loading with cancellation-by-staleness
//!
//! Every request bumps a generation counter. A load that resolves after a
//! newer request was made is discarded: it never reaches the cache and is
//! never reported as current. Requests for unregistered panels produce no
//! ticket at all.

use crate::cache::SharedPanelCache;
use crate::debug::{self, cat};
use crate::registry::PanelRegistry;
use crate::types::{ModalId, PanelPath};
use anyhow::Result;
use async_trait::async_trait;

/// Where panel content comes from (component import, fetch, ...).
#[async_trait(?Send)]
pub trait PanelSource {
    type Content: Clone;

    async fn load(&self, modal: ModalId, path: &PanelPath) -> Result<Self::Content>;
}

/// Handle for one in-flight load.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadTicket {
    pub modal: ModalId,
    pub path: PanelPath,
    generation: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadOutcome<C> {
    /// Loaded for the current request and cached.
    Ready(C),
    /// Superseded by a newer request; dropped.
    Stale,
    /// Load failed; render the registry fallback if there is one.
    Failed { fallback: Option<String> },
}

/// Registry placeholder for `(modal, path)`.
pub fn fallback_for(reg: &PanelRegistry, modal: ModalId, path: &str) -> Option<String> {
    reg.lookup(modal, path)?.fallback.clone()
}

/// Run `source` for `ticket`. Kept free of the loader so newer requests can
/// be issued while this is pending.
pub async fn fetch<S: PanelSource>(source: &S, ticket: LoadTicket) -> (LoadTicket, Result<S::Content>) {
    let res = source.load(ticket.modal, &ticket.path).await;
    (ticket, res)
}

pub struct PanelLoader<C> {
    generation: u64,
    current: Option<LoadTicket>,
    cache: SharedPanelCache<C>,
}

impl<C: Clone> PanelLoader<C> {
    pub fn new(cache: SharedPanelCache<C>) -> Self {
        PanelLoader {
            generation: 0,
            current: None,
            cache,
        }
    }

    pub fn cache(&self) -> &SharedPanelCache<C> {
        &self.cache
    }

    /// Start loading the panel now requested. Any earlier ticket goes stale,
    /// including when the sheet closed or the panel is not registered.
    pub fn request(
        &mut self,
        reg: &PanelRegistry,
        modal: Option<ModalId>,
        path: Option<&PanelPath>,
    ) -> Option<LoadTicket> {
        self.generation += 1;
        self.current = None;
        let (modal, path) = (modal?, path?);
        if reg.lookup(modal, path.as_str()).is_none() {
            debug::log(cat::LOADER, format!("no registry entry for {modal}/{path}"));
            return None;
        }
        let ticket = LoadTicket {
            modal,
            path: path.clone(),
            generation: self.generation,
        };
        debug::log(cat::LOADER, format!("request #{} {modal}/{path}", self.generation));
        self.current = Some(ticket.clone());
        Some(ticket)
    }

    pub fn is_current(&self, ticket: &LoadTicket) -> bool {
        self.current.as_ref() == Some(ticket)
    }

    /// Accept or discard the result for `ticket`.
    pub fn complete(
        &mut self,
        reg: &PanelRegistry,
        ticket: &LoadTicket,
        result: Result<C>,
    ) -> LoadOutcome<C> {
        if !self.is_current(ticket) {
            debug::log(
                cat::LOADER,
                format!("discarding stale load #{} {}", ticket.generation, ticket.path),
            );
            return LoadOutcome::Stale;
        }
        match result {
            Ok(content) => {
                self.cache
                    .borrow_mut()
                    .set(ticket.path.clone(), content.clone());
                LoadOutcome::Ready(content)
            }
            Err(e) => {
                log::warn!("panel {}/{} failed to load: {e:#}", ticket.modal, ticket.path);
                LoadOutcome::Failed {
                    fallback: fallback_for(reg, ticket.modal, ticket.path.as_str()),
                }
            }
        }
    }
}
