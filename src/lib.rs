//! sheetnav - URL-synchronized navigation state for a bottom-sheet modal
//!
//! The sheet is addressed by two query parameters, `m` (modal id) and `p`
//! (slash-delimited panel path). This crate turns those into validated state,
//! keeps a per-modal history stack in session storage in step with the
//! browser's own history, classifies panel transitions for animation, and
//! caches rendered panels for instant peeks.
//!
//! ## Architecture
//!
//! - **Core** (all platforms): path model, transition classifier, registry,
//!   validation, history store, URL binder, navigation facade, panel cache
//!   and loader. Storage and routing are traits so the core runs natively
//!   with in-memory doubles.
//! - **Web** (`--features web`, wasm32): `sessionStorage`, `window.history`
//!   and popstate adapters.
//!
//! ## Usage
//!
//! ```rust
//! use sheetnav::{HistoryStore, MemoryRouter, MemoryStore, PanelRegistry, SheetNavigator, ModalId};
//!
//! let (router, mut events) = MemoryRouter::new("/?m=settings&p=a/b");
//! let mut nav = SheetNavigator::new(PanelRegistry::builtin(), HistoryStore::new(MemoryStore::new()), router);
//! nav.mount();
//! assert!(nav.can_go_back());
//! nav.go_back();
//! nav.process_pending(&mut events);
//! assert_eq!(nav.panel_path().map(|p| p.as_str()), Some(""));
//! assert_eq!(nav.modal_id(), Some(ModalId::Settings));
//! ```

// Core modules (available on all platforms)
pub mod path;
pub mod registry;
pub mod transition;
pub mod types;
pub mod validation;

// Persistence and routing seams
pub mod history;
pub mod router;
pub mod storage;
pub mod url_state;

// Public navigation surface
pub mod navigation;

// Rendering support
pub mod cache;
pub mod loader;

// Configuration (TOML file + CLI/env)
pub mod config;

// Debug logging system (available on all platforms)
pub mod debug;

// Browser adapters (wasm32 + web feature only)
#[cfg(all(target_arch = "wasm32", feature = "web"))]
pub mod web;

// Re-export commonly used types
pub use cache::PanelCache;
pub use history::{HistoryStore, NavigationType};
pub use navigation::{CloseOptions, PageContext, RouteChange, SheetNavigator};
pub use registry::PanelRegistry;
pub use router::{Location, MemoryRouter, RouteEvent, RouteEventKind, Router};
pub use storage::{MemoryStore, SessionStore, UnavailableStore};
pub use transition::{determine_transition, TransitionKind};
pub use types::{ModalId, PanelPath, ResolvedState, SheetHistory};
