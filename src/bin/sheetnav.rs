//! sheetnav - drive the bottom-sheet navigator from a command script
//!
//! Each line is one command; the resulting sheet state is printed after it.
//!
//! ```text
//! open settings a/b    jump d       go a
//! back                 forward      pop-back     pop-forward
//! close                close --hard clear        state        cache
//! ```

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use futures::executor::block_on;
use sheetnav::config::{self, Config};
use sheetnav::debug;
use sheetnav::loader::{fetch, LoadOutcome, PanelLoader, PanelSource};
use sheetnav::router::RouteEventReceiver;
use sheetnav::{
    CloseOptions, HistoryStore, MemoryRouter, MemoryStore, ModalId, NavigationType, PageContext,
    PanelCache, PanelPath, RouteChange, Router, SheetNavigator,
};
use std::io::{self, BufRead};

type Navigator = SheetNavigator<MemoryStore, MemoryRouter>;

/// Renders a panel as `modal:path`.
struct LabelSource;

#[async_trait(?Send)]
impl PanelSource for LabelSource {
    type Content = String;

    async fn load(&self, modal: ModalId, path: &PanelPath) -> Result<String> {
        if path.is_root() {
            Ok(format!("{modal}:<root>"))
        } else {
            Ok(format!("{modal}:{path}"))
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Open(ModalId, Option<PanelPath>),
    Go(PanelPath),
    Jump(String),
    Back,
    Forward,
    PopBack,
    PopForward,
    Close { hard: bool },
    Clear,
    State,
    Cache,
}

impl Command {
    fn parse(line: &str) -> Result<Option<Command>> {
        let mut words = line.split_whitespace();
        let Some(head) = words.next() else {
            return Ok(None);
        };
        if head.starts_with('#') {
            return Ok(None);
        }
        let arg = words.next();
        let cmd = match head {
            "open" => {
                let modal: ModalId = arg.ok_or_else(|| anyhow!("open needs a modal"))?.parse()?;
                let panel = match words.next() {
                    Some(raw) => Some(parse_panel(raw)?),
                    None => None,
                };
                Command::Open(modal, panel)
            }
            "go" => Command::Go(parse_panel(arg.unwrap_or(""))?),
            "jump" => Command::Jump(arg.unwrap_or("").to_string()),
            "back" => Command::Back,
            "forward" => Command::Forward,
            "pop-back" => Command::PopBack,
            "pop-forward" => Command::PopForward,
            "close" => match arg {
                None => Command::Close { hard: false },
                Some("--hard") => Command::Close { hard: true },
                Some(other) => bail!("unknown close flag '{other}'"),
            },
            "clear" => Command::Clear,
            "state" => Command::State,
            "cache" => Command::Cache,
            other => bail!("unknown command '{other}'"),
        };
        Ok(Some(cmd))
    }
}

fn parse_panel(raw: &str) -> Result<PanelPath> {
    if raw == "/" || raw.is_empty() {
        return Ok(PanelPath::root());
    }
    PanelPath::parse(raw).ok_or_else(|| anyhow!("invalid panel path '{raw}'"))
}

struct Driver {
    nav: Navigator,
    events: RouteEventReceiver,
    loader: PanelLoader<String>,
}

impl Driver {
    fn new(args: &config::CliArgs, cfg: &Config) -> Self {
        let (router, events) = MemoryRouter::new(&args.url);
        let store = HistoryStore::with_prefix(MemoryStore::new(), &cfg.history_key_prefix);
        let nav_type = if args.reload {
            NavigationType::Reload
        } else {
            NavigationType::Navigate
        };
        let nav = SheetNavigator::new(cfg.registry.clone(), store, router)
            .with_page_context(PageContext::new(args.origin.clone(), args.referrer.clone()))
            .with_navigation_type(nav_type);
        Driver {
            nav,
            events,
            loader: PanelLoader::new(PanelCache::shared(cfg.keep_alive_panels)),
        }
    }

    fn mount(&mut self) {
        let change = self.nav.mount();
        self.render(&change);
    }

    fn run(&mut self, cmd: Command) {
        match cmd {
            Command::Open(modal, panel) => self.nav.open_sheet(modal, panel.as_ref()),
            Command::Go(panel) => {
                if !self.nav.go_panel(&panel) {
                    println!("  (no sheet open)");
                }
            }
            Command::Jump(raw) => {
                if !self.nav.jump_to(&raw) {
                    println!("  (jump to '{raw}' ignored)");
                }
            }
            Command::Back => {
                if !self.nav.go_back() {
                    println!("  (nothing behind)");
                }
            }
            Command::Forward => {
                if !self.nav.go_forward() {
                    println!("  (nothing ahead)");
                }
            }
            Command::PopBack => self.nav.router_mut().back(),
            Command::PopForward => self.nav.router_mut().forward(),
            Command::Close { hard } => self.nav.close_sheet(CloseOptions { hard }),
            Command::Clear => {
                if self.nav.clear_history().is_none() {
                    println!("  (no sheet open)");
                }
            }
            Command::State => self.print_state(),
            Command::Cache => {
                let keys: Vec<String> = self
                    .loader
                    .cache()
                    .borrow()
                    .keys()
                    .iter()
                    .map(|k| format!("'{k}'"))
                    .collect();
                println!("  cache [{}]", keys.join(", "));
            }
        }

        for change in self.nav.process_pending(&mut self.events) {
            self.render(&change);
        }
        if self.nav.router().left_site() {
            println!("  (navigated away from the site)");
        }
    }

    fn render(&mut self, change: &RouteChange) {
        let url = self.nav.router().location().href();
        match (change.state.modal_id, change.state.panel_path.as_ref()) {
            (Some(modal), Some(panel)) => {
                let history = change
                    .history
                    .as_ref()
                    .map(|h| {
                        let stack: Vec<String> = h.stack.iter().map(|p| format!("'{p}'")).collect();
                        format!("[{}]@{}", stack.join(", "), h.cursor)
                    })
                    .unwrap_or_else(|| "-".into());
                println!(
                    "  {url}  open {modal}/'{panel}'  {}  history {history}",
                    change.transition
                );
            }
            _ => println!("  {url}  closed"),
        }

        let registry = self.nav.registry().clone();
        let ticket = self
            .loader
            .request(&registry, change.state.modal_id, change.state.panel_path.as_ref());
        if let Some(ticket) = ticket {
            let (ticket, result) = block_on(fetch(&LabelSource, ticket));
            match self.loader.complete(&registry, &ticket, result) {
                LoadOutcome::Ready(content) => log::debug!("rendered {content}"),
                LoadOutcome::Stale => {}
                LoadOutcome::Failed { fallback } => {
                    println!("  {}", fallback.unwrap_or_else(|| "(panel unavailable)".into()))
                }
            }
        }
    }

    fn print_state(&self) {
        let state = self.nav.state();
        let Some(modal) = state.modal_id else {
            println!("  closed");
            return;
        };
        let panel = state.panel_path.clone().unwrap_or_default();
        println!(
            "  {modal}/'{panel}' depth {} back={} forward={}",
            self.nav.panel_depth(panel.as_str()),
            self.nav.can_go_back(),
            self.nav.can_go_forward()
        );
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let (args, cfg) = config::load().context("Failed to load configuration")?;
    if let Some(list) = &cfg.debug {
        debug::set_from_list(list);
    }
    cfg.log_summary();

    let mut driver = Driver::new(&args, &cfg);
    driver.mount();

    let lines: Vec<String> = if args.exec.is_empty() {
        io::stdin()
            .lock()
            .lines()
            .collect::<io::Result<_>>()
            .context("reading commands from stdin")?
    } else {
        args.exec.clone()
    };

    for line in lines {
        match Command::parse(&line) {
            Ok(Some(cmd)) => {
                println!("> {}", line.trim());
                driver.run(cmd);
            }
            Ok(None) => {}
            Err(e) => eprintln!("error: {e:#}"),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            Command::parse("open settings a/b").unwrap(),
            Some(Command::Open(ModalId::Settings, PanelPath::parse("a/b")))
        );
        assert_eq!(
            Command::parse("open dashboard").unwrap(),
            Some(Command::Open(ModalId::Dashboard, None))
        );
        assert_eq!(
            Command::parse("close --hard").unwrap(),
            Some(Command::Close { hard: true })
        );
        assert_eq!(Command::parse("go /").unwrap(), Some(Command::Go(PanelPath::root())));
        assert_eq!(Command::parse("   ").unwrap(), None);
        assert_eq!(Command::parse("# comment").unwrap(), None);
    }

    #[test]
    fn test_parse_errors() {
        assert!(Command::parse("open").is_err());
        assert!(Command::parse("open billing").is_err());
        assert!(Command::parse("go A/B").is_err());
        assert!(Command::parse("close softly").is_err());
        assert!(Command::parse("fly").is_err());
    }
}
