use crate::cache::DEFAULT_KEEP_ALIVE;
use crate::history::DEFAULT_KEY_PREFIX;
use crate::registry::{ModalSpec, PanelRegistry};
use anyhow::{anyhow, Context, Result};
use clap::Parser;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// sheetnav - bottom-sheet navigation driver
///
/// Replays navigation commands against an in-memory router and session store
/// and prints the resulting sheet state after each one.
/// Configuration priority: CLI args > Environment variables > Config file > Defaults
#[derive(Parser, Debug, Default)]
#[command(name = "sheetnav")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Bottom-sheet navigation state driver", long_about = None)]
pub struct CliArgs {
    /// TOML config file (cache size, key prefix, modal registry)
    #[arg(short, long, env = "SHEETNAV_CONFIG")]
    pub config: Option<PathBuf>,

    /// Panels kept in the content cache (1-64)
    #[arg(long, env = "SHEETNAV_KEEP_ALIVE")]
    pub keep_alive_panels: Option<usize>,

    /// Session storage key prefix for history records
    #[arg(long, env = "SHEETNAV_KEY_PREFIX")]
    pub history_key_prefix: Option<String>,

    /// Debug categories, comma-separated (history,router,cache,loader,validate,nav,all)
    #[arg(long, env = "SHEETNAV_DEBUG")]
    pub debug: Option<String>,

    /// Initial page URL (path and query), e.g. "/?m=settings&p=a/b"
    #[arg(long, default_value = "/")]
    pub url: String,

    /// Page origin used for the referrer check
    #[arg(long, default_value = "https://app.local")]
    pub origin: String,

    /// document.referrer of the initial page load
    #[arg(long)]
    pub referrer: Option<String>,

    /// Treat the initial load as a browser reload
    #[arg(long)]
    pub reload: bool,

    /// Command to run (repeatable); reads commands from stdin when absent
    #[arg(short = 'e', long = "exec")]
    pub exec: Vec<String>,
}

/// On-disk form of the config file.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub keep_alive_panels: Option<usize>,
    pub history_key_prefix: Option<String>,
    pub debug: Option<String>,
    pub modals: BTreeMap<String, ModalSpec>,
}

impl FileConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        toml::from_str(raw).context("invalid sheetnav config")
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        log::info!("Loading configuration from {}", path.display());
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Self::from_toml_str(&raw).with_context(|| format!("in {}", path.display()))
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub keep_alive_panels: usize,
    pub history_key_prefix: String,
    pub debug: Option<String>,
    pub registry: PanelRegistry,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            keep_alive_panels: DEFAULT_KEEP_ALIVE,
            history_key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            debug: None,
            registry: PanelRegistry::builtin(),
        }
    }
}

/// Validate that a value is within a given range (inclusive)
fn validate_in_range<T>(val: T, min: T, max: T, name: &str) -> Result<T>
where
    T: PartialOrd + std::fmt::Display + Copy,
{
    if val < min || val > max {
        Err(anyhow!("{name} must be in range [{min}, {max}], got {val}"))
    } else {
        Ok(val)
    }
}

fn validate_prefix(prefix: &str) -> Result<()> {
    if prefix.is_empty() {
        return Err(anyhow!("history_key_prefix cannot be empty"));
    }
    Ok(())
}

impl Config {
    /// Apply a parsed file on top of the defaults. An empty `[modals]` table
    /// keeps the built-in registry.
    pub fn from_file_config(file: FileConfig) -> Result<Self> {
        let mut cfg = Config::default();
        if let Some(n) = file.keep_alive_panels {
            cfg.keep_alive_panels = validate_in_range(n, 1, 64, "keep_alive_panels")?;
        }
        if let Some(prefix) = file.history_key_prefix {
            validate_prefix(&prefix)?;
            cfg.history_key_prefix = prefix;
        }
        cfg.debug = file.debug;
        if !file.modals.is_empty() {
            cfg.registry = PanelRegistry::from_specs(&file.modals)?;
        }
        Ok(cfg)
    }

    pub fn log_summary(&self) {
        log::info!("sheetnav configuration:");
        log::info!("  Keep-alive panels: {}", self.keep_alive_panels);
        log::info!("  History key prefix: {}", self.history_key_prefix);
        for modal in self.registry.modals() {
            if let Some(entry) = self.registry.entry(modal) {
                log::info!(
                    "  Modal {modal}: {} panels, default '{}'",
                    entry.panels.len(),
                    entry.default_panel
                );
            }
        }
    }
}

/// Merge CLI/env over the config file over defaults.
pub fn resolve(args: &CliArgs) -> Result<Config> {
    let file = match &args.config {
        Some(path) => FileConfig::from_path(path)?,
        None => FileConfig::default(),
    };
    let mut cfg = Config::from_file_config(file)?;

    if let Some(n) = args.keep_alive_panels {
        cfg.keep_alive_panels = validate_in_range(n, 1, 64, "SHEETNAV_KEEP_ALIVE")?;
    }
    if let Some(prefix) = &args.history_key_prefix {
        validate_prefix(prefix)?;
        cfg.history_key_prefix = prefix.clone();
    }
    if args.debug.is_some() {
        cfg.debug = args.debug.clone();
    }
    Ok(cfg)
}

/// Load configuration from CLI args, environment and config file.
pub fn load() -> Result<(CliArgs, Config)> {
    let args = CliArgs::parse();
    let cfg = resolve(&args)?;
    Ok((args, cfg))
}
