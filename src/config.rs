// src/config.rs  —  Runtime configuration (CLI + TOML)
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::i18n::{self, AnySource, DirSource, Languages};
#[cfg(feature = "fetch-http")]
use crate::i18n::HttpSource;
use crate::store::{FileStore, MemoryStore, NullStore, PreferenceStore};

/// The example config is embedded directly in the binary at compile time.
/// Users can write it out with:  pusho-i18n --write-config
pub const DEFAULT_CONFIG_TOML: &str = include_str!("../config.toml.example");

// ── CLI ───────────────────────────────────────────────────────────────────────
#[derive(Parser, Debug, Default)]
#[command(
    name        = "pusho-i18n",
    about       = "Pusho website translator  |  language preference, dictionaries, page rewriting",
    version,
)]
pub struct Cli {
    /// Config file path (default: ~/.config/pusho-i18n/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Use this language for this run only (stored preference is left alone)
    #[arg(long, global = true)]
    pub lang: Option<String>,

    /// Locale to fall back on when no preference is stored (default: system locale)
    #[arg(long, global = true)]
    pub locale: Option<String>,

    /// Site origin to fetch dictionaries from (e.g. https://example.org)
    #[arg(long, global = true)]
    pub origin: Option<String>,

    /// Local directory holding i18n/<lang>.json (overrides --origin)
    #[arg(long, global = true)]
    pub site_root: Option<PathBuf>,

    /// Base URL of the site (default: page's <meta name="base-url">, else /pusho-website/)
    #[arg(long, global = true)]
    pub base: Option<String>,

    /// Preference file (default: ~/.config/pusho-i18n/storage.toml)
    #[arg(long, global = true)]
    pub storage: Option<PathBuf>,

    /// Do not read or write the stored language preference
    #[arg(long, action, global = true)]
    pub no_persist: bool,

    /// Write the built-in default config.toml to the config path and exit.
    /// Use --config <PATH> to write to a custom location.
    #[arg(long, action)]
    pub write_config: bool,

    /// Print the built-in default config.toml to stdout and exit
    #[arg(long, action)]
    pub print_config: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Translate an HTML page and write the result
    Translate {
        /// Input page
        input: PathBuf,
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print translations for dotted keys (all entries when no key is given)
    T {
        keys: Vec<String>,
    },
    /// Switch language and remember it
    Switch {
        lang: String,
    },
    /// Show the active language and where it came from
    Current,
    /// Preview a page in the terminal with a working language switcher
    Preview {
        input: PathBuf,
    },
}

// ── TOML file structure ───────────────────────────────────────────────────────
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    pub languages: Option<LanguagesCfg>,
    pub site:      Option<SiteCfg>,
    pub storage:   Option<StorageCfg>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguagesCfg {
    pub supported: Option<Vec<String>>,
    pub default:   Option<String>,
    /// Locale override (instead of the system locale)
    pub locale:    Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteCfg {
    pub origin:    Option<String>,
    pub site_root: Option<PathBuf>,
    pub base:      Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageCfg {
    pub path:    Option<PathBuf>,
    pub persist: Option<bool>,
}

// ── Resolved / merged config ──────────────────────────────────────────────────
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supported:    Vec<String>,
    pub default_lang: String,
    /// One-shot language (--lang); bypasses the stored preference
    pub lang:         Option<String>,
    pub locale:       Option<String>,
    pub origin:       Option<String>,
    pub site_root:    Option<PathBuf>,
    pub base:         Option<String>,
    pub storage_path: PathBuf,
    pub persist:      bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            supported:    vec!["it".into(), "en".into()],
            default_lang: "it".into(),
            lang:         None,
            locale:       None,
            origin:       None,
            site_root:    None,
            base:         None,
            storage_path: config_dir().join("storage.toml"),
            persist:      true,
        }
    }
}

// ── Config loader ─────────────────────────────────────────────────────────────
impl AppConfig {
    /// Write the embedded default config to disk.
    /// Returns the path it was written to.
    pub fn write_default_config(cli: &Cli) -> Result<PathBuf> {
        let path = cli.config.clone().unwrap_or_else(default_config_path);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Creating config directory {:?}", parent))?;
        }
        std::fs::write(&path, DEFAULT_CONFIG_TOML)
            .with_context(|| format!("Writing config to {:?}", path))?;
        Ok(path)
    }

    pub fn load(cli: &Cli) -> Result<Self> {
        let mut cfg = Self::default();

        // 1. Load TOML file
        let path = cli.config.clone().unwrap_or_else(default_config_path);
        if path.exists() {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("Reading config {:?}", path))?;
            let fc: FileConfig = toml::from_str(&raw)
                .with_context(|| format!("Parsing config {:?}", path))?;
            cfg.apply_file(&fc);
        } else if cli.config.is_some() {
            anyhow::bail!("Config file {:?} does not exist", path);
        } else {
            log::debug!("[config] no config file at {}, using defaults", path.display());
        }

        // 2. Apply CLI overrides
        cfg.apply_cli(cli);

        // 3. Validate
        cfg.languages().context("Invalid [languages] configuration")?;
        Ok(cfg)
    }

    pub fn languages(&self) -> Result<Languages> {
        Languages::from_codes(&self.supported, &self.default_lang)
    }

    /// Locale used when nothing is stored: configured, else the system's
    pub fn effective_locale(&self) -> Option<String> {
        self.locale.clone().or_else(i18n::system_locale)
    }

    /// Pick the dictionary source: --site-root, then --origin, then `fallback_root`
    pub fn create_source(&self, fallback_root: Option<&Path>) -> Result<AnySource> {
        if let Some(root) = &self.site_root {
            log::info!("[config] dictionaries from directory {}", root.display());
            return Ok(AnySource::Dir(DirSource::new(root)));
        }
        if let Some(origin) = &self.origin {
            #[cfg(feature = "fetch-http")]
            {
                log::info!("[config] dictionaries from {origin}");
                let http = HttpSource::new(origin)
                    .with_context(|| format!("Creating HTTP client for {origin}"))?;
                return Ok(AnySource::Http(http));
            }
            #[cfg(not(feature = "fetch-http"))]
            anyhow::bail!("--origin {origin} given but the fetch-http feature is not compiled in");
        }
        match fallback_root {
            Some(root) => {
                log::info!("[config] dictionaries from directory {}", root.display());
                Ok(AnySource::Dir(DirSource::new(root)))
            }
            None => anyhow::bail!("No dictionary source: set --site-root or --origin"),
        }
    }

    /// Preference store: one-shot --lang, disabled persistence, or the storage file
    pub fn create_store(&self) -> Box<dyn PreferenceStore> {
        if let Some(lang) = &self.lang {
            log::debug!("[config] one-shot language {lang}");
            return Box::new(MemoryStore::new().with(i18n::STORAGE_KEY, lang));
        }
        if !self.persist {
            return Box::new(NullStore);
        }
        Box::new(FileStore::open(&self.storage_path))
    }

    fn apply_file(&mut self, fc: &FileConfig) {
        if let Some(l) = &fc.languages {
            if let Some(v) = &l.supported { self.supported    = v.clone(); }
            if let Some(v) = &l.default   { self.default_lang = v.clone(); }
            if let Some(v) = &l.locale    { self.locale       = Some(v.clone()); }
        }
        if let Some(s) = &fc.site {
            if let Some(v) = &s.origin    { self.origin    = Some(v.clone()); }
            if let Some(v) = &s.site_root { self.site_root = Some(v.clone()); }
            if let Some(v) = &s.base      { self.base      = Some(v.clone()); }
        }
        if let Some(st) = &fc.storage {
            if let Some(v) = &st.path   { self.storage_path = v.clone(); }
            if let Some(v) = st.persist { self.persist      = v; }
        }
    }

    fn apply_cli(&mut self, cli: &Cli) {
        if let Some(v) = &cli.lang      { self.lang         = Some(v.clone()); }
        if let Some(v) = &cli.locale    { self.locale       = Some(v.clone()); }
        if let Some(v) = &cli.origin    { self.origin       = Some(v.clone()); }
        if let Some(v) = &cli.site_root { self.site_root    = Some(v.clone()); }
        if let Some(v) = &cli.base      { self.base         = Some(v.clone()); }
        if let Some(v) = &cli.storage   { self.storage_path = v.clone(); }
        if cli.no_persist               { self.persist      = false; }
    }
}

fn default_config_path() -> PathBuf {
    config_dir().join("config.toml")
}

fn config_dir() -> PathBuf {
    dirs_next().join("pusho-i18n")
}

fn dirs_next() -> PathBuf {
    if let Ok(v) = std::env::var("XDG_CONFIG_HOME") { return PathBuf::from(v); }
    if let Ok(v) = std::env::var("APPDATA")          { return PathBuf::from(v); }
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_default();
    PathBuf::from(home).join(".config")
}
