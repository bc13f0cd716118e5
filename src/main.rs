// src/main.rs  —  pusho-i18n  entry point
use anyhow::{Context, Result};
use clap::Parser;
use pusho_i18n::config::{self, AppConfig, Cli, Command};
use pusho_i18n::i18n::{AnySource, MemorySource, UiText};
use pusho_i18n::page::Page;
use pusho_i18n::translator::{SwitchOutcome, Translator};
use pusho_i18n::tui;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    // ── --print-config  ───────────────────────────────────────────────────────
    if cli.print_config {
        print!("{}", config::DEFAULT_CONFIG_TOML);
        return Ok(());
    }

    // ── --write-config  ───────────────────────────────────────────────────────
    if cli.write_config {
        let path = AppConfig::write_default_config(&cli)?;
        println!("Config written to: {}", path.display());
        println!("Edit it to set the supported languages, site origin, storage, etc.");
        return Ok(());
    }

    // ── Load config ───────────────────────────────────────────────────────────
    let cfg = AppConfig::load(&cli)?;

    match cli.command.clone().unwrap_or(Command::Current) {
        Command::Translate { input, output } => translate(&cfg, &input, output.as_deref()).await,
        Command::T { keys }                  => print_keys(&cfg, &keys).await,
        Command::Switch { lang }             => switch(&cfg, &lang).await,
        Command::Current                     => current(&cfg),
        Command::Preview { input }           => preview(&cfg, &input).await,
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────
fn translator(cfg: &AppConfig, source: AnySource) -> Result<Translator<AnySource>> {
    Ok(Translator::new(cfg.languages()?, Arc::new(source), cfg.create_store())
        .with_locale(cfg.effective_locale())
        .with_base(cfg.base.clone()))
}

/// Directory a page's dictionaries live under when no source is configured
fn page_root(input: &Path) -> PathBuf {
    match input.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn read_page(input: &Path) -> Result<Page> {
    let html = std::fs::read_to_string(input)
        .with_context(|| format!("Reading page {:?}", input))?;
    Ok(Page::parse(&html))
}

// ── Commands ──────────────────────────────────────────────────────────────────
async fn translate(cfg: &AppConfig, input: &Path, output: Option<&Path>) -> Result<()> {
    let page   = read_page(input)?;
    let source = cfg.create_source(Some(&page_root(input)))?;
    let i18n   = translator(cfg, source)?.init(page).await;

    let lang       = i18n.current_lang().clone();
    let translated = i18n.initial_report().is_some();
    let html       = i18n.into_document().to_html();
    match output {
        Some(path) => {
            std::fs::write(path, &html).with_context(|| format!("Writing {:?}", path))?;
            log::info!("[main] wrote {} ({lang})", path.display());
        }
        None => print!("{html}"),
    }
    if !translated {
        anyhow::bail!("No dictionary for '{lang}' could be loaded; page written untranslated");
    }
    Ok(())
}

async fn print_keys(cfg: &AppConfig, keys: &[String]) -> Result<()> {
    let source = cfg.create_source(None)?;
    let i18n   = translator(cfg, source)?.init(Page::default()).await;
    let Some(dict) = i18n.translator().dictionary() else {
        anyhow::bail!("No dictionary for '{}' could be loaded", i18n.current_lang());
    };
    if keys.is_empty() {
        for (key, value) in dict.entries() {
            println!("{key} = {value}");
        }
    } else {
        for key in keys {
            println!("{}", i18n.t(key));
        }
    }
    Ok(())
}

async fn switch(cfg: &AppConfig, lang: &str) -> Result<()> {
    if cfg.lang.is_some() || !cfg.persist {
        log::warn!("[main] preference persistence is off; the switch will not be remembered");
    }
    let source   = cfg.create_source(None)?;
    let mut i18n = translator(cfg, source)?.init(Page::default()).await;
    let outcome  = i18n.change_lang(lang).await;
    match outcome {
        SwitchOutcome::Switched | SwitchOutcome::Unchanged => {
            println!("{} ({outcome})", i18n.current_lang());
            Ok(())
        }
        _ => anyhow::bail!("Could not switch to {lang:?}: {outcome}"),
    }
}

fn current(cfg: &AppConfig) -> Result<()> {
    // Resolution reads only the preference store; no dictionary is fetched
    let source = cfg.create_source(None).unwrap_or_else(|_| AnySource::Memory(MemorySource::new()));
    let (lang, resolution) = translator(cfg, source)?.resolve_initial_language();
    println!("{lang} ({resolution})");
    Ok(())
}

async fn preview(cfg: &AppConfig, input: &Path) -> Result<()> {
    let page   = read_page(input)?;
    let source = cfg.create_source(Some(&page_root(input)))?;
    let mut i18n = translator(cfg, source)?.init(page).await;

    let ui = UiText::new(i18n.current_lang().as_str());
    let mut preview = tui::Preview::new(ui)?;
    let result = preview.run(&mut i18n).await;
    preview.cleanup();
    result?;

    println!("{}", i18n.current_lang());
    Ok(())
}
