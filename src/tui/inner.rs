// src/tui/inner.rs  —  ratatui layout, key handling, background dictionary loads
use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Terminal,
};
use std::io::stdout;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::i18n::{load_dictionary, Dictionary, DictionarySource, UiText};
use crate::page::{Document, Page};
use crate::switcher::CLASS_ACTIVE;
use crate::translator::{I18n, SwitchOutcome, SwitchTicket, ATTR_HTML, ATTR_TEXT};

const KEY_WIDTH_MAX: usize = 32;

/// Translated elements in document order: (key, visible text)
pub fn rows(page: &Page) -> Vec<(String, String)> {
    page.elements()
        .into_iter()
        .filter_map(|id| {
            let key = page.attr(id, ATTR_TEXT).or_else(|| page.attr(id, ATTR_HTML))?;
            let text = page.text_content(id).split_whitespace().collect::<Vec<_>>().join(" ");
            Some((key.to_string(), text))
        })
        .collect()
}

#[derive(Debug, PartialEq)]
enum Action {
    None,
    Quit,
    Switch(String),
}

/// Cursor in the language menu and body scroll offset
#[derive(Debug, Default)]
struct Nav {
    cursor: usize,
    scroll: u16,
}

impl Nav {
    fn handle<S: DictionarySource>(&mut self, i18n: &mut I18n<S, Page>, code: KeyCode) -> Action {
        let n_options = i18n.switcher().options().len();
        match code {
            KeyCode::Char('q') | KeyCode::Char('Q') => Action::Quit,
            KeyCode::Esc => {
                if i18n.switcher().is_open(i18n.document()) {
                    // Same as clicking an empty part of the page
                    i18n.click(None);
                    Action::None
                } else {
                    Action::Quit
                }
            }
            KeyCode::Char('l') | KeyCode::Char('L') => {
                let toggle = i18n.switcher().toggle();
                if toggle.is_some() { i18n.click(toggle); }
                Action::None
            }
            KeyCode::Up   => { self.cursor = self.cursor.saturating_sub(1); Action::None }
            KeyCode::Down => {
                if self.cursor + 1 < n_options { self.cursor += 1; }
                Action::None
            }
            KeyCode::Enter => {
                let Some(&(option, _)) = i18n.switcher().options().get(self.cursor) else {
                    return Action::None;
                };
                i18n.click(Some(option)).map_or(Action::None, Action::Switch)
            }
            KeyCode::PageUp   => { self.scroll = self.scroll.saturating_sub(10); Action::None }
            KeyCode::PageDown => { self.scroll = self.scroll.saturating_add(10); Action::None }
            KeyCode::Home     => { self.scroll = 0; Action::None }
            _ => Action::None,
        }
    }
}

pub struct Preview {
    terminal: Terminal<CrosstermBackend<std::io::Stdout>>,
    ui:       UiText,
    nav:      Nav,
    status:   String,
}

impl Preview {
    pub fn new(ui: UiText) -> Result<Self> {
        terminal::enable_raw_mode()?;
        let mut out = stdout();
        execute!(out, EnterAlternateScreen)?;
        let backend  = CrosstermBackend::new(out);
        let terminal = Terminal::new(backend)?;
        let status   = ui.t("status.ready").to_string();
        Ok(Self { terminal, ui, nav: Nav::default(), status })
    }

    pub fn cleanup(&mut self) {
        let _ = terminal::disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
    }

    /// Event loop. Dictionary loads run as tasks; results come back over a
    /// channel and are committed only if their ticket is still current.
    pub async fn run<S: DictionarySource + 'static>(&mut self, i18n: &mut I18n<S, Page>) -> Result<()> {
        let (tx, mut rx) = mpsc::unbounded_channel::<(SwitchTicket, Option<Dictionary>)>();
        let tick = Duration::from_millis(30);

        if i18n.initial_report().is_none() {
            self.status = self.ui.t("status.untranslated").to_string();
        }
        let active = i18n.current_lang().as_str().to_string();
        self.nav.cursor = i18n.switcher().options().iter()
            .position(|(_, lang)| *lang == active)
            .unwrap_or(0);

        'main: loop {
            // ── Input ─────────────────────────────────────────────────────────
            while event::poll(Duration::from_millis(0))? {
                let Event::Key(k) = event::read()? else { continue };
                if k.kind == KeyEventKind::Release {
                    continue;
                }
                if k.code == KeyCode::Char('c') && k.modifiers.contains(KeyModifiers::CONTROL) {
                    break 'main;
                }
                match self.nav.handle(i18n, k.code) {
                    Action::Quit => break 'main,
                    Action::Switch(lang) => match i18n.begin_switch(&lang) {
                        Ok(ticket) => {
                            let source = Arc::clone(i18n.translator().source());
                            let base   = i18n.base().to_string();
                            let tx     = tx.clone();
                            tokio::spawn(async move {
                                let dict = load_dictionary(&*source, &base, ticket.lang()).await;
                                let _ = tx.send((ticket, dict));
                            });
                            self.status = self.ui.t("status.loading").to_string();
                        }
                        Err(outcome) => self.status = self.outcome_text(outcome),
                    },
                    Action::None => {}
                }
            }

            // ── Finished loads ────────────────────────────────────────────────
            while let Ok((ticket, dict)) = rx.try_recv() {
                let outcome = i18n.finish_switch(ticket, dict);
                if outcome != SwitchOutcome::Superseded {
                    self.status = self.outcome_text(outcome);
                }
            }

            self.draw(i18n)?;
            tokio::time::sleep(tick).await;
        }
        Ok(())
    }

    fn outcome_text(&self, outcome: SwitchOutcome) -> String {
        match outcome {
            SwitchOutcome::Switched   => self.ui.t("status.switched").to_string(),
            SwitchOutcome::Unchanged  => self.ui.t("status.unchanged").to_string(),
            SwitchOutcome::LoadFailed => self.ui.t("status.failed").to_string(),
            other                     => other.to_string(),
        }
    }

    fn draw<S: DictionarySource>(&mut self, i18n: &I18n<S, Page>) -> Result<()> {
        let page    = i18n.document();
        let rows    = rows(page);
        let lang    = i18n.current_lang().as_str().to_uppercase();
        let open    = i18n.switcher().is_open(page);
        let options: Vec<(String, bool)> = i18n.switcher().options().iter()
            .map(|&(id, ref code)| {
                let label = page.text_content(id).split_whitespace().collect::<Vec<_>>().join(" ");
                (format!("{:<3} {}", code.to_uppercase(), label), page.has_class(id, CLASS_ACTIVE))
            })
            .collect();
        let key_width = rows.iter().map(|(k, _)| k.len()).max().unwrap_or(0).min(KEY_WIDTH_MAX);
        let ui  = &self.ui;
        let nav = &self.nav;
        let status = &self.status;

        self.terminal.draw(|f| {
            let area = f.area();
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(3),  // header
                    Constraint::Min(6),     // translated elements
                    Constraint::Length(3),  // status + hints
                ])
                .split(area);

            // ── Header ────────────────────────────────────────────────────
            let header = Paragraph::new(format!(
                " {}  |  {}: {}  |  {}",
                ui.t("preview.title"), ui.t("preview.language"), lang, i18n.base()
            ))
            .style(Style::default().fg(Color::Black).bg(Color::Cyan)
                   .add_modifier(Modifier::BOLD));
            f.render_widget(header, chunks[0]);

            // ── Body ──────────────────────────────────────────────────────
            let body: Vec<Line> = rows.iter()
                .map(|(key, text)| Line::from(vec![
                    Span::styled(format!("{key:<key_width$}"), Style::default().fg(Color::DarkGray)),
                    Span::styled(" │ ", Style::default().fg(Color::DarkGray)),
                    Span::styled(text.clone(), Style::default().fg(Color::White)),
                ]))
                .collect();
            let body_block = Paragraph::new(body)
                .block(Block::default()
                    .title(format!(" {} ", page.lang().unwrap_or("?")))
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Green)))
                .wrap(Wrap { trim: true })
                .scroll((nav.scroll, 0));
            f.render_widget(body_block, chunks[1]);

            // ── Footer ────────────────────────────────────────────────────
            let footer = Paragraph::new(vec![
                Line::from(Span::styled(format!(" {status}"), Style::default().fg(Color::Magenta))),
                Line::from(Span::styled(ui.t("preview.hints"), Style::default().fg(Color::DarkGray))),
            ])
            .style(Style::default().bg(Color::Black));
            f.render_widget(footer, chunks[2]);

            // ── Language dropdown ─────────────────────────────────────────
            if open && !options.is_empty() {
                let width  = 30.min(area.width);
                let height = (options.len() as u16 + 2).min(chunks[1].height);
                let popup  = Rect {
                    x: area.x + area.width.saturating_sub(width + 1),
                    y: chunks[1].y,
                    width,
                    height,
                };
                let lines: Vec<Line> = options.iter().enumerate()
                    .map(|(i, (label, active))| {
                        let marker = if i == nav.cursor { "▸ " } else { "  " };
                        let mut style = Style::default().fg(Color::White);
                        if *active   { style = style.fg(Color::Yellow).add_modifier(Modifier::BOLD); }
                        if i == nav.cursor { style = style.add_modifier(Modifier::REVERSED); }
                        Line::from(Span::styled(format!("{marker}{label}"), style))
                    })
                    .collect();
                f.render_widget(Clear, popup);
                f.render_widget(
                    Paragraph::new(lines).block(Block::default()
                        .title(format!(" {} ", ui.t("preview.switcher")))
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(Color::Yellow))),
                    popup,
                );
            }
        })?;
        Ok(())
    }
}
