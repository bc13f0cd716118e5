// src/translator.rs  —  Translator state, switch sequencing, page application
use std::fmt;
use std::sync::Arc;

use crate::i18n::{self, DictionarySource, Dictionary, LangCode, Languages, Resolution, DEFAULT_BASE_URL, STORAGE_KEY};
use crate::page::{Document, NodeId};
use crate::store::PreferenceStore;
use crate::switcher::{self, Switcher};

pub const ATTR_TEXT:     &str = "data-i18n";
pub const ATTR_HTML:     &str = "data-i18n-html";
pub const META_BASE_URL: &str = "base-url";
pub const MOCKUP_CLASS:  &str = "mockup-image";
/// The mockup image is only swapped when it carries every variant
pub const MOCKUP_VARIANTS: [&str; 2] = ["data-mockup-it", "data-mockup-en"];

/// What `apply_to_document` touched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApplyReport {
    pub text:    usize,
    pub html:    usize,
    /// Keys with no translation; their elements keep the authored content
    pub missing: Vec<String>,
    pub mockup:  bool,
}

/// Result of a language switch request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchOutcome {
    Switched,
    /// Already the active language
    Unchanged,
    Unsupported,
    /// Dictionary could not be loaded; previous state kept
    LoadFailed,
    /// A newer request was issued while this one was loading
    Superseded,
}

impl fmt::Display for SwitchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SwitchOutcome::Switched    => "switched",
            SwitchOutcome::Unchanged   => "already active",
            SwitchOutcome::Unsupported => "unsupported language",
            SwitchOutcome::LoadFailed  => "dictionary load failed",
            SwitchOutcome::Superseded  => "superseded by a newer request",
        })
    }
}

/// One in-flight switch. Only the most recently issued ticket may commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchTicket {
    generation: u64,
    lang:       LangCode,
}

impl SwitchTicket {
    pub fn lang(&self) -> &LangCode { &self.lang }
}

/// Apply `dict` to every tagged element of `doc` for language `lang`
pub fn apply_to_document<D: Document + ?Sized>(doc: &mut D, dict: &Dictionary, lang: &LangCode) -> ApplyReport {
    let mut report = ApplyReport::default();

    for (attr, is_html) in [(ATTR_TEXT, false), (ATTR_HTML, true)] {
        for node in doc.elements_with_attr(attr) {
            let key = doc.attr(node, attr).unwrap_or_default().to_string();
            match dict.lookup(&key) {
                Some(value) if is_html => { doc.set_inner_html(node, value); report.html += 1; }
                Some(value)            => { doc.set_text(node, value);       report.text += 1; }
                None => {
                    log::debug!("[translator] no '{lang}' translation for {attr}=\"{key}\"");
                    report.missing.push(key);
                }
            }
        }
    }

    if let Some(img) = mockup_image(doc) {
        let variant = format!("data-mockup-{lang}");
        if let Some(src) = doc.attr(img, &variant).filter(|s| !s.is_empty()).map(str::to_string) {
            doc.set_attr(img, "src", &src);
            report.mockup = true;
        }
    }

    doc.set_lang(lang.as_str());
    switcher::refresh(doc, lang.as_str());
    report
}

fn mockup_image<D: Document + ?Sized>(doc: &D) -> Option<NodeId> {
    doc.elements_with_class(MOCKUP_CLASS)
        .into_iter()
        .find(|&id| MOCKUP_VARIANTS.iter().all(|v| doc.attr(id, v).is_some()))
}

/// Current language + dictionary, the store they persist to and the source
/// dictionaries come from.
pub struct Translator<S> {
    languages:  Languages,
    source:     Arc<S>,
    store:      Box<dyn PreferenceStore>,
    locale:     Option<String>,
    base:       Option<String>,
    current:    LangCode,
    dictionary: Option<Dictionary>,
    generation: u64,
}

impl<S: DictionarySource> Translator<S> {
    pub fn new(languages: Languages, source: Arc<S>, store: Box<dyn PreferenceStore>) -> Self {
        let current = languages.default_lang().clone();
        Self {
            languages,
            source,
            store,
            locale: None,
            base: None,
            current,
            dictionary: None,
            generation: 0,
        }
    }

    /// Locale tag used when no preference is stored (`navigator.language`)
    pub fn with_locale(mut self, locale: Option<String>) -> Self {
        self.locale = locale;
        self
    }

    /// Fixed base URL; otherwise taken from the page's `base-url` meta tag
    pub fn with_base(mut self, base: Option<String>) -> Self {
        self.base = base;
        self
    }

    pub fn languages(&self) -> &Languages { &self.languages }
    pub fn current_lang(&self) -> &LangCode { &self.current }
    pub fn dictionary(&self) -> Option<&Dictionary> { self.dictionary.as_ref() }
    pub fn source(&self) -> &Arc<S> { &self.source }
    pub fn base(&self) -> &str { self.base.as_deref().unwrap_or(DEFAULT_BASE_URL) }

    /// Translation of `key`, or `key` itself
    pub fn t<'a>(&'a self, key: &'a str) -> &'a str {
        self.dictionary.as_ref().and_then(|d| d.lookup(key)).unwrap_or(key)
    }

    pub fn resolve_initial_language(&self) -> (LangCode, Resolution) {
        let stored = self.store.get(STORAGE_KEY);
        self.languages.resolve(stored.as_deref(), self.locale.as_deref())
    }

    pub async fn load_dictionary(&self, lang: &LangCode) -> Option<Dictionary> {
        i18n::load_dictionary(&*self.source, self.base(), lang).await
    }

    /// Apply the current dictionary; `None` when nothing is loaded
    pub fn apply<D: Document + ?Sized>(&self, doc: &mut D) -> Option<ApplyReport> {
        let dict = self.dictionary.as_ref()?;
        let report = apply_to_document(doc, dict, &self.current);
        log::info!(
            "[translator] applied '{}': {} text, {} html, {} missing",
            self.current, report.text, report.html, report.missing.len()
        );
        Some(report)
    }

    /// Start a switch. Unsupported and already-active requests are refused;
    /// an already-active request still invalidates any switch in flight.
    pub fn begin_switch(&mut self, lang: &str) -> Result<SwitchTicket, SwitchOutcome> {
        let Some(code) = self.languages.get(lang).cloned() else {
            log::debug!("[translator] ignoring unsupported language {lang:?}");
            return Err(SwitchOutcome::Unsupported);
        };
        self.generation += 1;
        if code == self.current {
            return Err(SwitchOutcome::Unchanged);
        }
        Ok(SwitchTicket { generation: self.generation, lang: code })
    }

    /// Commit a loaded dictionary if `ticket` is still the latest request
    pub fn finish_switch<D: Document + ?Sized>(
        &mut self,
        ticket: SwitchTicket,
        loaded: Option<Dictionary>,
        doc:    &mut D,
    ) -> SwitchOutcome {
        if ticket.generation != self.generation {
            log::debug!("[translator] discarding stale switch to '{}'", ticket.lang);
            return SwitchOutcome::Superseded;
        }
        let Some(dict) = loaded else {
            return SwitchOutcome::LoadFailed;
        };
        self.dictionary = Some(dict);
        self.current = ticket.lang;
        if let Err(e) = self.store.set(STORAGE_KEY, self.current.as_str()) {
            log::warn!("[translator] could not persist language preference: {e:#}");
        }
        self.apply(doc);
        switcher::close_dropdown(doc);
        log::info!("[translator] switched to '{}'", self.current);
        SwitchOutcome::Switched
    }

    pub async fn change_language<D: Document + ?Sized>(&mut self, lang: &str, doc: &mut D) -> SwitchOutcome {
        let ticket = match self.begin_switch(lang) {
            Ok(t)        => t,
            Err(outcome) => return outcome,
        };
        let loaded = self.load_dictionary(&ticket.lang).await;
        self.finish_switch(ticket, loaded, doc)
    }

    /// Resolve, load and apply the initial language, then bind the switcher
    /// (whether or not the load succeeded).
    pub async fn init<D: Document>(mut self, mut doc: D) -> I18n<S, D> {
        if self.base.is_none() {
            // An empty or valueless `content` counts as absent
            self.base = doc.meta_content(META_BASE_URL)
                .filter(|s| !s.trim().is_empty())
                .map(str::to_string);
        }
        let (lang, resolution) = self.resolve_initial_language();
        log::info!("[translator] initial language '{lang}' from {resolution}");
        self.current = lang;
        self.dictionary = self.load_dictionary(&self.current).await;
        let report = self.apply(&mut doc);
        if report.is_none() {
            log::warn!("[translator] no dictionary for '{}', page left untranslated", self.current);
        }
        let switcher = Switcher::bind(&doc);
        I18n { translator: self, doc, switcher, resolution, initial: report }
    }
}

/// Initialised translator bound to its page: the public API surface
pub struct I18n<S, D> {
    translator: Translator<S>,
    doc:        D,
    switcher:   Switcher,
    resolution: Resolution,
    initial:    Option<ApplyReport>,
}

impl<S: DictionarySource, D: Document> I18n<S, D> {
    /// Switch to `lang`. Asking for the already-active language is a no-op
    /// for the page, but it cancels any switch still in flight.
    pub async fn change_lang(&mut self, lang: &str) -> SwitchOutcome {
        self.translator.change_language(lang, &mut self.doc).await
    }

    pub fn current_lang(&self) -> &LangCode { self.translator.current_lang() }

    pub fn t<'a>(&'a self, key: &'a str) -> &'a str { self.translator.t(key) }

    /// Route a click through the switcher; returns the requested language
    pub fn click(&mut self, target: Option<NodeId>) -> Option<String> {
        self.switcher.click(&mut self.doc, target)
    }

    /// Click, and switch if an option was hit
    pub async fn handle_click(&mut self, target: Option<NodeId>) -> Option<SwitchOutcome> {
        let lang = self.click(target)?;
        Some(self.change_lang(&lang).await)
    }

    pub fn begin_switch(&mut self, lang: &str) -> Result<SwitchTicket, SwitchOutcome> {
        self.translator.begin_switch(lang)
    }

    pub fn finish_switch(&mut self, ticket: SwitchTicket, loaded: Option<Dictionary>) -> SwitchOutcome {
        self.translator.finish_switch(ticket, loaded, &mut self.doc)
    }

    pub fn translator(&self) -> &Translator<S> { &self.translator }
    pub fn switcher(&self) -> &Switcher { &self.switcher }
    pub fn document(&self) -> &D { &self.doc }
    pub fn into_document(self) -> D { self.doc }
    pub fn resolution(&self) -> Resolution { self.resolution }
    /// Report of the initial application (`None` if the first load failed)
    pub fn initial_report(&self) -> Option<&ApplyReport> { self.initial.as_ref() }
    pub fn base(&self) -> &str { self.translator.base() }
}
