//! End-to-end: a site directory on disk, a preference file, two sessions

use pretty_assertions::assert_eq;
use pusho_i18n::i18n::{DirSource, Languages, Resolution, STORAGE_KEY};
use pusho_i18n::page::{Document, Page};
use pusho_i18n::store::{FileStore, PreferenceStore};
use pusho_i18n::translator::{SwitchOutcome, Translator};
use std::path::Path;
use std::sync::Arc;

const INDEX: &str = r#"<!DOCTYPE html>
<html lang="it">
<head>
  <meta charset="utf-8">
  <meta name="base-url" content="/pusho-website/">
  <title data-i18n="meta.title">Pusho</title>
</head>
<body>
  <nav>
    <a href="/" data-i18n="nav.home">Home</a>
    <a href="/about" data-i18n="nav.about">Chi siamo</a>
    <button id="lang-toggle"><span id="current-lang">IT</span></button>
    <ul class="lang-dropdown">
      <li class="lang-option active" data-lang="it">Italiano</li>
      <li class="lang-option" data-lang="en">English</li>
    </ul>
  </nav>
  <h1 data-i18n-html="hero.title">Spingi</h1>
  <p data-i18n="hero.untranslated">Solo in italiano</p>
  <img class="mockup-image" src="img/it.png" data-mockup-it="img/it.png" data-mockup-en="img/en.png">
</body>
</html>
"#;

const IT: &str = r#"{
  "meta": { "title": "Pusho | Allenamento" },
  "nav":  { "home": "Casa", "about": "Chi siamo" },
  "hero": { "title": "Spingi <em>di più</em>" }
}"#;

const EN: &str = r#"{
  "meta": { "title": "Pusho | Training" },
  "nav":  { "home": "Home", "about": "About us" },
  "hero": { "title": "Push <em>harder</em> &amp; smarter" }
}"#;

fn write_site(root: &Path) {
    std::fs::create_dir_all(root.join("i18n")).unwrap();
    std::fs::write(root.join("i18n/it.json"), IT).unwrap();
    std::fs::write(root.join("i18n/en.json"), EN).unwrap();
}

fn session(root: &Path, storage: &Path, locale: &str) -> Translator<DirSource> {
    Translator::new(
        Languages::default(),
        Arc::new(DirSource::new(root)),
        Box::new(FileStore::open(storage)),
    )
    .with_locale(Some(locale.to_string()))
}

fn text(page: &Page, key: &str) -> String {
    let id = page
        .elements_with_attr("data-i18n")
        .into_iter()
        .chain(page.elements_with_attr("data-i18n-html"))
        .find(|&id| page.attr(id, "data-i18n").or_else(|| page.attr(id, "data-i18n-html")) == Some(key))
        .unwrap_or_else(|| panic!("no element for {key}"));
    page.text_content(id)
}

#[tokio::test]
async fn locale_then_stored_preference_across_sessions() {
    let site = tempfile::tempdir().unwrap();
    let state = tempfile::tempdir().unwrap();
    let storage = state.path().join("pusho-i18n/storage.toml");
    write_site(site.path());

    // First visit: nothing stored, English browser
    let mut first = session(site.path(), &storage, "en-GB").init(Page::parse(INDEX)).await;
    assert_eq!(first.resolution(), Resolution::Locale);
    assert_eq!(first.current_lang(), &"en");
    {
        let page = first.document();
        assert_eq!(page.lang(), Some("en"));
        assert_eq!(text(page, "meta.title"), "Pusho | Training");
        assert_eq!(text(page, "nav.about"), "About us");
        assert_eq!(text(page, "hero.title"), "Push harder & smarter");
        assert_eq!(text(page, "hero.untranslated"), "Solo in italiano");
        let img = page.elements_with_class("mockup-image")[0];
        assert_eq!(page.attr(img, "src"), Some("img/en.png"));
    }
    assert_eq!(first.initial_report().unwrap().missing, vec!["hero.untranslated".to_string()]);
    // Initial resolution does not persist anything
    assert!(!storage.exists());

    // User picks Italian
    assert_eq!(first.change_lang("it").await, SwitchOutcome::Switched);
    assert_eq!(first.t("nav.home"), "Casa");
    assert_eq!(FileStore::open(&storage).get(STORAGE_KEY).as_deref(), Some("it"));

    // Second visit: stored preference beats the locale
    let second = session(site.path(), &storage, "en-US").init(Page::parse(INDEX)).await;
    assert_eq!(second.resolution(), Resolution::Stored);
    assert_eq!(second.current_lang(), &"it");
    let html = second.into_document().to_html();
    assert!(html.contains(r#"<h1 data-i18n-html="hero.title">Spingi <em>di più</em></h1>"#));
    assert!(html.contains(r#"<span id="current-lang">IT</span>"#));
    assert!(html.starts_with("<!DOCTYPE html>"));
}

#[tokio::test]
async fn missing_dictionary_leaves_page_as_authored() {
    let site = tempfile::tempdir().unwrap();
    let state = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(site.path().join("i18n")).unwrap();
    std::fs::write(site.path().join("i18n/it.json"), "[1, 2, 3]").unwrap();

    let mut i18n = session(site.path(), &state.path().join("storage.toml"), "it-IT")
        .init(Page::parse(INDEX))
        .await;
    assert!(i18n.initial_report().is_none());
    assert_eq!(i18n.document(), &Page::parse(INDEX));
    assert_eq!(i18n.t("nav.home"), "nav.home");

    // No en.json either: the switch fails and nothing is stored
    assert_eq!(i18n.change_lang("en").await, SwitchOutcome::LoadFailed);
    assert_eq!(i18n.current_lang(), &"it");
    assert!(!state.path().join("storage.toml").exists());
}
