// src/i18n/ui.rs  —  Built-in strings for the tool's own terminal UI
//
// Page content comes from the site dictionaries; these tables only cover
// the preview chrome (header, hints, status line).
use std::collections::HashMap;

trait UiLang: Send + Sync {
    fn get<'a>(&self, key: &'a str) -> &'a str;
}

pub struct UiText {
    inner: Box<dyn UiLang>,
}

impl UiText {
    /// Unknown codes fall back to English
    pub fn new(lang: &str) -> Self {
        let inner: Box<dyn UiLang> = match lang {
            "it" => Box::new(It::new()),
            _    => Box::new(En::new()),
        };
        Self { inner }
    }
    pub fn t<'a>(&self, key: &'a str) -> &'a str { self.inner.get(key) }
}

macro_rules! ui_map {
    ($name:ident, [ $( $k:literal => $v:literal ),* $(,)? ]) => {
        struct $name(HashMap<&'static str, &'static str>);
        impl $name {
            fn new() -> Self {
                let mut m = HashMap::new();
                $( m.insert($k, $v); )*
                Self(m)
            }
        }
        impl UiLang for $name {
            fn get<'a>(&self, key: &'a str) -> &'a str {
                self.0.get(key).copied().unwrap_or(key)
            }
        }
    };
}

ui_map!(En, [
    "preview.title"       => "Page preview",
    "preview.language"    => "Language",
    "preview.switcher"    => "Switch language",
    "preview.hints"       => " L = language menu   ↑↓ = choose   Enter = apply   Esc = close/quit",
    "status.ready"        => "Ready",
    "status.loading"      => "Loading dictionary…",
    "status.switched"     => "Language switched",
    "status.failed"       => "Could not load dictionary, page unchanged",
    "status.unchanged"    => "Already active",
    "status.untranslated" => "No dictionary loaded, page shown as authored",
]);

ui_map!(It, [
    "preview.title"       => "Anteprima pagina",
    "preview.language"    => "Lingua",
    "preview.switcher"    => "Cambia lingua",
    "preview.hints"       => " L = menu lingua   ↑↓ = scegli   Invio = applica   Esc = chiudi/esci",
    "status.ready"        => "Pronto",
    "status.loading"      => "Caricamento dizionario…",
    "status.switched"     => "Lingua cambiata",
    "status.failed"       => "Impossibile caricare il dizionario, pagina invariata",
    "status.unchanged"    => "Già attiva",
    "status.untranslated" => "Nessun dizionario caricato, pagina originale",
]);
