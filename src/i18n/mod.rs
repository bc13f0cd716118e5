// src/i18n/mod.rs  —  Language codes, supported set, initial-language resolution
pub mod dictionary;
pub mod loader;
mod ui;

pub use dictionary::{lookup, Dictionary};
#[cfg(feature = "fetch-http")]
pub use loader::HttpSource;
pub use loader::{load_dictionary, resource_path, AnySource, DictionarySource, DirSource, LoadError, MemorySource};
pub use ui::UiText;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Storage key holding the persisted language preference
pub const STORAGE_KEY: &str = "pusho-lang";

/// Base URL used when the page carries no `<meta name="base-url">`
pub const DEFAULT_BASE_URL: &str = "/pusho-website/";

/// A lowercase language code such as `it` or `en`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LangCode(String);

impl LangCode {
    /// Normalise and validate a code: ASCII letters only, 2–8 chars, lowercased.
    pub fn parse(raw: &str) -> Option<Self> {
        let code = raw.trim();
        if !(2..=8).contains(&code.len()) || !code.bytes().all(|b| b.is_ascii_alphabetic()) {
            return None;
        }
        Some(Self(code.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for LangCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl TryFrom<String> for LangCode {
    type Error = String;
    fn try_from(s: String) -> std::result::Result<Self, Self::Error> {
        Self::parse(&s).ok_or_else(|| format!("invalid language code {s:?}"))
    }
}

impl From<LangCode> for String {
    fn from(code: LangCode) -> Self { code.0 }
}

impl PartialEq<str> for LangCode {
    fn eq(&self, other: &str) -> bool { self.0 == other }
}

impl PartialEq<&str> for LangCode {
    fn eq(&self, other: &&str) -> bool { self.0 == *other }
}

/// Where the initial language came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Stored,
    Locale,
    Default,
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Resolution::Stored  => "stored preference",
            Resolution::Locale  => "system locale",
            Resolution::Default => "default",
        })
    }
}

/// The fixed set of languages the site ships dictionaries for
#[derive(Debug, Clone, PartialEq)]
pub struct Languages {
    supported: Vec<LangCode>,
    default:   LangCode,
}

impl Default for Languages {
    fn default() -> Self {
        Self {
            supported: vec![LangCode("it".into()), LangCode("en".into())],
            default:   LangCode("it".into()),
        }
    }
}

impl Languages {
    pub fn new(supported: Vec<LangCode>, default: LangCode) -> Result<Self> {
        if supported.is_empty() {
            bail!("at least one supported language is required");
        }
        if !supported.contains(&default) {
            bail!("default language '{default}' is not in the supported set");
        }
        let mut unique: Vec<LangCode> = Vec::with_capacity(supported.len());
        for code in supported {
            if !unique.contains(&code) { unique.push(code); }
        }
        Ok(Self { supported: unique, default })
    }

    /// Build from raw strings (config file / CLI)
    pub fn from_codes(supported: &[String], default: &str) -> Result<Self> {
        let mut codes = Vec::with_capacity(supported.len());
        for raw in supported {
            match LangCode::parse(raw) {
                Some(c) => codes.push(c),
                None    => bail!("invalid language code {raw:?} in supported set"),
            }
        }
        let Some(default) = LangCode::parse(default) else {
            bail!("invalid default language code {default:?}");
        };
        Self::new(codes, default)
    }

    pub fn supported(&self) -> &[LangCode] { &self.supported }
    pub fn default_lang(&self) -> &LangCode { &self.default }

    /// Exact match against the supported set
    pub fn get(&self, code: &str) -> Option<&LangCode> {
        self.supported.iter().find(|c| c.as_str() == code)
    }

    pub fn is_supported(&self, code: &str) -> bool { self.get(code).is_some() }

    /// Map a locale tag (`en-US`, `it_IT.UTF-8`, `EN`) to a supported code
    pub fn match_locale(&self, tag: &str) -> Option<&LangCode> {
        let primary = primary_subtag(tag)?;
        self.get(&primary)
    }

    /// Stored preference first, then locale primary subtag, then the default.
    /// Always returns a member of the supported set.
    pub fn resolve(&self, stored: Option<&str>, locale: Option<&str>) -> (LangCode, Resolution) {
        if let Some(code) = stored.and_then(|s| self.get(s)) {
            return (code.clone(), Resolution::Stored);
        }
        if let Some(code) = locale.and_then(|l| self.match_locale(l)) {
            return (code.clone(), Resolution::Locale);
        }
        (self.default.clone(), Resolution::Default)
    }
}

/// Primary language subtag, lowercased. Accepts BCP 47 (`en-GB`) and
/// POSIX (`en_GB.UTF-8@euro`) forms.
pub fn primary_subtag(tag: &str) -> Option<String> {
    let mut s = tag.trim();
    if let Some(idx) = s.find('@') { s = &s[..idx]; }
    if let Some(idx) = s.find('.') { s = &s[..idx]; }
    let primary = s.split(['-', '_']).next().unwrap_or_default();
    if primary.is_empty() {
        return None;
    }
    Some(primary.to_ascii_lowercase())
}

/// System locale (the desktop analogue of `navigator.language`)
pub fn system_locale() -> Option<String> {
    sys_locale::get_locale()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn it_en() -> Languages { Languages::default() }

    #[test]
    fn stored_preference_wins() {
        let (lang, from) = it_en().resolve(Some("en"), Some("it-IT"));
        assert_eq!(lang, "en");
        assert_eq!(from, Resolution::Stored);
    }

    #[test]
    fn unsupported_stored_falls_through_to_locale() {
        let (lang, from) = it_en().resolve(Some("de"), Some("en-US"));
        assert_eq!(lang, "en");
        assert_eq!(from, Resolution::Locale);
    }

    #[test]
    fn stored_preference_is_matched_exactly() {
        let (lang, from) = it_en().resolve(Some("EN"), None);
        assert_eq!(lang, "it");
        assert_eq!(from, Resolution::Default);
    }

    #[test]
    fn locale_is_case_insensitive() {
        assert_eq!(it_en().match_locale("EN-gb").map(LangCode::as_str), Some("en"));
        assert_eq!(it_en().match_locale("it_IT.UTF-8").map(LangCode::as_str), Some("it"));
        assert_eq!(it_en().match_locale("en_US.UTF-8@euro").map(LangCode::as_str), Some("en"));
    }

    #[test]
    fn malformed_locale_uses_default() {
        for tag in ["", "-", "  ", "fr-FR", "xx", "_US", "@"] {
            let (lang, from) = it_en().resolve(None, Some(tag));
            assert_eq!(lang, "it", "tag {tag:?}");
            assert_eq!(from, Resolution::Default);
        }
    }

    #[test]
    fn resolution_always_in_supported_set() {
        let langs = it_en();
        let inputs = [None, Some("it"), Some("en"), Some("de"), Some(""), Some("en-US")];
        for stored in inputs {
            for locale in inputs {
                let (lang, _) = langs.resolve(stored, locale);
                assert!(langs.is_supported(lang.as_str()));
            }
        }
    }

    #[test]
    fn default_must_be_supported() {
        let err = Languages::from_codes(&["en".into()], "it").unwrap_err();
        assert!(err.to_string().contains("not in the supported set"));
        assert!(Languages::from_codes(&["en".into(), "e n".into()], "en").is_err());
    }

    #[test]
    fn duplicate_codes_collapse() {
        let langs = Languages::from_codes(&["it".into(), "IT".into(), "en".into()], "it").unwrap();
        assert_eq!(langs.supported().len(), 2);
    }
}
