// src/lib.rs  —  pusho-i18n library root
pub mod config;
pub mod i18n;
pub mod page;
pub mod store;
pub mod switcher;
pub mod translator;
pub mod tui;

pub use i18n::{Dictionary, LangCode, Languages, Resolution};
pub use page::{Document, Page};
pub use translator::{apply_to_document, ApplyReport, I18n, SwitchOutcome, SwitchTicket, Translator};
