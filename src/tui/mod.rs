// src/tui/mod.rs  —  ratatui page preview
#[cfg(feature = "tui")]
mod inner;
#[cfg(feature = "tui")]
pub use inner::{rows, Preview};

#[cfg(not(feature = "tui"))]
pub struct Preview;
#[cfg(not(feature = "tui"))]
impl Preview {
    pub fn new(_ui: crate::i18n::UiText) -> anyhow::Result<Self> { Ok(Self) }
    pub async fn run<S>(&mut self, _i18n: &mut crate::translator::I18n<S, crate::page::Page>) -> anyhow::Result<()> {
        anyhow::bail!("preview needs the tui feature")
    }
    pub fn cleanup(&mut self) {}
}
