// src/switcher.rs  —  Language switcher: DOM contract, click routing, visual state
use crate::page::{Document, NodeId};

pub const ID_TOGGLE:        &str = "lang-toggle";
pub const ID_CURRENT:       &str = "current-lang";
pub const CLASS_DROPDOWN:   &str = "lang-dropdown";
pub const CLASS_OPTION:     &str = "lang-option";
pub const CLASS_OPEN:       &str = "open";
pub const CLASS_ACTIVE:     &str = "active";
pub const ATTR_OPTION_LANG: &str = "data-lang";

/// Switcher elements found in the page, with click handling that follows
/// DOM bubbling: the toggle and the dropdown stop propagation, anything
/// else reaching the document closes the dropdown.
#[derive(Debug, Clone, Default)]
pub struct Switcher {
    toggle:   Option<NodeId>,
    dropdown: Option<NodeId>,
    /// Toggle/outside handlers exist only when both toggle and dropdown do
    wired:    bool,
    options:  Vec<(NodeId, String)>,
}

impl Switcher {
    /// Locate the switcher elements. Option handlers are bound whether or
    /// not the toggle/dropdown pair exists.
    pub fn bind<D: Document + ?Sized>(doc: &D) -> Self {
        let toggle   = doc.element_by_id(ID_TOGGLE);
        let dropdown = doc.elements_with_class(CLASS_DROPDOWN).into_iter().next();
        let options: Vec<(NodeId, String)> = doc.elements_with_class(CLASS_OPTION)
            .into_iter()
            .filter_map(|id| doc.attr(id, ATTR_OPTION_LANG).map(|lang| (id, lang.to_string())))
            .collect();
        let wired = toggle.is_some() && dropdown.is_some();
        log::debug!(
            "[switcher] toggle={:?} dropdown={:?} options={} wired={}",
            toggle, dropdown, options.len(), wired
        );
        Self { toggle, dropdown, wired, options }
    }

    pub fn is_wired(&self) -> bool { self.wired }
    pub fn toggle(&self) -> Option<NodeId> { self.toggle }
    pub fn dropdown(&self) -> Option<NodeId> { self.dropdown }
    pub fn options(&self) -> &[(NodeId, String)] { &self.options }

    pub fn is_open<D: Document + ?Sized>(&self, doc: &D) -> bool {
        self.dropdown.is_some_and(|d| doc.has_class(d, CLASS_OPEN))
    }

    /// Deliver a click on `target` (`None` = empty area of the document).
    /// Updates the dropdown's open state and returns the language an option
    /// asked for, if any. Switching itself is left to the caller.
    pub fn click<D: Document + ?Sized>(&self, doc: &mut D, target: Option<NodeId>) -> Option<String> {
        let mut requested = None;
        let mut node = target;
        while let Some(id) = node {
            if self.wired && Some(id) == self.toggle {
                if let Some(d) = self.dropdown {
                    let open = doc.toggle_class(d, CLASS_OPEN);
                    log::debug!("[switcher] dropdown {}", if open { "opened" } else { "closed" });
                }
                return requested;
            }
            if let Some((_, lang)) = self.options.iter().find(|(opt, _)| *opt == id) {
                requested = Some(lang.clone());
            }
            if self.wired && Some(id) == self.dropdown {
                return requested;
            }
            node = doc.parent(id);
        }
        if self.wired {
            if let Some(d) = self.dropdown { doc.remove_class(d, CLASS_OPEN); }
        }
        requested
    }
}

/// Close the first `.lang-dropdown`, if any
pub fn close_dropdown<D: Document + ?Sized>(doc: &mut D) {
    if let Some(&d) = doc.elements_with_class(CLASS_DROPDOWN).first() {
        doc.remove_class(d, CLASS_OPEN);
    }
}

/// `#current-lang` shows the upper-cased code; the matching `.lang-option`
/// is the only one marked active.
pub fn refresh<D: Document + ?Sized>(doc: &mut D, lang: &str) {
    if let Some(current) = doc.element_by_id(ID_CURRENT) {
        doc.set_text(current, &lang.to_uppercase());
    }
    for option in doc.elements_with_class(CLASS_OPTION) {
        if doc.attr(option, ATTR_OPTION_LANG) == Some(lang) {
            doc.add_class(option, CLASS_ACTIVE);
        } else {
            doc.remove_class(option, CLASS_ACTIVE);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::Page;

    const SWITCHER: &str = r#"<html><body>
<button id="lang-toggle"><span id="current-lang">IT</span></button>
<ul class="lang-dropdown">
  <li class="lang-option active" data-lang="it"><span>Italiano</span></li>
  <li class="lang-option" data-lang="en">English</li>
</ul>
<main><p id="content">text</p></main>
</body></html>"#;

    fn setup() -> (Page, Switcher) {
        let page = Page::parse(SWITCHER);
        let sw = Switcher::bind(&page);
        (page, sw)
    }

    #[test]
    fn binds_elements() {
        let (_, sw) = setup();
        assert!(sw.is_wired());
        let langs: Vec<&str> = sw.options().iter().map(|(_, l)| l.as_str()).collect();
        assert_eq!(langs, ["it", "en"]);
    }

    #[test]
    fn toggle_opens_and_closes() {
        let (mut page, sw) = setup();
        assert!(!sw.is_open(&page));
        assert_eq!(sw.click(&mut page, sw.toggle()), None);
        assert!(sw.is_open(&page));
        assert_eq!(sw.click(&mut page, sw.toggle()), None);
        assert!(!sw.is_open(&page));
    }

    #[test]
    fn click_inside_toggle_child_bubbles_to_toggle() {
        let (mut page, sw) = setup();
        let label = page.element_by_id(ID_CURRENT);
        sw.click(&mut page, label);
        assert!(sw.is_open(&page));
    }

    #[test]
    fn outside_click_closes() {
        let (mut page, sw) = setup();
        sw.click(&mut page, sw.toggle());
        let content = page.element_by_id("content");
        assert_eq!(sw.click(&mut page, content), None);
        assert!(!sw.is_open(&page));

        sw.click(&mut page, sw.toggle());
        sw.click(&mut page, None);
        assert!(!sw.is_open(&page));
    }

    #[test]
    fn option_click_requests_language_and_keeps_dropdown() {
        let (mut page, sw) = setup();
        sw.click(&mut page, sw.toggle());
        let en = sw.options()[1].0;
        assert_eq!(sw.click(&mut page, Some(en)).as_deref(), Some("en"));
        assert!(sw.is_open(&page), "dropdown stops propagation");

        // Click on a child of an option bubbles through it
        let it = sw.options()[0].0;
        let child = page.element(it).unwrap().children.iter().copied()
            .find(|&c| page.element(c).is_some());
        assert_eq!(sw.click(&mut page, child).as_deref(), Some("it"));
    }

    #[test]
    fn options_work_without_toggle() {
        let mut page = Page::parse(r#"<div><a class="lang-option" data-lang="en">EN</a><a class="lang-option">?</a></div>"#);
        let sw = Switcher::bind(&page);
        assert!(!sw.is_wired());
        assert_eq!(sw.options().len(), 1);
        let en = sw.options()[0].0;
        assert_eq!(sw.click(&mut page, Some(en)).as_deref(), Some("en"));
    }

    #[test]
    fn refresh_marks_active_option() {
        let (mut page, sw) = setup();
        refresh(&mut page, "en");
        let current = page.element_by_id(ID_CURRENT).unwrap();
        assert_eq!(page.text_content(current), "EN");
        let (it, en) = (sw.options()[0].0, sw.options()[1].0);
        assert!(!page.has_class(it, CLASS_ACTIVE));
        assert!(page.has_class(en, CLASS_ACTIVE));
    }
}
