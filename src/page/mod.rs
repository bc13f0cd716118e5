// src/page/mod.rs  —  Document trait + Page (HTML element arena)
mod parse;
mod render;

pub use render::{decode_entities, escape_text};

/// Index of a node inside a [`Page`]
pub type NodeId = usize;

/// Platform-agnostic view of an HTML document: the queries and mutations
/// the translator and the switcher need, nothing more.
pub trait Document {
    /// Elements carrying `attr`, in document order
    fn elements_with_attr(&self, attr: &str) -> Vec<NodeId>;
    fn element_by_id(&self, id: &str) -> Option<NodeId>;
    /// Elements whose class list contains `class`, in document order
    fn elements_with_class(&self, class: &str) -> Vec<NodeId>;
    fn parent(&self, node: NodeId) -> Option<NodeId>;

    fn attr(&self, node: NodeId, name: &str) -> Option<&str>;
    fn set_attr(&mut self, node: NodeId, name: &str, value: &str);

    /// Replace children with a single text node (value is escaped)
    fn set_text(&mut self, node: NodeId, text: &str);
    /// Replace children with verbatim markup
    fn set_inner_html(&mut self, node: NodeId, html: &str);

    fn has_class(&self, node: NodeId, class: &str) -> bool;
    fn add_class(&mut self, node: NodeId, class: &str);
    fn remove_class(&mut self, node: NodeId, class: &str);
    /// Returns whether the class is present afterwards
    fn toggle_class(&mut self, node: NodeId, class: &str) -> bool {
        if self.has_class(node, class) {
            self.remove_class(node, class);
            false
        } else {
            self.add_class(node, class);
            true
        }
    }

    /// `lang` attribute of the root `<html>` element
    fn lang(&self) -> Option<&str>;
    fn set_lang(&mut self, lang: &str);

    /// `content` of `<meta name="{name}">`
    fn meta_content(&self, name: &str) -> Option<&str>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub tag:          String,
    /// Attribute values are kept as written in the source (entities intact);
    /// `None` is a boolean attribute.
    pub attrs:        Vec<(String, Option<String>)>,
    pub children:     Vec<NodeId>,
    pub self_closing: bool,
}

impl Element {
    fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_deref().unwrap_or(""))
    }

    fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or("").split_ascii_whitespace()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    /// Markup-ready text (escaped)
    Text(String),
    Comment(String),
    /// `<!DOCTYPE …>` and other `<!…>` / `<?…>` declarations, verbatim
    Declaration(String),
    /// Markup inserted through `set_inner_html`, rendered verbatim
    Raw(String),
}

/// Parsed HTML page. Nodes live in an arena; detached nodes stay in the
/// arena but are unreachable from `roots`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    nodes:   Vec<Node>,
    parents: Vec<Option<NodeId>>,
    roots:   Vec<NodeId>,
}

impl Page {
    pub fn parse(html: &str) -> Self { parse::parse(html) }

    pub fn to_html(&self) -> String { render::render(self) }

    pub fn node(&self, id: NodeId) -> Option<&Node> { self.nodes.get(id) }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match self.nodes.get(id) {
            Some(Node::Element(e)) => Some(e),
            _ => None,
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match self.nodes.get_mut(id) {
            Some(Node::Element(e)) => Some(e),
            _ => None,
        }
    }

    pub fn roots(&self) -> &[NodeId] { &self.roots }

    /// Visible text below `id`, entities decoded, raw markup tags stripped
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        decode_entities(&out)
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        match &self.nodes[id] {
            Node::Text(t) => out.push_str(t),
            Node::Raw(markup) => out.push_str(&strip_tags(markup)),
            Node::Element(e) => {
                for &child in &e.children { self.collect_text(child, out); }
            }
            Node::Comment(_) | Node::Declaration(_) => {}
        }
    }

    /// Pre-order walk over every reachable element
    pub fn elements(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            if let Node::Element(e) = &self.nodes[id] {
                out.push(id);
                stack.extend(e.children.iter().rev().copied());
            }
        }
        out
    }

    fn find_elements(&self, pred: impl Fn(&Element) -> bool) -> Vec<NodeId> {
        self.elements()
            .into_iter()
            .filter(|&id| self.element(id).is_some_and(&pred))
            .collect()
    }

    fn root_element(&self) -> Option<NodeId> {
        self.elements().into_iter().find(|&id| self.element(id).is_some_and(|e| e.tag == "html"))
    }

    pub(crate) fn push(&mut self, node: Node, parent: Option<NodeId>) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(node);
        self.parents.push(parent);
        match parent {
            Some(p) => {
                if let Some(e) = self.element_mut(p) { e.children.push(id); }
            }
            None => self.roots.push(id),
        }
        id
    }

    /// Detached children stay in the arena. A lone text/markup child is
    /// overwritten in place, so re-translating the same element does not grow it.
    fn replace_children(&mut self, id: NodeId, node: Node) {
        let lone = self.element(id).and_then(|e| match e.children.as_slice() {
            &[only] => Some(only),
            _ => None,
        });
        if let Some(only) = lone {
            if matches!(self.nodes[only], Node::Text(_) | Node::Raw(_)) {
                self.nodes[only] = node;
                return;
            }
        }
        let Some(old) = self.element_mut(id).map(|e| std::mem::take(&mut e.children)) else {
            return;
        };
        for child in old { self.parents[child] = None; }
        self.push(node, Some(id));
    }
}

impl Document for Page {
    fn elements_with_attr(&self, attr: &str) -> Vec<NodeId> {
        self.find_elements(|e| e.attr(attr).is_some())
    }

    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.find_elements(|e| e.attr("id") == Some(id)).into_iter().next()
    }

    fn elements_with_class(&self, class: &str) -> Vec<NodeId> {
        self.find_elements(|e| e.classes().any(|c| c == class))
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.parents.get(node).copied().flatten()
    }

    fn attr(&self, node: NodeId, name: &str) -> Option<&str> {
        self.element(node)?.attr(name)
    }

    fn set_attr(&mut self, node: NodeId, name: &str, value: &str) {
        let Some(e) = self.element_mut(node) else { return };
        match e.attrs.iter_mut().find(|(n, _)| n == name) {
            Some((_, v)) => *v = Some(value.to_string()),
            None => e.attrs.push((name.to_string(), Some(value.to_string()))),
        }
    }

    fn set_text(&mut self, node: NodeId, text: &str) {
        self.replace_children(node, Node::Text(escape_text(text)));
    }

    fn set_inner_html(&mut self, node: NodeId, html: &str) {
        self.replace_children(node, Node::Raw(html.to_string()));
    }

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.element(node).is_some_and(|e| e.classes().any(|c| c == class))
    }

    fn add_class(&mut self, node: NodeId, class: &str) {
        if self.element(node).is_none() || self.has_class(node, class) {
            return;
        }
        let current = self.attr(node, "class").unwrap_or("").trim().to_string();
        let joined = if current.is_empty() { class.to_string() } else { format!("{current} {class}") };
        self.set_attr(node, "class", &joined);
    }

    fn remove_class(&mut self, node: NodeId, class: &str) {
        if !self.has_class(node, class) {
            return;
        }
        let kept: Vec<&str> = self.element(node)
            .map(|e| e.classes().filter(|c| *c != class).collect())
            .unwrap_or_default();
        let joined = kept.join(" ");
        self.set_attr(node, "class", &joined);
    }

    fn lang(&self) -> Option<&str> {
        self.attr(self.root_element()?, "lang")
    }

    fn set_lang(&mut self, lang: &str) {
        match self.root_element() {
            Some(html) => self.set_attr(html, "lang", lang),
            None => log::debug!("[page] no <html> element, lang attribute not set"),
        }
    }

    fn meta_content(&self, name: &str) -> Option<&str> {
        let meta = self.find_elements(|e| e.tag == "meta" && e.attr("name") == Some(name));
        self.attr(*meta.first()?, "content")
    }
}

fn strip_tags(markup: &str) -> String {
    let mut out = String::with_capacity(markup.len());
    let mut in_tag = false;
    for c in markup.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}
