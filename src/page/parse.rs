// src/page/parse.rs  —  Lenient HTML tokenizer → Page
//
// Not a conforming HTML5 parser: no implied end tags, no foster parenting.
// Unknown or stray end tags are dropped, unclosed elements close at EOF.
// Text is kept exactly as written, so untouched regions render back as-is.
use super::{Element, Node, NodeId, Page};

/// Elements that never have content or an end tag
const VOID: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input",
    "link", "meta", "param", "source", "track", "wbr",
];

/// Elements whose content is not markup
const RAW_TEXT: &[&str] = &["script", "style", "textarea", "title"];

pub fn is_void(tag: &str) -> bool { VOID.contains(&tag) }

pub fn parse(html: &str) -> Page {
    let mut page  = Page::default();
    let mut stack: Vec<(NodeId, String)> = Vec::new();
    let mut pos   = 0;
    let bytes     = html.as_bytes();

    while pos < html.len() {
        let parent = stack.last().map(|(id, _)| *id);
        let rest = &html[pos..];

        if !rest.starts_with('<') {
            let end = rest.find('<').map_or(html.len(), |i| pos + i);
            page.push(Node::Text(html[pos..end].to_string()), parent);
            pos = end;
            continue;
        }

        // ── Comment ──────────────────────────────────────────────────────
        if rest.starts_with("<!--") {
            let (body, next) = match rest[4..].find("-->") {
                Some(i) => (&rest[4..4 + i], pos + 4 + i + 3),
                None    => (&rest[4..], html.len()),
            };
            page.push(Node::Comment(body.to_string()), parent);
            pos = next;
            continue;
        }

        // ── Declaration / processing instruction ────────────────────────
        if rest.starts_with("<!") || rest.starts_with("<?") {
            let (body, next) = match rest.find('>') {
                Some(i) => (&rest[1..i], pos + i + 1),
                None    => (&rest[1..], html.len()),
            };
            page.push(Node::Declaration(body.to_string()), parent);
            pos = next;
            continue;
        }

        // ── End tag ──────────────────────────────────────────────────────
        if rest.starts_with("</") {
            // A truncated end tag runs to EOF
            let name_end = rest.find('>').map_or(html.len(), |i| pos + i);
            let name = html[pos + 2..name_end].trim().to_ascii_lowercase();
            if let Some(depth) = stack.iter().rposition(|(_, tag)| *tag == name) {
                stack.truncate(depth);
            } else {
                log::debug!("[page] dropping stray </{name}>");
            }
            pos = (name_end + 1).min(html.len());
            continue;
        }

        // ── Start tag ────────────────────────────────────────────────────
        let name_len = rest[1..]
            .find(|c: char| c.is_ascii_whitespace() || c == '>' || c == '/')
            .unwrap_or(rest.len() - 1);
        if name_len == 0 || !bytes[pos + 1].is_ascii_alphabetic() {
            // A lone '<' in text
            page.push(Node::Text("<".to_string()), parent);
            pos += 1;
            continue;
        }
        let tag = rest[1..1 + name_len].to_ascii_lowercase();
        let (attrs, self_closing, consumed) = parse_attrs(&rest[1 + name_len..]);
        pos += 1 + name_len + consumed;

        let id = page.push(
            Node::Element(Element { tag: tag.clone(), attrs, children: Vec::new(), self_closing }),
            parent,
        );

        if self_closing || is_void(&tag) {
            continue;
        }

        if RAW_TEXT.contains(&tag.as_str()) {
            let end = find_ci(&html[pos..], &format!("</{tag}")).map_or(html.len(), |i| pos + i);
            if end > pos {
                page.push(Node::Text(html[pos..end].to_string()), Some(id));
            }
            let close = html[end..].find('>').map_or(html.len(), |i| end + i + 1);
            pos = close;
            continue;
        }

        stack.push((id, tag));
    }

    page
}

/// Parse attributes up to and including the closing `>`.
/// Returns (attributes, self-closing, bytes consumed).
fn parse_attrs(s: &str) -> (Vec<(String, Option<String>)>, bool, usize) {
    let bytes = s.as_bytes();
    let mut attrs = Vec::new();
    let mut i = 0;
    let mut self_closing = false;

    loop {
        while i < bytes.len() && bytes[i].is_ascii_whitespace() { i += 1; }
        if i >= bytes.len() {
            return (attrs, self_closing, i);
        }
        match bytes[i] {
            b'>' => return (attrs, self_closing, i + 1),
            b'/' => {
                self_closing = true;
                i += 1;
                continue;
            }
            _ => self_closing = false,
        }

        let start = i;
        while i < bytes.len()
            && !bytes[i].is_ascii_whitespace()
            && !matches!(bytes[i], b'=' | b'>' | b'/')
        {
            i += 1;
        }
        if i == start {
            // Stray '=' or similar
            i += 1;
            continue;
        }
        let name = s[start..i].to_ascii_lowercase();

        let mut j = i;
        while j < bytes.len() && bytes[j].is_ascii_whitespace() { j += 1; }
        if j < bytes.len() && bytes[j] == b'=' {
            j += 1;
            while j < bytes.len() && bytes[j].is_ascii_whitespace() { j += 1; }
            let value = match bytes.get(j) {
                Some(&q @ (b'"' | b'\'')) => {
                    let vstart = j + 1;
                    let vend = s[vstart..].find(q as char).map_or(s.len(), |k| vstart + k);
                    j = (vend + 1).min(s.len());
                    s[vstart..vend].to_string()
                }
                _ => {
                    let vstart = j;
                    while j < bytes.len() && !bytes[j].is_ascii_whitespace() && bytes[j] != b'>' { j += 1; }
                    s[vstart..j].to_string()
                }
            };
            attrs.push((name, Some(value)));
            i = j;
        } else {
            attrs.push((name, None));
        }
    }
}

/// ASCII case-insensitive `find`
fn find_ci(haystack: &str, needle: &str) -> Option<usize> {
    let h = haystack.as_bytes();
    let n = needle.as_bytes();
    if n.is_empty() || h.len() < n.len() {
        return None;
    }
    (0..=h.len() - n.len()).find(|&i| h[i..i + n.len()].eq_ignore_ascii_case(n))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::Document;
    use pretty_assertions::assert_eq;

    #[test]
    fn normalised_markup_round_trips() {
        let src = "<!DOCTYPE html>\n<html lang=\"it\">\n<head><meta charset=\"utf-8\"><title>A &amp; B</title>\
                   <script>if (a < b) { x = '</p>'; }</script></head>\n\
                   <body><!-- nav --><p class=\"x\" hidden>Ciao &egrave; <br /> mondo</p>\
                   <img src=\"a.png\" alt='say \"hi\"'></body>\n</html>\n";
        assert_eq!(Page::parse(src).to_html(), src);
    }

    #[test]
    fn attribute_forms() {
        let page = Page::parse(r#"<input type=checkbox checked data-x = "1" DATA-Y='two words'>"#);
        let e = page.element(page.roots()[0]).unwrap();
        assert_eq!(e.tag, "input");
        assert_eq!(
            e.attrs,
            vec![
                ("type".to_string(), Some("checkbox".to_string())),
                ("checked".to_string(), None),
                ("data-x".to_string(), Some("1".to_string())),
                ("data-y".to_string(), Some("two words".to_string())),
            ]
        );
    }

    #[test]
    fn stray_end_tags_and_unclosed_elements() {
        let page = Page::parse("<div><span>a</b></div>tail");
        let div = page.roots()[0];
        assert_eq!(page.text_content(div), "a");
        assert_eq!(page.roots().len(), 2);
        assert_eq!(page.to_html(), "<div><span>a</span></div>tail");
    }

    #[test]
    fn truncated_end_tag_with_multibyte_name() {
        let page = Page::parse("<p>ciao</pé");
        let p = page.roots()[0];
        assert_eq!(page.text_content(p), "ciao");
        assert_eq!(page.to_html(), "<p>ciao</p>");

        let page = Page::parse("<div>è</div");
        assert_eq!(page.to_html(), "<div>è</div>");
    }

    #[test]
    fn lone_angle_bracket_is_text() {
        let page = Page::parse("<p>1 < 2</p>");
        assert_eq!(page.text_content(page.roots()[0]), "1 < 2");
    }

    #[test]
    fn uppercase_tags_are_lowercased() {
        let page = Page::parse("<DIV ID=\"a\">x</DIV>");
        assert_eq!(page.element_by_id("a"), Some(page.roots()[0]));
        assert_eq!(page.to_html(), "<div id=\"a\">x</div>");
    }

    #[test]
    fn raw_text_end_tag_case_insensitive() {
        let page = Page::parse("<style>p{}</STYLE><p>after</p>");
        assert_eq!(page.roots().len(), 2);
    }
}
