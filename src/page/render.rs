// src/page/render.rs  —  Page → HTML, text escaping
use super::parse::is_void;
use super::{Node, NodeId, Page};

pub fn render(page: &Page) -> String {
    let mut out = String::new();
    for &id in page.roots() {
        render_node(page, id, &mut out);
    }
    out
}

fn render_node(page: &Page, id: NodeId, out: &mut String) {
    let Some(node) = page.node(id) else { return };
    match node {
        Node::Text(t) | Node::Raw(t) => out.push_str(t),
        Node::Comment(c) => {
            out.push_str("<!--");
            out.push_str(c);
            out.push_str("-->");
        }
        Node::Declaration(d) => {
            out.push('<');
            out.push_str(d);
            out.push('>');
        }
        Node::Element(e) => {
            out.push('<');
            out.push_str(&e.tag);
            for (name, value) in &e.attrs {
                out.push(' ');
                out.push_str(name);
                if let Some(v) = value {
                    // Values are stored as written; pick a quote that keeps them intact
                    let q = if v.contains('"') { '\'' } else { '"' };
                    out.push('=');
                    out.push(q);
                    out.push_str(v);
                    out.push(q);
                }
            }
            if e.self_closing {
                out.push_str(" />");
                return;
            }
            out.push('>');
            if is_void(&e.tag) {
                return;
            }
            for &child in &e.children {
                render_node(page, child, out);
            }
            out.push_str("</");
            out.push_str(&e.tag);
            out.push('>');
        }
    }
}

/// Escape text content (`textContent` semantics)
pub fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _   => out.push(c),
        }
    }
    out
}

/// Decode the handful of entities worth showing as characters in a terminal.
/// Numeric references are decoded; unknown named ones are left as written.
pub fn decode_entities(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let Some(semi) = tail.find(';').filter(|&i| i <= 10) else {
            out.push('&');
            rest = &tail[1..];
            continue;
        };
        let entity = &tail[1..semi];
        let decoded = match entity {
            "amp"  => Some('&'),
            "lt"   => Some('<'),
            "gt"   => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            "nbsp" => Some('\u{a0}'),
            _ => entity
                .strip_prefix("#x")
                .or_else(|| entity.strip_prefix("#X"))
                .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                .or_else(|| entity.strip_prefix('#').and_then(|dec| dec.parse().ok()))
                .and_then(char::from_u32),
        };
        match decoded {
            Some(c) => {
                out.push(c);
                rest = &tail[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}
