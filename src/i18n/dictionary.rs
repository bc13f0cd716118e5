// src/i18n/dictionary.rs  —  Nested translation tree + dotted-key lookup
use serde_json::{Map, Value};

use super::loader::LoadError;

/// Translation tree for one language: objects nest, string leaves translate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dictionary {
    tree: Map<String, Value>,
}

impl Dictionary {
    /// The root must be a JSON object; anything else is rejected.
    pub fn from_value(value: Value) -> Result<Self, LoadError> {
        match value {
            Value::Object(tree) => Ok(Self { tree }),
            _ => Err(LoadError::NotAnObject),
        }
    }

    pub fn from_json(raw: &str) -> Result<Self, LoadError> {
        Self::from_value(serde_json::from_str(raw)?)
    }

    /// Resolve `nav.home` through the tree. `None` when a segment is missing,
    /// the path ends on a subtree or a non-string, or the leaf is empty.
    pub fn lookup(&self, key: &str) -> Option<&str> {
        lookup(&self.tree, key)
    }

    /// Translation, or the key itself when unresolved
    pub fn translate<'a>(&'a self, key: &'a str) -> &'a str {
        self.lookup(key).unwrap_or(key)
    }

    /// Every string leaf as `(dotted.key, value)`, in key order
    pub fn entries(&self) -> Vec<(String, String)> {
        let mut out = Vec::new();
        flatten("", &self.tree, &mut out);
        out.sort();
        out
    }

    pub fn is_empty(&self) -> bool { self.tree.is_empty() }
}

/// Walk a dotted path through a JSON object tree
pub fn lookup<'a>(tree: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    let mut segments = key.split('.');
    let first = segments.next()?;
    let mut node = tree.get(first)?;
    for segment in segments {
        node = node.as_object()?.get(segment)?;
    }
    node.as_str().filter(|s| !s.is_empty())
}

fn flatten(prefix: &str, tree: &Map<String, Value>, out: &mut Vec<(String, String)>) {
    for (key, value) in tree {
        let path = if prefix.is_empty() { key.clone() } else { format!("{prefix}.{key}") };
        match value {
            Value::Object(sub) => flatten(&path, sub, out),
            Value::String(s)   => out.push((path, s.clone())),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dict(raw: &str) -> Dictionary { Dictionary::from_json(raw).unwrap() }

    #[test]
    fn resolves_nested_leaf() {
        let d = dict(r#"{"nav":{"home":"Home"}}"#);
        assert_eq!(d.lookup("nav.home"), Some("Home"));
        assert_eq!(d.translate("nav.home"), "Home");
    }

    #[test]
    fn missing_segment_returns_key() {
        let d = dict(r#"{"nav":{"home":"Home"}}"#);
        assert_eq!(d.lookup("nav.about"), None);
        assert_eq!(d.translate("nav.about"), "nav.about");
        assert_eq!(d.translate("missing.key"), "missing.key");
        assert_eq!(d.translate("nav.home.deeper"), "nav.home.deeper");
    }

    #[test]
    fn subtree_and_non_string_leaves_are_unresolved() {
        let d = dict(r#"{"nav":{"home":"Home"},"count":3,"flag":true,"empty":"","list":["a"]}"#);
        assert_eq!(d.lookup("nav"), None);
        assert_eq!(d.lookup("count"), None);
        assert_eq!(d.lookup("flag"), None);
        assert_eq!(d.lookup("empty"), None);
        assert_eq!(d.lookup("list.0"), None);
    }

    #[test]
    fn empty_key_is_unresolved() {
        let d = dict(r#"{"a":"b"}"#);
        assert_eq!(d.lookup(""), None);
        assert_eq!(d.lookup("a."), None);
    }

    #[test]
    fn root_must_be_object() {
        assert!(matches!(Dictionary::from_json("[1,2]"), Err(LoadError::NotAnObject)));
        assert!(matches!(Dictionary::from_json("\"x\""), Err(LoadError::NotAnObject)));
        assert!(matches!(Dictionary::from_json("{"), Err(LoadError::Parse(_))));
    }

    #[test]
    fn entries_flatten_string_leaves() {
        let d = dict(r#"{"b":{"y":"Y","x":"X"},"a":"A","n":1}"#);
        assert_eq!(
            d.entries(),
            vec![
                ("a".to_string(), "A".to_string()),
                ("b.x".to_string(), "X".to_string()),
                ("b.y".to_string(), "Y".to_string()),
            ]
        );
    }
}
