//! Template AST
//!
//! Node types produced by the parser:
//! - Text: literal output
//! - Tag: a single binding point, e.g. `{{user.name::upper}}`
//! - Partial: `{{>header}}`
//! - Section: `{{#items}}...{{/items}}` and its exclusive / list / pass variants
//!
//! Sections own their children outright. The tree carries no parent links;
//! the parser tracks open sections on a stack instead.

mod section;
mod tag;

pub use section::{PartialNode, SectionNode};
pub use tag::{PassToFunctionNode, TagNode};

/// A node in the template AST
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Plain text content
    Text(String),
    /// Binding tag
    Tag(TagNode),
    /// Partial include
    Partial(PartialNode),
    /// Section with nested content
    Section(SectionNode),
}

impl Node {
    /// Raw tag text for tag-like nodes
    pub fn raw(&self) -> Option<&str> {
        match self {
            Node::Text(_) => None,
            Node::Tag(tag) => Some(&tag.raw),
            Node::Partial(partial) => Some(&partial.raw),
            Node::Section(section) => Some(section.raw()),
        }
    }
}

/// Top of the tree, owning all top-level nodes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RootNode {
    pub inner: Vec<Node>,
}

impl RootNode {
    pub fn new(inner: Vec<Node>) -> Self {
        Self { inner }
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

/// Anything addressed by a dotted key path
pub trait Keyed {
    /// Data key (without directive symbols)
    fn key(&self) -> &str;

    /// Key split on `.`; empty for a bare in-context reference
    fn keysplit(&self) -> &[String];

    /// Whether the key is relative to the enclosing scope
    fn incontext(&self) -> bool;
}

/// A node that resolves to a value at render time (tags and sections)
pub trait Binding: Keyed {
    /// Raw tag text, delimiters included
    fn raw(&self) -> &str;

    /// Pass-to-function chain, applied left to right
    fn func(&self) -> &[PassToFunctionNode];

    /// Format specifier applied to the node's own value
    fn format(&self) -> Option<&str> {
        None
    }

    /// Whether the node's own value is HTML-escaped
    fn escape(&self) -> bool {
        false
    }

    /// Whether resolution waits for rendered section text
    fn passes_context(&self) -> bool {
        false
    }
}

/// Split a key on `.`
pub(crate) fn split_key(key: &str) -> Vec<String> {
    if key.is_empty() {
        Vec::new()
    } else {
        key.split('.').map(str::to_string).collect()
    }
}

/// Join a scope's full key and a relative key into an absolute path
pub(crate) fn join_key(scope: &str, key: &str) -> String {
    match (scope.is_empty(), key.is_empty()) {
        (true, _) => key.to_string(),
        (false, true) => scope.to_string(),
        (false, false) => format!("{scope}.{key}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_key() {
        assert_eq!(split_key("a.b.c"), vec!["a", "b", "c"]);
        assert!(split_key("").is_empty());
    }

    #[test]
    fn test_join_key() {
        assert_eq!(join_key("", "name"), "name");
        assert_eq!(join_key("user", ""), "user");
        assert_eq!(join_key("user", "name"), "user.name");
    }
}
