//! Tag classification
//!
//! Turns the trimmed inner content of one delimited tag into a `TagNode`:
//! leading directive, in-context prefix, pass-to-function chain, format
//! specifier and trailing escape marker, in that order.

use super::{split_key, Binding, Keyed};
use crate::directive::Directive;
use crate::error::{TemplateError, TemplateResult};

/// A single binding point in the template
#[derive(Debug, Clone, PartialEq)]
pub struct TagNode {
    /// Raw tag string, delimiters included
    pub raw: String,
    /// Leading directive, `None` for a plain binding
    pub directive: Option<Directive>,
    /// Data key
    pub key: String,
    pub keysplit: Vec<String>,
    /// Bound relative to the enclosing scope
    pub incontext: bool,
    /// Functions the value is passed through
    pub func: Vec<PassToFunctionNode>,
    /// Format specifier
    pub format: Option<String>,
    /// Forced HTML escaping
    pub escape: bool,
}

impl TagNode {
    /// Classify a tag from its raw text and its inner content.
    pub fn parse(raw: &str, content: &str) -> TemplateResult<Self> {
        let raw = raw.trim();
        let content = content.trim();
        let mut tag = TagNode {
            raw: raw.to_string(),
            directive: None,
            key: String::new(),
            keysplit: Vec::new(),
            incontext: false,
            func: Vec::new(),
            format: None,
            escape: false,
        };

        // empty tags are ignored
        if content.is_empty() {
            tag.directive = Some(Directive::Comment);
            return Ok(tag);
        }

        tag.directive = Directive::leading(content);
        let mut rest = match tag.directive {
            Some(directive) => &content[directive.symbol().len()..],
            None => content,
        };
        if tag.directive == Some(Directive::Comment) {
            tag.key = rest.trim().to_string();
            return Ok(tag);
        }

        if let Some(stripped) = rest.strip_prefix(Directive::InContext.symbol()) {
            tag.incontext = true;
            rest = stripped;
        }

        let mut links = rest.split(Directive::PassContext.symbol());
        let head = links.next().unwrap_or_default();
        let links: Vec<&str> = links.map(str::trim).collect();
        if !links.is_empty() {
            // a bare in-context value may be passed on, e.g. {{.->wrap}}
            if head.trim().is_empty() && !tag.incontext {
                return Err(TemplateError::invalid_tag(
                    "malformatted function context directive",
                    raw,
                ));
            }
            tag.func = links
                .into_iter()
                .map(|name| PassToFunctionNode::parse(name, raw))
                .collect::<TemplateResult<_>>()?;
        }

        let (key, format, escape) = split_format(head, tag.incontext, raw)?;
        if key.is_empty() && !tag.incontext {
            return Err(TemplateError::invalid_tag("empty evaluation", raw));
        }
        tag.keysplit = split_key(&key);
        tag.key = key;
        tag.format = format;
        tag.escape = escape;
        Ok(tag)
    }

    /// Whether the last function link already settled escaping, either by
    /// escaping or through a `raw`, `html` or `encode` format
    pub fn output_escaped(&self) -> bool {
        self.func.last().is_some_and(|link| {
            link.escape || matches!(link.format.as_deref(), Some("raw" | "html" | "encode"))
        })
    }

    pub fn is_list(&self) -> bool {
        self.directive == Some(Directive::List)
    }
}

impl Keyed for TagNode {
    fn key(&self) -> &str {
        &self.key
    }

    fn keysplit(&self) -> &[String] {
        &self.keysplit
    }

    fn incontext(&self) -> bool {
        self.incontext
    }
}

impl Binding for TagNode {
    fn raw(&self) -> &str {
        &self.raw
    }

    fn func(&self) -> &[PassToFunctionNode] {
        &self.func
    }

    fn format(&self) -> Option<&str> {
        self.format.as_deref()
    }

    fn escape(&self) -> bool {
        self.escape
    }
}

/// One link in a pass-to-function chain
#[derive(Debug, Clone, PartialEq)]
pub struct PassToFunctionNode {
    pub key: String,
    pub keysplit: Vec<String>,
    pub incontext: bool,
    /// Format applied to this link's output
    pub format: Option<String>,
    /// Escape applied to this link's output
    pub escape: bool,
}

impl PassToFunctionNode {
    /// Parse one function name from a chain; `raw` is the owning tag.
    pub fn parse(name: &str, raw: &str) -> TemplateResult<Self> {
        let separator = Directive::PassContext.symbol();
        if name.is_empty() || name.starts_with(|c: char| separator.contains(c)) {
            return Err(TemplateError::invalid_tag(
                "malformatted pass-to-function",
                raw,
            ));
        }

        let (incontext, name) = match name.strip_prefix(Directive::InContext.symbol()) {
            Some(stripped) => (true, stripped),
            None => (false, name),
        };
        let (key, format, escape) = split_format(name, incontext, raw)?;
        if key.is_empty() && !incontext {
            return Err(TemplateError::invalid_tag("empty evaluation", raw));
        }

        Ok(Self {
            keysplit: split_key(&key),
            key,
            incontext,
            format,
            escape,
        })
    }

    /// Function link bound to a section's own key (pass-as-context sections)
    pub(crate) fn for_section(key: &str, incontext: bool) -> Self {
        Self {
            key: key.to_string(),
            keysplit: split_key(key),
            incontext,
            format: None,
            escape: false,
        }
    }
}

impl Keyed for PassToFunctionNode {
    fn key(&self) -> &str {
        &self.key
    }

    fn keysplit(&self) -> &[String] {
        &self.keysplit
    }

    fn incontext(&self) -> bool {
        self.incontext
    }
}

/// Split the format specifier and trailing escape marker off a key.
fn split_format(
    key: &str,
    incontext: bool,
    raw: &str,
) -> TemplateResult<(String, Option<String>, bool)> {
    let symbol = Directive::Format.symbol();
    let parts: Vec<&str> = key.split(symbol).collect();
    let (mut key, mut format) = match parts.as_slice() {
        [key] => (key.trim().to_string(), None),
        [key, format] => {
            let format = format.trim();
            if format.is_empty()
                || format.starts_with(|c: char| symbol.contains(c))
                || (key.trim().is_empty() && !incontext)
            {
                return Err(TemplateError::invalid_tag(
                    "malformatted format directive",
                    raw,
                ));
            }
            (key.trim().to_string(), Some(format.to_string()))
        }
        _ => {
            return Err(TemplateError::invalid_tag(
                "multiple format directives",
                raw,
            ));
        }
    };

    let marker = Directive::Escape.symbol();
    let mut escape = false;
    if let Some(stripped) = key.strip_suffix(marker) {
        escape = true;
        key = stripped.trim_end().to_string();
    }
    if let Some(spec) = format.as_deref() {
        if let Some(stripped) = spec.strip_suffix(marker) {
            escape = true;
            let stripped = stripped.trim_end();
            if stripped.is_empty() {
                return Err(TemplateError::invalid_tag(
                    "malformatted format directive",
                    raw,
                ));
            }
            format = Some(stripped.to_string());
        }
    }

    Ok((key, format, escape))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(content: &str) -> TagNode {
        TagNode::parse(&format!("{{{{{content}}}}}"), content).expect("tag should parse")
    }

    fn tag_err(content: &str) -> TemplateError {
        TagNode::parse(&format!("{{{{{content}}}}}"), content).expect_err("tag should fail")
    }

    #[test]
    fn test_plain_tag() {
        let t = tag(" user.name ");
        assert_eq!(t.directive, None);
        assert_eq!(t.key, "user.name");
        assert_eq!(t.keysplit, vec!["user", "name"]);
        assert!(!t.incontext);
        assert!(t.func.is_empty());
    }

    #[test]
    fn test_empty_tag_is_comment() {
        let t = tag("   ");
        assert_eq!(t.directive, Some(Directive::Comment));
    }

    #[test]
    fn test_comment_skips_validation() {
        let t = tag("! a :: b :: c -> ");
        assert_eq!(t.directive, Some(Directive::Comment));
    }

    #[test]
    fn test_bare_in_context() {
        let t = tag(".");
        assert!(t.incontext);
        assert_eq!(t.key, "");
        assert!(t.keysplit.is_empty());
    }

    #[test]
    fn test_in_context_stacks_after_directive() {
        let t = tag("#.items");
        assert_eq!(t.directive, Some(Directive::SectionInclude));
        assert!(t.incontext);
        assert_eq!(t.key, "items");
    }

    #[test]
    fn test_format_and_escape() {
        let t = tag("price::,.2f;");
        assert_eq!(t.key, "price");
        assert_eq!(t.format.as_deref(), Some(",.2f"));
        assert!(t.escape);

        let t = tag("bio;");
        assert_eq!(t.key, "bio");
        assert!(t.escape);
        assert!(t.format.is_none());
    }

    #[test]
    fn test_in_context_format() {
        let t = tag(".::upper");
        assert!(t.incontext);
        assert_eq!(t.key, "");
        assert_eq!(t.format.as_deref(), Some("upper"));
    }

    #[test]
    fn test_pass_to_function_chain() {
        let t = tag("name -> greet::upper -> .wrap;");
        assert_eq!(t.key, "name");
        assert_eq!(t.func.len(), 2);
        assert_eq!(t.func[0].key, "greet");
        assert_eq!(t.func[0].format.as_deref(), Some("upper"));
        assert!(t.func[1].incontext);
        assert_eq!(t.func[1].key, "wrap");
        assert!(t.func[1].escape);
        assert!(t.output_escaped());
    }

    #[test]
    fn test_list_directive() {
        let t = tag("&items");
        assert!(t.is_list());
        assert_eq!(t.key, "items");
    }

    #[test]
    fn test_invalid_tags() {
        assert!(matches!(tag_err("#"), TemplateError::InvalidTag { .. }));
        assert!(tag_err("->greet").to_string().contains("function context"));
        assert!(tag_err("name->").to_string().contains("pass-to-function"));
        assert!(tag_err("name->->greet").to_string().contains("pass-to-function"));
        assert!(tag_err("a::b::c").to_string().contains("multiple format"));
        assert!(tag_err("name::").to_string().contains("malformatted format"));
        assert!(tag_err("::upper").to_string().contains("malformatted format"));
        assert!(tag_err("name::;").to_string().contains("malformatted format"));
    }

    #[test]
    fn test_error_names_raw_tag() {
        let err = tag_err("a::b::c");
        assert!(err.to_string().ends_with("at {{a::b::c}}"));
    }
}
