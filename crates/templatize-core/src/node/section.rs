use super::{join_key, split_key, Binding, Keyed, Node, PassToFunctionNode, TagNode};
use crate::directive::Directive;
use crate::error::{TemplateError, TemplateResult};

/// Partial include, `{{>name}}`
#[derive(Debug, Clone, PartialEq)]
pub struct PartialNode {
    pub raw: String,
    /// Partial name, also the key of the data it is rendered against
    pub key: String,
    pub keysplit: Vec<String>,
    /// Render against the enclosing scope instead of the root data
    pub incontext: bool,
    pub format: Option<String>,
    pub escape: bool,
}

impl PartialNode {
    pub fn from_tag(tag: TagNode) -> TemplateResult<Self> {
        if !tag.func.is_empty() {
            return Err(TemplateError::invalid_tag(
                "partial tag cannot be paired with pass-to-function directive",
                tag.raw,
            ));
        }
        Ok(Self {
            raw: tag.raw,
            key: tag.key,
            keysplit: tag.keysplit,
            incontext: tag.incontext,
            format: tag.format,
            escape: tag.escape,
        })
    }
}

impl Keyed for PartialNode {
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

/// Section opened by `#`, `^`, `&#` or `#->` and closed by `/`
#[derive(Debug, Clone, PartialEq)]
pub struct SectionNode {
    pub key: String,
    pub keysplit: Vec<String>,
    pub incontext: bool,
    /// Nodes between open and close tags
    pub inner: Vec<Node>,
    /// The opening tag
    pub open: TagNode,
    /// Displayed when truthy (`false` for `^`)
    pub inclusive: bool,
    /// Repeated output joined as a natural-language list
    pub list: bool,
    /// Rendered inner text is passed to the function chain
    pub passcontext: bool,
    /// Function chain; a pass section's own key is its first link
    pub func: Vec<PassToFunctionNode>,
}

impl SectionNode {
    pub fn from_tag(tag: TagNode) -> TemplateResult<Self> {
        if tag.format.is_some() {
            return Err(TemplateError::invalid_tag(
                "format passed to section tag",
                tag.raw,
            ));
        }
        if tag.escape {
            return Err(TemplateError::invalid_tag(
                "escape directive passed to section tag",
                tag.raw,
            ));
        }

        let inclusive = tag.directive != Some(Directive::SectionExclude);
        let list = tag.directive == Some(Directive::ListSection);
        let passcontext = tag.directive == Some(Directive::PassSection);
        let func = if passcontext {
            let mut func = vec![PassToFunctionNode::for_section(&tag.key, tag.incontext)];
            func.extend(tag.func.iter().cloned());
            func
        } else {
            tag.func.clone()
        };

        Ok(Self {
            key: tag.key.clone(),
            keysplit: tag.keysplit.clone(),
            incontext: tag.incontext,
            inner: Vec::new(),
            open: tag,
            inclusive,
            list,
            passcontext,
            func,
        })
    }

    pub fn raw(&self) -> &str {
        &self.open.raw
    }

    /// Copy of this section, without children, with in-context keys
    /// rewritten against `scope`.
    ///
    /// Used when the section is deferred: it gets re-bound against a scope
    /// other than the one it was resolved in, so relative keys must keep
    /// pointing at the same data.
    pub(crate) fn anchored(&self, scope: &str) -> SectionNode {
        let mut section = SectionNode {
            key: self.key.clone(),
            keysplit: self.keysplit.clone(),
            incontext: self.incontext,
            inner: Vec::new(),
            open: self.open.clone(),
            inclusive: self.inclusive,
            list: self.list,
            passcontext: self.passcontext,
            func: self.func.clone(),
        };
        if section.incontext {
            let key = join_key(scope, &section.key);
            if !key.is_empty() {
                section.incontext = false;
                section.keysplit = split_key(&key);
                section.key = key;
            }
        }
        for link in &mut section.func {
            if link.incontext {
                let key = join_key(scope, &link.key);
                if !key.is_empty() {
                    link.incontext = false;
                    link.keysplit = split_key(&key);
                    link.key = key;
                }
            }
        }
        section
    }
}

impl Keyed for SectionNode {
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

impl Binding for SectionNode {
    fn raw(&self) -> &str {
        &self.open.raw
    }

    fn func(&self) -> &[PassToFunctionNode] {
        &self.func
    }

    fn passes_context(&self) -> bool {
        self.passcontext
    }
}
