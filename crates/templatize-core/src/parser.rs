//! Template parser
//!
//! Scans a template for delimiter pairs and assembles the node tree.

use crate::config::Delimiters;
use crate::directive::Directive;
use crate::error::{TemplateError, TemplateResult};
use crate::node::{Node, PartialNode, RootNode, SectionNode, TagNode};
use tracing::debug;

/// Template parser
pub struct TemplateParser;

impl TemplateParser {
    /// Parse a template string into its node tree
    pub fn parse(source: &str, delimiters: &Delimiters) -> TemplateResult<RootNode> {
        let open_delim = delimiters.open();
        let close_delim = delimiters.close();
        let escape = Directive::TagEscape.symbol();

        let mut root: Vec<Node> = Vec::new();
        // open sections, innermost last
        let mut stack: Vec<SectionNode> = Vec::new();
        let mut last = 0;
        let mut search = 0;

        loop {
            let Some(open) = find_from(source, open_delim, search) else {
                break;
            };
            let start = open + open_delim.len();
            let Some(close) = find_from(source, close_delim, start) else {
                break;
            };
            let end = close + close_delim.len();
            search = end;

            // escaped opening delimiter: the whole tag stays literal
            if open >= last + escape.len() && source[..open].ends_with(escape) {
                push_text(
                    target(&mut root, &mut stack),
                    &source[last..open - escape.len()],
                );
                last = open;
                continue;
            }

            push_text(target(&mut root, &mut stack), &source[last..open]);
            last = end;

            let tag = TagNode::parse(&source[open..end], &source[start..close])?;
            match tag.directive {
                Some(Directive::Comment) => {}
                Some(Directive::Partial) => {
                    let partial = PartialNode::from_tag(tag)?;
                    target(&mut root, &mut stack).push(Node::Partial(partial));
                }
                Some(Directive::SectionEnd) => {
                    let Some(section) = stack.pop() else {
                        return Err(TemplateError::invalid_section(
                            "unpaired section close",
                            tag.raw,
                        ));
                    };
                    if section.key != tag.key {
                        return Err(TemplateError::invalid_section(
                            format!("section conflict, close before inner {} closed", section.raw()),
                            tag.raw,
                        ));
                    }
                    target(&mut root, &mut stack).push(Node::Section(section));
                }
                Some(directive) if directive.opens_section() => {
                    stack.push(SectionNode::from_tag(tag)?);
                }
                _ => target(&mut root, &mut stack).push(Node::Tag(tag)),
            }
        }

        push_text(target(&mut root, &mut stack), &source[last..]);

        if let Some(section) = stack.pop() {
            return Err(TemplateError::invalid_section(
                "hanging open section",
                section.open.raw,
            ));
        }

        debug!(nodes = root.len(), "Parsed template");
        Ok(RootNode::new(root))
    }
}

fn find_from(haystack: &str, needle: &str, from: usize) -> Option<usize> {
    haystack.get(from..)?.find(needle).map(|pos| pos + from)
}

fn target<'a>(root: &'a mut Vec<Node>, stack: &'a mut [SectionNode]) -> &'a mut Vec<Node> {
    match stack.last_mut() {
        Some(section) => &mut section.inner,
        None => root,
    }
}

/// Append text, merging with a preceding text node
fn push_text(nodes: &mut Vec<Node>, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(Node::Text(prev)) = nodes.last_mut() {
        prev.push_str(text);
    } else {
        nodes.push(Node::Text(text.to_string()));
    }
}

#[cfg(test)]
#[path = "parser_tests.rs"]
mod parser_tests;
