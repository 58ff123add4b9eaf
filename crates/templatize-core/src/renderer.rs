//! Template renderer
//!
//! Renders a parsed template against a scope tree in two passes:
//!
//! 1. Outside-in: walks the tree top-down, rendering every tag and
//!    non-repeating section whose data is already known. Hidden sections are
//!    dropped without being walked. Repeating and pass-as-context sections
//!    are copied with their known content pre-rendered and kept for pass 2.
//! 2. Inside-out: expands what is left, creating a dynamic scope per loop
//!    item or function result, then flattens everything to text.

use crate::config::RenderOptions;
use crate::context::Context;
use crate::domain::{DomainId, DomainTree};
use crate::error::{TemplateError, TemplateResult};
use crate::format::{format_value, join_list};
use crate::node::{Binding, Keyed, Node, PartialNode, RootNode, SectionNode, TagNode};
use crate::template::Template;
use crate::value::{evaluate, FunctionPolicy, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Nested partial limit
pub const MAX_PARTIAL_DEPTH: usize = 32;

/// Reserved record key overriding section truthiness
pub const DISPLAY_KEY: &str = "_display";

/// Compiled partials by name
pub type CompiledPartials = HashMap<String, Arc<Template>>;

/// Per-render state
pub struct Renderer<'a> {
    options: &'a RenderOptions,
    partials: &'a CompiledPartials,
    tree: DomainTree,
    /// Scope the render starts from
    top: DomainId,
    depth: usize,
}

impl<'a> Renderer<'a> {
    pub fn new(options: &'a RenderOptions, partials: &'a CompiledPartials, data: Value) -> Self {
        let tree = DomainTree::new(data);
        let top = tree.root();
        Self {
            options,
            partials,
            tree,
            top,
            depth: 0,
        }
    }

    /// Render the template tree to a string
    pub fn render(&mut self, root: &RootNode) -> TemplateResult<String> {
        let top = self.top;
        let mut staged = Vec::new();
        self.outside_in(&root.inner, top, true, &mut Vec::new(), &mut staged)?;
        debug!(
            deferred = staged.iter().filter(|n| !matches!(n, Node::Text(_))).count(),
            "Outside-in pass complete"
        );
        self.inside_out(&staged, top, &mut Vec::new())
    }

    fn policy<'n>(&self, raw: &'n str) -> FunctionPolicy<'n> {
        FunctionPolicy {
            raw,
            propagate: self.options.error_on_func_failure,
        }
    }

    /// Pass 1. `in_scope` is false inside repeating sections, where the
    /// enclosing scope is not the one in-context keys will bind to.
    /// `unresolved` holds scopes of enclosing sections still to expand.
    fn outside_in(
        &mut self,
        nodes: &[Node],
        domain: DomainId,
        in_scope: bool,
        unresolved: &mut Vec<DomainId>,
        out: &mut Vec<Node>,
    ) -> TemplateResult<()> {
        for node in nodes {
            match node {
                Node::Text(text) => push_text(out, text),
                Node::Partial(partial) => {
                    if partial.incontext && !in_scope {
                        out.push(node.clone());
                    } else {
                        let text = self.partial(partial, domain)?;
                        push_text(out, &text);
                    }
                }
                Node::Tag(tag) => {
                    if self.must_defer(tag, in_scope, unresolved) {
                        out.push(node.clone());
                        continue;
                    }
                    match Context::resolve(tag, &mut self.tree, domain, &[], self.options)? {
                        Some(context) => {
                            let text = self.render_tag(tag, &context);
                            push_text(out, &text);
                        }
                        // nothing can bring an in-context key into this scope later
                        None if tag.incontext && in_scope => self.missing(&tag.raw)?,
                        None => out.push(node.clone()),
                    }
                }
                Node::Section(section) => {
                    if self.must_defer(section, in_scope, unresolved) {
                        out.push(node.clone());
                        continue;
                    }
                    let Some(context) =
                        Context::resolve(section, &mut self.tree, domain, &[], self.options)?
                    else {
                        if section.incontext && in_scope {
                            self.missing(section.raw())?;
                            if !section.inclusive {
                                self.outside_in(&section.inner, domain, in_scope, unresolved, out)?;
                            }
                        } else {
                            out.push(node.clone());
                        }
                        continue;
                    };
                    self.outside_in_section(section, context, domain, in_scope, unresolved, out)?;
                }
            }
        }
        Ok(())
    }

    fn outside_in_section(
        &mut self,
        section: &SectionNode,
        context: Context,
        domain: DomainId,
        in_scope: bool,
        unresolved: &mut Vec<DomainId>,
        out: &mut Vec<Node>,
    ) -> TemplateResult<()> {
        if section.passcontext {
            // children keep their scope; only the text is needed first
            let mut copy = section.anchored(self.tree.fullkey(domain));
            unresolved.push(context.domain);
            let result = self.outside_in(&section.inner, domain, in_scope, unresolved, &mut copy.inner);
            unresolved.pop();
            result?;
            out.push(Node::Section(copy));
            return Ok(());
        }

        if context.is_repeating {
            if !section.inclusive {
                if context.length == 0 {
                    self.outside_in(&section.inner, domain, in_scope, unresolved, out)?;
                }
                return Ok(());
            }
            if context.length == 0 {
                return Ok(());
            }
            let mut copy = section.anchored(self.tree.fullkey(domain));
            let scope = context.to_dynamic_domain(&mut self.tree);
            unresolved.push(scope);
            let result = self.outside_in(&section.inner, domain, false, unresolved, &mut copy.inner);
            unresolved.pop();
            result?;
            out.push(Node::Section(copy));
            return Ok(());
        }

        let value = context.value.clone().unwrap_or_default();
        if self.display(section.inclusive, &value, section.raw())? {
            let scope = context.to_dynamic_domain(&mut self.tree);
            self.outside_in(&section.inner, scope, true, unresolved, out)?;
        }
        Ok(())
    }

    /// Whether a binding has to wait for pass 2
    fn must_defer<B: Binding>(&self, node: &B, in_scope: bool, unresolved: &[DomainId]) -> bool {
        if !in_scope && (node.incontext() || node.func().iter().any(|link| link.incontext)) {
            return true;
        }
        let keys = std::iter::once(node as &dyn Keyed)
            .chain(node.func().iter().map(|link| link as &dyn Keyed))
            .filter(|keyed| !keyed.incontext())
            .map(|keyed| keyed.key());
        for key in keys {
            if unresolved.iter().any(|&scope| self.tree.incontext(scope, key)) {
                return true;
            }
        }
        false
    }

    /// Pass 2: expand sections, then resolve deferred tags and flatten
    fn inside_out(
        &mut self,
        nodes: &[Node],
        domain: DomainId,
        dynamics: &mut Vec<DomainId>,
    ) -> TemplateResult<String> {
        let mut pieces: Vec<Option<String>> = Vec::with_capacity(nodes.len());
        for node in nodes {
            pieces.push(match node {
                Node::Section(section) => Some(self.inside_out_section(section, domain, dynamics)?),
                _ => None,
            });
        }

        let mut text = String::new();
        for (node, piece) in nodes.iter().zip(pieces) {
            match (node, piece) {
                (_, Some(rendered)) => text.push_str(&rendered),
                (Node::Text(literal), None) => text.push_str(literal),
                (Node::Tag(tag), None) => {
                    match Context::resolve(tag, &mut self.tree, domain, dynamics, self.options)? {
                        Some(context) => text.push_str(&self.render_tag(tag, &context)),
                        None => self.missing(&tag.raw)?,
                    }
                }
                (Node::Partial(partial), None) => text.push_str(&self.partial(partial, domain)?),
                (Node::Section(_), None) => {}
            }
        }
        Ok(text)
    }

    fn inside_out_section(
        &mut self,
        section: &SectionNode,
        domain: DomainId,
        dynamics: &mut Vec<DomainId>,
    ) -> TemplateResult<String> {
        let Some(context) = Context::resolve(section, &mut self.tree, domain, dynamics, self.options)?
        else {
            // absent data behaves as an empty value
            self.missing(section.raw())?;
            return if section.inclusive {
                Ok(String::new())
            } else {
                self.inside_out(&section.inner, domain, dynamics)
            };
        };

        if section.passcontext {
            let inner = self.inside_out(&section.inner, domain, dynamics)?;
            let value = context.pass_through(section, &self.tree, Value::String(inner), self.options)?;
            return Ok(format_value(&value, None, false, self.options.formatter()));
        }

        if context.is_repeating {
            if !section.inclusive {
                return if context.length == 0 {
                    self.inside_out(&section.inner, domain, dynamics)
                } else {
                    Ok(String::new())
                };
            }
            let policy = self.policy(section.raw());
            let scope = context.to_dynamic_domain(&mut self.tree);
            let mut items = Vec::with_capacity(context.length);
            for index in 0..context.length {
                let item = self.tree.dynamic_get(scope, index, policy)?;
                let value = self.tree.value(item, policy)?.clone();
                if !self.display(true, &value, section.raw())? {
                    continue;
                }
                dynamics.push(item);
                let rendered = self.inside_out(&section.inner, item, dynamics);
                dynamics.pop();
                items.push(rendered?);
            }
            return Ok(if section.list {
                join_list(items)
            } else {
                items.concat()
            });
        }

        let value = context.value.clone().unwrap_or_default();
        if !self.display(section.inclusive, &value, section.raw())? {
            return Ok(String::new());
        }
        let scope = context.to_dynamic_domain(&mut self.tree);
        if !context.is_dynamic {
            return self.inside_out(&section.inner, scope, dynamics);
        }
        dynamics.push(scope);
        let rendered = self.inside_out(&section.inner, scope, dynamics);
        dynamics.pop();
        rendered
    }

    /// Section truthiness compared against its polarity
    fn display(&self, inclusive: bool, value: &Value, raw: &str) -> TemplateResult<bool> {
        let shown = match value.get(DISPLAY_KEY) {
            Some(Value::Function(lambda)) => {
                let root = self.tree.data(self.tree.root());
                let resolved = evaluate(lambda, value, root, self.policy(raw))?;
                self.truthy(&resolved)
            }
            Some(flag) => self.truthy(flag),
            None => self.truthy(value),
        };
        Ok(shown == inclusive)
    }

    fn truthy(&self, value: &Value) -> bool {
        match value {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) if *n == 0.0 => self.options.eval_zero_as_true,
            Value::Number(n) => !n.is_nan(),
            Value::String(s) => !s.trim().is_empty(),
            Value::Array(items) => !items.is_empty(),
            Value::Object(_) | Value::Function(_) => true,
        }
    }

    fn missing(&self, raw: &str) -> TemplateResult<()> {
        if self.options.error_on_missing_tags {
            return Err(TemplateError::missing_binding(raw));
        }
        warn!(tag = raw, "Missing binding");
        Ok(())
    }

    fn render_tag(&self, tag: &TagNode, context: &Context) -> String {
        let Some(value) = context.value.as_ref() else {
            return String::new();
        };
        if tag.func.is_empty() {
            self.render_value(
                tag,
                value,
                tag.format.as_deref(),
                tag.escape || self.options.escape_all,
            )
        } else {
            // the chain applied its own formats already
            let escape = self.options.escape_all && !tag.output_escaped();
            self.render_value(tag, value, None, escape)
        }
    }

    fn render_value(&self, tag: &TagNode, value: &Value, format: Option<&str>, escape: bool) -> String {
        let numbers = self.options.formatter();
        match value {
            Value::Null => String::new(),
            Value::Array(items) if tag.is_list() => join_list(
                items
                    .iter()
                    .map(|item| match item {
                        Value::Array(_) => format!("[{}]", item.to_plain_string()),
                        _ => format_value(item, format, escape, numbers),
                    })
                    .collect(),
            ),
            Value::Array(_) => {
                let literal = Value::String(format!("[{}]", value.to_plain_string()));
                format_value(&literal, None, escape, numbers)
            }
            Value::Object(_) | Value::Function(_) => {
                format_value(&Value::String(value.to_plain_string()), None, escape, numbers)
            }
            _ => format_value(value, format, escape, numbers),
        }
    }

    /// Render a partial in its own scope tree. An in-context partial starts
    /// at a copy of the current scope but still sees the root data. Failures
    /// inside the partial never abort the enclosing render.
    fn partial(&mut self, node: &PartialNode, domain: DomainId) -> TemplateResult<String> {
        let partials = self.partials;
        let Some(template) = partials.get(&node.key) else {
            if self.options.error_on_missing_tags {
                return Err(TemplateError::missing_partial(&node.key, &node.raw));
            }
            warn!(partial = %node.key, tag = %node.raw, "Missing partial");
            return Ok(String::new());
        };
        if self.depth >= MAX_PARTIAL_DEPTH {
            warn!(partial = %node.key, depth = self.depth, "Partial nesting too deep");
            return Ok(String::new());
        }

        let root = self.tree.data(self.tree.root()).clone();
        let (tree, top) = if node.incontext {
            let value = self.tree.value(domain, self.policy(&node.raw))?.clone();
            DomainTree::scoped(root, self.tree.fullkey(domain), value)
        } else {
            let tree = DomainTree::new(root);
            let top = tree.root();
            (tree, top)
        };
        let mut nested = Renderer {
            options: self.options,
            partials,
            tree,
            top,
            depth: self.depth + 1,
        };
        match nested.render(template.root()) {
            Ok(text) if node.format.is_some() || node.escape => Ok(format_value(
                &Value::String(text),
                node.format.as_deref(),
                node.escape,
                self.options.formatter(),
            )),
            Ok(text) => Ok(text),
            Err(err) => {
                warn!(partial = %node.key, tag = %node.raw, error = %err, "Partial render failed");
                Ok(String::new())
            }
        }
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
#[path = "renderer_tests.rs"]
mod renderer_tests;
