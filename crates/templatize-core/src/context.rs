//! Binding resolution
//!
//! A `Context` ties one tag or section to the scope it resolves in, plus the
//! scopes of any functions its value is passed through. Contexts are created
//! fresh for every node evaluation and thrown away afterwards.

use crate::config::RenderOptions;
use crate::domain::{DomainId, DomainTree, DynamicKey};
use crate::error::{TemplateError, TemplateResult};
use crate::format::format_value;
use crate::node::{Binding, Keyed};
use crate::value::{evaluate, FunctionPolicy, Lambda, Value};

/// A node bound to its scope
#[derive(Debug)]
pub struct Context {
    /// Scope of the node's own key
    pub domain: DomainId,
    /// Scope of each function in the chain
    pub func: Vec<DomainId>,
    functions: Vec<Lambda>,
    /// Resolved value; `None` while a pass section waits for its text
    pub value: Option<Value>,
    pub is_repeating: bool,
    /// Value depends on a loop item or a function result
    pub is_dynamic: bool,
    pub length: usize,
}

impl Context {
    /// Resolve `node` against `domain` and the active dynamic scopes
    /// (innermost last).
    ///
    /// Returns `Ok(None)` when the key cannot be found yet. A function
    /// reference that cannot be found, or that is not a function, is an
    /// error.
    pub fn resolve<B: Binding + ?Sized>(
        node: &B,
        tree: &mut DomainTree,
        domain: DomainId,
        dynamics: &[DomainId],
        options: &RenderOptions,
    ) -> TemplateResult<Option<Self>> {
        let policy = FunctionPolicy {
            raw: node.raw(),
            propagate: options.error_on_func_failure,
        };
        let Some(found) = find_domain(tree, node, domain, dynamics, policy)? else {
            return Ok(None);
        };

        if node.func().is_empty() {
            let value = tree.value(found, policy)?.clone();
            let is_repeating = tree.is_repeating(found);
            return Ok(Some(Self {
                domain: found,
                func: Vec::new(),
                functions: Vec::new(),
                value: Some(value),
                is_repeating,
                is_dynamic: is_repeating,
                length: tree.dynamic_len(found),
            }));
        }

        let mut func = Vec::with_capacity(node.func().len());
        let mut functions = Vec::with_capacity(node.func().len());
        for link in node.func() {
            let Some(fdomain) = find_domain(tree, link, domain, dynamics, policy)? else {
                return Err(TemplateError::unresolved_function(node.raw()));
            };
            let Some(lambda) = tree.function(fdomain) else {
                return Err(TemplateError::non_function(node.raw()));
            };
            functions.push(lambda.clone());
            func.push(fdomain);
        }

        let mut context = Self {
            domain: found,
            func,
            functions,
            value: None,
            is_repeating: false,
            is_dynamic: true,
            length: 0,
        };
        if node.passes_context() {
            return Ok(Some(context));
        }

        let mut value = tree.value(found, policy)?.clone();
        if node.format().is_some() || node.escape() {
            value = Value::String(format_value(
                &value,
                node.format(),
                node.escape(),
                options.formatter(),
            ));
        }
        let value = context.pass_through(node, tree, value, options)?;
        context.length = match &value {
            Value::Null => 0,
            Value::Array(items) => {
                context.is_repeating = true;
                items.len()
            }
            _ => 1,
        };
        context.value = Some(value);
        Ok(Some(context))
    }

    /// Thread a value through the function chain, left to right. Each
    /// link's own format and escape apply to that link's output.
    pub fn pass_through<B: Binding + ?Sized>(
        &self,
        node: &B,
        tree: &DomainTree,
        value: Value,
        options: &RenderOptions,
    ) -> TemplateResult<Value> {
        let policy = FunctionPolicy {
            raw: node.raw(),
            propagate: options.error_on_func_failure,
        };
        let root = tree.data(tree.root());
        let mut value = value;
        for (lambda, link) in self.functions.iter().zip(node.func()) {
            value = evaluate(lambda, &value, root, policy)?;
            if link.format.is_some() || link.escape {
                value = Value::String(format_value(
                    &value,
                    link.format.as_deref(),
                    link.escape,
                    options.formatter(),
                ));
            }
        }
        Ok(value)
    }

    /// Scope that children of this node resolve against: the plain scope
    /// unless the value came out of a function chain.
    pub fn to_dynamic_domain(&self, tree: &mut DomainTree) -> DomainId {
        if (self.is_repeating && self.func.is_empty()) || !self.is_dynamic {
            return self.domain;
        }
        tree.dynamic_create(
            self.domain,
            DynamicKey::chain(self.func.clone()),
            self.value.clone().unwrap_or_default(),
        )
    }
}

/// Active dynamic scopes are tried innermost first for absolute keys
fn find_domain<K: Keyed + ?Sized>(
    tree: &mut DomainTree,
    node: &K,
    domain: DomainId,
    dynamics: &[DomainId],
    policy: FunctionPolicy<'_>,
) -> TemplateResult<Option<DomainId>> {
    if !node.incontext() {
        for &dynamic in dynamics.iter().rev() {
            if tree.incontext(dynamic, node.key()) {
                return tree.search(dynamic, node, policy);
            }
        }
    }
    tree.search(domain, node, policy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{SectionNode, TagNode};
    use serde_json::json;

    fn tag(content: &str) -> TagNode {
        TagNode::parse(&format!("{{{{{content}}}}}"), content).unwrap()
    }

    fn data() -> Value {
        Value::from(json!({"name": "ada", "items": [1, 2, 3], "n": 5}))
            .with("upper", Value::function(|v, _| Ok(Value::from(v.to_plain_string().to_uppercase()))))
            .with("wrap", Value::function(|v, _| Ok(Value::from(format!("[{}]", v.to_plain_string())))))
            .with("pair", Value::function(|v, _| Ok(Value::from(vec![v.clone(), v.clone()]))))
    }

    #[test]
    fn test_plain_binding() {
        let mut tree = DomainTree::new(data());
        let root = tree.root();
        let ctx = Context::resolve(&tag("items"), &mut tree, root, &[], &RenderOptions::default())
            .unwrap()
            .unwrap();
        assert!(ctx.is_repeating && ctx.is_dynamic);
        assert_eq!(ctx.length, 3);
        assert_eq!(ctx.to_dynamic_domain(&mut tree), ctx.domain);
    }

    #[test]
    fn test_missing_binding_defers() {
        let mut tree = DomainTree::new(data());
        let root = tree.root();
        let ctx = Context::resolve(&tag("nope"), &mut tree, root, &[], &RenderOptions::default()).unwrap();
        assert!(ctx.is_none());
    }

    #[test]
    fn test_function_chain_left_to_right() {
        let mut tree = DomainTree::new(data());
        let root = tree.root();
        let ctx = Context::resolve(&tag("name->upper->wrap"), &mut tree, root, &[], &RenderOptions::default())
            .unwrap()
            .unwrap();
        assert_eq!(ctx.value, Some(Value::from("[ADA]")));
        assert!(ctx.is_dynamic && !ctx.is_repeating);
        let dynamic = ctx.to_dynamic_domain(&mut tree);
        assert_ne!(dynamic, ctx.domain);
        assert_eq!(tree.data(dynamic), &Value::from("[ADA]"));
    }

    #[test]
    fn test_chain_returning_array_is_repeating() {
        let mut tree = DomainTree::new(data());
        let root = tree.root();
        let ctx = Context::resolve(&tag("n->pair"), &mut tree, root, &[], &RenderOptions::default())
            .unwrap()
            .unwrap();
        assert!(ctx.is_repeating);
        assert_eq!(ctx.length, 2);
    }

    #[test]
    fn test_link_format_applies_after_call() {
        let mut tree = DomainTree::new(data());
        let root = tree.root();
        let ctx = Context::resolve(&tag("name->wrap::upper"), &mut tree, root, &[], &RenderOptions::default())
            .unwrap()
            .unwrap();
        assert_eq!(ctx.value, Some(Value::from("[ADA]")));
    }

    #[test]
    fn test_function_errors_are_fatal() {
        let mut tree = DomainTree::new(data());
        let root = tree.root();
        let err = Context::resolve(&tag("name->missing"), &mut tree, root, &[], &RenderOptions::default())
            .unwrap_err();
        assert!(err.to_string().contains("unresolved function"));
        let err = Context::resolve(&tag("name->n"), &mut tree, root, &[], &RenderOptions::default())
            .unwrap_err();
        assert!(err.to_string().contains("non-function"));
    }

    #[test]
    fn test_pass_section_defers_value() {
        let mut tree = DomainTree::new(data());
        let root = tree.root();
        let section = SectionNode::from_tag(tag("#->wrap")).unwrap();
        let options = RenderOptions::default();
        let ctx = Context::resolve(&section, &mut tree, root, &[], &options).unwrap().unwrap();
        assert!(ctx.value.is_none());
        let out = ctx
            .pass_through(&section, &tree, Value::from("inner"), &options)
            .unwrap();
        assert_eq!(out, Value::from("[inner]"));
    }

    #[test]
    fn test_dynamic_scopes_checked_first() {
        let mut tree = DomainTree::new(Value::from(json!({"items": [{"v": "a"}, {"v": "b"}]})));
        let root = tree.root();
        let items = tree.get(root, "items", false, FunctionPolicy { raw: "", propagate: true })
            .unwrap()
            .unwrap();
        let second = tree.dynamic_get(items, 1, FunctionPolicy { raw: "", propagate: true }).unwrap();
        let ctx = Context::resolve(&tag("items.v"), &mut tree, root, &[second], &RenderOptions::default())
            .unwrap()
            .unwrap();
        assert_eq!(ctx.value, Some(Value::from("b")));
    }
}
