//! Scope tree
//!
//! A `DomainTree` mirrors the shape of the bound data. Each scope covers one
//! dotted key path and is created lazily on first access. Scopes live in an
//! arena and refer to each other by `DomainId`; the tree is built per render
//! and dropped afterwards.
//!
//! Lookups go through a path cache shared by all canonical scopes. Dynamic
//! scopes (loop items, function results) sit at the same path as the scope
//! they were created from but carry a private cache, so per-item values never
//! leak into the shared one.

use crate::error::TemplateResult;
use crate::node::Keyed;
use crate::value::{evaluate, FunctionPolicy, Lambda, Value};
use std::collections::HashMap;
use tracing::debug;

/// Index of a scope in its tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DomainId(usize);

/// Memo key for dynamic scopes
///
/// Loop items use their index with an empty chain; function results use
/// index 0 and the scopes of every function in the chain.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DynamicKey {
    pub index: usize,
    pub chain: Vec<DomainId>,
}

impl DynamicKey {
    pub fn item(index: usize) -> Self {
        Self {
            index,
            chain: Vec::new(),
        }
    }

    pub fn chain(chain: Vec<DomainId>) -> Self {
        Self { index: 0, chain }
    }
}

#[derive(Debug)]
enum DomainState {
    /// Function not yet called
    Lazy(Lambda),
    Ready(Value),
}

#[derive(Debug)]
struct Domain {
    fullkey: String,
    prefix: String,
    /// Segments in `prefix`
    prefixlen: usize,
    state: DomainState,
    /// Kept after evaluation so the scope can still be passed to
    function: Option<Lambda>,
    parent: Option<DomainId>,
    root: DomainId,
    cache: usize,
    children: HashMap<String, DomainId>,
    is_repeating: bool,
    dynamic_children: HashMap<DynamicKey, DomainId>,
}

/// Arena of scopes over one bound value
#[derive(Debug)]
pub struct DomainTree {
    nodes: Vec<Domain>,
    caches: Vec<HashMap<String, DomainId>>,
    null: Value,
}

impl DomainTree {
    pub fn new(data: Value) -> Self {
        let mut tree = Self {
            nodes: Vec::new(),
            caches: vec![HashMap::new()],
            null: Value::Null,
        };
        tree.insert(data, String::new(), None, None, 0);
        tree
    }

    /// Tree over `data` with an extra scope at `fullkey` holding `value`.
    ///
    /// The scope hangs off the top-level scope with a private cache, so
    /// absolute keys still bubble up to `data` while in-context keys read
    /// `value`. Returns the tree and the scope to start from.
    pub fn scoped(data: Value, fullkey: &str, value: Value) -> (Self, DomainId) {
        if fullkey.is_empty() {
            let tree = Self::new(value);
            let top = tree.root();
            return (tree, top);
        }
        let mut tree = Self::new(data);
        let top = tree.root();
        tree.caches.push(HashMap::new());
        let cache = tree.caches.len() - 1;
        let scope = tree.insert(value, fullkey.to_string(), Some(top), Some(top), cache);
        (tree, scope)
    }

    /// Top-level scope
    pub fn root(&self) -> DomainId {
        DomainId(0)
    }

    fn insert(
        &mut self,
        data: Value,
        fullkey: String,
        parent: Option<DomainId>,
        root: Option<DomainId>,
        cache: usize,
    ) -> DomainId {
        let id = DomainId(self.nodes.len());
        let prefix = if fullkey.is_empty() {
            String::new()
        } else {
            format!("{fullkey}.")
        };
        let prefixlen = prefix.matches('.').count();
        let (state, function, is_repeating) = match data {
            Value::Function(lambda) => (DomainState::Lazy(lambda.clone()), Some(lambda), false),
            data @ Value::Array(_) => (DomainState::Ready(data), None, true),
            data => (DomainState::Ready(data), None, false),
        };
        self.nodes.push(Domain {
            fullkey,
            prefix,
            prefixlen,
            state,
            function,
            parent,
            root: root.unwrap_or(id),
            cache,
            children: HashMap::new(),
            is_repeating,
            dynamic_children: HashMap::new(),
        });
        id
    }

    pub fn fullkey(&self, id: DomainId) -> &str {
        &self.nodes[id.0].fullkey
    }

    pub fn parent(&self, id: DomainId) -> Option<DomainId> {
        self.nodes[id.0].parent
    }

    /// Whether the scope holds a sequence (after evaluation, for functions)
    pub fn is_repeating(&self, id: DomainId) -> bool {
        self.nodes[id.0].is_repeating
    }

    /// Function bound at this scope, if the data was a function
    pub fn function(&self, id: DomainId) -> Option<&Lambda> {
        self.nodes[id.0].function.as_ref()
    }

    /// Current data without forcing; an unevaluated function reads as null
    pub fn data(&self, id: DomainId) -> &Value {
        match &self.nodes[id.0].state {
            DomainState::Ready(value) => value,
            DomainState::Lazy(_) => &self.null,
        }
    }

    /// Evaluate a function scope on first read, freezing the result
    fn force(&mut self, id: DomainId, policy: FunctionPolicy<'_>) -> TemplateResult<()> {
        let node = &self.nodes[id.0];
        let DomainState::Lazy(lambda) = &node.state else {
            return Ok(());
        };
        let lambda = lambda.clone();
        let context = node.parent.map_or(&self.null, |parent| self.data(parent));
        let root = if node.root == id {
            &self.null
        } else {
            self.data(node.root)
        };
        let result = evaluate(&lambda, context, root, policy)?;

        let node = &mut self.nodes[id.0];
        node.is_repeating = matches!(result, Value::Array(_));
        if !node.is_repeating {
            self.caches[node.cache].insert(node.fullkey.clone(), id);
        }
        node.state = DomainState::Ready(result);
        Ok(())
    }

    /// Data of a scope, evaluating a bound function first
    pub fn value(&mut self, id: DomainId, policy: FunctionPolicy<'_>) -> TemplateResult<&Value> {
        self.force(id, policy)?;
        Ok(self.data(id))
    }

    /// Child scope for a record field.
    ///
    /// `""` and `"."` return the scope itself. Repeating scopes have no
    /// plain children; use `dynamic_get` for their items.
    pub fn get(
        &mut self,
        id: DomainId,
        key: &str,
        skip_cache: bool,
        policy: FunctionPolicy<'_>,
    ) -> TemplateResult<Option<DomainId>> {
        let is_self = key.is_empty() || key == ".";
        let fullkey = if is_self {
            self.nodes[id.0].fullkey.clone()
        } else {
            format!("{}{}", self.nodes[id.0].prefix, key)
        };
        self.force(id, policy)?;

        let node = &self.nodes[id.0];
        if !skip_cache {
            if let Some(&hit) = self.caches[node.cache].get(&fullkey) {
                return Ok(Some(hit));
            }
        }
        if node.is_repeating {
            return Ok(None);
        }
        if is_self {
            return Ok(Some(id));
        }
        if let Some(&child) = node.children.get(key) {
            return Ok(Some(child));
        }
        let Some(data) = self.data(id).get(key).cloned() else {
            return Ok(None);
        };

        let (cache, root) = (node.cache, node.root);
        let child = self.insert(data, fullkey.clone(), Some(id), Some(root), cache);
        self.nodes[id.0].children.insert(key.to_string(), child);
        self.caches[cache].insert(fullkey, child);
        Ok(Some(child))
    }

    /// Number of items the scope expands to: 0 for null, the length of a
    /// sequence, 1 otherwise.
    pub fn dynamic_len(&self, id: DomainId) -> usize {
        match self.data(id) {
            Value::Null => 0,
            Value::Array(items) => items.len(),
            _ => 1,
        }
    }

    /// Dynamic scope for one item. A non-repeating scope yields a dynamic
    /// copy of its own value, so one item and N items iterate alike.
    pub fn dynamic_get(
        &mut self,
        id: DomainId,
        index: usize,
        policy: FunctionPolicy<'_>,
    ) -> TemplateResult<DomainId> {
        let key = DynamicKey::item(index);
        if let Some(&existing) = self.nodes[id.0].dynamic_children.get(&key) {
            return Ok(existing);
        }
        let data = if self.is_repeating(id) {
            self.data(id)
                .as_array()
                .and_then(|items| items.get(index))
                .cloned()
                .unwrap_or_default()
        } else {
            self.value(id, policy)?.clone()
        };
        Ok(self.dynamic_create(id, key, data))
    }

    /// Dynamic scope at the same path and parent as `id`, wrapping `value`.
    /// Identical keys return the same scope for the rest of the render.
    pub fn dynamic_create(&mut self, id: DomainId, key: DynamicKey, value: Value) -> DomainId {
        if let Some(&existing) = self.nodes[id.0].dynamic_children.get(&key) {
            return existing;
        }
        let node = &self.nodes[id.0];
        let (fullkey, parent) = (node.fullkey.clone(), node.parent);
        let root = parent.map(|_| node.root);

        self.caches.push(HashMap::new());
        let cache = self.caches.len() - 1;
        debug!(path = %fullkey, index = key.index, links = key.chain.len(), "Created dynamic scope");
        let dynamic = self.insert(value, fullkey, parent, root, cache);
        self.nodes[id.0].dynamic_children.insert(key, dynamic);
        dynamic
    }

    /// Whether an absolute key lies at or under this scope
    pub fn incontext(&self, id: DomainId, key: &str) -> bool {
        let node = &self.nodes[id.0];
        key == node.fullkey || key.starts_with(&node.prefix)
    }

    /// Resolve a node's key to a scope.
    ///
    /// In-context keys resolve downward from `id`. Other keys bubble up
    /// through parents until a scope contains the path (or the top is
    /// reached), then resolve downward from there.
    pub fn search<K: Keyed + ?Sized>(
        &mut self,
        id: DomainId,
        node: &K,
        policy: FunctionPolicy<'_>,
    ) -> TemplateResult<Option<DomainId>> {
        if node.incontext() && node.key().is_empty() {
            return Ok(Some(id));
        }
        let target = if node.incontext() {
            format!("{}{}", self.nodes[id.0].prefix, node.key())
        } else {
            node.key().to_string()
        };
        let keysplit: Vec<&str> = node.keysplit().iter().map(String::as_str).collect();
        self.search_from(id, &target, &keysplit, !node.incontext(), true, policy)
    }

    fn search_from(
        &mut self,
        id: DomainId,
        target: &str,
        keysplit: &[&str],
        bubble: bool,
        atstart: bool,
        policy: FunctionPolicy<'_>,
    ) -> TemplateResult<Option<DomainId>> {
        let node = &self.nodes[id.0];
        if atstart {
            if let Some(&hit) = self.caches[node.cache].get(target) {
                return Ok(Some(hit));
            }
        }
        if keysplit.is_empty() || node.fullkey == target {
            return Ok(Some(id));
        }

        if bubble {
            let Some(parent) = node.parent else {
                return self.search_from(id, target, keysplit, false, false, policy);
            };
            if self.incontext(id, target) {
                let skip = node.prefixlen.min(keysplit.len());
                return self.search_from(id, target, &keysplit[skip..], false, false, policy);
            }
            // leaving a repeating scope: the parent's cache applies again
            let atstart = node.is_repeating;
            return self.search_from(parent, target, keysplit, true, atstart, policy);
        }

        // tolerate literal dots inside a bound name by joining segments
        let mut key = String::new();
        for (k, segment) in keysplit.iter().enumerate() {
            key.push_str(segment);
            if let Some(child) = self.get(id, &key, true, policy)? {
                if child == id {
                    return Ok(Some(id));
                }
                return self.search_from(child, target, &keysplit[k + 1..], false, false, policy);
            }
            key.push('.');
        }
        Ok(None)
    }
}

#[cfg(test)]
#[path = "domain_tests.rs"]
mod domain_tests;
