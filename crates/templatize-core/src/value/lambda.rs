//! Bound functions
//!
//! A `Lambda` is called with a context value and the root data. For a lazily
//! evaluated binding the context is the enclosing record; for a
//! pass-to-function link it is the value being passed along.

use super::Value;
use crate::error::{TemplateError, TemplateResult};
use std::fmt;
use std::rc::Rc;
use tracing::warn;

/// Nested returned-callable limit
pub const MAX_NESTED_CALLS: usize = 99;

type LambdaFn = dyn Fn(&Value, &Value) -> anyhow::Result<Value>;

/// Cheaply clonable handle to a bound function
#[derive(Clone)]
pub struct Lambda(Rc<LambdaFn>);

impl Lambda {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Value, &Value) -> anyhow::Result<Value> + 'static,
    {
        Self(Rc::new(f))
    }

    pub fn call(&self, context: &Value, root: &Value) -> anyhow::Result<Value> {
        (self.0)(context, root)
    }
}

impl fmt::Debug for Lambda {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Lambda")
    }
}

impl PartialEq for Lambda {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

/// What to do when a bound function fails
#[derive(Debug, Clone, Copy)]
pub struct FunctionPolicy<'a> {
    /// Tag being rendered, for messages
    pub raw: &'a str,
    /// Raise instead of substituting an empty string
    pub propagate: bool,
}

impl FunctionPolicy<'_> {
    /// Apply the policy to a failure
    pub fn fail(&self, message: impl Into<String>) -> TemplateResult<Value> {
        let message = message.into();
        if self.propagate {
            Err(TemplateError::function_failed(self.raw, message))
        } else {
            warn!(tag = self.raw, error = %message, "Function evaluation failed");
            Ok(Value::String(String::new()))
        }
    }
}

/// Call a lambda, then keep calling while it returns callables.
pub fn evaluate(
    lambda: &Lambda,
    context: &Value,
    root: &Value,
    policy: FunctionPolicy<'_>,
) -> TemplateResult<Value> {
    let mut result = match lambda.call(context, root) {
        Ok(value) => value,
        Err(err) => return policy.fail(format!("{err:#}")),
    };
    let mut calls = 1;
    while let Value::Function(next) = &result {
        if calls > MAX_NESTED_CALLS {
            return policy.fail(format!(
                "exceeded {MAX_NESTED_CALLS} nested function calls"
            ));
        }
        result = match next.call(context, root) {
            Ok(value) => value,
            Err(err) => return policy.fail(format!("{err:#}")),
        };
        calls += 1;
    }
    Ok(result)
}
