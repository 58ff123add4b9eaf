//! Compiled templates

use crate::config::{Delimiters, PartialTemplate, RenderOptions};
use crate::error::{TemplateError, TemplateResult};
use crate::node::RootNode;
use crate::parser::TemplateParser;
use crate::renderer::{CompiledPartials, Renderer};
use crate::value::Value;
use std::sync::Arc;
use tracing::debug;

/// A parsed template, reusable across renders
#[derive(Debug, Clone)]
pub struct Template {
    root: RootNode,
    delimiters: Delimiters,
}

impl Template {
    /// Parse a template with the delimiters from `options`
    pub fn compile(source: &str, options: &RenderOptions) -> TemplateResult<Self> {
        options.delimiters.validate()?;
        let root = TemplateParser::parse(source, &options.delimiters)?;
        Ok(Self {
            root,
            delimiters: options.delimiters.clone(),
        })
    }

    /// Parse a template with the default `{{ }}` delimiters
    pub fn parse(source: &str) -> TemplateResult<Self> {
        Self::compile(source, &RenderOptions::default())
    }

    pub fn root(&self) -> &RootNode {
        &self.root
    }

    pub fn delimiters(&self) -> &Delimiters {
        &self.delimiters
    }

    /// Render against `data`.
    ///
    /// Partials given as source are compiled first with the same options;
    /// one that fails to parse fails the render.
    pub fn render(&self, data: &Value, options: &RenderOptions) -> TemplateResult<String> {
        let partials = compile_partials(options)?;
        debug!(
            nodes = self.root.inner.len(),
            partials = partials.len(),
            "Rendering template"
        );
        Renderer::new(options, &partials, data.clone()).render(&self.root)
    }
}

fn compile_partials(options: &RenderOptions) -> TemplateResult<CompiledPartials> {
    let mut compiled = CompiledPartials::with_capacity(options.partials.len());
    for (name, partial) in &options.partials {
        let template = match partial {
            PartialTemplate::Compiled(template) => Arc::clone(template),
            PartialTemplate::Source(source) => Template::compile(source, options)
                .map(Arc::new)
                .map_err(|err| TemplateError::invalid_partial(name, err.to_string()))?,
        };
        compiled.insert(name.clone(), template);
    }
    Ok(compiled)
}

/// Compile and render in one step
pub fn render(source: &str, data: &Value, options: &RenderOptions) -> TemplateResult<String> {
    Template::compile(source, options)?.render(data, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_compile_keeps_delimiters() {
        let options = RenderOptions::default().with_delimiters("[[", "]]");
        let template = Template::compile("[[name]]", &options).unwrap();
        assert_eq!(template.delimiters(), &Delimiters::new("[[", "]]"));
        assert_eq!(template.root().inner.len(), 1);
    }

    #[test]
    fn test_compile_rejects_bad_delimiters() {
        let options = RenderOptions::default().with_delimiters("", "}}");
        let err = Template::compile("x", &options).unwrap_err();
        assert!(matches!(err, TemplateError::Config { .. }));
    }

    #[test]
    fn test_precompiled_partial() {
        let header = Template::parse("<{{title}}>").unwrap();
        let options = RenderOptions::default().with_partial("header", header);
        let data = Value::from(json!({"title": "hi"}));
        assert_eq!(render("{{>header}}!", &data, &options).unwrap(), "<hi>!");
    }

    #[test]
    fn test_unparsable_partial_fails_render() {
        let options = RenderOptions::default().with_partial("bad", "{{#open}}");
        let err = render("x", &Value::object(), &options).unwrap_err();
        assert!(matches!(err, TemplateError::InvalidPartial { .. }));
        assert!(err.to_string().contains("'bad'"));
    }
}
