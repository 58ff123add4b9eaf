//! Render options

use crate::error::{TemplateError, TemplateResult};
use crate::format::{NumberFormatter, SpecFormatter};
use crate::template::Template;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Opening and closing tag delimiters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delimiters(pub String, pub String);

impl Delimiters {
    pub fn new(open: impl Into<String>, close: impl Into<String>) -> Self {
        Self(open.into(), close.into())
    }

    pub fn open(&self) -> &str {
        &self.0
    }

    pub fn close(&self) -> &str {
        &self.1
    }

    /// Both non-empty and distinct
    pub fn validate(&self) -> TemplateResult<()> {
        if self.0.is_empty() || self.1.is_empty() {
            return Err(TemplateError::config("delimiters must not be empty"));
        }
        if self.0 == self.1 {
            return Err(TemplateError::config(format!(
                "opening and closing delimiters must differ (both '{}')",
                self.0
            )));
        }
        Ok(())
    }
}

impl Default for Delimiters {
    fn default() -> Self {
        Self::new("{{", "}}")
    }
}

/// A partial given either as source or already compiled
#[derive(Debug, Clone)]
pub enum PartialTemplate {
    Source(String),
    Compiled(Arc<Template>),
}

impl From<&str> for PartialTemplate {
    fn from(source: &str) -> Self {
        PartialTemplate::Source(source.to_string())
    }
}

impl From<String> for PartialTemplate {
    fn from(source: String) -> Self {
        PartialTemplate::Source(source)
    }
}

impl From<Template> for PartialTemplate {
    fn from(template: Template) -> Self {
        PartialTemplate::Compiled(Arc::new(template))
    }
}

impl From<Arc<Template>> for PartialTemplate {
    fn from(template: Arc<Template>) -> Self {
        PartialTemplate::Compiled(template)
    }
}

/// Partials by name
pub type Partials = HashMap<String, PartialTemplate>;

/// Shared handle to the numeric formatter
#[derive(Clone)]
pub struct FormatterHandle(Arc<dyn NumberFormatter>);

impl FormatterHandle {
    pub fn new(formatter: impl NumberFormatter + 'static) -> Self {
        Self(Arc::new(formatter))
    }

    pub fn get(&self) -> &dyn NumberFormatter {
        self.0.as_ref()
    }
}

impl Default for FormatterHandle {
    fn default() -> Self {
        Self::new(SpecFormatter)
    }
}

impl fmt::Debug for FormatterHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FormatterHandle")
    }
}

/// Options for one render call
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Raise when a bound function fails instead of rendering nothing
    #[serde(alias = "errorOnFuncFailure")]
    pub error_on_func_failure: bool,
    /// Treat the number 0 as truthy for sections
    #[serde(alias = "evalZeroAsTrue")]
    pub eval_zero_as_true: bool,
    /// HTML-escape every rendered value
    #[serde(alias = "escapeAll")]
    pub escape_all: bool,
    /// Raise on bindings or partials missing after the render
    #[serde(alias = "errorOnMissingTags")]
    pub error_on_missing_tags: bool,
    pub delimiters: Delimiters,
    #[serde(skip)]
    pub partials: Partials,
    #[serde(skip)]
    pub formatter: FormatterHandle,
}

impl RenderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_partial(mut self, name: impl Into<String>, partial: impl Into<PartialTemplate>) -> Self {
        self.partials.insert(name.into(), partial.into());
        self
    }

    pub fn with_formatter(mut self, formatter: impl NumberFormatter + 'static) -> Self {
        self.formatter = FormatterHandle::new(formatter);
        self
    }

    pub fn with_delimiters(mut self, open: impl Into<String>, close: impl Into<String>) -> Self {
        self.delimiters = Delimiters::new(open, close);
        self
    }

    pub fn formatter(&self) -> &dyn NumberFormatter {
        self.formatter.get()
    }

    /// Overlay every field the layer sets
    pub fn merge(&mut self, layer: OptionsLayer) {
        if let Some(v) = layer.error_on_func_failure {
            self.error_on_func_failure = v;
        }
        if let Some(v) = layer.eval_zero_as_true {
            self.eval_zero_as_true = v;
        }
        if let Some(v) = layer.escape_all {
            self.escape_all = v;
        }
        if let Some(v) = layer.error_on_missing_tags {
            self.error_on_missing_tags = v;
        }
        if let Some(v) = layer.delimiters {
            self.delimiters = v;
        }
    }

    pub fn validate(&self) -> TemplateResult<()> {
        self.delimiters.validate()
    }
}

/// Partial set of options from one source
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptionsLayer {
    #[serde(alias = "errorOnFuncFailure", skip_serializing_if = "Option::is_none")]
    pub error_on_func_failure: Option<bool>,
    #[serde(alias = "evalZeroAsTrue", skip_serializing_if = "Option::is_none")]
    pub eval_zero_as_true: Option<bool>,
    #[serde(alias = "escapeAll", skip_serializing_if = "Option::is_none")]
    pub escape_all: Option<bool>,
    #[serde(alias = "errorOnMissingTags", skip_serializing_if = "Option::is_none")]
    pub error_on_missing_tags: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delimiters: Option<Delimiters>,
}

impl From<&RenderOptions> for OptionsLayer {
    fn from(options: &RenderOptions) -> Self {
        Self {
            error_on_func_failure: Some(options.error_on_func_failure),
            eval_zero_as_true: Some(options.eval_zero_as_true),
            escape_all: Some(options.escape_all),
            error_on_missing_tags: Some(options.error_on_missing_tags),
            delimiters: Some(options.delimiters.clone()),
        }
    }
}
