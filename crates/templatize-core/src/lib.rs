//! Templatize Core Library
//!
//! This crate provides the template engine: the directive grammar and
//! parser, the scope tree that binds dotted keys to data, context
//! resolution with pass-to-function chains, and the two-phase renderer.

pub mod config;
pub mod context;
pub mod directive;
pub mod domain;
pub mod error;
pub mod format;
pub mod node;
pub mod parser;
pub mod renderer;
pub mod template;
pub mod value;

// Re-export commonly used types
pub use config::{
    Delimiters, OptionsLayer, OptionsLoader, OptionsSource, PartialTemplate, Partials,
    RenderOptions,
};
pub use context::Context;
pub use directive::Directive;
pub use domain::{DomainId, DomainTree, DynamicKey};
pub use error::{ErrorCategory, TemplateError, TemplateResult, UnifiedError};
pub use format::{FormatError, NumberFormatter, SpecFormatter};
pub use node::{Node, PartialNode, PassToFunctionNode, RootNode, SectionNode, TagNode};
pub use parser::TemplateParser;
pub use renderer::{Renderer, DISPLAY_KEY, MAX_PARTIAL_DEPTH};
pub use template::{render, Template};
pub use value::{Lambda, Value};
