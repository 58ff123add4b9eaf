//! Templatize
//!
//! Logic-light text templates: `{{tags}}` bound to data through dotted keys,
//! conditional and repeating sections, pass-to-function chains, partials and
//! value formats.
//!
//! # Example
//!
//! ```rust
//! use templatize::{compile, RenderOptions, Value};
//!
//! let options = RenderOptions::default();
//! let template = compile("Hello {{#names}}{{.}} {{/names}}", &options).unwrap();
//! let data = Value::object().with("names", vec!["Ada", "Grace"]);
//! assert_eq!(template.render(&data, &options).unwrap(), "Hello Ada Grace ");
//! ```

use std::path::Path;

pub use templatize_core::{
    config, context, directive, domain, error, format, node, parser, renderer, value,
};
pub use templatize_core::{
    Delimiters, ErrorCategory, FormatError, Lambda, NumberFormatter, OptionsLayer, OptionsLoader,
    OptionsSource, PartialTemplate, Partials, RenderOptions, SpecFormatter, Template,
    TemplateError, TemplateResult, UnifiedError, Value,
};

/// Option files read by [`load_options`], in order
pub const DEFAULT_OPTION_FILES: [&str; 2] = ["templatize.toml", "templatize.json"];

/// Parse a template once for repeated renders
pub fn compile(source: &str, options: &RenderOptions) -> TemplateResult<Template> {
    Template::compile(source, options)
}

/// Compile and render in one call
pub fn render(source: &str, data: &Value, options: &RenderOptions) -> TemplateResult<String> {
    templatize_core::render(source, data, options)
}

/// Load options from the default files in the working directory, then the
/// environment.
///
/// Loads options in this order:
/// 1. Default options
/// 2. `templatize.toml`, `templatize.json` (when present)
/// 3. `TEMPLATIZE_*` environment variables
pub fn load_options() -> TemplateResult<RenderOptions> {
    DEFAULT_OPTION_FILES
        .iter()
        .fold(OptionsLoader::new().with_defaults(), |loader, file| {
            loader.with_file(file)
        })
        .with_env()
        .load()
}

/// Load options from a given file, then the environment
pub fn load_options_from_file<P: AsRef<Path>>(path: P) -> TemplateResult<RenderOptions> {
    tracing::debug!("Loading render options from {}", path.as_ref().display());
    OptionsLoader::new()
        .with_defaults()
        .with_file(path)
        .with_env()
        .load()
}
