//! Core error types and traits for Templatize

use thiserror::Error;

/// Result type alias for template operations
pub type TemplateResult<T> = Result<T, TemplateError>;

/// Unified accessors implemented by every template error.
pub trait UnifiedError: std::error::Error + Send + Sync {
    /// Get the error code for programmatic handling
    fn error_code(&self) -> &str;

    /// Get the human-readable error message
    fn message(&self) -> &str;

    /// Get optional context about the error
    fn context(&self) -> Option<&str> {
        None
    }

    /// Raw tag text (delimiters included) the error refers to
    fn raw_tag(&self) -> Option<&str> {
        None
    }

    /// Broad category of the failure
    fn category(&self) -> ErrorCategory;
}

/// Broad classification of template errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Malformed tags or section structure; always fatal
    Parse,
    /// A binding that could not be resolved after both render phases
    Binding,
    /// Pass-to-function chain problems and function evaluation failures
    Function,
    /// Missing or broken partial templates
    Partial,
    /// Invalid render options or option sources
    Config,
}

/// Main error type for template parsing and rendering
#[derive(Error, Debug, Clone)]
pub enum TemplateError {
    /// Malformed tag content (bad directive combination, empty key, ...)
    #[error("Invalid tag: {message} at {raw}")]
    InvalidTag { message: String, raw: String },

    /// Unpaired, mismatched or unclosed sections
    #[error("Invalid template: {message} at {raw}")]
    InvalidSection { message: String, raw: String },

    /// Binding still unresolved after the inside-out pass
    #[error("Render error: missing binding for {raw}")]
    MissingBinding { raw: String },

    /// Partial referenced but not supplied
    #[error("Render error: missing partial '{name}' at {raw}")]
    MissingPartial { name: String, raw: String },

    /// Structural pass-to-function problem (unresolved or non-function link)
    #[error("Context passed to {message} at {raw}")]
    FunctionChain { message: String, raw: String },

    /// A bound function failed while being evaluated
    #[error("Error evaluating bindings at {raw}: {message}")]
    FunctionFailed { message: String, raw: String },

    /// A partial template failed to compile
    #[error("Invalid partial '{name}': {message}")]
    InvalidPartial { name: String, message: String },

    /// Option loading / validation errors
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        context: Option<String>,
    },
}
