//! Constructor methods for TemplateError

use super::types::TemplateError;

impl TemplateError {
    /// Create an invalid-tag error
    pub fn invalid_tag(message: impl Into<String>, raw: impl Into<String>) -> Self {
        Self::InvalidTag {
            message: message.into(),
            raw: raw.into(),
        }
    }

    /// Create an invalid-section error
    pub fn invalid_section(message: impl Into<String>, raw: impl Into<String>) -> Self {
        Self::InvalidSection {
            message: message.into(),
            raw: raw.into(),
        }
    }

    /// Create a missing-binding error
    pub fn missing_binding(raw: impl Into<String>) -> Self {
        Self::MissingBinding { raw: raw.into() }
    }

    /// Create a missing-partial error
    pub fn missing_partial(name: impl Into<String>, raw: impl Into<String>) -> Self {
        Self::MissingPartial {
            name: name.into(),
            raw: raw.into(),
        }
    }

    /// Pass-to-function link that never resolved
    pub fn unresolved_function(raw: impl Into<String>) -> Self {
        Self::FunctionChain {
            message: "unresolved function".to_string(),
            raw: raw.into(),
        }
    }

    /// Pass-to-function link that resolved to something that is not a function
    pub fn non_function(raw: impl Into<String>) -> Self {
        Self::FunctionChain {
            message: "non-function".to_string(),
            raw: raw.into(),
        }
    }

    /// Create a function-evaluation error
    pub fn function_failed(raw: impl Into<String>, message: impl Into<String>) -> Self {
        Self::FunctionFailed {
            message: message.into(),
            raw: raw.into(),
        }
    }

    /// Create an invalid-partial error
    pub fn invalid_partial(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidPartial {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            context: None,
        }
    }

    /// Create a configuration error with context
    pub fn config_with_context(message: impl Into<String>, context: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            context: Some(context.into()),
        }
    }
}
