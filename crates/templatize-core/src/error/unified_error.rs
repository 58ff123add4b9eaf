//! UnifiedError trait implementation for TemplateError

use super::types::{ErrorCategory, TemplateError, UnifiedError};

impl UnifiedError for TemplateError {
    fn error_code(&self) -> &str {
        match self {
            Self::InvalidTag { .. } => "TEMPLATE_INVALID_TAG",
            Self::InvalidSection { .. } => "TEMPLATE_INVALID_SECTION",
            Self::MissingBinding { .. } => "TEMPLATE_MISSING_BINDING",
            Self::MissingPartial { .. } => "TEMPLATE_MISSING_PARTIAL",
            Self::FunctionChain { .. } => "TEMPLATE_FUNCTION_CHAIN",
            Self::FunctionFailed { .. } => "TEMPLATE_FUNCTION_FAILED",
            Self::InvalidPartial { .. } => "TEMPLATE_INVALID_PARTIAL",
            Self::Config { .. } => "TEMPLATE_CONFIG",
        }
    }

    fn message(&self) -> &str {
        match self {
            Self::InvalidTag { message, .. } => message,
            Self::InvalidSection { message, .. } => message,
            Self::MissingBinding { .. } => "missing binding",
            Self::MissingPartial { .. } => "missing partial",
            Self::FunctionChain { message, .. } => message,
            Self::FunctionFailed { message, .. } => message,
            Self::InvalidPartial { message, .. } => message,
            Self::Config { message, .. } => message,
        }
    }

    fn context(&self) -> Option<&str> {
        match self {
            Self::Config { context, .. } => context.as_deref(),
            Self::MissingPartial { name, .. } | Self::InvalidPartial { name, .. } => Some(name),
            _ => None,
        }
    }

    fn raw_tag(&self) -> Option<&str> {
        match self {
            Self::InvalidTag { raw, .. }
            | Self::InvalidSection { raw, .. }
            | Self::MissingBinding { raw }
            | Self::MissingPartial { raw, .. }
            | Self::FunctionChain { raw, .. }
            | Self::FunctionFailed { raw, .. } => Some(raw),
            Self::InvalidPartial { .. } | Self::Config { .. } => None,
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidTag { .. } | Self::InvalidSection { .. } => ErrorCategory::Parse,
            Self::MissingBinding { .. } => ErrorCategory::Binding,
            Self::FunctionChain { .. } | Self::FunctionFailed { .. } => ErrorCategory::Function,
            Self::MissingPartial { .. } | Self::InvalidPartial { .. } => ErrorCategory::Partial,
            Self::Config { .. } => ErrorCategory::Config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_and_categories() {
        let err = TemplateError::invalid_section("unpaired section close", "{{/items}}");
        assert_eq!(err.error_code(), "TEMPLATE_INVALID_SECTION");
        assert_eq!(err.category(), ErrorCategory::Parse);
        assert_eq!(err.raw_tag(), Some("{{/items}}"));

        let err = TemplateError::function_failed("{{now}}", "clock unavailable");
        assert_eq!(err.category(), ErrorCategory::Function);
        assert_eq!(err.message(), "clock unavailable");
    }

    #[test]
    fn test_partial_errors_report_name_as_context() {
        let err = TemplateError::missing_partial("header", "{{>header}}");
        assert_eq!(err.context(), Some("header"));
        assert_eq!(err.category(), ErrorCategory::Partial);
    }

    #[test]
    fn test_config_has_no_raw_tag() {
        let err = TemplateError::config("empty delimiter");
        assert!(err.raw_tag().is_none());
        assert_eq!(err.error_code(), "TEMPLATE_CONFIG");
    }
}
