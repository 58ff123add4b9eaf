//! Error types for Templatize
//!
//! Every failure the engine can raise is a `TemplateError`. Variants keep the
//! raw tag text that caused them so messages always point back at the
//! template, and all of them expose the same accessors through
//! `UnifiedError`:
//! - error_code: A stable identifier for programmatic handling
//! - message: Human-readable error message
//! - context: Optional additional detail
//! - raw_tag: The offending tag, when there is one

mod constructors;
mod types;
mod unified_error;

pub use types::{ErrorCategory, TemplateError, TemplateResult, UnifiedError};
