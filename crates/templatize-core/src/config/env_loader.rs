//! Environment variable-based options loading

use super::options::{Delimiters, OptionsLayer};
use crate::error::{TemplateError, TemplateResult};
use std::env;

pub const ENV_ERROR_ON_FUNC_FAILURE: &str = "TEMPLATIZE_ERROR_ON_FUNC_FAILURE";
pub const ENV_EVAL_ZERO_AS_TRUE: &str = "TEMPLATIZE_EVAL_ZERO_AS_TRUE";
pub const ENV_ESCAPE_ALL: &str = "TEMPLATIZE_ESCAPE_ALL";
pub const ENV_ERROR_ON_MISSING_TAGS: &str = "TEMPLATIZE_ERROR_ON_MISSING_TAGS";
/// Two whitespace-separated delimiters, e.g. `"<% %>"`
pub const ENV_DELIMITERS: &str = "TEMPLATIZE_DELIMITERS";

/// Load an options layer from the process environment
pub fn load_from_env() -> TemplateResult<OptionsLayer> {
    load_from_lookup(|name| env::var(name).ok())
}

/// Load an options layer through a variable lookup
pub fn load_from_lookup<F>(lookup: F) -> TemplateResult<OptionsLayer>
where
    F: Fn(&str) -> Option<String>,
{
    let flag = |name: &str| -> TemplateResult<Option<bool>> {
        lookup(name).map(|raw| parse_bool(name, &raw)).transpose()
    };

    let mut layer = OptionsLayer {
        error_on_func_failure: flag(ENV_ERROR_ON_FUNC_FAILURE)?,
        eval_zero_as_true: flag(ENV_EVAL_ZERO_AS_TRUE)?,
        escape_all: flag(ENV_ESCAPE_ALL)?,
        error_on_missing_tags: flag(ENV_ERROR_ON_MISSING_TAGS)?,
        delimiters: None,
    };

    if let Some(raw) = lookup(ENV_DELIMITERS) {
        let parts: Vec<&str> = raw.split_whitespace().collect();
        let [open, close] = parts.as_slice() else {
            return Err(TemplateError::config(format!(
                "Invalid {ENV_DELIMITERS} value '{raw}': expected \"<open> <close>\""
            )));
        };
        layer.delimiters = Some(Delimiters::new(*open, *close));
    }

    Ok(layer)
}

fn parse_bool(name: &str, raw: &str) -> TemplateResult<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(TemplateError::config(format!("Invalid {name} value '{raw}'"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_load_from_env_empty() {
        let layer = load_from_lookup(lookup(&[])).unwrap();
        assert_eq!(layer, OptionsLayer::default());
    }

    #[test]
    fn test_load_flags() {
        let layer = load_from_lookup(lookup(&[
            (ENV_ESCAPE_ALL, "yes"),
            (ENV_EVAL_ZERO_AS_TRUE, "0"),
            (ENV_ERROR_ON_MISSING_TAGS, "TRUE"),
        ]))
        .unwrap();
        assert_eq!(layer.escape_all, Some(true));
        assert_eq!(layer.eval_zero_as_true, Some(false));
        assert_eq!(layer.error_on_missing_tags, Some(true));
        assert_eq!(layer.error_on_func_failure, None);
    }

    #[test]
    fn test_load_delimiters() {
        let layer = load_from_lookup(lookup(&[(ENV_DELIMITERS, " <% %> ")])).unwrap();
        assert_eq!(layer.delimiters, Some(Delimiters::new("<%", "%>")));

        let err = load_from_lookup(lookup(&[(ENV_DELIMITERS, "<%")])).unwrap_err();
        assert!(err.to_string().contains(ENV_DELIMITERS));
    }

    #[test]
    fn test_invalid_flag() {
        let err = load_from_lookup(lookup(&[(ENV_ESCAPE_ALL, "maybe")])).unwrap_err();
        assert!(err.to_string().contains(ENV_ESCAPE_ALL));
    }
}
