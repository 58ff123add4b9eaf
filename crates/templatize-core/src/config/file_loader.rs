//! File-based options loading

use super::options::OptionsLayer;
use crate::error::{TemplateError, TemplateResult};
use std::fs;
use std::path::Path;

/// Load an options layer from a file
///
/// Supports JSON, TOML, and YAML formats based on file extension.
/// Returns an empty layer if the file doesn't exist.
pub fn load_from_file(path: &Path) -> TemplateResult<OptionsLayer> {
    if !path.exists() {
        return Ok(OptionsLayer::default());
    }

    let content = fs::read_to_string(path).map_err(|e| {
        TemplateError::config_with_context(
            format!("Failed to read options file: {}", e),
            format!("Reading options from '{}'", path.display()),
        )
    })?;

    let layer: OptionsLayer = match path.extension().and_then(|s| s.to_str()) {
        Some("toml") => toml::from_str(&content).map_err(|e| {
            TemplateError::config_with_context(
                format!("Failed to parse TOML options: {}", e),
                format!("Deserializing TOML options from '{}'", path.display()),
            )
        })?,
        Some("yaml") | Some("yml") => serde_yaml::from_str(&content).map_err(|e| {
            TemplateError::config_with_context(
                format!("Failed to parse YAML options: {}", e),
                format!("Deserializing YAML options from '{}'", path.display()),
            )
        })?,
        _ => serde_json::from_str(&content).map_err(|e| {
            TemplateError::config_with_context(
                format!("Failed to parse JSON options: {}", e),
                format!("Deserializing JSON options from '{}'", path.display()),
            )
        })?,
    };

    Ok(layer)
}
