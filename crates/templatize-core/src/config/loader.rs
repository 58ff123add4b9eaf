//! Options loading from ordered sources

use super::env_loader::load_from_env;
use super::file_loader::load_from_file;
use super::options::{OptionsLayer, RenderOptions};
use crate::error::TemplateResult;
use std::path::{Path, PathBuf};

/// Source of option values
#[derive(Debug, Clone)]
pub enum OptionsSource {
    /// Options from a TOML, YAML or JSON file
    File(PathBuf),
    /// Options from `TEMPLATIZE_*` environment variables
    Environment,
    /// Explicit overrides
    Layer(OptionsLayer),
    /// Default options
    Default,
}

/// Options loader; later sources win
#[derive(Debug, Default)]
pub struct OptionsLoader {
    sources: Vec<OptionsSource>,
}

impl OptionsLoader {
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
        }
    }

    pub fn add_source(mut self, source: OptionsSource) -> Self {
        self.sources.push(source);
        self
    }

    pub fn with_file<P: AsRef<Path>>(self, path: P) -> Self {
        self.add_source(OptionsSource::File(path.as_ref().to_path_buf()))
    }

    pub fn with_env(self) -> Self {
        self.add_source(OptionsSource::Environment)
    }

    pub fn with_layer(self, layer: OptionsLayer) -> Self {
        self.add_source(OptionsSource::Layer(layer))
    }

    pub fn with_defaults(self) -> Self {
        self.add_source(OptionsSource::Default)
    }

    /// Merge all sources over the defaults and validate the result
    pub fn load(self) -> TemplateResult<RenderOptions> {
        let mut options = RenderOptions::default();
        for source in &self.sources {
            let layer = Self::load_from_source(source)?;
            options.merge(layer);
        }
        options.validate()?;
        tracing::debug!(
            escape_all = options.escape_all,
            error_on_missing_tags = options.error_on_missing_tags,
            "Loaded render options"
        );
        Ok(options)
    }

    fn load_from_source(source: &OptionsSource) -> TemplateResult<OptionsLayer> {
        match source {
            OptionsSource::File(path) => {
                tracing::debug!("Loading options from file: {}", path.display());
                load_from_file(path)
            }
            OptionsSource::Environment => {
                tracing::debug!("Loading options from environment");
                load_from_env()
            }
            OptionsSource::Layer(layer) => Ok(layer.clone()),
            OptionsSource::Default => {
                tracing::debug!("Loading default options");
                Ok(OptionsLayer::from(&RenderOptions::default()))
            }
        }
    }
}
