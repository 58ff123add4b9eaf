//! Render options and their sources

mod env_loader;
mod file_loader;
mod options;

pub mod loader;

pub use env_loader::{
    load_from_env, load_from_lookup, ENV_DELIMITERS, ENV_ERROR_ON_FUNC_FAILURE, ENV_ESCAPE_ALL,
    ENV_ERROR_ON_MISSING_TAGS, ENV_EVAL_ZERO_AS_TRUE,
};
pub use file_loader::load_from_file;
pub use loader::{OptionsLoader, OptionsSource};
pub use options::{
    Delimiters, FormatterHandle, OptionsLayer, PartialTemplate, Partials, RenderOptions,
};
