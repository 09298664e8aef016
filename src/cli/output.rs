//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::{ApiError, ConfigError, PromptError, RunError};

/// Map domain/service errors to a string for CLI output.
pub fn map_error(e: &ApiError) -> String {
    match e {
        ApiError::Config(ConfigError::MissingSchemaPath) => format!(
            "{}\nhint: pass --schema or set schema_path in askfile.toml",
            e
        ),
        ApiError::Run(RunError::Prompt(PromptError::Io(_))) => format!(
            "{}\nhint: use `askfile run --defaults` when no terminal is attached",
            e
        ),
        _ => e.to_string(),
    }
}
