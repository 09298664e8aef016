//! Configuration System
//!
//! Layered configuration for the `askfile` binary. Provides default schema and
//! output paths, traversal options and logging settings. Layers, lowest first:
//! built-in defaults, the global file, workspace files, `ASKFILE__*`
//! environment variables.

use crate::engine::{ArrayScope, EngineOptions};
use crate::error::ConfigError;
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

mod facade;
mod merge;
mod sources;

pub use facade::ConfigLoader;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AskfileConfig {
    /// Schema used when none is given on the command line
    #[serde(default)]
    pub schema_path: Option<PathBuf>,

    /// Artifact path used when none is given on the command line
    #[serde(default)]
    pub output_path: Option<PathBuf>,

    #[serde(default)]
    pub traversal: TraversalConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraversalConfig {
    #[serde(default)]
    pub array_scope: ArrayScope,

    /// Print the final answers table after a run
    #[serde(default = "default_true")]
    pub show_summary: bool,
}

fn default_true() -> bool {
    true
}

impl Default for TraversalConfig {
    fn default() -> Self {
        Self {
            array_scope: ArrayScope::default(),
            show_summary: true,
        }
    }
}

/// Paths for one run after CLI arguments and configured defaults are merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPaths {
    pub schema: PathBuf,
    pub output: Option<PathBuf>,
}

impl AskfileConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(path) = &self.schema_path {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::Invalid("schema_path cannot be empty".to_string()));
            }
        }
        if let Some(path) = &self.output_path {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::Invalid("output_path cannot be empty".to_string()));
            }
        }
        Ok(())
    }

    /// Explicit arguments win over configured defaults.
    pub fn resolve_paths(
        &self,
        cli_schema: Option<&Path>,
        cli_output: Option<&Path>,
    ) -> Result<RunPaths, ConfigError> {
        let schema = cli_schema
            .map(Path::to_path_buf)
            .or_else(|| self.schema_path.clone())
            .ok_or(ConfigError::MissingSchemaPath)?;
        let output = cli_output
            .map(Path::to_path_buf)
            .or_else(|| self.output_path.clone());
        Ok(RunPaths { schema, output })
    }

    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            array_scope: self.traversal.array_scope,
            base_dir: None,
        }
    }
}
