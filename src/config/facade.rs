//! Config loader: assembles the layered sources and deserializes the result.

use super::merge::merge_policy;
use super::sources::{global_file, workspace_file};
use super::AskfileConfig;
use crate::error::ConfigError;
use config::{Environment, File};
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for a workspace: defaults, global file, workspace
    /// files, then `ASKFILE__SECTION__KEY` environment variables.
    pub fn load(workspace_root: &Path) -> Result<AskfileConfig, ConfigError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder)?;
        let builder = workspace_file::add_to_builder(builder, workspace_root)?;
        let config: AskfileConfig = builder
            .add_source(Self::environment())
            .build()?
            .try_deserialize()?;

        config.validate()?;
        debug!(workspace = %workspace_root.display(), "Loaded configuration");
        Ok(config)
    }

    /// Load from one explicit file, skipping the global and workspace files.
    pub fn load_from_file(path: &Path) -> Result<AskfileConfig, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::Invalid(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        let config: AskfileConfig = merge_policy::builder_with_defaults()?
            .add_source(File::from(path).required(true))
            .add_source(Self::environment())
            .build()?
            .try_deserialize()?;

        config.validate()?;
        debug!(config_file = %path.display(), "Loaded configuration");
        Ok(config)
    }

    pub fn global_config_path() -> Option<PathBuf> {
        global_file::global_config_path()
    }

    fn environment() -> Environment {
        Environment::with_prefix("ASKFILE")
            .prefix_separator("__")
            .separator("__")
    }
}
