//! Workspace config file sources: askfile.toml, config/askfile.toml and config/askfile.{env}.toml

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::ConfigError;
use config::File;
use std::path::Path;

/// Add workspace config files to builder.
/// Precedence: askfile.toml, then config/askfile.toml, then
/// config/askfile.{ASKFILE_ENV}.toml (default env: development).
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
    workspace_root: &Path,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let config_dir = workspace_root.join("config");
    let env_name = std::env::var("ASKFILE_ENV").unwrap_or_else(|_| "development".to_string());

    let candidates = [
        workspace_root.join("askfile.toml"),
        config_dir.join("askfile.toml"),
        config_dir.join(format!("askfile.{}.toml", env_name)),
    ];

    let mut builder = builder;
    for path in candidates {
        if path.exists() {
            builder = builder.add_source(File::from(path).required(false));
        }
    }
    Ok(builder)
}
