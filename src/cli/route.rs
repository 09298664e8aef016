//! CLI route: single route table and run context.

use crate::answers::AnswerStore;
use crate::config::{AskfileConfig, ConfigLoader};
use crate::engine::{check_schema, ArrayScope, RunOutcome, TraversalEngine};
use crate::error::{ApiError, ConfigError};
use crate::output::{render, summary_table, write_artifact, OutputFormat};
use crate::prompt::{AcceptDefaults, PromptSurface, TerminalSurface};
use crate::schema::Schema;
use crate::source::HandlerRegistry;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::cli::parse::Commands;

/// Result of one command: text for stdout and whether the exit code is zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub text: String,
    pub success: bool,
}

impl CommandOutput {
    fn ok(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            success: true,
        }
    }

    fn failed(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            success: false,
        }
    }
}

/// Runtime context for CLI execution: workspace, loaded config, handlers.
pub struct RunContext {
    workspace_root: PathBuf,
    config: AskfileConfig,
    registry: HandlerRegistry,
}

impl RunContext {
    /// Create run context from workspace root and optional config path.
    pub fn new(workspace_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, ApiError> {
        let config = match config_path {
            Some(ref path) => ConfigLoader::load_from_file(&absolutize(&workspace_root, path))?,
            None => ConfigLoader::load(&workspace_root)?,
        };
        Ok(Self::with_config(workspace_root, config))
    }

    pub fn with_config(workspace_root: PathBuf, config: AskfileConfig) -> Self {
        Self {
            workspace_root,
            config,
            registry: HandlerRegistry::with_builtins(),
        }
    }

    /// Replace the handler registry, e.g. to add application handlers.
    pub fn with_registry(mut self, registry: HandlerRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn config(&self) -> &AskfileConfig {
        &self.config
    }

    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }

    /// Execute a command, prompting on the terminal where needed.
    pub fn execute(&self, command: &Commands) -> Result<CommandOutput, ApiError> {
        match command {
            Commands::Run { defaults: true, .. } => {
                self.execute_with_surface(command, &mut AcceptDefaults::new())
            }
            _ => self.execute_with_surface(command, &mut TerminalSurface::new()),
        }
    }

    /// Execute a command against a caller-provided capture surface.
    pub fn execute_with_surface(
        &self,
        command: &Commands,
        surface: &mut dyn PromptSurface,
    ) -> Result<CommandOutput, ApiError> {
        debug!(command = command.name(), "Executing command");
        match command {
            Commands::Run {
                schema,
                output,
                array_scope,
                no_summary,
                ..
            } => self.handle_run(
                schema.as_deref(),
                output.as_deref(),
                *array_scope,
                !*no_summary && self.config.traversal.show_summary,
                surface,
            ),
            Commands::Skeleton { schema, format } => self.handle_skeleton(schema.as_deref(), format),
            Commands::Check { schema } => self.handle_check(schema.as_deref()),
        }
    }

    fn handle_run(
        &self,
        schema: Option<&Path>,
        output: Option<&Path>,
        array_scope: Option<ArrayScope>,
        show_summary: bool,
        surface: &mut dyn PromptSurface,
    ) -> Result<CommandOutput, ApiError> {
        let paths = self.config.resolve_paths(schema, output)?;
        let schema = self.load_schema(&paths.schema)?;

        let mut options = self.config.engine_options();
        if let Some(scope) = array_scope {
            options.array_scope = scope;
        }
        options.base_dir = Some(self.workspace_root.clone());

        let report = TraversalEngine::new(&schema, &self.registry, surface)
            .with_options(options)
            .run()?;

        let (value, partial) = match report.outcome {
            RunOutcome::Completed(value) => (value, false),
            RunOutcome::Partial(value) => (value, true),
            RunOutcome::Discarded => return Ok(CommandOutput::failed("Exiting without saving.")),
            RunOutcome::ForceQuit => {
                return Ok(CommandOutput::failed("Force exit. No data saved."))
            }
        };

        let Some(output_path) = paths.output else {
            return Ok(CommandOutput::ok(render(&value, OutputFormat::Yaml)?));
        };
        let output_path = absolutize(&self.workspace_root, &output_path);
        write_artifact(&value, &output_path)?;
        info!(output = %output_path.display(), partial, "Saved answers");

        let mut text = String::new();
        if show_summary {
            text.push_str(&summary_table(&value));
            text.push('\n');
        }
        let label = if partial {
            "Partial results"
        } else {
            "Configuration"
        };
        text.push_str(&format!("{} saved to {}", label, output_path.display()));
        Ok(CommandOutput::ok(text))
    }

    fn handle_skeleton(&self, schema: Option<&Path>, format: &str) -> Result<CommandOutput, ApiError> {
        let format = OutputFormat::parse(format).ok_or_else(|| {
            ConfigError::Invalid(format!(
                "Invalid format: {} (must be 'yaml' or 'json')",
                format
            ))
        })?;
        let paths = self.config.resolve_paths(schema, None)?;
        let schema = self.load_schema(&paths.schema)?;
        let skeleton = AnswerStore::skeleton(&schema).into_value();
        Ok(CommandOutput::ok(render(&skeleton, format)?))
    }

    fn handle_check(&self, schema: Option<&Path>) -> Result<CommandOutput, ApiError> {
        let paths = self.config.resolve_paths(schema, None)?;
        let schema_path = absolutize(&self.workspace_root, &paths.schema);
        let schema = Schema::load(&schema_path)?;
        let problems = check_schema(&schema, &self.registry);

        if problems.is_empty() {
            return Ok(CommandOutput::ok(format!(
                "{}: no problems found",
                schema_path.display()
            )));
        }
        let mut text = format!(
            "{}: {} problem(s) found\n",
            schema_path.display(),
            problems.len()
        );
        for problem in &problems {
            text.push_str(&format!("  {}\n", problem));
        }
        Ok(CommandOutput::failed(text.trim_end()))
    }

    fn load_schema(&self, path: &Path) -> Result<Schema, ApiError> {
        let path = absolutize(&self.workspace_root, path);
        debug!(schema = %path.display(), "Loading schema");
        Ok(Schema::load(&path)?)
    }
}

fn absolutize(workspace_root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        workspace_root.join(path)
    }
}
