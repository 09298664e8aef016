//! Error types for the askfile capture engine.
//!
//! Only document-level and surface-level failures ever leave the engine.
//! Expression, source and handler errors are absorbed at the point of use and
//! turned into diagnostics (see `engine::Diagnostic`).

use std::path::PathBuf;
use thiserror::Error;

/// Schema document errors (loading and top-level shape)
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Failed to read schema {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse schema: {0}")]
    Parse(String),

    #[error("Schema root must be a mapping of field names to nodes")]
    NotAMapping,
}

/// Expression compile/evaluation errors
#[derive(Debug, Error)]
pub enum ExpressionError {
    #[error("Expression evaluation failed: {0}")]
    EvalFailed(String),

    #[error("Expression for {slot} returned an unusable value: {result}")]
    UnexpectedResult {
        slot: &'static str,
        result: serde_json::Value,
    },

    #[error("Invalid regular expression {pattern}: {message}")]
    InvalidRegex { pattern: String, message: String },
}

/// Option source errors
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Source I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed dataset {path:?}: {message}")]
    Malformed { path: PathBuf, message: String },

    #[error("Source is missing required parameter '{0}'")]
    MissingParameter(&'static str),

    #[error("Unknown source type '{0}'")]
    UnknownKind(String),

    #[error(transparent)]
    Handler(#[from] HandlerError),
}

/// Handler dispatch errors
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("Handler '{name}' with method '{method}' is not registered")]
    NotRegistered { name: String, method: String },

    #[error("Handler '{name}' failed: {message}")]
    Failed { name: String, message: String },

    #[error("Handler '{name}' panicked: {message}")]
    Panicked { name: String, message: String },
}

impl HandlerError {
    /// Build a failure error from inside a handler body.
    pub fn failed(name: impl Into<String>, message: impl ToString) -> Self {
        HandlerError::Failed {
            name: name.into(),
            message: message.to_string(),
        }
    }
}

/// Capture surface errors
#[derive(Debug, Error)]
pub enum PromptError {
    /// The operator sent an interrupt while the surface was blocked on input.
    #[error("Interrupted by user")]
    Interrupted,

    #[error("Prompt I/O error: {0}")]
    Io(String),

    #[error("Scripted surface has no response left for '{0}'")]
    ScriptExhausted(String),
}

impl From<dialoguer::Error> for PromptError {
    fn from(err: dialoguer::Error) -> Self {
        match err {
            dialoguer::Error::IO(ref e) if e.kind() == std::io::ErrorKind::Interrupted => {
                PromptError::Interrupted
            }
            other => PromptError::Io(other.to_string()),
        }
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("schema_path must be provided or configured")]
    MissingSchemaPath,

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Configuration load failed: {0}")]
    Load(#[from] config::ConfigError),
}

/// Artifact output errors
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write output {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize output: {0}")]
    Serialize(String),
}

/// Errors that end a run early without an outcome
#[derive(Debug, Error)]
pub enum RunError {
    #[error("Capture surface failed: {0}")]
    Prompt(#[from] PromptError),

    #[error("Invalid session transition from {from} on {event}")]
    InvalidTransition { from: &'static str, event: &'static str },
}

/// Top-level error surfaced by the CLI
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Run failed: {0}")]
    Run(#[from] RunError),

    #[error("Output error: {0}")]
    Output(#[from] OutputError),

    #[error("Logging setup failed: {0}")]
    Logging(String),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::Config(ConfigError::Load(err))
    }
}
