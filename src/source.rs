//! Option sources for select fields
//!
//! Turns a node's [`SourceSpec`] into a list of option labels. Four kinds are
//! supported: an embedded list, a directory listing, a YAML/JSON dataset, and
//! a named handler from the [`HandlerRegistry`].
//!
//! Relative directory and dataset paths resolve against the base directory
//! when one is set. Handlers receive the base directory under
//! [`BASE_DIR_KEY`] so they can do the same.

pub mod feature_flags;
pub mod registry;

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;
use walkdir::WalkDir;

use crate::answers::AnswerValue;
use crate::error::SourceError;
use crate::schema::SourceSpec;

pub use registry::{Handler, HandlerConfig, HandlerRegistry, DEFAULT_METHOD};

/// Config key under which the base directory is handed to handlers.
pub const BASE_DIR_KEY: &str = "base_dir";

/// Register every handler shipped with this crate.
pub fn register_builtin_handlers(registry: &mut HandlerRegistry) {
    feature_flags::register(registry);
}

pub struct OptionSource<'a> {
    registry: &'a HandlerRegistry,
    base_dir: Option<PathBuf>,
}

impl<'a> OptionSource<'a> {
    pub fn new(registry: &'a HandlerRegistry) -> Self {
        Self {
            registry,
            base_dir: None,
        }
    }

    pub fn with_base_dir(mut self, base_dir: Option<PathBuf>) -> Self {
        self.base_dir = base_dir;
        self
    }

    /// Resolve a source declaration against the current answers.
    pub fn resolve(
        &self,
        spec: &SourceSpec,
        answers: &AnswerValue,
    ) -> Result<Vec<String>, SourceError> {
        debug!(kind = spec.kind(), "Resolving option source");
        match spec {
            SourceSpec::Static(options) => Ok(options.clone()),
            SourceSpec::Directory { path } => {
                let path = path.as_deref().ok_or(SourceError::MissingParameter("path"))?;
                list_files(&self.resolve_path(path))
            }
            SourceSpec::Dataset { path } => {
                let path = path.as_deref().ok_or(SourceError::MissingParameter("path"))?;
                let path = self.resolve_path(path);
                dataset_options(&path, &load_dataset(&path)?)
            }
            SourceSpec::Handler {
                name,
                method,
                config,
            } => {
                let name = name.as_deref().ok_or(SourceError::MissingParameter("handler"))?;
                let method = method.as_deref().unwrap_or(DEFAULT_METHOD);
                let mut config = config.clone();
                if let Some(base) = &self.base_dir {
                    config
                        .entry(BASE_DIR_KEY)
                        .or_insert_with(|| Value::String(base.to_string_lossy().into_owned()));
                }
                Ok(self.registry.invoke(name, method, answers, &config)?)
            }
            SourceSpec::Unknown(kind) => Err(SourceError::UnknownKind(kind.clone())),
        }
    }

    fn resolve_path(&self, path: &Path) -> PathBuf {
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}

/// Regular files directly inside `dir`, names only, sorted.
pub fn list_files(dir: &Path) -> Result<Vec<String>, SourceError> {
    let mut names = Vec::new();
    let walker = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name();

    for entry in walker {
        let entry = entry.map_err(|e| SourceError::Io {
            path: dir.to_path_buf(),
            source: e
                .into_io_error()
                .unwrap_or_else(|| std::io::Error::other("directory walk failed")),
        })?;
        if entry.file_type().is_file() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    Ok(names)
}

/// Parse a YAML or JSON document from disk.
pub fn load_dataset(path: &Path) -> Result<Value, SourceError> {
    let content = std::fs::read_to_string(path).map_err(|e| SourceError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    serde_yaml_ng::from_str(&content).map_err(|e| SourceError::Malformed {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

fn dataset_options(path: &Path, document: &Value) -> Result<Vec<String>, SourceError> {
    match document {
        Value::Object(map) => Ok(map.keys().cloned().collect()),
        Value::Array(items) => Ok(items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect()),
        _ => Err(SourceError::Malformed {
            path: path.to_path_buf(),
            message: "expected a mapping or a sequence".to_string(),
        }),
    }
}
