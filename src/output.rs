//! Artifact persistence and display.

use std::fs;
use std::path::Path;

use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;
use tracing::info;

use crate::answers::AnswerValue;
use crate::error::OutputError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Yaml,
    Json,
}

impl OutputFormat {
    /// `.json` means JSON; anything else is YAML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => OutputFormat::Json,
            _ => OutputFormat::Yaml,
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "yaml" | "yml" => Some(OutputFormat::Yaml),
            "json" => Some(OutputFormat::Json),
            _ => None,
        }
    }
}

pub fn render(value: &AnswerValue, format: OutputFormat) -> Result<String, OutputError> {
    match format {
        OutputFormat::Yaml => {
            serde_yaml_ng::to_string(value).map_err(|e| OutputError::Serialize(e.to_string()))
        }
        OutputFormat::Json => serde_json::to_string_pretty(value)
            .map(|mut text| {
                text.push('\n');
                text
            })
            .map_err(|e| OutputError::Serialize(e.to_string())),
    }
}

/// Write the artifact, creating parent directories as needed.
pub fn write_artifact(value: &AnswerValue, path: &Path) -> Result<(), OutputError> {
    let content = render(value, OutputFormat::from_path(path))?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| OutputError::Io {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }
    fs::write(path, content).map_err(|e| OutputError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    info!(path = %path.display(), "Wrote artifact");
    Ok(())
}

/// Read an artifact back (YAML or JSON).
pub fn read_artifact(path: &Path) -> Result<AnswerValue, OutputError> {
    let content = fs::read_to_string(path).map_err(|e| OutputError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    serde_yaml_ng::from_str(&content).map_err(|e| OutputError::Serialize(e.to_string()))
}

/// Leaf rows as `(path, display value)`, in document order.
pub fn flatten(value: &AnswerValue) -> Vec<(String, String)> {
    fn walk(prefix: &str, value: &AnswerValue, rows: &mut Vec<(String, String)>) {
        match value {
            AnswerValue::Map(map) if !map.is_empty() => {
                for (key, child) in map.iter() {
                    let path = if prefix.is_empty() {
                        key.to_string()
                    } else {
                        format!("{}.{}", prefix, key)
                    };
                    walk(&path, child, rows);
                }
            }
            AnswerValue::List(items)
                if items.iter().any(|i| matches!(i, AnswerValue::Map(_) | AnswerValue::List(_))) =>
            {
                for (index, child) in items.iter().enumerate() {
                    walk(&format!("{}[{}]", prefix, index), child, rows);
                }
            }
            leaf => rows.push((prefix.to_string(), leaf.to_string())),
        }
    }

    let mut rows = Vec::new();
    walk("", value, &mut rows);
    rows
}

pub fn summary_table(value: &AnswerValue) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Path", "Value"]);
    for (path, text) in flatten(value) {
        table.add_row(vec![path, text]);
    }
    format!("{}\n\n{}\n", "Final answers".bold().underline(), table)
}
