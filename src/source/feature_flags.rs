//! Built-in `feature_flags` handler.
//!
//! Reads a dataset shaped like
//!
//! ```yaml
//! feature_flags:
//!   releases:
//!     3.1.5.0: [f1, f2]
//!     3.1.5.1: [f3]
//! ```
//!
//! and offers every flag introduced up to and including the release chosen
//! earlier in the run.

use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use super::registry::{HandlerConfig, HandlerRegistry};
use super::load_dataset;
use crate::answers::{dig, AnswerPath, AnswerValue};
use crate::error::HandlerError;

pub const HANDLER_NAME: &str = "feature_flags";
pub const FILTER_BY_RELEASE: &str = "filter_by_release";

const DEFAULT_DATA_FILE: &str = "features.yml";
const DEFAULT_ANSWER_KEY: &str = "release_version";

pub fn register(registry: &mut HandlerRegistry) {
    registry.register(HANDLER_NAME, FILTER_BY_RELEASE, filter_by_release);
}

/// Flags of every release `<=` the selected one, oldest release first,
/// de-duplicated in first-seen order. No selection yields no options.
pub fn filter_by_release(
    answers: &AnswerValue,
    config: &HandlerConfig,
) -> Result<Vec<String>, HandlerError> {
    let answer_key = config
        .get("answer_key")
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_ANSWER_KEY);
    let selected = dig(answers, &AnswerPath::parse(answer_key)).and_then(AnswerValue::scalar_text);
    let selected = match selected {
        Some(version) if !version.is_empty() => version,
        _ => {
            debug!(answer_key, "No release selected, offering no flags");
            return Ok(Vec::new());
        }
    };

    let data_file = data_file_path(config);
    let dataset = load_dataset(&data_file).map_err(|e| HandlerError::failed(HANDLER_NAME, e))?;
    let releases = dataset
        .get("feature_flags")
        .and_then(|flags| flags.get("releases"))
        .and_then(Value::as_object)
        .ok_or_else(|| {
            HandlerError::failed(
                HANDLER_NAME,
                format!("{} has no feature_flags.releases mapping", data_file.display()),
            )
        })?;

    let mut included: Vec<(&String, &Value)> = releases
        .iter()
        .filter(|(version, _)| compare_versions(version, &selected) != Ordering::Greater)
        .collect();
    included.sort_by(|(a, _), (b, _)| compare_versions(a, b));

    let mut flags: Vec<String> = Vec::new();
    for (_, release_flags) in included {
        let Some(list) = release_flags.as_array() else {
            continue;
        };
        for flag in list {
            let name = match flag {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            if !flags.contains(&name) {
                flags.push(name);
            }
        }
    }

    debug!(release = %selected, count = flags.len(), "Resolved feature flags");
    Ok(flags)
}

fn data_file_path(config: &HandlerConfig) -> PathBuf {
    let file = config
        .get("data_file")
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_DATA_FILE);
    let path = Path::new(file);
    match config.get(super::BASE_DIR_KEY).and_then(Value::as_str) {
        Some(base) if path.is_relative() => Path::new(base).join(path),
        _ => path.to_path_buf(),
    }
}

/// Dotted version comparison: numeric parts compare numerically, anything
/// else lexically, missing parts count as zero.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let left: Vec<&str> = a.split('.').collect();
    let right: Vec<&str> = b.split('.').collect();
    let len = left.len().max(right.len());

    for i in 0..len {
        let l = left.get(i).copied().unwrap_or("0");
        let r = right.get(i).copied().unwrap_or("0");
        let ordering = match (l.parse::<u64>(), r.parse::<u64>()) {
            (Ok(x), Ok(y)) => x.cmp(&y),
            _ => l.cmp(r),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}
