//! Non-interactive surface that takes every default.

use tracing::info;

use super::{PromptSurface, Validator};
use crate::engine::Diagnostic;
use crate::error::PromptError;

/// Answers each capture with its default: the declared default for text,
/// the default or first option for selects, the default or `false` for
/// yes/no. Confirmation prompts offer `true` as their default.
#[derive(Debug, Default)]
pub struct AcceptDefaults;

impl AcceptDefaults {
    pub fn new() -> Self {
        Self
    }
}

impl PromptSurface for AcceptDefaults {
    fn ask_text(
        &mut self,
        prompt: &str,
        default: Option<&str>,
        _required: bool,
        _validator: Option<Validator<'_>>,
    ) -> Result<String, PromptError> {
        let value = default.unwrap_or_default().to_string();
        info!(prompt, value = %value, "Accepting default");
        Ok(value)
    }

    fn ask_yes_no(&mut self, prompt: &str, default: Option<bool>) -> Result<bool, PromptError> {
        let value = default.unwrap_or(false);
        info!(prompt, value, "Accepting default");
        Ok(value)
    }

    fn select_one(
        &mut self,
        prompt: &str,
        options: &[String],
        default: Option<&str>,
    ) -> Result<String, PromptError> {
        let value = default
            .filter(|d| options.iter().any(|o| o == *d))
            .map(str::to_string)
            .or_else(|| options.first().cloned())
            .unwrap_or_default();
        info!(prompt, value = %value, "Accepting default");
        Ok(value)
    }

    fn select_many(
        &mut self,
        prompt: &str,
        options: &[String],
        defaults: &[String],
    ) -> Result<Vec<String>, PromptError> {
        let values: Vec<String> = defaults
            .iter()
            .filter(|d| options.contains(d))
            .cloned()
            .collect();
        info!(prompt, count = values.len(), "Accepting defaults");
        Ok(values)
    }

    fn notify(&mut self, diagnostic: &Diagnostic) {
        eprintln!("warning: {}", diagnostic);
    }
}
