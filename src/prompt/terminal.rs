//! Interactive terminal surface backed by dialoguer.

use dialoguer::{Confirm, Input, MultiSelect, Select};
use owo_colors::OwoColorize;

use super::{PromptSurface, Validator};
use crate::engine::Diagnostic;
use crate::error::PromptError;

#[derive(Debug, Default)]
pub struct TerminalSurface;

impl TerminalSurface {
    pub fn new() -> Self {
        Self
    }
}

impl PromptSurface for TerminalSurface {
    fn ask_text(
        &mut self,
        prompt: &str,
        default: Option<&str>,
        required: bool,
        validator: Option<Validator<'_>>,
    ) -> Result<String, PromptError> {
        let mut input = Input::<String>::new()
            .with_prompt(prompt)
            .allow_empty(!required);
        if let Some(default) = default {
            input = input.default(default.to_string());
        }
        if let Some(check) = validator {
            input = input.validate_with(move |text: &String| -> Result<(), String> {
                check(text.as_str())
            });
        }
        Ok(input.interact_text()?)
    }

    fn ask_yes_no(&mut self, prompt: &str, default: Option<bool>) -> Result<bool, PromptError> {
        let mut confirm = Confirm::new().with_prompt(prompt);
        if let Some(default) = default {
            confirm = confirm.default(default);
        }
        Ok(confirm.interact()?)
    }

    fn select_one(
        &mut self,
        prompt: &str,
        options: &[String],
        default: Option<&str>,
    ) -> Result<String, PromptError> {
        let index = default
            .and_then(|d| options.iter().position(|o| o == d))
            .unwrap_or(0);
        let selection = Select::new()
            .with_prompt(prompt)
            .items(options)
            .default(index)
            .interact()?;
        Ok(options[selection].clone())
    }

    fn select_many(
        &mut self,
        prompt: &str,
        options: &[String],
        defaults: &[String],
    ) -> Result<Vec<String>, PromptError> {
        let checked: Vec<bool> = options.iter().map(|o| defaults.contains(o)).collect();
        let selections = MultiSelect::new()
            .with_prompt(prompt)
            .items(options)
            .defaults(&checked)
            .interact()?;
        Ok(selections.into_iter().map(|i| options[i].clone()).collect())
    }

    fn show_help(&mut self, text: &str) {
        eprintln!("{}", text.dimmed());
    }

    fn begin_section(&mut self, title: &str) {
        eprintln!("\n{}", title.bold().underline());
    }

    fn notify(&mut self, diagnostic: &Diagnostic) {
        eprintln!("{} {}", "warning:".yellow().bold(), diagnostic);
    }
}
