//! Replay surface for tests and automation.
//!
//! Answers come from a queue of [`Scripted`] responses. Every question is
//! recorded as a [`Capture`] so callers can assert on what was asked and
//! which options were offered.

use std::collections::VecDeque;

use super::{PromptSurface, Validator};
use crate::engine::Diagnostic;
use crate::error::PromptError;

#[derive(Debug, Clone, PartialEq)]
pub enum Scripted {
    Text(String),
    YesNo(bool),
    Choose(String),
    ChooseMany(Vec<String>),
    /// Take whatever default the prompt offers.
    AcceptDefault,
    /// Simulate Ctrl-C at this prompt.
    Interrupt,
}

impl Scripted {
    pub fn text(value: impl Into<String>) -> Self {
        Scripted::Text(value.into())
    }

    pub fn choose(value: impl Into<String>) -> Self {
        Scripted::Choose(value.into())
    }

    pub fn choose_many<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Scripted::ChooseMany(values.into_iter().map(Into::into).collect())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureKind {
    Text,
    YesNo,
    SelectOne,
    SelectMany,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Capture {
    pub kind: CaptureKind,
    pub prompt: String,
    /// Options offered for selects; empty otherwise.
    pub options: Vec<String>,
}

#[derive(Debug, Default)]
pub struct ScriptedSurface {
    responses: VecDeque<Scripted>,
    captures: Vec<Capture>,
    sections: Vec<String>,
    help: Vec<String>,
    notices: Vec<Diagnostic>,
    rejections: Vec<String>,
}

impl ScriptedSurface {
    pub fn new(responses: impl IntoIterator<Item = Scripted>) -> Self {
        Self {
            responses: responses.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn captures(&self) -> &[Capture] {
        &self.captures
    }

    pub fn prompts(&self) -> Vec<&str> {
        self.captures.iter().map(|c| c.prompt.as_str()).collect()
    }

    pub fn sections(&self) -> &[String] {
        &self.sections
    }

    pub fn help_shown(&self) -> &[String] {
        &self.help
    }

    pub fn notices(&self) -> &[Diagnostic] {
        &self.notices
    }

    /// Validation messages returned for rejected text input.
    pub fn rejections(&self) -> &[String] {
        &self.rejections
    }

    pub fn remaining(&self) -> usize {
        self.responses.len()
    }

    fn record(&mut self, kind: CaptureKind, prompt: &str, options: &[String]) {
        self.captures.push(Capture {
            kind,
            prompt: prompt.to_string(),
            options: options.to_vec(),
        });
    }

    fn next(&mut self, prompt: &str) -> Result<Scripted, PromptError> {
        match self.responses.pop_front() {
            Some(Scripted::Interrupt) => Err(PromptError::Interrupted),
            Some(response) => Ok(response),
            None => Err(PromptError::ScriptExhausted(prompt.to_string())),
        }
    }
}

fn mismatch(prompt: &str, response: &Scripted) -> PromptError {
    PromptError::Io(format!("scripted response {:?} does not fit prompt '{}'", response, prompt))
}

impl PromptSurface for ScriptedSurface {
    fn ask_text(
        &mut self,
        prompt: &str,
        default: Option<&str>,
        required: bool,
        validator: Option<Validator<'_>>,
    ) -> Result<String, PromptError> {
        self.record(CaptureKind::Text, prompt, &[]);
        loop {
            let input = match self.next(prompt)? {
                Scripted::Text(text) => text,
                Scripted::AcceptDefault => String::new(),
                other => return Err(mismatch(prompt, &other)),
            };
            let value = match (input.is_empty(), default) {
                (true, Some(default)) => default.to_string(),
                _ => input,
            };
            if value.is_empty() && required {
                self.rejections.push("Value is required".to_string());
                continue;
            }
            if let Some(check) = validator {
                if let Err(message) = check(&value) {
                    self.rejections.push(message);
                    continue;
                }
            }
            return Ok(value);
        }
    }

    fn ask_yes_no(&mut self, prompt: &str, default: Option<bool>) -> Result<bool, PromptError> {
        self.record(CaptureKind::YesNo, prompt, &[]);
        match self.next(prompt)? {
            Scripted::YesNo(answer) => Ok(answer),
            Scripted::AcceptDefault => Ok(default.unwrap_or(false)),
            other => Err(mismatch(prompt, &other)),
        }
    }

    fn select_one(
        &mut self,
        prompt: &str,
        options: &[String],
        default: Option<&str>,
    ) -> Result<String, PromptError> {
        self.record(CaptureKind::SelectOne, prompt, options);
        match self.next(prompt)? {
            Scripted::Choose(choice) if options.contains(&choice) => Ok(choice),
            Scripted::AcceptDefault => default
                .filter(|d| options.iter().any(|o| o == *d))
                .map(str::to_string)
                .or_else(|| options.first().cloned())
                .ok_or_else(|| mismatch(prompt, &Scripted::AcceptDefault)),
            other => Err(mismatch(prompt, &other)),
        }
    }

    fn select_many(
        &mut self,
        prompt: &str,
        options: &[String],
        defaults: &[String],
    ) -> Result<Vec<String>, PromptError> {
        self.record(CaptureKind::SelectMany, prompt, options);
        match self.next(prompt)? {
            Scripted::ChooseMany(choices) if choices.iter().all(|c| options.contains(c)) => {
                Ok(choices)
            }
            Scripted::AcceptDefault => Ok(defaults
                .iter()
                .filter(|d| options.contains(d))
                .cloned()
                .collect()),
            other => Err(mismatch(prompt, &other)),
        }
    }

    fn show_help(&mut self, text: &str) {
        self.help.push(text.to_string());
    }

    fn begin_section(&mut self, title: &str) {
        self.sections.push(title.to_string());
    }

    fn notify(&mut self, diagnostic: &Diagnostic) {
        self.notices.push(diagnostic.clone());
    }
}
