//! Capture surfaces
//!
//! The engine never talks to a terminal directly. Every question goes through
//! a [`PromptSurface`]; an operator interrupt comes back as
//! [`PromptError::Interrupted`] from whichever call was blocked.

pub mod defaults;
pub mod scripted;
pub mod terminal;

use crate::engine::Diagnostic;
use crate::error::PromptError;

pub use defaults::AcceptDefaults;
pub use scripted::{Capture, CaptureKind, Scripted, ScriptedSurface};
pub use terminal::TerminalSurface;

/// Input check run by the surface before returning text. `Err` carries the
/// message shown to the operator.
pub type Validator<'v> = &'v dyn Fn(&str) -> Result<(), String>;

pub trait PromptSurface {
    /// Free text. Empty input returns the default when one is given; a
    /// required prompt re-asks on empty input.
    fn ask_text(
        &mut self,
        prompt: &str,
        default: Option<&str>,
        required: bool,
        validator: Option<Validator<'_>>,
    ) -> Result<String, PromptError>;

    fn ask_yes_no(&mut self, prompt: &str, default: Option<bool>) -> Result<bool, PromptError>;

    fn select_one(
        &mut self,
        prompt: &str,
        options: &[String],
        default: Option<&str>,
    ) -> Result<String, PromptError>;

    fn select_many(
        &mut self,
        prompt: &str,
        options: &[String],
        defaults: &[String],
    ) -> Result<Vec<String>, PromptError>;

    fn show_help(&mut self, _text: &str) {}

    fn begin_section(&mut self, _title: &str) {}

    fn notify(&mut self, _diagnostic: &Diagnostic) {}
}
