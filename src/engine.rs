//! Traversal engine
//!
//! Drives one capture run over a [`Schema`]:
//!
//! 1. Skeleton pass: the store is seeded with a slot for every schema path.
//! 2. Acquisition pass: depth-first, pre-order, declaration order. Each node
//!    is visited only after every earlier node has been committed, so skip
//!    predicates, computed lengths and handlers always see the answers as of
//!    that moment.
//!
//! Interrupts arrive as [`PromptError::Interrupted`] from the surface and are
//! routed through the [`Session`] state machine.

pub mod check;
pub mod diagnostic;
pub mod session;

use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::answers::{AnswerPath, AnswerStore, AnswerValue};
use crate::error::{PromptError, RunError, SourceError};
use crate::expression::{ConditionEvaluator, Validation};
use crate::postprocess::PostProcessor;
use crate::prompt::PromptSurface;
use crate::schema::{FieldType, LengthSpec, Schema, SchemaField, SchemaNode, MAX_ARRAY_LENGTH};
use crate::source::{HandlerRegistry, OptionSource};

pub use check::check_schema;
pub use diagnostic::{Diagnostic, DiagnosticKind};
pub use session::{Session, SessionEvent, SessionState};

pub const PAUSE_PROMPT: &str = "What would you like to do?";
pub const SAVE_PARTIAL: &str = "Save partial results and exit";
pub const DISCARD: &str = "Exit without saving";

/// How array elements see their siblings while being acquired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArrayScope {
    /// The list is sized up front and each element is filled in place, so
    /// expressions see earlier elements, the element in progress and the
    /// skeleton defaults of later ones.
    #[default]
    Live,
    /// Each element is acquired on a working copy whose array holds only that
    /// element; the finished element is written back at its index.
    Isolated,
}

impl ArrayScope {
    pub fn as_str(self) -> &'static str {
        match self {
            ArrayScope::Live => "live",
            ArrayScope::Isolated => "isolated",
        }
    }
}

impl FromStr for ArrayScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "live" => Ok(ArrayScope::Live),
            "isolated" => Ok(ArrayScope::Isolated),
            other => Err(format!(
                "Invalid array scope '{}'. Must be 'live' or 'isolated'",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct EngineOptions {
    pub array_scope: ArrayScope,
    /// Base for relative directory and dataset source paths.
    pub base_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Completed(AnswerValue),
    /// Interrupted, then the operator chose to keep what was committed.
    Partial(AnswerValue),
    Discarded,
    /// Interrupted a second time while paused.
    ForceQuit,
}

#[derive(Debug, Clone)]
pub struct RunReport {
    pub outcome: RunOutcome,
    pub diagnostics: Vec<Diagnostic>,
}

impl RunReport {
    /// The value to persist, if the run produced one.
    pub fn artifact(&self) -> Option<&AnswerValue> {
        match &self.outcome {
            RunOutcome::Completed(value) | RunOutcome::Partial(value) => Some(value),
            RunOutcome::Discarded | RunOutcome::ForceQuit => None,
        }
    }

    pub fn into_artifact(self) -> Option<AnswerValue> {
        match self.outcome {
            RunOutcome::Completed(value) | RunOutcome::Partial(value) => Some(value),
            RunOutcome::Discarded | RunOutcome::ForceQuit => None,
        }
    }
}

pub struct TraversalEngine<'a> {
    schema: &'a Schema,
    registry: &'a HandlerRegistry,
    surface: &'a mut dyn PromptSurface,
    evaluator: ConditionEvaluator,
    options: EngineOptions,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> TraversalEngine<'a> {
    pub fn new(
        schema: &'a Schema,
        registry: &'a HandlerRegistry,
        surface: &'a mut dyn PromptSurface,
    ) -> Self {
        Self {
            schema,
            registry,
            surface,
            evaluator: ConditionEvaluator::new(),
            options: EngineOptions::default(),
            diagnostics: Vec::new(),
        }
    }

    pub fn with_options(mut self, options: EngineOptions) -> Self {
        self.options = options;
        self
    }

    /// Run to completion, or until the operator leaves through the pause menu.
    pub fn run(mut self) -> Result<RunReport, RunError> {
        let schema = self.schema;
        info!(
            fields = schema.fields().len(),
            array_scope = self.options.array_scope.as_str(),
            "Starting capture run"
        );

        let mut session = Session::new();
        let mut store = AnswerStore::skeleton(schema);

        let outcome = match self.acquire_fields(schema.fields(), &AnswerPath::root(), &mut store) {
            Ok(()) => {
                session.apply(SessionEvent::Complete)?;
                RunOutcome::Completed(store.into_value())
            }
            Err(PromptError::Interrupted) => {
                session.apply(SessionEvent::Interrupt)?;
                self.pause(&mut session, store)?
            }
            Err(e) => return Err(e.into()),
        };

        info!(
            state = session.state().as_str(),
            diagnostics = self.diagnostics.len(),
            "Capture run finished"
        );
        Ok(RunReport {
            outcome,
            diagnostics: self.diagnostics,
        })
    }

    fn pause(&mut self, session: &mut Session, store: AnswerStore) -> Result<RunOutcome, RunError> {
        let choices = [SAVE_PARTIAL.to_string(), DISCARD.to_string()];
        match self.surface.select_one(PAUSE_PROMPT, &choices, None) {
            Ok(choice) if choice == SAVE_PARTIAL => {
                session.apply(SessionEvent::SavePartial)?;
                Ok(RunOutcome::Partial(store.into_value()))
            }
            Ok(_) => {
                session.apply(SessionEvent::Discard)?;
                Ok(RunOutcome::Discarded)
            }
            Err(PromptError::Interrupted) => {
                session.apply(SessionEvent::Interrupt)?;
                Ok(RunOutcome::ForceQuit)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn acquire_fields(
        &mut self,
        fields: &[SchemaField],
        base: &AnswerPath,
        store: &mut AnswerStore,
    ) -> Result<(), PromptError> {
        for field in fields {
            self.acquire_node(&field.node, &base.child(&field.key), store)?;
        }
        Ok(())
    }

    fn acquire_node(
        &mut self,
        node: &SchemaNode,
        path: &AnswerPath,
        store: &mut AnswerStore,
    ) -> Result<(), PromptError> {
        if let Some(expression) = &node.skip_if {
            if self.should_skip(expression, path, store.snapshot()) {
                debug!(path = %path, "Skipping field");
                return Ok(());
            }
        }
        debug!(path = %path, field_type = %node.field_type, "Visiting field");

        let prior = store.get(path).cloned().unwrap_or_default();
        loop {
            if let Some(help) = &node.help {
                self.surface.show_help(help);
            }

            match node.field_type {
                FieldType::Hash => {
                    self.surface.begin_section(&node.prompt);
                    self.acquire_fields(&node.children, path, store)?;
                }
                FieldType::Array => self.acquire_array(node, path, store)?,
                _ => {
                    let Some(value) = self.capture_scalar(node, path, store.snapshot())? else {
                        return Ok(());
                    };
                    if node.confirm && !self.confirm(&value)? {
                        debug!(path = %path, "Capture rejected, asking again");
                        continue;
                    }
                    store.set(path, value);
                    return Ok(());
                }
            }

            if node.confirm {
                let value = store.get(path).cloned().unwrap_or_default();
                if !self.confirm(&value)? {
                    debug!(path = %path, "Group rejected, asking again");
                    store.set(path, prior.clone());
                    continue;
                }
            }
            return Ok(());
        }
    }

    /// Capture and post-process one scalar value. `None` keeps the slot as is.
    fn capture_scalar(
        &mut self,
        node: &SchemaNode,
        path: &AnswerPath,
        answers: &AnswerValue,
    ) -> Result<Option<AnswerValue>, PromptError> {
        let default_text = node.default.as_ref().and_then(AnswerValue::scalar_text);

        let raw = match node.field_type {
            FieldType::Boolean => {
                let default = node.default.as_ref().and_then(AnswerValue::as_bool);
                AnswerValue::Bool(self.surface.ask_yes_no(&node.prompt, default)?)
            }
            FieldType::Select => {
                let Some(options) = self.resolve_options(node, path, answers) else {
                    return Ok(None);
                };
                let choice =
                    self.surface
                        .select_one(&node.prompt, &options, default_text.as_deref())?;
                AnswerValue::Text(choice)
            }
            FieldType::MultiSelect => {
                let Some(options) = self.resolve_options(node, path, answers) else {
                    return Ok(None);
                };
                let defaults: Vec<String> = node
                    .default
                    .as_ref()
                    .and_then(AnswerValue::as_list)
                    .map(|items| items.iter().filter_map(AnswerValue::scalar_text).collect())
                    .unwrap_or_default();
                let choices = self.surface.select_many(&node.prompt, &options, &defaults)?;
                AnswerValue::List(choices.into_iter().map(AnswerValue::Text).collect())
            }
            FieldType::Integer => {
                let validation = self.compile_validation(node, path);
                let evaluator = &self.evaluator;
                let check = |input: &str| -> Result<(), String> {
                    let trimmed = input.trim();
                    if trimmed.is_empty() {
                        return Ok(());
                    }
                    if trimmed.parse::<i64>().is_err() {
                        return Err("Please enter a whole number".to_string());
                    }
                    match &validation {
                        Some(rule) => rule.check(trimmed, evaluator, answers),
                        None => Ok(()),
                    }
                };
                let text = self.surface.ask_text(
                    &node.prompt,
                    default_text.as_deref(),
                    node.required,
                    Some(&check),
                )?;
                match text.trim().parse::<i64>() {
                    Ok(number) => AnswerValue::Integer(number),
                    Err(_) => AnswerValue::Absent,
                }
            }
            FieldType::Text | FieldType::Hash | FieldType::Array => {
                let validation = self.compile_validation(node, path);
                let evaluator = &self.evaluator;
                let check = |input: &str| -> Result<(), String> {
                    match &validation {
                        Some(rule) if !input.is_empty() => rule.check(input, evaluator, answers),
                        _ => Ok(()),
                    }
                };
                let text = self.surface.ask_text(
                    &node.prompt,
                    default_text.as_deref(),
                    node.required,
                    Some(&check),
                )?;
                if text.is_empty() {
                    AnswerValue::Absent
                } else {
                    AnswerValue::Text(text)
                }
            }
        };

        Ok(Some(
            PostProcessor::new(&self.evaluator).process(node, raw, answers),
        ))
    }

    fn acquire_array(
        &mut self,
        node: &SchemaNode,
        path: &AnswerPath,
        store: &mut AnswerStore,
    ) -> Result<(), PromptError> {
        let count = self.resolve_array_length(node, path, store.snapshot())?;
        debug!(path = %path, count, "Acquiring array elements");

        let element = AnswerStore::fields_skeleton(&node.children);
        store.set(path, AnswerValue::List(vec![element.clone(); count]));
        for index in 0..count {
            self.surface
                .begin_section(&format!("{} #{}", node.prompt, index + 1));
            let element_path = path.index(index);

            match self.options.array_scope {
                ArrayScope::Live => {
                    self.acquire_fields(&node.children, &element_path, store)?;
                }
                ArrayScope::Isolated => {
                    let mut scratch = store.clone();
                    scratch.set(path, AnswerValue::List(vec![element.clone()]));
                    let scratch_path = path.index(0);
                    self.acquire_fields(&node.children, &scratch_path, &mut scratch)?;
                    let finished = scratch.get(&scratch_path).cloned().unwrap_or_default();
                    store.set(&element_path, finished);
                }
            }
        }
        Ok(())
    }

    fn resolve_array_length(
        &mut self,
        node: &SchemaNode,
        path: &AnswerPath,
        answers: &AnswerValue,
    ) -> Result<usize, PromptError> {
        match &node.length {
            LengthSpec::Fixed(count) => Ok(*count),
            LengthSpec::Computed(expression) => {
                match self.evaluator.resolve_length(expression, answers) {
                    Ok(count) => Ok(count),
                    Err(e) => {
                        self.report(
                            DiagnosticKind::Expression,
                            path,
                            format!("length '{}' failed, using 0: {}", expression, e),
                        );
                        Ok(0)
                    }
                }
            }
            LengthSpec::Ask => {
                let check = |input: &str| -> Result<(), String> {
                    let trimmed = input.trim();
                    if trimmed.is_empty() {
                        return Ok(());
                    }
                    match trimmed.parse::<usize>() {
                        Ok(count) if count <= MAX_ARRAY_LENGTH => Ok(()),
                        Ok(_) => Err(format!("At most {} entries", MAX_ARRAY_LENGTH)),
                        Err(_) => Err("Please enter a non-negative whole number".to_string()),
                    }
                };
                let text = self.surface.ask_text(
                    &format!("How many {}?", node.prompt),
                    None,
                    false,
                    Some(&check),
                )?;
                Ok(text.trim().parse().unwrap_or(0))
            }
        }
    }

    /// Fail-open skip check: an expression error means the field is asked.
    fn should_skip(&mut self, expression: &str, path: &AnswerPath, answers: &AnswerValue) -> bool {
        match self.evaluator.should_skip(expression, answers) {
            Ok(skip) => skip,
            Err(e) => {
                self.report(
                    DiagnosticKind::Expression,
                    path,
                    format!("skip_if '{}' failed, asking anyway: {}", expression, e),
                );
                false
            }
        }
    }

    /// Options for a select node. `None` when there is nothing to choose from.
    fn resolve_options(
        &mut self,
        node: &SchemaNode,
        path: &AnswerPath,
        answers: &AnswerValue,
    ) -> Option<Vec<String>> {
        let options = if !node.options.is_empty() {
            node.options.clone()
        } else if let Some(spec) = &node.source {
            let source =
                OptionSource::new(self.registry).with_base_dir(self.options.base_dir.clone());
            match source.resolve(spec, answers) {
                Ok(options) => options,
                Err(e) => {
                    let kind = match e {
                        SourceError::Handler(_) => DiagnosticKind::Handler,
                        _ => DiagnosticKind::Source,
                    };
                    self.report(kind, path, e.to_string());
                    return None;
                }
            }
        } else {
            Vec::new()
        };

        if options.is_empty() {
            self.report(DiagnosticKind::Source, path, "No options available, keeping default");
            return None;
        }
        Some(options)
    }

    fn compile_validation(&mut self, node: &SchemaNode, path: &AnswerPath) -> Option<Validation> {
        let rule = node.validate.as_ref()?;
        match Validation::compile(rule) {
            Ok(validation) => Some(validation),
            Err(e) => {
                self.report(
                    DiagnosticKind::Validation,
                    path,
                    format!("Validation setup error: {}", e),
                );
                None
            }
        }
    }

    fn confirm(&mut self, value: &AnswerValue) -> Result<bool, PromptError> {
        PostProcessor::new(&self.evaluator).confirm(value, &mut *self.surface)
    }

    fn report(&mut self, kind: DiagnosticKind, path: &AnswerPath, message: impl Into<String>) {
        let diagnostic = Diagnostic::new(kind, path.to_string(), message);
        warn!(kind = kind.as_str(), path = %diagnostic.path, "{}", diagnostic.message);
        self.surface.notify(&diagnostic);
        self.diagnostics.push(diagnostic);
    }
}
