//! Static schema check: everything that can be verified without asking.

use serde_json::json;

use super::{Diagnostic, DiagnosticKind};
use crate::answers::{AnswerStore, AnswerValue};
use crate::expression::{ConditionEvaluator, Validation};
use crate::schema::{LengthSpec, Schema, SchemaNode, SourceSpec};
use crate::source::{HandlerRegistry, DEFAULT_METHOD};

/// Compile every regex, trial-evaluate every expression against the skeleton
/// and verify handler registrations. Expressions that only fail because the
/// skeleton lacks answers are reported too, so results are advisory.
pub fn check_schema(schema: &Schema, registry: &HandlerRegistry) -> Vec<Diagnostic> {
    let evaluator = ConditionEvaluator::new();
    let skeleton = AnswerStore::skeleton(schema).into_value();
    let mut problems = Vec::new();

    schema.for_each_node(&mut |path, node| {
        check_node(path, node, &evaluator, &skeleton, registry, &mut problems);
    });
    problems
}

fn check_node(
    path: &str,
    node: &SchemaNode,
    evaluator: &ConditionEvaluator,
    skeleton: &AnswerValue,
    registry: &HandlerRegistry,
    problems: &mut Vec<Diagnostic>,
) {
    let mut report = |kind, message: String| problems.push(Diagnostic::new(kind, path, message));

    if let Some(expression) = &node.skip_if {
        if let Err(e) = evaluator.should_skip(expression, skeleton) {
            report(DiagnosticKind::Expression, format!("skip_if '{}': {}", expression, e));
        }
    }
    if let LengthSpec::Computed(expression) = &node.length {
        if let Err(e) = evaluator.resolve_length(expression, skeleton) {
            report(DiagnosticKind::Expression, format!("length '{}': {}", expression, e));
        }
    }
    if let Some(expression) = &node.transform {
        let sample = AnswerValue::from(json!(""));
        if let Err(e) = evaluator.apply_transform(expression, &sample, skeleton) {
            report(DiagnosticKind::Expression, format!("transform '{}': {}", expression, e));
        }
    }
    if let Some(rule) = &node.validate {
        if let Err(e) = Validation::compile(rule) {
            report(DiagnosticKind::Validation, format!("Validation setup error: {}", e));
        }
    }

    match &node.source {
        Some(SourceSpec::Handler { name: None, .. }) => {
            report(DiagnosticKind::Handler, "handler source without a handler name".to_string())
        }
        Some(SourceSpec::Handler {
            name: Some(name),
            method,
            ..
        }) => {
            let method = method.as_deref().unwrap_or(DEFAULT_METHOD);
            if !registry.contains(name, method) {
                report(
                    DiagnosticKind::Handler,
                    format!("handler '{}' with method '{}' is not registered", name, method),
                );
            }
        }
        Some(SourceSpec::Directory { path: None } | SourceSpec::Dataset { path: None }) => {
            report(DiagnosticKind::Source, "source is missing its path".to_string())
        }
        Some(SourceSpec::Unknown(kind)) => {
            report(DiagnosticKind::Source, format!("unknown source type '{}'", kind))
        }
        _ => {}
    }
}
