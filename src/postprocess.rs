//! Post-capture processing: transform, convert, confirm.

use tracing::debug;

use crate::answers::AnswerValue;
use crate::error::PromptError;
use crate::expression::ConditionEvaluator;
use crate::prompt::PromptSurface;
use crate::schema::{ConvertRule, SchemaNode};

pub struct PostProcessor<'a> {
    evaluator: &'a ConditionEvaluator,
}

impl<'a> PostProcessor<'a> {
    pub fn new(evaluator: &'a ConditionEvaluator) -> Self {
        Self { evaluator }
    }

    /// Apply the node's transform, then its convert rule.
    ///
    /// Neither step can fail: a broken transform or an unconvertible value
    /// leaves the value as it was.
    pub fn process(&self, node: &SchemaNode, raw: AnswerValue, answers: &AnswerValue) -> AnswerValue {
        let transformed = match &node.transform {
            Some(expression) => self.transform(expression, raw, answers),
            None => raw,
        };
        match node.convert {
            Some(rule) => convert(rule, transformed),
            None => transformed,
        }
    }

    pub fn transform(&self, expression: &str, value: AnswerValue, answers: &AnswerValue) -> AnswerValue {
        match self.evaluator.apply_transform(expression, &value, answers) {
            Ok(result) => result,
            Err(e) => {
                debug!(expression, error = %e, "Transform failed, keeping captured value");
                value
            }
        }
    }

    /// Ask the operator to accept the processed value.
    pub fn confirm(
        &self,
        value: &AnswerValue,
        surface: &mut dyn PromptSurface,
    ) -> Result<bool, PromptError> {
        surface.ask_yes_no(&format!("Confirm '{}'?", value), Some(true))
    }
}

/// Coerce a value to the requested number type where possible.
pub fn convert(rule: ConvertRule, value: AnswerValue) -> AnswerValue {
    match (rule, &value) {
        (ConvertRule::Int, AnswerValue::Text(s)) => match s.trim().parse::<i64>() {
            Ok(i) => AnswerValue::Integer(i),
            Err(_) => match s.trim().parse::<f64>() {
                Ok(f) if f.is_finite() => AnswerValue::Integer(f.trunc() as i64),
                _ => value,
            },
        },
        (ConvertRule::Int, AnswerValue::Float(f)) if f.is_finite() => {
            AnswerValue::Integer(f.trunc() as i64)
        }
        (ConvertRule::Float, AnswerValue::Text(s)) => match s.trim().parse::<f64>() {
            Ok(f) if f.is_finite() => AnswerValue::Float(f),
            _ => value,
        },
        (ConvertRule::Float, AnswerValue::Integer(i)) => AnswerValue::Float(*i as f64),
        _ => value,
    }
}
