//! Condition evaluator
//!
//! Sandboxed JEXL evaluation for the four expression slots of a schema node:
//! `skip_if`, `length`, `transform` and `validate`. Expressions never see host
//! code, only a JSON projection of the answers.
//!
//! Contexts:
//! - `skip_if` and `length` evaluate with the answer snapshot as the root
//!   object, so `a == false` or `items|count` read top-level fields directly.
//! - `transform` and `validate` evaluate against
//!   `{ "value": <captured value>, "answers": <snapshot> }`.
//!
//! Failure policy is the caller's: every method here returns the error.
//!
//! Transforms: `lower`, `upper`, `trim`, `split`, `not`, `contains`,
//! `startsWith`, `endsWith`, `matches`, `length`, `count`, `last`.

use crate::answers::AnswerValue;
use crate::error::ExpressionError;
use crate::schema::{ValidateRule, MAX_ARRAY_LENGTH};
use regex::Regex;
use serde_json::{json, Value};

/// JEXL evaluator with the standard transforms registered.
pub struct ConditionEvaluator {
    evaluator: jexl_eval::Evaluator<'static>,
}

impl ConditionEvaluator {
    pub fn new() -> Self {
        let evaluator = jexl_eval::Evaluator::new()
            .with_transform("lower", |args: &[Value]| {
                let s = args.first().and_then(|v| v.as_str()).unwrap_or("");
                Ok(json!(s.to_lowercase()))
            })
            .with_transform("upper", |args: &[Value]| {
                let s = args.first().and_then(|v| v.as_str()).unwrap_or("");
                Ok(json!(s.to_uppercase()))
            })
            .with_transform("trim", |args: &[Value]| {
                let s = args.first().and_then(|v| v.as_str()).unwrap_or("");
                Ok(json!(s.trim()))
            })
            .with_transform("split", |args: &[Value]| {
                let s = args.first().and_then(|v| v.as_str()).unwrap_or("");
                let delimiter = args.get(1).and_then(|v| v.as_str()).unwrap_or(",");
                let parts: Vec<&str> = s.split(delimiter).map(str::trim).collect();
                Ok(json!(parts))
            })
            .with_transform("not", |args: &[Value]| {
                let val = args.first().cloned().unwrap_or(Value::Null);
                Ok(json!(!truthy(&val)))
            })
            .with_transform("contains", |args: &[Value]| {
                let found = match (args.first(), args.get(1)) {
                    (Some(Value::String(subject)), Some(Value::String(search))) => {
                        subject.contains(search.as_str())
                    }
                    (Some(Value::Array(items)), Some(needle)) => items.contains(needle),
                    _ => false,
                };
                Ok(json!(found))
            })
            .with_transform("startsWith", |args: &[Value]| {
                let subject = args.first().and_then(|v| v.as_str()).unwrap_or("");
                let prefix = args.get(1).and_then(|v| v.as_str()).unwrap_or("");
                Ok(json!(subject.starts_with(prefix)))
            })
            .with_transform("endsWith", |args: &[Value]| {
                let subject = args.first().and_then(|v| v.as_str()).unwrap_or("");
                let suffix = args.get(1).and_then(|v| v.as_str()).unwrap_or("");
                Ok(json!(subject.ends_with(suffix)))
            })
            .with_transform("matches", |args: &[Value]| {
                let subject = args.first().and_then(|v| v.as_str()).unwrap_or("");
                let pattern = args
                    .get(1)
                    .and_then(|v| v.as_str())
                    .ok_or_else(|| anyhow::anyhow!("matches requires a pattern argument"))?;
                let regex = Regex::new(pattern)
                    .map_err(|e| anyhow::anyhow!("invalid pattern {}: {}", pattern, e))?;
                Ok(json!(regex.is_match(subject)))
            })
            .with_transform("length", |args: &[Value]| {
                Ok(json!(item_count(args.first())))
            })
            .with_transform("count", |args: &[Value]| {
                Ok(json!(item_count(args.first())))
            })
            .with_transform("last", |args: &[Value]| {
                let last = match args.first() {
                    Some(Value::Array(items)) => items.last().cloned(),
                    _ => None,
                };
                Ok(last.unwrap_or(Value::Null))
            });

        Self { evaluator }
    }

    /// Skip predicate: truthy means the field is not asked.
    pub fn should_skip(&self, expression: &str, answers: &AnswerValue) -> Result<bool, ExpressionError> {
        let result = self.eval(expression, &answers.to_json())?;
        Ok(truthy(&result))
    }

    /// Array length: a non-negative number, or an array whose items are counted.
    pub fn resolve_length(
        &self,
        expression: &str,
        answers: &AnswerValue,
    ) -> Result<usize, ExpressionError> {
        let result = self.eval(expression, &answers.to_json())?;
        let count = match &result {
            Value::Number(n) => match n.as_f64() {
                Some(x) if x.is_finite() && x >= 0.0 && x <= MAX_ARRAY_LENGTH as f64 => {
                    Some(x.floor() as usize)
                }
                _ => None,
            },
            Value::Array(items) => Some(items.len()),
            Value::String(s) => s.trim().parse::<usize>().ok(),
            _ => None,
        };
        match count {
            Some(count) if count <= MAX_ARRAY_LENGTH => Ok(count),
            _ => Err(ExpressionError::UnexpectedResult {
                slot: "length",
                result,
            }),
        }
    }

    /// Transform a captured value.
    pub fn apply_transform(
        &self,
        expression: &str,
        value: &AnswerValue,
        answers: &AnswerValue,
    ) -> Result<AnswerValue, ExpressionError> {
        let context = value_context(value, answers);
        self.eval(expression, &context).map(AnswerValue::from)
    }

    /// Validation predicate over a captured value.
    pub fn validate(
        &self,
        expression: &str,
        value: &AnswerValue,
        answers: &AnswerValue,
    ) -> Result<bool, ExpressionError> {
        let context = value_context(value, answers);
        let result = self.eval(expression, &context)?;
        Ok(truthy(&result))
    }

    fn eval(&self, expression: &str, context: &Value) -> Result<Value, ExpressionError> {
        self.evaluator
            .eval_in_context(expression, context)
            .map_err(|e| ExpressionError::EvalFailed(e.to_string()))
    }
}

impl Default for ConditionEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

/// Compiled form of a node's `validate` rule.
#[derive(Debug, Clone)]
pub enum Validation {
    Pattern(Regex),
    Expression(String),
}

impl Validation {
    pub fn compile(rule: &ValidateRule) -> Result<Self, ExpressionError> {
        match rule {
            ValidateRule::Pattern(pattern) => Regex::new(pattern)
                .map(Validation::Pattern)
                .map_err(|e| ExpressionError::InvalidRegex {
                    pattern: pattern.clone(),
                    message: e.to_string(),
                }),
            ValidateRule::Expression(expression) => {
                Ok(Validation::Expression(expression.clone()))
            }
        }
    }

    /// Check operator input. Expression errors count as valid.
    pub fn check(
        &self,
        input: &str,
        evaluator: &ConditionEvaluator,
        answers: &AnswerValue,
    ) -> Result<(), String> {
        match self {
            Validation::Pattern(regex) if regex.is_match(input) => Ok(()),
            Validation::Pattern(_) => Err("Invalid format".to_string()),
            Validation::Expression(expression) => {
                let value = AnswerValue::Text(input.to_string());
                match evaluator.validate(expression, &value, answers) {
                    Ok(false) => Err("Invalid input".to_string()),
                    Ok(true) | Err(_) => Ok(()),
                }
            }
        }
    }
}

fn value_context(value: &AnswerValue, answers: &AnswerValue) -> Value {
    json!({
        "value": value.to_json(),
        "answers": answers.to_json(),
    })
}

fn item_count(value: Option<&Value>) -> usize {
    match value {
        Some(Value::String(s)) => s.chars().count(),
        Some(Value::Array(a)) => a.len(),
        Some(Value::Object(o)) => o.len(),
        _ => 0,
    }
}

/// JavaScript-like truthiness.
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Null => false,
        Value::Number(n) => n.as_f64().unwrap_or(0.0) != 0.0,
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
