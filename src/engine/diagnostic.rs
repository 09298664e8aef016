//! Non-fatal problems observed during a run.

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// A skip, length or transform expression failed to evaluate.
    Expression,
    /// A directory or dataset source could not be read, or the option list was empty.
    Source,
    /// A registered handler was missing, failed or panicked.
    Handler,
    /// A validation rule could not be compiled.
    Validation,
}

impl DiagnosticKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DiagnosticKind::Expression => "expression",
            DiagnosticKind::Source => "source",
            DiagnosticKind::Handler => "handler",
            DiagnosticKind::Validation => "validation",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// Answer path of the node being visited, e.g. `servers[1].host`.
    pub path: String,
    pub message: String,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.kind.as_str(), self.path, self.message)
    }
}
