//! Named option handlers.
//!
//! A handler is looked up by `(name, method)` and called with a read-only
//! view of the answers plus the extra keys of its source declaration.

use std::collections::HashMap;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use tracing::debug;

use crate::answers::AnswerValue;
use crate::error::HandlerError;

/// Extra source keys passed through to a handler (everything except the
/// `type`, `handler`/`class` and `method` selectors).
pub type HandlerConfig = serde_json::Map<String, serde_json::Value>;

pub type Handler =
    Arc<dyn Fn(&AnswerValue, &HandlerConfig) -> Result<Vec<String>, HandlerError> + Send + Sync>;

/// Method used when a source declaration names a handler without one.
pub const DEFAULT_METHOD: &str = "call";

#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<(String, String), Handler>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with the handlers shipped in this crate.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        super::register_builtin_handlers(&mut registry);
        registry
    }

    pub fn register<F>(&mut self, name: &str, method: &str, handler: F)
    where
        F: Fn(&AnswerValue, &HandlerConfig) -> Result<Vec<String>, HandlerError>
            + Send
            + Sync
            + 'static,
    {
        debug!(handler = name, method, "Registering option handler");
        self.handlers
            .insert((name.to_string(), method.to_string()), Arc::new(handler));
    }

    pub fn get(&self, name: &str, method: &str) -> Option<&Handler> {
        self.handlers.get(&(name.to_string(), method.to_string()))
    }

    pub fn contains(&self, name: &str, method: &str) -> bool {
        self.get(name, method).is_some()
    }

    /// Call a handler. Missing registrations and panics become errors.
    pub fn invoke(
        &self,
        name: &str,
        method: &str,
        answers: &AnswerValue,
        config: &HandlerConfig,
    ) -> Result<Vec<String>, HandlerError> {
        let handler = self
            .get(name, method)
            .ok_or_else(|| HandlerError::NotRegistered {
                name: name.to_string(),
                method: method.to_string(),
            })?;

        match catch_unwind(AssertUnwindSafe(|| handler(answers, config))) {
            Ok(result) => result,
            Err(payload) => {
                let message = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                Err(HandlerError::Panicked {
                    name: name.to_string(),
                    message,
                })
            }
        }
    }

    /// Registered `(name, method)` pairs, sorted.
    pub fn names(&self) -> Vec<(String, String)> {
        let mut names: Vec<_> = self.handlers.keys().cloned().collect();
        names.sort();
        names
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("handlers", &self.names())
            .finish()
    }
}
