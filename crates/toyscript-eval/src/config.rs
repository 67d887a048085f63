use serde::{Deserialize, Serialize};

/// Default limit on nested script function calls.
pub const DEFAULT_MAX_CALL_DEPTH: usize = 2000;

/// Evaluator settings. Missing JSON fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalConfig {
    /// Calls nested deeper than this fail with a "stack overflow" runtime error.
    pub max_call_depth: usize,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
        }
    }
}
