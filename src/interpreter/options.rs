//! Host-configurable limits
//!
//! [`InterpreterOptions`] deserializes from any serde format with every field
//! optional:
//!
//! ```json
//! {"loop_cycles": 5, "max_iterations": 100, "timeout_ms": 2000}
//! ```

use super::constants::{
    DEFAULT_LOOP_CYCLES, DEFAULT_MAX_CALL_DEPTH, DEFAULT_MAX_ITERATIONS, DEFAULT_MAX_STEPS,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterpreterOptions {
    /// Number of times the scheduler runs `loop()`
    pub loop_cycles: u32,
    /// Per-loop iteration cap; reaching it is terminal
    pub max_iterations: u32,
    pub max_call_depth: usize,
    /// Statement budget for the whole run
    pub max_steps: u64,
    /// Wall-clock budget; `None` disables the check
    pub timeout_ms: Option<u64>,
    /// Emit `VAR_SET` for declarations and stores
    pub emit_var_set: bool,
}

impl Default for InterpreterOptions {
    fn default() -> Self {
        InterpreterOptions {
            loop_cycles: DEFAULT_LOOP_CYCLES,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            max_steps: DEFAULT_MAX_STEPS,
            timeout_ms: None,
            emit_var_set: true,
        }
    }
}

impl InterpreterOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn with_loop_cycles(mut self, cycles: u32) -> Self {
        self.loop_cycles = cycles;
        self
    }

    pub fn with_max_iterations(mut self, limit: u32) -> Self {
        self.max_iterations = limit;
        self
    }

    pub fn with_max_call_depth(mut self, depth: usize) -> Self {
        self.max_call_depth = depth;
        self
    }

    pub fn with_max_steps(mut self, steps: u64) -> Self {
        self.max_steps = steps;
        self
    }

    pub fn with_timeout_ms(mut self, millis: u64) -> Self {
        self.timeout_ms = Some(millis);
        self
    }

    pub fn with_var_set(mut self, enabled: bool) -> Self {
        self.emit_var_set = enabled;
        self
    }
}
