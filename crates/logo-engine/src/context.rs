//! Evaluation context configuration

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Configuration and state for evaluation.
///
/// Owned by the interpreter and consulted by the executor at every
/// statement boundary.
#[derive(Debug, Clone)]
pub struct EvalContext {
    /// Maximum nesting of user-defined procedure calls
    pub max_call_depth: usize,

    /// Forced-termination flag - set to true to end the running script
    pub interrupt: Arc<AtomicBool>,

    /// Yield to the host scheduler between statements
    pub yield_between_statements: bool,

    /// Fixed PRNG seed; seeded from the clock when absent
    pub seed: Option<u32>,
}

impl Default for EvalContext {
    fn default() -> Self {
        Self {
            max_call_depth: 400,
            interrupt: Arc::new(AtomicBool::new(false)),
            yield_between_statements: true,
            seed: None,
        }
    }
}

impl EvalContext {
    /// Create a new context with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context with a custom call depth limit.
    pub fn with_max_call_depth(max_depth: usize) -> Self {
        Self {
            max_call_depth: max_depth,
            ..Default::default()
        }
    }

    /// Fix the PRNG seed (reproducible `RANDOM`).
    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Check if termination has been requested.
    pub fn is_interrupted(&self) -> bool {
        self.interrupt.load(Ordering::Relaxed)
    }

    /// Request termination of the running script.
    pub fn interrupt(&self) {
        self.interrupt.store(true, Ordering::Relaxed);
    }

    /// Reset the interrupt flag.
    pub fn reset_interrupt(&self) {
        self.interrupt.store(false, Ordering::Relaxed);
    }

    /// Consume a pending termination request.
    pub fn take_interrupt(&self) -> bool {
        self.interrupt.swap(false, Ordering::Relaxed)
    }
}
