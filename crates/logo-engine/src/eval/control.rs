//! Control flow mechanism for OUTPUT/STOP and BYE

use crate::Value;

/// Control flow signal for non-local exits.
///
/// These travel as `Err(EvalError::ControlFlow(...))` so that every
/// intervening frame unwinds through its normal cleanup.
#[derive(Debug, Clone)]
pub enum ControlFlow {
    /// Leave the innermost user procedure, with a value for `OUTPUT` or
    /// without one for `STOP`. Caught at that procedure's boundary.
    Return {
        /// Value to return from the procedure
        value: Option<Value>,
    },

    /// Terminate the whole run. Caught only at the top level.
    Bye,
}

impl ControlFlow {
    /// Create a return with a value.
    pub fn return_value(value: Value) -> Self {
        ControlFlow::Return { value: Some(value) }
    }

    /// Create a return without a value.
    pub fn stop() -> Self {
        ControlFlow::Return { value: None }
    }
}

impl PartialEq for ControlFlow {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ControlFlow::Return { value: v1 }, ControlFlow::Return { value: v2 }) => v1 == v2,
            (ControlFlow::Bye, ControlFlow::Bye) => true,
            _ => false,
        }
    }
}
