//! Runtime environment: variable scopes and the procedure registry

mod prelude;
mod procedures;

pub use procedures::{
    Arity, Behavior, Implementation, LazyFn, PrimitiveFn, Procedure, ProcedureRegistry, SpecialFn,
    SuspendingFn,
};

use crate::error::EvalError;
use crate::value::Value;

/// A single variable binding.
///
/// The value is absent for names declared with `LOCAL` but not yet
/// assigned.
#[derive(Debug, Clone)]
pub struct Binding {
    /// Lowercased name
    pub name: String,

    /// The bound value
    pub value: Option<Value>,
}

/// The stack of variable scopes.
///
/// Uses a flat binding list with frame boundaries: frame 0 is the global
/// scope and every user procedure call pushes one frame. Names are
/// case-insensitive.
///
/// # Example
///
/// ```
/// use logo_engine::{Environment, Value};
///
/// let mut env = Environment::new();
/// env.set("x", Value::number(1.0));
///
/// env.push_frame();
/// env.define("x", Some(Value::number(10.0)));
/// assert_eq!(env.get("X"), Some(&Value::number(10.0)));
///
/// env.pop_frame();
/// assert_eq!(env.get("x"), Some(&Value::number(1.0)));
/// ```
#[derive(Debug, Clone)]
pub struct Environment {
    /// All bindings in a flat array (most recent at end)
    bindings: Vec<Binding>,

    /// Frame boundaries (indices into bindings)
    frames: Vec<usize>,

    /// Current user-procedure call depth
    call_depth: usize,

    /// Maximum allowed call depth
    max_call_depth: usize,
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

fn key(name: &str) -> String {
    name.to_lowercase()
}

impl Environment {
    /// Create an environment holding only an empty global scope.
    pub fn new() -> Self {
        Self::with_max_call_depth(400)
    }

    /// Create an environment with a custom call depth limit.
    pub fn with_max_call_depth(max_depth: usize) -> Self {
        Self {
            bindings: Vec::new(),
            frames: vec![0],
            call_depth: 0,
            max_call_depth: max_depth,
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Frame Management (Scope Entry/Exit)
    // ═══════════════════════════════════════════════════════════════════

    /// Enter a new scope (push a frame).
    pub fn push_frame(&mut self) {
        self.frames.push(self.bindings.len());
    }

    /// Exit the current scope (pop a frame).
    ///
    /// Never pops the global frame.
    pub fn pop_frame(&mut self) {
        if self.frames.len() > 1 {
            if let Some(boundary) = self.frames.pop() {
                self.bindings.truncate(boundary);
            }
        }
    }

    /// Number of scopes, including the global one.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Check if we're at global scope.
    pub fn is_global_scope(&self) -> bool {
        self.frames.len() == 1
    }

    /// Drop every scope above the global one and reset call depth.
    pub fn unwind_to_global(&mut self) {
        self.frames.truncate(1);
        self.bindings.truncate(self.global_end());
        self.call_depth = 0;
    }

    fn global_end(&self) -> usize {
        self.frames.get(1).copied().unwrap_or(self.bindings.len())
    }

    // ═══════════════════════════════════════════════════════════════════
    // Call Depth Tracking (Stack Overflow Protection)
    // ═══════════════════════════════════════════════════════════════════

    /// Enter a procedure call. Returns error if max depth exceeded.
    pub fn enter_call(&mut self) -> Result<(), EvalError> {
        if self.call_depth >= self.max_call_depth {
            return Err(EvalError::StackOverflow {
                depth: self.call_depth,
                max: self.max_call_depth,
            });
        }
        self.call_depth += 1;
        Ok(())
    }

    /// Exit a procedure call.
    pub fn exit_call(&mut self) {
        self.call_depth = self.call_depth.saturating_sub(1);
    }

    /// Get current call depth.
    pub fn call_depth(&self) -> usize {
        self.call_depth
    }

    // ═══════════════════════════════════════════════════════════════════
    // Binding Definition
    // ═══════════════════════════════════════════════════════════════════

    /// Bind `name` in the current scope, shadowing outer bindings.
    pub fn define(&mut self, name: &str, value: Option<Value>) {
        let name = key(name);
        let start = self.frame_start();
        if let Some(binding) = self.bindings[start..].iter_mut().find(|b| b.name == name) {
            binding.value = value;
            return;
        }
        self.bindings.push(Binding { name, value });
    }

    /// Declare `name` in the current scope without a value, unless the
    /// current scope already has it.
    pub fn declare_local(&mut self, name: &str) {
        if !self.contains_in_current_scope(name) {
            self.define(name, None);
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Binding Lookup
    // ═══════════════════════════════════════════════════════════════════

    fn position(&self, name: &str) -> Option<usize> {
        let name = key(name);
        self.bindings.iter().rposition(|b| b.name == name)
    }

    fn frame_start(&self) -> usize {
        *self.frames.last().unwrap_or(&0)
    }

    /// Look up a variable, innermost scope first.
    ///
    /// Returns `None` when the name is unbound or declared without a value.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.position(name)
            .and_then(|i| self.bindings[i].value.as_ref())
    }

    /// Look up the full binding.
    pub fn get_binding(&self, name: &str) -> Option<&Binding> {
        self.position(name).map(|i| &self.bindings[i])
    }

    /// Check if a binding exists in any scope.
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Check if a binding exists in the current (innermost) scope only.
    pub fn contains_in_current_scope(&self, name: &str) -> bool {
        let name = key(name);
        self.bindings[self.frame_start()..]
            .iter()
            .any(|b| b.name == name)
    }

    // ═══════════════════════════════════════════════════════════════════
    // Assignment (Mutation)
    // ═══════════════════════════════════════════════════════════════════

    /// Assign a deep copy of `value`.
    ///
    /// Updates the innermost existing binding; when the name is bound
    /// nowhere a global binding is created.
    pub fn set(&mut self, name: &str, value: Value) {
        let value = value.deep_copy();
        match self.position(name) {
            Some(i) => self.bindings[i].value = Some(value),
            None => {
                let at = self.global_end();
                self.bindings.insert(
                    at,
                    Binding {
                        name: key(name),
                        value: Some(value),
                    },
                );
                for boundary in self.frames.iter_mut().skip(1) {
                    *boundary += 1;
                }
            }
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Iteration and Inspection
    // ═══════════════════════════════════════════════════════════════════

    /// Iterate over all bindings, outermost first.
    pub fn iter(&self) -> impl Iterator<Item = &Binding> {
        self.bindings.iter()
    }

    /// Names bound in the global scope.
    pub fn global_names(&self) -> Vec<&str> {
        self.bindings[..self.global_end()]
            .iter()
            .map(|b| b.name.as_str())
            .collect()
    }

    /// Get the number of bindings.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Check if the environment is empty.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        let mut env = Environment::new();
        env.set("Size", Value::number(5.0));
        assert_eq!(env.get("SIZE"), Some(&Value::number(5.0)));
        assert!(env.contains("size"));
    }

    #[test]
    fn test_set_updates_owning_scope() {
        let mut env = Environment::new();
        env.set("x", Value::number(1.0));
        env.push_frame();
        env.define("y", Some(Value::number(2.0)));
        env.set("x", Value::number(3.0));
        env.set("y", Value::number(4.0));
        env.pop_frame();

        assert_eq!(env.get("x"), Some(&Value::number(3.0)));
        assert_eq!(env.get("y"), None);
    }

    #[test]
    fn test_set_unbound_creates_global_below_frames() {
        let mut env = Environment::new();
        env.push_frame();
        env.define("local", Some(Value::word("l")));
        env.push_frame();
        env.set("fresh", Value::word("g"));
        assert_eq!(env.depth(), 3);

        env.pop_frame();
        assert_eq!(env.get("local"), Some(&Value::word("l")));
        env.pop_frame();
        assert_eq!(env.get("fresh"), Some(&Value::word("g")));
        assert_eq!(env.get("local"), None);
        assert_eq!(env.global_names(), vec!["fresh"]);
    }

    #[test]
    fn test_declared_local_is_unset_but_assignable() {
        let mut env = Environment::new();
        env.set("v", Value::number(1.0));
        env.push_frame();
        env.declare_local("v");
        assert_eq!(env.get("v"), None);
        assert!(env.contains("v"));

        env.set("v", Value::number(2.0));
        assert_eq!(env.get("v"), Some(&Value::number(2.0)));
        env.pop_frame();
        assert_eq!(env.get("v"), Some(&Value::number(1.0)));
    }

    #[test]
    fn test_set_deep_copies_lists() {
        let mut env = Environment::new();
        let list = Value::list(vec![Value::word("a")]);
        env.set("l", list.clone());
        let stored = env.get("l").cloned().unwrap();
        assert_eq!(stored, list);
        assert!(!stored.same_ref(&list));
    }

    #[test]
    fn test_global_frame_is_never_popped() {
        let mut env = Environment::new();
        env.pop_frame();
        assert_eq!(env.depth(), 1);
        assert!(env.is_global_scope());
    }

    #[test]
    fn test_call_depth_limit() {
        let mut env = Environment::with_max_call_depth(2);
        assert!(env.enter_call().is_ok());
        assert!(env.enter_call().is_ok());
        assert!(matches!(
            env.enter_call(),
            Err(EvalError::StackOverflow { depth: 2, max: 2 })
        ));
        env.exit_call();
        assert_eq!(env.call_depth(), 1);
    }

    #[test]
    fn test_unwind_to_global_keeps_globals() {
        let mut env = Environment::new();
        env.set("g", Value::number(1.0));
        env.push_frame();
        env.push_frame();
        env.define("x", Some(Value::number(2.0)));
        env.enter_call().unwrap();
        env.unwind_to_global();
        assert_eq!(env.depth(), 1);
        assert_eq!(env.call_depth(), 0);
        assert_eq!(env.len(), 1);
    }
}
