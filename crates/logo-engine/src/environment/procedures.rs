//! Procedure registry: case-insensitive name to procedure

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::error::Result;
use crate::eval::{Deferred, LocalBoxFuture, UserProcedure};
use crate::machine::Machine;
use crate::reader::TokenStream;
use crate::value::Value;

/// Primitive taking evaluated inputs and finishing without suspending.
pub type PrimitiveFn = fn(&mut Machine, Vec<Value>) -> Result<Option<Value>>;

/// Primitive taking evaluated inputs that may suspend (turtle motion,
/// running instruction lists).
pub type SuspendingFn =
    for<'a> fn(&'a mut Machine, Vec<Value>) -> LocalBoxFuture<'a, Result<Option<Value>>>;

/// Primitive receiving its inputs unevaluated and deciding when (and
/// whether) to evaluate them.
pub type LazyFn =
    for<'a> fn(&'a mut Machine, &'a [Deferred]) -> LocalBoxFuture<'a, Result<Option<Value>>>;

/// Special form: consumes raw tokens at parse time.
pub type SpecialFn = fn(&mut Machine, &mut TokenStream) -> Result<()>;

/// Input count bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arity {
    /// Fewest inputs accepted in a parenthesized call
    pub minimum: usize,

    /// Inputs consumed by a call without parentheses
    pub default: usize,

    /// Most inputs accepted; `None` is unbounded
    pub maximum: Option<usize>,
}

impl Arity {
    /// Exactly `n` inputs.
    pub const fn fixed(n: usize) -> Self {
        Self {
            minimum: n,
            default: n,
            maximum: Some(n),
        }
    }

    /// Explicit bounds.
    pub const fn new(minimum: usize, default: usize, maximum: Option<usize>) -> Self {
        Self {
            minimum,
            default,
            maximum,
        }
    }

    /// Whether a parenthesized call may pass `n` inputs.
    pub fn accepts(&self, n: usize) -> bool {
        n >= self.minimum && self.maximum.map_or(true, |max| n <= max)
    }
}

/// How a procedure's inputs reach it.
#[derive(Clone)]
pub enum Behavior {
    /// Inputs evaluated left to right before the call
    Ordinary(Implementation),

    /// Receives the token stream at parse time
    Special(SpecialFn),

    /// Receives unevaluated inputs
    NonEvaluating(LazyFn),
}

/// The body of an ordinary procedure.
#[derive(Clone)]
pub enum Implementation {
    /// Built-in, synchronous
    Primitive(PrimitiveFn),

    /// Built-in, may suspend
    Suspending(SuspendingFn),

    /// Defined by a script
    User(Rc<UserProcedure>),
}

/// A named, arity-checked callable.
#[derive(Clone)]
pub struct Procedure {
    /// Input bounds
    pub arity: Arity,

    /// Calling convention and body
    pub behavior: Behavior,

    /// Built in; survives bulk clearing and can't be redefined
    pub primitive: bool,
}

impl Procedure {
    /// The user definition, when this procedure has one.
    pub fn user(&self) -> Option<&Rc<UserProcedure>> {
        match &self.behavior {
            Behavior::Ordinary(Implementation::User(user)) => Some(user),
            _ => None,
        }
    }
}

impl fmt::Debug for Procedure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &self.behavior {
            Behavior::Ordinary(Implementation::User(_)) => "user",
            Behavior::Ordinary(_) => "ordinary",
            Behavior::Special(_) => "special",
            Behavior::NonEvaluating(_) => "non-evaluating",
        };
        f.debug_struct("Procedure")
            .field("arity", &self.arity)
            .field("kind", &kind)
            .field("primitive", &self.primitive)
            .finish()
    }
}

/// All procedures, keyed by lowercased name in definition order.
#[derive(Debug, Clone, Default)]
pub struct ProcedureRegistry {
    procedures: IndexMap<String, Rc<Procedure>>,
}

impl ProcedureRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in primitives.
    pub fn with_prelude() -> Self {
        let mut registry = Self::new();
        registry.load_prelude();
        registry
    }

    /// Look up a procedure.
    pub fn get(&self, name: &str) -> Option<Rc<Procedure>> {
        self.procedures.get(&name.to_lowercase()).cloned()
    }

    /// Whether `name` is defined.
    pub fn contains(&self, name: &str) -> bool {
        self.procedures.contains_key(&name.to_lowercase())
    }

    /// Whether `name` is a built-in primitive.
    pub fn is_primitive(&self, name: &str) -> bool {
        self.get(name).is_some_and(|p| p.primitive)
    }

    /// Install or replace a procedure.
    pub fn insert(&mut self, name: &str, procedure: Rc<Procedure>) {
        self.procedures.insert(name.to_lowercase(), procedure);
    }

    /// Register a primitive under each of `names`.
    pub fn define_primitive(&mut self, names: &[&str], arity: Arity, behavior: Behavior) {
        let procedure = Rc::new(Procedure {
            arity,
            behavior,
            primitive: true,
        });
        for name in names {
            self.insert(name, Rc::clone(&procedure));
        }
    }

    /// Make `new_name` refer to the same procedure as `old_name`.
    ///
    /// Returns false (and changes nothing) when `old_name` is undefined.
    pub fn alias(&mut self, new_name: &str, old_name: &str) -> bool {
        match self.get(old_name) {
            Some(procedure) => {
                self.insert(new_name, procedure);
                true
            }
            None => false,
        }
    }

    /// Remove every non-primitive procedure.
    pub fn clear_user(&mut self) {
        self.procedures.retain(|_, p| p.primitive);
    }

    /// Iterate in definition order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Rc<Procedure>)> {
        self.procedures.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of registered names.
    pub fn len(&self) -> usize {
        self.procedures.len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.procedures.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_: &mut Machine, _: Vec<Value>) -> Result<Option<Value>> {
        Ok(None)
    }

    #[test]
    fn test_arity_accepts() {
        let arity = Arity::new(1, 2, None);
        assert!(!arity.accepts(0));
        assert!(arity.accepts(7));
        assert!(Arity::fixed(2).accepts(2));
        assert!(!Arity::fixed(2).accepts(3));
    }

    #[test]
    fn test_names_are_case_insensitive_and_aliases_share() {
        let mut registry = ProcedureRegistry::new();
        registry.define_primitive(
            &["forward", "fd"],
            Arity::fixed(1),
            Behavior::Ordinary(Implementation::Primitive(noop)),
        );
        let fd = registry.get("FD").unwrap();
        let forward = registry.get("Forward").unwrap();
        assert!(Rc::ptr_eq(&fd, &forward));
        assert!(registry.is_primitive("fd"));
    }

    #[test]
    fn test_alias_of_missing_name_is_ignored() {
        let mut registry = ProcedureRegistry::new();
        assert!(!registry.alias("avance", "forward"));
        assert!(registry.is_empty());
    }
}
