//! Built-in procedures

mod control;
mod data;
mod graphics;
mod io;
mod math;
mod workspace;

use super::{Arity, Behavior, Implementation, LazyFn, PrimitiveFn, ProcedureRegistry, SpecialFn, SuspendingFn};

impl ProcedureRegistry {
    /// Load the built-in procedures into this registry.
    pub fn load_prelude(&mut self) {
        control::register(self);
        workspace::register(self);
        data::register(self);
        io::register(self);
        math::register(self);
        graphics::register(self);
    }

    fn primitive(&mut self, names: &[&str], arity: Arity, f: PrimitiveFn) {
        self.define_primitive(names, arity, Behavior::Ordinary(Implementation::Primitive(f)));
    }

    fn suspending(&mut self, names: &[&str], arity: Arity, f: SuspendingFn) {
        self.define_primitive(names, arity, Behavior::Ordinary(Implementation::Suspending(f)));
    }

    fn lazy(&mut self, names: &[&str], arity: Arity, f: LazyFn) {
        self.define_primitive(names, arity, Behavior::NonEvaluating(f));
    }

    fn special(&mut self, names: &[&str], f: SpecialFn) {
        self.define_primitive(names, Arity::fixed(0), Behavior::Special(f));
    }
}
