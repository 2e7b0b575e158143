//! Text output through the console collaborator

use crate::environment::{Arity, ProcedureRegistry};
use crate::eval::EvalResult;
use crate::machine::Machine;
use crate::value::Value;

pub(super) fn register(registry: &mut ProcedureRegistry) {
    registry.primitive(&["print", "pr"], Arity::new(0, 1, None), print);
    registry.primitive(&["show"], Arity::new(0, 1, None), show);
    registry.primitive(&["type"], Arity::new(0, 1, None), type_);
    registry.primitive(&["cleartext", "ct"], Arity::fixed(0), cleartext);
}

fn join(args: &[Value], render: fn(&Value) -> String, separator: &str) -> String {
    args.iter().map(render).collect::<Vec<_>>().join(separator)
}

/// Print forms separated by spaces; lists lose their outer brackets.
fn print(m: &mut Machine, args: Vec<Value>) -> EvalResult {
    let line = join(&args, Value::print_form, " ");
    m.console.write(&format!("{line}\n"));
    Ok(None)
}

/// Like `PRINT`, but lists keep their brackets.
fn show(m: &mut Machine, args: Vec<Value>) -> EvalResult {
    let line = join(&args, Value::to_string, " ");
    m.console.write(&format!("{line}\n"));
    Ok(None)
}

/// Print forms run together, no newline.
fn type_(m: &mut Machine, args: Vec<Value>) -> EvalResult {
    let text = join(&args, Value::print_form, "");
    m.console.write(&text);
    Ok(None)
}

fn cleartext(m: &mut Machine, _args: Vec<Value>) -> EvalResult {
    m.console.clear();
    Ok(None)
}
