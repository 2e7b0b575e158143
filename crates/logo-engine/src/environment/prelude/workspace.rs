//! Workspace management: procedure definition, variables, bulk erase

use crate::environment::{Arity, ProcedureRegistry};
use crate::error::ErrorCode;
use crate::eval::define::{prim_def, prim_define, special_to};
use crate::eval::EvalResult;
use crate::machine::Machine;
use crate::value::Value;

pub(super) fn register(registry: &mut ProcedureRegistry) {
    registry.special(&["to"], special_to);
    registry.primitive(&["def"], Arity::fixed(1), prim_def);
    registry.primitive(&["define"], Arity::fixed(2), prim_define);
    registry.primitive(&["make"], Arity::fixed(2), make);
    registry.primitive(&["local"], Arity::new(1, 1, None), local);
    registry.primitive(&["thing"], Arity::fixed(1), thing);
    registry.primitive(&["name?", "namep"], Arity::fixed(1), is_name);
    registry.primitive(&["procedure?", "procedurep"], Arity::fixed(1), is_procedure);
    registry.primitive(&["primitive?", "primitivep"], Arity::fixed(1), is_primitive);
    registry.primitive(&["erps"], Arity::fixed(0), erase_procedures);
}

fn make(m: &mut Machine, args: Vec<Value>) -> EvalResult {
    let name = m.text(&args[0])?;
    m.env.set(&name, args[1].clone());
    Ok(None)
}

/// `LOCAL "name`, `LOCAL [a b]` or `(LOCAL "a "b)`.
fn local(m: &mut Machine, args: Vec<Value>) -> EvalResult {
    for arg in &args {
        match arg {
            Value::List(names) => {
                for name in names.iter() {
                    let name = m.text(name)?;
                    m.env.declare_local(&name);
                }
            }
            other => {
                let name = m.text(other)?;
                m.env.declare_local(&name);
            }
        }
    }
    Ok(None)
}

fn thing(m: &mut Machine, args: Vec<Value>) -> EvalResult {
    let name = m.text(&args[0])?;
    match m.env.get(&name) {
        Some(value) => Ok(Some(value.clone())),
        None => Err(m.error(
            ErrorCode::BadVar,
            "Don't know about variable {name:U}",
            &[("name", name.as_str())],
        )),
    }
}

fn is_name(m: &mut Machine, args: Vec<Value>) -> EvalResult {
    let name = m.text(&args[0])?;
    Ok(Some(Value::boolean(m.env.get(&name).is_some())))
}

fn is_procedure(m: &mut Machine, args: Vec<Value>) -> EvalResult {
    let name = m.text(&args[0])?;
    Ok(Some(Value::boolean(m.procedures.contains(&name))))
}

fn is_primitive(m: &mut Machine, args: Vec<Value>) -> EvalResult {
    let name = m.text(&args[0])?;
    Ok(Some(Value::boolean(m.procedures.is_primitive(&name))))
}

fn erase_procedures(m: &mut Machine, _args: Vec<Value>) -> EvalResult {
    m.procedures.clear_user();
    Ok(None)
}
