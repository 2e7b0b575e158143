//! Turtle graphics
//!
//! Every command hands the turtle's [`Motion`] back to the executor, which
//! waits for it before the next statement runs.

use crate::color::resolve_color;
use crate::environment::{Arity, ProcedureRegistry};
use crate::error::{ErrorCode, Result};
use crate::eval::{EvalResult, LocalBoxFuture};
use crate::machine::Machine;
use crate::turtle::Motion;
use crate::value::Value;

pub(super) fn register(registry: &mut ProcedureRegistry) {
    registry.suspending(&["forward", "fd"], Arity::fixed(1), forward);
    registry.suspending(&["back", "bk"], Arity::fixed(1), back);
    registry.suspending(&["left", "lt"], Arity::fixed(1), left);
    registry.suspending(&["right", "rt"], Arity::fixed(1), right);
    registry.suspending(&["setxy"], Arity::fixed(2), setxy);
    registry.suspending(&["setheading", "seth"], Arity::fixed(1), setheading);
    registry.suspending(&["home"], Arity::fixed(0), home);
    registry.suspending(&["pendown", "pd"], Arity::fixed(0), pendown);
    registry.suspending(&["penup", "pu"], Arity::fixed(0), penup);
    registry.suspending(&["setpencolor", "setpc", "setcolor"], Arity::fixed(1), setpencolor);
    registry.suspending(&["setpensize", "setwidth", "setpw", "setps"], Arity::fixed(1), setpensize);
    registry.suspending(&["clearscreen", "cs", "cls"], Arity::fixed(0), clearscreen);
    registry.primitive(&["pos"], Arity::fixed(0), pos);
    registry.primitive(&["xcor"], Arity::fixed(0), xcor);
    registry.primitive(&["ycor"], Arity::fixed(0), ycor);
    registry.primitive(&["heading"], Arity::fixed(0), heading);
}

/// Wait for a turtle command to finish.
fn settle<'a>(motion: Result<Motion>) -> LocalBoxFuture<'a, EvalResult> {
    Box::pin(async move {
        motion?.settle().await;
        Ok(None)
    })
}

fn forward(m: &mut Machine, args: Vec<Value>) -> LocalBoxFuture<'_, EvalResult> {
    settle(m.number(&args[0]).map(|n| m.turtle.move_by(n)))
}

fn back(m: &mut Machine, args: Vec<Value>) -> LocalBoxFuture<'_, EvalResult> {
    settle(m.number(&args[0]).map(|n| m.turtle.move_by(-n)))
}

fn left(m: &mut Machine, args: Vec<Value>) -> LocalBoxFuture<'_, EvalResult> {
    settle(m.number(&args[0]).map(|n| m.turtle.turn(-n)))
}

fn right(m: &mut Machine, args: Vec<Value>) -> LocalBoxFuture<'_, EvalResult> {
    settle(m.number(&args[0]).map(|n| m.turtle.turn(n)))
}

fn setxy(m: &mut Machine, args: Vec<Value>) -> LocalBoxFuture<'_, EvalResult> {
    let position = m
        .number(&args[0])
        .and_then(|x| Ok((x, m.number(&args[1])?)));
    settle(position.map(|(x, y)| m.turtle.set_position(x, y)))
}

fn setheading(m: &mut Machine, args: Vec<Value>) -> LocalBoxFuture<'_, EvalResult> {
    settle(m.number(&args[0]).map(|n| m.turtle.set_heading(n)))
}

fn home(m: &mut Machine, _args: Vec<Value>) -> LocalBoxFuture<'_, EvalResult> {
    settle(Ok(m.turtle.home()))
}

fn pendown(m: &mut Machine, _args: Vec<Value>) -> LocalBoxFuture<'_, EvalResult> {
    settle(Ok(m.turtle.pen_down()))
}

fn penup(m: &mut Machine, _args: Vec<Value>) -> LocalBoxFuture<'_, EvalResult> {
    settle(Ok(m.turtle.pen_up()))
}

fn clearscreen(m: &mut Machine, _args: Vec<Value>) -> LocalBoxFuture<'_, EvalResult> {
    settle(Ok(m.turtle.clear()))
}

fn setpencolor(m: &mut Machine, args: Vec<Value>) -> LocalBoxFuture<'_, EvalResult> {
    let color = resolve_color(&args[0], |name| m.hooks.color_alias(name));
    let motion = match color {
        Some(color) => Ok(m.turtle.set_pen_color(&color)),
        None => Err(m.error(ErrorCode::BadInput, "{_PROC_}: Expected a colour", &[])),
    };
    settle(motion)
}

/// A list input uses its first element.
fn setpensize(m: &mut Machine, args: Vec<Value>) -> LocalBoxFuture<'_, EvalResult> {
    let width = match &args[0] {
        Value::List(items) => match items.first() {
            Some(first) => m.number(first),
            None => Err(m.error(ErrorCode::BadInput, "{_PROC_}: Expected list", &[])),
        },
        other => m.number(other),
    };
    settle(width.map(|w| m.turtle.set_pen_width(w)))
}

fn pos(m: &mut Machine, _args: Vec<Value>) -> EvalResult {
    let (x, y) = m.turtle.position();
    Ok(Some(Value::list(vec![Value::number(x), Value::number(y)])))
}

fn xcor(m: &mut Machine, _args: Vec<Value>) -> EvalResult {
    Ok(Some(Value::number(m.turtle.position().0)))
}

fn ycor(m: &mut Machine, _args: Vec<Value>) -> EvalResult {
    Ok(Some(Value::number(m.turtle.position().1)))
}

fn heading(m: &mut Machine, _args: Vec<Value>) -> EvalResult {
    Ok(Some(Value::number(m.turtle.heading())))
}
