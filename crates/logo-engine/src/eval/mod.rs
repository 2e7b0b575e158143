//! Expression evaluation
//!
//! Parsing a statement yields a tree of [`Deferred`] computations; nothing
//! runs until the tree is evaluated. Evaluation is asynchronous so that
//! turtle commands and statement boundaries can suspend, and it walks the
//! tree left to right, depth first.

pub mod binary;
pub mod control;
pub mod define;
pub mod dispatch;
pub mod executor;
pub mod parser;

use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;

use crate::environment::Procedure;
use crate::error::{ErrorCode, Result};
use crate::machine::Machine;
use crate::stack::grow_stack;
use crate::value::Value;

pub use binary::BinaryOp;
pub use control::ControlFlow;
pub use define::UserProcedure;
pub use parser::parse_expression;

/// A boxed, non-`Send` future.
pub type LocalBoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// What evaluating an expression produces: a value, or nothing when a
/// procedure has no output.
pub type EvalResult = Result<Option<Value>>;

/// A parsed, not yet evaluated, expression.
#[derive(Debug)]
pub enum Deferred {
    /// A literal word, list or array
    Literal(Value),

    /// `:name`
    Variable(String),

    /// Unary minus
    Negate(Box<Deferred>),

    /// Infix operation; both operands are evaluated, left first
    Binary {
        /// Operator
        op: BinaryOp,
        /// Left operand
        lhs: Box<Deferred>,
        /// Right operand
        rhs: Box<Deferred>,
    },

    /// Procedure call
    Call(Call),

    /// A special form that already did its work while parsing
    Nothing,
}

/// A resolved procedure call with its (unevaluated) inputs.
#[derive(Debug)]
pub struct Call {
    /// Uppercased name as written
    pub name: String,

    /// Procedure bound at parse time
    pub procedure: Rc<Procedure>,

    /// Inputs
    pub args: Vec<Deferred>,
}

/// Trait for evaluating parsed expressions.
///
/// Each evaluation step may suspend; the returned future borrows the
/// machine for its whole run.
pub trait Evaluate {
    /// Evaluate against the interpreter state.
    fn eval<'a>(&'a self, m: &'a mut Machine) -> LocalBoxFuture<'a, EvalResult>;
}

impl Evaluate for Deferred {
    fn eval<'a>(&'a self, m: &'a mut Machine) -> LocalBoxFuture<'a, EvalResult> {
        grow_stack(Box::pin(async move {
            match self {
                Deferred::Literal(value) => Ok(Some(value.clone())),
                Deferred::Variable(name) => match m.env.get(name) {
                    Some(value) => Ok(Some(value.clone())),
                    None => Err(m.error(
                        ErrorCode::BadVar,
                        "Don't know about variable {name:U}",
                        &[("name", name.as_str())],
                    )),
                },
                Deferred::Negate(operand) => {
                    let value = operand.eval(m).await?;
                    Ok(Some(Value::number(-m.operand_number(value)?)))
                }
                Deferred::Binary { op, lhs, rhs } => {
                    let left = lhs.eval(m).await?;
                    let right = rhs.eval(m).await?;
                    op.apply(m, left, right).map(Some)
                }
                Deferred::Call(call) => m.call(call).await,
                Deferred::Nothing => Ok(None),
            }
        }))
    }
}

impl Deferred {
    /// Evaluate, requiring a value.
    pub async fn value(&self, m: &mut Machine) -> Result<Value> {
        let result = self.eval(m).await?;
        m.output(result)
    }
}
