//! Infix operators

use crate::error::{ErrorCode, Result};
use crate::machine::Machine;
use crate::value::Value;

/// An infix operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `%`
    Rem,
    /// `^`
    Pow,
    /// `=`
    Eq,
    /// `<>`
    Ne,
    /// `<`
    Lt,
    /// `>`
    Gt,
    /// `<=`
    Le,
    /// `>=`
    Ge,
}

impl BinaryOp {
    /// Operators of the relational tier.
    pub fn relational(word: &str) -> Option<Self> {
        match word {
            "=" => Some(BinaryOp::Eq),
            "<>" => Some(BinaryOp::Ne),
            "<" => Some(BinaryOp::Lt),
            ">" => Some(BinaryOp::Gt),
            "<=" => Some(BinaryOp::Le),
            ">=" => Some(BinaryOp::Ge),
            _ => None,
        }
    }

    /// Operators of the additive tier.
    pub fn additive(word: &str) -> Option<Self> {
        match word {
            "+" => Some(BinaryOp::Add),
            "-" => Some(BinaryOp::Sub),
            _ => None,
        }
    }

    /// Operators of the multiplicative tier.
    pub fn multiplicative(word: &str) -> Option<Self> {
        match word {
            "*" => Some(BinaryOp::Mul),
            "/" => Some(BinaryOp::Div),
            "%" => Some(BinaryOp::Rem),
            _ => None,
        }
    }

    /// The operator's source symbol.
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::Pow => "^",
            BinaryOp::Eq => "=",
            BinaryOp::Ne => "<>",
            BinaryOp::Lt => "<",
            BinaryOp::Gt => ">",
            BinaryOp::Le => "<=",
            BinaryOp::Ge => ">=",
        }
    }

    /// Apply to evaluated operands.
    ///
    /// `=` and `<>` compare any values; everything else needs numbers.
    /// Comparisons produce 1 or 0.
    pub fn apply(self, m: &Machine, lhs: Option<Value>, rhs: Option<Value>) -> Result<Value> {
        match self {
            BinaryOp::Eq | BinaryOp::Ne => {
                let lhs = m.output(lhs)?;
                let rhs = m.output(rhs)?;
                Ok(flag((lhs == rhs) == (self == BinaryOp::Eq)))
            }
            _ => {
                let a = m.operand_number(lhs)?;
                let b = m.operand_number(rhs)?;
                eval_numeric(self, m, a, b)
            }
        }
    }
}

fn flag(b: bool) -> Value {
    Value::number(if b { 1.0 } else { 0.0 })
}

fn eval_numeric(op: BinaryOp, m: &Machine, a: f64, b: f64) -> Result<Value> {
    let n = match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div | BinaryOp::Rem if b == 0.0 => {
            return Err(m.error(ErrorCode::BadInput, "Division by zero", &[]));
        }
        BinaryOp::Div => a / b,
        BinaryOp::Rem => a % b,
        BinaryOp::Pow => a.powf(b),
        BinaryOp::Lt => return Ok(flag(a < b)),
        BinaryOp::Gt => return Ok(flag(a > b)),
        BinaryOp::Le => return Ok(flag(a <= b)),
        BinaryOp::Ge => return Ok(flag(a >= b)),
        BinaryOp::Eq | BinaryOp::Ne => unreachable!("handled by apply"),
    };
    Ok(Value::number(n))
}
