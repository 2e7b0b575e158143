//! Arithmetic and random numbers

use crate::environment::{Arity, ProcedureRegistry};
use crate::error::{ErrorCode, Result};
use crate::eval::EvalResult;
use crate::machine::Machine;
use crate::value::Value;

pub(super) fn register(registry: &mut ProcedureRegistry) {
    registry.primitive(&["sum"], Arity::new(0, 2, None), sum);
    registry.primitive(&["difference"], Arity::fixed(2), difference);
    registry.primitive(&["product"], Arity::new(0, 2, None), product);
    registry.primitive(&["quotient"], Arity::new(1, 2, Some(2)), quotient);
    registry.primitive(&["remainder"], Arity::fixed(2), remainder);
    registry.primitive(&["minus"], Arity::fixed(1), minus);
    registry.primitive(&["abs"], Arity::fixed(1), abs);
    registry.primitive(&["int"], Arity::fixed(1), int);
    registry.primitive(&["round"], Arity::fixed(1), round);
    registry.primitive(&["sqrt"], Arity::fixed(1), sqrt);
    registry.primitive(&["power"], Arity::fixed(2), power);
    registry.primitive(&["random"], Arity::new(1, 1, Some(2)), random);
    registry.primitive(&["rerandom"], Arity::new(0, 0, Some(1)), rerandom);
}

fn numbers(m: &Machine, args: &[Value]) -> Result<Vec<f64>> {
    args.iter().map(|arg| m.number(arg)).collect()
}

fn number(n: f64) -> EvalResult {
    Ok(Some(Value::number(n)))
}

fn nonzero(m: &Machine, divisor: f64) -> Result<f64> {
    if divisor == 0.0 {
        return Err(m.error(ErrorCode::BadInput, "Division by zero", &[]));
    }
    Ok(divisor)
}

fn sum(m: &mut Machine, args: Vec<Value>) -> EvalResult {
    number(numbers(m, &args)?.into_iter().sum())
}

fn difference(m: &mut Machine, args: Vec<Value>) -> EvalResult {
    number(m.number(&args[0])? - m.number(&args[1])?)
}

fn product(m: &mut Machine, args: Vec<Value>) -> EvalResult {
    number(numbers(m, &args)?.into_iter().product())
}

/// `QUOTIENT a b`, or `(QUOTIENT b)` for `1 / b`.
fn quotient(m: &mut Machine, args: Vec<Value>) -> EvalResult {
    let ns = numbers(m, &args)?;
    let (dividend, divisor) = match ns.as_slice() {
        [divisor] => (1.0, *divisor),
        [dividend, divisor, ..] => (*dividend, *divisor),
        [] => return Ok(None),
    };
    number(dividend / nonzero(m, divisor)?)
}

fn remainder(m: &mut Machine, args: Vec<Value>) -> EvalResult {
    let dividend = m.number(&args[0])?;
    let divisor = nonzero(m, m.number(&args[1])?)?;
    number(dividend % divisor)
}

fn minus(m: &mut Machine, args: Vec<Value>) -> EvalResult {
    number(-m.number(&args[0])?)
}

fn abs(m: &mut Machine, args: Vec<Value>) -> EvalResult {
    number(m.number(&args[0])?.abs())
}

fn int(m: &mut Machine, args: Vec<Value>) -> EvalResult {
    number(m.number(&args[0])?.trunc())
}

/// Halves round up, including negative ones (`ROUND -2.5` is -2).
fn round(m: &mut Machine, args: Vec<Value>) -> EvalResult {
    number((m.number(&args[0])? + 0.5).floor())
}

fn sqrt(m: &mut Machine, args: Vec<Value>) -> EvalResult {
    let n = m.number(&args[0])?;
    if n < 0.0 {
        return Err(m.error(
            ErrorCode::BadInput,
            "{_PROC_}: Expected a non-negative number",
            &[],
        ));
    }
    number(n.sqrt())
}

fn power(m: &mut Machine, args: Vec<Value>) -> EvalResult {
    number(m.number(&args[0])?.powf(m.number(&args[1])?))
}

/// `RANDOM n` is an integer in `0..n`; `(RANDOM start end)` is in
/// `start..=end`.
fn random(m: &mut Machine, args: Vec<Value>) -> EvalResult {
    let ns = numbers(m, &args)?;
    let n = match ns.as_slice() {
        [max] => m.prng.below(*max),
        [start, end, ..] => m.prng.between(*start, *end),
        [] => return Ok(None),
    };
    number(n)
}

/// Restart `RANDOM`'s sequence: from the interpreter's seed, or from the
/// given one.
fn rerandom(m: &mut Machine, args: Vec<Value>) -> EvalResult {
    let seed = match args.first() {
        Some(seed) => u32::try_from(m.integer(seed)?)
            .map_err(|_| m.error(ErrorCode::BadInput, "{_PROC_}: Seed out of range", &[]))?,
        None => m.seed,
    };
    m.prng.seed(seed);
    Ok(None)
}

#[cfg(test)]
mod tests {
    use crate::environment::prelude::testing::harness;
    use crate::value::Value;

    #[tokio::test]
    async fn test_arithmetic() {
        let mut h = harness();
        assert_eq!(h.value("(sum 1 2 3)").await, Value::number(6.0));
        assert_eq!(h.value("(sum)").await, Value::number(0.0));
        assert_eq!(h.value("difference 10 4").await, Value::number(6.0));
        assert_eq!(h.value("product 2 2.5").await, Value::number(5.0));
        assert_eq!(h.value("quotient 7 2").await, Value::number(3.5));
        assert_eq!(h.value("(quotient 4)").await, Value::number(0.25));
        assert_eq!(h.value("remainder 7 3").await, Value::number(1.0));
        assert_eq!(h.value("minus 3").await, Value::number(-3.0));
        assert_eq!(h.value("abs -4").await, Value::number(4.0));
        assert_eq!(h.value("int -3.7").await, Value::number(-3.0));
        assert_eq!(h.value("round 2.5").await, Value::number(3.0));
        assert_eq!(h.value("round -2.5").await, Value::number(-2.0));
        assert_eq!(h.value("sqrt 16").await, Value::number(4.0));
        assert_eq!(h.value("power 2 10").await, Value::number(1024.0));
    }

    #[tokio::test]
    async fn test_division_by_zero() {
        let mut h = harness();
        assert_eq!(h.message("quotient 1 0").await, "Division by zero");
        assert_eq!(h.message("remainder -1 0").await, "Division by zero");
        assert_eq!(h.message("sqrt -1").await, "SQRT: Expected a non-negative number");
    }

    #[tokio::test]
    async fn test_random_is_reproducible() {
        let mut h = harness();
        let first = h.value("(list random 100 random 100 (random 5 6))").await;
        h.run("rerandom").await.unwrap();
        let again = h.value("(list random 100 random 100 (random 5 6))").await;
        assert_eq!(first, again);

        let Value::List(items) = first else {
            panic!("expected a list");
        };
        let last = items[2].as_number().unwrap();
        assert!(last == 5.0 || last == 6.0);
        for item in &items[..2] {
            let n = item.as_number().unwrap();
            assert!((0.0..100.0).contains(&n) && n.fract() == 0.0);
        }
    }

    #[tokio::test]
    async fn test_rerandom_seed_range() {
        let mut h = harness();
        assert_eq!(h.message("(rerandom -1)").await, "RERANDOM: Seed out of range");
        assert_eq!(h.message("(rerandom 4294967296)").await, "RERANDOM: Seed out of range");

        h.run("(rerandom 4294967295)").await.unwrap();
        let first = h.value("random 1000").await;
        h.run("(rerandom 4294967295)").await.unwrap();
        assert_eq!(h.value("random 1000").await, first);
    }
}
