//! Flow control: loops, conditionals, OUTPUT/STOP, CATCH/THROW and BYE

use crate::environment::{Arity, ProcedureRegistry};
use crate::error::{ErrorCode, EvalError, LogoError, Result};
use crate::eval::{ControlFlow, Deferred, EvalResult, LocalBoxFuture};
use crate::machine::Machine;
use crate::reader::TokenStream;
use crate::value::Value;

pub(super) fn register(registry: &mut ProcedureRegistry) {
    registry.primitive(&["output", "op"], Arity::fixed(1), output);
    registry.primitive(&["stop"], Arity::fixed(0), stop);
    registry.suspending(&["repeat", "rpt"], Arity::fixed(2), repeat);
    registry.primitive(&["repcount", "#"], Arity::fixed(0), repcount);
    registry.suspending(&["forever"], Arity::fixed(1), forever);
    registry.suspending(&["run"], Arity::fixed(1), run);
    registry.suspending(&["if"], Arity::new(2, 2, Some(3)), if_);
    registry.suspending(&["ifelse"], Arity::fixed(3), if_);
    registry.lazy(&["while"], Arity::fixed(2), while_);
    registry.lazy(&["until"], Arity::fixed(2), until);
    registry.lazy(&["do.while"], Arity::fixed(2), do_while);
    registry.lazy(&["do.until"], Arity::fixed(2), do_until);
    registry.lazy(&["and"], Arity::new(0, 2, None), and);
    registry.lazy(&["or"], Arity::new(0, 2, None), or);
    registry.primitive(&["not"], Arity::fixed(1), not);
    registry.suspending(&["catch"], Arity::fixed(2), catch);
    registry.primitive(&["throw"], Arity::new(1, 1, Some(2)), throw);
    registry.primitive(&["bye"], Arity::fixed(0), bye);
    registry.primitive(&["ignore"], Arity::fixed(1), ignore);
}

// ═══════════════════════════════════════════════════════════════════════
// Procedure Exit
// ═══════════════════════════════════════════════════════════════════════

fn inside_procedure(m: &Machine) -> Result<()> {
    if m.env.call_depth() == 0 {
        return Err(m.error(
            ErrorCode::BadInput,
            "{_PROC_}: Can only be used in a procedure",
            &[],
        ));
    }
    Ok(())
}

fn output(m: &mut Machine, args: Vec<Value>) -> EvalResult {
    inside_procedure(m)?;
    let value = args.into_iter().next();
    Err(EvalError::ControlFlow(ControlFlow::Return { value }))
}

fn stop(m: &mut Machine, _args: Vec<Value>) -> EvalResult {
    inside_procedure(m)?;
    Err(EvalError::ControlFlow(ControlFlow::stop()))
}

fn bye(_m: &mut Machine, _args: Vec<Value>) -> EvalResult {
    tracing::debug!("BYE");
    Err(EvalError::ControlFlow(ControlFlow::Bye))
}

fn ignore(_m: &mut Machine, _args: Vec<Value>) -> EvalResult {
    Ok(None)
}

// ═══════════════════════════════════════════════════════════════════════
// Counted Loops
// ═══════════════════════════════════════════════════════════════════════

fn repeat(m: &mut Machine, args: Vec<Value>) -> LocalBoxFuture<'_, EvalResult> {
    Box::pin(async move {
        let count = m.number(&args[0])?;
        let body = m.reparse(&args[1])?;
        let saved = m.repcount;
        let result = repeat_body(m, Some(count), body).await;
        m.repcount = saved;
        result
    })
}

fn forever(m: &mut Machine, args: Vec<Value>) -> LocalBoxFuture<'_, EvalResult> {
    Box::pin(async move {
        let body = m.reparse(&args[0])?;
        let saved = m.repcount;
        let result = repeat_body(m, None, body).await;
        m.repcount = saved;
        result
    })
}

/// Run `body` `count` times (forever without a count), exposing the
/// 1-based iteration through `REPCOUNT`.
async fn repeat_body(m: &mut Machine, count: Option<f64>, body: TokenStream) -> EvalResult {
    let mut i: i64 = 1;
    while count.map_or(true, |count| i as f64 <= count) {
        m.repcount = i;
        m.execute(body.clone(), false).await?;
        m.cooperate().await;
        i += 1;
    }
    Ok(None)
}

fn repcount(m: &mut Machine, _args: Vec<Value>) -> EvalResult {
    Ok(Some(Value::number(m.repcount as f64)))
}

// ═══════════════════════════════════════════════════════════════════════
// Conditionals
// ═══════════════════════════════════════════════════════════════════════

fn run(m: &mut Machine, args: Vec<Value>) -> LocalBoxFuture<'_, EvalResult> {
    Box::pin(async move { m.run_list(&args[0], true).await })
}

/// `IF test [then]`, `IF test [then] [else]` and `IFELSE`.
fn if_(m: &mut Machine, args: Vec<Value>) -> LocalBoxFuture<'_, EvalResult> {
    Box::pin(async move {
        let branch = if m.truthy(&args[0])? {
            args.get(1)
        } else {
            args.get(2)
        };
        match branch {
            Some(instructions) => m.run_list(instructions, true).await,
            None => Ok(None),
        }
    })
}

/// Evaluate a loop test. A list is run as an expression.
async fn test(m: &mut Machine, condition: &Deferred) -> Result<bool> {
    let value = condition.value(m).await?;
    let value = match value {
        Value::List(_) => {
            let result = m.run_list(&value, true).await?;
            m.output(result)?
        }
        other => other,
    };
    m.truthy(&value)
}

/// Shared body of the four conditional loops. `WHILE`/`UNTIL` take the
/// test first; `DO.WHILE`/`DO.UNTIL` take the instructions first and run
/// them once before testing.
async fn conditional_loop(m: &mut Machine, args: &[Deferred], until: bool, body_first: bool) -> EvalResult {
    let (condition, instructions) = if body_first {
        (&args[1], &args[0])
    } else {
        (&args[0], &args[1])
    };
    let instructions = instructions.value(m).await?;
    let body = m.reparse(&instructions)?;
    if body_first {
        m.execute(body.clone(), false).await?;
        m.cooperate().await;
    }
    while test(m, condition).await? != until {
        m.execute(body.clone(), false).await?;
        m.cooperate().await;
    }
    Ok(None)
}

fn while_<'a>(m: &'a mut Machine, args: &'a [Deferred]) -> LocalBoxFuture<'a, EvalResult> {
    Box::pin(conditional_loop(m, args, false, false))
}

fn until<'a>(m: &'a mut Machine, args: &'a [Deferred]) -> LocalBoxFuture<'a, EvalResult> {
    Box::pin(conditional_loop(m, args, true, false))
}

fn do_while<'a>(m: &'a mut Machine, args: &'a [Deferred]) -> LocalBoxFuture<'a, EvalResult> {
    Box::pin(conditional_loop(m, args, false, true))
}

fn do_until<'a>(m: &'a mut Machine, args: &'a [Deferred]) -> LocalBoxFuture<'a, EvalResult> {
    Box::pin(conditional_loop(m, args, true, true))
}

// ═══════════════════════════════════════════════════════════════════════
// Logic
// ═══════════════════════════════════════════════════════════════════════

/// Evaluate inputs left to right until one is `short_circuit`.
async fn connective(m: &mut Machine, args: &[Deferred], short_circuit: bool) -> EvalResult {
    for arg in args {
        let value = arg.value(m).await?;
        if m.truthy(&value)? == short_circuit {
            return Ok(Some(Value::boolean(short_circuit)));
        }
    }
    Ok(Some(Value::boolean(!short_circuit)))
}

fn and<'a>(m: &'a mut Machine, args: &'a [Deferred]) -> LocalBoxFuture<'a, EvalResult> {
    Box::pin(connective(m, args, false))
}

fn or<'a>(m: &'a mut Machine, args: &'a [Deferred]) -> LocalBoxFuture<'a, EvalResult> {
    Box::pin(connective(m, args, true))
}

fn not(m: &mut Machine, args: Vec<Value>) -> EvalResult {
    Ok(Some(Value::boolean(!m.truthy(&args[0])?)))
}

// ═══════════════════════════════════════════════════════════════════════
// Catch and Throw
// ═══════════════════════════════════════════════════════════════════════

fn catch(m: &mut Machine, args: Vec<Value>) -> LocalBoxFuture<'_, EvalResult> {
    Box::pin(async move {
        let tag = m.text(&args[0])?;
        match m.run_list(&args[1], true).await {
            Err(EvalError::Logo(e)) if e.has_tag(&tag) => {
                tracing::debug!(tag = %tag, code = %e.code, "caught");
                Ok(e.value)
            }
            other => other,
        }
    })
}

/// `THROW "ERROR message` raises a user error; any other tag travels to
/// the matching `CATCH`.
fn throw(m: &mut Machine, args: Vec<Value>) -> EvalResult {
    let tag = m.text(&args[0])?;
    let value = args.get(1).cloned();

    let error = if tag.eq_ignore_ascii_case(LogoError::ERROR_TAG) {
        let message = value
            .as_ref()
            .map(Value::print_form)
            .unwrap_or_else(|| LogoError::ERROR_TAG.to_string());
        LogoError::new(ErrorCode::UserGenerated, message)
            .with_proc(m.current_proc().map(str::to_string))
    } else {
        m.logo_error(ErrorCode::ThrowError, "No CATCH for tag {tag}", &[("tag", tag.as_str())])
            .with_tag(tag)
    };
    Err(EvalError::Logo(error.with_value(value)))
}

#[cfg(test)]
mod tests {
    use crate::environment::prelude::testing::harness;
    use crate::value::Value;

    #[tokio::test]
    async fn test_repeat_counts_and_restores() {
        let mut h = harness();
        h.run("make \"x 0 make \"seen []").await.unwrap();
        h.run("repeat 3 [make \"x :x + 1 make \"seen lput repcount :seen]").await.unwrap();
        assert_eq!(h.value(":x").await, Value::number(3.0));
        assert_eq!(h.value(":seen").await.to_string(), "[1 2 3]");
        assert_eq!(h.value("repcount").await, Value::number(-1.0));
    }

    #[tokio::test]
    async fn test_nested_repeat_restores_outer_count() {
        let mut h = harness();
        h.run("make \"log []").await.unwrap();
        h.run("repeat 2 [repeat 2 [] make \"log lput # :log]").await.unwrap();
        assert_eq!(h.value(":log").await.to_string(), "[1 2]");
    }

    #[tokio::test]
    async fn test_if_else_forms() {
        let mut h = harness();
        assert_eq!(h.value("if 1 < 2 [\"yes]").await, Value::word("yes"));
        assert_eq!(h.value("ifelse 1 > 2 [\"yes] [\"no]").await, Value::word("no"));
        assert_eq!(h.value("if 1 > 2 [\"yes] else [\"no]").await, Value::word("no"));
        assert_eq!(h.value("(if \"false [\"yes] [\"no])").await, Value::word("no"));
        assert_eq!(h.run("if 0 [\"yes]").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_while_reevaluates_condition() {
        let mut h = harness();
        h.run("make \"i 0 while :i < 5 [make \"i :i + 1]").await.unwrap();
        assert_eq!(h.value(":i").await, Value::number(5.0));
        h.run("make \"j 10 do.until [make \"j :j + 1] [:j > 3]").await.unwrap();
        assert_eq!(h.value(":j").await, Value::number(11.0));
        h.run("make \"k 0 until [:k = 2] [make \"k :k + 1]").await.unwrap();
        assert_eq!(h.value(":k").await, Value::number(2.0));
    }

    #[tokio::test]
    async fn test_and_or_short_circuit() {
        let mut h = harness();
        assert_eq!(h.value("and 1 0").await, Value::boolean(false));
        assert_eq!(h.value("or \"false 1").await, Value::boolean(true));
        assert_eq!(h.value("(and)").await, Value::boolean(true));
        // the second input would fail if evaluated
        assert_eq!(h.value("or 1 :missing").await, Value::boolean(true));
        assert_eq!(h.value("not \"true").await, Value::boolean(false));
    }

    #[tokio::test]
    async fn test_output_outside_procedure() {
        let mut h = harness();
        assert_eq!(
            h.message("output 1").await,
            "OUTPUT: Can only be used in a procedure"
        );
    }

    #[tokio::test]
    async fn test_catch_and_throw() {
        let mut h = harness();
        assert_eq!(h.value("catch \"oops [(throw \"oops 42)]").await, Value::number(42.0));
        assert_eq!(h.run("catch \"error [print :nothing]").await.unwrap(), None);
        assert_eq!(h.message("throw \"oops").await, "No CATCH for tag oops");
        assert_eq!(h.message("(throw \"error [bad thing])").await, "bad thing");
        assert_eq!(h.message("catch \"other [throw \"oops]").await, "No CATCH for tag oops");
    }

    #[tokio::test]
    async fn test_throw_error_code() {
        let mut h = harness();
        let err = h.run("(throw \"error \"boom)").await.unwrap_err();
        let logo = err.as_logo().unwrap();
        assert_eq!(logo.code.code(), 35);
        assert_eq!(logo.value, Some(Value::word("boom")));
        let err = h.run("throw \"elsewhere").await.unwrap_err();
        assert_eq!(err.as_logo().unwrap().code.code(), 21);
    }

    #[tokio::test]
    async fn test_run_outputs_value() {
        let mut h = harness();
        assert_eq!(h.value("run [3 * 4]").await, Value::number(12.0));
        assert_eq!(h.value("run \"repcount").await, Value::number(-1.0));
        assert_eq!(h.value("run [make \"y 2 :y + 1]").await, Value::number(3.0));
    }

    #[tokio::test]
    async fn test_only_the_last_statement_may_output() {
        let mut h = harness();
        let unused = "I don't know what to do with 5";
        assert_eq!(h.message("if 1 [5 make \"x 1]").await, unused);
        assert_eq!(h.message("run [5 6]").await, unused);
        assert_eq!(h.message("catch \"oops [5 make \"x 1]").await, unused);
        assert_eq!(h.message("5 print 1").await, unused);
        assert_eq!(h.message(":x").await, "Don't know about variable X");
    }
}
