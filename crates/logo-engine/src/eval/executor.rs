//! Statement sequencing and user procedure activation

use std::rc::Rc;

use crate::error::{ErrorCode, EvalError, Result};
use crate::machine::Machine;
use crate::reader::TokenStream;
use crate::value::Value;

use super::{parse_expression, ControlFlow, EvalResult, Evaluate, UserProcedure};

impl Machine {
    /// Run a statement sequence to completion.
    ///
    /// Each statement is parsed and evaluated in turn. A statement that
    /// produces a value is an error unless it is the last one and
    /// `return_result` is set, in which case that value is the result.
    /// The termination flag is checked before every statement.
    pub async fn execute(&mut self, mut tokens: TokenStream, return_result: bool) -> EvalResult {
        let mut last = None;
        loop {
            self.check_interrupt()?;
            if tokens.is_empty() {
                return Ok(last);
            }

            let statement = parse_expression(self, &mut tokens)?;
            let result = statement.eval(self).await?;
            if let Some(value) = &result {
                if !return_result || !tokens.is_empty() {
                    return Err(self.error(
                        ErrorCode::BadOutput,
                        "I don't know what to do with {result}",
                        &[("result", value.to_string().as_str())],
                    ));
                }
            }
            last = result;
            self.cooperate().await;
        }
    }

    /// Run an instruction list (or word) as a statement sequence.
    pub(crate) async fn run_list(&mut self, instructions: &Value, return_result: bool) -> EvalResult {
        let tokens = self.reparse(instructions)?;
        self.execute(tokens, return_result).await
    }

    /// Activate a user procedure on evaluated inputs.
    ///
    /// The new scope is popped and the call depth restored on every exit
    /// path; an `OUTPUT`/`STOP` signal ends here.
    pub(crate) async fn apply_user(&mut self, user: Rc<UserProcedure>, args: Vec<Value>) -> EvalResult {
        tracing::trace!(procedure = %user.name, inputs = args.len(), "apply");
        self.env.enter_call()?;
        self.env.push_frame();

        let result = self.run_user_body(&user, args).await;

        self.env.pop_frame();
        self.env.exit_call();

        match result {
            Ok(_) => Ok(None),
            Err(EvalError::ControlFlow(ControlFlow::Return { value })) => Ok(value),
            Err(e) => Err(e),
        }
    }

    async fn run_user_body(&mut self, user: &UserProcedure, args: Vec<Value>) -> Result<()> {
        let mut args = args.into_iter();

        for name in &user.inputs {
            let value = args.next();
            self.env.define(name, value);
        }
        for (name, default) in &user.optional {
            let value = match args.next() {
                Some(value) => value,
                None => {
                    let mut tokens = self.reparse(&Value::list(default.clone()))?;
                    parse_expression(self, &mut tokens)?.value(self).await?
                }
            };
            self.env.define(name, Some(value));
        }
        if let Some(rest) = &user.rest {
            self.env.define(rest, Some(Value::list(args.collect())));
        }

        let block = TokenStream::new(user.block.iter().cloned());
        self.execute(block, false).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::NullConsole;
    use crate::context::EvalContext;
    use crate::hooks::Hooks;
    use crate::turtle::RecordingTurtle;

    fn machine() -> Machine {
        Machine::new(
            Box::new(RecordingTurtle::new()),
            Box::new(NullConsole),
            EvalContext::new().with_seed(7),
            Hooks::default(),
        )
    }

    async fn run(m: &mut Machine, text: &str) -> EvalResult {
        let tokens = m.tokenize(text)?;
        m.execute(tokens, true).await
    }

    #[tokio::test]
    async fn test_unconsumed_value_is_an_error() {
        let mut m = machine();
        let tokens = m.tokenize("1 + 2").unwrap();
        let err = m.execute(tokens, false).await.unwrap_err();
        let logo = err.as_logo().unwrap();
        assert_eq!(logo.code, ErrorCode::BadOutput);
        assert_eq!(logo.message, "I don't know what to do with 3");
    }

    #[tokio::test]
    async fn test_return_result_keeps_last_value() {
        let mut m = machine();
        let result = run(&mut m, "make \"x 4 :x * 2").await.unwrap();
        assert_eq!(result, Some(Value::number(8.0)));
    }

    #[tokio::test]
    async fn test_optional_default_sees_earlier_inputs() {
        let mut m = machine();
        run(&mut m, "to f :a [:b :a + 1]\noutput :a * :b\nend").await.unwrap();
        assert_eq!(run(&mut m, "f 3").await.unwrap(), Some(Value::number(12.0)));
        assert_eq!(run(&mut m, "(f 3 5)").await.unwrap(), Some(Value::number(15.0)));
        assert_eq!(m.scope_depth(), 1);
    }

    #[tokio::test]
    async fn test_rest_input_collects_remaining() {
        let mut m = machine();
        run(&mut m, "to g :a [:more]\noutput :more\nend").await.unwrap();
        let result = run(&mut m, "(g 1 2 3)").await.unwrap();
        assert_eq!(
            result,
            Some(Value::list(vec![Value::number(2.0), Value::number(3.0)]))
        );
    }

    #[tokio::test]
    async fn test_interrupt_stops_before_next_statement() {
        let mut m = machine();
        m.ctx.interrupt();
        let err = run(&mut m, "make \"x 1").await.unwrap_err();
        assert!(matches!(err, EvalError::ControlFlow(ControlFlow::Bye)));
        assert!(m.env.get("x").is_none());
    }
}
