//! Procedure dispatch: name resolution, arity and calling conventions

use std::rc::Rc;

use crate::environment::{Behavior, Implementation, Procedure};
use crate::error::{ErrorCode, EvalError, Result};
use crate::machine::Machine;
use crate::reader::TokenStream;
use crate::value::Value;

use super::{parse_expression, Call, Deferred, EvalResult};

impl Machine {
    /// Resolve `name` and parse its inputs.
    ///
    /// A natural call (no parentheses) consumes exactly the procedure's
    /// default number of inputs. An explicit call consumes inputs up to
    /// the closing `)` and checks the count against the procedure's
    /// bounds. Special forms run immediately on the raw tokens.
    pub fn dispatch(&mut self, name: &str, tokens: &mut TokenStream, natural: bool) -> Result<Deferred> {
        let upper = name.to_uppercase();
        self.last_call = Some(name.to_lowercase());
        let Some(procedure) = self.procedures.get(name) else {
            return Err(self.unknown_procedure(name));
        };

        if let Behavior::Special(special) = procedure.behavior {
            self.call_stack.push(upper);
            let result = special(self, tokens);
            self.call_stack.pop();
            return result.map(|()| Deferred::Nothing);
        }

        let args = if natural {
            self.natural_args(&upper, &procedure, tokens)?
        } else {
            self.explicit_args(&upper, &procedure, tokens)?
        };

        Ok(Deferred::Call(Call {
            name: upper,
            procedure,
            args,
        }))
    }

    fn natural_args(
        &mut self,
        name: &str,
        procedure: &Procedure,
        tokens: &mut TokenStream,
    ) -> Result<Vec<Deferred>> {
        let mut args = Vec::with_capacity(procedure.arity.default);
        for _ in 0..procedure.arity.default {
            if tokens.is_empty() || tokens.peek_is(")") {
                return Err(self.error(
                    ErrorCode::NotEnoughInputs,
                    "Not enough inputs for {name:U}",
                    &[("name", name)],
                ));
            }
            args.push(parse_expression(self, tokens)?);
        }

        // IF cond [then] ELSE [else]
        let takes_else = procedure.arity.maximum.is_some_and(|max| max > args.len());
        if name == "IF" && takes_else && tokens.peek().is_some_and(|t| self.is_keyword(t, "ELSE")) {
            tokens.next();
            args.push(parse_expression(self, tokens)?);
        }
        Ok(args)
    }

    fn explicit_args(
        &mut self,
        name: &str,
        procedure: &Procedure,
        tokens: &mut TokenStream,
    ) -> Result<Vec<Deferred>> {
        let mut args = Vec::new();
        while !tokens.is_empty() && !tokens.peek_is(")") {
            args.push(parse_expression(self, tokens)?);
        }
        if tokens.next().is_none() {
            return Err(self.error(ErrorCode::MissingParen, "Expected ')'", &[]));
        }

        if args.len() < procedure.arity.minimum {
            return Err(self.error(
                ErrorCode::NotEnoughInputs,
                "Not enough inputs for {name:U}",
                &[("name", name)],
            ));
        }
        if !procedure.arity.accepts(args.len()) {
            return Err(self.error(
                ErrorCode::TooManyInputs,
                "Too many inputs for {name:U}",
                &[("name", name)],
            ));
        }
        Ok(args)
    }

    /// "I don't know how to", or a hint when a known name has digits glued
    /// to it (`fd10`).
    fn unknown_procedure(&self, name: &str) -> EvalError {
        let split = name.trim_end_matches(|c: char| c.is_ascii_digit()).len();
        let (prefix, digits) = name.split_at(split);
        let word_like = !prefix.is_empty()
            && prefix.chars().all(|c| c.is_alphanumeric() || c == '_');
        if word_like && !digits.is_empty() && self.procedures.contains(prefix) {
            return self.error(
                ErrorCode::MissingSpace,
                "Need a space between {name:U} and {value}",
                &[("name", prefix), ("value", digits)],
            );
        }
        self.error(
            ErrorCode::BadProc,
            "I don't know how to {name:U}",
            &[("name", name)],
        )
    }

    // ═══════════════════════════════════════════════════════════════════
    // Invocation
    // ═══════════════════════════════════════════════════════════════════

    /// Evaluate a parsed call.
    ///
    /// The name stays on the call stack until the call finishes, however
    /// it finishes.
    pub(crate) async fn call(&mut self, call: &Call) -> EvalResult {
        self.call_stack.push(call.name.clone());
        let result = match &call.procedure.behavior {
            Behavior::Ordinary(implementation) => self.call_ordinary(call, implementation).await,
            Behavior::NonEvaluating(lazy) => lazy(self, &call.args).await,
            Behavior::Special(_) => Ok(None),
        };
        self.call_stack.pop();
        result
    }

    async fn call_ordinary(&mut self, call: &Call, implementation: &Implementation) -> EvalResult {
        let mut values = Vec::with_capacity(call.args.len());
        for arg in &call.args {
            values.push(arg.value(self).await?);
        }
        self.invoke(implementation, values).await
    }

    /// Run an ordinary procedure on evaluated inputs.
    pub(crate) async fn invoke(&mut self, implementation: &Implementation, args: Vec<Value>) -> EvalResult {
        match implementation {
            Implementation::Primitive(f) => f(self, args),
            Implementation::Suspending(f) => f(self, args).await,
            Implementation::User(user) => self.apply_user(Rc::clone(user), args).await,
        }
    }
}
