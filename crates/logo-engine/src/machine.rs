//! Interpreter state shared by the evaluator and the primitives

use crate::console::Console;
use crate::context::EvalContext;
use crate::environment::{Environment, ProcedureRegistry};
use crate::error::{format_message, ErrorCode, EvalError, LogoError, Result};
use crate::eval::ControlFlow;
use crate::hooks::Hooks;
use crate::prng::{clock_seed, Prng};
use crate::reader::{self, Token, TokenStream};
use crate::turtle::Turtle;
use crate::value::{source_contents, Value};

/// Everything one interpreter instance owns.
///
/// Only ever touched by the task currently running a script; the public
/// [`Interpreter`](crate::Interpreter) serializes access.
pub struct Machine {
    /// Variable scopes
    pub(crate) env: Environment,

    /// Procedure registry
    pub(crate) procedures: ProcedureRegistry,

    /// Uppercased names of the procedures being executed, innermost last
    pub(crate) call_stack: Vec<String>,

    /// `REPCOUNT` of the innermost running loop, -1 outside loops
    pub(crate) repcount: i64,

    /// `RANDOM` source
    pub(crate) prng: Prng,

    /// Seed the generator started from (reused by `RERANDOM`)
    pub(crate) seed: u32,

    /// Limits and the interrupt flag
    pub(crate) ctx: EvalContext,

    /// Graphics collaborator
    pub(crate) turtle: Box<dyn Turtle>,

    /// Text output
    pub(crate) console: Box<dyn Console>,

    /// Host callbacks
    pub(crate) hooks: Hooks,

    /// Most recently dispatched procedure name, for error hints
    pub(crate) last_call: Option<String>,
}

impl Machine {
    /// Fresh state with the primitive procedures installed.
    pub fn new(
        turtle: Box<dyn Turtle>,
        console: Box<dyn Console>,
        ctx: EvalContext,
        hooks: Hooks,
    ) -> Self {
        let seed = ctx.seed.unwrap_or_else(clock_seed);
        Self {
            env: Environment::with_max_call_depth(ctx.max_call_depth),
            procedures: ProcedureRegistry::with_prelude(),
            call_stack: Vec::new(),
            repcount: -1,
            prng: Prng::new(seed),
            seed,
            ctx,
            turtle,
            console,
            hooks,
            last_call: None,
        }
    }

    /// Clear what a previous (possibly cancelled) run may have left behind.
    pub(crate) fn reset_transient(&mut self) {
        self.call_stack.clear();
        self.repcount = -1;
        self.env.unwind_to_global();
        self.last_call = None;
    }

    /// Number of variable scopes, global included.
    pub fn scope_depth(&self) -> usize {
        self.env.depth()
    }

    /// Read-only view of the procedure registry.
    pub fn procedures(&self) -> &ProcedureRegistry {
        &self.procedures
    }

    // ═══════════════════════════════════════════════════════════════════
    // Errors
    // ═══════════════════════════════════════════════════════════════════

    /// The innermost executing procedure.
    pub(crate) fn current_proc(&self) -> Option<&str> {
        self.call_stack.last().map(String::as_str)
    }

    /// Build a Logo error from a message template.
    pub(crate) fn logo_error(
        &self,
        code: ErrorCode,
        template: &str,
        params: &[(&str, &str)],
    ) -> LogoError {
        let template = self.hooks.localize(template);
        let message = format_message(&template, params, self.current_proc());
        LogoError::new(code, message).with_proc(self.current_proc().map(str::to_string))
    }

    /// [`Machine::logo_error`] wrapped for propagation.
    pub(crate) fn error(&self, code: ErrorCode, template: &str, params: &[(&str, &str)]) -> EvalError {
        EvalError::Logo(self.logo_error(code, template, params))
    }

    // ═══════════════════════════════════════════════════════════════════
    // Input Coercion
    // ═══════════════════════════════════════════════════════════════════

    /// A numeric input.
    pub(crate) fn number(&self, value: &Value) -> Result<f64> {
        value.as_number().ok_or_else(|| {
            self.error(
                ErrorCode::BadInput,
                "I expected a number, did you miss something out?",
                &[],
            )
        })
    }

    /// An operand that may be missing (a procedure with no output).
    pub(crate) fn operand_number(&self, value: Option<Value>) -> Result<f64> {
        match value {
            Some(v) => self.number(&v),
            None => Err(self.error(
                ErrorCode::BadInput,
                "I expected a number, did you miss something out?",
                &[],
            )),
        }
    }

    /// An integer input (truncated).
    pub(crate) fn integer(&self, value: &Value) -> Result<i64> {
        Ok(self.number(value)?.trunc() as i64)
    }

    /// A word input, as text.
    pub(crate) fn text(&self, value: &Value) -> Result<String> {
        match value {
            Value::Word(w) => Ok(w.text().into_owned()),
            _ => Err(self.error(ErrorCode::BadInput, "{_PROC_}: Expected string", &[])),
        }
    }

    /// A list input.
    pub(crate) fn list<'v>(&self, value: &'v Value) -> Result<&'v [Value]> {
        value
            .as_list()
            .ok_or_else(|| self.error(ErrorCode::BadInput, "{_PROC_}: Expected list", &[]))
    }

    /// A truth value: the words `TRUE`/`FALSE` or a number (non-zero is
    /// true).
    pub(crate) fn truthy(&self, value: &Value) -> Result<bool> {
        if let Value::Word(w) = value {
            let text = w.text();
            if text.eq_ignore_ascii_case("true") {
                return Ok(true);
            }
            if text.eq_ignore_ascii_case("false") {
                return Ok(false);
            }
            if let Some(n) = w.as_number() {
                return Ok(n != 0.0);
            }
        }
        Err(self.error(ErrorCode::BadInput, "{_PROC_}: Expected TRUE or FALSE", &[]))
    }

    /// An input that must have produced a value.
    pub(crate) fn output(&self, value: Option<Value>) -> Result<Value> {
        value.ok_or_else(|| self.error(ErrorCode::NoOutput, "No output from procedure", &[]))
    }

    /// Whether `token` spells `keyword` (`END`, `ELSE`).
    pub(crate) fn is_keyword(&self, token: &Token, keyword: &str) -> bool {
        token
            .word_text()
            .is_some_and(|w| self.hooks.is_keyword(&w, keyword))
    }

    // ═══════════════════════════════════════════════════════════════════
    // Reading
    // ═══════════════════════════════════════════════════════════════════

    /// Tokenize script text.
    pub(crate) fn tokenize(&self, text: &str) -> Result<TokenStream> {
        reader::tokenize(text).map_err(|e| self.error(e.code(), e.template(), &[]))
    }

    /// Turn a list (or word) of instructions back into tokens.
    pub(crate) fn reparse(&self, value: &Value) -> Result<TokenStream> {
        match value {
            Value::List(items) => self.tokenize(&source_contents(items)),
            Value::Word(w) => self.tokenize(&w.text()),
            Value::Array(_) => Err(self.error(ErrorCode::BadInput, "{_PROC_}: Expected list", &[])),
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Scheduling
    // ═══════════════════════════════════════════════════════════════════

    /// Fail with the termination signal if `BYE` was requested.
    pub(crate) fn check_interrupt(&self) -> Result<()> {
        if self.ctx.take_interrupt() {
            tracing::debug!("termination requested");
            return Err(EvalError::ControlFlow(ControlFlow::Bye));
        }
        Ok(())
    }

    /// Give the host scheduler a turn.
    pub(crate) async fn cooperate(&self) {
        if self.ctx.yield_between_statements {
            tokio::task::yield_now().await;
        }
    }
}
