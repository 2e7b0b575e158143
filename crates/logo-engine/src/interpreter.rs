//! The host-facing interpreter handle

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::console::{Console, NullConsole};
use crate::context::EvalContext;
use crate::error::{EvalError, Result};
use crate::eval::ControlFlow;
use crate::hooks::Hooks;
use crate::machine::Machine;
use crate::turtle::{RecordingTurtle, Turtle};
use crate::value::Value;

/// Per-run options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Let the last statement produce a value instead of failing with
    /// "I don't know what to do with ..."
    pub return_result: bool,
}

impl RunOptions {
    /// Options for evaluating an expression (REPL style).
    pub fn returning() -> Self {
        Self {
            return_result: true,
        }
    }
}

/// A handle that can request termination from any thread.
#[derive(Debug, Clone)]
pub struct ByeHandle {
    interrupt: Arc<AtomicBool>,
}

impl ByeHandle {
    /// Ask the running script to stop at its next statement.
    pub fn bye(&self) {
        self.interrupt.store(true, Ordering::Relaxed);
    }
}

/// An embeddable Logo interpreter.
///
/// Scripts run one at a time: concurrent calls to [`Interpreter::run`]
/// queue up in call order, and so do the other methods that read or
/// change interpreter state. Variables and procedures persist from one
/// run to the next.
///
/// # Example
///
/// ```
/// use logo_engine::{Interpreter, RunOptions, Value};
///
/// let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
/// rt.block_on(async {
///     let logo = Interpreter::new();
///     logo.run("to square :n\noutput :n * :n\nend").await.unwrap();
///     let result = logo.run_with("square 7", RunOptions::returning()).await.unwrap();
///     assert_eq!(result, Some(Value::number(49.0)));
/// });
/// ```
pub struct Interpreter {
    machine: Mutex<Machine>,
    interrupt: Arc<AtomicBool>,
}

impl Interpreter {
    /// An interpreter with a recording turtle and no text output.
    pub fn new() -> Self {
        InterpreterBuilder::new().build()
    }

    /// Start configuring an interpreter.
    pub fn builder() -> InterpreterBuilder {
        InterpreterBuilder::new()
    }

    /// Run a script with default options.
    pub async fn run(&self, text: &str) -> Result<Option<Value>> {
        self.run_with(text, RunOptions::default()).await
    }

    /// Run a script.
    ///
    /// Resolves with the script's value (only ever present with
    /// [`RunOptions::return_result`]) or its first error. `BYE` ends the
    /// script without an error.
    #[tracing::instrument(name = "run", level = "debug", skip_all, fields(len = text.len()))]
    pub async fn run_with(&self, text: &str, options: RunOptions) -> Result<Option<Value>> {
        let mut machine = self.machine.lock().await;
        machine.reset_transient();

        let result = match machine.tokenize(text) {
            Ok(tokens) => machine.execute(tokens, options.return_result).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(value) => Ok(value),
            Err(EvalError::ControlFlow(ControlFlow::Bye)) => {
                tracing::debug!("terminated");
                Ok(None)
            }
            Err(EvalError::ControlFlow(ControlFlow::Return { .. })) => Err(EvalError::Internal(
                "procedure exit escaped to the top level".to_string(),
            )),
            Err(e) => {
                tracing::debug!(error = %e, code = ?e.code(), "failed");
                Err(e)
            }
        }
    }

    /// Request termination of the running script.
    ///
    /// With nothing running, the next script ends before its first
    /// statement.
    pub fn bye(&self) {
        self.interrupt.store(true, Ordering::Relaxed);
    }

    /// A `Send` handle for requesting termination from elsewhere.
    pub fn bye_handle(&self) -> ByeHandle {
        ByeHandle {
            interrupt: Arc::clone(&self.interrupt),
        }
    }

    /// Source text of every user procedure, separated by blank lines.
    pub async fn procdefs(&self) -> String {
        self.machine.lock().await.procdefs()
    }

    /// Make `new_name` another name for `old_name`. Nothing happens when
    /// `old_name` is undefined.
    pub async fn copydef(&self, new_name: &str, old_name: &str) {
        self.machine.lock().await.procedures.alias(new_name, old_name);
    }

    /// Forget every user procedure.
    pub async fn clear_procedures(&self) {
        self.machine.lock().await.procedures.clear_user();
    }

    /// Source text of one user procedure.
    pub async fn definition(&self, name: &str) -> Result<String> {
        self.machine.lock().await.definition_of(name)
    }

    /// Number of variable scopes, global included; 1 between runs.
    pub async fn scope_depth(&self) -> usize {
        self.machine.lock().await.scope_depth()
    }

    /// A variable's value.
    pub async fn variable(&self, name: &str) -> Option<Value> {
        self.machine.lock().await.env.get(name).cloned()
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Interpreter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interpreter")
            .field("interrupted", &self.interrupt.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

/// Configures an [`Interpreter`].
pub struct InterpreterBuilder {
    turtle: Option<Box<dyn Turtle>>,
    console: Option<Box<dyn Console>>,
    context: EvalContext,
    hooks: Hooks,
}

impl InterpreterBuilder {
    /// Defaults: a [`RecordingTurtle`], a [`NullConsole`] and
    /// [`EvalContext::default`].
    pub fn new() -> Self {
        Self {
            turtle: None,
            console: None,
            context: EvalContext::default(),
            hooks: Hooks::default(),
        }
    }

    /// The graphics collaborator.
    pub fn turtle(mut self, turtle: impl Turtle + 'static) -> Self {
        self.turtle = Some(Box::new(turtle));
        self
    }

    /// Where text output goes.
    pub fn console(mut self, console: impl Console + 'static) -> Self {
        self.console = Some(Box::new(console));
        self
    }

    /// Limits, seed and scheduling.
    pub fn context(mut self, context: EvalContext) -> Self {
        self.context = context;
        self
    }

    /// Translate message templates. Returning `None` keeps the English.
    pub fn localize(mut self, f: impl Fn(&str) -> Option<String> + 'static) -> Self {
        self.hooks.localize = Some(Box::new(f));
        self
    }

    /// Accept other spellings of `END` and `ELSE`. Receives the word
    /// uppercased.
    pub fn keyword_alias(mut self, f: impl Fn(&str) -> Option<String> + 'static) -> Self {
        self.hooks.keyword_alias = Some(Box::new(f));
        self
    }

    /// Map colour names before they reach the turtle.
    pub fn color_alias(mut self, f: impl Fn(&str) -> Option<String> + 'static) -> Self {
        self.hooks.color_alias = Some(Box::new(f));
        self
    }

    /// Called with the name and source text of each new definition.
    pub fn on_define(mut self, f: impl Fn(&str, &str) + 'static) -> Self {
        self.hooks.on_define = Some(Box::new(f));
        self
    }

    /// Build the interpreter.
    pub fn build(self) -> Interpreter {
        let interrupt = Arc::clone(&self.context.interrupt);
        let turtle = self
            .turtle
            .unwrap_or_else(|| Box::new(RecordingTurtle::new()));
        let console = self.console.unwrap_or_else(|| Box::new(NullConsole));
        Interpreter {
            machine: Mutex::new(Machine::new(turtle, console, self.context, self.hooks)),
            interrupt,
        }
    }
}

impl Default for InterpreterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for InterpreterBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterpreterBuilder")
            .field("context", &self.context)
            .field("hooks", &self.hooks)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[tokio::test]
    async fn test_bye_is_not_an_error() {
        let logo = Interpreter::new();
        logo.run("make \"x 1 bye make \"x 2").await.unwrap();
        assert_eq!(logo.variable("x").await, Some(Value::number(1.0)));
    }

    #[tokio::test]
    async fn test_bye_while_idle_ends_next_run() {
        let logo = Interpreter::new();
        logo.bye();
        logo.run("make \"x 1").await.unwrap();
        assert_eq!(logo.variable("x").await, None);
        logo.run("make \"x 2").await.unwrap();
        assert_eq!(logo.variable("x").await, Some(Value::number(2.0)));
    }

    #[tokio::test]
    async fn test_parse_error_runs_nothing() {
        let logo = Interpreter::new();
        let err = logo.run("make \"x 1 print [oops").await.unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::BadBracket));
        assert_eq!(logo.variable("x").await, None);
    }

    #[tokio::test]
    async fn test_localized_messages() {
        let logo = Interpreter::builder()
            .localize(|template| {
                (template == "I don't know how to {name:U}")
                    .then(|| "Je ne sais pas {name:U}".to_string())
            })
            .build();
        let err = logo.run("avance 10").await.unwrap_err();
        assert_eq!(err.to_string(), "Je ne sais pas AVANCE");
    }

    #[tokio::test]
    async fn test_keyword_alias_and_copydef() {
        let logo = Interpreter::builder()
            .keyword_alias(|word| (word == "FIN").then(|| "END".to_string()))
            .build();
        logo.copydef("pour", "to").await;
        logo.run("pour carre :n\noutput :n * :n\nfin").await.unwrap();
        let result = logo.run_with("carre 3", RunOptions::returning()).await.unwrap();
        assert_eq!(result, Some(Value::number(9.0)));
    }

    #[tokio::test]
    async fn test_clear_procedures_keeps_primitives() {
        let logo = Interpreter::new();
        logo.run("to a\nend\nto b\nend").await.unwrap();
        assert_eq!(logo.procdefs().await, "to a\n  \nend\n\nto b\n  \nend");
        logo.clear_procedures().await;
        assert_eq!(logo.procdefs().await, "");
        logo.run("fd 1").await.unwrap();
    }
}
