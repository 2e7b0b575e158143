//! # logo-engine
//!
//! An embeddable interpreter for a Logo dialect: words, lists and arrays,
//! user procedures with optional and rest inputs, dynamic scoping, and
//! turtle graphics driven through a host-supplied [`Turtle`].
//!
//! ## Architecture
//!
//! - **Reader**: source text to a [`TokenStream`]
//! - **Parser**: tokens to [`Deferred`] expressions, resolving procedure
//!   arity as it goes
//! - **Executor**: runs statements one at a time, yielding to the host
//!   between them and waiting on turtle motions
//! - **Prelude**: the primitive procedures
//!
//! The public entry point is [`Interpreter`]; everything else is exposed
//! for hosts that want to supply their own turtle, console or primitives.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod color;
pub mod console;
pub mod context;
pub mod environment;
pub mod error;
pub mod eval;
pub mod hooks;
pub mod interpreter;
pub mod machine;
pub mod prng;
pub mod reader;
mod stack;
pub mod turtle;
pub mod value;

// Re-export main types
pub use console::{BufferConsole, Console, NullConsole};
pub use context::EvalContext;
pub use environment::{Arity, Binding, Environment, ProcedureRegistry};
pub use error::{ErrorCode, EvalError, LogoError, Result};
pub use eval::{ControlFlow, Deferred, Evaluate};
pub use hooks::Hooks;
pub use interpreter::{ByeHandle, Interpreter, InterpreterBuilder, RunOptions};
pub use machine::Machine;
pub use reader::{tokenize, Token, TokenStream};
pub use turtle::{Motion, RecordingTurtle, Turtle, TurtleCommand, TurtleLog};
pub use value::{LogoArray, Value, Word};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
