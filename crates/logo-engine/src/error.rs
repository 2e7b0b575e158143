//! Error types for Logo evaluation

use std::fmt;

use thiserror::Error;

use crate::eval::ControlFlow;
use crate::value::Value;

/// Stable numeric error codes reported to hosts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ErrorCode {
    /// A primitive received an input it can't use
    BadInput = 4,
    /// An expression produced no value where one was needed
    NoOutput = 5,
    /// Fewer inputs than the procedure's minimum
    NotEnoughInputs = 6,
    /// More inputs than the procedure's maximum
    TooManyInputs = 8,
    /// A value was produced with nothing to consume it
    BadOutput = 9,
    /// A `(` without its `)`
    MissingParen = 10,
    /// Reference to an unbound variable
    BadVar = 11,
    /// A `)` without its `(`
    BadParen = 12,
    /// Name already in use
    AlreadyDefined = 15,
    /// `THROW` with no matching `CATCH`
    ThrowError = 21,
    /// Attempt to redefine a primitive
    IsPrimitive = 22,
    /// Unknown procedure
    BadProc = 24,
    /// Test result is missing
    NoTest = 25,
    /// Unbalanced `[` or `]`
    BadBracket = 26,
    /// Unbalanced `{` or `}`
    BadBrace = 27,
    /// Raised by the script via `THROW "ERROR`
    UserGenerated = 35,
    /// Procedure name glued to a number, e.g. `fd10`
    MissingSpace = 39,
}

impl ErrorCode {
    /// The numeric code.
    pub fn code(self) -> u16 {
        self as u16
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A Logo-level error, catchable by `CATCH` through its tag.
#[derive(Error, Debug, Clone)]
#[error("{message}")]
pub struct LogoError {
    /// Stable error code
    pub code: ErrorCode,

    /// Rendered (and localized) message
    pub message: String,

    /// Tag matched by `CATCH`; `ERROR` for everything but `THROW`
    pub tag: String,

    /// Payload handed to the catching `CATCH`
    pub value: Option<Value>,

    /// Procedure executing when the error was raised
    pub proc_name: Option<String>,
}

impl LogoError {
    /// Tag carried by ordinary errors.
    pub const ERROR_TAG: &'static str = "ERROR";

    /// Create an error with the default `ERROR` tag.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            tag: Self::ERROR_TAG.to_string(),
            value: None,
            proc_name: None,
        }
    }

    /// Attach a payload.
    pub fn with_value(mut self, value: Option<Value>) -> Self {
        self.value = value;
        self
    }

    /// Attach a tag.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    /// Record the procedure that raised the error.
    pub fn with_proc(mut self, proc_name: Option<String>) -> Self {
        self.proc_name = proc_name;
        self
    }

    /// Tags compare case-insensitively.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tag.eq_ignore_ascii_case(tag)
    }
}

/// Everything that can unwind an evaluation.
#[derive(Error, Debug)]
pub enum EvalError {
    /// An error visible to the script and the host
    #[error(transparent)]
    Logo(#[from] LogoError),

    /// Non-local exit (OUTPUT, STOP, BYE); never escapes `Interpreter::run`
    #[error("control flow escaped its boundary: {0:?}")]
    ControlFlow(ControlFlow),

    /// Procedure nesting exceeded the configured limit
    #[error("Stack overflow: call depth {depth} exceeds maximum {max}")]
    StackOverflow {
        /// Depth reached
        depth: usize,
        /// Configured maximum
        max: usize,
    },

    /// A broken interpreter invariant, not a script error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl EvalError {
    /// The error code, for errors that carry one.
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            EvalError::Logo(e) => Some(e.code),
            _ => None,
        }
    }

    /// The Logo error, if this is one.
    pub fn as_logo(&self) -> Option<&LogoError> {
        match self {
            EvalError::Logo(e) => Some(e),
            _ => None,
        }
    }
}

/// Result type alias for evaluation
pub type Result<T> = std::result::Result<T, EvalError>;

/// Expand a message template.
///
/// Placeholders are `{key}`, `{key:U}` (uppercased), `{key:L}` (lowercased)
/// and `{_PROC_}`, the procedure currently executing. Unknown keys are kept
/// verbatim.
pub fn format_message(template: &str, params: &[(&str, &str)], current_proc: Option<&str>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            out.push_str(&rest[open..]);
            return out;
        };
        let inner = &after[..close];
        let (key, modifier) = match inner.split_once(':') {
            Some((key, modifier)) => (key, Some(modifier)),
            None => (inner, None),
        };
        let well_formed = !key.is_empty()
            && key.chars().all(|c| c.is_alphanumeric() || c == '_')
            && matches!(modifier, None | Some("U") | Some("L"));

        let replacement = if !well_formed {
            None
        } else if key == "_PROC_" {
            Some(current_proc.unwrap_or_default().to_string())
        } else {
            params
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        };

        match replacement {
            Some(s) => match modifier {
                Some("U") => out.push_str(&s.to_uppercase()),
                Some("L") => out.push_str(&s.to_lowercase()),
                _ => out.push_str(&s),
            },
            None => {
                out.push('{');
                out.push_str(inner);
                out.push('}');
            }
        }
        rest = &after[close + 1..];
    }

    out.push_str(rest);
    out
}
