//! User procedure definition: `TO ... END`, `DEFINE` and `DEF`

use std::rc::Rc;

use crate::environment::{Arity, Behavior, Implementation, Procedure};
use crate::error::{ErrorCode, Result};
use crate::machine::Machine;
use crate::reader::{is_operator, tokens_to_source, Token, TokenStream};
use crate::value::{is_number, Value};

/// A procedure defined by a script.
#[derive(Debug, Clone, PartialEq)]
pub struct UserProcedure {
    /// Name as written in the definition
    pub name: String,

    /// Required inputs
    pub inputs: Vec<String>,

    /// Optional inputs with their default expressions
    pub optional: Vec<(String, Vec<Value>)>,

    /// Input collecting any remaining arguments as a list
    pub rest: Option<String>,

    /// Explicit number of inputs taken without parentheses
    pub default_arity: Option<usize>,

    /// Body
    pub block: Vec<Token>,
}

impl UserProcedure {
    /// Input bounds: the required inputs at least; everything the
    /// optional inputs accept at most, or no limit with a rest input.
    pub fn arity(&self) -> Arity {
        let required = self.inputs.len();
        let maximum = match self.rest {
            Some(_) => None,
            None => Some(required + self.optional.len()),
        };
        Arity::new(required, self.default_arity.unwrap_or(required), maximum)
    }

    /// Source text that redefines this procedure under `name`.
    pub fn definition(&self, name: &str) -> String {
        let mut def = format!("to {name}");
        for input in &self.inputs {
            def.push_str(&format!(" :{input}"));
        }
        for (input, default) in &self.optional {
            def.push_str(&format!(" [:{input}"));
            for value in default {
                def.push(' ');
                def.push_str(&value.to_source());
            }
            def.push(']');
        }
        if let Some(rest) = &self.rest {
            def.push_str(&format!(" [:{rest}]"));
        }
        if let Some(n) = self.default_arity {
            def.push_str(&format!(" {n}"));
        }
        def.push_str("\n  ");
        def.push_str(&tokens_to_source(&self.block));
        def.push_str("\nend");
        def
    }

    fn check_default_arity(&self, m: &Machine) -> Result<()> {
        let Some(n) = self.default_arity else {
            return Ok(());
        };
        let too_many = self.rest.is_none() && n > self.inputs.len() + self.optional.len();
        if n < self.inputs.len() || too_many {
            return Err(bad_default(m, &self.name));
        }
        Ok(())
    }
}

fn bad_default(m: &Machine, name: &str) -> crate::error::EvalError {
    m.error(
        ErrorCode::BadInput,
        "{_PROC_}: Bad default number of inputs for {name:U}",
        &[("name", name)],
    )
}

/// A default input count written as a number: non-negative and whole.
fn parse_default_arity(m: &Machine, name: &str, text: &str) -> Result<usize> {
    let n: f64 = text.parse().unwrap_or(f64::NAN);
    if n >= 0.0 && n.fract() == 0.0 {
        Ok(n as usize)
    } else {
        Err(bad_default(m, name))
    }
}

fn variable_name(value: &Value) -> Option<String> {
    let word = value.as_word()?;
    word.text().strip_prefix(':').map(str::to_string)
}

/// Which part of an input list is being read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Phase {
    Required,
    Optional,
    Rest,
    DefaultArity,
    Body,
}

impl Machine {
    /// Install a user procedure, replacing any earlier user definition.
    pub(crate) fn define_procedure(&mut self, procedure: UserProcedure) -> Result<()> {
        if self.procedures.is_primitive(&procedure.name) {
            return Err(self.error(
                ErrorCode::IsPrimitive,
                "{_PROC_}: Can't redefine primitive {name:U}",
                &[("name", procedure.name.as_str())],
            ));
        }
        procedure.check_default_arity(self)?;

        let name = procedure.name.clone();
        let text = procedure.definition(&name.to_lowercase());
        tracing::debug!(procedure = %name, arity = ?procedure.arity(), "define");

        self.procedures.insert(
            &name,
            Rc::new(Procedure {
                arity: procedure.arity(),
                behavior: Behavior::Ordinary(Implementation::User(Rc::new(procedure))),
                primitive: false,
            }),
        );
        self.hooks.defined(&name, &text);
        Ok(())
    }

    /// Source text of every user procedure, in definition order.
    pub(crate) fn procdefs(&self) -> String {
        self.procedures
            .iter()
            .filter(|(_, p)| !p.primitive)
            .filter_map(|(name, p)| p.user().map(|user| user.definition(name)))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Source text of one user procedure.
    pub(crate) fn definition_of(&self, name: &str) -> Result<String> {
        let Some(procedure) = self.procedures.get(name) else {
            return Err(self.error(
                ErrorCode::BadProc,
                "{_PROC_}: I don't know how to {name:U}",
                &[("name", name)],
            ));
        };
        match procedure.user() {
            Some(user) if !procedure.primitive => Ok(user.definition(&name.to_lowercase())),
            _ => Err(self.error(
                ErrorCode::IsPrimitive,
                "{_PROC_}: Can't show definition of primitive {name:U}",
                &[("name", name)],
            )),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Primitives
// ═══════════════════════════════════════════════════════════════════════

/// `TO name :in [:opt expr] [:rest] n ... END`
pub(crate) fn special_to(m: &mut Machine, tokens: &mut TokenStream) -> Result<()> {
    let name = match tokens.next().as_ref().and_then(Token::word_text) {
        Some(name) if !is_number(&name) && !is_operator(&name) => name.into_owned(),
        _ => return Err(m.error(ErrorCode::BadInput, "TO: Expected identifier", &[])),
    };

    let mut procedure = UserProcedure {
        name,
        inputs: Vec::new(),
        optional: Vec::new(),
        rest: None,
        default_arity: None,
        block: Vec::new(),
    };
    let mut phase = Phase::Required;
    let mut saw_end = false;

    for token in tokens.by_ref() {
        if m.is_keyword(&token, "END") {
            saw_end = true;
            break;
        }

        if phase == Phase::Required {
            let input = match &token {
                Token::Atom(value) => variable_name(value),
                Token::UnaryMinus => None,
            };
            if let Some(input) = input {
                procedure.inputs.push(input);
                continue;
            }
            phase = Phase::Optional;
        }

        let list = match &token {
            Token::Atom(Value::List(items)) => Some(items.as_slice()),
            _ => None,
        };

        if phase == Phase::Optional {
            if let Some([first, default @ ..]) = list {
                if let (Some(input), false) = (variable_name(first), default.is_empty()) {
                    procedure.optional.push((input, default.to_vec()));
                    continue;
                }
            }
            phase = Phase::Rest;
        }

        if phase == Phase::Rest {
            phase = Phase::DefaultArity;
            if let Some([only]) = list {
                if let Some(input) = variable_name(only) {
                    procedure.rest = Some(input);
                    continue;
                }
            }
        }

        if phase == Phase::DefaultArity {
            phase = Phase::Body;
            if let Some(text) = token.word_text().filter(|t| is_number(t)) {
                procedure.default_arity = Some(parse_default_arity(m, &procedure.name, &text)?);
                continue;
            }
        }

        procedure.block.push(token);
    }

    if !saw_end {
        return Err(m.error(ErrorCode::BadInput, "TO: Expected END", &[]));
    }
    m.define_procedure(procedure)
}

/// `DEFINE "name [[inputs] [body]]`
pub(crate) fn prim_define(m: &mut Machine, args: Vec<Value>) -> Result<Option<Value>> {
    let name = m.text(&args[0])?;
    let parts = m.list(&args[1])?;
    let [inputs, body] = parts else {
        return Err(m.error(ErrorCode::BadInput, "{_PROC_}: Expected list of length 2", &[]));
    };
    let block: Vec<Token> = m.reparse(body)?.collect();

    let mut procedure = UserProcedure {
        name,
        inputs: Vec::new(),
        optional: Vec::new(),
        rest: None,
        default_arity: None,
        block,
    };
    let unexpected = |m: &Machine| m.error(ErrorCode::BadInput, "{_PROC_}: Unexpected inputs", &[]);
    let bare = |value: &Value| {
        value.as_word().map(|w| {
            let text = w.text();
            text.strip_prefix(':').unwrap_or(&text).to_string()
        })
    };

    let mut phase = Phase::Required;
    for atom in m.list(inputs)? {
        if phase == Phase::Required {
            if let Some(input) = bare(atom) {
                procedure.inputs.push(input);
                continue;
            }
            phase = Phase::Optional;
        }

        let list = atom.as_list();

        if phase == Phase::Optional {
            if let Some([first, default @ ..]) = list {
                if let (Some(input), false) = (bare(first), default.is_empty()) {
                    procedure.optional.push((input, default.to_vec()));
                    continue;
                }
            }
            phase = Phase::Rest;
        }

        if phase == Phase::Rest {
            phase = Phase::DefaultArity;
            if let Some([only]) = list {
                if let Some(input) = bare(only) {
                    procedure.rest = Some(input);
                    continue;
                }
            }
        }

        if phase == Phase::DefaultArity {
            phase = Phase::Body;
            if let Some(text) = atom.as_word().map(|w| w.text()).filter(|t| is_number(t)) {
                procedure.default_arity = Some(parse_default_arity(m, &procedure.name, &text)?);
                continue;
            }
        }

        return Err(unexpected(m));
    }

    m.define_procedure(procedure)?;
    Ok(None)
}

/// `DEF "name`
pub(crate) fn prim_def(m: &mut Machine, args: Vec<Value>) -> Result<Option<Value>> {
    let name = m.text(&args[0])?;
    m.definition_of(&name).map(|text| Some(Value::word(text)))
}
