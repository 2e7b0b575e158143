//! Words, lists and arrays: constructors, selectors, mutators, predicates

use crate::environment::{Arity, ProcedureRegistry};
use crate::error::{ErrorCode, EvalError, Result};
use crate::eval::EvalResult;
use crate::machine::Machine;
use crate::value::{LogoArray, Value};

pub(super) fn register(registry: &mut ProcedureRegistry) {
    // Constructors
    registry.primitive(&["word"], Arity::new(0, 2, None), word);
    registry.primitive(&["list"], Arity::new(0, 2, None), list);
    registry.primitive(&["sentence", "se"], Arity::new(0, 2, None), sentence);
    registry.primitive(&["fput"], Arity::fixed(2), fput);
    registry.primitive(&["lput"], Arity::fixed(2), lput);
    registry.primitive(&["array"], Arity::new(1, 1, Some(2)), array);
    registry.primitive(&["listtoarray"], Arity::new(1, 1, Some(2)), list_to_array);
    registry.primitive(&["arraytolist"], Arity::fixed(1), array_to_list);

    // Selectors
    registry.primitive(&["first"], Arity::fixed(1), first);
    registry.primitive(&["last"], Arity::fixed(1), last);
    registry.primitive(&["butfirst", "bf"], Arity::fixed(1), butfirst);
    registry.primitive(&["butlast", "bl"], Arity::fixed(1), butlast);
    registry.primitive(&["item"], Arity::fixed(2), item);
    registry.primitive(&["count"], Arity::fixed(1), count);

    // Mutators
    registry.primitive(&["setitem"], Arity::fixed(3), setitem);

    // Predicates
    registry.primitive(&["empty?", "emptyp"], Arity::fixed(1), is_empty);
    registry.primitive(&["word?", "wordp"], Arity::fixed(1), is_word);
    registry.primitive(&["list?", "listp"], Arity::fixed(1), is_list);
    registry.primitive(&["array?", "arrayp"], Arity::fixed(1), is_array);
    registry.primitive(&["number?", "numberp"], Arity::fixed(1), is_number);
    registry.primitive(&["equal?", "equalp"], Arity::fixed(2), equal);
    registry.primitive(&["member?", "memberp"], Arity::fixed(2), member);
}

// ═══════════════════════════════════════════════════════════════════════
// Sequences
// ═══════════════════════════════════════════════════════════════════════

/// A word, list or array viewed as a sequence of elements. Words are
/// sequences of one-character words.
enum Seq {
    Chars(Vec<char>),
    Items(Vec<Value>),
}

impl Seq {
    fn of(value: &Value) -> Self {
        match value {
            Value::Word(w) => Seq::Chars(w.text().chars().collect()),
            Value::List(items) => Seq::Items(items.to_vec()),
            Value::Array(array) => Seq::Items(array.to_vec()),
        }
    }

    fn len(&self) -> usize {
        match self {
            Seq::Chars(chars) => chars.len(),
            Seq::Items(items) => items.len(),
        }
    }

    fn get(&self, offset: usize) -> Option<Value> {
        match self {
            Seq::Chars(chars) => chars.get(offset).map(|c| Value::word(c.to_string())),
            Seq::Items(items) => items.get(offset).cloned(),
        }
    }
}

fn non_empty(m: &Machine, value: &Value) -> Result<Seq> {
    let seq = Seq::of(value);
    if seq.len() == 0 {
        return Err(m.error(ErrorCode::BadInput, "{_PROC_}: Expected non-empty list", &[]));
    }
    Ok(seq)
}

fn out_of_bounds(m: &Machine) -> EvalError {
    m.error(ErrorCode::BadInput, "{_PROC_}: Index out of bounds", &[])
}

/// A word or list with its first or last element dropped; same type as
/// the input.
fn drop_one(m: &Machine, value: &Value, front: bool) -> EvalResult {
    if value.is_array() {
        return Err(m.error(ErrorCode::BadInput, "{_PROC_}: Expected list", &[]));
    }
    let seq = non_empty(m, value)?;
    let range = if front { 1..seq.len() } else { 0..seq.len() - 1 };
    Ok(Some(match seq {
        Seq::Chars(chars) => Value::word(chars[range].iter().collect::<String>()),
        Seq::Items(items) => Value::list(items[range].to_vec()),
    }))
}

// ═══════════════════════════════════════════════════════════════════════
// Constructors
// ═══════════════════════════════════════════════════════════════════════

fn word(m: &mut Machine, args: Vec<Value>) -> EvalResult {
    let mut out = String::new();
    for arg in &args {
        out.push_str(&m.text(arg)?);
    }
    Ok(Some(Value::word(out)))
}

fn list(_m: &mut Machine, args: Vec<Value>) -> EvalResult {
    Ok(Some(Value::list(args)))
}

/// Lists are spliced in one level deep; everything else is appended.
fn sentence(_m: &mut Machine, args: Vec<Value>) -> EvalResult {
    let mut out = Vec::new();
    for arg in args {
        match arg {
            Value::List(items) => out.extend(items.iter().cloned()),
            other => out.push(other),
        }
    }
    Ok(Some(Value::list(out)))
}

fn fput(m: &mut Machine, args: Vec<Value>) -> EvalResult {
    match &args[1] {
        Value::List(items) => {
            let mut out = Vec::with_capacity(items.len() + 1);
            out.push(args[0].clone());
            out.extend(items.iter().cloned());
            Ok(Some(Value::list(out)))
        }
        Value::Word(rest) => Ok(Some(Value::word(format!("{}{}", m.text(&args[0])?, rest.text())))),
        Value::Array(_) => Err(m.error(ErrorCode::BadInput, "{_PROC_}: Expected list", &[])),
    }
}

fn lput(m: &mut Machine, args: Vec<Value>) -> EvalResult {
    match &args[1] {
        Value::List(items) => {
            let mut out = items.to_vec();
            out.push(args[0].clone());
            Ok(Some(Value::list(out)))
        }
        Value::Word(rest) => Ok(Some(Value::word(format!("{}{}", rest.text(), m.text(&args[0])?)))),
        Value::Array(_) => Err(m.error(ErrorCode::BadInput, "{_PROC_}: Expected list", &[])),
    }
}

fn origin(m: &Machine, args: &[Value]) -> Result<i64> {
    match args.get(1) {
        Some(value) => m.integer(value),
        None => Ok(1),
    }
}

/// Largest size `ARRAY` will allocate.
const MAX_ARRAY_SIZE: usize = 1 << 24;

/// `ARRAY size` or `(ARRAY size origin)`; elements start as empty lists.
fn array(m: &mut Machine, args: Vec<Value>) -> EvalResult {
    let size = m.number(&args[0])?;
    if size < 0.0 || size.fract() != 0.0 {
        return Err(m.error(
            ErrorCode::BadInput,
            "{_PROC_}: Array size must be a non-negative integer",
            &[],
        ));
    }
    if size > MAX_ARRAY_SIZE as f64 {
        return Err(m.error(ErrorCode::BadInput, "{_PROC_}: Array size too large", &[]));
    }
    let origin = origin(m, &args)?;
    Ok(Some(Value::Array(LogoArray::new(size as usize, origin))))
}

fn list_to_array(m: &mut Machine, args: Vec<Value>) -> EvalResult {
    let items = m.list(&args[0])?.to_vec();
    let origin = origin(m, &args)?;
    Ok(Some(Value::array(items, origin)))
}

fn array_to_list(m: &mut Machine, args: Vec<Value>) -> EvalResult {
    match args[0].as_array() {
        Some(array) => Ok(Some(Value::list(array.to_vec()))),
        None => Err(m.error(ErrorCode::BadInput, "{_PROC_}: Expected array", &[])),
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Selectors
// ═══════════════════════════════════════════════════════════════════════

fn first(m: &mut Machine, args: Vec<Value>) -> EvalResult {
    let seq = non_empty(m, &args[0])?;
    Ok(seq.get(0))
}

fn last(m: &mut Machine, args: Vec<Value>) -> EvalResult {
    let seq = non_empty(m, &args[0])?;
    Ok(seq.get(seq.len() - 1))
}

fn butfirst(m: &mut Machine, args: Vec<Value>) -> EvalResult {
    drop_one(m, &args[0], true)
}

fn butlast(m: &mut Machine, args: Vec<Value>) -> EvalResult {
    drop_one(m, &args[0], false)
}

/// 1-based for words and lists; arrays count from their origin.
fn item(m: &mut Machine, args: Vec<Value>) -> EvalResult {
    let index = m.integer(&args[0])?;
    if let Value::Array(array) = &args[1] {
        return array.item(index).map(Some).ok_or_else(|| out_of_bounds(m));
    }
    let seq = Seq::of(&args[1]);
    index
        .checked_sub(1)
        .and_then(|offset| usize::try_from(offset).ok())
        .and_then(|offset| seq.get(offset))
        .map(Some)
        .ok_or_else(|| out_of_bounds(m))
}

fn count(_m: &mut Machine, args: Vec<Value>) -> EvalResult {
    Ok(Some(Value::number(Seq::of(&args[0]).len() as f64)))
}

// ═══════════════════════════════════════════════════════════════════════
// Mutators
// ═══════════════════════════════════════════════════════════════════════

/// `SETITEM index array value`. An array can't be stored inside itself.
fn setitem(m: &mut Machine, args: Vec<Value>) -> EvalResult {
    let index = m.integer(&args[0])?;
    let Some(array) = args[1].as_array() else {
        return Err(m.error(ErrorCode::BadInput, "{_PROC_}: Expected array", &[]));
    };
    let value = &args[2];
    if value.contains(&args[1]) {
        return Err(m.error(ErrorCode::BadInput, "{_PROC_}: Can't create circular array", &[]));
    }
    if !array.set_item(index, value.deep_copy()) {
        return Err(out_of_bounds(m));
    }
    Ok(None)
}

// ═══════════════════════════════════════════════════════════════════════
// Predicates
// ═══════════════════════════════════════════════════════════════════════

fn is_empty(_m: &mut Machine, args: Vec<Value>) -> EvalResult {
    Ok(Some(Value::boolean(args[0].is_empty())))
}

fn is_word(_m: &mut Machine, args: Vec<Value>) -> EvalResult {
    Ok(Some(Value::boolean(args[0].is_word())))
}

fn is_list(_m: &mut Machine, args: Vec<Value>) -> EvalResult {
    Ok(Some(Value::boolean(args[0].is_list())))
}

fn is_array(_m: &mut Machine, args: Vec<Value>) -> EvalResult {
    Ok(Some(Value::boolean(args[0].is_array())))
}

fn is_number(_m: &mut Machine, args: Vec<Value>) -> EvalResult {
    Ok(Some(Value::boolean(args[0].as_number().is_some())))
}

fn equal(_m: &mut Machine, args: Vec<Value>) -> EvalResult {
    Ok(Some(Value::boolean(args[0] == args[1])))
}

/// `MEMBER? thing container`: an element of a list or array, or a
/// character of a word.
fn member(_m: &mut Machine, args: Vec<Value>) -> EvalResult {
    let thing = &args[0];
    let found = match &args[1] {
        Value::Word(w) => thing
            .as_word()
            .map(|t| t.text())
            .is_some_and(|t| t.chars().count() == 1 && w.text().contains(&*t)),
        container => match Seq::of(container) {
            Seq::Items(items) => items.iter().any(|item| item == thing),
            Seq::Chars(_) => false,
        },
    };
    Ok(Some(Value::boolean(found)))
}

#[cfg(test)]
mod tests {
    use crate::environment::prelude::testing::harness;
    use crate::value::Value;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_constructors() {
        let mut h = harness();
        assert_eq!(h.value("word \"ab \"cd").await, Value::word("abcd"));
        assert_eq!(h.value("(word \"a \"b \"c)").await, Value::word("abc"));
        assert_eq!(h.value("list 1 [2]").await.to_string(), "[1 [2]]");
        assert_eq!(h.value("se 1 [2 3]").await.to_string(), "[1 2 3]");
        assert_eq!(h.value("fput 0 [1 2]").await.to_string(), "[0 1 2]");
        assert_eq!(h.value("lput 3 [1 2]").await.to_string(), "[1 2 3]");
    }

    #[tokio::test]
    async fn test_selectors_on_words_and_lists() {
        let mut h = harness();
        assert_eq!(h.value("first [a b c]").await, Value::word("a"));
        assert_eq!(h.value("last \"xyz").await, Value::word("z"));
        assert_eq!(h.value("bf [a b c]").await.to_string(), "[b c]");
        assert_eq!(h.value("butlast \"hello").await, Value::word("hell"));
        assert_eq!(h.value("item 2 [a b c]").await, Value::word("b"));
        assert_eq!(h.value("count [a [b c] d]").await, Value::number(3.0));
        assert_eq!(h.value("count \"four").await, Value::number(4.0));
    }

    #[tokio::test]
    async fn test_item_out_of_bounds() {
        let mut h = harness();
        assert_eq!(h.message("item 4 [a b c]").await, "ITEM: Index out of bounds");
        assert_eq!(h.message("item 0 \"abc").await, "ITEM: Index out of bounds");
        assert_eq!(h.message("first []").await, "FIRST: Expected non-empty list");
        assert_eq!(h.message("item -1e300 [a b]").await, "ITEM: Index out of bounds");
        assert_eq!(h.message("item 1e300 \"ab").await, "ITEM: Index out of bounds");
        assert_eq!(h.message("item -1e300 {a b}@0").await, "ITEM: Index out of bounds");
    }

    #[tokio::test]
    async fn test_arrays_use_origin_and_share() {
        let mut h = harness();
        h.run("make \"a {10 20 30}@0 make \"b :a").await.unwrap();
        assert_eq!(h.value("item 0 :a").await, Value::number(10.0));
        h.run("setitem 2 :b \"z").await.unwrap();
        assert_eq!(h.value("item 2 :a").await, Value::word("z"));
        assert_eq!(h.value("equal? :a :b").await, Value::boolean(true));
        assert_eq!(h.value("equal? :a {10 20 z}@0").await, Value::boolean(false));
        assert_eq!(h.value("arraytolist :a").await.to_string(), "[10 20 z]");
    }

    #[tokio::test]
    async fn test_array_constructor_and_circularity() {
        let mut h = harness();
        h.run("make \"grid (array 2 0)").await.unwrap();
        assert_eq!(h.value("count :grid").await, Value::number(2.0));
        assert_eq!(h.value("item 1 :grid").await, Value::empty_list());
        assert_eq!(
            h.message("setitem 0 :grid (list 1 :grid)").await,
            "SETITEM: Can't create circular array"
        );
        assert_eq!(h.value("item 1 listtoarray [p q]").await, Value::word("p"));
    }

    #[tokio::test]
    async fn test_array_size_limits() {
        let mut h = harness();
        assert_eq!(h.message("count array 1e15").await, "ARRAY: Array size too large");
        assert_eq!(
            h.message("count array -1").await,
            "ARRAY: Array size must be a non-negative integer"
        );
        assert_eq!(h.value("count array 0").await, Value::number(0.0));
    }

    #[tokio::test]
    async fn test_predicates() {
        let mut h = harness();
        assert_eq!(h.value("empty? []").await, Value::boolean(true));
        assert_eq!(h.value("emptyp \"x").await, Value::boolean(false));
        assert_eq!(h.value("number? \"12.5").await, Value::boolean(true));
        assert_eq!(h.value("word? [a]").await, Value::boolean(false));
        assert_eq!(h.value("list? [a]").await, Value::boolean(true));
        assert_eq!(h.value("array? {a}").await, Value::boolean(true));
        assert_eq!(h.value("equalp [1 [2]] [1 [2]]").await, Value::boolean(true));
        assert_eq!(h.value("equal? \"1.0 1").await, Value::boolean(true));
        assert_eq!(h.value("member? \"b [a b c]").await, Value::boolean(true));
        assert_eq!(h.value("memberp \"e \"hello").await, Value::boolean(true));
        assert_eq!(h.value("member? \"q \"hello").await, Value::boolean(false));
    }
}
