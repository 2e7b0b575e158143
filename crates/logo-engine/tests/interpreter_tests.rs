//! End-to-end tests through the public `Interpreter` API

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use logo_engine::*;
use pretty_assertions::assert_eq;

fn seeded() -> InterpreterBuilder {
    Interpreter::builder().context(EvalContext::new().with_seed(7))
}

async fn value(logo: &Interpreter, text: &str) -> Value {
    logo.run_with(text, RunOptions::returning())
        .await
        .unwrap_or_else(|e| panic!("{text}: {e}"))
        .unwrap_or_else(|| panic!("{text}: no value"))
}

async fn message(logo: &Interpreter, text: &str) -> String {
    match logo.run(text).await {
        Ok(v) => panic!("{text}: expected an error, got {v:?}"),
        Err(e) => e.to_string(),
    }
}

async fn code(logo: &Interpreter, text: &str) -> Option<ErrorCode> {
    logo.run(text).await.err().and_then(|e| e.code())
}

// ═══════════════════════════════════════════════════════════════════════
// Expressions
// ═══════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_precedence() {
    let logo = Interpreter::new();
    assert_eq!(value(&logo, "1 + 2 * 3").await, Value::number(7.0));
    assert_eq!(value(&logo, "(1 + 2) * 3").await, Value::number(9.0));
    assert_eq!(value(&logo, "2 ^ 3 ^ 2").await, Value::number(512.0));
    assert_eq!(value(&logo, "-2 ^ 2").await, Value::number(-4.0));
    assert_eq!(value(&logo, "10 - 4 - 3").await, Value::number(3.0));
    assert_eq!(value(&logo, "7 % 4 + 1").await, Value::number(4.0));
    assert_eq!(value(&logo, "1 + 1 = 2").await, Value::number(1.0));
    assert_eq!(value(&logo, "3 < 2").await, Value::number(0.0));
}

#[tokio::test]
async fn test_unary_minus_adjacency() {
    let logo = Interpreter::new();
    assert_eq!(value(&logo, "3 - 2").await, Value::number(1.0));
    assert_eq!(value(&logo, "3-2").await, Value::number(1.0));
    assert_eq!(value(&logo, "sum 3 -2").await, Value::number(1.0));
    assert_eq!(value(&logo, "list 3 -2").await, value(&logo, "[3 -2]").await);
}

#[tokio::test]
async fn test_division_by_zero_ignores_sign() {
    let logo = Interpreter::new();
    for text in ["1 / 0", "-1 / 0", "0 / 0", "5 % 0", "-5 % 0", "1 / -0"] {
        assert_eq!(
            code(&logo, &format!("print {text}")).await,
            Some(ErrorCode::BadInput),
            "{text}"
        );
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Procedure Calls
// ═══════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_call_errors() {
    let logo = Interpreter::new();
    assert_eq!(message(&logo, "frobnicate").await, "I don't know how to FROBNICATE");
    assert_eq!(message(&logo, "fd").await, "Not enough inputs for FD");
    assert_eq!(message(&logo, "(fd 1 2)").await, "Too many inputs for FD");
    assert_eq!(message(&logo, "fd10").await, "Need a space between FD and 10");
    assert_eq!(code(&logo, "(fd 1").await, Some(ErrorCode::MissingParen));
    assert_eq!(code(&logo, "fd 1)").await, Some(ErrorCode::BadParen));
    assert_eq!(message(&logo, "3").await, "I don't know what to do with 3");
}

#[tokio::test]
async fn test_output_from_nested_loop() {
    let logo = Interpreter::new();
    logo.run(
        "to find :n
           repeat 10 [if repcount = :n [output repcount * 100]]
           output -1
         end",
    )
    .await
    .unwrap();
    assert_eq!(value(&logo, "find 3").await, Value::number(300.0));
    assert_eq!(value(&logo, "find 20").await, Value::number(-1.0));
    assert_eq!(logo.scope_depth().await, 1);
}

#[tokio::test]
async fn test_dynamic_scope() {
    let logo = Interpreter::new();
    logo.run(
        "to outer :x
           output inner
         end
         to inner
           output :x * 2
         end",
    )
    .await
    .unwrap();
    assert_eq!(value(&logo, "outer 21").await, Value::number(42.0));
    assert_eq!(
        message(&logo, "print :x").await,
        "Don't know about variable X"
    );
}

#[tokio::test]
async fn test_scope_depth_balanced_on_every_exit() {
    let logo = Interpreter::new();
    logo.run(
        "to ok :n
           output :n
         end
         to fails :n
           output :n / 0
         end
         to quits
           bye
         end",
    )
    .await
    .unwrap();

    logo.run("print ok 1").await.unwrap();
    assert_eq!(logo.scope_depth().await, 1);
    logo.run("print fails 1").await.unwrap_err();
    assert_eq!(logo.scope_depth().await, 1);
    logo.run("print ok quits").await.unwrap();
    assert_eq!(logo.scope_depth().await, 1);
}

#[tokio::test]
async fn test_stack_overflow() {
    let logo = Interpreter::builder()
        .context(EvalContext::with_max_call_depth(10))
        .build();
    logo.run("to down :n\ndown :n + 1\nend").await.unwrap();
    let err = logo.run("down 1").await.unwrap_err();
    assert!(matches!(err, EvalError::StackOverflow { max: 10, .. }), "{err:?}");
    assert_eq!(logo.scope_depth().await, 1);
}

#[tokio::test]
async fn test_recursion_up_to_the_default_depth() {
    let logo = Interpreter::new();
    logo.run("to sum :n\nif :n = 0 [output 0]\noutput :n + sum :n - 1\nend")
        .await
        .unwrap();
    assert_eq!(value(&logo, "sum 390").await, Value::number(76_245.0));
    assert_eq!(logo.scope_depth().await, 1);

    let err = logo.run("print sum 1000").await.unwrap_err();
    assert!(matches!(err, EvalError::StackOverflow { max: 400, .. }), "{err:?}");
    assert_eq!(logo.scope_depth().await, 1);
}

// ═══════════════════════════════════════════════════════════════════════
// Loops
// ═══════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_repeat_counts() {
    let logo = Interpreter::new();
    logo.run("make \"seen [] repeat 3 [make \"seen lput repcount :seen]")
        .await
        .unwrap();
    assert_eq!(value(&logo, ":seen").await, value(&logo, "[1 2 3]").await);

    logo.run("repeat 2 [repeat 3 [] make \"after repcount]").await.unwrap();
    assert_eq!(value(&logo, ":after").await, Value::number(2.0));
    assert_eq!(value(&logo, "repcount").await, Value::number(-1.0));
}

#[tokio::test]
async fn test_while_and_until() {
    let logo = Interpreter::new();
    logo.run("make \"i 0 while [:i < 5] [make \"i :i + 1]").await.unwrap();
    assert_eq!(value(&logo, ":i").await, Value::number(5.0));
    logo.run("until [:i = 0] [make \"i :i - 1]").await.unwrap();
    assert_eq!(value(&logo, ":i").await, Value::number(0.0));
}

// ═══════════════════════════════════════════════════════════════════════
// Definitions
// ═══════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_definitions_round_trip() {
    let logo = Interpreter::new();
    logo.run(
        "to poly :side [:angle 90] [:sides] 2
           repeat 4 [fd :side rt :angle]
           print :sides
         end
         to half :n
           output :n / 2
         end",
    )
    .await
    .unwrap();
    let text = logo.procdefs().await;

    let copy = Interpreter::new();
    copy.run(&text).await.unwrap();
    assert_eq!(copy.procdefs().await, text);
    assert_eq!(copy.definition("half").await.unwrap(), logo.definition("half").await.unwrap());
    assert_eq!(value(&copy, "half 9").await, Value::number(4.5));
}

#[tokio::test]
async fn test_definition_hook_sees_source() {
    let saved = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&saved);
    let logo = Interpreter::builder()
        .on_define(move |name, text| sink.borrow_mut().push((name.to_string(), text.to_string())))
        .build();
    logo.run("to greet\nfd 10\nend").await.unwrap();
    assert_eq!(
        *saved.borrow(),
        vec![("greet".to_string(), "to greet\n  fd 10\nend".to_string())]
    );
}

#[tokio::test]
async fn test_copydef_missing_source_is_ignored() {
    let logo = Interpreter::new();
    logo.copydef("walk", "nowhere").await;
    assert_eq!(code(&logo, "walk").await, Some(ErrorCode::BadProc));
    logo.copydef("walk", "fd").await;
    logo.run("walk 5").await.unwrap();
}

// ═══════════════════════════════════════════════════════════════════════
// Values
// ═══════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_setitem_stores_copies() {
    let logo = Interpreter::new();
    logo.run("make \"inner [1 2] make \"a array 2 setitem 1 :a :inner")
        .await
        .unwrap();
    assert_eq!(value(&logo, "item 1 :a").await, value(&logo, ":inner").await);
    assert_eq!(value(&logo, "equal? :a :a").await, Value::word("true"));
    assert_eq!(value(&logo, "equal? :a {[1 2] []}").await, Value::word("false"));
    assert_eq!(
        message(&logo, "setitem 2 :a :a").await,
        "SETITEM: Can't create circular array"
    );
}

#[tokio::test]
async fn test_catch_and_throw() {
    let logo = Interpreter::new();
    assert_eq!(
        value(&logo, "catch \"oops [(throw \"oops 42) print 1]").await,
        Value::number(42.0)
    );
    logo.run("catch \"error [print 1 / 0]").await.unwrap();
    assert_eq!(message(&logo, "throw \"elsewhere").await, "No CATCH for tag elsewhere");
    assert_eq!(message(&logo, "(throw \"error [custom failure])").await, "custom failure");
}

// ═══════════════════════════════════════════════════════════════════════
// Collaborators
// ═══════════════════════════════════════════════════════════════════════

/// Each move finishes after a short delay and notes when it completed.
struct SlowTurtle {
    inner: RecordingTurtle,
    events: Rc<RefCell<Vec<String>>>,
}

impl Turtle for SlowTurtle {
    fn move_by(&mut self, distance: f64) -> Motion {
        self.inner.move_by(distance);
        self.events.borrow_mut().push(format!("move {distance}"));
        let events = Rc::clone(&self.events);
        Motion::pending(async move {
            tokio::time::sleep(Duration::from_millis(5)).await;
            events.borrow_mut().push("arrived".to_string());
        })
    }

    fn turn(&mut self, degrees: f64) -> Motion {
        self.events.borrow_mut().push(format!("turn {degrees}"));
        self.inner.turn(degrees)
    }

    fn home(&mut self) -> Motion {
        self.inner.home()
    }

    fn set_position(&mut self, x: f64, y: f64) -> Motion {
        self.inner.set_position(x, y)
    }

    fn set_heading(&mut self, degrees: f64) -> Motion {
        self.inner.set_heading(degrees)
    }

    fn pen_down(&mut self) -> Motion {
        self.inner.pen_down()
    }

    fn pen_up(&mut self) -> Motion {
        self.inner.pen_up()
    }

    fn set_pen_color(&mut self, color: &str) -> Motion {
        self.inner.set_pen_color(color)
    }

    fn set_pen_width(&mut self, width: f64) -> Motion {
        self.inner.set_pen_width(width)
    }

    fn clear(&mut self) -> Motion {
        self.inner.clear()
    }

    fn position(&self) -> (f64, f64) {
        self.inner.position()
    }

    fn heading(&self) -> f64 {
        self.inner.heading()
    }
}

#[tokio::test]
async fn test_pending_motion_is_awaited() {
    let events = Rc::new(RefCell::new(Vec::new()));
    let logo = Interpreter::builder()
        .turtle(SlowTurtle {
            inner: RecordingTurtle::new(),
            events: Rc::clone(&events),
        })
        .build();
    logo.run("fd 10 rt 90 fd 5").await.unwrap();
    assert_eq!(
        *events.borrow(),
        vec!["move 10", "arrived", "turn 90", "move 5", "arrived"]
    );
}

#[tokio::test]
async fn test_concurrent_runs_are_serialized() {
    let console = BufferConsole::new();
    let logo = Interpreter::builder()
        .console(console.clone())
        .turtle(SlowTurtle {
            inner: RecordingTurtle::new(),
            events: Rc::default(),
        })
        .build();
    let (a, b) = tokio::join!(
        logo.run("print 1 fd 10 print 2"),
        logo.run("print 3"),
    );
    a.unwrap();
    b.unwrap();
    assert_eq!(console.contents(), "1\n2\n3\n");
}

#[tokio::test]
async fn test_colours() {
    let turtle = RecordingTurtle::new();
    let log = turtle.log();
    let logo = Interpreter::builder()
        .turtle(turtle)
        .color_alias(|name| (name == "sky").then(|| "#87ceeb".to_string()))
        .build();
    logo.run("setpc 0 setpc [0 100 0] setpc \"sky setpc \"orange").await.unwrap();
    assert_eq!(
        *log.borrow(),
        vec![
            TurtleCommand::PenColor("black".into()),
            TurtleCommand::PenColor("#00ff00".into()),
            TurtleCommand::PenColor("#87ceeb".into()),
            TurtleCommand::PenColor("orange".into()),
        ]
    );
}

#[tokio::test]
async fn test_bye_handle_stops_forever() {
    let logo = seeded().build();
    let handle = logo.bye_handle();
    let stopper = async move {
        tokio::time::sleep(Duration::from_millis(10)).await;
        handle.bye();
    };
    let (result, ()) = tokio::join!(logo.run("make \"n 0 forever [make \"n :n + 1]"), stopper);
    result.unwrap();
    assert!(value(&logo, ":n").await.as_number().unwrap() > 0.0);
}

#[tokio::test]
async fn test_seeded_random_is_reproducible() {
    let a = seeded().build();
    let b = seeded().build();
    let script = "(list random 1000 random 1000 random 1000)";
    assert_eq!(value(&a, script).await, value(&b, script).await);
}
