//! Property-based tests for the reader and arithmetic.

use logo_engine::*;
use proptest::prelude::*;

fn returning(text: &str) -> Option<Value> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("runtime");
    rt.block_on(async {
        Interpreter::new()
            .run_with(text, RunOptions::returning())
            .await
            .expect("run")
    })
}

fn words(text: &str) -> Vec<String> {
    tokenize(text)
        .expect("tokenize")
        .iter()
        .map(Token::to_source)
        .collect()
}

proptest! {
    /// `a - b` and `a-b` subtract; `a -b` passes a negated `b`.
    #[test]
    fn minus_spacing_decides_meaning(a in 0u32..1000, b in 0u32..1000) {
        let spaced = words(&format!("{a} - {b}"));
        let tight = words(&format!("{a}-{b}"));
        prop_assert_eq!(&spaced, &tight);
        prop_assert_eq!(spaced, vec![a.to_string(), "-".to_string(), b.to_string()]);

        let Some(Value::List(items)) = returning(&format!("list {a} -{b}")) else {
            panic!("expected a list");
        };
        prop_assert_eq!(items.len(), 2);
        prop_assert_eq!(items[1].as_number(), Some(-f64::from(b)));
    }

    #[test]
    fn arithmetic_matches_f64(a in -1000i32..1000, b in 1i32..1000, c in -50i32..50) {
        let expected = f64::from(a) + f64::from(b) * f64::from(c) - f64::from(a) / f64::from(b);
        let text = format!("{a} + {b} * {c} - {a} / {b}");
        let got = returning(&text).and_then(|v| v.as_number());
        prop_assert_eq!(got, Some(expected));
    }

    #[test]
    fn list_source_round_trips(items in prop::collection::vec("[a-z]{1,6}|[0-9]{1,3}", 0..8)) {
        let text = format!("[{}]", items.join(" "));
        let tokens = tokenize(&text).expect("tokenize");
        let source: Vec<String> = tokens.iter().map(Token::to_source).collect();
        prop_assert_eq!(source, vec![text]);
    }
}
