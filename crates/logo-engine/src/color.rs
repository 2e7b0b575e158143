//! Pen colour resolution

use crate::value::Value;

/// Colour names for palette indexes 0-15.
pub const PALETTE: [&str; 16] = [
    "black",
    "blue",
    "lime",
    "cyan",
    "red",
    "magenta",
    "yellow",
    "white",
    "brown",
    "tan",
    "green",
    "aquamarine",
    "salmon",
    "purple",
    "orange",
    "gray",
];

/// Resolve a `SETPENCOLOR` input to a colour string.
///
/// - a list or array of three numbers on a 0-99 scale becomes `#rrggbb`
/// - a palette index becomes its colour name
/// - any other word goes through `alias`, falling back to the word itself
///   with a stray trailing `"` removed
///
/// Returns `None` when the input has none of these shapes.
pub fn resolve_color(color: &Value, alias: impl Fn(&str) -> Option<String>) -> Option<String> {
    match color {
        Value::List(items) => rgb(items),
        Value::Array(array) => rgb(&array.to_vec()),
        Value::Word(word) => {
            let name = word.text();
            if let Some(index) = palette_index(&name) {
                return Some(PALETTE[index].to_string());
            }
            if let Some(aliased) = alias(&name) {
                return Some(aliased);
            }
            Some(name.strip_suffix('"').unwrap_or(&name).to_string())
        }
    }
}

fn palette_index(name: &str) -> Option<usize> {
    let n: f64 = name.parse().ok()?;
    (n.fract() == 0.0 && (0.0..16.0).contains(&n)).then_some(n as usize)
}

fn rgb(items: &[Value]) -> Option<String> {
    let [r, g, b] = items else {
        return None;
    };
    Some(format!(
        "#{:02x}{:02x}{:02x}",
        scale(r.as_number()?),
        scale(g.as_number()?),
        scale(b.as_number()?)
    ))
}

/// Clamp to 0-99 and scale to 0-255.
fn scale(n: f64) -> u8 {
    let clamped = n.floor().clamp(0.0, 99.0);
    (clamped * 255.0 / 99.0).floor() as u8
}
