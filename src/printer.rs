//! Canonical textual rendering of values.
//!
//! Proper lists print as `(a b c)`, improper lists as `(a b . c)`, the empty list as `()`.
//! Printing uses an explicit work stack, so neither long nor deeply nested values can
//! exhaust the native stack.

use crate::ast::Value;

/// Marker printed for [`Value::Void`]
pub const VOID_MARKER: &str = "#<void>";

enum Step<'a> {
    /// Print a complete value
    Value(&'a Value),
    /// Continue a list whose earlier elements are already printed
    Rest(&'a Value),
    Close,
}

/// Render a value in canonical form
pub fn print(value: &Value) -> String {
    let mut out = String::new();
    let mut stack = vec![Step::Value(value)];

    while let Some(step) = stack.pop() {
        match step {
            Step::Value(value) => match value {
                Value::Null => out.push_str("()"),
                Value::Pair(pair) => {
                    out.push('(');
                    stack.push(Step::Rest(pair.rest()));
                    stack.push(Step::Value(pair.first()));
                }
                Value::Symbol(s) => out.push_str(s),
                Value::Integer(n) => out.push_str(&n.to_string()),
                Value::Void => out.push_str(VOID_MARKER),
            },
            Step::Rest(rest) => match rest {
                Value::Null => out.push(')'),
                Value::Pair(pair) => {
                    out.push(' ');
                    stack.push(Step::Rest(pair.rest()));
                    stack.push(Step::Value(pair.first()));
                }
                tail => {
                    out.push_str(" . ");
                    stack.push(Step::Close);
                    stack.push(Step::Value(tail));
                }
            },
            Step::Close => out.push(')'),
        }
    }

    out
}
