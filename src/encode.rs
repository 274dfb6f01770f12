//! JSON text encoder for [`Value`] and request composition.

use alloc::string::String;
use core::fmt::Write as _;

use crate::{Key, Request, Value, REQUEST_ID};

/// Encodes a value as a JSON text fragment.
///
/// Total over [`Value`]; composites become arrays when their keys are exactly
/// `0..n` in order and objects otherwise. An empty composite is `[]`.
pub fn encode(value: &Value) -> String {
    let mut out = String::new();

    encode_into(value, &mut out);

    out
}

/// True when every key equals its zero based position.
pub fn is_array_like(entries: &[(Key, Value)]) -> bool {
    entries
        .iter()
        .enumerate()
        .all(|(i, (key, _))| matches!(key, Key::Index(n) if *n == i as u64))
}

/// Composes the wire text of a request.
///
/// Params that encode to the empty string literal `""` are left out of the
/// request entirely, so "no arguments" and "one empty string argument" differ
/// on the wire.
pub fn encode_request(request: &Request) -> String {
    let mut out = String::from("{\"method\": ");

    quote(&request.method, &mut out);

    let params = encode(&request.params);
    if params != "\"\"" {
        out.push_str(", \"params\": ");
        out.push_str(&params);
    }

    // writing into a String cannot fail
    let _ = write!(out, ", \"id\": {}}}", REQUEST_ID);

    out
}

fn encode_into(value: &Value, out: &mut String) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(true) => out.push_str("true"),
        Value::Bool(false) => out.push_str("false"),
        Value::Number(n) => {
            let _ = write!(out, "{}", n);
        }
        Value::String(s) => quote(s, out),
        Value::Composite(entries) => {
            let array = is_array_like(entries);

            out.push(if array { '[' } else { '{' });

            for (i, (key, value)) in entries.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }

                if !array {
                    match key {
                        Key::Index(n) => {
                            let _ = write!(out, "\"{}\"", n);
                        }
                        Key::Name(name) => quote(name, out),
                    }
                    out.push(':');
                }

                encode_into(value, out);
            }

            out.push(if array { ']' } else { '}' });
        }
    }
}

/// Writes `s` as a quoted JSON string. Every character is escaped at most once.
fn quote(s: &str, out: &mut String) {
    out.push('"');

    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0c}' => out.push_str("\\f"),
            c if (c as u32) < 0x20 => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }

    out.push('"');
}
