use serde::{Deserialize, Serialize};
use std::fmt;

/// A decoded ABI argument.
///
/// Numbers are kept as decimal strings and byte values as 0x-prefixed hex so
/// that 256-bit values survive JSON round trips unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum ArgValue {
    Address(String),
    Bool(bool),
    Uint(String),
    Int(String),
    Bytes(String),
    FixedBytes(String),
    String(String),
    Array(Vec<ArgValue>),
    Tuple(Vec<ArgValue>),
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgValue::Address(v)
            | ArgValue::Uint(v)
            | ArgValue::Int(v)
            | ArgValue::Bytes(v)
            | ArgValue::FixedBytes(v)
            | ArgValue::String(v) => write!(f, "{}", v),
            ArgValue::Bool(v) => write!(f, "{}", v),
            ArgValue::Array(items) | ArgValue::Tuple(items) => {
                let (open, close) = match self {
                    ArgValue::Array(_) => ('[', ']'),
                    _ => ('(', ')'),
                };
                write!(f, "{}", open)?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "{}", close)
            }
        }
    }
}
