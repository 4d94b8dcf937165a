//! Compile-time constant values carried by constant reference nodes.

use num_bigint::BigInt;
use num_traits::{Signed, ToPrimitive, Zero};

/// A constant value as produced by constant folding.
///
/// Integers are arbitrary precision so that bounds checks like the
/// slicing index limit are decidable for every literal.
#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    None,
    Ellipsis,
    Bool(bool),
    Int(BigInt),
    Float(f64),
    Str(String),
    Unicode(String),
    Bytes(Vec<u8>),
    Tuple(Vec<Constant>),
    List(Vec<Constant>),
    Set(Vec<Constant>),
    Dict(Vec<(Constant, Constant)>),
}

impl Constant {
    pub fn int(value: i64) -> Self {
        Constant::Int(BigInt::from(value))
    }

    pub fn str(value: &str) -> Self {
        Constant::Str(value.to_string())
    }

    /// Lists, sets and dicts are mutable, and so is a tuple holding one.
    pub fn is_mutable(&self) -> bool {
        match self {
            Constant::List(_) | Constant::Set(_) | Constant::Dict(_) => true,
            Constant::Tuple(elements) => elements.iter().any(Constant::is_mutable),
            _ => false,
        }
    }

    pub fn is_number(&self) -> bool {
        matches!(
            self,
            Constant::Bool(_) | Constant::Int(_) | Constant::Float(_)
        )
    }

    /// Returns the value as a slice index if it is an integer constant of
    /// magnitude below `2^63 - 1`.
    pub fn as_small_index(&self) -> Option<i64> {
        let value = match self {
            Constant::Int(value) => value.clone(),
            Constant::Bool(value) => BigInt::from(*value as i64),
            _ => return None,
        };

        if value.abs() < BigInt::from(i64::MAX) {
            value.to_i64()
        } else {
            None
        }
    }

    /// Truth value as the host language defines it.
    pub fn truth(&self) -> bool {
        match self {
            Constant::None => false,
            Constant::Ellipsis => true,
            Constant::Bool(value) => *value,
            Constant::Int(value) => !value.is_zero(),
            Constant::Float(value) => *value != 0.0,
            Constant::Str(value) | Constant::Unicode(value) => !value.is_empty(),
            Constant::Bytes(value) => !value.is_empty(),
            Constant::Tuple(elements) | Constant::List(elements) | Constant::Set(elements) => {
                !elements.is_empty()
            }
            Constant::Dict(pairs) => !pairs.is_empty(),
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Constant::None => "none",
            Constant::Ellipsis => "ellipsis",
            Constant::Bool(_) => "bool",
            Constant::Int(_) => "int",
            Constant::Float(_) => "float",
            Constant::Str(_) => "str",
            Constant::Unicode(_) => "unicode",
            Constant::Bytes(_) => "bytes",
            Constant::Tuple(_) => "tuple",
            Constant::List(_) => "list",
            Constant::Set(_) => "set",
            Constant::Dict(_) => "dict",
        }
    }

    /// Identity used for interning. Unlike `==` on the values, `1`, `1.0`
    /// and `True` get distinct keys, and so do `0.0` and `-0.0`.
    pub fn key(&self) -> String {
        match self {
            Constant::Float(value) => format!("float:{:x}", value.to_bits()),
            Constant::Tuple(elements) => format!("tuple:({})", join_keys(elements)),
            Constant::List(elements) => format!("list:[{}]", join_keys(elements)),
            Constant::Set(elements) => format!("set:{{{}}}", join_keys(elements)),
            Constant::Dict(pairs) => format!(
                "dict:{{{}}}",
                pairs
                    .iter()
                    .map(|(key, value)| format!("{}: {}", key.key(), value.key()))
                    .collect::<Vec<String>>()
                    .join(", ")
            ),
            _ => format!("{}:{}", self.kind_name(), self.to_python_repr()),
        }
    }

    pub fn to_python_repr(&self) -> String {
        match self {
            Constant::None => String::from("None"),
            Constant::Ellipsis => String::from("Ellipsis"),
            Constant::Bool(true) => String::from("True"),
            Constant::Bool(false) => String::from("False"),
            Constant::Int(value) => value.to_string(),
            Constant::Float(value) => {
                if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e16 {
                    format!("{:.1}", value)
                } else {
                    format!("{}", value)
                }
            }
            Constant::Str(value) => quote(value.as_bytes(), ""),
            Constant::Unicode(value) => quote_unicode(value),
            Constant::Bytes(value) => quote(value, "b"),
            Constant::Tuple(elements) => {
                if elements.len() == 1 {
                    format!("({},)", elements[0].to_python_repr())
                } else {
                    format!("({})", join_reprs(elements))
                }
            }
            Constant::List(elements) => format!("[{}]", join_reprs(elements)),
            Constant::Set(elements) => format!("set([{}])", join_reprs(elements)),
            Constant::Dict(pairs) => format!(
                "{{{}}}",
                pairs
                    .iter()
                    .map(|(key, value)| format!(
                        "{}: {}",
                        key.to_python_repr(),
                        value.to_python_repr()
                    ))
                    .collect::<Vec<String>>()
                    .join(", ")
            ),
        }
    }
}

fn join_keys(elements: &[Constant]) -> String {
    elements
        .iter()
        .map(Constant::key)
        .collect::<Vec<String>>()
        .join(", ")
}

fn join_reprs(elements: &[Constant]) -> String {
    elements
        .iter()
        .map(Constant::to_python_repr)
        .collect::<Vec<String>>()
        .join(", ")
}

fn quote(bytes: &[u8], prefix: &str) -> String {
    let mut result = format!("{}'", prefix);

    for byte in bytes {
        match byte {
            b'\\' => result.push_str("\\\\"),
            b'\'' => result.push_str("\\'"),
            b'\n' => result.push_str("\\n"),
            b'\r' => result.push_str("\\r"),
            b'\t' => result.push_str("\\t"),
            0x20..=0x7e => result.push(*byte as char),
            _ => result.push_str(&format!("\\x{:02x}", byte)),
        }
    }

    result.push('\'');
    result
}

/// Escapes by code point, so the repr reads back as the same characters.
fn quote_unicode(value: &str) -> String {
    let mut result = String::from("u'");

    for character in value.chars() {
        match character {
            '\\' => result.push_str("\\\\"),
            '\'' => result.push_str("\\'"),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            ' '..='~' => result.push(character),
            _ if (character as u32) < 0x100 => {
                result.push_str(&format!("\\x{:02x}", character as u32))
            }
            _ if (character as u32) < 0x10000 => {
                result.push_str(&format!("\\u{:04x}", character as u32))
            }
            _ => result.push_str(&format!("\\U{:08x}", character as u32)),
        }
    }

    result.push('\'');
    result
}
