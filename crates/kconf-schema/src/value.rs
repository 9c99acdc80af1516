//! Option types and the values they hold.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;
use crate::tristate::Tristate;

/// Declared type of an option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolType {
    Bool,
    Tristate,
    String,
    Int,
    Hex,
}

impl SymbolType {
    /// Bool and tristate options live in the tristate domain.
    pub fn is_tristate_like(self) -> bool {
        matches!(self, SymbolType::Bool | SymbolType::Tristate)
    }

    /// The value an option holds before any default applies, and the value
    /// a disabled option collapses to.
    pub fn base_default(self) -> Value {
        match self {
            SymbolType::Bool | SymbolType::Tristate => Value::Tristate(Tristate::No),
            SymbolType::String => Value::String(String::new()),
            SymbolType::Int => Value::Int(0),
            SymbolType::Hex => Value::Hex(0),
        }
    }

    /// Parse user-supplied text as a value of this type.
    pub fn parse_value(self, text: &str) -> Result<Value, SchemaError> {
        Value::String(text.to_string())
            .coerce(self)
            .ok_or_else(|| SchemaError::InvalidLiteral {
                text: text.to_string(),
                expected: self.to_string(),
            })
    }
}

impl fmt::Display for SymbolType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SymbolType::Bool => write!(f, "bool"),
            SymbolType::Tristate => write!(f, "tristate"),
            SymbolType::String => write!(f, "string"),
            SymbolType::Int => write!(f, "int"),
            SymbolType::Hex => write!(f, "hex"),
        }
    }
}

/// Inclusive bounds for int and hex options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntRange {
    pub min: i64,
    pub max: i64,
}

impl IntRange {
    pub fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }

    /// Whether `min <= max`.
    pub fn is_valid(&self) -> bool {
        self.min <= self.max
    }

    fn clamp_int(&self, value: i64) -> i64 {
        if !self.is_valid() {
            return value;
        }
        value.clamp(self.min, self.max)
    }

    fn clamp_hex(&self, value: u64) -> u64 {
        if !self.is_valid() {
            return value;
        }
        let lo = self.min.max(0) as u64;
        let hi = self.max.max(0) as u64;
        value.clamp(lo, hi.max(lo))
    }
}

/// A concrete value held by an option.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Value {
    Tristate(Tristate),
    String(String),
    Int(i64),
    Hex(u64),
}

impl Value {
    /// Interpret the value in boolean context. Only tristate values carry
    /// truth; every scalar reads as `n`.
    pub fn as_tristate(&self) -> Tristate {
        match self {
            Value::Tristate(t) => *t,
            _ => Tristate::No,
        }
    }

    /// Convert to the given type, or `None` if the value has no
    /// representation there.
    pub fn coerce(&self, ty: SymbolType) -> Option<Value> {
        match ty {
            SymbolType::Bool | SymbolType::Tristate => match self {
                Value::Tristate(t) => Some(Value::Tristate(*t)),
                Value::String(s) => s.parse::<Tristate>().ok().map(Value::Tristate),
                Value::Int(_) | Value::Hex(_) => None,
            },
            SymbolType::String => Some(Value::String(self.to_string())),
            SymbolType::Int => match self {
                Value::Int(i) => Some(Value::Int(*i)),
                Value::Hex(h) => i64::try_from(*h).ok().map(Value::Int),
                Value::String(s) => parse_int(s).map(Value::Int),
                Value::Tristate(_) => None,
            },
            SymbolType::Hex => match self {
                Value::Hex(h) => Some(Value::Hex(*h)),
                Value::Int(i) => u64::try_from(*i).ok().map(Value::Hex),
                Value::String(s) => parse_hex(s).map(Value::Hex),
                Value::Tristate(_) => None,
            },
        }
    }

    /// Bring a value of the right type into the type's legal range: a bool
    /// never holds `m`, and int/hex values respect the optional range.
    pub fn clamp_to(self, ty: SymbolType, range: Option<&IntRange>) -> Value {
        match (ty, self) {
            (SymbolType::Bool, Value::Tristate(Tristate::Module)) => Value::Tristate(Tristate::Yes),
            (SymbolType::Int, Value::Int(i)) => match range {
                Some(r) => Value::Int(r.clamp_int(i)),
                None => Value::Int(i),
            },
            (SymbolType::Hex, Value::Hex(h)) => match range {
                Some(r) => Value::Hex(r.clamp_hex(h)),
                None => Value::Hex(h),
            },
            (_, v) => v,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Tristate(t) => write!(f, "{t}"),
            Value::String(s) => f.write_str(s),
            Value::Int(i) => write!(f, "{i}"),
            Value::Hex(h) => write!(f, "0x{h:x}"),
        }
    }
}

fn parse_int(text: &str) -> Option<i64> {
    let text = text.trim();
    if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        return i64::from_str_radix(hex, 16).ok();
    }
    text.parse::<i64>().ok()
}

fn parse_hex(text: &str) -> Option<u64> {
    let text = text.trim();
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    if digits.is_empty() {
        return None;
    }
    u64::from_str_radix(digits, 16).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_defaults() {
        assert_eq!(SymbolType::Bool.base_default(), Value::Tristate(Tristate::No));
        assert_eq!(SymbolType::String.base_default(), Value::String(String::new()));
        assert_eq!(SymbolType::Hex.base_default().to_string(), "0x0");
    }

    #[test]
    fn parse_by_type() {
        assert_eq!(
            SymbolType::Tristate.parse_value("m").unwrap(),
            Value::Tristate(Tristate::Module)
        );
        assert_eq!(SymbolType::Int.parse_value("-12").unwrap(), Value::Int(-12));
        assert_eq!(SymbolType::Hex.parse_value("0x1F").unwrap(), Value::Hex(0x1f));
        assert_eq!(SymbolType::Hex.parse_value("ff").unwrap(), Value::Hex(0xff));
        assert!(SymbolType::Int.parse_value("twelve").is_err());
        assert!(SymbolType::Hex.parse_value("0x").is_err());
    }

    #[test]
    fn scalars_are_false_in_boolean_context() {
        assert_eq!(Value::Int(5).as_tristate(), Tristate::No);
        assert_eq!(Value::String("y".into()).as_tristate(), Tristate::No);
        assert_eq!(Value::Tristate(Tristate::Module).as_tristate(), Tristate::Module);
    }

    #[test]
    fn bool_never_holds_module() {
        let v = Value::Tristate(Tristate::Module).clamp_to(SymbolType::Bool, None);
        assert_eq!(v, Value::Tristate(Tristate::Yes));
        let v = Value::Tristate(Tristate::Module).clamp_to(SymbolType::Tristate, None);
        assert_eq!(v, Value::Tristate(Tristate::Module));
    }

    #[test]
    fn ranges_clamp_int_and_hex() {
        let range = IntRange::new(10, 20);
        assert_eq!(Value::Int(5).clamp_to(SymbolType::Int, Some(&range)), Value::Int(10));
        assert_eq!(Value::Int(25).clamp_to(SymbolType::Int, Some(&range)), Value::Int(20));
        assert_eq!(Value::Hex(0x100).clamp_to(SymbolType::Hex, Some(&range)), Value::Hex(20));
    }

    #[test]
    fn coerce_between_scalars() {
        assert_eq!(Value::Hex(16).coerce(SymbolType::Int), Some(Value::Int(16)));
        assert_eq!(Value::Int(-1).coerce(SymbolType::Hex), None);
        assert_eq!(
            Value::Int(7).coerce(SymbolType::String),
            Some(Value::String("7".into()))
        );
        assert_eq!(Value::Tristate(Tristate::Yes).coerce(SymbolType::Int), None);
    }
}
