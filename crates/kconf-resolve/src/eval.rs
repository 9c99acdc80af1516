//! Expression evaluation against an environment.
//!
//! Evaluation is pure: it reads the environment and reports undeclared
//! symbols in its result instead of logging them.

use std::cmp::Ordering;

use kconf_schema::{Expr, Literal, SymbolType, Tristate, Value};

use crate::env::Environment;

/// The value of an expression plus the undeclared symbols it read.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub value: Value,
    pub unresolved: Vec<String>,
}

impl Evaluation {
    /// The value in boolean context.
    pub fn tristate(&self) -> Tristate {
        self.value.as_tristate()
    }
}

/// Evaluate `expr` in `env`.
///
/// Connectives use tristate semantics (AND = min, OR = max, NOT mirrors
/// around `m`). A comparison coerces the literal to the symbol's declared
/// type and yields `y` or `n`. An undeclared symbol reads as `n` and is
/// listed in [`Evaluation::unresolved`].
pub fn evaluate(expr: &Expr, env: &Environment<'_>) -> Evaluation {
    let mut unresolved = Vec::new();
    let value = eval(expr, env, &mut unresolved);
    Evaluation { value, unresolved }
}

fn eval(expr: &Expr, env: &Environment<'_>, unresolved: &mut Vec<String>) -> Value {
    match expr {
        Expr::Symbol(name) => read_symbol(name, env, unresolved).0,
        Expr::Literal(lit) => lit.to_value(),
        Expr::And(items) => {
            let t = items.iter().fold(Tristate::Yes, |acc, item| {
                acc.and(eval(item, env, unresolved).as_tristate())
            });
            Value::Tristate(t)
        }
        Expr::Or(items) => {
            let t = items.iter().fold(Tristate::No, |acc, item| {
                acc.or(eval(item, env, unresolved).as_tristate())
            });
            Value::Tristate(t)
        }
        Expr::Not(inner) => Value::Tristate(eval(inner, env, unresolved).as_tristate().not()),
        Expr::Compare {
            op,
            symbol,
            literal,
        } => {
            let (lhs, ty) = read_symbol(symbol, env, unresolved);
            let ordering = compare(&lhs, ty, literal);
            Value::Tristate(Tristate::from_bool(op.holds(ordering)))
        }
    }
}

/// Current value and declared type of a symbol. Undeclared symbols read as
/// a tristate `n`.
fn read_symbol(name: &str, env: &Environment<'_>, unresolved: &mut Vec<String>) -> (Value, SymbolType) {
    let graph = env.graph();
    match graph.lookup(name) {
        Some(id) => (env.get(id).clone(), graph.option(id).ty),
        None => {
            if !unresolved.iter().any(|u| u == name) {
                unresolved.push(name.to_string());
            }
            (Value::Tristate(Tristate::No), SymbolType::Tristate)
        }
    }
}

/// Order `lhs` relative to `literal`, coercing the literal to `ty`. When
/// the literal has no representation in `ty`, both sides compare as text.
fn compare(lhs: &Value, ty: SymbolType, literal: &Literal) -> Ordering {
    let raw = literal.to_value();
    match (lhs, raw.coerce(ty)) {
        (Value::Tristate(a), Some(Value::Tristate(b))) => a.cmp(&b),
        (Value::Int(a), Some(Value::Int(b))) => a.cmp(&b),
        (Value::Hex(a), Some(Value::Hex(b))) => a.cmp(&b),
        (Value::String(a), Some(Value::String(b))) => a.as_str().cmp(b.as_str()),
        _ => lhs.to_string().cmp(&raw.to_string()),
    }
}
