//! Dependency, condition and default-value expressions.
//!
//! Only the boolean/tristate/comparison subset needed by dependency and
//! default rules is modeled: symbol references, literals, n-ary `and`/`or`,
//! negation, and comparisons of a symbol against a literal.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::tristate::Tristate;
use crate::value::Value;

/// A literal appearing in an expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Literal {
    Tristate(Tristate),
    String(String),
    Int(i64),
}

impl Literal {
    /// The literal as an untyped value, before coercion.
    pub fn to_value(&self) -> Value {
        match self {
            Literal::Tristate(t) => Value::Tristate(*t),
            Literal::String(s) => Value::String(s.clone()),
            Literal::Int(i) => Value::Int(*i),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Tristate(t) => write!(f, "{t}"),
            Literal::String(s) => write!(f, "{s:?}"),
            Literal::Int(i) => write!(f, "{i}"),
        }
    }
}

/// Comparison operator between a symbol and a literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    pub fn as_str(self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Ne => "!=",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
        }
    }

    /// Apply the operator to an ordering of `symbol` relative to `literal`.
    pub fn holds(self, ordering: std::cmp::Ordering) -> bool {
        use std::cmp::Ordering::*;
        match self {
            CompareOp::Eq => ordering == Equal,
            CompareOp::Ne => ordering != Equal,
            CompareOp::Lt => ordering == Less,
            CompareOp::Le => ordering != Greater,
            CompareOp::Gt => ordering == Greater,
            CompareOp::Ge => ordering != Less,
        }
    }
}

/// An expression over option values.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expr {
    /// Reference to another option's current value.
    Symbol(String),
    /// A constant.
    Literal(Literal),
    /// Minimum over all operands; `y` when empty.
    And(Vec<Expr>),
    /// Maximum over all operands; `n` when empty.
    Or(Vec<Expr>),
    /// Tristate negation.
    Not(Box<Expr>),
    /// `symbol <op> literal`, yielding `y` or `n`.
    Compare {
        op: CompareOp,
        symbol: String,
        literal: Literal,
    },
}

impl Default for Expr {
    fn default() -> Self {
        Expr::y()
    }
}

impl Expr {
    pub fn y() -> Self {
        Expr::Literal(Literal::Tristate(Tristate::Yes))
    }

    pub fn m() -> Self {
        Expr::Literal(Literal::Tristate(Tristate::Module))
    }

    pub fn n() -> Self {
        Expr::Literal(Literal::Tristate(Tristate::No))
    }

    pub fn sym(name: impl Into<String>) -> Self {
        Expr::Symbol(name.into())
    }

    pub fn string(text: impl Into<String>) -> Self {
        Expr::Literal(Literal::String(text.into()))
    }

    pub fn int(value: i64) -> Self {
        Expr::Literal(Literal::Int(value))
    }

    /// Conjunction, flattening nested `and`s.
    pub fn and(self, other: Expr) -> Self {
        match (self, other) {
            (Expr::And(mut a), Expr::And(b)) => {
                a.extend(b);
                Expr::And(a)
            }
            (Expr::And(mut a), e) => {
                a.push(e);
                Expr::And(a)
            }
            (e, Expr::And(mut b)) => {
                b.insert(0, e);
                Expr::And(b)
            }
            (a, b) => Expr::And(vec![a, b]),
        }
    }

    /// Disjunction, flattening nested `or`s.
    pub fn or(self, other: Expr) -> Self {
        match (self, other) {
            (Expr::Or(mut a), Expr::Or(b)) => {
                a.extend(b);
                Expr::Or(a)
            }
            (Expr::Or(mut a), e) => {
                a.push(e);
                Expr::Or(a)
            }
            (e, Expr::Or(mut b)) => {
                b.insert(0, e);
                Expr::Or(b)
            }
            (a, b) => Expr::Or(vec![a, b]),
        }
    }

    pub fn negate(self) -> Self {
        Expr::Not(Box::new(self))
    }

    pub fn compare(op: CompareOp, symbol: impl Into<String>, literal: Literal) -> Self {
        Expr::Compare {
            op,
            symbol: symbol.into(),
            literal,
        }
    }

    /// `symbol = literal`.
    pub fn equals(symbol: impl Into<String>, literal: Literal) -> Self {
        Expr::compare(CompareOp::Eq, symbol, literal)
    }

    /// `symbol != literal`.
    pub fn not_equals(symbol: impl Into<String>, literal: Literal) -> Self {
        Expr::compare(CompareOp::Ne, symbol, literal)
    }

    /// Whether this is the literal `y`, i.e. an absent dependency.
    pub fn is_always_true(&self) -> bool {
        matches!(self, Expr::Literal(Literal::Tristate(Tristate::Yes)))
            || matches!(self, Expr::And(items) if items.is_empty())
    }

    /// Every symbol the expression reads, in first-occurrence order.
    pub fn symbols(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_symbols(&mut out);
        out
    }

    fn collect_symbols<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Expr::Symbol(name) | Expr::Compare { symbol: name, .. } => {
                if !out.contains(&name.as_str()) {
                    out.push(name);
                }
            }
            Expr::Literal(_) => {}
            Expr::And(items) | Expr::Or(items) => {
                for item in items {
                    item.collect_symbols(out);
                }
            }
            Expr::Not(inner) => inner.collect_symbols(out),
        }
    }

    fn precedence(&self) -> u8 {
        match self {
            Expr::Or(items) if items.len() > 1 => 1,
            Expr::And(items) if items.len() > 1 => 2,
            Expr::Not(_) => 3,
            _ => 4,
        }
    }

    fn fmt_operand(&self, parent: u8, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.precedence() < parent {
            write!(f, "({self})")
        } else {
            write!(f, "{self}")
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Symbol(name) => f.write_str(name),
            Expr::Literal(lit) => write!(f, "{lit}"),
            Expr::And(items) | Expr::Or(items) => {
                let (sep, empty) = match self {
                    Expr::And(_) => (" && ", "y"),
                    _ => (" || ", "n"),
                };
                if items.is_empty() {
                    return f.write_str(empty);
                }
                let prec = self.precedence();
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(sep)?;
                    }
                    item.fmt_operand(prec + 1, f)?;
                }
                Ok(())
            }
            Expr::Not(inner) => {
                f.write_str("!")?;
                inner.fmt_operand(4, f)
            }
            Expr::Compare {
                op,
                symbol,
                literal,
            } => write!(f, "{symbol} {} {literal}", op.as_str()),
        }
    }
}
