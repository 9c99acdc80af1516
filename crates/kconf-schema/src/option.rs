//! Option declarations.

use serde::{Deserialize, Serialize};

use crate::expr::Expr;
use crate::value::{IntRange, SymbolType};

/// One conditional default: `value` applies when `condition` holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultRule {
    pub value: Expr,
    #[serde(default)]
    pub condition: Expr,
}

impl DefaultRule {
    pub fn new(value: Expr, condition: Expr) -> Self {
        Self { value, condition }
    }

    /// A rule that always applies.
    pub fn always(value: Expr) -> Self {
        Self::new(value, Expr::y())
    }
}

/// A configuration option as delivered by the schema loader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigOption {
    /// Unique symbol name.
    pub name: String,
    #[serde(rename = "type")]
    pub ty: SymbolType,
    /// User-visible prompt. Options without one are not user-settable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    /// Dependency expression; literal `y` when absent.
    #[serde(default, skip_serializing_if = "Expr::is_always_true")]
    pub depends: Expr,
    /// Conditional defaults in declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub defaults: Vec<DefaultRule>,
    /// Inclusive bounds, int and hex only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<IntRange>,
    /// Id of the choice group this option belongs to.
    #[serde(default, rename = "choice_group", skip_serializing_if = "Option::is_none")]
    pub choice_group: Option<String>,
}

impl ConfigOption {
    pub fn new(name: impl Into<String>, ty: SymbolType) -> Self {
        Self {
            name: name.into(),
            ty,
            prompt: None,
            depends: Expr::y(),
            defaults: Vec::new(),
            range: None,
            choice_group: None,
        }
    }

    /// Whether the user may set this option directly.
    pub fn is_interactive(&self) -> bool {
        self.prompt.is_some()
    }
}
