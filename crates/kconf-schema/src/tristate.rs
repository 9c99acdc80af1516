//! The three-valued logic domain shared by bool and tristate options.
//!
//! `n < m < y`, where `m` means "built as a loadable module". Connectives
//! follow numeric semantics: AND is the minimum, OR is the maximum and NOT
//! mirrors around `m`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;

/// A tristate value.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub enum Tristate {
    /// Disabled.
    #[default]
    #[serde(rename = "n")]
    No,
    /// Built as a module.
    #[serde(rename = "m")]
    Module,
    /// Enabled (built in).
    #[serde(rename = "y")]
    Yes,
}

impl Tristate {
    /// Conjunction: the smaller of the two values.
    pub fn and(self, other: Tristate) -> Tristate {
        self.min(other)
    }

    /// Disjunction: the larger of the two values.
    pub fn or(self, other: Tristate) -> Tristate {
        self.max(other)
    }

    /// Negation: `y` and `n` swap, `m` stays `m`.
    pub fn not(self) -> Tristate {
        match self {
            Tristate::No => Tristate::Yes,
            Tristate::Module => Tristate::Module,
            Tristate::Yes => Tristate::No,
        }
    }

    /// Whether the value is anything other than `n`.
    pub fn is_enabled(self) -> bool {
        self != Tristate::No
    }

    /// Map a boolean to `y`/`n`.
    pub fn from_bool(value: bool) -> Tristate {
        if value {
            Tristate::Yes
        } else {
            Tristate::No
        }
    }

    /// The single-letter form used in rendered snapshots.
    pub fn as_str(self) -> &'static str {
        match self {
            Tristate::No => "n",
            Tristate::Module => "m",
            Tristate::Yes => "y",
        }
    }
}

impl fmt::Display for Tristate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tristate {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "n" | "no" | "false" => Ok(Tristate::No),
            "m" | "mod" | "module" => Ok(Tristate::Module),
            "y" | "yes" | "true" => Ok(Tristate::Yes),
            _ => Err(SchemaError::InvalidLiteral {
                text: s.to_string(),
                expected: "tristate (n, m or y)".into(),
            }),
        }
    }
}
