//! Choice groups: sets of options of which at most one is enabled.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::expr::Expr;

/// Selection mode of a choice group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChoiceMode {
    /// Exactly one member is selected whenever the group is reachable.
    #[default]
    Mandatory,
    /// At most one member is selected.
    Optional,
}

impl fmt::Display for ChoiceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChoiceMode::Mandatory => write!(f, "mandatory"),
            ChoiceMode::Optional => write!(f, "optional"),
        }
    }
}

/// A group default: prefer `member` when `condition` holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceDefault {
    pub member: String,
    #[serde(default)]
    pub condition: Expr,
}

impl ChoiceDefault {
    pub fn new(member: impl Into<String>, condition: Expr) -> Self {
        Self {
            member: member.into(),
            condition,
        }
    }
}

/// A choice group record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoiceGroup {
    pub id: String,
    /// Member option names in declaration order.
    pub members: Vec<String>,
    /// Serialized as `mandatory: bool`, defaulting to mandatory.
    #[serde(default = "mandatory_default", rename = "mandatory", with = "mode_as_bool")]
    pub mode: ChoiceMode,
    /// Dependency of the group as a whole; below `y` the group is unreachable.
    #[serde(default, skip_serializing_if = "Expr::is_always_true")]
    pub depends: Expr,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub defaults: Vec<ChoiceDefault>,
}

fn mandatory_default() -> ChoiceMode {
    ChoiceMode::Mandatory
}

mod mode_as_bool {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::ChoiceMode;

    pub fn serialize<S: Serializer>(mode: &ChoiceMode, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_bool(*mode == ChoiceMode::Mandatory)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<ChoiceMode, D::Error> {
        Ok(if bool::deserialize(d)? {
            ChoiceMode::Mandatory
        } else {
            ChoiceMode::Optional
        })
    }
}

impl ChoiceGroup {
    pub fn new(id: impl Into<String>, mode: ChoiceMode) -> Self {
        Self {
            id: id.into(),
            members: Vec::new(),
            mode,
            depends: Expr::y(),
            defaults: Vec::new(),
        }
    }

    pub fn is_mandatory(&self) -> bool {
        self.mode == ChoiceMode::Mandatory
    }
}
