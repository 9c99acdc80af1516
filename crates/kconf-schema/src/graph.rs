//! The immutable option graph.
//!
//! An [`OptionGraph`] is built once from option and choice-group records,
//! validated, and then only read. Options and groups keep their declaration
//! order, which is also the evaluation order used by the resolver.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::choice::ChoiceGroup;
use crate::error::{Result, SchemaError};
use crate::option::ConfigOption;

/// Index of an option in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OptionId(usize);

impl OptionId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for OptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Index of a choice group in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GroupId(usize);

impl GroupId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// The serialized form of an option graph, as produced by a schema loader.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaDocument {
    #[serde(default)]
    pub options: Vec<ConfigOption>,
    #[serde(default, rename = "choice_groups", skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<ChoiceGroup>,
}

/// A validated, read-only option graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "SchemaDocument", into = "SchemaDocument")]
pub struct OptionGraph {
    options: Vec<ConfigOption>,
    groups: Vec<ChoiceGroup>,
    /// Index: option name -> id
    by_name: HashMap<String, OptionId>,
    /// Index: group id string -> id
    group_by_name: HashMap<String, GroupId>,
    /// Index: option -> containing group (if any)
    member_of: Vec<Option<GroupId>>,
    /// Index: group -> member ids in declaration order
    group_members: Vec<Vec<OptionId>>,
}

impl OptionGraph {
    /// Validate the records and build the lookup indexes.
    pub fn new(options: Vec<ConfigOption>, groups: Vec<ChoiceGroup>) -> Result<Self> {
        let mut by_name = HashMap::with_capacity(options.len());
        for (i, option) in options.iter().enumerate() {
            if by_name.insert(option.name.clone(), OptionId(i)).is_some() {
                return Err(SchemaError::DuplicateOption(option.name.clone()));
            }
            validate_range(option)?;
        }

        let mut group_by_name = HashMap::with_capacity(groups.len());
        for (i, group) in groups.iter().enumerate() {
            if group_by_name.insert(group.id.clone(), GroupId(i)).is_some() {
                return Err(SchemaError::DuplicateGroup(group.id.clone()));
            }
        }

        let mut member_of: Vec<Option<GroupId>> = vec![None; options.len()];
        let mut group_members = Vec::with_capacity(groups.len());
        for (gi, group) in groups.iter().enumerate() {
            if group.members.is_empty() {
                return Err(SchemaError::EmptyGroup(group.id.clone()));
            }
            let mut ids = Vec::with_capacity(group.members.len());
            for member in &group.members {
                let id = *by_name
                    .get(member)
                    .ok_or_else(|| SchemaError::UnknownMember {
                        group: group.id.clone(),
                        member: member.clone(),
                    })?;
                let option = &options[id.0];
                if let Some(previous) = member_of[id.0] {
                    return Err(SchemaError::MemberInMultipleGroups {
                        option: member.clone(),
                        first: groups[previous.0].id.clone(),
                        second: group.id.clone(),
                    });
                }
                if option.choice_group.as_deref() != Some(group.id.as_str()) {
                    return Err(SchemaError::MembershipMismatch {
                        option: member.clone(),
                        group: group.id.clone(),
                    });
                }
                if !option.ty.is_tristate_like() {
                    return Err(SchemaError::InvalidMemberType {
                        option: member.clone(),
                        ty: option.ty.to_string(),
                    });
                }
                member_of[id.0] = Some(GroupId(gi));
                ids.push(id);
            }
            for default in &group.defaults {
                if !group.members.contains(&default.member) {
                    return Err(SchemaError::DefaultNotMember {
                        group: group.id.clone(),
                        member: default.member.clone(),
                    });
                }
            }
            group_members.push(ids);
        }

        // Options that declare a group must actually be listed by it.
        for (i, option) in options.iter().enumerate() {
            if let Some(group) = &option.choice_group {
                if !group_by_name.contains_key(group) {
                    return Err(SchemaError::UnknownGroup {
                        option: option.name.clone(),
                        group: group.clone(),
                    });
                }
                if member_of[i].is_none() {
                    return Err(SchemaError::MembershipMismatch {
                        option: option.name.clone(),
                        group: group.clone(),
                    });
                }
            }
        }

        Ok(Self {
            options,
            groups,
            by_name,
            group_by_name,
            member_of,
            group_members,
        })
    }

    /// Number of options.
    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// Look up an option id by name.
    pub fn lookup(&self, name: &str) -> Option<OptionId> {
        self.by_name.get(name).copied()
    }

    /// Get an option by name.
    pub fn get(&self, name: &str) -> Option<&ConfigOption> {
        self.lookup(name).map(|id| &self.options[id.0])
    }

    /// The id of the option at a declaration index.
    pub fn id_at(&self, index: usize) -> Option<OptionId> {
        (index < self.options.len()).then_some(OptionId(index))
    }

    /// Get an option by id.
    pub fn option(&self, id: OptionId) -> &ConfigOption {
        &self.options[id.0]
    }

    /// Ids of all options in declaration order.
    pub fn option_ids(&self) -> impl Iterator<Item = OptionId> + '_ {
        (0..self.options.len()).map(OptionId)
    }

    /// All options in declaration order.
    pub fn options(&self) -> impl Iterator<Item = (OptionId, &ConfigOption)> {
        self.options
            .iter()
            .enumerate()
            .map(|(i, o)| (OptionId(i), o))
    }

    /// Number of choice groups.
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// All choice groups in declaration order.
    pub fn groups(&self) -> impl Iterator<Item = (GroupId, &ChoiceGroup)> {
        self.groups
            .iter()
            .enumerate()
            .map(|(i, g)| (GroupId(i), g))
    }

    /// Get a choice group by id.
    pub fn group(&self, id: GroupId) -> &ChoiceGroup {
        &self.groups[id.0]
    }

    /// Look up a choice group by its string id.
    pub fn lookup_group(&self, name: &str) -> Option<GroupId> {
        self.group_by_name.get(name).copied()
    }

    /// The group an option belongs to, if any.
    pub fn group_of(&self, id: OptionId) -> Option<GroupId> {
        self.member_of[id.0]
    }

    /// Member ids of a group in declaration order.
    pub fn members(&self, id: GroupId) -> &[OptionId] {
        &self.group_members[id.0]
    }

    /// Convert back into loader records.
    pub fn to_document(&self) -> SchemaDocument {
        SchemaDocument {
            options: self.options.clone(),
            groups: self.groups.clone(),
        }
    }
}

impl TryFrom<SchemaDocument> for OptionGraph {
    type Error = SchemaError;

    fn try_from(doc: SchemaDocument) -> Result<Self> {
        OptionGraph::new(doc.options, doc.groups)
    }
}

impl From<OptionGraph> for SchemaDocument {
    fn from(graph: OptionGraph) -> Self {
        SchemaDocument {
            options: graph.options,
            groups: graph.groups,
        }
    }
}

fn validate_range(option: &ConfigOption) -> Result<()> {
    let Some(range) = &option.range else {
        return Ok(());
    };
    if !matches!(option.ty, crate::SymbolType::Int | crate::SymbolType::Hex) {
        return Err(SchemaError::RangeOnNonNumeric {
            option: option.name.clone(),
            ty: option.ty.to_string(),
        });
    }
    if !range.is_valid() {
        return Err(SchemaError::InvalidRange {
            option: option.name.clone(),
            min: range.min,
            max: range.max,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::choice::{ChoiceDefault, ChoiceMode};
    use crate::expr::Expr;
    use crate::value::{IntRange, SymbolType};

    fn member(name: &str, group: &str) -> ConfigOption {
        let mut o = ConfigOption::new(name, SymbolType::Bool);
        o.prompt = Some(name.to_string());
        o.choice_group = Some(group.to_string());
        o
    }

    fn group(id: &str, members: &[&str]) -> ChoiceGroup {
        let mut g = ChoiceGroup::new(id, ChoiceMode::Mandatory);
        g.members = members.iter().map(|m| m.to_string()).collect();
        g
    }

    #[test]
    fn builds_indexes() {
        let graph = OptionGraph::new(
            vec![
                ConfigOption::new("A", SymbolType::Bool),
                member("X", "cpu"),
                member("Y", "cpu"),
            ],
            vec![group("cpu", &["X", "Y"])],
        )
        .unwrap();

        assert_eq!(graph.len(), 3);
        let x = graph.lookup("X").unwrap();
        let cpu = graph.lookup_group("cpu").unwrap();
        assert_eq!(graph.group_of(x), Some(cpu));
        assert_eq!(graph.group_of(graph.lookup("A").unwrap()), None);
        assert_eq!(graph.members(cpu).len(), 2);
        assert_eq!(graph.option(x).name, "X");
    }

    #[test]
    fn rejects_duplicate_option() {
        let err = OptionGraph::new(
            vec![
                ConfigOption::new("A", SymbolType::Bool),
                ConfigOption::new("A", SymbolType::Int),
            ],
            vec![],
        )
        .unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateOption(name) if name == "A"));
    }

    #[test]
    fn rejects_unknown_member() {
        let err = OptionGraph::new(vec![member("X", "cpu")], vec![group("cpu", &["X", "Z"])])
            .unwrap_err();
        assert!(matches!(err, SchemaError::UnknownMember { .. }));
    }

    #[test]
    fn rejects_undeclared_membership() {
        let err = OptionGraph::new(
            vec![member("X", "cpu"), ConfigOption::new("Y", SymbolType::Bool)],
            vec![group("cpu", &["X", "Y"])],
        )
        .unwrap_err();
        assert!(matches!(err, SchemaError::MembershipMismatch { option, .. } if option == "Y"));

        let err = OptionGraph::new(vec![member("X", "cpu"), member("Y", "cpu")], vec![group("cpu", &["X"])])
            .unwrap_err();
        assert!(matches!(err, SchemaError::MembershipMismatch { option, .. } if option == "Y"));
    }

    #[test]
    fn rejects_unknown_group() {
        let err = OptionGraph::new(vec![member("X", "nope")], vec![]).unwrap_err();
        assert!(matches!(err, SchemaError::UnknownGroup { .. }));
    }

    #[test]
    fn rejects_string_member() {
        let mut s = member("S", "cpu");
        s.ty = SymbolType::String;
        let err = OptionGraph::new(vec![s], vec![group("cpu", &["S"])]).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidMemberType { .. }));
    }

    #[test]
    fn rejects_foreign_group_default() {
        let mut g = group("cpu", &["X"]);
        g.defaults.push(ChoiceDefault::new("A", Expr::y()));
        let err = OptionGraph::new(
            vec![ConfigOption::new("A", SymbolType::Bool), member("X", "cpu")],
            vec![g],
        )
        .unwrap_err();
        assert!(matches!(err, SchemaError::DefaultNotMember { .. }));
    }

    #[test]
    fn rejects_bad_ranges() {
        let mut o = ConfigOption::new("N", SymbolType::Int);
        o.range = Some(IntRange::new(5, 1));
        assert!(matches!(
            OptionGraph::new(vec![o], vec![]).unwrap_err(),
            SchemaError::InvalidRange { .. }
        ));

        let mut o = ConfigOption::new("B", SymbolType::Bool);
        o.range = Some(IntRange::new(0, 1));
        assert!(matches!(
            OptionGraph::new(vec![o], vec![]).unwrap_err(),
            SchemaError::RangeOnNonNumeric { .. }
        ));
    }

    #[test]
    fn rejects_empty_group() {
        let err = OptionGraph::new(vec![], vec![group("cpu", &[])]).unwrap_err();
        assert!(matches!(err, SchemaError::EmptyGroup(_)));
    }

    #[test]
    fn serde_goes_through_validation() {
        let json = r#"{"options": [{"name": "A", "type": "bool"}, {"name": "A", "type": "bool"}]}"#;
        assert!(serde_json::from_str::<OptionGraph>(json).is_err());

        let json = r#"{"options": [{"name": "A", "type": "tristate", "prompt": "A?"}]}"#;
        let graph: OptionGraph = serde_json::from_str(json).unwrap();
        assert_eq!(graph.get("A").unwrap().ty, SymbolType::Tristate);
    }
}
