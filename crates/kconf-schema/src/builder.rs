//! Programmatic construction of option graphs.
//!
//! The `OptionGraphBuilder` is mainly used by tests and by tools that
//! generate schemas without going through a schema file.
//!
//! # Example
//!
//! ```rust
//! use kconf_schema::builder::OptionGraphBuilder;
//! use kconf_schema::{ChoiceMode, Expr, SymbolType};
//!
//! let mut builder = OptionGraphBuilder::new();
//! builder
//!     .option("NET", SymbolType::Bool)
//!     .prompt("Networking support")
//!     .default(Expr::y());
//! builder
//!     .option("E1000", SymbolType::Tristate)
//!     .prompt("Intel PRO/1000")
//!     .depends(Expr::sym("NET"))
//!     .default(Expr::m());
//! builder.choice("cpu", ChoiceMode::Mandatory);
//! builder.option("CPU_A", SymbolType::Bool).prompt("A").choice_group("cpu");
//! builder.option("CPU_B", SymbolType::Bool).prompt("B").choice_group("cpu");
//!
//! let graph = builder.build().unwrap();
//! assert_eq!(graph.len(), 4);
//! assert_eq!(graph.group_count(), 1);
//! ```

use crate::choice::{ChoiceDefault, ChoiceGroup, ChoiceMode};
use crate::error::Result;
use crate::expr::Expr;
use crate::graph::OptionGraph;
use crate::option::{ConfigOption, DefaultRule};
use crate::value::{IntRange, SymbolType};

/// A builder for option graphs. Group member lists are filled in from the
/// options' `choice_group` in declaration order.
#[derive(Debug, Default)]
pub struct OptionGraphBuilder {
    options: Vec<ConfigOption>,
    groups: Vec<ChoiceGroup>,
}

/// Chained setters for the option just declared.
pub struct OptionHandle<'a>(&'a mut ConfigOption);

/// Chained setters for the choice group just declared.
pub struct ChoiceHandle<'a>(&'a mut ChoiceGroup);

impl OptionGraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare an option.
    pub fn option(&mut self, name: &str, ty: SymbolType) -> OptionHandle<'_> {
        self.options.push(ConfigOption::new(name, ty));
        let last = self.options.len() - 1;
        OptionHandle(&mut self.options[last])
    }

    /// Shorthand for a bool option with a prompt equal to its name.
    pub fn bool(&mut self, name: &str) -> OptionHandle<'_> {
        self.option(name, SymbolType::Bool).prompt(name)
    }

    /// Shorthand for a tristate option with a prompt equal to its name.
    pub fn tristate(&mut self, name: &str) -> OptionHandle<'_> {
        self.option(name, SymbolType::Tristate).prompt(name)
    }

    /// Declare a choice group.
    pub fn choice(&mut self, id: &str, mode: ChoiceMode) -> ChoiceHandle<'_> {
        self.groups.push(ChoiceGroup::new(id, mode));
        let last = self.groups.len() - 1;
        ChoiceHandle(&mut self.groups[last])
    }

    /// Validate and produce the graph.
    pub fn build(mut self) -> Result<OptionGraph> {
        for option in &self.options {
            let Some(group_id) = &option.choice_group else {
                continue;
            };
            if let Some(group) = self.groups.iter_mut().find(|g| &g.id == group_id) {
                if !group.members.contains(&option.name) {
                    group.members.push(option.name.clone());
                }
            }
        }
        OptionGraph::new(self.options, self.groups)
    }
}

impl<'a> OptionHandle<'a> {
    pub fn prompt(self, prompt: &str) -> Self {
        self.0.prompt = Some(prompt.to_string());
        self
    }

    /// Remove the prompt, making the option non-interactive.
    pub fn hidden(self) -> Self {
        self.0.prompt = None;
        self
    }

    /// Add a dependency; repeated calls are conjoined.
    pub fn depends(self, expr: Expr) -> Self {
        let current = std::mem::take(&mut self.0.depends);
        self.0.depends = if current.is_always_true() {
            expr
        } else {
            current.and(expr)
        };
        self
    }

    /// Add an unconditional default rule.
    pub fn default(self, value: Expr) -> Self {
        self.0.defaults.push(DefaultRule::always(value));
        self
    }

    /// Add a conditional default rule.
    pub fn default_if(self, value: Expr, condition: Expr) -> Self {
        self.0.defaults.push(DefaultRule::new(value, condition));
        self
    }

    pub fn range(self, min: i64, max: i64) -> Self {
        self.0.range = Some(IntRange::new(min, max));
        self
    }

    pub fn choice_group(self, group: &str) -> Self {
        self.0.choice_group = Some(group.to_string());
        self
    }
}

impl<'a> ChoiceHandle<'a> {
    pub fn depends(self, expr: Expr) -> Self {
        let current = std::mem::take(&mut self.0.depends);
        self.0.depends = if current.is_always_true() {
            expr
        } else {
            current.and(expr)
        };
        self
    }

    /// Prefer `member` unconditionally.
    pub fn default(self, member: &str) -> Self {
        self.0.defaults.push(ChoiceDefault::new(member, Expr::y()));
        self
    }

    /// Prefer `member` when `condition` holds.
    pub fn default_if(self, member: &str, condition: Expr) -> Self {
        self.0.defaults.push(ChoiceDefault::new(member, condition));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn members_follow_option_order() {
        let mut b = OptionGraphBuilder::new();
        b.choice("cpu", ChoiceMode::Mandatory).default("Y");
        b.bool("X").choice_group("cpu");
        b.bool("Y").choice_group("cpu");
        let graph = b.build().unwrap();

        let cpu = graph.lookup_group("cpu").unwrap();
        assert_eq!(graph.group(cpu).members, vec!["X", "Y"]);
        assert_eq!(graph.group(cpu).defaults[0].member, "Y");
    }

    #[test]
    fn depends_accumulates() {
        let mut b = OptionGraphBuilder::new();
        b.bool("A");
        b.bool("B");
        b.bool("C").depends(Expr::sym("A")).depends(Expr::sym("B"));
        let graph = b.build().unwrap();
        assert_eq!(graph.get("C").unwrap().depends.to_string(), "A && B");
    }

    #[test]
    fn hidden_clears_prompt() {
        let mut b = OptionGraphBuilder::new();
        b.bool("H").hidden().default(Expr::y());
        let graph = b.build().unwrap();
        assert!(!graph.get("H").unwrap().is_interactive());
    }

    #[test]
    fn build_reports_duplicates() {
        let mut b = OptionGraphBuilder::new();
        b.bool("A");
        b.bool("A");
        assert!(b.build().is_err());
    }
}
