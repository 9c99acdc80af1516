//! Why an option holds its value in a snapshot.

use std::fmt;

use serde::Serialize;

use kconf_schema::{ChoiceMode, OptionGraph, SymbolType, Tristate, Value};

use crate::env::Environment;
use crate::eval::evaluate;
use crate::snapshot::Snapshot;

/// One default rule as evaluated against the snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleTrace {
    pub value: String,
    pub condition: String,
    pub condition_value: Tristate,
    /// This is the first rule whose condition holds.
    pub selected: bool,
}

/// Choice group context of a member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupTrace {
    pub id: String,
    pub mode: ChoiceMode,
    pub depends: String,
    pub depends_value: Tristate,
    /// Members at `y` in the snapshot.
    pub selected: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Explanation {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: SymbolType,
    pub prompt: Option<String>,
    pub depends: String,
    pub depends_value: Tristate,
    pub rules: Vec<RuleTrace>,
    pub group: Option<GroupTrace>,
    pub value: Value,
}

/// Explain `name` as resolved in `snapshot`. `None` if the graph does not
/// declare it.
pub fn explain(graph: &OptionGraph, snapshot: &Snapshot, name: &str) -> Option<Explanation> {
    let id = graph.lookup(name)?;
    let option = graph.option(id);
    let env = Environment::from_snapshot(graph, snapshot);

    let mut matched = false;
    let rules = option
        .defaults
        .iter()
        .map(|rule| {
            let condition_value = evaluate(&rule.condition, &env).tristate();
            let selected = !matched && condition_value.is_enabled();
            matched |= selected;
            RuleTrace {
                value: rule.value.to_string(),
                condition: rule.condition.to_string(),
                condition_value,
                selected,
            }
        })
        .collect();

    let group = graph.group_of(id).map(|gid| {
        let group = graph.group(gid);
        GroupTrace {
            id: group.id.clone(),
            mode: group.mode,
            depends: group.depends.to_string(),
            depends_value: evaluate(&group.depends, &env).tristate(),
            selected: graph
                .members(gid)
                .iter()
                .filter(|&&m| env.get(m).as_tristate() == Tristate::Yes)
                .map(|&m| graph.option(m).name.clone())
                .collect(),
        }
    });

    Some(Explanation {
        name: option.name.clone(),
        ty: option.ty,
        prompt: option.prompt.clone(),
        depends: option.depends.to_string(),
        depends_value: evaluate(&option.depends, &env).tristate(),
        rules,
        group,
        value: env.get(id).clone(),
    })
}

impl fmt::Display for Explanation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} ({})", self.name, self.ty)?;
        match &self.prompt {
            Some(prompt) => writeln!(f, "  prompt: \"{prompt}\"")?,
            None => writeln!(f, "  prompt: none (not user-settable)")?,
        }
        writeln!(f, "  depends on: {} [= {}]", self.depends, self.depends_value)?;

        if self.rules.is_empty() {
            writeln!(f, "  defaults: none")?;
        } else {
            writeln!(f, "  defaults:")?;
            for rule in &self.rules {
                let marker = if rule.selected { "*" } else { " " };
                writeln!(
                    f,
                    "  {marker} {} if {} [= {}]",
                    rule.value, rule.condition, rule.condition_value
                )?;
            }
        }

        if let Some(group) = &self.group {
            writeln!(
                f,
                "  choice: {} ({}), depends on {} [= {}], selected: {}",
                group.id,
                group.mode,
                group.depends,
                group.depends_value,
                if group.selected.is_empty() {
                    "none".to_string()
                } else {
                    group.selected.join(", ")
                }
            )?;
        }
        writeln!(f, "  value: {}", self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overrides::Overrides;
    use crate::resolve::resolve;
    use kconf_schema::{Expr, OptionGraphBuilder};

    fn graph() -> OptionGraph {
        let mut b = OptionGraphBuilder::new();
        b.bool("NET").default(Expr::y());
        b.tristate("E1000")
            .depends(Expr::sym("NET"))
            .default_if(Expr::y(), Expr::sym("DEBUG"))
            .default(Expr::m());
        b.bool("DEBUG");
        b.choice("sched", ChoiceMode::Mandatory);
        b.bool("X").choice_group("sched");
        b.bool("Y").choice_group("sched");
        b.build().unwrap()
    }

    #[test]
    fn reports_selected_rule() {
        let graph = graph();
        let res = resolve(&graph, &Overrides::new()).unwrap();
        let exp = explain(&graph, &res.snapshot, "E1000").unwrap();

        assert_eq!(exp.depends_value, Tristate::Yes);
        assert_eq!(exp.rules.len(), 2);
        assert!(!exp.rules[0].selected);
        assert!(exp.rules[1].selected);
        assert_eq!(exp.value, Value::Tristate(Tristate::Module));
        assert!(exp.group.is_none());

        let text = exp.to_string();
        assert!(text.starts_with("E1000 (tristate)"));
        assert!(text.contains("* m if y [= y]"));
    }

    #[test]
    fn reports_choice_context() {
        let graph = graph();
        let res = resolve(&graph, &Overrides::new().with("Y", "y")).unwrap();
        let exp = explain(&graph, &res.snapshot, "X").unwrap();
        let group = exp.group.unwrap();
        assert_eq!(group.id, "sched");
        assert_eq!(group.selected, vec!["Y"]);
        assert_eq!(exp.value, Value::Tristate(Tristate::No));
    }

    #[test]
    fn unknown_option_has_no_explanation() {
        let graph = graph();
        let res = resolve(&graph, &Overrides::new()).unwrap();
        assert!(explain(&graph, &res.snapshot, "NOPE").is_none());
    }
}
