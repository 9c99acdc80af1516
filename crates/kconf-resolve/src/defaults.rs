//! Default selection for options and choice groups.
//!
//! Defaults are ordered rule lists. The first rule whose condition is not
//! `n` supplies the candidate; when none matches, the type's base default
//! applies. For tristate-valued options the candidate is additionally
//! limited by the rule's condition, so `default y if FOO` yields `m` when
//! `FOO` is `m`.

use kconf_schema::{ConfigOption, Expr, GroupId, OptionId, SymbolType, Tristate, Value};
use tracing::trace;

use crate::diagnostics::{Diagnostic, DiagnosticKind, DiagnosticLog};
use crate::env::Environment;
use crate::eval::{evaluate, Evaluation};
use crate::overrides::Requests;

/// Evaluate `expr` on behalf of option/group `owner`, recording any
/// undeclared symbols against it.
pub(crate) fn evaluate_for(
    expr: &Expr,
    env: &Environment<'_>,
    owner: &str,
    log: &mut DiagnosticLog,
) -> Evaluation {
    let evaluation = evaluate(expr, env);
    if !evaluation.unresolved.is_empty() {
        log.note_unresolved(owner, &evaluation.unresolved);
    }
    evaluation
}

/// Ceiling of a choice group as a whole.
pub(crate) fn group_ceiling(gid: GroupId, env: &Environment<'_>, log: &mut DiagnosticLog) -> Tristate {
    let group = env.graph().group(gid);
    evaluate_for(&group.depends, env, &group.id, log).tristate()
}

/// The highest value `id` may hold: its dependency expression, and for a
/// choice member also the group's dependency.
pub(crate) fn ceiling(id: OptionId, env: &Environment<'_>, log: &mut DiagnosticLog) -> Tristate {
    let graph = env.graph();
    let option = graph.option(id);
    let own = evaluate_for(&option.depends, env, &option.name, log).tristate();
    match graph.group_of(id) {
        Some(gid) => own.and(group_ceiling(gid, env, log)),
        None => own,
    }
}

/// Clamp a candidate under a ceiling. Tristate values take the minimum (a
/// bool that would end up at `m` drops to `n`); any other type collapses
/// to its base default when the ceiling is `n`.
pub(crate) fn apply_ceiling(option: &ConfigOption, candidate: Value, ceiling: Tristate) -> Value {
    match candidate {
        Value::Tristate(t) if option.ty.is_tristate_like() => {
            let capped = t.and(ceiling);
            if capped == Tristate::Module && option.ty == SymbolType::Bool {
                Value::Tristate(Tristate::No)
            } else {
                Value::Tristate(capped)
            }
        }
        _ if ceiling == Tristate::No => option.ty.base_default(),
        other => other,
    }
}

/// Scan an option's own default rules. Returns the index of the rule that
/// matched (if any) and the candidate value. With no match the base
/// default applies, pulled into the option's range if it has one.
pub(crate) fn scan_defaults(
    id: OptionId,
    env: &Environment<'_>,
    log: &mut DiagnosticLog,
) -> (Option<usize>, Value) {
    let option = env.graph().option(id);
    for (i, rule) in option.defaults.iter().enumerate() {
        let condition = evaluate_for(&rule.condition, env, &option.name, log).tristate();
        if condition == Tristate::No {
            continue;
        }
        let raw = evaluate_for(&rule.value, env, &option.name, log).value;
        let Some(value) = raw.coerce(option.ty) else {
            log.push(Diagnostic::warning(
                DiagnosticKind::InvalidValue,
                vec![option.name.clone()],
                format!(
                    "default '{}' of '{}' is not a valid {}; using the base default",
                    rule.value, option.name, option.ty
                ),
            ));
            return (Some(i), option.ty.base_default());
        };
        let value = match value {
            Value::Tristate(t) => Value::Tristate(t.and(condition)),
            other => other,
        };
        return (Some(i), value.clamp_to(option.ty, option.range.as_ref()));
    }
    (None, option.ty.base_default().clamp_to(option.ty, option.range.as_ref()))
}

/// Which member a choice group prefers in a given environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct GroupPreference {
    /// The group's own dependency is `y`.
    pub reachable: bool,
    /// Members whose ceiling is `y`, in declaration order.
    pub available: Vec<OptionId>,
    /// An available member the user explicitly set to `y`.
    pub explicit: Option<OptionId>,
    /// The member that receives `y` when it has no override of its own.
    pub preferred: Option<OptionId>,
}

/// Work out a group's preferred member: the first available explicit user
/// selection, else the first matching group default naming an available
/// member the user did not set to `n`, else (mandatory groups only) the
/// first such member in declaration order.
pub(crate) fn preferred_member(
    gid: GroupId,
    env: &Environment<'_>,
    requests: &Requests,
    log: &mut DiagnosticLog,
) -> GroupPreference {
    let graph = env.graph();
    let group = graph.group(gid);
    let reachable = group_ceiling(gid, env, log) == Tristate::Yes;

    let available: Vec<OptionId> = graph
        .members(gid)
        .iter()
        .copied()
        .filter(|&m| ceiling(m, env, log) == Tristate::Yes)
        .collect();

    let requested = |m: OptionId| requests.get(m).map(Value::as_tristate);
    let selectable = |m: OptionId| available.contains(&m) && requested(m) != Some(Tristate::No);

    let explicit = available
        .iter()
        .copied()
        .find(|&m| requested(m) == Some(Tristate::Yes));

    let mut preferred = explicit;
    if preferred.is_none() {
        for rule in &group.defaults {
            if !evaluate_for(&rule.condition, env, &group.id, log).tristate().is_enabled() {
                continue;
            }
            if let Some(m) = graph.lookup(&rule.member).filter(|&m| selectable(m)) {
                preferred = Some(m);
                break;
            }
        }
    }
    if preferred.is_none() && group.is_mandatory() {
        preferred = available.iter().copied().find(|&m| selectable(m));
    }

    trace!(group = %group.id, ?preferred, available = available.len(), "choice preference");
    GroupPreference {
        reachable,
        available,
        explicit,
        preferred,
    }
}

/// Candidate value of one option before the ceiling is applied.
///
/// An override wins (type-clamped). A choice member is `y` only when it is
/// its group's preferred member and no other member was explicitly chosen.
/// Everything else comes from the default rules.
pub(crate) fn resolve_default(
    id: OptionId,
    env: &Environment<'_>,
    requests: &Requests,
    preferences: &[GroupPreference],
    log: &mut DiagnosticLog,
) -> Value {
    let graph = env.graph();
    let option = graph.option(id);
    if let Some(requested) = requests.get(id) {
        return requested.clone().clamp_to(option.ty, option.range.as_ref());
    }
    if let Some(gid) = graph.group_of(id) {
        let pref = &preferences[gid.index()];
        let selected = pref.explicit.is_none() && pref.preferred == Some(id);
        return Value::Tristate(Tristate::from_bool(selected));
    }
    scan_defaults(id, env, log).1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overrides::Overrides;
    use kconf_schema::{ChoiceMode, Literal, OptionGraph, OptionGraphBuilder, SymbolType};

    fn id(graph: &OptionGraph, name: &str) -> OptionId {
        graph.lookup(name).unwrap()
    }

    #[test]
    fn first_true_rule_wins() {
        let mut b = OptionGraphBuilder::new();
        b.bool("A");
        b.option("N", SymbolType::Int)
            .prompt("N")
            .default_if(Expr::int(1), Expr::sym("A"))
            .default(Expr::int(2))
            .default(Expr::int(3));
        let graph = b.build().unwrap();
        let env = Environment::new(&graph);
        let mut log = DiagnosticLog::new();

        assert_eq!(scan_defaults(id(&graph, "N"), &env, &mut log), (Some(1), Value::Int(2)));
    }

    #[test]
    fn no_match_gives_base_default() {
        let mut b = OptionGraphBuilder::new();
        b.bool("A");
        b.tristate("T").default_if(Expr::y(), Expr::sym("A"));
        let graph = b.build().unwrap();
        let env = Environment::new(&graph);
        let mut log = DiagnosticLog::new();

        assert_eq!(
            scan_defaults(id(&graph, "T"), &env, &mut log),
            (None, Value::Tristate(Tristate::No))
        );
    }

    #[test]
    fn condition_limits_tristate_value() {
        let mut b = OptionGraphBuilder::new();
        b.tristate("M");
        b.tristate("T").default_if(Expr::y(), Expr::sym("M"));
        b.bool("B").default_if(Expr::y(), Expr::sym("M"));
        let graph = b.build().unwrap();
        let mut env = Environment::new(&graph);
        env.set(id(&graph, "M"), Value::Tristate(Tristate::Module));
        let mut log = DiagnosticLog::new();

        assert_eq!(scan_defaults(id(&graph, "T"), &env, &mut log).1, Value::Tristate(Tristate::Module));
        // A bool cannot be m, the candidate rounds up before the ceiling applies.
        assert_eq!(scan_defaults(id(&graph, "B"), &env, &mut log).1, Value::Tristate(Tristate::Yes));
    }

    #[test]
    fn defaults_are_clamped_to_range() {
        let mut b = OptionGraphBuilder::new();
        b.option("N", SymbolType::Int).prompt("N").range(1, 64).default(Expr::int(512));
        let graph = b.build().unwrap();
        let env = Environment::new(&graph);
        let mut log = DiagnosticLog::new();
        assert_eq!(scan_defaults(id(&graph, "N"), &env, &mut log).1, Value::Int(64));
    }

    #[test]
    fn uncoercible_default_is_reported() {
        let mut b = OptionGraphBuilder::new();
        b.option("N", SymbolType::Int).prompt("N").default(Expr::string("lots"));
        let graph = b.build().unwrap();
        let env = Environment::new(&graph);
        let mut log = DiagnosticLog::new();
        assert_eq!(scan_defaults(id(&graph, "N"), &env, &mut log).1, Value::Int(0));
        assert_eq!(log.finish()[0].kind, DiagnosticKind::InvalidValue);
    }

    #[test]
    fn string_default_from_symbol() {
        let mut b = OptionGraphBuilder::new();
        b.option("ARCH", SymbolType::String).prompt("arch");
        b.option("DEFCONFIG", SymbolType::String)
            .default_if(Expr::string("arm64_defconfig"), Expr::equals("ARCH", Literal::String("arm64".into())))
            .default(Expr::sym("ARCH"));
        let graph = b.build().unwrap();
        let mut env = Environment::new(&graph);
        env.set(id(&graph, "ARCH"), Value::String("riscv".into()));
        let mut log = DiagnosticLog::new();
        assert_eq!(
            scan_defaults(id(&graph, "DEFCONFIG"), &env, &mut log).1,
            Value::String("riscv".into())
        );
    }

    #[test]
    fn apply_ceiling_rules() {
        let mut b = OptionGraphBuilder::new();
        b.bool("B");
        b.tristate("T");
        b.option("S", SymbolType::String);
        let graph = b.build().unwrap();
        let opt = |n: &str| graph.get(n).unwrap();
        let y = Value::Tristate(Tristate::Yes);

        assert_eq!(apply_ceiling(opt("T"), y.clone(), Tristate::Module), Value::Tristate(Tristate::Module));
        assert_eq!(apply_ceiling(opt("B"), y.clone(), Tristate::Module), Value::Tristate(Tristate::No));
        assert_eq!(apply_ceiling(opt("B"), y.clone(), Tristate::Yes), y);
        assert_eq!(
            apply_ceiling(opt("S"), Value::String("x".into()), Tristate::No),
            Value::String(String::new())
        );
        assert_eq!(
            apply_ceiling(opt("S"), Value::String("x".into()), Tristate::Module),
            Value::String("x".into())
        );
    }

    fn choice_graph(mode: ChoiceMode) -> OptionGraph {
        let mut b = OptionGraphBuilder::new();
        b.bool("FAST");
        b.choice("sched", mode).default_if("Y", Expr::sym("FAST"));
        b.bool("X").choice_group("sched");
        b.bool("Y").choice_group("sched").depends(Expr::sym("FAST"));
        b.bool("Z").choice_group("sched");
        b.build().unwrap()
    }

    #[test]
    fn mandatory_group_falls_back_to_first_available() {
        let graph = choice_graph(ChoiceMode::Mandatory);
        let env = Environment::new(&graph);
        let mut log = DiagnosticLog::new();
        let gid = graph.lookup_group("sched").unwrap();
        let pref = preferred_member(gid, &env, &Requests::none(&graph), &mut log);

        assert!(pref.reachable);
        assert_eq!(pref.available, vec![id(&graph, "X"), id(&graph, "Z")]);
        assert_eq!(pref.preferred, Some(id(&graph, "X")));
        assert_eq!(pref.explicit, None);
    }

    #[test]
    fn group_default_applies_when_condition_holds() {
        let graph = choice_graph(ChoiceMode::Mandatory);
        let mut env = Environment::new(&graph);
        env.set(id(&graph, "FAST"), Value::Tristate(Tristate::Yes));
        let mut log = DiagnosticLog::new();
        let gid = graph.lookup_group("sched").unwrap();
        let pref = preferred_member(gid, &env, &Requests::none(&graph), &mut log);
        assert_eq!(pref.preferred, Some(id(&graph, "Y")));
    }

    #[test]
    fn optional_group_without_default_selects_nothing() {
        let graph = choice_graph(ChoiceMode::Optional);
        let env = Environment::new(&graph);
        let mut log = DiagnosticLog::new();
        let gid = graph.lookup_group("sched").unwrap();
        let pref = preferred_member(gid, &env, &Requests::none(&graph), &mut log);
        assert_eq!(pref.preferred, None);
    }

    #[test]
    fn user_selection_and_rejections_shape_preference() {
        let graph = choice_graph(ChoiceMode::Mandatory);
        let env = Environment::new(&graph);
        let gid = graph.lookup_group("sched").unwrap();

        let mut log = DiagnosticLog::new();
        let requests = Requests::parse(&graph, &Overrides::new().with("Z", "y"), &mut log);
        let pref = preferred_member(gid, &env, &requests, &mut log);
        assert_eq!(pref.explicit, Some(id(&graph, "Z")));
        assert_eq!(pref.preferred, Some(id(&graph, "Z")));

        let requests = Requests::parse(&graph, &Overrides::new().with("X", "n"), &mut log);
        let pref = preferred_member(gid, &env, &requests, &mut log);
        assert_eq!(pref.preferred, Some(id(&graph, "Z")));

        // Y is selected but unavailable: the selection is not honored.
        let requests = Requests::parse(&graph, &Overrides::new().with("Y", "y"), &mut log);
        let pref = preferred_member(gid, &env, &requests, &mut log);
        assert_eq!(pref.explicit, None);
        assert_eq!(pref.preferred, Some(id(&graph, "X")));
    }

    #[test]
    fn member_candidates_follow_preference() {
        let graph = choice_graph(ChoiceMode::Mandatory);
        let env = Environment::new(&graph);
        let mut log = DiagnosticLog::new();
        let requests = Requests::none(&graph);
        let prefs: Vec<_> = graph
            .groups()
            .map(|(gid, _)| preferred_member(gid, &env, &requests, &mut log))
            .collect();

        let y = Value::Tristate(Tristate::Yes);
        let n = Value::Tristate(Tristate::No);
        assert_eq!(resolve_default(id(&graph, "X"), &env, &requests, &prefs, &mut log), y);
        assert_eq!(resolve_default(id(&graph, "Z"), &env, &requests, &prefs, &mut log), n);
    }
}
